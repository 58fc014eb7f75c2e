//! Immutable configuration tables consumed by the simulation.
//!
//! Every table is plain data with a sensible [`Default`]; adapters usually
//! deserialize a [`GameConfig`] from TOML and call [`GameConfig::validate`]
//! before handing it to a session.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{EnemyKind, TowerKind};

/// Inclusive range of floats sampled uniformly when an entity is created.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFloatRange")]
pub struct FloatRange {
    min: f32,
    max: f32,
}

#[derive(Deserialize)]
struct RawFloatRange {
    min: f32,
    max: f32,
}

impl From<RawFloatRange> for FloatRange {
    fn from(raw: RawFloatRange) -> Self {
        Self::new(raw.min, raw.max)
    }
}

impl FloatRange {
    /// Creates a range; a `max` below `min` collapses onto `min`.
    #[must_use]
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            min,
            max: if max < min { min } else { max },
        }
    }

    /// Creates a degenerate range that always yields `value`.
    #[must_use]
    pub const fn constant(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Lower bound of the range.
    #[must_use]
    pub const fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound of the range.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Draws a value uniformly from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Dimensions of the board measured in tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            columns: 11,
            rows: 11,
        }
    }
}

/// Attribute ranges sampled for every enemy of one kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Uniform model scale.
    pub scale: FloatRange,
    /// Movement speed in tiles per second.
    pub speed: FloatRange,
    /// Lateral lane bias relative to the path center line.
    pub path_offset: FloatRange,
    /// Starting health.
    pub health: FloatRange,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            scale: FloatRange::constant(1.0),
            speed: FloatRange::constant(1.0),
            path_offset: FloatRange::constant(0.0),
            health: FloatRange::constant(100.0),
        }
    }
}

/// Per-kind enemy configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTable {
    /// Configuration applied to [`EnemyKind::Small`].
    pub small: EnemyConfig,
    /// Configuration applied to [`EnemyKind::Medium`].
    pub medium: EnemyConfig,
    /// Configuration applied to [`EnemyKind::Large`].
    pub large: EnemyConfig,
}

impl Default for EnemyTable {
    fn default() -> Self {
        Self {
            small: EnemyConfig {
                scale: FloatRange::new(0.5, 0.7),
                speed: FloatRange::new(1.5, 2.0),
                path_offset: FloatRange::new(-0.4, 0.4),
                health: FloatRange::new(10.0, 20.0),
            },
            medium: EnemyConfig {
                scale: FloatRange::new(0.8, 1.2),
                speed: FloatRange::new(0.8, 1.2),
                path_offset: FloatRange::new(-0.25, 0.25),
                health: FloatRange::new(60.0, 100.0),
            },
            large: EnemyConfig {
                scale: FloatRange::new(1.5, 2.0),
                speed: FloatRange::new(0.4, 0.6),
                path_offset: FloatRange::new(-0.1, 0.1),
                health: FloatRange::new(300.0, 500.0),
            },
        }
    }
}

impl EnemyTable {
    /// Looks up the configuration for the provided kind.
    #[must_use]
    pub const fn get(&self, kind: EnemyKind) -> &EnemyConfig {
        match kind {
            EnemyKind::Small => &self.small,
            EnemyKind::Medium => &self.medium,
            EnemyKind::Large => &self.large,
        }
    }
}

/// Durations of the enemy presentation phases, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Length of the intro played right after spawning.
    pub intro: f32,
    /// Length of the outro played after reaching a destination.
    pub outro: f32,
    /// Length of the dying clip played after running out of health.
    pub dying: f32,
    /// Playback speed of the move clip per unit of speed over scale.
    pub move_animation_speed: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            intro: 1.0,
            outro: 1.0,
            dying: 1.5,
            move_animation_speed: 1.0,
        }
    }
}

/// Laser tower parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserConfig {
    /// Targeting radius in tiles.
    pub targeting_range: f32,
    /// Damage applied per second of beam contact.
    pub damage_per_second: f32,
}

impl Default for LaserConfig {
    fn default() -> Self {
        Self {
            targeting_range: 1.5,
            damage_per_second: 10.0,
        }
    }
}

/// Mortar tower parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MortarConfig {
    /// Targeting radius in tiles; also fixes the launch speed.
    pub targeting_range: f32,
    /// Shots fired per second while targets are available.
    pub shots_per_second: f32,
    /// Radius of a shell's blast.
    pub shell_blast_radius: f32,
    /// Damage applied by a shell's blast.
    pub shell_damage: f32,
    /// Height of the barrel above the ground.
    pub launch_height: f32,
}

impl Default for MortarConfig {
    fn default() -> Self {
        Self {
            targeting_range: 3.5,
            shots_per_second: 1.0,
            shell_blast_radius: 1.0,
            shell_damage: 20.0,
            launch_height: 0.75,
        }
    }
}

/// Per-kind tower configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerTable {
    /// Laser tower configuration.
    pub laser: LaserConfig,
    /// Mortar tower configuration.
    pub mortar: MortarConfig,
}

impl TowerTable {
    /// Targeting range of the provided tower kind.
    #[must_use]
    pub const fn targeting_range(&self, kind: TowerKind) -> f32 {
        match kind {
            TowerKind::Laser => self.laser.targeting_range,
            TowerKind::Mortar => self.mortar.targeting_range,
        }
    }
}

/// Projectile and effect parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarConfig {
    /// Lifetime of an explosion effect, in seconds.
    pub explosion_duration: f32,
}

impl Default for WarConfig {
    fn default() -> Self {
        Self {
            explosion_duration: 0.5,
        }
    }
}

/// Emits `amount` enemies of one kind, one every `cooldown` seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnSequenceConfig {
    /// Kind of enemy spawned.
    #[serde(default)]
    pub kind: EnemyKind,
    /// Number of enemies spawned.
    pub amount: u32,
    /// Seconds between spawns.
    pub cooldown: f32,
}

/// Ordered list of spawn sequences played back to back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Sequences composing the wave.
    pub sequences: Vec<SpawnSequenceConfig>,
}

/// Ordered list of waves, optionally repeated with increasing pace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Waves composing one cycle.
    pub waves: Vec<WaveConfig>,
    /// Number of cycles to play; zero repeats forever.
    pub cycles: u32,
    /// Time-scale increment applied after each completed cycle.
    pub cycle_speed_up: f32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        let sequence = |kind, amount, cooldown| SpawnSequenceConfig {
            kind,
            amount,
            cooldown,
        };
        Self {
            waves: vec![
                WaveConfig {
                    sequences: vec![sequence(EnemyKind::Medium, 5, 1.5)],
                },
                WaveConfig {
                    sequences: vec![
                        sequence(EnemyKind::Small, 10, 0.5),
                        sequence(EnemyKind::Medium, 5, 1.0),
                    ],
                },
                WaveConfig {
                    sequences: vec![
                        sequence(EnemyKind::Medium, 5, 1.0),
                        sequence(EnemyKind::Large, 2, 3.0),
                    ],
                },
            ],
            cycles: 1,
            cycle_speed_up: 0.5,
        }
    }
}

/// Complete configuration of a game session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board dimensions.
    pub board: BoardConfig,
    /// Player health at the start of a game; zero disables defeat.
    pub starting_player_health: u32,
    /// Time-scale applied while the session is not paused.
    pub play_speed: f32,
    /// Seed of the session's random number generator.
    pub seed: u64,
    /// Enemy archetypes.
    pub enemies: EnemyTable,
    /// Enemy presentation phase durations.
    pub animation: AnimationConfig,
    /// Tower parameters.
    pub towers: TowerTable,
    /// Projectile and effect parameters.
    pub war: WarConfig,
    /// Spawn schedule.
    pub scenario: ScenarioConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            starting_player_health: 10,
            play_speed: 1.0,
            seed: 0x7d1e_5eed,
            enemies: EnemyTable::default(),
            animation: AnimationConfig::default(),
            towers: TowerTable::default(),
            war: WarConfig::default(),
            scenario: ScenarioConfig::default(),
        }
    }
}

/// Reasons a configuration is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The board must be at least two tiles wide and tall.
    #[error("board must be at least 2x2 tiles, got {columns}x{rows}")]
    BoardTooSmall {
        /// Configured columns.
        columns: u32,
        /// Configured rows.
        rows: u32,
    },
    /// The scenario lists no waves.
    #[error("scenario has no waves")]
    EmptyScenario,
    /// A wave lists no sequences.
    #[error("wave {wave} has no spawn sequences")]
    EmptyWave {
        /// Index of the offending wave.
        wave: usize,
    },
    /// A sequence spawns nothing.
    #[error("sequence {sequence} of wave {wave} spawns no enemies")]
    EmptySequence {
        /// Index of the wave.
        wave: usize,
        /// Index of the sequence within the wave.
        sequence: usize,
    },
    /// A sequence cooldown is not strictly positive.
    #[error("sequence {sequence} of wave {wave} has non-positive cooldown {cooldown}")]
    InvalidCooldown {
        /// Index of the wave.
        wave: usize,
        /// Index of the sequence within the wave.
        sequence: usize,
        /// Offending cooldown.
        cooldown: f32,
    },
    /// A numeric parameter falls outside its permitted range.
    #[error("{field} must be {expectation}, got {value}")]
    OutOfRange {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human readable constraint.
        expectation: &'static str,
        /// Offending value.
        value: f32,
    },
}

impl GameConfig {
    /// Checks the invariants the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board.columns < 2 || self.board.rows < 2 {
            return Err(ConfigError::BoardTooSmall {
                columns: self.board.columns,
                rows: self.board.rows,
            });
        }

        positive("play_speed", self.play_speed)?;

        if self.scenario.waves.is_empty() {
            return Err(ConfigError::EmptyScenario);
        }
        for (wave_index, wave) in self.scenario.waves.iter().enumerate() {
            if wave.sequences.is_empty() {
                return Err(ConfigError::EmptyWave { wave: wave_index });
            }
            for (sequence_index, sequence) in wave.sequences.iter().enumerate() {
                if sequence.amount == 0 {
                    return Err(ConfigError::EmptySequence {
                        wave: wave_index,
                        sequence: sequence_index,
                    });
                }
                if !(sequence.cooldown > 0.0) {
                    return Err(ConfigError::InvalidCooldown {
                        wave: wave_index,
                        sequence: sequence_index,
                        cooldown: sequence.cooldown,
                    });
                }
            }
        }
        if self.scenario.cycle_speed_up < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "scenario.cycle_speed_up",
                expectation: "non-negative",
                value: self.scenario.cycle_speed_up,
            });
        }

        for config in [&self.enemies.small, &self.enemies.medium, &self.enemies.large] {
            positive("enemies.scale", config.scale.min())?;
            positive("enemies.speed", config.speed.min())?;
            positive("enemies.health", config.health.min())?;
            if config.path_offset.min() < -0.5 || config.path_offset.max() > 0.5 {
                return Err(ConfigError::OutOfRange {
                    field: "enemies.path_offset",
                    expectation: "within [-0.5, 0.5]",
                    value: if config.path_offset.min() < -0.5 {
                        config.path_offset.min()
                    } else {
                        config.path_offset.max()
                    },
                });
            }
        }

        positive("towers.laser.targeting_range", self.towers.laser.targeting_range)?;
        positive("towers.mortar.targeting_range", self.towers.mortar.targeting_range)?;
        positive("towers.mortar.shots_per_second", self.towers.mortar.shots_per_second)?;
        positive("towers.mortar.launch_height", self.towers.mortar.launch_height)?;
        positive("war.explosion_duration", self.war.explosion_duration)?;

        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expectation: "strictly positive",
            value,
        })
    }
}
