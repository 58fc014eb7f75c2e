#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Nested timing state machines that decide when enemies enter the board.
//!
//! A scenario plays a list of waves, a wave plays a list of spawn sequences
//! and a sequence emits one [`SpawnIntent`] per cooldown. The states never
//! create enemies themselves; the session turns intents into enemies.

use tile_defense_core::{
    config::{ScenarioConfig, SpawnSequenceConfig, WaveConfig},
    EnemyKind,
};
use tracing::{debug, trace};

/// Request to spawn one enemy of the provided kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnIntent {
    /// Kind of enemy to spawn.
    pub kind: EnemyKind,
}

/// Progress of a single spawn sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SequenceState {
    count: u32,
    cooldown: f32,
}

impl SequenceState {
    /// Starts the sequence so that the first enemy spawns on the next progress call.
    #[must_use]
    pub fn begin(config: &SpawnSequenceConfig) -> Self {
        debug_assert!(config.cooldown > 0.0, "sequence cooldown must be positive");
        Self {
            count: 0,
            cooldown: config.cooldown,
        }
    }

    /// Number of enemies emitted so far.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Advances the sequence by `dt` seconds.
    ///
    /// Returns the time left over once the sequence is exhausted, or `None`
    /// while it still has enemies to emit.
    pub fn progress(
        &mut self,
        config: &SpawnSequenceConfig,
        dt: f32,
        out: &mut Vec<SpawnIntent>,
    ) -> Option<f32> {
        if config.cooldown <= 0.0 {
            return Some(dt);
        }

        self.cooldown += dt;
        while self.cooldown >= config.cooldown {
            self.cooldown -= config.cooldown;
            if self.count >= config.amount {
                return Some(self.cooldown);
            }
            self.count += 1;
            trace!(kind = ?config.kind, count = self.count, "spawn intent");
            out.push(SpawnIntent { kind: config.kind });
        }
        None
    }
}

/// Progress of a wave through its sequences.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveState {
    index: usize,
    sequence: SequenceState,
}

impl WaveState {
    /// Starts the wave at its first sequence.
    ///
    /// # Panics
    ///
    /// Panics when the wave has no sequences.
    #[must_use]
    pub fn begin(config: &WaveConfig) -> Self {
        assert!(!config.sequences.is_empty(), "empty wave");
        Self {
            index: 0,
            sequence: SequenceState::begin(&config.sequences[0]),
        }
    }

    /// Index of the sequence currently playing.
    #[must_use]
    pub const fn sequence_index(&self) -> usize {
        self.index
    }

    /// Advances the wave by `dt` seconds, forwarding leftover time between sequences.
    ///
    /// Returns the leftover time once the last sequence is exhausted.
    pub fn progress(
        &mut self,
        config: &WaveConfig,
        dt: f32,
        out: &mut Vec<SpawnIntent>,
    ) -> Option<f32> {
        let Some(current) = config.sequences.get(self.index) else {
            return Some(dt);
        };
        let mut leftover = self.sequence.progress(current, dt, out);

        while let Some(remaining) = leftover {
            self.index += 1;
            let Some(next) = config.sequences.get(self.index) else {
                return Some(remaining);
            };
            self.sequence = SequenceState::begin(next);
            leftover = self.sequence.progress(next, remaining, out);
        }
        None
    }
}

/// Outcome of advancing a scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScenarioStatus {
    /// More enemies remain to be spawned.
    Running,
    /// Every cycle finished spawning.
    Complete,
}

/// Progress of a scenario through its waves and cycles.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioState {
    config: ScenarioConfig,
    index: usize,
    cycle: u32,
    time_scale: f32,
    wave: WaveState,
    complete: bool,
}

impl ScenarioState {
    /// Starts the scenario at its first wave with a time scale of one.
    ///
    /// # Panics
    ///
    /// Panics when the scenario has no waves or its first wave has no sequences.
    #[must_use]
    pub fn begin(config: ScenarioConfig) -> Self {
        assert!(!config.waves.is_empty(), "empty scenario");
        let wave = WaveState::begin(&config.waves[0]);
        Self {
            config,
            index: 0,
            cycle: 0,
            time_scale: 1.0,
            wave,
            complete: false,
        }
    }

    /// Index of the wave currently playing.
    #[must_use]
    pub const fn wave_index(&self) -> usize {
        self.index
    }

    /// Number of fully completed cycles.
    #[must_use]
    pub const fn cycle(&self) -> u32 {
        self.cycle
    }

    /// Multiplier applied to elapsed time; grows with every completed cycle.
    #[must_use]
    pub const fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Reports whether every cycle finished spawning.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Advances the scenario by `dt` seconds of game time.
    ///
    /// The elapsed time is scaled by the current time scale before reaching
    /// the active wave. Once complete, further calls emit nothing.
    pub fn progress(&mut self, dt: f32, out: &mut Vec<SpawnIntent>) -> ScenarioStatus {
        if self.complete {
            return ScenarioStatus::Complete;
        }

        let mut leftover = self
            .wave
            .progress(&self.config.waves[self.index], self.time_scale * dt, out);

        while let Some(remaining) = leftover {
            self.index += 1;
            if self.index >= self.config.waves.len() {
                self.cycle += 1;
                if self.config.cycles > 0 && self.cycle >= self.config.cycles {
                    debug!(cycles = self.cycle, "scenario complete");
                    self.complete = true;
                    return ScenarioStatus::Complete;
                }
                self.index = 0;
                self.time_scale += self.config.cycle_speed_up;
                debug!(
                    cycle = self.cycle,
                    time_scale = self.time_scale,
                    "scenario cycle restarted"
                );
            }

            let wave = &self.config.waves[self.index];
            self.wave = WaveState::begin(wave);
            leftover = self.wave.progress(wave, remaining, out);
        }

        ScenarioStatus::Running
    }
}
