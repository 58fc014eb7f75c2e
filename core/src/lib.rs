#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tile defense simulation.
//!
//! This crate defines the vocabulary that connects the board, the pure
//! systems and the session orchestrator. Adapters submit [`BoardCommand`]
//! values describing desired board mutations, towers emit [`CombatCommand`]
//! values describing damage and projectiles, and everything that happened is
//! broadcast as [`Event`] values. Configuration tables live in [`config`].

pub mod config;

pub use glam::Vec3;

use serde::{Deserialize, Serialize};

/// Location of a single board tile expressed as column and row coordinates.
///
/// Columns grow toward world `+x` (east) and rows grow toward world `+z`
/// (north).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Cardinal directions in which an enemy leaves a tile.
///
/// The discriminant order is load-bearing: turning right advances by one,
/// turning left retreats by one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward increasing rows (world `+z`).
    #[default]
    North,
    /// Movement toward increasing columns (world `+x`).
    East,
    /// Movement toward decreasing rows (world `-z`).
    South,
    /// Movement toward decreasing columns (world `-x`).
    West,
}

impl Direction {
    const fn index(self) -> u8 {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// Heading of the direction in degrees, clockwise from north.
    #[must_use]
    pub fn angle(self) -> f32 {
        f32::from(self.index()) * 90.0
    }

    /// Offset from a tile center to the midpoint of the edge facing this direction.
    #[must_use]
    pub fn half_vector(self) -> Vec3 {
        match self {
            Self::North => Vec3::new(0.0, 0.0, 0.5),
            Self::East => Vec3::new(0.5, 0.0, 0.0),
            Self::South => Vec3::new(0.0, 0.0, -0.5),
            Self::West => Vec3::new(-0.5, 0.0, 0.0),
        }
    }

    /// Classifies the turn required to go from `self` to `next`.
    #[must_use]
    pub fn change_to(self, next: Direction) -> DirectionChange {
        let delta = (4 + next.index() - self.index()) % 4;
        match delta {
            0 => DirectionChange::None,
            1 => DirectionChange::TurnRight,
            3 => DirectionChange::TurnLeft,
            _ => DirectionChange::TurnAround,
        }
    }
}

/// Turn classification between two successive path directions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DirectionChange {
    /// Keeps moving straight ahead.
    #[default]
    None,
    /// Quarter turn clockwise.
    TurnRight,
    /// Quarter turn counter-clockwise.
    TurnLeft,
    /// Half turn reversing the heading.
    TurnAround,
}

/// Unique identifier assigned to an enemy; doubles as the tower target handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Enemy archetypes, each with its own configured attribute ranges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Small and usually quick enemies.
    Small,
    /// Baseline enemy.
    #[default]
    Medium,
    /// Large and sturdy enemies.
    Large,
}

/// Types of towers that can be constructed on the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Continuous beam applying damage every frame to a tracked target.
    #[default]
    Laser,
    /// Lobs shells that explode on impact and damage an area.
    Mortar,
}

/// Kind of occupant held by a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Nothing; freely traversable.
    Empty,
    /// Goal that enemies walk toward.
    Destination,
    /// Obstacle that blocks paths.
    Wall,
    /// Tile where enemies enter the board.
    SpawnPoint,
    /// Defensive tower; blocks paths like a wall.
    Tower(TowerKind),
}

impl ContentKind {
    /// Reports whether the content prevents enemies from crossing the tile.
    #[must_use]
    pub const fn blocks_path(self) -> bool {
        matches!(self, Self::Wall | Self::Tower(_))
    }
}

/// Mutable per-tower state carried by tower content on the board.
#[derive(Clone, Debug, PartialEq)]
pub enum TowerState {
    /// State of a laser tower.
    Laser(LaserState),
    /// State of a mortar tower.
    Mortar(MortarState),
}

impl TowerState {
    /// Creates fresh state for a newly built tower of the provided kind.
    #[must_use]
    pub const fn new(kind: TowerKind) -> Self {
        match kind {
            TowerKind::Laser => Self::Laser(LaserState { target: None }),
            TowerKind::Mortar => Self::Mortar(MortarState {
                launch_progress: 0.0,
            }),
        }
    }

    /// Kind of tower the state belongs to.
    #[must_use]
    pub const fn kind(&self) -> TowerKind {
        match self {
            Self::Laser(_) => TowerKind::Laser,
            Self::Mortar(_) => TowerKind::Mortar,
        }
    }
}

/// Laser tower state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LaserState {
    /// Enemy currently tracked by the beam, re-validated every frame.
    pub target: Option<EnemyId>,
}

/// Mortar tower state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MortarState {
    /// Accumulated fraction of the next shot; a shot fires at `1.0`.
    pub launch_progress: f32,
}

/// Board mutations requested by the input layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoardCommand {
    /// Places a wall on an empty tile or removes an existing wall.
    ToggleWall {
        /// Tile targeted by the toggle.
        tile: TileCoord,
    },
    /// Places, swaps or removes a tower of the provided kind.
    ToggleTower {
        /// Tile targeted by the toggle.
        tile: TileCoord,
        /// Kind of tower requested.
        kind: TowerKind,
    },
    /// Places a destination on an empty tile or removes an existing one.
    ToggleDestination {
        /// Tile targeted by the toggle.
        tile: TileCoord,
    },
    /// Places a spawn point on an empty tile or removes an existing one.
    ToggleSpawnPoint {
        /// Tile targeted by the toggle.
        tile: TileCoord,
    },
}

/// Combat requests emitted by towers and projectiles during a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CombatCommand {
    /// Applies damage to a single tracked enemy.
    ApplyDamage {
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Non-negative damage amount.
        amount: f32,
    },
    /// Launches a shell along a ballistic trajectory.
    LaunchShell {
        /// World position the shell departs from.
        launch_point: Vec3,
        /// Ground-level point the shell was aimed at.
        target_point: Vec3,
        /// Initial velocity of the shell.
        velocity: Vec3,
        /// Radius of the blast on impact.
        blast_radius: f32,
        /// Damage dealt to every target within the blast.
        damage: f32,
    },
    /// Creates an explosion, applying area damage when `damage` is positive.
    Detonate {
        /// Center of the explosion.
        position: Vec3,
        /// Radius of the explosion.
        blast_radius: f32,
        /// Damage applied once to every valid target within the radius.
        damage: f32,
    },
}

/// Reasons a board mutation may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    /// The tile lies outside the board.
    OutOfBounds,
    /// The tile holds content the toggle does not apply to.
    Occupied,
    /// The mutation would leave a tile without a path to a destination.
    PathBlocked,
    /// The board must keep at least one spawn point.
    LastSpawnPoint,
    /// The tile has no path to a destination.
    Unreachable,
}

/// Events broadcast after processing commands and frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a tile's content was replaced.
    ContentChanged {
        /// Tile whose content changed.
        tile: TileCoord,
        /// Content now held by the tile.
        content: ContentKind,
    },
    /// Reports that a board mutation was rejected and the board left unchanged.
    MutationRejected {
        /// Tile targeted by the mutation.
        tile: TileCoord,
        /// Content the mutation attempted to place.
        requested: ContentKind,
        /// Specific reason the mutation failed.
        reason: RejectionReason,
    },
    /// Confirms that an enemy entered the board.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Spawn point the enemy entered from.
        tile: TileCoord,
    },
    /// An enemy walked off a destination tile; the player loses health.
    EnemyReachedDestination {
        /// Enemy that reached the destination.
        enemy: EnemyId,
    },
    /// An enemy ran out of health and began its dying outro.
    EnemyDefeated {
        /// Enemy that was defeated.
        enemy: EnemyId,
    },
    /// The scenario completed and no enemies remain.
    Victory,
    /// The player ran out of health.
    Defeat,
    /// The session was reset to a fresh board and scenario.
    NewGame,
}
