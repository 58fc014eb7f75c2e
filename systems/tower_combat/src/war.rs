//! Shells and explosions living outside the board.

use tile_defense_core::{CombatCommand, Vec3};
use tile_defense_lifecycle::{GameBehavior, Pool, PoolId, Pooled};

use crate::ballistics;

/// Radius of the small puffs trailing a shell in flight.
const TRAIL_RADIUS: f32 = 0.1;

/// Frame state shared by every war entity during one update pass.
#[derive(Debug)]
pub struct WarContext<'a> {
    /// Scaled frame time in seconds.
    pub dt: f32,
    /// Receives detonations to resolve once the pass completes.
    pub commands: &'a mut Vec<CombatCommand>,
}

/// Mortar shell flying along a ballistic arc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shell {
    launch_point: Vec3,
    target_point: Vec3,
    velocity: Vec3,
    blast_radius: f32,
    damage: f32,
    age: f32,
    position: Vec3,
}

impl Shell {
    /// Current world position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Direction of flight at the current age.
    #[must_use]
    pub fn heading(&self) -> Vec3 {
        ballistics::velocity_at(self.velocity, self.age)
    }

    /// Point the shell was aimed at; the blast is centered here.
    #[must_use]
    pub const fn target_point(&self) -> Vec3 {
        self.target_point
    }

    fn game_update(&mut self, context: &mut WarContext<'_>) -> bool {
        self.age += context.dt;
        let position = ballistics::position_at(self.launch_point, self.velocity, self.age);

        if position.y <= 0.0 {
            context.commands.push(CombatCommand::Detonate {
                position: self.target_point,
                blast_radius: self.blast_radius,
                damage: self.damage,
            });
            return false;
        }

        self.position = position;
        context.commands.push(CombatCommand::Detonate {
            position,
            blast_radius: TRAIL_RADIUS,
            damage: 0.0,
        });
        true
    }
}

/// Short-lived blast effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Explosion {
    position: Vec3,
    blast_radius: f32,
    age: f32,
    duration: f32,
}

impl Explosion {
    /// Center of the blast.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Visual diameter of the blast at full size.
    #[must_use]
    pub fn scale(&self) -> f32 {
        2.0 * self.blast_radius
    }

    /// Normalized age; reaches 1 at expiry.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration > 0.0 {
            self.age / self.duration
        } else {
            1.0
        }
    }

    fn game_update(&mut self, context: &mut WarContext<'_>) -> bool {
        self.age += context.dt;
        self.age < self.duration
    }
}

/// Entity updated alongside the board but not targetable by towers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WarEntity {
    /// Shell in flight.
    Shell(Shell),
    /// Fading explosion.
    Explosion(Explosion),
}

impl GameBehavior<WarContext<'_>> for WarEntity {
    fn game_update(&mut self, context: &mut WarContext<'_>) -> bool {
        match self {
            Self::Shell(shell) => shell.game_update(context),
            Self::Explosion(explosion) => explosion.game_update(context),
        }
    }
}

/// Creates shells and explosions.
#[derive(Debug)]
pub struct WarFactory {
    pool: Pool<WarEntity>,
    explosion_duration: f32,
}

impl WarFactory {
    /// Creates a factory whose entities are stamped with `id`.
    #[must_use]
    pub const fn new(id: PoolId, explosion_duration: f32) -> Self {
        Self {
            pool: Pool::new(id),
            explosion_duration,
        }
    }

    /// Number of entities handed out and not yet reclaimed.
    #[must_use]
    pub const fn outstanding(&self) -> usize {
        self.pool.outstanding()
    }

    /// Creates a shell leaving `launch_point` with `velocity`.
    pub fn shell(
        &mut self,
        launch_point: Vec3,
        target_point: Vec3,
        velocity: Vec3,
        blast_radius: f32,
        damage: f32,
    ) -> Pooled<WarEntity> {
        self.pool.acquire(WarEntity::Shell(Shell {
            launch_point,
            target_point,
            velocity,
            blast_radius,
            damage,
            age: 0.0,
            position: launch_point,
        }))
    }

    /// Creates an explosion centered on `position`.
    pub fn explosion(&mut self, position: Vec3, blast_radius: f32) -> Pooled<WarEntity> {
        self.pool.acquire(WarEntity::Explosion(Explosion {
            position,
            blast_radius,
            age: 0.0,
            duration: self.explosion_duration,
        }))
    }

    /// Destroys an entity created by this factory.
    ///
    /// # Panics
    ///
    /// Panics when the entity originates from another factory.
    pub fn reclaim(&mut self, entity: Pooled<WarEntity>) {
        self.pool.reclaim(entity);
    }
}
