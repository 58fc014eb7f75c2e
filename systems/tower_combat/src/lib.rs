#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tower firing behavior, mortar ballistics and the entities they spawn.
//!
//! Towers never touch enemies directly: every frame they emit
//! [`CombatCommand`] values that the session resolves against the frame's
//! target index.

pub mod ballistics;
mod war;

use rand::Rng;
use tile_defense_core::{
    config::{LaserConfig, MortarConfig, TowerTable},
    CombatCommand, LaserState, MortarState, TowerState, Vec3,
};
use tile_defense_system_tower_targeting::{
    acquire_target, track_target, TargetIndex, TargetPoint,
};
use tracing::error;

pub use ballistics::BallisticsError;
pub use war::{Explosion, Shell, WarContext, WarEntity, WarFactory};

/// Progress a mortar holds while no target is in range, ready to fire the
/// moment one appears.
const MORTAR_IDLE_PROGRESS: f32 = 0.999;

/// Per-frame inputs shared by every tower update.
#[derive(Debug)]
pub struct TowerFrame<'a, R: ?Sized> {
    /// Scaled frame time in seconds.
    pub dt: f32,
    /// Targets valid during this frame.
    pub targets: &'a mut TargetIndex,
    /// Random source used to pick among targets in range.
    pub rng: &'a mut R,
    /// Receives damage and shell launches.
    pub commands: &'a mut Vec<CombatCommand>,
}

/// Drives laser and mortar towers.
#[derive(Clone, Copy, Debug)]
pub struct TowerCombat {
    laser: LaserConfig,
    mortar: MortarConfig,
    mortar_launch_speed: f32,
}

impl TowerCombat {
    /// Creates the system from the tower configuration.
    ///
    /// The mortar launch speed is derived once so that every target within
    /// the mortar's range is reachable.
    #[must_use]
    pub fn new(towers: &TowerTable) -> Self {
        Self {
            laser: towers.laser,
            mortar: towers.mortar,
            mortar_launch_speed: ballistics::launch_speed(
                towers.mortar.targeting_range,
                towers.mortar.launch_height,
            ),
        }
    }

    /// Launch speed shared by every mortar shell.
    #[must_use]
    pub const fn mortar_launch_speed(&self) -> f32 {
        self.mortar_launch_speed
    }

    /// Advances the tower standing at `position` by one frame.
    pub fn update_tower<R>(&self, position: Vec3, state: &mut TowerState, frame: &mut TowerFrame<'_, R>)
    where
        R: Rng + ?Sized,
    {
        match state {
            TowerState::Laser(laser) => self.update_laser(position, laser, frame),
            TowerState::Mortar(mortar) => self.update_mortar(position, mortar, frame),
        }
    }

    fn update_laser<R>(&self, position: Vec3, state: &mut LaserState, frame: &mut TowerFrame<'_, R>)
    where
        R: Rng + ?Sized,
    {
        let range = self.laser.targeting_range;
        let target = track_target(frame.targets, position, range, &mut state.target)
            .or_else(|| acquire_target(frame.targets, position, range, frame.rng));

        state.target = target.map(|point| point.enemy);
        if let Some(point) = target {
            frame.commands.push(CombatCommand::ApplyDamage {
                enemy: point.enemy,
                amount: self.laser.damage_per_second * frame.dt,
            });
        }
    }

    fn update_mortar<R>(&self, position: Vec3, state: &mut MortarState, frame: &mut TowerFrame<'_, R>)
    where
        R: Rng + ?Sized,
    {
        state.launch_progress += self.mortar.shots_per_second * frame.dt;

        while state.launch_progress >= 1.0 {
            let target = acquire_target(
                frame.targets,
                position,
                self.mortar.targeting_range,
                frame.rng,
            );
            match target {
                Some(point) => {
                    self.launch(position, &point, frame.commands);
                    state.launch_progress -= 1.0;
                }
                None => state.launch_progress = MORTAR_IDLE_PROGRESS,
            }
        }
    }

    fn launch(&self, position: Vec3, target: &TargetPoint, out: &mut Vec<CombatCommand>) {
        let launch_point = position + Vec3::new(0.0, self.mortar.launch_height, 0.0);
        let target_point = Vec3::new(target.position.x, 0.0, target.position.z);

        match ballistics::solve_launch_velocity(launch_point, target_point, self.mortar_launch_speed)
        {
            Ok(velocity) => out.push(CombatCommand::LaunchShell {
                launch_point,
                target_point,
                velocity,
                blast_radius: self.mortar.shell_blast_radius,
                damage: self.mortar.shell_damage,
            }),
            Err(err) => {
                error!(%err, "mortar shot skipped");
                debug_assert!(false, "mortar launch speed insufficient for range: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tile_defense_core::{EnemyId, TowerKind};

    fn target(slot: usize, x: f32, z: f32) -> TargetPoint {
        TargetPoint {
            slot,
            enemy: EnemyId::new(slot as u32),
            position: Vec3::new(x, 0.0, z),
            scale: 1.0,
        }
    }

    fn run(
        combat: &TowerCombat,
        state: &mut TowerState,
        targets: &mut TargetIndex,
        dt: f32,
    ) -> Vec<CombatCommand> {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut commands = Vec::new();
        let mut frame = TowerFrame {
            dt,
            targets,
            rng: &mut rng,
            commands: &mut commands,
        };
        combat.update_tower(Vec3::ZERO, state, &mut frame);
        commands
    }

    #[test]
    fn lasers_burn_their_target_every_frame() {
        let combat = TowerCombat::new(&TowerTable::default());
        let mut targets = TargetIndex::new();
        targets.rebuild([target(0, 1.0, 0.0)]);
        let mut state = TowerState::new(TowerKind::Laser);

        let commands = run(&combat, &mut state, &mut targets, 0.5);
        assert_eq!(
            commands,
            vec![CombatCommand::ApplyDamage {
                enemy: EnemyId::new(0),
                amount: 5.0,
            }]
        );
        assert_eq!(
            state,
            TowerState::Laser(LaserState {
                target: Some(EnemyId::new(0))
            })
        );

        targets.rebuild([]);
        assert!(run(&combat, &mut state, &mut targets, 0.5).is_empty());
        assert_eq!(state, TowerState::new(TowerKind::Laser));
    }

    #[test]
    fn mortars_wait_at_the_ready_without_targets() {
        let combat = TowerCombat::new(&TowerTable::default());
        let mut targets = TargetIndex::new();
        let mut state = TowerState::new(TowerKind::Mortar);

        assert!(run(&combat, &mut state, &mut targets, 3.0).is_empty());
        assert_eq!(
            state,
            TowerState::Mortar(MortarState {
                launch_progress: MORTAR_IDLE_PROGRESS
            })
        );

        targets.rebuild([target(0, 2.0, 1.0)]);
        let commands = run(&combat, &mut state, &mut targets, 0.01);
        assert_eq!(commands.len(), 1);
        match commands[0] {
            CombatCommand::LaunchShell {
                launch_point,
                target_point,
                velocity,
                ..
            } => {
                assert_eq!(launch_point, Vec3::new(0.0, 0.75, 0.0));
                assert_eq!(target_point, Vec3::new(2.0, 0.0, 1.0));
                assert!((velocity.length() - combat.mortar_launch_speed()).abs() < 1e-3);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn mortars_fire_once_per_accumulated_shot() {
        let combat = TowerCombat::new(&TowerTable::default());
        let mut targets = TargetIndex::new();
        targets.rebuild([target(0, 3.0, 0.0), target(1, -1.0, -1.0)]);
        let mut state = TowerState::new(TowerKind::Mortar);

        let commands = run(&combat, &mut state, &mut targets, 2.5);
        assert_eq!(commands.len(), 2);
        assert!(commands
            .iter()
            .all(|command| matches!(command, CombatCommand::LaunchShell { .. })));
        match state {
            TowerState::Mortar(mortar) => assert!((mortar.launch_progress - 0.5).abs() < 1e-6),
            TowerState::Laser(_) => panic!("tower changed kind"),
        }
    }
}
