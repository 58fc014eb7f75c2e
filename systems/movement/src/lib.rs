#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemies following the board's shortest paths.
//!
//! Every enemy walks from its spawn point toward a destination one tile
//! segment at a time. Straight segments interpolate the position between two
//! edge midpoints, turning segments rotate the heading around a pivot on a
//! tile corner. The lateral path offset keeps each enemy in its own lane.

mod animator;

use std::f32::consts::PI;

use rand::Rng;
use tile_defense_core::{
    config::{AnimationConfig, EnemyTable},
    Direction, DirectionChange, EnemyId, EnemyKind, Event, Vec3,
};
use tile_defense_lifecycle::{GameBehavior, Pool, PoolId, Pooled};
use tile_defense_world::{Board, TileIndex};
use tracing::trace;

pub use animator::{Clip, EnemyAnimator};

/// Smallest lane radius used for about-face turns.
const MIN_TURN_AROUND_RADIUS: f32 = 0.2;

/// Smallest arc radius used to time quarter turns; keeps edge lanes finite.
const MIN_QUARTER_TURN_RADIUS: f32 = 0.05;

/// Frame state shared by every enemy during one update pass.
#[derive(Debug)]
pub struct EnemyContext<'a> {
    /// Scaled frame time in seconds.
    pub dt: f32,
    /// Board whose paths the enemies follow.
    pub board: &'a Board,
    /// Receives destination and defeat notifications.
    pub events: &'a mut Vec<Event>,
}

/// Enemy walking the board.
#[derive(Clone, Debug)]
pub struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    scale: f32,
    speed: f32,
    path_offset: f32,
    health: f32,
    move_animation_speed: f32,
    animator: EnemyAnimator,
    tile_from: Option<TileIndex>,
    tile_to: Option<TileIndex>,
    position_from: Vec3,
    position_to: Vec3,
    direction: Direction,
    direction_change: DirectionChange,
    angle_from: f32,
    angle_to: f32,
    progress: f32,
    progress_factor: f32,
    pivot: Vec3,
    angle: f32,
    model_offset: f32,
}

impl Enemy {
    /// Identifier of the enemy, used by towers as the target handle.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Archetype of the enemy.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Uniform scale of the enemy model.
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// Tiles per second covered on straight segments.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Lateral lane offset in `[-0.5, 0.5]`.
    #[must_use]
    pub const fn path_offset(&self) -> f32 {
        self.path_offset
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Presentation phase tracker.
    #[must_use]
    pub const fn animator(&self) -> &EnemyAnimator {
        &self.animator
    }

    /// Tile the enemy is currently crossing.
    #[must_use]
    pub const fn tile(&self) -> Option<TileIndex> {
        self.tile_from
    }

    /// Interpolation progress through the current segment.
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Turn performed on the current segment.
    #[must_use]
    pub const fn direction_change(&self) -> DirectionChange {
        self.direction_change
    }

    /// Heading in degrees, clockwise from north.
    #[must_use]
    pub const fn heading(&self) -> f32 {
        self.angle
    }

    /// World position of the enemy model including its lane offset.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        let radians = self.angle.to_radians();
        let right = Vec3::new(radians.cos(), 0.0, -radians.sin());
        self.pivot + right * self.model_offset
    }

    /// Reports whether towers may target the enemy.
    #[must_use]
    pub fn is_valid_target(&self) -> bool {
        self.animator.current_clip() == Clip::Move
    }

    /// Subtracts `damage` from the enemy's health.
    pub fn apply_damage(&mut self, damage: f32) {
        debug_assert!(damage >= 0.0, "negative damage applied");
        self.health -= damage;
    }

    /// Places the enemy on `tile` and prepares the walk toward its next hop.
    pub fn spawn_on(&mut self, board: &Board, tile: TileIndex) {
        let next = board.tile(tile).next_on_path();
        debug_assert!(next.is_some(), "spawn tile has nowhere to go");

        self.tile_from = Some(tile);
        self.tile_to = next;
        self.progress = 0.0;
        self.prepare_intro(board);
    }

    fn prepare_next_state(&mut self, board: &Board) {
        self.tile_from = self.tile_to;
        let Some(from) = self.tile_from else {
            return;
        };
        let tile = board.tile(from);
        self.tile_to = tile.next_on_path();
        self.position_from = self.position_to;

        if self.tile_to.is_none() {
            self.prepare_outro(board, from);
            return;
        }

        self.position_to = tile.exit_point();
        self.direction_change = self.direction.change_to(tile.path_direction());
        self.direction = tile.path_direction();
        self.angle_from = self.angle_to;

        match self.direction_change {
            DirectionChange::None => self.prepare_forward(),
            DirectionChange::TurnRight => self.prepare_turn_right(),
            DirectionChange::TurnLeft => self.prepare_turn_left(),
            DirectionChange::TurnAround => self.prepare_turn_around(),
        }
    }

    fn prepare_intro(&mut self, board: &Board) {
        let Some(from) = self.tile_from else {
            return;
        };
        let tile = board.tile(from);
        self.position_from = tile.position();
        self.position_to = tile.exit_point();
        self.pivot = self.position_from;

        self.direction = tile.path_direction();
        self.direction_change = DirectionChange::None;
        self.angle_from = self.direction.angle();
        self.angle_to = self.angle_from;
        self.angle = self.angle_from;
        self.model_offset = self.path_offset;
        self.progress_factor = 2.0 * self.speed;
    }

    fn prepare_outro(&mut self, board: &Board, destination: TileIndex) {
        self.position_to = board.tile(destination).position();
        self.direction_change = DirectionChange::None;
        self.angle_to = self.direction.angle();
        self.angle = self.angle_to;
        self.model_offset = self.path_offset;
        self.progress_factor = 2.0 * self.speed;
    }

    fn prepare_forward(&mut self) {
        self.angle_to = self.direction.angle();
        self.angle = self.angle_to;
        self.model_offset = self.path_offset;
        self.progress_factor = self.speed;
    }

    fn prepare_turn_right(&mut self) {
        self.angle_to = self.angle_from + 90.0;
        self.model_offset = self.path_offset - 0.5;
        self.pivot = self.position_from + self.direction.half_vector();
        self.progress_factor = self.quarter_turn_factor();
    }

    fn prepare_turn_left(&mut self) {
        self.angle_to = self.angle_from - 90.0;
        self.model_offset = self.path_offset + 0.5;
        self.pivot = self.position_from + self.direction.half_vector();
        self.progress_factor = self.quarter_turn_factor();
    }

    fn quarter_turn_factor(&self) -> f32 {
        let radius = (0.5 - self.path_offset).max(MIN_QUARTER_TURN_RADIUS);
        self.speed / (PI * 0.5 * radius)
    }

    fn prepare_turn_around(&mut self) {
        let sweep = if self.path_offset < 0.0 { 180.0 } else { -180.0 };
        self.angle_to = self.angle_from + sweep;
        self.model_offset = self.path_offset;
        self.pivot = self.position_from;
        self.progress_factor =
            self.speed / (PI * self.path_offset.abs().max(MIN_TURN_AROUND_RADIUS));
    }

    fn apply_transform(&mut self) {
        if self.direction_change == DirectionChange::None {
            self.pivot = self.position_from.lerp(self.position_to, self.progress);
        } else {
            self.angle = self.angle_from + (self.angle_to - self.angle_from) * self.progress;
        }
    }
}

impl GameBehavior<EnemyContext<'_>> for Enemy {
    fn game_update(&mut self, context: &mut EnemyContext<'_>) -> bool {
        self.animator.game_update(context.dt);

        match self.animator.current_clip() {
            Clip::Intro => {
                if !self.animator.is_done() {
                    return true;
                }
                self.animator
                    .play_move(self.move_animation_speed * self.speed / self.scale);
            }
            Clip::Outro | Clip::Dying => return !self.animator.is_done(),
            Clip::Move => {}
        }

        if self.health <= 0.0 {
            self.animator.play_dying();
            context.events.push(Event::EnemyDefeated { enemy: self.id });
            return true;
        }

        self.progress += context.dt * self.progress_factor;
        while self.progress >= 1.0 {
            if self.tile_to.is_none() {
                context
                    .events
                    .push(Event::EnemyReachedDestination { enemy: self.id });
                self.animator.play_outro();
                return true;
            }

            self.progress = (self.progress - 1.0) / self.progress_factor;
            self.prepare_next_state(context.board);
            self.progress *= self.progress_factor;
        }

        self.apply_transform();
        true
    }
}

/// Creates enemies with attributes sampled from the configured ranges.
#[derive(Debug)]
pub struct EnemyFactory {
    pool: Pool<Enemy>,
    table: EnemyTable,
    animation: AnimationConfig,
    next_id: u32,
}

impl EnemyFactory {
    /// Creates a factory whose enemies are stamped with `id`.
    #[must_use]
    pub const fn new(id: PoolId, table: EnemyTable, animation: AnimationConfig) -> Self {
        Self {
            pool: Pool::new(id),
            table,
            animation,
            next_id: 0,
        }
    }

    /// Number of enemies handed out and not yet reclaimed.
    #[must_use]
    pub const fn outstanding(&self) -> usize {
        self.pool.outstanding()
    }

    /// Creates an enemy of the provided kind playing its intro.
    ///
    /// Scale, speed, path offset and health are drawn in that order.
    pub fn get<R: Rng + ?Sized>(&mut self, kind: EnemyKind, rng: &mut R) -> Pooled<Enemy> {
        let config = self.table.get(kind);
        let scale = config.scale.sample(rng);
        let speed = config.speed.sample(rng);
        let path_offset = config.path_offset.sample(rng);
        let health = config.health.sample(rng);

        let id = EnemyId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        trace!(enemy = id.get(), ?kind, scale, speed, path_offset, health, "enemy created");

        let mut animator = EnemyAnimator::new(&self.animation);
        animator.play_intro();
        self.pool.acquire(Enemy {
            id,
            kind,
            scale,
            speed,
            path_offset,
            health,
            move_animation_speed: self.animation.move_animation_speed,
            animator,
            tile_from: None,
            tile_to: None,
            position_from: Vec3::ZERO,
            position_to: Vec3::ZERO,
            direction: Direction::North,
            direction_change: DirectionChange::None,
            angle_from: 0.0,
            angle_to: 0.0,
            progress: 0.0,
            progress_factor: 2.0 * speed,
            pivot: Vec3::ZERO,
            angle: 0.0,
            model_offset: path_offset,
        })
    }

    /// Destroys an enemy created by this factory.
    ///
    /// # Panics
    ///
    /// Panics when the enemy originates from another factory.
    pub fn reclaim(&mut self, enemy: Pooled<Enemy>) {
        self.pool.reclaim(enemy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tile_defense_core::config::{EnemyConfig, FloatRange};

    fn table() -> EnemyTable {
        let config = EnemyConfig {
            scale: FloatRange::new(0.5, 2.0),
            speed: FloatRange::new(0.5, 3.0),
            path_offset: FloatRange::new(-0.4, 0.4),
            health: FloatRange::new(10.0, 100.0),
        };
        EnemyTable {
            small: config,
            medium: config,
            large: config,
        }
    }

    #[test]
    fn factory_samples_within_configured_ranges() {
        let mut factory = EnemyFactory::new(PoolId::new(2), table(), AnimationConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        for expected in 0..20 {
            let enemy = factory.get(EnemyKind::Small, &mut rng);
            assert_eq!(enemy.id(), EnemyId::new(expected));
            assert!((0.5..=2.0).contains(&enemy.scale()));
            assert!((0.5..=3.0).contains(&enemy.speed()));
            assert!((-0.4..=0.4).contains(&enemy.path_offset()));
            assert!((10.0..=100.0).contains(&enemy.health()));
            assert_eq!(enemy.animator().current_clip(), Clip::Intro);
            assert!(!enemy.is_valid_target());
            factory.reclaim(enemy);
        }
        assert_eq!(factory.outstanding(), 0);
    }

    #[test]
    fn lane_offset_is_measured_to_the_right_of_the_heading() {
        let mut factory = EnemyFactory::new(PoolId::new(2), table(), AnimationConfig::default());
        let mut enemy = factory.get(EnemyKind::Medium, &mut ChaCha8Rng::seed_from_u64(1));
        enemy.pivot = Vec3::ZERO;
        enemy.model_offset = 0.25;

        enemy.angle = Direction::North.angle();
        assert!((enemy.position() - Vec3::new(0.25, 0.0, 0.0)).length() < 1e-6);
        enemy.angle = Direction::East.angle();
        assert!((enemy.position() - Vec3::new(0.0, 0.0, -0.25)).length() < 1e-6);
        enemy.angle = Direction::West.angle();
        assert!((enemy.position() - Vec3::new(0.0, 0.0, 0.25)).length() < 1e-6);
        factory.reclaim(enemy);
    }
}
