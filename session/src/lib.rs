#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation context tying the board, the spawn schedule and every active
//! entity together.
//!
//! A [`Session`] owns one game. Each call to [`Session::advance`] runs a
//! frame in a fixed order: defeat and victory checks, spawning, enemies,
//! towers and finally shells and explosions. Enemies therefore see tower
//! damage from the previous frame, and destination hits are counted before
//! the next frame evaluates defeat.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tile_defense_core::{
    config::{ConfigError, GameConfig},
    BoardCommand, CombatCommand, Event, TileCoord, Vec3,
};
use tile_defense_lifecycle::{BehaviorCollection, PoolId, Pooled};
use tile_defense_system_movement::{Enemy, EnemyContext, EnemyFactory};
use tile_defense_system_spawning::{ScenarioState, ScenarioStatus, SpawnIntent};
use tile_defense_system_tower_combat::{TowerCombat, TowerFrame, WarContext, WarEntity, WarFactory};
use tile_defense_system_tower_targeting::{TargetIndex, TargetPoint};
use tile_defense_world::{self as world, Board};
use tracing::{info, trace};

const CONTENT_POOL: PoolId = PoolId::new(1);
const ENEMY_POOL: PoolId = PoolId::new(2);
const WAR_POOL: PoolId = PoolId::new(3);

/// Slowest and fastest permitted play speed.
const PLAY_SPEED_RANGE: (f32, f32) = (1.0, 10.0);

/// One running game.
#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    board: Board,
    scenario: ScenarioState,
    enemy_factory: EnemyFactory,
    war_factory: WarFactory,
    enemies: BehaviorCollection<Pooled<Enemy>>,
    non_enemies: BehaviorCollection<Pooled<WarEntity>>,
    combat: TowerCombat,
    targets: TargetIndex,
    rng: ChaCha8Rng,
    player_health: i64,
    play_speed: f32,
    paused: bool,
    intents: Vec<SpawnIntent>,
    commands: Vec<CombatCommand>,
}

impl Session {
    /// Validates `config` and starts a fresh game.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let session = Self {
            board: Board::new(config.board, CONTENT_POOL),
            scenario: ScenarioState::begin(config.scenario.clone()),
            enemy_factory: EnemyFactory::new(ENEMY_POOL, config.enemies, config.animation),
            war_factory: WarFactory::new(WAR_POOL, config.war.explosion_duration),
            enemies: BehaviorCollection::new(),
            non_enemies: BehaviorCollection::new(),
            combat: TowerCombat::new(&config.towers),
            targets: TargetIndex::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            player_health: i64::from(config.starting_player_health),
            play_speed: clamp_play_speed(config.play_speed),
            paused: false,
            intents: Vec::new(),
            commands: Vec::new(),
            config,
        };
        info!(
            columns = session.board.columns(),
            rows = session.board.rows(),
            seed = session.config.seed,
            "session started"
        );
        Ok(session)
    }

    /// Configuration the session was created with.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Board of the current game.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Spawn schedule of the current game.
    #[must_use]
    pub const fn scenario(&self) -> &ScenarioState {
        &self.scenario
    }

    /// Remaining player health; may drop below zero within a frame.
    #[must_use]
    pub const fn player_health(&self) -> i64 {
        self.player_health
    }

    /// Active enemies in unspecified order.
    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().map(|enemy| &**enemy)
    }

    /// Number of active enemies.
    #[must_use]
    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    /// Active shells and explosions in unspecified order.
    pub fn war_entities(&self) -> impl Iterator<Item = &WarEntity> {
        self.non_enemies.iter().map(|entity| &**entity)
    }

    /// Reports whether frames currently advance with zero elapsed time.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pauses a running session or resumes a paused one.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        info!(paused = self.paused, "pause toggled");
    }

    /// Time scale applied to frames while not paused.
    #[must_use]
    pub const fn play_speed(&self) -> f32 {
        self.play_speed
    }

    /// Changes the play speed, clamped to the permitted range.
    pub fn set_play_speed(&mut self, speed: f32) {
        self.play_speed = clamp_play_speed(speed);
    }

    /// Applies a board mutation requested by the input layer.
    pub fn apply(&mut self, command: BoardCommand, out_events: &mut Vec<Event>) {
        world::apply(&mut self.board, command, out_events);
    }

    /// Picks the tile hit by a ray and reports its coordinate.
    #[must_use]
    pub fn pick_tile(&self, origin: Vec3, direction: Vec3) -> Option<TileCoord> {
        self.board
            .tile_at_ray(origin, direction)
            .map(|index| self.board.tile(index).coord())
    }

    /// Discards every entity and resets the board, the schedule and the
    /// player's health.
    pub fn begin_new_game(&mut self, out_events: &mut Vec<Event>) {
        let enemy_factory = &mut self.enemy_factory;
        self.enemies.clear(|enemy| enemy_factory.reclaim(enemy));
        let war_factory = &mut self.war_factory;
        self.non_enemies.clear(|entity| war_factory.reclaim(entity));

        self.board.clear();
        self.scenario = ScenarioState::begin(self.config.scenario.clone());
        self.player_health = i64::from(self.config.starting_player_health);
        self.intents.clear();
        self.commands.clear();

        info!("new game");
        out_events.push(Event::NewGame);
    }

    /// Runs one frame of `dt` real seconds.
    pub fn advance(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let dt = if self.paused { 0.0 } else { dt * self.play_speed };

        if self.player_health <= 0 && self.config.starting_player_health > 0 {
            info!("defeat");
            out_events.push(Event::Defeat);
            self.begin_new_game(out_events);
        }

        let status = self.scenario.progress(dt, &mut self.intents);
        self.spawn_pending(out_events);
        if status == ScenarioStatus::Complete && self.enemies.is_empty() {
            info!("victory");
            out_events.push(Event::Victory);
            self.begin_new_game(out_events);
            let _ = self.scenario.progress(dt, &mut self.intents);
            self.spawn_pending(out_events);
        }

        self.update_enemies(dt, out_events);
        self.rebuild_targets();
        self.update_towers(dt);
        self.resolve_commands();
        self.update_war(dt);
        self.resolve_commands();
    }

    fn spawn_pending(&mut self, out_events: &mut Vec<Event>) {
        let count = self.board.spawn_point_count();
        for intent in self.intents.drain(..) {
            if count == 0 {
                continue;
            }
            let Some(tile) = self.board.spawn_point(self.rng.gen_range(0..count)) else {
                continue;
            };

            let mut enemy = self.enemy_factory.get(intent.kind, &mut self.rng);
            enemy.spawn_on(&self.board, tile);
            let coord = self.board.tile(tile).coord();
            trace!(enemy = enemy.id().get(), ?coord, "enemy spawned");
            out_events.push(Event::EnemySpawned {
                enemy: enemy.id(),
                kind: intent.kind,
                tile: coord,
            });
            self.enemies.add(enemy);
        }
    }

    fn update_enemies(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let first = out_events.len();
        let mut context = EnemyContext {
            dt,
            board: &self.board,
            events: &mut *out_events,
        };
        let factory = &mut self.enemy_factory;
        self.enemies
            .game_update(&mut context, |enemy| factory.reclaim(enemy));

        let reached = out_events[first..]
            .iter()
            .filter(|event| matches!(event, Event::EnemyReachedDestination { .. }))
            .count();
        self.player_health -= reached as i64;
    }

    fn rebuild_targets(&mut self) {
        self.targets.rebuild(
            self.enemies
                .iter()
                .enumerate()
                .filter(|(_, enemy)| enemy.is_valid_target())
                .map(|(slot, enemy)| TargetPoint {
                    slot,
                    enemy: enemy.id(),
                    position: enemy.position(),
                    scale: enemy.scale(),
                }),
        );
    }

    fn update_towers(&mut self, dt: f32) {
        let combat = &self.combat;
        let mut frame = TowerFrame {
            dt,
            targets: &mut self.targets,
            rng: &mut self.rng,
            commands: &mut self.commands,
        };
        self.board
            .game_update(|position, state| combat.update_tower(position, state, &mut frame));
    }

    fn update_war(&mut self, dt: f32) {
        let mut context = WarContext {
            dt,
            commands: &mut self.commands,
        };
        let factory = &mut self.war_factory;
        self.non_enemies
            .game_update(&mut context, |entity| factory.reclaim(entity));
    }

    fn resolve_commands(&mut self) {
        let mut commands = std::mem::take(&mut self.commands);
        for command in commands.drain(..) {
            match command {
                CombatCommand::ApplyDamage { enemy, amount } => {
                    let slot = self.targets.find(enemy).map(|target| target.slot);
                    self.damage_slot(slot, amount);
                }
                CombatCommand::LaunchShell {
                    launch_point,
                    target_point,
                    velocity,
                    blast_radius,
                    damage,
                } => {
                    let shell = self.war_factory.shell(
                        launch_point,
                        target_point,
                        velocity,
                        blast_radius,
                        damage,
                    );
                    self.non_enemies.add(shell);
                }
                CombatCommand::Detonate {
                    position,
                    blast_radius,
                    damage,
                } => {
                    if damage > 0.0 {
                        let hits = self.targets.fill_buffer(position, blast_radius);
                        for hit in 0..hits {
                            let slot = self.targets.buffered(hit).map(|target| target.slot);
                            self.damage_slot(slot, damage);
                        }
                    }
                    let explosion = self.war_factory.explosion(position, blast_radius);
                    self.non_enemies.add(explosion);
                }
            }
        }
        self.commands = commands;
    }

    fn damage_slot(&mut self, slot: Option<usize>, amount: f32) {
        if let Some(enemy) = slot.and_then(|slot| self.enemies.get_mut(slot)) {
            enemy.apply_damage(amount);
        }
    }
}

fn clamp_play_speed(speed: f32) -> f32 {
    speed.clamp(PLAY_SPEED_RANGE.0, PLAY_SPEED_RANGE.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_speed_is_clamped() {
        let mut session = Session::new(GameConfig::default()).expect("valid config");
        session.set_play_speed(25.0);
        assert_eq!(session.play_speed(), 10.0);
        session.set_play_speed(0.1);
        assert_eq!(session.play_speed(), 1.0);
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let mut config = GameConfig::default();
        config.scenario.waves.clear();
        assert_eq!(
            Session::new(config).map(|_| ()).expect_err("empty scenario"),
            ConfigError::EmptyScenario
        );
    }

    #[test]
    fn picking_maps_rays_to_tiles() {
        let session = Session::new(GameConfig::default()).expect("valid config");
        let picked = session.pick_tile(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(picked, Some(TileCoord::new(5, 5)));
    }
}
