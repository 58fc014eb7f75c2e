use tile_defense_core::{
    config::{
        AnimationConfig, EnemyConfig, EnemyTable, FloatRange, GameConfig, ScenarioConfig,
        SpawnSequenceConfig, WaveConfig,
    },
    BoardCommand, EnemyKind, Event, TileCoord, TowerKind, Vec3,
};
use tile_defense_session::Session;
use tile_defense_system_tower_combat::WarEntity;

const DT: f32 = 0.05;

/// One enemy every `cooldown` seconds, `amount` times, in a single wave.
fn single_sequence(amount: u32, cooldown: f32) -> ScenarioConfig {
    ScenarioConfig {
        waves: vec![WaveConfig {
            sequences: vec![SpawnSequenceConfig {
                kind: EnemyKind::Medium,
                amount,
                cooldown,
            }],
        }],
        cycles: 1,
        cycle_speed_up: 0.0,
    }
}

fn uniform_enemies(speed: f32, health: f32) -> EnemyTable {
    let config = EnemyConfig {
        scale: FloatRange::constant(1.0),
        speed: FloatRange::constant(speed),
        path_offset: FloatRange::constant(0.0),
        health: FloatRange::constant(health),
    };
    EnemyTable {
        small: config,
        medium: config,
        large: config,
    }
}

fn config(scenario: ScenarioConfig, enemies: EnemyTable, starting_player_health: u32) -> GameConfig {
    GameConfig {
        starting_player_health,
        enemies,
        animation: AnimationConfig {
            intro: 0.0,
            outro: 0.2,
            dying: 0.2,
            move_animation_speed: 1.0,
        },
        scenario,
        ..GameConfig::default()
    }
}

fn place(session: &mut Session, command: BoardCommand) {
    let mut events = Vec::new();
    session.apply(command, &mut events);
    assert!(
        matches!(events.as_slice(), [Event::ContentChanged { .. }]),
        "{command:?} rejected: {events:?}"
    );
}

/// Advances until `done` accepts the accumulated events.
fn run_until<F>(session: &mut Session, frames: usize, mut done: F) -> Vec<Event>
where
    F: FnMut(&[Event]) -> bool,
{
    let mut events = Vec::new();
    for _ in 0..frames {
        session.advance(DT, &mut events);
        if done(&events) {
            return events;
        }
    }
    panic!("condition not met after {frames} frames: {events:?}");
}

fn position_of(events: &[Event], wanted: impl Fn(&Event) -> bool) -> usize {
    events
        .iter()
        .position(wanted)
        .unwrap_or_else(|| panic!("event missing from {events:?}"))
}

#[test]
fn the_first_enemy_spawns_on_the_first_frame() {
    let mut session = Session::new(GameConfig::default()).expect("valid config");
    let mut events = Vec::new();
    session.advance(DT, &mut events);

    assert!(matches!(
        events.as_slice(),
        [Event::EnemySpawned {
            kind: EnemyKind::Medium,
            tile,
            ..
        }] if *tile == TileCoord::new(0, 0)
    ));
    assert_eq!(session.enemy_count(), 1);
}

#[test]
fn running_out_of_health_restarts_the_game() {
    let mut session = Session::new(config(
        single_sequence(1, 100.0),
        uniform_enemies(4.0, 100.0),
        1,
    ))
    .expect("valid config");

    let events = run_until(&mut session, 400, |events| events.contains(&Event::Defeat));

    let reached = position_of(&events, |event| {
        matches!(event, Event::EnemyReachedDestination { .. })
    });
    let defeat = position_of(&events, |event| *event == Event::Defeat);
    assert!(reached < defeat);
    assert_eq!(events.get(defeat + 1), Some(&Event::NewGame));
    assert!(
        matches!(events.get(defeat + 2), Some(Event::EnemySpawned { .. })),
        "new game spawns in the same frame: {events:?}"
    );
    assert_eq!(session.player_health(), 1);
    assert_eq!(session.enemy_count(), 1);
}

#[test]
fn zero_starting_health_disables_defeat() {
    let mut session = Session::new(config(
        single_sequence(3, 0.5),
        uniform_enemies(4.0, 100.0),
        0,
    ))
    .expect("valid config");

    let events = run_until(&mut session, 400, |events| events.contains(&Event::Victory));

    let reached = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyReachedDestination { .. }))
        .count();
    assert_eq!(reached, 3);
    assert!(!events.contains(&Event::Defeat));
}

#[test]
fn clearing_the_schedule_and_the_board_wins_the_game() {
    let mut session = Session::new(config(
        single_sequence(1, 0.5),
        uniform_enemies(4.0, 100.0),
        5,
    ))
    .expect("valid config");

    let events = run_until(&mut session, 400, |events| events.contains(&Event::Victory));

    let victory = position_of(&events, |event| *event == Event::Victory);
    let reached = position_of(&events, |event| {
        matches!(event, Event::EnemyReachedDestination { .. })
    });
    assert!(reached < victory);
    assert_eq!(events.get(victory + 1), Some(&Event::NewGame));
    assert!(matches!(
        events.get(victory + 2),
        Some(Event::EnemySpawned { .. })
    ));
    assert_eq!(session.player_health(), 5);
    assert!(!session.scenario().is_complete());
}

#[test]
fn lasers_defeat_enemies_walking_past() {
    let mut session = Session::new(config(
        single_sequence(1, 100.0),
        uniform_enemies(0.2, 5.0),
        0,
    ))
    .expect("valid config");
    place(
        &mut session,
        BoardCommand::ToggleTower {
            tile: TileCoord::new(1, 1),
            kind: TowerKind::Laser,
        },
    );
    let events = run_until(&mut session, 400, |events| {
        events
            .iter()
            .any(|event| matches!(event, Event::EnemyDefeated { .. }))
    });
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::EnemyReachedDestination { .. })));
    assert_eq!(session.enemy_count(), 1, "dying enemies stay until the clip ends");

    let mut events = Vec::new();
    for _ in 0..10 {
        session.advance(DT, &mut events);
    }
    assert_eq!(session.enemy_count(), 0);
}

#[test]
fn mortars_shell_enemies_in_range() {
    let mut session = Session::new(config(
        single_sequence(1, 100.0),
        uniform_enemies(0.2, 1000.0),
        0,
    ))
    .expect("valid config");
    place(
        &mut session,
        BoardCommand::ToggleTower {
            tile: TileCoord::new(2, 2),
            kind: TowerKind::Mortar,
        },
    );

    let mut events = Vec::new();
    let mut saw_shell = false;
    let mut saw_explosion = false;
    for _ in 0..200 {
        session.advance(DT, &mut events);
        for entity in session.war_entities() {
            match entity {
                WarEntity::Shell(shell) => {
                    saw_shell = true;
                    assert!(shell.position().y > 0.0, "landed shells are removed");
                }
                WarEntity::Explosion(_) => saw_explosion = true,
            }
        }
    }

    assert!(saw_shell, "mortar never fired");
    assert!(saw_explosion, "shells never exploded");
    let damaged = session.enemies().any(|enemy| enemy.health() < 1000.0);
    assert!(damaged, "blast never hit the enemy");
}

#[test]
fn pausing_freezes_every_entity() {
    let mut session = Session::new(GameConfig::default()).expect("valid config");
    let mut events = Vec::new();
    for _ in 0..40 {
        session.advance(DT, &mut events);
    }
    let positions: Vec<Vec3> = session.enemies().map(|enemy| enemy.position()).collect();
    let spawned = events.len();

    session.toggle_pause();
    assert!(session.is_paused());
    for _ in 0..40 {
        session.advance(DT, &mut events);
    }

    let frozen: Vec<Vec3> = session.enemies().map(|enemy| enemy.position()).collect();
    assert_eq!(positions, frozen);
    assert_eq!(events.len(), spawned);

    session.toggle_pause();
    session.advance(DT, &mut events);
    let resumed: Vec<Vec3> = session.enemies().map(|enemy| enemy.position()).collect();
    assert_ne!(positions, resumed);
}

#[test]
fn play_speed_scales_elapsed_time() {
    let game = || config(single_sequence(1, 100.0), uniform_enemies(1.0, 100.0), 0);
    let mut slow = Session::new(game()).expect("valid config");
    let mut fast = Session::new(game()).expect("valid config");
    fast.set_play_speed(2.0);

    let mut events = Vec::new();
    for _ in 0..20 {
        slow.advance(DT, &mut events);
    }
    for _ in 0..10 {
        fast.advance(DT, &mut events);
    }

    let slow_positions: Vec<Vec3> = slow.enemies().map(|enemy| enemy.position()).collect();
    let fast_positions: Vec<Vec3> = fast.enemies().map(|enemy| enemy.position()).collect();
    assert_eq!(slow_positions.len(), fast_positions.len());
    for (a, b) in slow_positions.iter().zip(&fast_positions) {
        assert!((*a - *b).length() < 1e-3, "{a:?} != {b:?}");
    }
}

#[test]
fn identical_seeds_replay_identically() {
    let run = || {
        let mut session = Session::new(GameConfig::default()).expect("valid config");
        place(
            &mut session,
            BoardCommand::ToggleTower {
                tile: TileCoord::new(2, 1),
                kind: TowerKind::Laser,
            },
        );
        place(
            &mut session,
            BoardCommand::ToggleTower {
                tile: TileCoord::new(4, 3),
                kind: TowerKind::Mortar,
            },
        );
        let mut events = Vec::new();
        for _ in 0..1200 {
            session.advance(1.0 / 30.0, &mut events);
        }
        let positions: Vec<Vec3> = session.enemies().map(|enemy| enemy.position()).collect();
        (events, positions, session.player_health())
    };

    assert_eq!(run(), run());
}
