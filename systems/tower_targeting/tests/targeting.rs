use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tile_defense_core::{EnemyId, Vec3};
use tile_defense_system_tower_targeting::{acquire_target, track_target, TargetIndex, TargetPoint};

fn ring(count: usize) -> Vec<TargetPoint> {
    (0..count)
        .map(|slot| {
            let angle = slot as f32 / count as f32 * std::f32::consts::TAU;
            TargetPoint {
                slot,
                enemy: EnemyId::new(100 + slot as u32),
                position: Vec3::new(angle.cos(), 0.0, angle.sin()),
                scale: 1.0,
            }
        })
        .collect()
}

fn replay(seed: u64) -> Vec<EnemyId> {
    let mut index = TargetIndex::new();
    index.rebuild(ring(12));
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..32)
        .filter_map(|_| acquire_target(&mut index, Vec3::ZERO, 1.5, &mut rng))
        .map(|target| target.enemy)
        .collect()
}

#[test]
fn acquisition_replays_identically_for_a_seed() {
    let first = replay(0x5eed);
    assert_eq!(first.len(), 32);
    assert_eq!(first, replay(0x5eed));
}

#[test]
fn towers_keep_their_target_until_it_escapes() {
    let mut index = TargetIndex::new();
    index.rebuild(ring(4));
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let tower = Vec3::new(1.0, 0.0, 0.0);

    let acquired = acquire_target(&mut index, tower, 0.5, &mut rng).expect("enemy beside tower");
    assert_eq!(acquired.enemy, EnemyId::new(100));

    let mut target = Some(acquired.enemy);
    for _ in 0..5 {
        let tracked = track_target(&index, tower, 0.5, &mut target).expect("still in range");
        assert_eq!(tracked.slot, acquired.slot);
    }

    let moved: Vec<_> = ring(4)
        .into_iter()
        .map(|mut point| {
            point.position.x -= 3.0;
            point
        })
        .collect();
    index.rebuild(moved);
    assert!(track_target(&index, tower, 0.5, &mut target).is_none());
    assert!(target.is_none());
}
