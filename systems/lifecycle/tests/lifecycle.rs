use std::collections::BTreeSet;

use tile_defense_lifecycle::{BehaviorCollection, GameBehavior, Pool, PoolId, Pooled};

#[derive(Debug)]
struct Member {
    id: usize,
}

struct Verdicts {
    retire: BTreeSet<usize>,
    visited: Vec<usize>,
}

impl GameBehavior<Verdicts> for Member {
    fn game_update(&mut self, verdicts: &mut Verdicts) -> bool {
        verdicts.visited.push(self.id);
        !verdicts.retire.contains(&self.id)
    }
}

fn populated(count: usize) -> BehaviorCollection<Member> {
    let mut collection = BehaviorCollection::new();
    for id in 0..count {
        collection.add(Member { id });
    }
    collection
}

fn ids(collection: &BehaviorCollection<Member>) -> BTreeSet<usize> {
    collection.iter().map(|member| member.id).collect()
}

#[test]
fn removing_any_single_member_keeps_the_rest() {
    for removed in 0..6 {
        let mut collection = populated(6);
        let mut verdicts = Verdicts {
            retire: BTreeSet::from([removed]),
            visited: Vec::new(),
        };
        let mut retired = Vec::new();

        collection.game_update(&mut verdicts, |member| retired.push(member.id));

        let expected: BTreeSet<usize> = (0..6).filter(|id| *id != removed).collect();
        assert_eq!(ids(&collection), expected, "removing member {removed}");
        assert_eq!(retired, vec![removed]);

        let visited: BTreeSet<usize> = verdicts.visited.iter().copied().collect();
        assert_eq!(verdicts.visited.len(), 6, "each member visited exactly once");
        assert_eq!(visited, (0..6).collect());
    }
}

#[test]
fn consecutive_removals_do_not_skip_swapped_members() {
    let mut collection = populated(5);
    let mut verdicts = Verdicts {
        retire: BTreeSet::from([0, 4, 3]),
        visited: Vec::new(),
    };
    let mut retired = BTreeSet::new();

    collection.game_update(&mut verdicts, |member| {
        let _ = retired.insert(member.id);
    });

    assert_eq!(verdicts.visited.len(), 5);
    assert_eq!(retired, BTreeSet::from([0, 3, 4]));
    assert_eq!(ids(&collection), BTreeSet::from([1, 2]));
}

#[test]
fn pooled_members_are_driven_and_returned_to_their_pool() {
    let mut pool = Pool::new(PoolId::new(9));
    let mut collection: BehaviorCollection<Pooled<Member>> = BehaviorCollection::new();
    for id in 0..3 {
        collection.add(pool.acquire(Member { id }));
    }

    let mut verdicts = Verdicts {
        retire: BTreeSet::from([1]),
        visited: Vec::new(),
    };
    collection.game_update(&mut verdicts, |member| pool.reclaim(member));

    assert_eq!(pool.outstanding(), 2);
    assert_eq!(collection.len(), 2);

    collection.clear(|member| pool.reclaim(member));
    assert_eq!(pool.outstanding(), 0);
}
