#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spatial queries over targetable enemies and tower target selection.
//!
//! The [`TargetIndex`] is rebuilt once per frame from every enemy that may
//! currently be targeted. Towers then either keep tracking the enemy they
//! locked onto or acquire a new one at random among those in range.

use rand::Rng;
use tile_defense_core::{EnemyId, Vec3};

/// Maximum number of hits a single spatial query reports.
pub const QUERY_CAPACITY: usize = 100;

/// Radius of an enemy's hit sphere per unit of scale.
const TARGET_RADIUS_PER_SCALE: f32 = 0.125;

/// Targetable point of an enemy captured for the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetPoint {
    /// Slot of the enemy inside the active enemy collection.
    pub slot: usize,
    /// Identifier of the enemy.
    pub enemy: EnemyId,
    /// World position of the enemy.
    pub position: Vec3,
    /// Scale of the enemy; larger enemies are easier to reach.
    pub scale: f32,
}

impl TargetPoint {
    /// Reports whether the target lies within `range` of `origin` on the ground plane.
    #[must_use]
    pub fn is_within(&self, origin: Vec3, range: f32) -> bool {
        let x = origin.x - self.position.x;
        let z = origin.z - self.position.z;
        let reach = range + TARGET_RADIUS_PER_SCALE * self.scale;
        x * x + z * z <= reach * reach
    }
}

/// Bounded spatial query over the valid targets of one frame.
#[derive(Debug, Default)]
pub struct TargetIndex {
    targets: Vec<TargetPoint>,
    buffer: Vec<usize>,
}

impl TargetIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the indexed targets.
    pub fn rebuild<I>(&mut self, targets: I)
    where
        I: IntoIterator<Item = TargetPoint>,
    {
        self.targets.clear();
        self.buffer.clear();
        self.targets.extend(targets);
    }

    /// Number of indexed targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Reports whether nothing can be targeted this frame.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Looks up the target point of the provided enemy.
    #[must_use]
    pub fn find(&self, enemy: EnemyId) -> Option<&TargetPoint> {
        self.targets.iter().find(|target| target.enemy == enemy)
    }

    /// Iterator over every indexed target.
    pub fn iter(&self) -> impl Iterator<Item = &TargetPoint> {
        self.targets.iter()
    }

    /// Buffers every target within `radius` of `position`.
    ///
    /// At most [`QUERY_CAPACITY`] hits are kept; the rest are silently dropped.
    /// Returns the number of buffered hits.
    pub fn fill_buffer(&mut self, position: Vec3, radius: f32) -> usize {
        self.buffer.clear();
        self.buffer.extend(
            self.targets
                .iter()
                .enumerate()
                .filter(|(_, target)| target.is_within(position, radius))
                .map(|(index, _)| index)
                .take(QUERY_CAPACITY),
        );
        self.buffer.len()
    }

    /// Number of hits recorded by the last query.
    #[must_use]
    pub fn buffered_count(&self) -> usize {
        self.buffer.len()
    }

    /// Hit stored at `index` by the last query.
    #[must_use]
    pub fn buffered(&self, index: usize) -> Option<&TargetPoint> {
        self.buffer
            .get(index)
            .and_then(|target| self.targets.get(*target))
    }
}

/// Re-validates the target a tower locked onto.
///
/// The target is kept while its enemy is still indexed and within
/// `range` plus the enemy's hit radius; otherwise it is cleared.
pub fn track_target(
    index: &TargetIndex,
    tower: Vec3,
    range: f32,
    target: &mut Option<EnemyId>,
) -> Option<TargetPoint> {
    let enemy = (*target)?;
    match index.find(enemy) {
        Some(point) if point.is_within(tower, range) => Some(*point),
        _ => {
            *target = None;
            None
        }
    }
}

/// Picks a random target within `range` of the tower.
pub fn acquire_target<R: Rng + ?Sized>(
    index: &mut TargetIndex,
    tower: Vec3,
    range: f32,
    rng: &mut R,
) -> Option<TargetPoint> {
    let count = index.fill_buffer(tower, range);
    if count == 0 {
        return None;
    }
    index.buffered(rng.gen_range(0..count)).copied()
}
