//! Tile occupants and the factory that owns their lifecycle.

use tile_defense_core::{ContentKind, TowerKind, TowerState};
use tile_defense_lifecycle::{Pool, PoolId, Pooled};

/// Occupant held by exactly one tile at a time.
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    /// Nothing; freely traversable.
    Empty,
    /// Goal that enemies walk toward.
    Destination,
    /// Obstacle that blocks paths.
    Wall,
    /// Tile where enemies enter the board.
    SpawnPoint,
    /// Defensive tower together with its mutable state.
    Tower(TowerState),
}

impl Content {
    /// Kind of the occupant.
    #[must_use]
    pub const fn kind(&self) -> ContentKind {
        match self {
            Self::Empty => ContentKind::Empty,
            Self::Destination => ContentKind::Destination,
            Self::Wall => ContentKind::Wall,
            Self::SpawnPoint => ContentKind::SpawnPoint,
            Self::Tower(state) => ContentKind::Tower(state.kind()),
        }
    }

    /// Reports whether the occupant prevents enemies from crossing the tile.
    #[must_use]
    pub const fn blocks_path(&self) -> bool {
        self.kind().blocks_path()
    }

    /// Kind of tower held by the tile, if any.
    #[must_use]
    pub const fn tower_kind(&self) -> Option<TowerKind> {
        match self {
            Self::Tower(state) => Some(state.kind()),
            _ => None,
        }
    }
}

/// Creates tile content and takes it back when a tile replaces its occupant.
#[derive(Debug)]
pub struct ContentFactory {
    pool: Pool<Content>,
}

impl ContentFactory {
    /// Creates a factory whose content is stamped with `id`.
    #[must_use]
    pub const fn new(id: PoolId) -> Self {
        Self {
            pool: Pool::new(id),
        }
    }

    /// Identity stamped onto every piece of content.
    #[must_use]
    pub const fn id(&self) -> PoolId {
        self.pool.id()
    }

    /// Number of content instances currently placed on tiles.
    #[must_use]
    pub const fn outstanding(&self) -> usize {
        self.pool.outstanding()
    }

    /// Creates fresh content of the requested kind.
    pub fn get(&mut self, kind: ContentKind) -> Pooled<Content> {
        let content = match kind {
            ContentKind::Empty => Content::Empty,
            ContentKind::Destination => Content::Destination,
            ContentKind::Wall => Content::Wall,
            ContentKind::SpawnPoint => Content::SpawnPoint,
            ContentKind::Tower(tower) => Content::Tower(TowerState::new(tower)),
        };
        self.pool.acquire(content)
    }

    /// Destroys content created by this factory.
    ///
    /// # Panics
    ///
    /// Panics when the content originates from another factory.
    pub fn reclaim(&mut self, content: Pooled<Content>) {
        self.pool.reclaim(content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn towers_start_with_fresh_state() {
        let mut factory = ContentFactory::new(PoolId::new(4));
        let tower = factory.get(ContentKind::Tower(TowerKind::Mortar));

        assert_eq!(tower.kind(), ContentKind::Tower(TowerKind::Mortar));
        assert_eq!(tower.tower_kind(), Some(TowerKind::Mortar));
        assert!(tower.blocks_path());
        assert_eq!(tower.origin(), factory.id());
        factory.reclaim(tower);
        assert_eq!(factory.outstanding(), 0);
    }

    #[test]
    #[should_panic(expected = "wrong pool reclaimed")]
    fn foreign_content_cannot_be_reclaimed() {
        let mut first = ContentFactory::new(PoolId::new(1));
        let mut second = ContentFactory::new(PoolId::new(2));
        let wall = first.get(ContentKind::Wall);
        second.reclaim(wall);
    }
}
