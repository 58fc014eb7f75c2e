//! Multi-source breadth-first path finder used by the board.

use std::collections::VecDeque;

use tile_defense_core::{ContentKind, Direction};

use crate::{Tile, TileIndex};

/// Sentinel distance of tiles the search has not reached.
pub(crate) const UNREACHED: u32 = u32::MAX;

/// Expansion order of tiles flagged as alternative.
const ALTERNATIVE_ORDER: [Direction; 4] = [
    Direction::North,
    Direction::South,
    Direction::East,
    Direction::West,
];

/// Expansion order of every other tile.
const REGULAR_ORDER: [Direction; 4] = [
    Direction::West,
    Direction::East,
    Direction::South,
    Direction::North,
];

/// Reverse breadth-first search seeded from every destination tile.
///
/// Each reached tile records its distance, the neighbor it should move to, the
/// edge point where it leaves and the direction of travel. Blocking tiles are
/// labelled as well so that unblocking them later yields a sensible path, but
/// the search never grows through them.
#[derive(Debug, Default)]
pub(crate) struct PathFinder {
    frontier: VecDeque<TileIndex>,
}

impl PathFinder {
    /// Recomputes paths for every tile and reports whether all were reached.
    pub(crate) fn rebuild(&mut self, tiles: &mut [Tile]) -> bool {
        self.frontier.clear();

        for (index, tile) in tiles.iter_mut().enumerate() {
            if tile.content.kind() == ContentKind::Destination {
                tile.become_destination();
                self.frontier.push_back(TileIndex(index));
            } else {
                tile.clear_path();
            }
        }

        if self.frontier.is_empty() {
            return false;
        }

        while let Some(current) = self.frontier.pop_front() {
            let order = if tiles[current.0].is_alternative {
                &ALTERNATIVE_ORDER
            } else {
                &REGULAR_ORDER
            };

            for &side in order {
                if let Some(grown) = grow_path(tiles, current, side) {
                    self.frontier.push_back(grown);
                }
            }
        }

        tiles.iter().all(Tile::has_path)
    }
}

/// Labels the neighbor on `side` of `from` as one step further away.
///
/// Returns the neighbor when the search should keep expanding through it.
fn grow_path(tiles: &mut [Tile], from: TileIndex, side: Direction) -> Option<TileIndex> {
    let source = &tiles[from.0];
    debug_assert!(source.has_path(), "growing a path from an unreached tile");

    let neighbor = source.neighbor(side)?;
    let distance = source.distance.saturating_add(1);

    let tile = &mut tiles[neighbor.0];
    if tile.has_path() {
        return None;
    }

    let travel = opposite(side);
    tile.distance = distance;
    tile.next_on_path = Some(from);
    tile.exit_point = tile.position + travel.half_vector();
    tile.path_direction = travel;

    if tile.content.blocks_path() {
        None
    } else {
        Some(neighbor)
    }
}

const fn opposite(direction: Direction) -> Direction {
    match direction {
        Direction::North => Direction::South,
        Direction::East => Direction::West,
        Direction::South => Direction::North,
        Direction::West => Direction::East,
    }
}
