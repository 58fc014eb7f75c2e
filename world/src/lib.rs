#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state for the tile defense simulation.
//!
//! The [`Board`] owns a fixed grid of [`Tile`] values, the content placed on
//! them and the shortest paths toward the destination tiles. Every mutation
//! that may change reachability recomputes the paths and is rolled back when
//! any tile would be left without one.

mod content;
mod navigation;

use tile_defense_core::{
    config::BoardConfig, BoardCommand, ContentKind, Direction, Event, RejectionReason, TileCoord,
    TowerKind, TowerState, Vec3,
};
use tile_defense_lifecycle::{PoolId, Pooled};
use tracing::debug;

pub use content::{Content, ContentFactory};

use navigation::{PathFinder, UNREACHED};

/// Position of a tile inside the board's tile array.
///
/// Indices stay valid for the lifetime of the board; they are how enemies and
/// neighbor links refer to tiles without owning them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileIndex(usize);

impl TileIndex {
    /// Raw offset into the tile array.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

/// Single cell of the board.
#[derive(Debug)]
pub struct Tile {
    coord: TileCoord,
    position: Vec3,
    neighbors: [Option<TileIndex>; 4],
    content: Pooled<Content>,
    distance: u32,
    next_on_path: Option<TileIndex>,
    exit_point: Vec3,
    path_direction: Direction,
    is_alternative: bool,
}

impl Tile {
    /// Grid coordinate of the tile.
    #[must_use]
    pub const fn coord(&self) -> TileCoord {
        self.coord
    }

    /// World position of the tile center.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Neighboring tile on the provided side, if any.
    #[must_use]
    pub fn neighbor(&self, side: Direction) -> Option<TileIndex> {
        self.neighbors[side_slot(side)]
    }

    /// Occupant of the tile.
    #[must_use]
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Number of steps to the nearest destination, if one is reachable.
    #[must_use]
    pub const fn distance(&self) -> Option<u32> {
        if self.distance == UNREACHED {
            None
        } else {
            Some(self.distance)
        }
    }

    /// Reports whether the last path search reached the tile.
    #[must_use]
    pub const fn has_path(&self) -> bool {
        self.distance != UNREACHED
    }

    /// Next tile on the shortest path; `None` on destinations and unreached tiles.
    #[must_use]
    pub const fn next_on_path(&self) -> Option<TileIndex> {
        self.next_on_path
    }

    /// World point where the path leaves the tile.
    #[must_use]
    pub const fn exit_point(&self) -> Vec3 {
        self.exit_point
    }

    /// Direction of travel when leaving the tile along the path.
    #[must_use]
    pub const fn path_direction(&self) -> Direction {
        self.path_direction
    }

    /// Checkerboard flag selecting the neighbor expansion order of the search.
    #[must_use]
    pub const fn is_alternative(&self) -> bool {
        self.is_alternative
    }

    fn become_destination(&mut self) {
        self.distance = 0;
        self.next_on_path = None;
        self.exit_point = self.position;
    }

    fn clear_path(&mut self) {
        self.distance = UNREACHED;
        self.next_on_path = None;
    }
}

const fn side_slot(side: Direction) -> usize {
    match side {
        Direction::North => 0,
        Direction::East => 1,
        Direction::South => 2,
        Direction::West => 3,
    }
}

/// Grid of tiles together with their content and paths.
#[derive(Debug)]
pub struct Board {
    columns: u32,
    rows: u32,
    tiles: Vec<Tile>,
    spawn_points: Vec<TileIndex>,
    updating_content: Vec<TileIndex>,
    factory: ContentFactory,
    path_finder: PathFinder,
}

impl Board {
    /// Builds a board of the configured size and resets it to its initial layout.
    ///
    /// The initial layout holds a destination on the center tile and a spawn
    /// point on the first tile.
    ///
    /// # Panics
    ///
    /// Panics when the board is smaller than 2x2 tiles.
    #[must_use]
    pub fn new(config: BoardConfig, factory_id: PoolId) -> Self {
        assert!(
            config.columns >= 2 && config.rows >= 2,
            "board must be at least 2x2 tiles"
        );

        let mut factory = ContentFactory::new(factory_id);
        let columns = config.columns as usize;
        let rows = config.rows as usize;
        let offset_x = (config.columns - 1) as f32 * 0.5;
        let offset_z = (config.rows - 1) as f32 * 0.5;

        let mut tiles: Vec<Tile> = Vec::with_capacity(columns * rows);
        for row in 0..rows {
            for column in 0..columns {
                let position = Vec3::new(column as f32 - offset_x, 0.0, row as f32 - offset_z);
                let mut is_alternative = column % 2 == 0;
                if row % 2 == 0 {
                    is_alternative = !is_alternative;
                }
                tiles.push(Tile {
                    coord: TileCoord::new(column as u32, row as u32),
                    position,
                    neighbors: [None; 4],
                    content: factory.get(ContentKind::Empty),
                    distance: UNREACHED,
                    next_on_path: None,
                    exit_point: position,
                    path_direction: Direction::North,
                    is_alternative,
                });

                let index = tiles.len() - 1;
                if column > 0 {
                    make_east_west_neighbors(&mut tiles, index, index - 1);
                }
                if row > 0 {
                    make_north_south_neighbors(&mut tiles, index, index - columns);
                }
            }
        }

        let mut board = Self {
            columns: config.columns,
            rows: config.rows,
            tiles,
            spawn_points: Vec::new(),
            updating_content: Vec::new(),
            factory,
            path_finder: PathFinder::default(),
        };
        board.clear();
        board
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Tile stored at the provided index.
    ///
    /// # Panics
    ///
    /// Panics when the index does not belong to this board.
    #[must_use]
    pub fn tile(&self, index: TileIndex) -> &Tile {
        &self.tiles[index.0]
    }

    /// Iterator over every tile in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Resolves a grid coordinate into a tile index.
    #[must_use]
    pub fn index_of(&self, coord: TileCoord) -> Option<TileIndex> {
        if coord.column() < self.columns && coord.row() < self.rows {
            let index = coord.row() as usize * self.columns as usize + coord.column() as usize;
            Some(TileIndex(index))
        } else {
            None
        }
    }

    /// Number of spawn points on the board.
    #[must_use]
    pub fn spawn_point_count(&self) -> usize {
        self.spawn_points.len()
    }

    /// Spawn point stored at the provided position of the spawn list.
    #[must_use]
    pub fn spawn_point(&self, index: usize) -> Option<TileIndex> {
        self.spawn_points.get(index).copied()
    }

    /// Factory that owns the lifecycle of the board's content.
    #[must_use]
    pub const fn content_factory(&self) -> &ContentFactory {
        &self.factory
    }

    /// Resolves the tile hit by a ray cast toward the ground plane.
    #[must_use]
    pub fn tile_at_ray(&self, origin: Vec3, direction: Vec3) -> Option<TileIndex> {
        if direction.y.abs() <= f32::EPSILON {
            return None;
        }
        let distance = -origin.y / direction.y;
        if distance < 0.0 {
            return None;
        }

        let hit = origin + direction * distance;
        let column = (hit.x + self.columns as f32 * 0.5).floor();
        let row = (hit.z + self.rows as f32 * 0.5).floor();
        if column < 0.0 || row < 0.0 {
            return None;
        }

        self.index_of(TileCoord::new(column as u32, row as u32))
    }

    /// Resets every tile to the initial layout.
    pub fn clear(&mut self) {
        for index in 0..self.tiles.len() {
            self.set_content(TileIndex(index), ContentKind::Empty);
        }
        self.spawn_points.clear();
        self.updating_content.clear();

        let mut events = Vec::new();
        self.toggle_destination(TileIndex(self.tiles.len() / 2), &mut events);
        self.toggle_spawn_point(TileIndex(0), &mut events);
        debug!(columns = self.columns, rows = self.rows, "board cleared");
    }

    /// Advances every tower on the board by one frame.
    ///
    /// `update` receives the tower's world position and its mutable state.
    pub fn game_update<F>(&mut self, mut update: F)
    where
        F: FnMut(Vec3, &mut TowerState),
    {
        for index in &self.updating_content {
            let tile = &mut self.tiles[index.0];
            let position = tile.position;
            if let Content::Tower(state) = &mut *tile.content {
                update(position, state);
            }
        }
    }

    fn find_paths(&mut self) -> bool {
        self.path_finder.rebuild(&mut self.tiles)
    }

    fn set_content(&mut self, index: TileIndex, kind: ContentKind) {
        let replacement = self.factory.get(kind);
        let previous = std::mem::replace(&mut self.tiles[index.0].content, replacement);
        self.factory.reclaim(previous);
    }

    fn content_kind(&self, index: TileIndex) -> ContentKind {
        self.tiles[index.0].content.kind()
    }

    fn toggle_wall(&mut self, index: TileIndex, out_events: &mut Vec<Event>) {
        match self.content_kind(index) {
            ContentKind::Wall => {
                self.set_content(index, ContentKind::Empty);
                let found = self.find_paths();
                debug_assert!(found, "removing a wall cannot disconnect the board");
                self.changed(index, out_events);
            }
            ContentKind::Empty => {
                let _ = self.place_blocking(index, ContentKind::Wall, out_events);
            }
            _ => self.reject(index, ContentKind::Wall, RejectionReason::Occupied, out_events),
        }
    }

    fn toggle_tower(&mut self, index: TileIndex, kind: TowerKind, out_events: &mut Vec<Event>) {
        let requested = ContentKind::Tower(kind);
        match self.content_kind(index) {
            ContentKind::Tower(existing) => {
                self.updating_content.retain(|tile| *tile != index);
                if existing == kind {
                    self.set_content(index, ContentKind::Empty);
                    let found = self.find_paths();
                    debug_assert!(found, "removing a tower cannot disconnect the board");
                } else {
                    self.set_content(index, requested);
                    self.updating_content.push(index);
                }
                self.changed(index, out_events);
            }
            ContentKind::Empty => {
                if self.place_blocking(index, requested, out_events) {
                    self.updating_content.push(index);
                }
            }
            ContentKind::Wall => {
                self.set_content(index, requested);
                self.updating_content.push(index);
                self.changed(index, out_events);
            }
            _ => self.reject(index, requested, RejectionReason::Occupied, out_events),
        }
    }

    fn toggle_destination(&mut self, index: TileIndex, out_events: &mut Vec<Event>) {
        match self.content_kind(index) {
            ContentKind::Destination => {
                self.set_content(index, ContentKind::Empty);
                if self.find_paths() {
                    self.changed(index, out_events);
                } else {
                    self.set_content(index, ContentKind::Destination);
                    self.restore_paths();
                    self.reject(
                        index,
                        ContentKind::Empty,
                        RejectionReason::PathBlocked,
                        out_events,
                    );
                }
            }
            ContentKind::Empty => {
                self.set_content(index, ContentKind::Destination);
                let found = self.find_paths();
                debug_assert!(found, "adding a destination cannot disconnect the board");
                self.changed(index, out_events);
            }
            _ => self.reject(
                index,
                ContentKind::Destination,
                RejectionReason::Occupied,
                out_events,
            ),
        }
    }

    fn toggle_spawn_point(&mut self, index: TileIndex, out_events: &mut Vec<Event>) {
        match self.content_kind(index) {
            ContentKind::SpawnPoint => {
                if self.spawn_points.len() > 1 {
                    self.spawn_points.retain(|tile| *tile != index);
                    self.set_content(index, ContentKind::Empty);
                    self.changed(index, out_events);
                } else {
                    self.reject(
                        index,
                        ContentKind::Empty,
                        RejectionReason::LastSpawnPoint,
                        out_events,
                    );
                }
            }
            ContentKind::Empty => {
                if self.tiles[index.0].has_path() {
                    self.set_content(index, ContentKind::SpawnPoint);
                    self.spawn_points.push(index);
                    self.changed(index, out_events);
                } else {
                    self.reject(
                        index,
                        ContentKind::SpawnPoint,
                        RejectionReason::Unreachable,
                        out_events,
                    );
                }
            }
            _ => self.reject(
                index,
                ContentKind::SpawnPoint,
                RejectionReason::Occupied,
                out_events,
            ),
        }
    }

    /// Places blocking content on an empty tile, rolling back when it cuts a path.
    fn place_blocking(
        &mut self,
        index: TileIndex,
        kind: ContentKind,
        out_events: &mut Vec<Event>,
    ) -> bool {
        self.set_content(index, kind);
        if self.find_paths() {
            self.changed(index, out_events);
            return true;
        }

        self.set_content(index, ContentKind::Empty);
        self.restore_paths();
        self.reject(index, kind, RejectionReason::PathBlocked, out_events);
        false
    }

    fn restore_paths(&mut self) {
        let found = self.find_paths();
        debug_assert!(found, "restored layout must have valid paths");
    }

    fn changed(&self, index: TileIndex, out_events: &mut Vec<Event>) {
        out_events.push(Event::ContentChanged {
            tile: self.tiles[index.0].coord,
            content: self.content_kind(index),
        });
    }

    fn reject(
        &self,
        index: TileIndex,
        requested: ContentKind,
        reason: RejectionReason,
        out_events: &mut Vec<Event>,
    ) {
        let tile = self.tiles[index.0].coord;
        debug!(?tile, ?requested, ?reason, "board mutation rejected");
        out_events.push(Event::MutationRejected {
            tile,
            requested,
            reason,
        });
    }
}

fn make_east_west_neighbors(tiles: &mut [Tile], east: usize, west: usize) {
    assert!(
        tiles[west].neighbors[side_slot(Direction::East)].is_none()
            && tiles[east].neighbors[side_slot(Direction::West)].is_none(),
        "redefined neighbors"
    );
    tiles[west].neighbors[side_slot(Direction::East)] = Some(TileIndex(east));
    tiles[east].neighbors[side_slot(Direction::West)] = Some(TileIndex(west));
}

fn make_north_south_neighbors(tiles: &mut [Tile], north: usize, south: usize) {
    assert!(
        tiles[south].neighbors[side_slot(Direction::North)].is_none()
            && tiles[north].neighbors[side_slot(Direction::South)].is_none(),
        "redefined neighbors"
    );
    tiles[south].neighbors[side_slot(Direction::North)] = Some(TileIndex(north));
    tiles[north].neighbors[side_slot(Direction::South)] = Some(TileIndex(south));
}

/// Applies the provided command to the board, reporting the outcome as events.
pub fn apply(board: &mut Board, command: BoardCommand, out_events: &mut Vec<Event>) {
    let (coord, requested) = match command {
        BoardCommand::ToggleWall { tile } => (tile, ContentKind::Wall),
        BoardCommand::ToggleTower { tile, kind } => (tile, ContentKind::Tower(kind)),
        BoardCommand::ToggleDestination { tile } => (tile, ContentKind::Destination),
        BoardCommand::ToggleSpawnPoint { tile } => (tile, ContentKind::SpawnPoint),
    };

    let Some(index) = board.index_of(coord) else {
        out_events.push(Event::MutationRejected {
            tile: coord,
            requested,
            reason: RejectionReason::OutOfBounds,
        });
        return;
    };

    match command {
        BoardCommand::ToggleWall { .. } => board.toggle_wall(index, out_events),
        BoardCommand::ToggleTower { kind, .. } => board.toggle_tower(index, kind, out_events),
        BoardCommand::ToggleDestination { .. } => board.toggle_destination(index, out_events),
        BoardCommand::ToggleSpawnPoint { .. } => board.toggle_spawn_point(index, out_events),
    }
}

/// Query functions that provide read-only access to the board state.
pub mod query {
    use tile_defense_core::{ContentKind, TileCoord, TowerKind};

    use super::Board;

    /// Kind of content held by the tile at `coord`.
    #[must_use]
    pub fn content_at(board: &Board, coord: TileCoord) -> Option<ContentKind> {
        board
            .index_of(coord)
            .map(|index| board.tile(index).content().kind())
    }

    /// Path distance of the tile at `coord`, if reached.
    #[must_use]
    pub fn distance(board: &Board, coord: TileCoord) -> Option<u32> {
        board
            .index_of(coord)
            .and_then(|index| board.tile(index).distance())
    }

    /// Coordinate of the next tile on the path from `coord`.
    #[must_use]
    pub fn next_on_path(board: &Board, coord: TileCoord) -> Option<TileCoord> {
        let index = board.index_of(coord)?;
        let next = board.tile(index).next_on_path()?;
        Some(board.tile(next).coord())
    }

    /// Follows next-hop links from `coord` until a tile without one.
    ///
    /// Returns `None` when the chain does not end on a destination within as
    /// many steps as the board has tiles.
    #[must_use]
    pub fn path_to_destination(board: &Board, coord: TileCoord) -> Option<Vec<TileCoord>> {
        let mut index = board.index_of(coord)?;
        let mut path = vec![coord];
        for _ in 0..board.tiles.len() {
            match board.tile(index).next_on_path() {
                Some(next) => {
                    index = next;
                    path.push(board.tile(index).coord());
                }
                None => {
                    let tile = board.tile(index);
                    return (tile.content().kind() == ContentKind::Destination).then_some(path);
                }
            }
        }
        None
    }

    /// Coordinates of every spawn point in placement order.
    #[must_use]
    pub fn spawn_points(board: &Board) -> Vec<TileCoord> {
        board
            .spawn_points
            .iter()
            .map(|index| board.tile(*index).coord())
            .collect()
    }

    /// Towers currently registered for per-frame updates.
    #[must_use]
    pub fn towers(board: &Board) -> Vec<(TileCoord, TowerKind)> {
        board
            .updating_content
            .iter()
            .filter_map(|index| {
                let tile = board.tile(*index);
                tile.content().tower_kind().map(|kind| (tile.coord(), kind))
            })
            .collect()
    }

    /// Reports whether every non-blocking tile reaches a destination.
    #[must_use]
    pub fn paths_are_valid(board: &Board) -> bool {
        board.tiles().all(|tile| {
            tile.content().blocks_path() || path_to_destination(board, tile.coord()).is_some()
        })
    }
}
