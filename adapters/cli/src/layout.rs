use std::{error::Error, fmt, str::FromStr};

use tile_defense_core::{BoardCommand, TileCoord, TowerKind};

/// Separates the content kind from the tile coordinate.
const KIND_DELIMITER: char = '@';
/// Separates the column from the row.
const COORD_DELIMITER: char = ',';

/// Content a placement toggles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlacementKind {
    Wall,
    Tower(TowerKind),
    Destination,
    SpawnPoint,
}

/// Board content placed before the first frame, written as `KIND@COLUMN,ROW`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Placement {
    pub(crate) kind: PlacementKind,
    pub(crate) tile: TileCoord,
}

impl Placement {
    /// Board command toggling the placement's content.
    #[must_use]
    pub(crate) fn command(self) -> BoardCommand {
        let tile = self.tile;
        match self.kind {
            PlacementKind::Wall => BoardCommand::ToggleWall { tile },
            PlacementKind::Tower(kind) => BoardCommand::ToggleTower { tile, kind },
            PlacementKind::Destination => BoardCommand::ToggleDestination { tile },
            PlacementKind::SpawnPoint => BoardCommand::ToggleSpawnPoint { tile },
        }
    }
}

impl FromStr for Placement {
    type Err = PlacementError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PlacementError::Empty);
        }

        let (kind, coord) = trimmed
            .split_once(KIND_DELIMITER)
            .ok_or_else(|| PlacementError::MissingTile(trimmed.to_owned()))?;
        let kind = match kind.trim().to_ascii_lowercase().as_str() {
            "wall" => PlacementKind::Wall,
            "laser" => PlacementKind::Tower(TowerKind::Laser),
            "mortar" => PlacementKind::Tower(TowerKind::Mortar),
            "destination" => PlacementKind::Destination,
            "spawn" => PlacementKind::SpawnPoint,
            other => return Err(PlacementError::UnknownKind(other.to_owned())),
        };

        Ok(Self {
            kind,
            tile: parse_coord(coord)?,
        })
    }
}

/// Errors raised while parsing a placement argument.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum PlacementError {
    /// The argument was empty or contained only whitespace.
    Empty,
    /// The argument did not contain the `@` separating kind and tile.
    MissingTile(String),
    /// The content kind is not one of the supported names.
    UnknownKind(String),
    /// The tile coordinate could not be parsed.
    InvalidCoord(String),
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "placement was empty"),
            Self::MissingTile(value) => {
                write!(f, "placement '{value}' is missing '@COLUMN,ROW'")
            }
            Self::UnknownKind(kind) => write!(
                f,
                "unknown content '{kind}', expected wall, laser, mortar, destination or spawn"
            ),
            Self::InvalidCoord(coord) => write!(f, "could not parse tile coordinate '{coord}'"),
        }
    }
}

impl Error for PlacementError {}

fn parse_coord(coord: &str) -> Result<TileCoord, PlacementError> {
    let invalid = || PlacementError::InvalidCoord(coord.to_owned());
    let (column, row) = coord.split_once(COORD_DELIMITER).ok_or_else(invalid)?;

    let column = column.trim().parse::<u32>().map_err(|_| invalid())?;
    let row = row.trim().parse::<u32>().map_err(|_| invalid())?;
    Ok(TileCoord::new(column, row))
}
