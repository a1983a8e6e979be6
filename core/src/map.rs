//! Map exchange format.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TileCoord;

/// Tile coordinate as written in a map file. Signed so that malformed input
/// can be reported instead of failing to parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapPoint {
    /// Column.
    pub x: i64,
    /// Row.
    pub y: i64,
}

impl MapPoint {
    /// Creates a map point.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Converts the point into a tile coordinate when it lies inside the grid.
    #[must_use]
    pub fn to_tile(self, width: u32, height: u32) -> Option<TileCoord> {
        let x = u32::try_from(self.x).ok()?;
        let y = u32::try_from(self.y).ok()?;
        (x < width && y < height).then(|| TileCoord::new(x, y))
    }
}

impl From<TileCoord> for MapPoint {
    fn from(tile: TileCoord) -> Self {
        Self::new(i64::from(tile.x()), i64::from(tile.y()))
    }
}

/// Non-buildable tiles listed by a map. Everything else is buildable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapTiles {
    /// Tiles nothing can occupy.
    #[serde(default)]
    pub blocked: Vec<MapPoint>,
    /// Tiles mobs walk on.
    #[serde(default)]
    pub path: Vec<MapPoint>,
}

/// Serializable description of a grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSpec {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Blocked and path tiles.
    pub tiles: MapTiles,
}

/// Problems that make a map unsuitable for import.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MapError {
    /// Width or height is zero.
    #[error("map dimensions must be positive, got {width}x{height}")]
    EmptyGrid {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },
    /// A listed tile lies outside the grid.
    #[error("{layer} tile ({x}, {y}) lies outside the {width}x{height} grid")]
    OutOfBounds {
        /// Which list held the tile.
        layer: &'static str,
        /// Column of the tile.
        x: i64,
        /// Row of the tile.
        y: i64,
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },
    /// The map lists no path tiles.
    #[error("map contains no path tiles")]
    NoPathTiles,
}

impl MapSpec {
    /// Checks the contract a map must satisfy before it is imported.
    ///
    /// Import itself tolerates violations by ignoring stray tiles and falling
    /// back to the default routes.
    pub fn validate(&self) -> Result<(), MapError> {
        if self.width == 0 || self.height == 0 {
            return Err(MapError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }

        let layers = [("blocked", &self.tiles.blocked), ("path", &self.tiles.path)];
        for (layer, points) in layers {
            if let Some(point) = points
                .iter()
                .find(|point| point.to_tile(self.width, self.height).is_none())
            {
                return Err(MapError::OutOfBounds {
                    layer,
                    x: point.x,
                    y: point.y,
                    width: self.width,
                    height: self.height,
                });
            }
        }

        if self.tiles.path.is_empty() {
            return Err(MapError::NoPathTiles);
        }
        Ok(())
    }
}
