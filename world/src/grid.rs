//! Tile grid and enemy routes.

use tower_defence_core::{Direction, MapPoint, MapSpec, MapTiles, Route, RouteId, TileCoord, Vec2};

use crate::navigation::{find_route, index, path_components};

/// Obstacle clusters scattered over the default grid as `(x, y, size)`.
const OBSTACLE_CLUSTERS: [(u32, u32, u32); 10] = [
    (3, 2, 2),
    (4, 8, 2),
    (5, 11, 1),
    (9, 3, 1),
    (11, 7, 2),
    (10, 10, 1),
    (15, 1, 1),
    (16, 5, 2),
    (14, 9, 1),
    (17, 12, 1),
];

const SCATTERED_OBSTACLES: [(u32, u32); 6] =
    [(2, 5), (6, 1), (8, 12), (12, 2), (13, 13), (18, 7)];

/// Role of a tile on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// Mobs walk here; nothing can be built.
    Path,
    /// Towers may be placed here.
    Buildable,
    /// Nothing may occupy the tile.
    Blocked,
}

/// A single grid tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    kind: TileKind,
    direction: Option<Direction>,
}

impl Tile {
    const BUILDABLE: Self = Self {
        kind: TileKind::Buildable,
        direction: None,
    };

    /// Role of the tile.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    /// Direction of travel for path tiles that belong to a route.
    #[must_use]
    pub const fn direction(&self) -> Option<Direction> {
        self.direction
    }
}

/// Tile layout plus the routes mobs follow across it.
///
/// Every route walks adjacent path tiles and the grid always holds at least
/// one route.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    routes: Vec<Route>,
}

impl Grid {
    fn blank(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let count = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            width,
            height,
            tiles: vec![Tile::BUILDABLE; count],
            routes: Vec::new(),
        }
    }

    /// Builds the default layout: north, south and bent centre routes plus
    /// fixed obstacles that never cover a route.
    #[must_use]
    pub fn generate(width: u32, height: u32) -> Self {
        let mut grid = Self::blank(width, height);
        grid.lay_default_routes();

        let cluster_tiles = OBSTACLE_CLUSTERS.iter().flat_map(|&(x, y, size)| {
            (0..size).flat_map(move |dy| (0..size).map(move |dx| (x + dx, y + dy)))
        });
        for (x, y) in cluster_tiles.chain(SCATTERED_OBSTACLES) {
            let tile = TileCoord::new(x, y);
            if let Some(slot) = grid.tile_mut(tile) {
                if slot.kind != TileKind::Path {
                    slot.kind = TileKind::Blocked;
                }
            }
        }

        grid
    }

    /// Builds a grid from a map description.
    ///
    /// Unlisted tiles are buildable and out-of-bounds tiles are ignored. Each
    /// connected group of path tiles becomes a route from its western-most
    /// edge tile to its eastern-most edge tile. Maps that yield no route fall
    /// back to the default routes.
    #[must_use]
    pub fn import(map: &MapSpec) -> Self {
        let mut grid = Self::blank(map.width, map.height);
        for (points, kind) in [
            (&map.tiles.blocked, TileKind::Blocked),
            (&map.tiles.path, TileKind::Path),
        ] {
            for point in points {
                let Some(tile) = point.to_tile(grid.width, grid.height) else {
                    continue;
                };
                if let Some(slot) = grid.tile_mut(tile) {
                    slot.kind = kind;
                }
            }
        }

        let path_tiles = grid.tiles_of(TileKind::Path);
        let components = path_components(grid.width, grid.height, &path_tiles, |tile| {
            grid.is_path(tile)
        });

        for component in components {
            let Some((start, end)) = grid.endpoints(&component) else {
                tracing::debug!(tiles = component.len(), "path group has no distinct ends");
                continue;
            };
            let points = find_route(grid.width, grid.height, start, end, |tile| grid.is_path(tile));
            let id = RouteId::new(grid.routes.len() as u32);
            let name = format!("Custom Path {}", grid.routes.len() + 1);
            grid.add_route(id, name, points);
        }

        if grid.routes.is_empty() {
            tracing::warn!(
                width = grid.width,
                height = grid.height,
                "map yields no route, laying default routes"
            );
            grid.lay_default_routes();
        }

        grid
    }

    /// Describes the grid in the map exchange format.
    #[must_use]
    pub fn to_map_spec(&self) -> MapSpec {
        let points = |kind: TileKind| -> Vec<MapPoint> {
            self.tiles_of(kind)
                .into_iter()
                .map(MapPoint::from)
                .collect()
        };
        MapSpec {
            width: self.width,
            height: self.height,
            tiles: MapTiles {
                blocked: points(TileKind::Blocked),
                path: points(TileKind::Path),
            },
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Tile at the provided coordinate, if inside the grid.
    #[must_use]
    pub fn tile(&self, tile: TileCoord) -> Option<Tile> {
        index(self.width, self.height, tile).and_then(|slot| self.tiles.get(slot).copied())
    }

    /// Reports whether a tower may stand on the tile.
    #[must_use]
    pub fn can_build_at(&self, tile: TileCoord) -> bool {
        self.tile(tile)
            .map_or(false, |tile| tile.kind == TileKind::Buildable)
    }

    /// Routes mobs may follow, ordered by identifier.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Looks up a route by identifier.
    #[must_use]
    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.routes.iter().find(|route| route.id() == id)
    }

    fn is_path(&self, tile: TileCoord) -> bool {
        self.tile(tile)
            .map_or(false, |tile| tile.kind == TileKind::Path)
    }

    fn tile_mut(&mut self, tile: TileCoord) -> Option<&mut Tile> {
        index(self.width, self.height, tile).and_then(|slot| self.tiles.get_mut(slot))
    }

    fn tiles_of(&self, kind: TileKind) -> Vec<TileCoord> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| TileCoord::new(x, y)))
            .filter(|&tile| self.tile(tile).map_or(false, |found| found.kind == kind))
            .collect()
    }

    fn endpoints(&self, component: &[TileCoord]) -> Option<(TileCoord, TileCoord)> {
        let east_edge = self.width - 1;
        let west = component.iter().find(|tile| tile.x() == 0);
        let east = component.iter().find(|tile| tile.x() == east_edge);
        let start = west.or_else(|| component.iter().min_by_key(|tile| tile.x()))?;
        let end = east.or_else(|| component.iter().max_by_key(|tile| tile.x()))?;
        (start != end).then_some((*start, *end))
    }

    fn lay_default_routes(&mut self) {
        let (width, height) = (self.width, self.height);
        let east_edge = width - 1;

        for (id, name, row) in [(0, "North Route", height / 4), (1, "South Route", height * 3 / 4)] {
            for x in 0..width {
                if let Some(slot) = self.tile_mut(TileCoord::new(x, row)) {
                    slot.kind = TileKind::Path;
                }
            }
            let points = find_route(
                width,
                height,
                TileCoord::new(0, row),
                TileCoord::new(east_edge, row),
                |tile| self.is_path(tile),
            );
            self.add_route(RouteId::new(id), name, points);
        }

        let entry_row = height / 2;
        let bend_column = width / 2;
        let bend_row = height * 3 / 5;
        let waypoints = [
            TileCoord::new(0, entry_row),
            TileCoord::new(bend_column, entry_row),
            TileCoord::new(bend_column, bend_row),
            TileCoord::new(east_edge, bend_row),
            TileCoord::new(east_edge, entry_row),
        ];
        self.add_route(RouteId::new(2), "Center Route", expand_waypoints(&waypoints));
    }

    fn add_route(&mut self, id: RouteId, name: impl Into<String>, points: Vec<TileCoord>) {
        for (position, &tile) in points.iter().enumerate() {
            let heading = points
                .get(position + 1)
                .and_then(|&next| Direction::between(tile, next))
                .or_else(|| {
                    position
                        .checked_sub(1)
                        .and_then(|previous| points.get(previous))
                        .and_then(|&previous| Direction::between(previous, tile))
                });
            if let Some(slot) = self.tile_mut(tile) {
                slot.kind = TileKind::Path;
                slot.direction = heading;
            }
        }

        if let Some(route) = Route::new(id, name, points) {
            self.routes.push(route);
        }
    }
}

fn expand_waypoints(waypoints: &[TileCoord]) -> Vec<TileCoord> {
    let mut points: Vec<TileCoord> = Vec::new();
    let mut push = |tile: TileCoord| {
        if points.last() != Some(&tile) {
            points.push(tile);
        }
    };

    for pair in waypoints.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        if from.x() == to.x() {
            for y in span(from.y(), to.y()) {
                push(TileCoord::new(from.x(), y));
            }
        } else {
            for x in span(from.x(), to.x()) {
                push(TileCoord::new(x, from.y()));
            }
        }
    }

    points
}

fn span(from: u32, to: u32) -> Box<dyn Iterator<Item = u32>> {
    if from <= to {
        Box::new(from..=to)
    } else {
        Box::new((to..=from).rev())
    }
}

/// Converts a position in world units to the tile containing it.
///
/// Returns `None` for negative coordinates or a non-positive tile size.
#[must_use]
pub fn world_to_grid(position: Vec2, tile_size: f32) -> Option<TileCoord> {
    if tile_size <= 0.0 {
        return None;
    }
    let scaled = (position / tile_size).floor();
    if scaled.x < 0.0 || scaled.y < 0.0 || !scaled.is_finite() {
        return None;
    }
    Some(TileCoord::new(scaled.x as u32, scaled.y as u32))
}

/// Converts a tile to the world position of its centre.
#[must_use]
pub fn grid_to_world(tile: TileCoord, tile_size: f32) -> Vec2 {
    tile.position() * tile_size + Vec2::splat(tile_size / 2.0)
}
