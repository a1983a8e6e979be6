use tower_defence_core::{MapSpec, TileCoord};
use tower_defence_world::{Grid, TileKind};

fn parse(json: &str) -> MapSpec {
    serde_json::from_str(json).expect("parse map")
}

#[test]
fn single_corridor_becomes_one_route() {
    let map = parse(
        r#"{
            "width": 5,
            "height": 3,
            "tiles": {
                "blocked": [{"x": 2, "y": 0}],
                "path": [
                    {"x": 0, "y": 1}, {"x": 1, "y": 1}, {"x": 2, "y": 1},
                    {"x": 3, "y": 1}, {"x": 4, "y": 1}
                ]
            }
        }"#,
    );
    let grid = Grid::import(&map);

    assert_eq!(grid.routes().len(), 1);
    let route = &grid.routes()[0];
    assert_eq!(route.name(), "Custom Path 1");
    assert_eq!(route.spawn_point(), TileCoord::new(0, 1));
    assert_eq!(route.base_point(), TileCoord::new(4, 1));
    assert_eq!(route.points().len(), 5);

    assert_eq!(
        grid.tile(TileCoord::new(2, 0)).map(|tile| tile.kind()),
        Some(TileKind::Blocked)
    );
    assert!(grid.can_build_at(TileCoord::new(0, 0)));
    assert!(!grid.can_build_at(TileCoord::new(3, 1)));
}

#[test]
fn export_lists_the_imported_tiles() {
    let map = parse(
        r#"{
            "width": 4,
            "height": 2,
            "tiles": {
                "blocked": [{"x": 3, "y": 0}],
                "path": [{"x": 0, "y": 1}, {"x": 1, "y": 1}, {"x": 2, "y": 1}, {"x": 3, "y": 1}]
            }
        }"#,
    );
    assert_eq!(Grid::import(&map).to_map_spec(), map);
}

#[test]
fn separate_path_groups_yield_separate_routes() {
    let map = parse(
        r#"{
            "width": 4,
            "height": 3,
            "tiles": {
                "path": [
                    {"x": 0, "y": 0}, {"x": 1, "y": 0}, {"x": 2, "y": 0}, {"x": 3, "y": 0},
                    {"x": 0, "y": 2}, {"x": 1, "y": 2}, {"x": 2, "y": 2}, {"x": 3, "y": 2}
                ]
            }
        }"#,
    );
    let grid = Grid::import(&map);

    let names: Vec<&str> = grid.routes().iter().map(|route| route.name()).collect();
    assert_eq!(names, ["Custom Path 1", "Custom Path 2"]);
    assert_eq!(grid.routes()[1].spawn_point(), TileCoord::new(0, 2));
    for route in grid.routes() {
        for pair in route.points().windows(2) {
            assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
        }
    }
}

#[test]
fn maps_without_usable_paths_fall_back_to_default_routes() {
    let empty = parse(r#"{"width": 20, "height": 15, "tiles": {}}"#);
    let single = parse(r#"{"width": 20, "height": 15, "tiles": {"path": [{"x": 4, "y": 4}]}}"#);

    for map in [empty, single] {
        let grid = Grid::import(&map);
        let names: Vec<&str> = grid.routes().iter().map(|route| route.name()).collect();
        assert_eq!(names, ["North Route", "South Route", "Center Route"]);
    }
}

#[test]
fn path_overrides_blocked_and_stray_tiles_are_ignored() {
    let map = parse(
        r#"{
            "width": 3,
            "height": 1,
            "tiles": {
                "blocked": [{"x": 1, "y": 0}, {"x": 9, "y": 9}],
                "path": [{"x": 0, "y": 0}, {"x": 1, "y": 0}, {"x": 2, "y": 0}, {"x": -1, "y": 0}]
            }
        }"#,
    );
    let grid = Grid::import(&map);

    assert_eq!(
        grid.tile(TileCoord::new(1, 0)).map(|tile| tile.kind()),
        Some(TileKind::Path)
    );
    assert_eq!(grid.routes().len(), 1);
    assert_eq!(grid.routes()[0].points().len(), 3);
}
