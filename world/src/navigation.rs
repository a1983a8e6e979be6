//! Route search and connectivity over path tiles.

use std::collections::VecDeque;

use tower_defence_core::TileCoord;

/// Expansion order used by the route search: up, right, down, left.
const ROUTE_STEPS: [(i64, i64); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Expansion order used by the flood fill: left, right, up, down.
const FILL_STEPS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

#[derive(Clone, Copy, Debug)]
struct Node {
    tile: TileCoord,
    cost: u32,
    estimate: u32,
    parent: Option<usize>,
}

/// Finds the shortest walk of path tiles from `start` to `end` with A*.
///
/// Open nodes are expanded in order of `cost + manhattan distance`; among equal
/// scores the node discovered first wins. When no walk exists the direct pair
/// `[start, end]` is returned so callers always receive a route.
pub(crate) fn find_route<F>(
    width: u32,
    height: u32,
    start: TileCoord,
    end: TileCoord,
    is_path: F,
) -> Vec<TileCoord>
where
    F: Fn(TileCoord) -> bool,
{
    if start == end {
        return vec![start];
    }

    let cell_count = usize::try_from(width)
        .unwrap_or(0)
        .checked_mul(usize::try_from(height).unwrap_or(0))
        .unwrap_or(0);
    let (Some(start_index), Some(_)) = (
        index(width, height, start),
        index(width, height, end),
    ) else {
        return vec![start, end];
    };

    let mut nodes = vec![Node {
        tile: start,
        cost: 0,
        estimate: start.manhattan_distance(end),
        parent: None,
    }];
    let mut open: Vec<usize> = vec![0];
    let mut open_slot: Vec<Option<usize>> = vec![None; cell_count];
    let mut closed = vec![false; cell_count];
    open_slot[start_index] = Some(0);

    while let Some(position) = (0..open.len()).min_by_key(|&slot| {
        let node = &nodes[open[slot]];
        node.cost + node.estimate
    }) {
        let current = open.remove(position);
        let node = nodes[current];
        if let Some(current_index) = index(width, height, node.tile) {
            open_slot[current_index] = None;
            closed[current_index] = true;
        }

        if node.tile == end {
            return reconstruct(&nodes, current);
        }

        for neighbor in neighbors(node.tile, width, height, &ROUTE_STEPS) {
            if !is_path(neighbor) {
                continue;
            }
            let Some(neighbor_index) = index(width, height, neighbor) else {
                continue;
            };
            if closed[neighbor_index] {
                continue;
            }

            let cost = node.cost + 1;
            match open_slot[neighbor_index] {
                Some(existing) => {
                    let entry = &mut nodes[existing];
                    if cost < entry.cost {
                        entry.cost = cost;
                        entry.parent = Some(current);
                    }
                }
                None => {
                    nodes.push(Node {
                        tile: neighbor,
                        cost,
                        estimate: neighbor.manhattan_distance(end),
                        parent: Some(current),
                    });
                    let created = nodes.len() - 1;
                    open.push(created);
                    open_slot[neighbor_index] = Some(created);
                }
            }
        }
    }

    vec![start, end]
}

fn reconstruct(nodes: &[Node], last: usize) -> Vec<TileCoord> {
    let mut walk = Vec::new();
    let mut cursor = Some(last);
    while let Some(current) = cursor {
        let Some(node) = nodes.get(current) else {
            break;
        };
        walk.push(node.tile);
        cursor = node.parent;
    }
    walk.reverse();
    walk
}

/// Groups path tiles into 4-connected components.
///
/// Seeds are taken from `tiles` in order and each component lists its tiles in
/// breadth-first discovery order.
pub(crate) fn path_components<F>(
    width: u32,
    height: u32,
    tiles: &[TileCoord],
    is_path: F,
) -> Vec<Vec<TileCoord>>
where
    F: Fn(TileCoord) -> bool,
{
    let cell_count = usize::try_from(width)
        .unwrap_or(0)
        .checked_mul(usize::try_from(height).unwrap_or(0))
        .unwrap_or(0);
    let mut visited = vec![false; cell_count];
    let mut components = Vec::new();

    for &seed in tiles {
        let Some(seed_index) = index(width, height, seed) else {
            continue;
        };
        if visited[seed_index] || !is_path(seed) {
            continue;
        }

        visited[seed_index] = true;
        let mut component = Vec::new();
        let mut queue = VecDeque::from([seed]);

        while let Some(tile) = queue.pop_front() {
            component.push(tile);
            for neighbor in neighbors(tile, width, height, &FILL_STEPS) {
                let Some(neighbor_index) = index(width, height, neighbor) else {
                    continue;
                };
                if visited[neighbor_index] || !is_path(neighbor) {
                    continue;
                }
                visited[neighbor_index] = true;
                queue.push_back(neighbor);
            }
        }

        components.push(component);
    }

    components
}

fn neighbors<'a>(
    tile: TileCoord,
    width: u32,
    height: u32,
    steps: &'a [(i64, i64); 4],
) -> impl Iterator<Item = TileCoord> + 'a {
    steps.iter().filter_map(move |&(dx, dy)| {
        let x = u32::try_from(i64::from(tile.x()) + dx).ok()?;
        let y = u32::try_from(i64::from(tile.y()) + dy).ok()?;
        (x < width && y < height).then(|| TileCoord::new(x, y))
    })
}

pub(crate) fn index(width: u32, height: u32, tile: TileCoord) -> Option<usize> {
    if tile.x() >= width || tile.y() >= height {
        return None;
    }
    let column = usize::try_from(tile.x()).ok()?;
    let row = usize::try_from(tile.y()).ok()?;
    row.checked_mul(usize::try_from(width).ok()?)?
        .checked_add(column)
}
