//! Connected-component extraction (spec.md §4.3).
//!
//! Generalizes the teacher's stack-based `flood_fill_region_of` /
//! `fill_isolated_tile` (`map.rs`) into a configurable 4/8-connectivity BFS
//! extractor whose `points` order matches the "enqueue order" contract, plus
//! an alternative union-find-based extractor for callers who only need the
//! partition and not a specific point order.

use crate::grid::bitgrid::BitGridPool;
use crate::grid::{CellKind, Grid, Point};
use crate::unionfind::UnionFind;

#[derive(Clone, Debug)]
pub struct Region {
    pub id: i32,
    pub points: Vec<Point>,
    pub bounds: crate::grid::Bounds,
    pub size: i32,
}

#[derive(Clone, Copy, Debug)]
pub struct FindRegionsOptions {
    pub min_size: i32,
    pub diagonal: bool,
}

impl Default for FindRegionsOptions {
    fn default() -> Self {
        Self { min_size: 1, diagonal: false }
    }
}

const CARDINAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL_EXTRA: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// BFS connected components of cells equal to `target`. Region ids are
/// assigned in row-major first-seen order; point order within a region is
/// BFS-enqueue order from that first-seen cell.
pub fn find_regions(grid: &Grid, target: CellKind, options: FindRegionsOptions) -> Vec<Region> {
    let mut pool = BitGridPool::new();
    let mut visited = pool.acquire(grid.width(), grid.height());
    let mut regions = Vec::new();
    let mut next_id = 0;

    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if grid.get(x, y) != target || visited.grid().get(x, y) {
                continue;
            }
            let points = bfs_from(grid, target, x, y, options.diagonal, visited.grid_mut());
            let size = points.len() as i32;
            if size < options.min_size {
                continue;
            }
            let mut bounds = crate::grid::Bounds::from_point(points[0]);
            for p in &points[1..] {
                bounds.expand(*p);
            }
            regions.push(Region { id: next_id, points, bounds, size });
            next_id += 1;
        }
    }
    regions
}

fn bfs_from(
    grid: &Grid,
    target: CellKind,
    sx: i32,
    sy: i32,
    diagonal: bool,
    visited: &mut crate::grid::bitgrid::BitGrid,
) -> Vec<Point> {
    let mut order = Vec::new();
    let mut queue = std::collections::VecDeque::new();
    visited.set(sx, sy, true);
    queue.push_back(Point::new(sx, sy));

    let mut offsets: Vec<(i32, i32)> = CARDINAL.to_vec();
    if diagonal {
        offsets.extend_from_slice(&DIAGONAL_EXTRA);
    }

    while let Some(p) = queue.pop_front() {
        order.push(p);
        for (dx, dy) in &offsets {
            let (nx, ny) = (p.x + dx, p.y + dy);
            if !grid.in_bounds(nx, ny) || visited.get(nx, ny) {
                continue;
            }
            if grid.get(nx, ny) != target {
                continue;
            }
            visited.set(nx, ny, true);
            queue.push_back(Point::new(nx, ny));
        }
    }
    order
}

/// `floodFillBFS`: visited mask for cells satisfying `predicate`, starting
/// from `(start_x, start_y)`. Caller must let the returned lease drop (or
/// release explicitly) on every exit path.
pub fn flood_fill_bfs<'p, F>(
    pool: &'p mut BitGridPool,
    width: i32,
    height: i32,
    start_x: i32,
    start_y: i32,
    predicate: F,
) -> crate::grid::bitgrid::BitGridLease<'p>
where
    F: Fn(i32, i32) -> bool,
{
    let mut lease = pool.acquire(width, height);
    if start_x < 0 || start_y < 0 || start_x >= width || start_y >= height || !predicate(start_x, start_y) {
        return lease;
    }
    let mut queue = std::collections::VecDeque::new();
    lease.grid_mut().set(start_x, start_y, true);
    queue.push_back((start_x, start_y));
    while let Some((x, y)) = queue.pop_front() {
        for (dx, dy) in CARDINAL {
            let (nx, ny) = (x + dx, y + dy);
            if nx < 0 || ny < 0 || nx >= width || ny >= height {
                continue;
            }
            if lease.grid().get(nx, ny) || !predicate(nx, ny) {
                continue;
            }
            lease.grid_mut().set(nx, ny, true);
            queue.push_back((nx, ny));
        }
    }
    lease
}

/// Alternative region extractor: union-find over row-major indices,
/// unioning each target cell with its right/down neighbor (and diagonals
/// under 8-connectivity). Produces the same partition as `find_regions` but
/// a different point order (row-major rather than BFS-enqueue) — callers
/// that hash region point sequences must pick one extractor and stick to it
/// (spec.md §9 Open Questions).
pub fn regions_via_union_find(grid: &Grid, target: CellKind, options: FindRegionsOptions) -> Vec<Region> {
    let w = grid.width();
    let h = grid.height();
    let idx = |x: i32, y: i32| (y * w + x) as usize;
    let mut uf = UnionFind::new((w * h) as usize);

    for y in 0..h {
        for x in 0..w {
            if grid.get(x, y) != target {
                continue;
            }
            let neighbors: &[(i32, i32)] = if options.diagonal {
                &[(1, 0), (0, 1), (1, 1), (1, -1)]
            } else {
                &[(1, 0), (0, 1)]
            };
            for (dx, dy) in neighbors {
                let (nx, ny) = (x + dx, y + dy);
                if grid.in_bounds(nx, ny) && grid.get(nx, ny) == target {
                    uf.union(idx(x, y), idx(nx, ny));
                }
            }
        }
    }

    let mut by_root: std::collections::BTreeMap<usize, Vec<Point>> = std::collections::BTreeMap::new();
    for y in 0..h {
        for x in 0..w {
            if grid.get(x, y) != target {
                continue;
            }
            let root = uf.find(idx(x, y));
            by_root.entry(root).or_default().push(Point::new(x, y));
        }
    }

    let mut regions = Vec::new();
    let mut next_id = 0;
    for (_root, points) in by_root {
        let size = points.len() as i32;
        if size < options.min_size {
            continue;
        }
        let mut bounds = crate::grid::Bounds::from_point(points[0]);
        for p in &points[1..] {
            bounds.expand(*p);
        }
        regions.push(Region { id: next_id, points, bounds, size });
        next_id += 1;
    }
    regions
}
