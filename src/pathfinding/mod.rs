//! Configurable shortest-path search over the grid (spec.md §4.4).
//!
//! `astar`/`dijkstra` generalize the teacher's `find_path`/`weighted_path`
//! (`map.rs`) — binary min-heap, Manhattan heuristic, 4-directional — to
//! diagonal movement (no corner-cutting), pluggable heuristics, optional
//! wall tunneling, and path smoothing via the teacher's own
//! `bresenham_line`.

pub mod dijkstra_map;
pub mod jps;

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::config::{AlgorithmKind, HeuristicKind, PathfindingConfig};
use crate::grid::{CellKind, Grid, Point};
use crate::pipeline::artifact::{Connection, Room};

const SQRT2: f64 = std::f64::consts::SQRT_2;

/// Total order on `(f, h, y, x)` so ties resolve identically across runs
/// (spec.md §4.4).
#[derive(Clone, Copy, PartialEq)]
struct OpenEntry {
    f: i64,
    h: i64,
    y: i32,
    x: i32,
    g: i64,
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the smallest (f,h,y,x) pops first.
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.y.cmp(&self.y))
            .then_with(|| other.x.cmp(&self.x))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(a: Point, b: Point, kind: HeuristicKind) -> f64 {
    match kind {
        HeuristicKind::Manhattan => a.manhattan(b) as f64,
        HeuristicKind::Euclidean => a.euclidean(b),
        HeuristicKind::Chebyshev => a.chebyshev(b) as f64,
    }
}

/// Fixed-point scale so heap comparisons stay on integers (avoids float
/// non-determinism across platforms in the tie-break order).
const FP_SCALE: f64 = 1000.0;

fn neighbors(grid: &Grid, p: Point, allow_diagonal: bool, tunnel_wall_cost: i32) -> Vec<(Point, f64)> {
    let mut out = Vec::new();
    let cardinal = [(1, 0), (-1, 0), (0, 1), (0, -1)];
    for (dx, dy) in cardinal {
        let np = Point::new(p.x + dx, p.y + dy);
        if let Some(cost) = step_cost(grid, np, tunnel_wall_cost) {
            out.push((np, cost));
        }
    }
    if allow_diagonal {
        for (dx, dy) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
            let np = Point::new(p.x + dx, p.y + dy);
            // No corner-cutting: both shared cardinal neighbors must be passable.
            let side_a = Point::new(p.x + dx, p.y);
            let side_b = Point::new(p.x, p.y + dy);
            if step_cost(grid, side_a, 0).is_none() || step_cost(grid, side_b, 0).is_none() {
                continue;
            }
            if let Some(cost) = step_cost(grid, np, tunnel_wall_cost) {
                out.push((np, cost * SQRT2));
            }
        }
    }
    out
}

fn step_cost(grid: &Grid, p: Point, tunnel_wall_cost: i32) -> Option<f64> {
    match grid.get(p.x, p.y) {
        CellKind::Wall => {
            if tunnel_wall_cost > 0 {
                Some(1.0 + tunnel_wall_cost as f64)
            } else {
                None
            }
        }
        CellKind::Lava => None,
        _ => Some(1.0),
    }
}

/// Shared A*/Dijkstra search core. `use_heuristic = false` gives Dijkstra.
fn search(grid: &Grid, start: Point, goal: Point, cfg: &PathfindingConfig, use_heuristic: bool) -> Vec<Point> {
    if start == goal {
        return vec![start];
    }
    if !grid.in_bounds(goal.x, goal.y) {
        return Vec::new();
    }

    let w = grid.width();
    let h = grid.height();
    let idx = |p: Point| (p.y * w + p.x) as usize;
    let len = (w * h) as usize;
    let mut g_score = vec![f64::INFINITY; len];
    let mut came_from: Vec<Option<Point>> = vec![None; len];
    let mut closed = vec![false; len];

    g_score[idx(start)] = 0.0;
    let mut open = BinaryHeap::new();
    let h0 = if use_heuristic { heuristic(start, goal, cfg.heuristic) } else { 0.0 };
    open.push(OpenEntry { f: (h0 * FP_SCALE) as i64, h: (h0 * FP_SCALE) as i64, y: start.y, x: start.x, g: 0 });

    while let Some(entry) = open.pop() {
        let current = Point::new(entry.x, entry.y);
        if closed[idx(current)] {
            continue;
        }
        if current == goal {
            return reconstruct(&came_from, idx, start, goal);
        }
        closed[idx(current)] = true;

        for (next, step) in neighbors(grid, current, cfg.allow_diagonal, cfg.tunnel_wall_cost) {
            if !grid.in_bounds(next.x, next.y) || closed[idx(next)] {
                continue;
            }
            let tentative_g = g_score[idx(current)] + step;
            if tentative_g < g_score[idx(next)] {
                g_score[idx(next)] = tentative_g;
                came_from[idx(next)] = Some(current);
                let hn = if use_heuristic { heuristic(next, goal, cfg.heuristic) } else { 0.0 };
                let f = tentative_g + hn;
                open.push(OpenEntry {
                    f: (f * FP_SCALE) as i64,
                    h: (hn * FP_SCALE) as i64,
                    y: next.y,
                    x: next.x,
                    g: (tentative_g * FP_SCALE) as i64,
                });
            }
        }
    }
    Vec::new()
}

fn reconstruct(
    came_from: &[Option<Point>],
    idx: impl Fn(Point) -> usize,
    start: Point,
    goal: Point,
) -> Vec<Point> {
    let mut path = vec![goal];
    let mut cur = goal;
    while cur != start {
        match came_from[idx(cur)] {
            Some(prev) => {
                cur = prev;
                path.push(cur);
            }
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}

/// A* search with the given config.
pub fn astar(grid: &Grid, start: Point, goal: Point, cfg: &PathfindingConfig) -> Vec<Point> {
    let path = search(grid, start, goal, cfg, true);
    gate_length(path, cfg)
}

/// Dijkstra search with the given config (heuristic ignored).
pub fn dijkstra(grid: &Grid, start: Point, goal: Point, cfg: &PathfindingConfig) -> Vec<Point> {
    let path = search(grid, start, goal, cfg, false);
    gate_length(path, cfg)
}

fn gate_length(path: Vec<Point>, cfg: &PathfindingConfig) -> Vec<Point> {
    if path.len() as i32 > cfg.max_path_length {
        Vec::new()
    } else {
        path
    }
}

/// Top-level entry point honoring `algorithm`/`preferJPS` from the config.
pub fn find_path(grid: &Grid, start: Point, goal: Point, cfg: &PathfindingConfig) -> Vec<Point> {
    let mut path = if cfg.prefer_jps && !cfg.allow_diagonal {
        let jps_path = jps::jump_point_search(grid, start, goal, cfg.max_path_length);
        if !jps_path.is_empty() || start == goal {
            jps_path
        } else {
            dispatch(grid, start, goal, cfg)
        }
    } else {
        dispatch(grid, start, goal, cfg)
    };
    for _ in 0..cfg.path_smoothing_passes {
        path = smooth_once(grid, &path);
    }
    path
}

fn dispatch(grid: &Grid, start: Point, goal: Point, cfg: &PathfindingConfig) -> Vec<Point> {
    match cfg.algorithm {
        AlgorithmKind::AStar => astar(grid, start, goal, cfg),
        AlgorithmKind::Dijkstra => dijkstra(grid, start, goal, cfg),
        AlgorithmKind::Jps => jps::jump_point_search(grid, start, goal, cfg.max_path_length),
    }
}

/// Bresenham line between two points, inclusive of both endpoints.
pub fn bresenham_line(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Point> {
    let mut points = Vec::new();
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    loop {
        points.push(Point::new(x, y));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    points
}

/// One smoothing pass: replace `[i..=j]` with a direct Bresenham line
/// whenever it crosses only floor cells, preserving endpoints.
fn smooth_once(grid: &Grid, path: &[Point]) -> Vec<Point> {
    if path.len() < 3 {
        return path.to_vec();
    }
    let mut result = vec![path[0]];
    let mut i = 0;
    while i < path.len() - 1 {
        let mut j = path.len() - 1;
        let mut advanced = false;
        while j > i + 1 {
            let line = bresenham_line(path[i].x, path[i].y, path[j].x, path[j].y);
            if line.iter().all(|p| grid.get(p.x, p.y) == CellKind::Floor) {
                result.push(path[j]);
                i = j;
                advanced = true;
                break;
            }
            j -= 1;
        }
        if !advanced {
            i += 1;
            result.push(path[i]);
        }
    }
    result
}

/// `createConnections`: MST over room centers (Prim's-style), plus a
/// bounded set of redundant edges from a k-nearest candidate pool
/// (spec.md §4.4).
pub fn create_connections(rooms: &[Room], grid: &Grid, cfg: &PathfindingConfig) -> Vec<Connection> {
    if rooms.len() < 2 {
        return Vec::new();
    }
    let n = rooms.len();
    let mst_edges = prim_mst(rooms);

    let extra_count = std::cmp::max(1, (n as f64 * 0.3).floor() as usize);
    let k = std::cmp::max(2, ((n as f64) / 6.0).ceil() as usize);
    let mut present: std::collections::HashSet<(i32, i32)> =
        mst_edges.iter().map(|&(a, b)| ordered(rooms[a].id, rooms[b].id)).collect();

    let mut candidates: Vec<(f64, usize, usize)> = Vec::new();
    for i in 0..n {
        let mut dists: Vec<(f64, usize)> = (0..n)
            .filter(|&j| j != i)
            .map(|j| (rooms[i].center().euclidean(rooms[j].center()), j))
            .collect();
        dists.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        for &(d, j) in dists.iter().take(k) {
            let key = ordered(rooms[i].id, rooms[j].id);
            if !present.contains(&key) {
                candidates.push((d, i, j));
            }
        }
    }
    candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

    let mut all_edges = mst_edges;
    let mut added = 0;
    for (_, i, j) in candidates {
        if added >= extra_count {
            break;
        }
        let key = ordered(rooms[i].id, rooms[j].id);
        if present.contains(&key) {
            continue;
        }
        let test_path = find_path(grid, rooms[i].center(), rooms[j].center(), cfg);
        if test_path.is_empty() || test_path.len() as i32 >= cfg.max_path_length {
            continue;
        }
        present.insert(key);
        all_edges.push((i, j));
        added += 1;
    }

    all_edges
        .into_iter()
        .map(|(i, j)| {
            let path = find_path(grid, rooms[i].center(), rooms[j].center(), cfg);
            Connection::new(rooms[i].id, rooms[j].id, path)
        })
        .collect()
}

fn ordered(a: i32, b: i32) -> (i32, i32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

fn prim_mst(rooms: &[Room]) -> Vec<(usize, usize)> {
    let n = rooms.len();
    let mut in_tree = vec![false; n];
    let mut min_cost = vec![f64::MAX; n];
    let mut min_edge = vec![0usize; n];
    in_tree[0] = true;
    for i in 1..n {
        min_cost[i] = rooms[0].center().euclidean(rooms[i].center());
        min_edge[i] = 0;
    }
    let mut edges = Vec::new();
    for _ in 1..n {
        let mut best = usize::MAX;
        let mut best_cost = f64::MAX;
        for i in 0..n {
            if !in_tree[i] && (min_cost[i] < best_cost || (min_cost[i] == best_cost && best != usize::MAX && (min_edge[i], i) < (min_edge[best], best))) {
                best_cost = min_cost[i];
                best = i;
            }
        }
        if best == usize::MAX {
            break;
        }
        in_tree[best] = true;
        edges.push((min_edge[best].min(best), min_edge[best].max(best)));
        for i in 0..n {
            if !in_tree[i] {
                let d = rooms[best].center().euclidean(rooms[i].center());
                if d < min_cost[i] {
                    min_cost[i] = d;
                    min_edge[i] = best;
                }
            }
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathfindingConfig;

    fn open_grid(w: i32, h: i32) -> Grid {
        Grid::new(w, h, CellKind::Floor)
    }

    #[test]
    fn path_to_self_is_single_point() {
        let g = open_grid(10, 10);
        let cfg = PathfindingConfig::default();
        let p = astar(&g, Point::new(2, 2), Point::new(2, 2), &cfg);
        assert_eq!(p, vec![Point::new(2, 2)]);
    }

    #[test]
    fn cardinal_only_path_has_manhattan_length() {
        let g = open_grid(20, 20);
        let cfg = PathfindingConfig::default();
        let path = astar(&g, Point::new(0, 0), Point::new(19, 19), &cfg);
        assert_eq!(path.len() as i32 - 1, 38);
    }

    #[test]
    fn diagonal_shortens_path() {
        let g = open_grid(20, 20);
        let mut cfg = PathfindingConfig::default();
        cfg.allow_diagonal = true;
        let path = astar(&g, Point::new(0, 0), Point::new(19, 19), &cfg);
        assert_eq!(path.len() as i32 - 1, 19);
    }

    #[test]
    fn no_corner_cutting() {
        let mut g = open_grid(5, 5);
        g.set(2, 1, CellKind::Wall);
        g.set(1, 2, CellKind::Wall);
        let mut cfg = PathfindingConfig::default();
        cfg.allow_diagonal = true;
        let path = astar(&g, Point::new(1, 1), Point::new(2, 2), &cfg);
        for w in path.windows(2) {
            let (dx, dy) = (w[1].x - w[0].x, w[1].y - w[0].y);
            if dx != 0 && dy != 0 {
                assert_eq!(g.get(w[0].x + dx, w[0].y), CellKind::Floor);
                assert_eq!(g.get(w[0].x, w[0].y + dy), CellKind::Floor);
            }
        }
    }

    #[test]
    fn unreachable_goal_is_empty() {
        let mut g = open_grid(5, 5);
        for y in 0..5 {
            g.set(2, y, CellKind::Wall);
        }
        let cfg = PathfindingConfig::default();
        let path = astar(&g, Point::new(0, 0), Point::new(4, 4), &cfg);
        assert!(path.is_empty());
    }

    #[test]
    fn exceeding_max_path_length_is_rejected() {
        let g = open_grid(20, 20);
        let mut cfg = PathfindingConfig::default();
        cfg.max_path_length = 5;
        let path = astar(&g, Point::new(0, 0), Point::new(19, 19), &cfg);
        assert!(path.is_empty());
    }

    #[test]
    fn tunnel_wall_cost_allows_traversal() {
        let mut g = open_grid(5, 5);
        for y in 0..5 {
            g.set(2, y, CellKind::Wall);
        }
        let mut cfg = PathfindingConfig::default();
        cfg.tunnel_wall_cost = 2;
        let path = astar(&g, Point::new(0, 2), Point::new(4, 2), &cfg);
        assert!(!path.is_empty());
        assert!(path.contains(&Point::new(2, 2)));
    }

    #[test]
    fn path_is_deterministic_across_runs() {
        let g = open_grid(30, 30);
        let cfg = PathfindingConfig::default();
        let p1 = astar(&g, Point::new(0, 0), Point::new(29, 15), &cfg);
        let p2 = astar(&g, Point::new(0, 0), Point::new(29, 15), &cfg);
        assert_eq!(p1, p2);
    }

    #[test]
    fn bresenham_matches_known_cases() {
        assert_eq!(
            bresenham_line(0, 0, 3, 0),
            vec![Point::new(0, 0), Point::new(1, 0), Point::new(2, 0), Point::new(3, 0)]
        );
        assert_eq!(bresenham_line(5, 5, 5, 5), vec![Point::new(5, 5)]);
    }

    #[test]
    fn smoothing_preserves_endpoints() {
        let g = open_grid(10, 10);
        let mut cfg = PathfindingConfig::default();
        cfg.path_smoothing_passes = 1;
        let path = find_path(&g, Point::new(0, 0), Point::new(9, 0), &cfg);
        assert_eq!(*path.first().unwrap(), Point::new(0, 0));
        assert_eq!(*path.last().unwrap(), Point::new(9, 0));
    }
}
