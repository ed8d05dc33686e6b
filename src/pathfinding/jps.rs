//! Strict 4-directional Jump-Point-Search, floor-only (spec.md §4.4, §9 —
//! the corpus's JPS variant treats some diagonals permissively; this core
//! mandates strict 4-directional floor-only JPS, a deliberate choice
//! recorded in DESIGN.md).

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::grid::{CellKind, Grid, Point};

const DIRS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

fn walkable(grid: &Grid, x: i32, y: i32) -> bool {
    grid.in_bounds(x, y) && grid.get(x, y) == CellKind::Floor
}

/// Memoizes `jump` results keyed by `(x, y, dx, dy)` — every recursive
/// perpendicular probe below starts a fresh straight run, so without this
/// the same sub-runs get re-walked once per cell on open floor.
type JumpCache = HashMap<(i32, i32, i32, i32), Option<Point>>;

/// Walk straight from `(x, y)` along `(dx, dy)` until a jump point is
/// found: the goal, a forced neighbor, or a cell from which a perpendicular
/// jump itself finds one — a turn is the only way to reach the goal on open
/// floor, so cardinal-only JPS must probe the perpendicular axis at every
/// step, not just check for obstacle-forced neighbors. Returns `None` at a
/// dead end.
fn jump(grid: &Grid, x: i32, y: i32, dx: i32, dy: i32, goal: Point, cache: &mut JumpCache) -> Option<Point> {
    let key = (x, y, dx, dy);
    if let Some(&cached) = cache.get(&key) {
        return cached;
    }
    let result = jump_uncached(grid, x, y, dx, dy, goal, cache);
    cache.insert(key, result);
    result
}

fn jump_uncached(grid: &Grid, x: i32, y: i32, dx: i32, dy: i32, goal: Point, cache: &mut JumpCache) -> Option<Point> {
    let (mut cx, mut cy) = (x + dx, y + dy);
    loop {
        if !walkable(grid, cx, cy) {
            return None;
        }
        if cx == goal.x && cy == goal.y {
            return Some(Point::new(cx, cy));
        }
        if has_forced_neighbor(grid, cx, cy, dx, dy) {
            return Some(Point::new(cx, cy));
        }
        let (perp_a, perp_b) = if dx != 0 { ((0, 1), (0, -1)) } else { ((1, 0), (-1, 0)) };
        if jump(grid, cx, cy, perp_a.0, perp_a.1, goal, cache).is_some()
            || jump(grid, cx, cy, perp_b.0, perp_b.1, goal, cache).is_some()
        {
            return Some(Point::new(cx, cy));
        }
        cx += dx;
        cy += dy;
    }
}

/// A forced neighbor exists when a cell adjacent to the travel direction is
/// blocked but the cell beyond it (in the direction of travel) is open —
/// derived from single-step blocking cells per spec.md §4.4.
fn has_forced_neighbor(grid: &Grid, x: i32, y: i32, dx: i32, dy: i32) -> bool {
    if dx != 0 {
        let blocked_up = !walkable(grid, x, y + 1);
        let open_up_ahead = walkable(grid, x + dx, y + 1);
        let blocked_down = !walkable(grid, x, y - 1);
        let open_down_ahead = walkable(grid, x + dx, y - 1);
        (blocked_up && open_up_ahead) || (blocked_down && open_down_ahead)
    } else {
        let blocked_right = !walkable(grid, x + 1, y);
        let open_right_ahead = walkable(grid, x + 1, y + dy);
        let blocked_left = !walkable(grid, x - 1, y);
        let open_left_ahead = walkable(grid, x - 1, y + dy);
        (blocked_right && open_right_ahead) || (blocked_left && open_left_ahead)
    }
}

#[derive(PartialEq)]
struct Entry {
    f: i64,
    h: i64,
    y: i32,
    x: i32,
}
impl Eq for Entry {}
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.cmp(&self.f).then_with(|| other.h.cmp(&self.h)).then_with(|| other.y.cmp(&self.y)).then_with(|| other.x.cmp(&self.x))
    }
}
impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Classical 4-directional JPS. Returns a dense path (intermediate cells
/// filled by cardinal steps between consecutive jump points) or an empty
/// vec if no path exists or `start`/`goal` are not floor.
pub fn jump_point_search(grid: &Grid, start: Point, goal: Point, max_path_length: i32) -> Vec<Point> {
    if start == goal {
        if walkable(grid, start.x, start.y) {
            return vec![start];
        }
        return Vec::new();
    }
    if !walkable(grid, start.x, start.y) || !walkable(grid, goal.x, goal.y) {
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
    let h0 = start.manhattan(goal) as f64;
    open.push(Entry { f: h0 as i64, h: h0 as i64, y: start.y, x: start.x });
    let mut cache: JumpCache = HashMap::new();

    while let Some(entry) = open.pop() {
        let current = Point::new(entry.x, entry.y);
        if closed[idx(current)] {
            continue;
        }
        closed[idx(current)] = true;
        if current == goal {
            let sparse = reconstruct(&came_from, idx, start, goal);
            let dense = densify(&sparse);
            return if dense.len() as i32 > max_path_length { Vec::new() } else { dense };
        }

        for (dx, dy) in DIRS {
            if let Some(jp) = jump(grid, current.x, current.y, dx, dy, goal, &mut cache) {
                if closed[idx(jp)] {
                    continue;
                }
                let step_cost = current.manhattan(jp) as f64;
                let tentative = g_score[idx(current)] + step_cost;
                if tentative < g_score[idx(jp)] {
                    g_score[idx(jp)] = tentative;
                    came_from[idx(jp)] = Some(current);
                    let f = tentative + jp.manhattan(goal) as f64;
                    open.push(Entry { f: f as i64, h: jp.manhattan(goal) as i64, y: jp.y, x: jp.x });
                }
            }
        }
    }
    Vec::new()
}

fn reconstruct(came_from: &[Option<Point>], idx: impl Fn(Point) -> usize, start: Point, goal: Point) -> Vec<Point> {
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

/// Fill the intermediate cells between consecutive jump points by cardinal
/// steps so downstream consumers receive a dense path.
fn densify(sparse: &[Point]) -> Vec<Point> {
    if sparse.is_empty() {
        return Vec::new();
    }
    let mut dense = vec![sparse[0]];
    for w in sparse.windows(2) {
        let (a, b) = (w[0], w[1]);
        let (dx, dy) = ((b.x - a.x).signum(), (b.y - a.y).signum());
        let mut cur = a;
        while cur != b {
            cur = Point::new(cur.x + dx, cur.y + dy);
            dense.push(cur);
        }
    }
    dense
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_line_on_open_floor() {
        let g = Grid::new(20, 20, CellKind::Floor);
        let path = jump_point_search(&g, Point::new(0, 0), Point::new(19, 0), 100);
        assert_eq!(path.len(), 20);
        assert_eq!(*path.last().unwrap(), Point::new(19, 0));
    }

    #[test]
    fn matches_astar_length_on_open_grid() {
        let g = Grid::new(20, 20, CellKind::Floor);
        let path = jump_point_search(&g, Point::new(0, 0), Point::new(19, 19), 100);
        // Strict 4-directional JPS: Manhattan distance, same as A* cardinal-only.
        assert_eq!(path.len() as i32 - 1, 38);
    }

    #[test]
    fn blocked_goal_returns_empty() {
        let mut g = Grid::new(5, 5, CellKind::Floor);
        g.set(4, 4, CellKind::Wall);
        let path = jump_point_search(&g, Point::new(0, 0), Point::new(4, 4), 100);
        assert!(path.is_empty());
    }

    #[test]
    fn unreachable_returns_empty() {
        let mut g = Grid::new(5, 5, CellKind::Floor);
        for y in 0..5 {
            g.set(2, y, CellKind::Wall);
        }
        let path = jump_point_search(&g, Point::new(0, 0), Point::new(4, 4), 100);
        assert!(path.is_empty());
    }

    #[test]
    fn start_equals_goal() {
        let g = Grid::new(5, 5, CellKind::Floor);
        let path = jump_point_search(&g, Point::new(2, 2), Point::new(2, 2), 100);
        assert_eq!(path, vec![Point::new(2, 2)]);
    }
}
