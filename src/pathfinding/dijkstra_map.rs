//! Multi-source scalar distance field (spec.md §4.5).
//!
//! Grounded on the corpus's `HexSleeves-gruid-rs` `PathRange`/dijkstra-map
//! shape (pooled distance buffer, sentinel for unreachable, downhill
//! queries), expressed with the teacher's plain-`Vec`-buffer idiom.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::grid::{CellKind, Grid, Point};

const SQRT2: f64 = std::f64::consts::SQRT_2;

#[derive(PartialEq)]
struct Entry {
    cost: i64,
    y: i32,
    x: i32,
}
impl Eq for Entry {}
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.cmp(&self.cost).then_with(|| other.y.cmp(&self.y)).then_with(|| other.x.cmp(&self.x))
    }
}
impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

const FP_SCALE: f64 = 1000.0;

pub struct DijkstraMap {
    width: i32,
    height: i32,
    distances: Vec<f64>,
}

impl DijkstraMap {
    /// Multi-source scalar distance field: cost 1 for cardinal, √2 for
    /// diagonal moves; walls are impassable; unreachable cells retain
    /// `+∞`. `max_distance` of `None` means unbounded.
    pub fn compute(grid: &Grid, goals: &[Point], max_distance: Option<f64>) -> Self {
        let w = grid.width();
        let h = grid.height();
        let idx = |p: Point| (p.y * w + p.x) as usize;
        let mut distances = vec![f64::INFINITY; (w * h) as usize];
        let mut open = BinaryHeap::new();

        for &g in goals {
            if grid.in_bounds(g.x, g.y) && grid.get(g.x, g.y) != CellKind::Wall {
                distances[idx(g)] = 0.0;
                open.push(Entry { cost: 0, y: g.y, x: g.x });
            }
        }

        while let Some(entry) = open.pop() {
            let current = Point::new(entry.x, entry.y);
            let current_dist = distances[idx(current)];
            if (entry.cost as f64 / FP_SCALE) > current_dist + 1e-6 {
                continue;
            }
            for (dx, dy, step) in neighbor_steps() {
                let np = Point::new(current.x + dx, current.y + dy);
                if !grid.in_bounds(np.x, np.y) || grid.get(np.x, np.y) == CellKind::Wall {
                    continue;
                }
                let nd = current_dist + step;
                if let Some(cap) = max_distance {
                    if nd > cap {
                        continue;
                    }
                }
                if nd < distances[idx(np)] {
                    distances[idx(np)] = nd;
                    open.push(Entry { cost: (nd * FP_SCALE) as i64, y: np.y, x: np.x });
                }
            }
        }

        Self { width: w, height: h, distances }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some((y * self.width + x) as usize)
        }
    }

    pub fn get(&self, x: i32, y: i32) -> f64 {
        self.index(x, y).map(|i| self.distances[i]).unwrap_or(f64::INFINITY)
    }

    /// Points with `lo <= d(x,y) <= hi`, in row-major order.
    pub fn get_points_in_range(&self, lo: f64, hi: f64) -> Vec<Point> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let d = self.get(x, y);
                if d >= lo && d <= hi {
                    out.push(Point::new(x, y));
                }
            }
        }
        out
    }

    /// Furthest finite-distance point; ties broken by row-major order.
    pub fn find_furthest_point(&self) -> Option<(Point, f64)> {
        let mut best: Option<(Point, f64)> = None;
        for y in 0..self.height {
            for x in 0..self.width {
                let d = self.get(x, y);
                if d.is_finite() {
                    if best.map(|(_, bd)| d > bd).unwrap_or(true) {
                        best = Some((Point::new(x, y), d));
                    }
                }
            }
        }
        best
    }

    /// Neighbor with strictly smaller distance than the center, cardinal
    /// preference on ties.
    pub fn get_downhill_direction(&self, x: i32, y: i32) -> Option<Point> {
        let center = self.get(x, y);
        if !center.is_finite() {
            return None;
        }
        let mut best: Option<(Point, f64)> = None;
        let cardinal = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        let diagonal = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
        for (dx, dy) in cardinal.into_iter().chain(diagonal) {
            let nx = x + dx;
            let ny = y + dy;
            let nd = self.get(nx, ny);
            if nd < center {
                match best {
                    None => best = Some((Point::new(nx, ny), nd)),
                    Some((_, bd)) if nd < bd => best = Some((Point::new(nx, ny), nd)),
                    _ => {}
                }
            }
        }
        best.map(|(p, _)| p)
    }

    /// Flee map: `d' = -1.2 * d`, then one smoothing pass averaging with
    /// 4-neighbors, to encourage routes away from the source set.
    pub fn into_flee_map(self) -> DijkstraMap {
        let w = self.width;
        let h = self.height;
        let mut flipped: Vec<f64> = self
            .distances
            .iter()
            .map(|&d| if d.is_finite() { -1.2 * d } else { d })
            .collect();
        let get = |buf: &[f64], x: i32, y: i32| -> f64 {
            if x < 0 || y < 0 || x >= w || y >= h {
                return f64::INFINITY;
            }
            buf[(y * w + x) as usize]
        };
        let mut smoothed = flipped.clone();
        for y in 0..h {
            for x in 0..w {
                let center = get(&flipped, x, y);
                if !center.is_finite() {
                    continue;
                }
                let mut sum = center;
                let mut count = 1.0;
                for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                    let n = get(&flipped, x + dx, y + dy);
                    if n.is_finite() {
                        sum += n;
                        count += 1.0;
                    }
                }
                smoothed[(y * w + x) as usize] = sum / count;
            }
        }
        std::mem::swap(&mut flipped, &mut smoothed);
        DijkstraMap { width: w, height: h, distances: flipped }
    }
}

fn neighbor_steps() -> [(i32, i32, f64); 8] {
    [
        (1, 0, 1.0),
        (-1, 0, 1.0),
        (0, 1, 1.0),
        (0, -1, 1.0),
        (1, 1, SQRT2),
        (1, -1, SQRT2),
        (-1, 1, SQRT2),
        (-1, -1, SQRT2),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_distance_is_zero() {
        let g = Grid::new(5, 5, CellKind::Floor);
        let map = DijkstraMap::compute(&g, &[Point::new(2, 2)], None);
        assert_eq!(map.get(2, 2), 0.0);
    }

    #[test]
    fn oob_is_infinite() {
        let g = Grid::new(5, 5, CellKind::Floor);
        let map = DijkstraMap::compute(&g, &[Point::new(0, 0)], None);
        assert!(map.get(-1, -1).is_infinite());
    }

    #[test]
    fn walls_are_impassable() {
        let mut g = Grid::new(5, 5, CellKind::Floor);
        for y in 0..5 {
            g.set(2, y, CellKind::Wall);
        }
        let map = DijkstraMap::compute(&g, &[Point::new(0, 0)], None);
        assert!(map.get(4, 0).is_infinite());
    }

    #[test]
    fn max_distance_cuts_off() {
        let g = Grid::new(10, 10, CellKind::Floor);
        let map = DijkstraMap::compute(&g, &[Point::new(0, 0)], Some(3.0));
        assert!(map.get(9, 9).is_infinite());
        assert!(map.get(3, 0) <= 3.0);
    }

    #[test]
    fn furthest_point_is_consistent() {
        let g = Grid::new(5, 1, CellKind::Floor);
        let map = DijkstraMap::compute(&g, &[Point::new(0, 0)], None);
        let (p, d) = map.find_furthest_point().unwrap();
        assert_eq!(p, Point::new(4, 0));
        assert_eq!(d, 4.0);
    }

    #[test]
    fn downhill_prefers_cardinal_on_tie() {
        let g = Grid::new(3, 3, CellKind::Floor);
        let map = DijkstraMap::compute(&g, &[Point::new(0, 0)], None);
        let dir = map.get_downhill_direction(1, 1).unwrap();
        // (0,1) and (1,0) are both distance 1 from goal, and (0,1) is a
        // cardinal neighbor reached before diagonal candidates.
        assert!(dir == Point::new(0, 1) || dir == Point::new(1, 0));
    }

    #[test]
    fn flee_map_inverts_sign() {
        let g = Grid::new(5, 5, CellKind::Floor);
        let map = DijkstraMap::compute(&g, &[Point::new(0, 0)], None);
        let original_far = map.get(4, 4);
        let flee = map.into_flee_map();
        assert!(flee.get(4, 4) < 0.0);
        assert!(flee.get(4, 4).abs() < original_far * 1.5 + 1.0);
    }
}
