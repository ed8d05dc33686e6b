//! Cavern analyzer: region classification, room-placement suitability
//! filtering, and an optional inter-region reachability graph (spec.md §2
//! "Cavern Analyzer").
//!
//! Sits downstream of `flood::find_regions`, giving callers (and the
//! `cellular` passes, which inline the simplest case of this) a reusable
//! way to ask "which of these regions are worth turning into a room" and
//! "which regions could a tunnel actually reach" without re-running BFS.

use crate::config::PathfindingConfig;
use crate::flood::Region;
use crate::grid::Grid;
use crate::pathfinding::find_path;

/// A coarse shape classification for a connected floor region.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RegionSuitability {
    /// Below the caller's `minRegionSize` — not worth keeping.
    TooSmall,
    /// Large bounding box relative to cell count — a winding corridor or
    /// crack, not a good room candidate.
    Corridor,
    /// Compact and large enough to read as a room/cavern.
    Cavern,
}

/// Fraction of a region's bounding box actually occupied by the region.
/// Corridors snake through a large box while filling little of it; caverns
/// are blobbier and fill more.
fn fill_ratio(region: &Region) -> f64 {
    let area = (region.bounds.width() as f64) * (region.bounds.height() as f64);
    if area <= 0.0 {
        0.0
    } else {
        region.size as f64 / area
    }
}

/// Classifies a single region. `corridor_fill_threshold` is the fill-ratio
/// cutoff below which a region reads as a corridor rather than a cavern
/// (typically ~0.3).
pub fn classify(region: &Region, min_region_size: i32, corridor_fill_threshold: f64) -> RegionSuitability {
    if region.size < min_region_size {
        RegionSuitability::TooSmall
    } else if fill_ratio(region) < corridor_fill_threshold {
        RegionSuitability::Corridor
    } else {
        RegionSuitability::Cavern
    }
}

/// Filters `regions` down to those classified `Cavern` — the set a caller
/// should actually carve rooms into, in original (row-major first-seen)
/// order.
pub fn suitable_for_room_placement<'r>(
    regions: &'r [Region],
    min_region_size: i32,
    corridor_fill_threshold: f64,
) -> Vec<&'r Region> {
    regions
        .iter()
        .filter(|r| classify(r, min_region_size, corridor_fill_threshold) == RegionSuitability::Cavern)
        .collect()
}

/// A representative point for a region: its bounding-box center, clamped to
/// a point actually within the region if the exact center isn't (cheap
/// nearest-by-index fallback since regions are typically blob-shaped).
fn representative_point(region: &Region) -> crate::grid::Point {
    let cx = (region.bounds.min_x + region.bounds.max_x) / 2;
    let cy = (region.bounds.min_y + region.bounds.max_y) / 2;
    let target = crate::grid::Point::new(cx, cy);
    *region
        .points
        .iter()
        .min_by_key(|p| p.manhattan(target))
        .unwrap_or(&region.points[0])
}

/// Builds the edge set of regions that are mutually reachable under the
/// given pathfinding config (typically with `tunnel_wall_cost > 0`, so
/// "reachable" means "connectable by a tunnel of acceptable cost" rather
/// than already-open floor). Edge `(i, j)` with `i < j` indexes into
/// `regions`, not region ids.
pub fn reachability_graph(regions: &[Region], grid: &Grid, cfg: &PathfindingConfig) -> Vec<(usize, usize)> {
    let points: Vec<_> = regions.iter().map(representative_point).collect();
    let mut edges = Vec::new();
    for i in 0..regions.len() {
        for j in (i + 1)..regions.len() {
            let path = find_path(grid, points[i], points[j], cfg);
            if !path.is_empty() {
                edges.push((i, j));
            }
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flood::{find_regions, FindRegionsOptions};
    use crate::grid::CellKind;

    fn grid_from_ascii(rows: &[&str]) -> Grid {
        let height = rows.len() as i32;
        let width = rows[0].len() as i32;
        let mut g = Grid::new(width, height, CellKind::Wall);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '.' {
                    g.set(x as i32, y as i32, CellKind::Floor);
                }
            }
        }
        g
    }

    #[test]
    fn small_region_is_too_small() {
        let g = grid_from_ascii(&["..#", "###", "###"]);
        let regions = find_regions(&g, CellKind::Floor, FindRegionsOptions::default());
        assert_eq!(classify(&regions[0], 10, 0.3), RegionSuitability::TooSmall);
    }

    #[test]
    fn solid_block_is_cavern() {
        let g = grid_from_ascii(&["####", "#..#", "#..#", "####"]);
        let regions = find_regions(&g, CellKind::Floor, FindRegionsOptions::default());
        assert_eq!(classify(&regions[0], 2, 0.3), RegionSuitability::Cavern);
    }

    #[test]
    fn thin_winding_path_is_corridor() {
        let g = grid_from_ascii(&[
            "..........",
            "#########.",
            ".........#",
            "#.#########",
        ]);
        let regions = find_regions(&g, CellKind::Floor, FindRegionsOptions { min_size: 1, diagonal: false });
        let snake = regions.iter().max_by_key(|r| r.size).unwrap();
        assert_eq!(classify(snake, 1, 0.3), RegionSuitability::Corridor);
    }

    #[test]
    fn suitable_filter_excludes_non_cavern() {
        let g = grid_from_ascii(&["####.", "#..#.", "#..#.", "#####"]);
        let regions = find_regions(&g, CellKind::Floor, FindRegionsOptions { min_size: 1, diagonal: false });
        let suitable = suitable_for_room_placement(&regions, 2, 0.3);
        assert!(suitable.iter().all(|r| r.size >= 2));
    }

    #[test]
    fn reachability_graph_finds_tunnelable_pairs() {
        let g = grid_from_ascii(&["#.#.#", "#.#.#", "#.#.#"]);
        let regions = find_regions(&g, CellKind::Floor, FindRegionsOptions { min_size: 1, diagonal: false });
        assert_eq!(regions.len(), 2);
        let mut cfg = PathfindingConfig::default();
        cfg.tunnel_wall_cost = 3;
        let edges = reachability_graph(&regions, &g, &cfg);
        assert_eq!(edges, vec![(0, 1)]);
    }

    #[test]
    fn reachability_graph_empty_without_tunneling() {
        let g = grid_from_ascii(&["#.#.#", "#.#.#", "#.#.#"]);
        let regions = find_regions(&g, CellKind::Floor, FindRegionsOptions { min_size: 1, diagonal: false });
        let cfg = PathfindingConfig::default();
        let edges = reachability_graph(&regions, &g, &cfg);
        assert!(edges.is_empty());
    }
}
