//! Checksum computation and post-generation invariant validation (spec.md
//! §4.9).
//!
//! Grounded on `hasher.rs`'s incremental FNV-1a accumulator, generalizing
//! the teacher's single-purpose terrain hash into a field-ordered digest
//! over the whole finished artifact.

use crate::flood::{find_regions, FindRegionsOptions};
use crate::grid::{CellKind, Grid};
use crate::hasher::Fnv1a64;
use crate::pipeline::artifact::{DungeonArtifact, RoomKind, SpawnKind};
use crate::unionfind::UnionFind;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Violation {
    pub r#type: String,
    pub message: String,
    pub severity: Severity,
}

impl Violation {
    fn error(r#type: &str, message: impl Into<String>) -> Self {
        Self { r#type: r#type.to_string(), message: message.into(), severity: Severity::Error }
    }

    fn warning(r#type: &str, message: impl Into<String>) -> Self {
        Self { r#type: r#type.to_string(), message: message.into(), severity: Severity::Warning }
    }
}

/// Field order per spec.md §4.9: version, terrain bytes, per-room geometry,
/// per-connection endpoints, per-spawn identity (tags sorted lexically).
/// Returned as `v{VERSION}:{16-hex-digest}`; two checksums are comparable
/// only when their version prefixes match (spec.md §6).
pub fn compute_checksum(artifact: &DungeonArtifact) -> String {
    let version = version_as_int32(&artifact.seed.version);
    let mut h = Fnv1a64::new();
    h.update_int32(version);
    h.update_bytes(&artifact.terrain);

    for room in &artifact.rooms {
        h.update_int32(room.x);
        h.update_int32(room.y);
        h.update_int32(room.width);
        h.update_int32(room.height);
    }

    for conn in &artifact.connections {
        h.update_int32(conn.from_room_id);
        h.update_int32(conn.to_room_id);
    }

    for spawn in &artifact.spawns {
        h.update_int32(spawn.position.x);
        h.update_int32(spawn.position.y);
        h.update_int32(spawn.room_id);
        h.update_string(spawn_kind_as_str(spawn.kind));
        let mut tags: Vec<&String> = spawn.tags.iter().collect();
        tags.sort();
        for tag in tags {
            h.update_string(tag);
        }
    }

    format!("v{version}:{}", h.digest())
}

/// Version strings are recorded in `DungeonSeed` as semver text; the
/// checksum only needs a stable numeric projection, so the major component
/// is hashed (falling back to 0 on a malformed string, which `validate_seed`
/// should already have rejected upstream).
fn version_as_int32(version: &str) -> i32 {
    version.split('.').next().and_then(|s| s.parse::<i32>().ok()).unwrap_or(0)
}

fn spawn_kind_as_str(kind: SpawnKind) -> &'static str {
    match kind {
        SpawnKind::Entrance => "entrance",
        SpawnKind::Exit => "exit",
        SpawnKind::Other => "other",
    }
}

/// Runs every post-generation invariant from spec.md §4.9 and returns the
/// violations found (empty means the artifact is valid).
pub fn validate(artifact: &DungeonArtifact) -> Vec<Violation> {
    let mut violations = Vec::new();

    let entrances: Vec<_> = artifact.spawns.iter().filter(|s| s.kind == SpawnKind::Entrance).collect();
    let exits: Vec<_> = artifact.spawns.iter().filter(|s| s.kind == SpawnKind::Exit).collect();
    if entrances.len() != 1 {
        violations.push(Violation::error(
            "invariant.spawn.count",
            format!("expected exactly one entrance, found {}", entrances.len()),
        ));
    }
    if exits.len() != 1 {
        violations.push(Violation::error("invariant.spawn.count", format!("expected exactly one exit, found {}", exits.len())));
    }

    let grid = terrain_to_grid(artifact);

    for spawn in &artifact.spawns {
        if grid.get(spawn.position.x, spawn.position.y) != CellKind::Floor {
            let kind = match spawn.kind {
                SpawnKind::Entrance => "invariant.entrance.floor",
                SpawnKind::Exit => "invariant.exit.floor",
                SpawnKind::Other => "invariant.spawn.floor",
            };
            violations.push(Violation::error(
                kind,
                format!("spawn at ({}, {}) is not on floor", spawn.position.x, spawn.position.y),
            ));
        }
    }

    if let Some(entrance) = entrances.first() {
        check_room_reachability(&grid, entrance.position, artifact, &mut violations);
    }

    check_room_graph_connected(artifact, &mut violations);
    check_room_bounds(artifact, &mut violations);
    check_room_overlap(artifact, &mut violations);

    let recomputed = compute_checksum(artifact);
    if recomputed != artifact.checksum {
        violations.push(Violation::error(
            "invariant.checksum",
            format!("recomputed checksum {recomputed} does not match stored {}", artifact.checksum),
        ));
    }

    violations
}

fn terrain_to_grid(artifact: &DungeonArtifact) -> Grid {
    let mut grid = Grid::new(artifact.width, artifact.height, CellKind::Wall);
    for y in 0..artifact.height {
        for x in 0..artifact.width {
            let i = (y * artifact.width + x) as usize;
            let kind = artifact.terrain.get(i).copied().map(CellKind::from_byte).unwrap_or(CellKind::Wall);
            grid.set(x, y, kind);
        }
    }
    grid
}

fn check_room_reachability(
    grid: &Grid,
    entrance: crate::grid::Point,
    artifact: &DungeonArtifact,
    violations: &mut Vec<Violation>,
) {
    use std::collections::VecDeque;
    let w = grid.width();
    let h = grid.height();
    let mut visited = vec![false; (w * h) as usize];
    let idx = |x: i32, y: i32| (y * w + x) as usize;
    let mut queue = VecDeque::new();
    if grid.in_bounds(entrance.x, entrance.y) {
        visited[idx(entrance.x, entrance.y)] = true;
        queue.push_back(entrance);
    }
    while let Some(p) = queue.pop_front() {
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let (nx, ny) = (p.x + dx, p.y + dy);
            if !grid.in_bounds(nx, ny) || visited[idx(nx, ny)] {
                continue;
            }
            if grid.get(nx, ny) == CellKind::Wall {
                continue;
            }
            visited[idx(nx, ny)] = true;
            queue.push_back(crate::grid::Point::new(nx, ny));
        }
    }

    for room in &artifact.rooms {
        let b = room.bounds();
        let mut has_floor = false;
        let mut reachable = false;
        for y in b.min_y.max(0)..=b.max_y.min(h - 1) {
            for x in b.min_x.max(0)..=b.max_x.min(w - 1) {
                if grid.get(x, y) != CellKind::Floor {
                    continue;
                }
                has_floor = true;
                if visited[idx(x, y)] {
                    reachable = true;
                    break;
                }
            }
            if reachable {
                break;
            }
        }
        if has_floor && !reachable {
            violations.push(Violation::error(
                "invariant.reachability",
                format!("room {} has no floor cell reachable from the entrance", room.id),
            ));
        }
    }
    for spawn in &artifact.spawns {
        if grid.in_bounds(spawn.position.x, spawn.position.y) && !visited[idx(spawn.position.x, spawn.position.y)] {
            violations.push(Violation::error(
                "invariant.reachability",
                format!("spawn in room {} is not reachable from the entrance", spawn.room_id),
            ));
        }
    }
}

fn check_room_graph_connected(artifact: &DungeonArtifact, violations: &mut Vec<Violation>) {
    let n = artifact.rooms.len();
    if n == 0 {
        return;
    }
    let id_to_index: std::collections::HashMap<i32, usize> =
        artifact.rooms.iter().enumerate().map(|(i, r)| (r.id, i)).collect();
    let mut uf = UnionFind::new(n);
    for conn in &artifact.connections {
        if let (Some(&a), Some(&b)) = (id_to_index.get(&conn.from_room_id), id_to_index.get(&conn.to_room_id)) {
            uf.union(a, b);
        }
    }
    let root = uf.find(0);
    for i in 1..n {
        if uf.find(i) != root {
            violations.push(Violation::error(
                "invariant.connectivity",
                "room connection graph is not spanning: at least one room is unreachable via connections",
            ));
            return;
        }
    }
}

fn check_room_bounds(artifact: &DungeonArtifact, violations: &mut Vec<Violation>) {
    for room in &artifact.rooms {
        let b = room.bounds();
        if b.min_x < 0 || b.min_y < 0 || b.max_x >= artifact.width || b.max_y >= artifact.height {
            violations.push(Violation::error(
                "invariant.bounds",
                format!("room {} bounds exceed the dungeon grid", room.id),
            ));
        }
    }
}

fn check_room_overlap(artifact: &DungeonArtifact, violations: &mut Vec<Violation>) {
    let standard: Vec<_> = artifact.rooms.iter().filter(|r| r.kind == RoomKind::Standard).collect();
    for i in 0..standard.len() {
        for j in (i + 1)..standard.len() {
            if standard[i].bounds().overlaps(&standard[j].bounds()) {
                violations.push(Violation::error(
                    "invariant.overlap",
                    format!("standard rooms {} and {} overlap", standard[i].id, standard[j].id),
                ));
            }
        }
    }
}

/// Convenience used by callers who only want region suitability information
/// alongside checksum validation (not itself an invariant): counts passable
/// floor regions in the finished terrain.
pub fn floor_region_count(artifact: &DungeonArtifact) -> usize {
    let grid = terrain_to_grid(artifact);
    find_regions(&grid, CellKind::Floor, FindRegionsOptions::default()).len()
}
