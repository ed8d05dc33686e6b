//! Typed artifacts exchanged between passes (spec.md §3).

use std::collections::BTreeSet;

use crate::grid::{Grid, Point};

/// A rectangular room or cavern region.
#[derive(Clone, Debug)]
pub struct Room {
    pub id: i32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub center_x: i32,
    pub center_y: i32,
    pub kind: RoomKind,
    /// Drawn from the `rooms` stream, deterministic for a given pipeline.
    pub seed: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RoomKind {
    Cavern,
    Standard,
}

impl Room {
    pub fn new(id: i32, x: i32, y: i32, width: i32, height: i32, kind: RoomKind, seed: u32) -> Self {
        let center_x = (2 * x + width - 1) / 2;
        let center_y = (2 * y + height - 1) / 2;
        Self { id, x, y, width, height, center_x, center_y, kind, seed }
    }

    pub fn bounds(&self) -> crate::grid::Bounds {
        crate::grid::Bounds {
            min_x: self.x,
            min_y: self.y,
            max_x: self.x + self.width - 1,
            max_y: self.y + self.height - 1,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.center_x, self.center_y)
    }
}

/// An inter-room edge plus the carved/found path between them.
#[derive(Clone, Debug)]
pub struct Connection {
    pub from_room_id: i32,
    pub to_room_id: i32,
    pub path: Vec<Point>,
    pub path_length: i32,
}

impl Connection {
    pub fn new(from_room_id: i32, to_room_id: i32, path: Vec<Point>) -> Self {
        let path_length = path.len() as i32;
        Self { from_room_id, to_room_id, path, path_length }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SpawnKind {
    Entrance,
    Exit,
    Other,
}

/// A tagged point in the finished dungeon.
#[derive(Clone, Debug)]
pub struct SpawnPoint {
    pub position: Point,
    pub room_id: i32,
    pub kind: SpawnKind,
    pub tags: BTreeSet<String>,
    pub weight: f32,
    pub distance_from_start: i32,
}

/// Placeholder artifact at pipeline entry.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyArtifact;

/// The mutable workbench passed between generation passes.
#[derive(Clone, Debug)]
pub struct DungeonStateArtifact {
    pub width: i32,
    pub height: i32,
    pub grid: Grid,
    pub rooms: Vec<Room>,
    /// Spanning-tree / extra edges between region or room ids, prior to
    /// path computation (kept distinct from `connections`, which carries
    /// the realized path).
    pub edges: Vec<(i32, i32)>,
    pub connections: Vec<Connection>,
    pub spawns: Vec<SpawnPoint>,
}

/// The terminal, immutable output of a generation run.
#[derive(Clone, Debug)]
pub struct DungeonArtifact {
    pub width: i32,
    pub height: i32,
    pub terrain: Vec<u8>,
    pub rooms: Vec<Room>,
    pub connections: Vec<Connection>,
    pub spawns: Vec<SpawnPoint>,
    pub checksum: String,
    pub seed: crate::seed::DungeonSeed,
}

/// Tag identifying which artifact type a pass consumes/produces, used by the
/// pipeline runner to verify adjacency (spec.md §4.7).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ArtifactKind {
    Empty,
    DungeonState,
    Dungeon,
}
