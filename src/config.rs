//! Generation configuration (spec.md §4.8, §6).
//!
//! Plain structs with named-preset constructors, mirroring the teacher's
//! `MapGenConfig::normal()` style rather than a serde-backed config layer —
//! the core never serializes its own config (see SPEC_FULL.md §0).

use crate::error::{DelveError, FieldError};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Algorithm {
    Cellular,
    Bsp,
}

#[derive(Clone, Copy, Debug)]
pub struct RoomSizeRange {
    pub min: i32,
    pub max: i32,
}

#[derive(Clone, Debug)]
pub struct CellularConfig {
    pub initial_fill_ratio: f64,
    pub iterations: i32,
    pub birth_limit: i32,
    pub death_limit: i32,
    pub min_region_size: i32,
    pub connect_all_regions: bool,
}

impl Default for CellularConfig {
    fn default() -> Self {
        Self {
            initial_fill_ratio: 0.45,
            iterations: 4,
            birth_limit: 5,
            death_limit: 4,
            min_region_size: 25,
            connect_all_regions: false,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HeuristicKind {
    Manhattan,
    Euclidean,
    Chebyshev,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AlgorithmKind {
    AStar,
    Dijkstra,
    Jps,
}

#[derive(Clone, Debug)]
pub struct PathfindingConfig {
    pub algorithm: AlgorithmKind,
    pub heuristic: HeuristicKind,
    pub allow_diagonal: bool,
    pub max_path_length: i32,
    pub path_smoothing_passes: i32,
    pub tunnel_wall_cost: i32,
    pub corridor_width: i32,
    pub prefer_jps: bool,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            algorithm: AlgorithmKind::AStar,
            heuristic: HeuristicKind::Manhattan,
            allow_diagonal: false,
            max_path_length: 500,
            path_smoothing_passes: 0,
            tunnel_wall_cost: 0,
            corridor_width: 1,
            prefer_jps: false,
        }
    }
}

/// Recursive binary-space-partition knobs for the `bsp` strategy (spec.md
/// §2 "Partitioning Passes (sketch)").
#[derive(Clone, Debug)]
pub struct BspConfig {
    /// A leaf stops splitting once either dimension drops below this.
    pub min_leaf_size: i32,
    /// A leaf never splits past this recursion depth, guaranteeing
    /// termination regardless of `min_leaf_size`.
    pub max_depth: i32,
    /// Fractional padding (of the leaf's shorter side) left between a
    /// carved room and its leaf's edges.
    pub room_padding_ratio: f64,
}

impl Default for BspConfig {
    fn default() -> Self {
        Self { min_leaf_size: 10, max_depth: 6, room_padding_ratio: 0.15 }
    }
}

#[derive(Clone, Debug)]
pub struct DungeonConfig {
    pub width: i32,
    pub height: i32,
    pub room_count: i32,
    pub room_size_range: RoomSizeRange,
    pub algorithm: Algorithm,
    pub cellular: CellularConfig,
    pub bsp: BspConfig,
    pub pathfinding: PathfindingConfig,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            width: 60,
            height: 40,
            room_count: 6,
            room_size_range: RoomSizeRange { min: 5, max: 12 },
            algorithm: Algorithm::Cellular,
            cellular: CellularConfig::default(),
            bsp: BspConfig::default(),
            pathfinding: PathfindingConfig::default(),
        }
    }
}

impl DungeonConfig {
    pub fn validate(&self) -> Result<(), DelveError> {
        let mut errors = Vec::new();
        if self.width <= 0 {
            errors.push(FieldError::new("width", "must be > 0"));
        }
        if self.height <= 0 {
            errors.push(FieldError::new("height", "must be > 0"));
        }
        if self.room_count < 0 {
            errors.push(FieldError::new("roomCount", "must be >= 0"));
        }
        if self.room_size_range.min <= 0 || self.room_size_range.max < self.room_size_range.min {
            errors.push(FieldError::new("roomSizeRange", "min must be > 0 and max >= min"));
        }
        if self.cellular.iterations < 0 {
            errors.push(FieldError::new("cellular.iterations", "must be >= 0"));
        }
        if !(0.0..=1.0).contains(&self.cellular.initial_fill_ratio) {
            errors.push(FieldError::new("cellular.initialFillRatio", "must be in [0,1]"));
        }
        if self.pathfinding.max_path_length <= 0 {
            errors.push(FieldError::new("pathfinding.maxPathLength", "must be > 0"));
        }
        if self.pathfinding.path_smoothing_passes < 0 {
            errors.push(FieldError::new("pathfinding.pathSmoothingPasses", "must be >= 0"));
        }
        if self.pathfinding.tunnel_wall_cost < 0 {
            errors.push(FieldError::new("pathfinding.tunnelWallCost", "must be >= 0"));
        }
        if self.pathfinding.corridor_width < 1 {
            errors.push(FieldError::new("pathfinding.corridorWidth", "must be >= 1"));
        }
        if self.bsp.min_leaf_size <= 0 {
            errors.push(FieldError::new("bsp.minLeafSize", "must be > 0"));
        }
        if self.bsp.max_depth < 0 {
            errors.push(FieldError::new("bsp.maxDepth", "must be >= 0"));
        }
        if !(0.0..0.5).contains(&self.bsp.room_padding_ratio) {
            errors.push(FieldError::new("bsp.roomPaddingRatio", "must be in [0,0.5)"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DelveError::ConfigInvalid(errors))
        }
    }
}
