//! Deterministic procedural dungeon-generation kernel.
//!
//! A seed and a `DungeonConfig` go in; a `generate`/`passes` pass chain runs
//! over independently-seeded RNG streams (spec.md §4.1); a finalized,
//! checksummed `DungeonArtifact` comes out. Two generation strategies share
//! one pipeline contract: `cellular` (cave, via cellular automata) and `bsp`
//! (room-and-corridor, via recursive space partitioning).

pub mod cavern;
pub mod checksum;
pub mod config;
pub mod error;
pub mod flood;
pub mod generate;
pub mod grid;
pub mod hasher;
pub mod passes;
pub mod pathfinding;
pub mod pipeline;
pub mod rng;
pub mod seed;
pub mod streams;
pub mod trace;
pub mod unionfind;

pub use checksum::{Severity, Violation};
pub use config::{Algorithm, BspConfig, CellularConfig, DungeonConfig, PathfindingConfig, RoomSizeRange};
pub use error::{DelveError, DelveResult, FieldError};
pub use generate::{ensure_valid, generate, generate_progress, generate_with_trace, validate, ValidationReport};
pub use pipeline::artifact::{
    Connection, DungeonArtifact, DungeonStateArtifact, EmptyArtifact, Room, RoomKind, SpawnKind, SpawnPoint,
};
pub use seed::{DungeonSeed, SeedInput, SeedManager, SeedOptions};
pub use trace::{CancelToken, CollectingTraceSink, FnProgressSink, NullCancelToken, NullProgressSink, NullTraceSink, ProgressSink, TraceSink};
