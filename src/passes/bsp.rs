//! Space-partition ("room-and-corridor") generation passes (spec.md §2
//! "Partitioning Passes (sketch)", §4.4 room-pair construction).
//!
//! `empty → initializePartition → partitionAndCarveRooms → connectLeaves →
//! placeEntranceExit → finalize`. The last two passes are the exact
//! `cellular` passes reused unchanged — both strategies share the same
//! `DungeonStateArtifact` contract (spec.md §2), and nothing about entrance
//! placement or finalization is cave-specific.

use crate::config::BspConfig;
use crate::error::DelveError;
use crate::grid::{Bounds, CellKind, Grid, Point};
use crate::pathfinding::bresenham_line;
use crate::pipeline::artifact::{
    ArtifactKind, Connection, DungeonArtifact, DungeonStateArtifact, EmptyArtifact, Room, RoomKind,
};
use crate::pipeline::{Pass, PipelineContext};
use crate::rng::Rng;
use crate::streams::StreamName;

use super::cellular::{FinalizePass, PlaceEntranceExitPass};

pub struct InitializePartitionPass;

impl Pass<EmptyArtifact, DungeonStateArtifact> for InitializePartitionPass {
    fn id(&self) -> &'static str {
        "initializePartition"
    }
    fn input_type(&self) -> ArtifactKind {
        ArtifactKind::Empty
    }
    fn output_type(&self) -> ArtifactKind {
        ArtifactKind::DungeonState
    }
    fn required_streams(&self) -> &'static [StreamName] {
        &[]
    }

    fn run(&self, _input: EmptyArtifact, ctx: &mut PipelineContext) -> Result<DungeonStateArtifact, DelveError> {
        let width = ctx.config.width;
        let height = ctx.config.height;
        log::debug!("initializePartition: {width}x{height} all-wall grid");
        Ok(DungeonStateArtifact {
            width,
            height,
            grid: Grid::new(width, height, CellKind::Wall),
            rooms: Vec::new(),
            edges: Vec::new(),
            connections: Vec::new(),
            spawns: Vec::new(),
        })
    }
}

/// A node of the recursive binary partition; leaves carry the bounds a room
/// is carved into, internal nodes just the split.
enum BspNode {
    Leaf(Bounds),
    Split(Box<BspNode>, Box<BspNode>),
}

fn build_tree(bounds: Bounds, depth: i32, cfg: &BspConfig, rng: &mut Rng) -> BspNode {
    if depth >= cfg.max_depth {
        return BspNode::Leaf(bounds);
    }
    match split_once(bounds, cfg, rng) {
        Some((a, b)) => BspNode::Split(Box::new(build_tree(a, depth + 1, cfg, rng)), Box::new(build_tree(b, depth + 1, cfg, rng))),
        None => BspNode::Leaf(bounds),
    }
}

/// Splits along whichever axis is longer (ties broken horizontally), at a
/// jittered point in the middle third, provided both children would still
/// meet `min_leaf_size`. Returns `None` when the bounds are too small to
/// split further.
fn split_once(bounds: Bounds, cfg: &BspConfig, rng: &mut Rng) -> Option<(Bounds, Bounds)> {
    let w = bounds.width();
    let h = bounds.height();
    let split_horizontal = w >= h;
    if split_horizontal {
        if w < 2 * cfg.min_leaf_size {
            return None;
        }
        let lo = bounds.min_x + cfg.min_leaf_size;
        let hi = bounds.max_x - cfg.min_leaf_size;
        if hi < lo {
            return None;
        }
        let cut = rng.range(lo, hi);
        Some((
            Bounds { min_x: bounds.min_x, min_y: bounds.min_y, max_x: cut, max_y: bounds.max_y },
            Bounds { min_x: cut + 1, min_y: bounds.min_y, max_x: bounds.max_x, max_y: bounds.max_y },
        ))
    } else {
        if h < 2 * cfg.min_leaf_size {
            return None;
        }
        let lo = bounds.min_y + cfg.min_leaf_size;
        let hi = bounds.max_y - cfg.min_leaf_size;
        if hi < lo {
            return None;
        }
        let cut = rng.range(lo, hi);
        Some((
            Bounds { min_x: bounds.min_x, min_y: bounds.min_y, max_x: bounds.max_x, max_y: cut },
            Bounds { min_x: bounds.min_x, min_y: cut + 1, max_x: bounds.max_x, max_y: bounds.max_y },
        ))
    }
}

/// Post-order: carves one room per leaf, and records a sibling edge (one
/// room from each side) at every internal merge so `connectLeaves` has a
/// spanning set of corridors to carve. Returns the room ids carved within
/// this subtree (for the next merge up).
fn carve_and_collect(
    node: &BspNode,
    grid: &mut Grid,
    room_size_range: (i32, i32),
    bsp_cfg: &BspConfig,
    rng: &mut Rng,
    next_id: &mut i32,
    rooms: &mut Vec<Room>,
    edges: &mut Vec<(i32, i32)>,
) -> Vec<i32> {
    match node {
        BspNode::Leaf(bounds) => {
            let id = *next_id;
            *next_id += 1;
            let room = carve_room(*bounds, room_size_range, bsp_cfg, rng, id);
            grid.fill_rect(room.bounds(), CellKind::Floor);
            rooms.push(room);
            vec![id]
        }
        BspNode::Split(left, right) => {
            let left_ids = carve_and_collect(left, grid, room_size_range, bsp_cfg, rng, next_id, rooms, edges);
            let right_ids = carve_and_collect(right, grid, room_size_range, bsp_cfg, rng, next_id, rooms, edges);
            if let (Some(&a), Some(&b)) = (left_ids.first(), right_ids.first()) {
                edges.push((a, b));
            }
            left_ids.into_iter().chain(right_ids).collect()
        }
    }
}

/// Sizes and positions a single room inside `bounds`, clipped to
/// `room_size_range` and padded by `bsp.room_padding_ratio` of the leaf's
/// shorter side.
fn carve_room(bounds: Bounds, (min_edge, max_edge): (i32, i32), bsp_cfg: &BspConfig, rng: &mut Rng, id: i32) -> Room {
    let short_side = bounds.width().min(bounds.height());
    let padding = ((short_side as f64) * bsp_cfg.room_padding_ratio).floor() as i32;
    let avail_w = (bounds.width() - 2 * padding).max(1);
    let avail_h = (bounds.height() - 2 * padding).max(1);

    let width = rng.range(min_edge, max_edge).min(avail_w).max(1);
    let height = rng.range(min_edge, max_edge).min(avail_h).max(1);

    let slack_x = avail_w - width;
    let slack_y = avail_h - height;
    let x = bounds.min_x + padding + if slack_x > 0 { rng.range(0, slack_x) } else { 0 };
    let y = bounds.min_y + padding + if slack_y > 0 { rng.range(0, slack_y) } else { 0 };

    let seed = rng.next_u32();
    Room::new(id, x, y, width, height, RoomKind::Standard, seed)
}

pub struct PartitionAndCarveRoomsPass;

impl Pass<DungeonStateArtifact, DungeonStateArtifact> for PartitionAndCarveRoomsPass {
    fn id(&self) -> &'static str {
        "partitionAndCarveRooms"
    }
    fn input_type(&self) -> ArtifactKind {
        ArtifactKind::DungeonState
    }
    fn output_type(&self) -> ArtifactKind {
        ArtifactKind::DungeonState
    }
    fn required_streams(&self) -> &'static [StreamName] {
        &[StreamName::Layout, StreamName::Rooms]
    }

    fn run(&self, mut input: DungeonStateArtifact, ctx: &mut PipelineContext) -> Result<DungeonStateArtifact, DelveError> {
        let bsp_cfg = ctx.config.bsp.clone();
        let room_size_range = (ctx.config.room_size_range.min, ctx.config.room_size_range.max);
        let bounds = Bounds { min_x: 0, min_y: 0, max_x: input.width - 1, max_y: input.height - 1 };

        let tree = build_tree(bounds, 0, &bsp_cfg, ctx.streams.get_mut(StreamName::Layout));

        let mut rooms = Vec::new();
        let mut edges = Vec::new();
        let mut next_id = 0;
        let rooms_rng = ctx.streams.get_mut(StreamName::Rooms);
        carve_and_collect(&tree, &mut input.grid, room_size_range, &bsp_cfg, rooms_rng, &mut next_id, &mut rooms, &mut edges);

        log::debug!("partitionAndCarveRooms: carved {} rooms, {} sibling edges", rooms.len(), edges.len());
        input.rooms = rooms;
        input.edges = edges;
        Ok(input)
    }
}

pub struct ConnectLeavesPass;

impl Pass<DungeonStateArtifact, DungeonStateArtifact> for ConnectLeavesPass {
    fn id(&self) -> &'static str {
        "connectLeaves"
    }
    fn input_type(&self) -> ArtifactKind {
        ArtifactKind::DungeonState
    }
    fn output_type(&self) -> ArtifactKind {
        ArtifactKind::DungeonState
    }
    fn required_streams(&self) -> &'static [StreamName] {
        &[StreamName::Connections]
    }

    /// Carves an L-shaped corridor (widened per `pathfinding.corridorWidth`)
    /// between each sibling edge recorded by the partition pass.
    fn run(&self, mut input: DungeonStateArtifact, ctx: &mut PipelineContext) -> Result<DungeonStateArtifact, DelveError> {
        let corridor_width = ctx.config.pathfinding.corridor_width.max(1);
        let rooms = input.rooms.clone();
        let find_room = |id: i32| rooms.iter().find(|r| r.id == id);

        let mut connections = Vec::with_capacity(input.edges.len());
        let rng = ctx.streams.get_mut(StreamName::Connections);
        for &(from_id, to_id) in &input.edges {
            let (Some(from_room), Some(to_room)) = (find_room(from_id), find_room(to_id)) else {
                continue;
            };
            // Bend at either corner of the L with equal probability so
            // corridors don't all kink the same way.
            let (from, to) = if rng.chance(0.5) {
                (from_room.center(), to_room.center())
            } else {
                (to_room.center(), from_room.center())
            };
            let path = carve_corridor(&mut input.grid, from, to, corridor_width);
            connections.push(Connection::new(from_id, to_id, path));
        }
        log::debug!("connectLeaves: carved {} corridors", connections.len());
        input.connections = connections;
        Ok(input)
    }
}

/// L-shaped corridor between `from` and `to`, widened to `2*half+1` around
/// every traversed centerline point, writing `Floor`.
fn carve_corridor(grid: &mut Grid, from: Point, to: Point, width: i32) -> Vec<Point> {
    let corner = Point::new(to.x, from.y);
    let mut centerline = bresenham_line(from.x, from.y, corner.x, corner.y);
    let second_leg = bresenham_line(corner.x, corner.y, to.x, to.y);
    centerline.extend(second_leg.into_iter().skip(1));

    let half = (width - 1) / 2;
    for p in &centerline {
        for dy in -half..=half {
            for dx in -half..=half {
                grid.set(p.x + dx, p.y + dy, CellKind::Floor);
            }
        }
    }
    centerline
}

/// Runs the full partitioning pipeline (`empty → ... → dungeon`), reusing
/// the cellular strategy's entrance/exit and finalize passes unchanged.
pub fn generate_bsp(ctx: &mut PipelineContext) -> Result<DungeonArtifact, DelveError> {
    let (state, _) = crate::pipeline::run_pass(&InitializePartitionPass, EmptyArtifact, ctx, ArtifactKind::Empty)?;
    let (state, _) = crate::pipeline::run_pass(&PartitionAndCarveRoomsPass, state, ctx, ArtifactKind::DungeonState)?;
    let (state, _) = crate::pipeline::run_pass(&ConnectLeavesPass, state, ctx, ArtifactKind::DungeonState)?;
    let (state, _) = crate::pipeline::run_pass(&PlaceEntranceExitPass, state, ctx, ArtifactKind::DungeonState)?;
    let (artifact, _) = crate::pipeline::run_pass(&FinalizePass, state, ctx, ArtifactKind::DungeonState)?;
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DungeonConfig;
    use crate::seed::{SeedManager, SeedOptions};
    use crate::trace::{NullCancelToken, NullTraceSink};

    fn ctx_for(config: DungeonConfig, primary: u32) -> (DungeonConfig, crate::seed::DungeonSeed) {
        let seed = SeedManager::generate_seeds(primary, SeedOptions { timestamp: Some(1), version: None }).unwrap();
        (config, seed)
    }

    fn bsp_config() -> DungeonConfig {
        let mut cfg = DungeonConfig::default();
        cfg.algorithm = crate::config::Algorithm::Bsp;
        cfg.width = 80;
        cfg.height = 60;
        cfg
    }

    #[test]
    fn rooms_do_not_overlap() {
        let (config, seed) = ctx_for(bsp_config(), 8);
        let mut sink = NullTraceSink;
        let cancel = NullCancelToken;
        let mut ctx = PipelineContext::new(config, seed, &mut sink, &cancel);
        let artifact = generate_bsp(&mut ctx).unwrap();
        for i in 0..artifact.rooms.len() {
            for j in (i + 1)..artifact.rooms.len() {
                assert!(!artifact.rooms[i].bounds().overlaps(&artifact.rooms[j].bounds()));
            }
        }
    }

    #[test]
    fn rooms_fit_within_grid_bounds() {
        let (config, seed) = ctx_for(bsp_config(), 21);
        let mut sink = NullTraceSink;
        let cancel = NullCancelToken;
        let mut ctx = PipelineContext::new(config, seed, &mut sink, &cancel);
        let artifact = generate_bsp(&mut ctx).unwrap();
        for room in &artifact.rooms {
            let b = room.bounds();
            assert!(b.min_x >= 0 && b.min_y >= 0 && b.max_x < artifact.width && b.max_y < artifact.height);
        }
    }

    #[test]
    fn connection_graph_is_spanning() {
        let (config, seed) = ctx_for(bsp_config(), 1234);
        let mut sink = NullTraceSink;
        let cancel = NullCancelToken;
        let mut ctx = PipelineContext::new(config, seed, &mut sink, &cancel);
        let artifact = generate_bsp(&mut ctx).unwrap();
        assert!(crate::checksum::validate(&artifact).is_empty());
    }

    #[test]
    fn determinism_across_two_runs() {
        let (config, seed) = ctx_for(bsp_config(), 555);
        let mut sink_a = NullTraceSink;
        let cancel_a = NullCancelToken;
        let mut ctx_a = PipelineContext::new(config.clone(), seed.clone(), &mut sink_a, &cancel_a);
        let a = generate_bsp(&mut ctx_a).unwrap();

        let mut sink_b = NullTraceSink;
        let cancel_b = NullCancelToken;
        let mut ctx_b = PipelineContext::new(config, seed, &mut sink_b, &cancel_b);
        let b = generate_bsp(&mut ctx_b).unwrap();

        assert_eq!(a.checksum, b.checksum);
        assert_eq!(a.rooms.len(), b.rooms.len());
    }
}
