//! Cellular ("cave") generation passes (spec.md §4.8):
//! `initializeRandom → applyCellularRules → keepLargestRegion →
//! (connectRegions)? → placeEntranceExit → finalize`.
//!
//! Directly generalizes the teacher's `generate_cave` (random fill →
//! smoothing → `fill_isolated_floors` → "place first floor cell" stairs)
//! into the typed pass pipeline.

use std::collections::BTreeSet;

use crate::checksum::compute_checksum;
use crate::config::CellularConfig;
use crate::error::DelveError;
use crate::flood::{find_regions, FindRegionsOptions};
use crate::grid::{CellKind, Grid, Point};
use crate::pathfinding::bresenham_line;
use crate::pipeline::artifact::{
    ArtifactKind, Connection, DungeonArtifact, DungeonStateArtifact, EmptyArtifact, Room, RoomKind, SpawnKind,
    SpawnPoint,
};
use crate::pipeline::{Pass, PipelineContext};
use crate::streams::StreamName;

pub struct InitializeRandomPass;

impl Pass<EmptyArtifact, DungeonStateArtifact> for InitializeRandomPass {
    fn id(&self) -> &'static str {
        "initializeRandom"
    }
    fn input_type(&self) -> ArtifactKind {
        ArtifactKind::Empty
    }
    fn output_type(&self) -> ArtifactKind {
        ArtifactKind::DungeonState
    }
    fn required_streams(&self) -> &'static [StreamName] {
        &[StreamName::Layout]
    }

    /// Border cells are always `Wall`; interior cells are `Wall` with
    /// probability `initialFillRatio`, else `Floor`.
    fn run(&self, _input: EmptyArtifact, ctx: &mut PipelineContext) -> Result<DungeonStateArtifact, DelveError> {
        let width = ctx.config.width;
        let height = ctx.config.height;
        let fill_ratio = ctx.config.cellular.initial_fill_ratio;
        let mut grid = Grid::new(width, height, CellKind::Wall);
        let rng = ctx.streams.get_mut(StreamName::Layout);
        for y in 0..height {
            for x in 0..width {
                let is_border = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                let kind = if is_border || rng.chance(fill_ratio) { CellKind::Wall } else { CellKind::Floor };
                grid.set_unchecked(x, y, kind);
            }
        }
        log::debug!("initializeRandom: {width}x{height} grid at fill ratio {fill_ratio}");
        Ok(DungeonStateArtifact {
            width,
            height,
            grid,
            rooms: Vec::new(),
            edges: Vec::new(),
            connections: Vec::new(),
            spawns: Vec::new(),
        })
    }
}

pub struct ApplyCellularRulesPass;

impl Pass<DungeonStateArtifact, DungeonStateArtifact> for ApplyCellularRulesPass {
    fn id(&self) -> &'static str {
        "applyCellularRules"
    }
    fn input_type(&self) -> ArtifactKind {
        ArtifactKind::DungeonState
    }
    fn output_type(&self) -> ArtifactKind {
        ArtifactKind::DungeonState
    }
    fn required_streams(&self) -> &'static [StreamName] {
        &[]
    }

    /// Runs the CA step `iterations` times; terminates early once an
    /// iteration leaves the grid unchanged (stabilization, spec.md §8).
    fn run(&self, mut input: DungeonStateArtifact, ctx: &mut PipelineContext) -> Result<DungeonStateArtifact, DelveError> {
        let cfg: &CellularConfig = &ctx.config.cellular;
        let mut buffer = Grid::new(input.width, input.height, CellKind::Wall);
        for i in 0..cfg.iterations {
            if ctx.cancel.is_cancelled() {
                return Err(DelveError::GenerationCancelled);
            }
            input.grid.apply_cellular_automata_into(cfg.death_limit, cfg.birth_limit, &mut buffer);
            let stabilized = i > 0 && input.grid.equals(&buffer);
            std::mem::swap(&mut input.grid, &mut buffer);
            if stabilized {
                log::debug!("applyCellularRules: stabilized early at iteration {i}");
                break;
            }
        }
        Ok(input)
    }
}

pub struct KeepLargestRegionPass;

impl Pass<DungeonStateArtifact, DungeonStateArtifact> for KeepLargestRegionPass {
    fn id(&self) -> &'static str {
        "keepLargestRegion"
    }
    fn input_type(&self) -> ArtifactKind {
        ArtifactKind::DungeonState
    }
    fn output_type(&self) -> ArtifactKind {
        ArtifactKind::DungeonState
    }
    fn required_streams(&self) -> &'static [StreamName] {
        &[]
    }

    fn run(&self, mut input: DungeonStateArtifact, ctx: &mut PipelineContext) -> Result<DungeonStateArtifact, DelveError> {
        let cfg: &CellularConfig = &ctx.config.cellular;
        let regions = find_regions(&input.grid, CellKind::Floor, FindRegionsOptions { min_size: 1, diagonal: false });

        if regions.is_empty() {
            ctx.trace.warning("keepLargestRegion", "no floor regions survived applyCellularRules");
            log::warn!("keepLargestRegion: no floor regions found");
            return Ok(input);
        }

        let mut rooms = Vec::new();
        if !cfg.connect_all_regions {
            let largest = regions
                .iter()
                .max_by(|a, b| a.size.cmp(&b.size).then_with(|| b.id.cmp(&a.id)))
                .expect("regions is non-empty");
            if largest.size < cfg.min_region_size {
                ctx.trace.warning(
                    "keepLargestRegion",
                    &format!("largest region (size {}) is below minRegionSize {}", largest.size, cfg.min_region_size),
                );
                log::warn!("keepLargestRegion: largest region size {} < minRegionSize {}", largest.size, cfg.min_region_size);
            }
            let mut kept = Grid::new(input.width, input.height, CellKind::Wall);
            for p in &largest.points {
                kept.set_unchecked(p.x, p.y, CellKind::Floor);
            }
            input.grid = kept;
            let room_seed = ctx.streams.get_mut(StreamName::Rooms).next_u32();
            rooms.push(Room::new(
                0,
                largest.bounds.min_x,
                largest.bounds.min_y,
                largest.bounds.width(),
                largest.bounds.height(),
                RoomKind::Cavern,
                room_seed,
            ));
        } else {
            let mut kept = Grid::new(input.width, input.height, CellKind::Wall);
            let mut next_id = 0;
            for region in &regions {
                if region.size < cfg.min_region_size {
                    continue;
                }
                for p in &region.points {
                    kept.set_unchecked(p.x, p.y, CellKind::Floor);
                }
                let room_seed = ctx.streams.get_mut(StreamName::Rooms).next_u32();
                rooms.push(Room::new(
                    next_id,
                    region.bounds.min_x,
                    region.bounds.min_y,
                    region.bounds.width(),
                    region.bounds.height(),
                    RoomKind::Cavern,
                    room_seed,
                ));
                next_id += 1;
            }
            if rooms.is_empty() {
                ctx.trace.warning("keepLargestRegion", "no region met minRegionSize under connectAllRegions");
                log::warn!("keepLargestRegion: connectAllRegions found no region >= minRegionSize");
            }
            input.grid = kept;
        }

        input.rooms = rooms;
        Ok(input)
    }
}

pub struct ConnectRegionsPass;

impl Pass<DungeonStateArtifact, DungeonStateArtifact> for ConnectRegionsPass {
    fn id(&self) -> &'static str {
        "connectRegions"
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

    /// Builds a spanning tree over the surviving regions: repeatedly joins
    /// the closest connected/unconnected pair (by center Manhattan
    /// distance), sampling up to `min(50, |Rc|, |Ru|)` point pairs to find a
    /// short actual crossing, then carves an L-shaped, 3×3-widened tunnel
    /// between those points.
    fn run(&self, mut input: DungeonStateArtifact, ctx: &mut PipelineContext) -> Result<DungeonStateArtifact, DelveError> {
        if input.rooms.len() < 2 {
            return Ok(input);
        }
        let regions = find_regions(&input.grid, CellKind::Floor, FindRegionsOptions { min_size: 1, diagonal: false });
        if regions.len() != input.rooms.len() {
            // Degenerate/defensive: region recount disagrees with the room
            // count produced by keepLargestRegion (e.g. a custom earlier
            // pass altered the grid). Nothing safe to connect.
            log::warn!("connectRegions: region recount ({}) disagrees with room count ({})", regions.len(), input.rooms.len());
            return Ok(input);
        }

        let n = input.rooms.len();
        let mut connected = vec![false; n];
        connected[0] = true;
        let mut connections = Vec::new();

        for _ in 1..n {
            let mut best: Option<(usize, usize, i32)> = None;
            for c in 0..n {
                if !connected[c] {
                    continue;
                }
                for u in 0..n {
                    if connected[u] {
                        continue;
                    }
                    let dist = input.rooms[c].center().manhattan(input.rooms[u].center());
                    if best.map(|(_, _, bd)| dist < bd).unwrap_or(true) {
                        best = Some((c, u, dist));
                    }
                }
            }
            let Some((c, u, _)) = best else { break };

            let rng = ctx.streams.get_mut(StreamName::Connections);
            let sample_count = [50, regions[c].points.len(), regions[u].points.len()].into_iter().min().unwrap_or(0);
            let mut best_pair: Option<(Point, Point, i32)> = None;
            for _ in 0..sample_count {
                let pc = regions[c].points[rng.index(regions[c].points.len()).unwrap_or(0)];
                let pu = regions[u].points[rng.index(regions[u].points.len()).unwrap_or(0)];
                let d = pc.manhattan(pu);
                if best_pair.map(|(_, _, bd)| d < bd).unwrap_or(true) {
                    best_pair = Some((pc, pu, d));
                }
            }
            let Some((from, to, _)) = best_pair else { continue };

            let path = carve_l_tunnel(&mut input.grid, from, to);
            connections.push(Connection::new(input.rooms[c].id, input.rooms[u].id, path));
            connected[u] = true;
        }

        input.connections = connections;
        Ok(input)
    }
}

/// Carves an L-shaped corridor between `from` and `to` (horizontal leg then
/// vertical leg), widened to 3×3 around every traversed point, writing
/// `Floor`. Returns the traversed centerline cells in carve order.
///
/// `pub(crate)` so `passes::bsp` can reuse it for leaf-to-leaf corridors.
pub(crate) fn carve_l_tunnel(grid: &mut Grid, from: Point, to: Point) -> Vec<Point> {
    let corner = Point::new(to.x, from.y);
    let mut centerline = bresenham_line(from.x, from.y, corner.x, corner.y);
    let second_leg = bresenham_line(corner.x, corner.y, to.x, to.y);
    centerline.extend(second_leg.into_iter().skip(1));

    for p in &centerline {
        for dy in -1..=1 {
            for dx in -1..=1 {
                grid.set(p.x + dx, p.y + dy, CellKind::Floor);
            }
        }
    }
    centerline
}

pub struct PlaceEntranceExitPass;

impl Pass<DungeonStateArtifact, DungeonStateArtifact> for PlaceEntranceExitPass {
    fn id(&self) -> &'static str {
        "placeEntranceExit"
    }
    fn input_type(&self) -> ArtifactKind {
        ArtifactKind::DungeonState
    }
    fn output_type(&self) -> ArtifactKind {
        ArtifactKind::DungeonState
    }
    fn required_streams(&self) -> &'static [StreamName] {
        &[StreamName::Details]
    }

    fn run(&self, mut input: DungeonStateArtifact, ctx: &mut PipelineContext) -> Result<DungeonStateArtifact, DelveError> {
        let floor_cells: Vec<Point> = input.grid.iter_points().filter(|p| input.grid.get(p.x, p.y) == CellKind::Floor).collect();
        if floor_cells.is_empty() {
            return Err(DelveError::GenerationFailed {
                pass_id: self.id().to_string(),
                message: "no floor cells to place entrance/exit".to_string(),
            });
        }

        let rng = ctx.streams.get_mut(StreamName::Details);
        let entrance_idx = rng.index(floor_cells.len()).unwrap_or(0);
        let entrance = floor_cells[entrance_idx];

        let mut exit = floor_cells[0];
        let mut best_distance = entrance.manhattan(exit);
        for &p in &floor_cells[1..] {
            let d = entrance.manhattan(p);
            if d > best_distance {
                best_distance = d;
                exit = p;
            }
        }

        let entrance_room = find_room_containing(&input.rooms, entrance);
        let exit_room = find_room_containing(&input.rooms, exit);

        input.spawns.push(SpawnPoint {
            position: entrance,
            room_id: entrance_room,
            kind: SpawnKind::Entrance,
            tags: tag_set(&["spawn", "entrance"]),
            weight: 1.0,
            distance_from_start: 0,
        });
        input.spawns.push(SpawnPoint {
            position: exit,
            room_id: exit_room,
            kind: SpawnKind::Exit,
            tags: tag_set(&["exit"]),
            weight: 1.0,
            distance_from_start: best_distance,
        });

        log::debug!("placeEntranceExit: entrance {:?}, exit {:?}, distance {}", entrance, exit, best_distance);
        Ok(input)
    }
}

fn tag_set(tags: &[&str]) -> BTreeSet<String> {
    tags.iter().map(|s| s.to_string()).collect()
}

fn find_room_containing(rooms: &[Room], p: Point) -> i32 {
    rooms.iter().find(|r| r.bounds().contains(p)).map(|r| r.id).unwrap_or(-1)
}

pub struct FinalizePass;

impl Pass<DungeonStateArtifact, DungeonArtifact> for FinalizePass {
    fn id(&self) -> &'static str {
        "finalize"
    }
    fn input_type(&self) -> ArtifactKind {
        ArtifactKind::DungeonState
    }
    fn output_type(&self) -> ArtifactKind {
        ArtifactKind::Dungeon
    }
    fn required_streams(&self) -> &'static [StreamName] {
        &[]
    }

    fn run(&self, input: DungeonStateArtifact, ctx: &mut PipelineContext) -> Result<DungeonArtifact, DelveError> {
        let mut artifact = DungeonArtifact {
            width: input.width,
            height: input.height,
            terrain: input.grid.to_terrain_bytes(),
            rooms: input.rooms,
            connections: input.connections,
            spawns: input.spawns,
            checksum: String::new(),
            seed: ctx.seed.clone(),
        };
        artifact.checksum = compute_checksum(&artifact);
        log::debug!("finalize: checksum {}", artifact.checksum);
        Ok(artifact)
    }
}

/// Runs the full cellular pipeline (`empty → ... → dungeon`) against the
/// context's config and streams.
pub fn generate_cellular(ctx: &mut PipelineContext) -> Result<DungeonArtifact, DelveError> {
    let (state, _) = crate::pipeline::run_pass(&InitializeRandomPass, EmptyArtifact, ctx, ArtifactKind::Empty)?;
    let (state, _) = crate::pipeline::run_pass(&ApplyCellularRulesPass, state, ctx, ArtifactKind::DungeonState)?;
    let (state, _) = crate::pipeline::run_pass(&KeepLargestRegionPass, state, ctx, ArtifactKind::DungeonState)?;
    let state = if ctx.config.cellular.connect_all_regions {
        let (state, _) = crate::pipeline::run_pass(&ConnectRegionsPass, state, ctx, ArtifactKind::DungeonState)?;
        state
    } else {
        state
    };
    let (state, _) = crate::pipeline::run_pass(&PlaceEntranceExitPass, state, ctx, ArtifactKind::DungeonState)?;
    let (artifact, _) = crate::pipeline::run_pass(&FinalizePass, state, ctx, ArtifactKind::DungeonState)?;
    Ok(artifact)
}
