//! The six end-to-end scenarios from spec.md §8, against the public API.

use delve_core::{
    generate, validate, Algorithm, CellularConfig, DungeonConfig, PathfindingConfig, RoomSizeRange, RoomKind,
    SeedManager, SeedOptions, SpawnKind,
};

fn seed_for(primary: u32) -> delve_core::DungeonSeed {
    SeedManager::generate_seeds(primary, SeedOptions { timestamp: Some(1), version: None }).unwrap()
}

fn scenario_cfg(connect_all_regions: bool, min_region_size: i32) -> DungeonConfig {
    DungeonConfig {
        width: 60,
        height: 40,
        room_count: 6,
        room_size_range: RoomSizeRange { min: 5, max: 12 },
        algorithm: Algorithm::Cellular,
        cellular: CellularConfig {
            initial_fill_ratio: 0.45,
            iterations: 4,
            birth_limit: 5,
            death_limit: 4,
            min_region_size,
            connect_all_regions,
        },
        ..DungeonConfig::default()
    }
}

/// Scenario 1: a single cavern room, one entrance and one exit on floor,
/// reachability holds, checksum deterministic across two runs.
#[test]
fn scenario_1_single_cavern_room() {
    let cfg = scenario_cfg(false, 25);
    let a = generate(cfg.clone(), seed_for(12345)).unwrap();
    let b = generate(cfg, seed_for(12345)).unwrap();
    assert_eq!(a.checksum, b.checksum);
    assert_eq!(a.rooms.len(), 1);
    assert_eq!(a.rooms[0].kind, RoomKind::Cavern);
    assert_eq!(a.spawns.iter().filter(|s| s.kind == SpawnKind::Entrance).count(), 1);
    assert_eq!(a.spawns.iter().filter(|s| s.kind == SpawnKind::Exit).count(), 1);
    assert!(validate(&a).success);
}

/// Scenario 2: `connectAllRegions:true, minRegionSize:15` carves corridors
/// across multiple surviving regions with a spanning connection graph.
#[test]
fn scenario_2_connect_all_regions_spans() {
    let cfg = scenario_cfg(true, 15);
    let artifact = generate(cfg, seed_for(12345)).unwrap();
    assert!(!artifact.rooms.is_empty());
    if artifact.rooms.len() > 1 {
        assert_eq!(artifact.connections.len(), artifact.rooms.len() - 1);
    }
    assert!(validate(&artifact).success);
}

/// Scenario 3: two independent runs of the same config/seed produce
/// identical checksums (the generation-time budget is a soft, untested
/// property — not something a unit test can assert on meaningfully).
#[test]
fn scenario_3_two_runs_identical_checksums() {
    let cfg = DungeonConfig {
        width: 80,
        height: 60,
        room_count: 8,
        room_size_range: RoomSizeRange { min: 6, max: 15 },
        algorithm: Algorithm::Cellular,
        ..DungeonConfig::default()
    };
    let a = generate(cfg.clone(), seed_for(54321)).unwrap();
    let b = generate(cfg, seed_for(54321)).unwrap();
    assert_eq!(a.checksum, b.checksum);
}

/// Scenario 4: the documented seed record round-trips through
/// encode/decode, and truncating the code by one character fails decode.
#[test]
fn scenario_4_seed_encode_round_trip_and_truncation_fails() {
    let seed = delve_core::DungeonSeed {
        primary: 1,
        layout: 2_654_435_769u32 ^ 1,
        rooms: 1_234_567,
        connections: 2_345_678,
        details: 3_456_789,
        version: "1.0.0".to_string(),
        timestamp: 1,
    };
    let code = SeedManager::encode_seed(&seed).unwrap();
    let decoded = SeedManager::decode_seed(&code).unwrap();
    assert_eq!(decoded, seed);
    let truncated = &code[..code.len() - 1];
    assert!(SeedManager::decode_seed(truncated).is_err());
}

/// Scenario 5: A* on a 20x20 all-floor grid from (0,0) to (19,19) yields a
/// path of length 39 (38 cardinal steps, inclusive endpoints); JPS agrees.
#[test]
fn scenario_5_pathfinder_length_on_open_grid() {
    use delve_core::grid::{CellKind, Grid, Point};
    use delve_core::pathfinding::{astar, find_path};

    let grid = Grid::new(20, 20, CellKind::Floor);
    let cfg = PathfindingConfig::default();
    let astar_path = astar(&grid, Point::new(0, 0), Point::new(19, 19), &cfg);
    assert_eq!(astar_path.len(), 39);

    let mut jps_cfg = cfg;
    jps_cfg.prefer_jps = true;
    let jps_path = find_path(&grid, Point::new(0, 0), Point::new(19, 19), &jps_cfg);
    assert_eq!(jps_path.len(), 39);
}

/// Scenario 6: forcibly overwriting the entrance to `Wall` makes the
/// validator report `success=false` with an `invariant.entrance.floor`
/// violation.
#[test]
fn scenario_6_tampered_entrance_is_flagged() {
    use delve_core::grid::CellKind;

    let mut artifact = generate(scenario_cfg(false, 25), seed_for(12345)).unwrap();
    let entrance = artifact.spawns.iter().find(|s| s.kind == SpawnKind::Entrance).unwrap().clone();
    let idx = (entrance.position.y * artifact.width + entrance.position.x) as usize;
    artifact.terrain[idx] = CellKind::Wall as u8;

    let report = validate(&artifact);
    assert!(!report.success);
    assert!(report.violations.iter().any(|v| v.r#type == "invariant.entrance.floor"));
}
