//! Public entry points (spec.md §6): `generate`, `generate_progress`,
//! `validate`. Dispatches on `config.algorithm` to the cellular or BSP pass
//! chain; both share the same `PipelineContext`/`DungeonArtifact` contract.

use crate::checksum::{self, Violation};
use crate::config::{Algorithm, DungeonConfig};
use crate::error::DelveError;
use crate::passes::bsp;
use crate::passes::cellular;
use crate::pipeline::artifact::{ArtifactKind, DungeonArtifact, EmptyArtifact};
use crate::pipeline::{run_pass, PipelineContext};
use crate::seed::DungeonSeed;
use crate::trace::{CancelToken, NullCancelToken, NullTraceSink, ProgressSink, TraceSink};

/// Synchronous generation: validates `config`, builds the pipeline context
/// from `seed`, and runs the pass chain selected by `config.algorithm`.
pub fn generate(config: DungeonConfig, seed: DungeonSeed) -> Result<DungeonArtifact, DelveError> {
    config.validate()?;
    let mut sink = NullTraceSink;
    let cancel = NullCancelToken;
    let mut ctx = PipelineContext::new(config, seed, &mut sink, &cancel);
    dispatch(&mut ctx)
}

/// Same result as `generate`, with coarse progress callbacks at pass
/// boundaries and cooperative cancellation (spec.md §5, §6).
pub fn generate_progress(
    config: DungeonConfig,
    seed: DungeonSeed,
    mut on_progress: impl FnMut(i32),
    cancel: &dyn CancelToken,
) -> Result<DungeonArtifact, DelveError> {
    config.validate()?;
    let algorithm = config.algorithm;
    let mut sink = NullTraceSink;
    let mut ctx = PipelineContext::new(config, seed, &mut sink, cancel);
    let mut progress = crate::trace::FnProgressSink(|p| on_progress(p));
    run_with_progress(&mut ctx, algorithm, &mut progress)
}

fn dispatch(ctx: &mut PipelineContext) -> Result<DungeonArtifact, DelveError> {
    match ctx.config.algorithm {
        Algorithm::Cellular => cellular::generate_cellular(ctx),
        Algorithm::Bsp => bsp::generate_bsp(ctx),
    }
}

/// Mirrors `cellular::generate_cellular`/`bsp::generate_bsp`'s pass chains,
/// reporting `ProgressSink::report` after each pass boundary.
fn run_with_progress(
    ctx: &mut PipelineContext,
    algorithm: Algorithm,
    progress: &mut dyn ProgressSink,
) -> Result<DungeonArtifact, DelveError> {
    use cellular::{ApplyCellularRulesPass, ConnectRegionsPass, FinalizePass, InitializeRandomPass, KeepLargestRegionPass, PlaceEntranceExitPass};

    match algorithm {
        Algorithm::Cellular => {
            let connect_all = ctx.config.cellular.connect_all_regions;
            let steps: i32 = if connect_all { 6 } else { 5 };
            let mut done = 0;
            let mut tick = |done: &mut i32, progress: &mut dyn ProgressSink| {
                *done += 1;
                progress.report((*done * 100) / steps);
            };

            let (state, _) = run_pass(&InitializeRandomPass, EmptyArtifact, ctx, ArtifactKind::Empty)?;
            tick(&mut done, progress);
            let (state, _) = run_pass(&ApplyCellularRulesPass, state, ctx, ArtifactKind::DungeonState)?;
            tick(&mut done, progress);
            let (state, _) = run_pass(&KeepLargestRegionPass, state, ctx, ArtifactKind::DungeonState)?;
            tick(&mut done, progress);
            let state = if connect_all {
                let (state, _) = run_pass(&ConnectRegionsPass, state, ctx, ArtifactKind::DungeonState)?;
                tick(&mut done, progress);
                state
            } else {
                state
            };
            let (state, _) = run_pass(&PlaceEntranceExitPass, state, ctx, ArtifactKind::DungeonState)?;
            tick(&mut done, progress);
            let (artifact, _) = run_pass(&FinalizePass, state, ctx, ArtifactKind::DungeonState)?;
            tick(&mut done, progress);
            Ok(artifact)
        }
        Algorithm::Bsp => {
            use bsp::{ConnectLeavesPass, InitializePartitionPass, PartitionAndCarveRoomsPass};
            let steps: i32 = 5;
            let mut done = 0;
            let mut tick = |done: &mut i32, progress: &mut dyn ProgressSink| {
                *done += 1;
                progress.report((*done * 100) / steps);
            };

            let (state, _) = run_pass(&InitializePartitionPass, EmptyArtifact, ctx, ArtifactKind::Empty)?;
            tick(&mut done, progress);
            let (state, _) = run_pass(&PartitionAndCarveRoomsPass, state, ctx, ArtifactKind::DungeonState)?;
            tick(&mut done, progress);
            let (state, _) = run_pass(&ConnectLeavesPass, state, ctx, ArtifactKind::DungeonState)?;
            tick(&mut done, progress);
            let (state, _) = run_pass(&PlaceEntranceExitPass, state, ctx, ArtifactKind::DungeonState)?;
            tick(&mut done, progress);
            let (artifact, _) = run_pass(&FinalizePass, state, ctx, ArtifactKind::DungeonState)?;
            tick(&mut done, progress);
            Ok(artifact)
        }
    }
}

/// Re-runs every post-generation invariant check (spec.md §4.9) and reports
/// whether the artifact is valid.
pub struct ValidationReport {
    pub success: bool,
    pub violations: Vec<Violation>,
}

pub fn validate(artifact: &DungeonArtifact) -> ValidationReport {
    let violations = checksum::validate(artifact);
    let success = !violations.iter().any(|v| v.severity == crate::checksum::Severity::Error);
    ValidationReport { success, violations }
}

/// `validate` as a `Result`, for callers that want the structured
/// `DelveError::InvariantViolation` kind (spec.md §7) rather than a report to
/// inspect manually.
pub fn ensure_valid(artifact: &DungeonArtifact) -> Result<(), DelveError> {
    let report = validate(artifact);
    if report.success {
        Ok(())
    } else {
        Err(DelveError::InvariantViolation(report.violations))
    }
}

/// Convenience entry point used by callers that want a structured trace
/// alongside the artifact (spec.md §6 `TraceSink`).
pub fn generate_with_trace(
    config: DungeonConfig,
    seed: DungeonSeed,
    trace: &mut dyn TraceSink,
) -> Result<DungeonArtifact, DelveError> {
    config.validate()?;
    let cancel = NullCancelToken;
    let mut ctx = PipelineContext::new(config, seed, trace, &cancel);
    dispatch(&mut ctx)
}
