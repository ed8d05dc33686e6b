//! Pass/pipeline framework: types a `Pass<In, Out>` and a runner that
//! threads a mutable typed context through ordered passes (spec.md §4.7).
//!
//! Grounded on the cross-example `terrain-forge` crate's `Algorithm`/
//! `compose::Pipeline` idea, reinterpreted with Rust's type system (a
//! trait carrying associated marker kinds) in place of that crate's
//! dynamic `algorithms::get(name)` registry, since this pipeline's chain is
//! fixed and statically ordered, not user-selectable at runtime.

pub mod artifact;

use std::collections::HashSet;
use std::time::Duration;

use crate::config::DungeonConfig;
use crate::error::DelveError;
use crate::seed::DungeonSeed;
use crate::streams::{StreamName, StreamSet};
use crate::trace::{CancelToken, TraceSink};
use artifact::ArtifactKind;

/// Shared state threaded through every pass.
pub struct PipelineContext<'a> {
    pub config: DungeonConfig,
    pub seed: DungeonSeed,
    pub streams: StreamSet,
    pub trace: &'a mut dyn TraceSink,
    pub cancel: &'a dyn CancelToken,
    pub meta: std::collections::HashMap<String, String>,
}

impl<'a> PipelineContext<'a> {
    pub fn new(
        config: DungeonConfig,
        seed: DungeonSeed,
        trace: &'a mut dyn TraceSink,
        cancel: &'a dyn CancelToken,
    ) -> Self {
        let streams = StreamSet::new(seed.layout, seed.rooms, seed.connections, seed.details);
        Self { config, seed, streams, trace, cancel, meta: std::collections::HashMap::new() }
    }
}

/// A single named timing/trace event collected by the runner.
#[derive(Clone, Debug)]
pub struct TraceEvent {
    pub pass_id: String,
    pub duration: Duration,
}

/// A deterministic transformation from one typed artifact to the next.
pub trait Pass<In, Out> {
    fn id(&self) -> &'static str;
    fn input_type(&self) -> ArtifactKind;
    fn output_type(&self) -> ArtifactKind;
    fn required_streams(&self) -> &'static [StreamName];
    fn run(&self, input: In, ctx: &mut PipelineContext) -> Result<Out, DelveError>;
}

/// Verifies `requiredStreams ⊆ context.streams` keys before invoking a pass.
fn check_streams(pass_id: &str, required: &[StreamName], streams: &StreamSet) -> Result<(), DelveError> {
    for &s in required {
        if !streams.contains(s) {
            return Err(DelveError::PipelineStreamMissing {
                pass_id: pass_id.to_string(),
                stream: s.as_str().to_string(),
            });
        }
    }
    Ok(())
}

/// Runs a single pass, verifying type adjacency against the previous pass's
/// declared output (or `ArtifactKind::Empty` for the first pass).
pub fn run_pass<In, Out>(
    pass: &dyn Pass<In, Out>,
    input: In,
    ctx: &mut PipelineContext,
    previous_output: ArtifactKind,
) -> Result<(Out, TraceEvent), DelveError> {
    if pass.input_type() != previous_output {
        return Err(DelveError::PipelineTypeMismatch {
            pass_id: pass.id().to_string(),
            expected: format!("{:?}", pass.input_type()),
            actual: format!("{:?}", previous_output),
        });
    }
    check_streams(pass.id(), pass.required_streams(), &ctx.streams)?;
    if ctx.cancel.is_cancelled() {
        return Err(DelveError::GenerationCancelled);
    }
    let start = std::time::Instant::now();
    log::debug!("pipeline: running pass {}", pass.id());
    let output = pass.run(input, ctx).map_err(|e| {
        if let DelveError::GenerationFailed { .. } = e {
            e
        } else {
            DelveError::GenerationFailed { pass_id: pass.id().to_string(), message: e.to_string() }
        }
    })?;
    let event = TraceEvent { pass_id: pass.id().to_string(), duration: start.elapsed() };
    Ok((output, event))
}

/// All stream names a chain of passes declares, used by tests to snapshot
/// RNG state around an individual pass (spec.md §8 stream discipline).
pub fn declared_stream_set(streams: &[StreamName]) -> HashSet<StreamName> {
    streams.iter().copied().collect()
}
