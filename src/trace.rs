//! Collaborator interfaces consumed (not defined) by the core: trace sink,
//! cancellation, and progress reporting (spec.md §6).

/// A structured decision log for host UIs — independent of the `log` crate
/// diagnostics emitted alongside it (see SPEC_FULL.md §0).
pub trait TraceSink {
    fn decision(&mut self, pass: &str, topic: &str, considered: &[String], chosen: &str, rationale: &str);
    fn warning(&mut self, pass: &str, message: &str);
}

/// No-op sink for callers that don't want structured tracing.
#[derive(Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn decision(&mut self, _pass: &str, _topic: &str, _considered: &[String], _chosen: &str, _rationale: &str) {}
    fn warning(&mut self, _pass: &str, _message: &str) {}
}

/// An in-memory sink that records every event, useful for tests and
/// debugging tools built on top of the core.
#[derive(Default)]
pub struct CollectingTraceSink {
    pub decisions: Vec<(String, String, String, String)>,
    pub warnings: Vec<(String, String)>,
}

impl TraceSink for CollectingTraceSink {
    fn decision(&mut self, pass: &str, topic: &str, _considered: &[String], chosen: &str, rationale: &str) {
        self.decisions.push((pass.to_string(), topic.to_string(), chosen.to_string(), rationale.to_string()));
    }

    fn warning(&mut self, pass: &str, message: &str) {
        self.warnings.push((pass.to_string(), message.to_string()));
    }
}

/// Checked between passes and between cellular-automaton iterations.
pub trait CancelToken {
    fn is_cancelled(&self) -> bool;
}

#[derive(Default)]
pub struct NullCancelToken;

impl CancelToken for NullCancelToken {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Coarse progress callback at pass boundaries.
pub trait ProgressSink {
    fn report(&mut self, percent: i32);
}

#[derive(Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn report(&mut self, _percent: i32) {}
}

/// Adapts a plain closure into a `ProgressSink`.
pub struct FnProgressSink<F: FnMut(i32)>(pub F);

impl<F: FnMut(i32)> ProgressSink for FnProgressSink<F> {
    fn report(&mut self, percent: i32) {
        (self.0)(percent)
    }
}
