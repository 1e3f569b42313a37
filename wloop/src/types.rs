//! Run configuration and result types for the orchestration loop.

use std::sync::Arc;

use wgenerate::{Dialog, FinishReason, GenOpts, UsageMetrics};

/// Recomputes generation options from the evolving dialog before each
/// generation call.
pub type OptsSource = Arc<dyn Fn(&Dialog) -> GenOpts + Send + Sync>;

/// How an orchestrated run ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopOutcome {
    /// The generator produced a non-tool-use turn.
    Completed(FinishReason),
    /// A terminal/manual tool was invoked; control returns to the caller
    /// without a fabricated tool result.
    Handoff { tool: String },
    /// The configured generation-call cap was reached while the generator
    /// was still requesting tool use.
    TurnLimitReached,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopRun {
    pub dialog: Dialog,
    pub outcome: LoopOutcome,
    /// Usage summed across every generation call of the run.
    pub usage: UsageMetrics,
    /// Number of generation calls made.
    pub turns: u32,
}
