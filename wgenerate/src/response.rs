//! Generation results: candidates, finish reasons, and usage accounting.

use crate::Message;

/// Why a generation call stopped. `ToolUse` is the discriminant the tool
/// orchestrator switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    EndTurn,
    StopSequence,
    MaxTokens,
    ToolUse,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UsageMetrics {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

impl UsageMetrics {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        }
    }

    /// Accumulates another call's usage; the orchestrator sums usage across
    /// loop iterations.
    pub fn add(&mut self, other: UsageMetrics) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.total_tokens += other.total_tokens;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub candidates: Vec<Message>,
    pub finish_reason: FinishReason,
    pub usage: UsageMetrics,
}

impl Response {
    pub fn new(candidates: Vec<Message>, finish_reason: FinishReason) -> Self {
        Self {
            candidates,
            finish_reason,
            usage: UsageMetrics::default(),
        }
    }

    pub fn with_usage(mut self, usage: UsageMetrics) -> Self {
        self.usage = usage;
        self
    }
}
