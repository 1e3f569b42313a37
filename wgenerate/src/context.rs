//! Cancellable call context threaded through generation and tool calls.
//!
//! ```rust
//! use wgenerate::CallContext;
//!
//! let ctx = CallContext::new().with_trace_id("trace-1");
//! assert!(!ctx.is_cancelled());
//!
//! ctx.cancellation().cancel();
//! assert!(ctx.is_cancelled());
//! ```

use tokio_util::sync::CancellationToken;
use wcommon::{MetadataMap, TraceId};

/// Per-call context. The orchestrator checks cancellation before every
/// generation call; retry backoff sleeps race against it.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    pub trace_id: Option<TraceId>,
    pub metadata: MetadataMap,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
