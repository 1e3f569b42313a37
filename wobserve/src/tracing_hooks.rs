//! Tracing-based hooks and the logging middleware layer.
//!
//! ```rust
//! use wgenerate::GeneratorHooks;
//! use wobserve::TracingGeneratorHooks;
//!
//! fn accepts_hooks(_hooks: &dyn GeneratorHooks) {}
//!
//! let hooks = TracingGeneratorHooks;
//! accepts_hooks(&hooks);
//! ```

use std::sync::Arc;
use std::time::Duration;

use wgenerate::{
    CallContext, Dialog, GenOpts, Generator, GeneratorError, GeneratorFuture, GeneratorHooks,
    GeneratorLayer, Response, TokenCounter, ToolRegister,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingGeneratorHooks;

impl GeneratorHooks for TracingGeneratorHooks {
    fn on_attempt_start(&self, operation: &str, attempt: u32) {
        tracing::info!(
            phase = "generator",
            event = "attempt_start",
            operation,
            attempt
        );
    }

    fn on_retry_scheduled(
        &self,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &GeneratorError,
    ) {
        tracing::warn!(
            phase = "generator",
            event = "retry_scheduled",
            operation,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_success(&self, operation: &str, attempts: u32) {
        tracing::info!(
            phase = "generator",
            event = "success",
            operation,
            attempts
        );
    }

    fn on_failure(&self, operation: &str, attempts: u32, error: &GeneratorError) {
        tracing::error!(
            phase = "generator",
            event = "failure",
            operation,
            attempts,
            error_kind = ?error.kind,
            error = %error
        );
    }
}

/// Middleware wrapper that logs every generate call with its dialog size
/// and result.
pub struct TracingGenerator {
    inner: Arc<dyn Generator>,
}

impl TracingGenerator {
    pub fn new(inner: Arc<dyn Generator>) -> Self {
        Self { inner }
    }

    pub fn layer() -> GeneratorLayer {
        Box::new(|inner| Arc::new(Self::new(inner)))
    }
}

impl Generator for TracingGenerator {
    fn generate<'a>(
        &'a self,
        ctx: &'a CallContext,
        dialog: &'a Dialog,
        opts: Option<&'a GenOpts>,
    ) -> GeneratorFuture<'a, Result<Response, GeneratorError>> {
        Box::pin(async move {
            let trace_id = ctx.trace_id.as_ref().map(|id| id.to_string());
            tracing::info!(
                phase = "generator",
                event = "generate_start",
                dialog_len = dialog.len(),
                trace_id = trace_id.as_deref()
            );

            let result = self.inner.generate(ctx, dialog, opts).await;
            match &result {
                Ok(response) => tracing::info!(
                    phase = "generator",
                    event = "generate_complete",
                    finish_reason = ?response.finish_reason,
                    candidates = response.candidates.len(),
                    total_tokens = response.usage.total_tokens,
                    trace_id = trace_id.as_deref()
                ),
                Err(error) => tracing::error!(
                    phase = "generator",
                    event = "generate_error",
                    error_kind = ?error.kind,
                    error = %error,
                    trace_id = trace_id.as_deref()
                ),
            }

            result
        })
    }

    fn token_counter(&self) -> Option<&dyn TokenCounter> {
        self.inner.token_counter()
    }

    fn tool_register(&self) -> Option<&dyn ToolRegister> {
        self.inner.tool_register()
    }
}
