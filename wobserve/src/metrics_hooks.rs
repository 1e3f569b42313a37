//! Metrics-based hooks for generation attempts.
//!
//! ```rust
//! use wgenerate::GeneratorHooks;
//! use wobserve::MetricsGeneratorHooks;
//!
//! fn accepts_hooks(_hooks: &dyn GeneratorHooks) {}
//!
//! let hooks = MetricsGeneratorHooks;
//! accepts_hooks(&hooks);
//! ```

use std::time::Duration;

use wgenerate::{GeneratorError, GeneratorHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsGeneratorHooks;

impl GeneratorHooks for MetricsGeneratorHooks {
    fn on_attempt_start(&self, operation: &str, _attempt: u32) {
        metrics::counter!(
            "whirligig_generator_attempt_start_total",
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    fn on_retry_scheduled(
        &self,
        operation: &str,
        _attempt: u32,
        delay: Duration,
        error: &GeneratorError,
    ) {
        metrics::counter!(
            "whirligig_generator_retry_scheduled_total",
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "whirligig_generator_retry_delay_seconds",
            "operation" => operation.to_string()
        )
        .record(delay.as_secs_f64());
    }

    fn on_success(&self, operation: &str, attempts: u32) {
        metrics::counter!(
            "whirligig_generator_success_total",
            "operation" => operation.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "whirligig_generator_attempts_per_success",
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }

    fn on_failure(&self, operation: &str, attempts: u32, error: &GeneratorError) {
        metrics::counter!(
            "whirligig_generator_failure_total",
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "whirligig_generator_attempts_per_failure",
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }
}
