//! Retry policy, backoff execution, and the retrying generator wrapper.
//!
//! ```rust
//! use std::time::Duration;
//! use wgenerate::RetryPolicy;
//!
//! let policy = RetryPolicy::default();
//! assert_eq!(policy.backoff_for_attempt(1), Duration::from_millis(200));
//! assert_eq!(policy.backoff_for_attempt(2), Duration::from_millis(400));
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_timer::Delay;
use futures_util::future::{Either, select};
use futures_util::pin_mut;

use crate::{
    CallContext, Dialog, GenOpts, Generator, GeneratorError, GeneratorFuture, GeneratorLayer,
    Response, TokenCounter, ToolRegister,
};

/// Exponential backoff bounded by total elapsed time. The elapsed clock is
/// reset at the start of every top-level `generate` call, so a single
/// wrapper instance is safe to share across concurrent calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
    pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            max_elapsed: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_elapsed: Duration) -> Self {
        Self {
            max_elapsed,
            ..Self::default()
        }
    }

    pub fn with_initial_backoff(mut self, initial_backoff: Duration) -> Self {
        self.initial_backoff = initial_backoff;
        self
    }

    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    pub fn should_retry(&self, started: Instant, error: &GeneratorError) -> bool {
        error.is_retryable() && started.elapsed() < self.max_elapsed
    }

    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = (attempt.saturating_sub(1)) as i32;
        let unbounded = self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Duration::from_secs_f64(unbounded.min(self.max_backoff.as_secs_f64()))
    }
}

/// Operational lifecycle hooks around generation attempts. Observability
/// crates implement these; the default is a no-op.
pub trait GeneratorHooks: Send + Sync {
    fn on_attempt_start(&self, _operation: &str, _attempt: u32) {}

    fn on_retry_scheduled(
        &self,
        _operation: &str,
        _attempt: u32,
        _delay: Duration,
        _error: &GeneratorError,
    ) {
    }

    fn on_success(&self, _operation: &str, _attempts: u32) {}

    fn on_failure(&self, _operation: &str, _attempts: u32, _error: &GeneratorError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopGeneratorHooks;

impl GeneratorHooks for NoopGeneratorHooks {}

/// Runs `execute` under `policy`, sleeping between attempts via the injected
/// `sleep` so tests can record delays instead of waiting. A sleep that
/// resolves to an error (cancellation) aborts the retry loop with it.
pub async fn retry_with_policy<T, Op, OpFuture, Sleep, SleepFuture>(
    operation: &str,
    policy: &RetryPolicy,
    hooks: &dyn GeneratorHooks,
    mut execute: Op,
    mut sleep: Sleep,
) -> Result<T, GeneratorError>
where
    Op: FnMut(u32) -> OpFuture,
    OpFuture: Future<Output = Result<T, GeneratorError>>,
    Sleep: FnMut(Duration) -> SleepFuture,
    SleepFuture: Future<Output = Result<(), GeneratorError>>,
{
    let started = Instant::now();
    let mut attempt = 1;

    loop {
        hooks.on_attempt_start(operation, attempt);

        match execute(attempt).await {
            Ok(value) => {
                hooks.on_success(operation, attempt);
                return Ok(value);
            }
            Err(error) => {
                if policy.should_retry(started, &error) {
                    let delay = policy.backoff_for_attempt(attempt);
                    hooks.on_retry_scheduled(operation, attempt, delay, &error);

                    if let Err(interrupted) = sleep(delay).await {
                        hooks.on_failure(operation, attempt, &interrupted);
                        return Err(interrupted);
                    }

                    attempt += 1;
                    continue;
                }

                hooks.on_failure(operation, attempt, &error);
                return Err(error);
            }
        }
    }
}

async fn cancellable_sleep(delay: Duration, ctx: &CallContext) -> Result<(), GeneratorError> {
    let timer = Delay::new(delay);
    let cancelled = ctx.cancellation().cancelled();
    pin_mut!(timer);
    pin_mut!(cancelled);

    match select(timer, cancelled).await {
        Either::Left(((), _)) => Ok(()),
        Either::Right(((), _)) => Err(GeneratorError::cancelled(
            "generation cancelled during retry backoff",
        )),
    }
}

/// Wraps one generator, retrying `generate` on retryable errors. Token
/// counting and tool registration forward to the inner generator without
/// retry.
pub struct RetryGenerator {
    inner: Arc<dyn Generator>,
    policy: RetryPolicy,
    hooks: Arc<dyn GeneratorHooks>,
}

impl RetryGenerator {
    pub fn new(inner: Arc<dyn Generator>) -> Self {
        Self {
            inner,
            policy: RetryPolicy::default(),
            hooks: Arc::new(NoopGeneratorHooks),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn GeneratorHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn layer(policy: RetryPolicy) -> GeneratorLayer {
        Box::new(move |inner| Arc::new(Self::new(inner).with_policy(policy.clone())))
    }
}

impl Generator for RetryGenerator {
    fn generate<'a>(
        &'a self,
        ctx: &'a CallContext,
        dialog: &'a Dialog,
        opts: Option<&'a GenOpts>,
    ) -> GeneratorFuture<'a, Result<Response, GeneratorError>> {
        Box::pin(async move {
            retry_with_policy(
                "generate",
                &self.policy,
                self.hooks.as_ref(),
                |_attempt| self.inner.generate(ctx, dialog, opts),
                |delay| cancellable_sleep(delay, ctx),
            )
            .await
        })
    }

    fn token_counter(&self) -> Option<&dyn TokenCounter> {
        self.inner.token_counter()
    }

    fn tool_register(&self) -> Option<&dyn ToolRegister> {
        self.inner.tool_register()
    }
}
