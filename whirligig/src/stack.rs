//! Convenience builders for common generator stacks.

use std::sync::Arc;

use wgenerate::{
    FallbackGenerator, Generator, GeneratorError, NormalizingGenerator, RetryGenerator,
    RetryPolicy, compose,
};
use wloop::ToolLoop;
use wobserve::TracingGenerator;
use wtooling::ToolSet;

/// Retry and normalization around a single backend.
pub fn resilient(base: Arc<dyn Generator>, policy: RetryPolicy) -> Arc<dyn Generator> {
    compose(
        base,
        vec![RetryGenerator::layer(policy), NormalizingGenerator::layer()],
    )
}

/// Retry and normalization around an ordered fallback chain.
pub fn resilient_with_fallback(
    generators: Vec<Arc<dyn Generator>>,
    policy: RetryPolicy,
) -> Result<Arc<dyn Generator>, GeneratorError> {
    let fallback = Arc::new(FallbackGenerator::new(generators)?);
    Ok(resilient(fallback, policy))
}

/// Tracing log layer around any generator.
pub fn observed(base: Arc<dyn Generator>) -> Arc<dyn Generator> {
    compose(base, vec![TracingGenerator::layer()])
}

/// A tool loop over the given generator and tool set.
pub fn tool_loop(generator: Arc<dyn Generator>, tools: ToolSet) -> ToolLoop {
    ToolLoop::builder(generator).tools(tools).build()
}
