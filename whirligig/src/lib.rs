//! Unified facade over the whirligig workspace crates.
//!
//! This crate is designed to be the single dependency for most applications.
//! It re-exports the core whirligig crates and provides convenience
//! utilities and macros for common setup and dialog-building flows.

mod macros;

pub mod prelude;
pub mod stack;
pub mod util;

pub use wcommon;
pub use wgenerate;
pub use wloop;
pub use wobserve;
pub use wtooling;

pub use wcommon::{BoxFuture, MetadataMap, TraceId};
pub use wgenerate::{
    Block, BlockKind, CallContext, Dialog, Disposition, ExtraFields, FallbackGenerator,
    FallbackPredicate, FinishReason, GenOpts, Generator, GeneratorError, GeneratorErrorKind,
    GeneratorFuture, GeneratorHooks, GeneratorLayer, Message, Modality, NoopGeneratorHooks,
    NormalizingGenerator, RESERVED_TOOL_NAMES, Response, RetryGenerator, RetryPolicy, Role,
    TokenCounter, ToolCallInput, ToolChoice, ToolDefinition, ToolRegister, UsageMetrics, compose,
    default_fallback_predicate, fallback_on_rate_limit, fallback_on_status_codes, layer_fn,
    normalize, retry_with_policy,
};
pub use wloop::{
    LoopError, LoopErrorKind, LoopFailure, LoopOutcome, LoopRun, OptsSource, ToolLoop,
    ToolLoopBuilder,
};
pub use wobserve::{MetricsGeneratorHooks, TracingGenerator, TracingGeneratorHooks};
pub use wtooling::{
    FunctionCallback, ToolArguments, ToolCallback, ToolEntry, ToolError, ToolErrorKind, ToolSet,
    optional_string, required_f64, required_string,
};

pub use stack::{observed, resilient, resilient_with_fallback, tool_loop};
pub use util::{assistant_message, dialog_from, tool_result_message, user_message};
