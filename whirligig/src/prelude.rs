//! Common imports for most whirligig applications.

pub use crate::{
    assistant_message, dialog_from, observed, resilient, resilient_with_fallback, tool_loop,
    tool_result_message, user_message,
};
pub use crate::{wg_dialog, wg_msg};
pub use crate::{
    Block, BlockKind, BoxFuture, CallContext, Dialog, FallbackGenerator, FinishReason,
    FunctionCallback, GenOpts, Generator, GeneratorError, GeneratorErrorKind, GeneratorLayer,
    LoopError, LoopErrorKind, LoopFailure, LoopOutcome, LoopRun, Message, Modality,
    NormalizingGenerator, Response, RetryGenerator, RetryPolicy, Role, ToolCallInput, ToolChoice,
    ToolDefinition, ToolError, ToolErrorKind, ToolLoop, ToolLoopBuilder, ToolSet, TraceId,
    UsageMetrics,
};
