//! Backend-agnostic generation contracts and resilience middleware.
//!
//! The conversation model ([`Dialog`], [`Message`], [`Block`]) and the
//! [`Generator`] capability contract live here, together with the
//! cross-cutting wrappers every stack composes around a backend adapter:
//! retry with backoff, ordered fallback, and dialog normalization.
//!
//! ```rust
//! use wgenerate::{Dialog, GenOpts, Message, ToolChoice};
//!
//! let mut dialog = Dialog::new();
//! dialog.push(Message::user("What is 2+2?"));
//!
//! let opts = GenOpts::default().with_tool_choice(ToolChoice::Auto);
//! assert!(opts.validate().is_ok());
//! assert_eq!(dialog.len(), 1);
//! ```

mod context;
mod dialog;
mod error;
mod fallback;
mod generator;
mod middleware;
mod normalize;
mod options;
mod response;
mod retry;

pub mod prelude {
    pub use crate::{
        Block, BlockKind, CallContext, Dialog, FinishReason, GenOpts, Generator, GeneratorError,
        GeneratorErrorKind, GeneratorFuture, Message, Modality, Response, Role, ToolChoice,
        ToolDefinition, UsageMetrics,
    };
}

pub use context::CallContext;
pub use dialog::{
    Block, BlockKind, Dialog, ExtraFields, Message, Modality, Role, ToolCallInput, ToolDefinition,
};
pub use error::{Disposition, GeneratorError, GeneratorErrorKind};
pub use fallback::{
    FallbackGenerator, FallbackPredicate, default_fallback_predicate, fallback_on_rate_limit,
    fallback_on_status_codes,
};
pub use generator::{Generator, GeneratorFuture, TokenCounter, ToolRegister};
pub use middleware::{GeneratorLayer, compose, layer_fn};
pub use normalize::{NormalizingGenerator, normalize};
pub use options::{GenOpts, RESERVED_TOOL_NAMES, ToolChoice};
pub use response::{FinishReason, Response, UsageMetrics};
pub use retry::{
    GeneratorHooks, NoopGeneratorHooks, RetryGenerator, RetryPolicy, retry_with_policy,
};
