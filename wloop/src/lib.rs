//! Tool orchestration loop for multi-turn, tool-using conversations.
//!
//! ```rust
//! use std::sync::Arc;
//! use wgenerate::{CallContext, Dialog, FinishReason, GenOpts, Generator, GeneratorError,
//!     GeneratorFuture, Message, Response};
//! use wloop::{LoopOutcome, ToolLoop};
//!
//! struct EchoGenerator;
//!
//! impl Generator for EchoGenerator {
//!     fn generate<'a>(
//!         &'a self,
//!         _ctx: &'a CallContext,
//!         _dialog: &'a Dialog,
//!         _opts: Option<&'a GenOpts>,
//!     ) -> GeneratorFuture<'a, Result<Response, GeneratorError>> {
//!         Box::pin(async move {
//!             Ok(Response::new(vec![Message::assistant("hi")], FinishReason::EndTurn))
//!         })
//!     }
//! }
//!
//! # async fn demo() {
//! let tool_loop = ToolLoop::new(Arc::new(EchoGenerator));
//! let run = tool_loop
//!     .run(&CallContext::new(), Dialog::from(vec![Message::user("hello")]))
//!     .await
//!     .expect("run should complete");
//! assert_eq!(run.outcome, LoopOutcome::Completed(FinishReason::EndTurn));
//! # }
//! ```

mod error;
mod orchestrator;
mod types;

pub mod prelude {
    pub use crate::{
        LoopError, LoopErrorKind, LoopFailure, LoopOutcome, LoopRun, OptsSource, ToolLoop,
        ToolLoopBuilder,
    };
}

pub use error::{LoopError, LoopErrorKind, LoopFailure};
pub use orchestrator::{ToolLoop, ToolLoopBuilder};
pub use types::{LoopOutcome, LoopRun, OptsSource};
