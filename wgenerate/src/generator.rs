//! Capability contracts every backend adapter satisfies.
//!
//! The core never inspects backend identity: everything above this layer
//! depends on [`Generator`] and, when present, the optional capabilities
//! discovered through its accessor methods. A wrapper that does not
//! intercept a capability forwards the accessor to its inner layer, which is
//! what lets middleware stacks delegate transparently.

use std::future::Future;
use std::pin::Pin;

use crate::{CallContext, Dialog, GenOpts, GeneratorError, Response, ToolDefinition};

pub type GeneratorFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait Generator: Send + Sync {
    fn generate<'a>(
        &'a self,
        ctx: &'a CallContext,
        dialog: &'a Dialog,
        opts: Option<&'a GenOpts>,
    ) -> GeneratorFuture<'a, Result<Response, GeneratorError>>;

    /// Token-counting capability, when the adapter supports it.
    fn token_counter(&self) -> Option<&dyn TokenCounter> {
        None
    }

    /// Tool-registration capability, when the adapter supports it. A
    /// generator whose accessor returns `Some` is tool-capable.
    fn tool_register(&self) -> Option<&dyn ToolRegister> {
        None
    }
}

pub trait TokenCounter: Send + Sync {
    fn count<'a>(
        &'a self,
        ctx: &'a CallContext,
        dialog: &'a Dialog,
    ) -> GeneratorFuture<'a, Result<u64, GeneratorError>>;
}

pub trait ToolRegister: Send + Sync {
    /// Registers a tool once per generator instance. Implementations must
    /// reject duplicate names and the reserved names `auto` and `required`
    /// with a tool-registration error.
    fn register(&self, tool: ToolDefinition) -> Result<(), GeneratorError>;
}
