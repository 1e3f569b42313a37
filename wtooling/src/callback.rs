//! Tool callback contract and function-closure adapter.
//!
//! ```rust
//! use wgenerate::Message;
//! use wtooling::{FunctionCallback, ToolArguments};
//!
//! let callback = FunctionCallback::new(|_args: ToolArguments, _ctx, call_id: String| async move {
//!     Ok(Message::tool_result(call_id, "done"))
//! });
//!
//! let _callback = callback;
//! ```

use std::future::Future;
use std::sync::Arc;

use serde_json::{Map, Value};
use wcommon::BoxFuture;
use wgenerate::{CallContext, Message};

use crate::ToolError;

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

/// Decoded tool parameters: an open key-value map.
pub type ToolArguments = Map<String, Value>;

/// Caller-supplied executor for one tool invocation. Returning `Err` means
/// the callback itself failed to run (unrecoverable for the orchestration
/// loop); a tool that ran and wants to report failure returns a tool-result
/// message with its error flag set instead.
pub trait ToolCallback: Send + Sync {
    fn call<'a>(
        &'a self,
        ctx: &'a CallContext,
        arguments: &'a ToolArguments,
        call_id: &'a str,
    ) -> ToolFuture<'a, Result<Message, ToolError>>;
}

type CallbackHandler = dyn Fn(ToolArguments, CallContext, String) -> ToolFuture<'static, Result<Message, ToolError>>
    + Send
    + Sync;

pub struct FunctionCallback {
    handler: Arc<CallbackHandler>,
}

impl FunctionCallback {
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(ToolArguments, CallContext, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Message, ToolError>> + Send + 'static,
    {
        let handler: Arc<CallbackHandler> =
            Arc::new(move |arguments, ctx, call_id| Box::pin(handler(arguments, ctx, call_id)));

        Self { handler }
    }

    /// Adapts a synchronous text-producing function. The returned text is
    /// wrapped in a tool-result message correlated with the invoking call.
    pub fn text<F>(handler: F) -> Self
    where
        F: Fn(&ToolArguments) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        Self::new(move |arguments, _ctx, call_id| {
            let output = handler(&arguments).map(|text| Message::tool_result(call_id, text));
            async move { output }
        })
    }
}

impl ToolCallback for FunctionCallback {
    fn call<'a>(
        &'a self,
        ctx: &'a CallContext,
        arguments: &'a ToolArguments,
        call_id: &'a str,
    ) -> ToolFuture<'a, Result<Message, ToolError>> {
        (self.handler)(arguments.clone(), ctx.clone(), call_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wgenerate::Role;

    use super::*;

    #[tokio::test]
    async fn function_callback_receives_arguments_and_call_id() {
        let callback = FunctionCallback::new(|arguments: ToolArguments, _ctx, call_id: String| {
            async move {
                let op = arguments
                    .get("op")
                    .and_then(Value::as_str)
                    .unwrap_or("none");
                Ok(Message::tool_result(call_id, format!("op={op}")))
            }
        });

        let mut arguments = ToolArguments::new();
        arguments.insert("op".to_string(), json!("add"));

        let message = callback
            .call(&CallContext::new(), &arguments, "call_1")
            .await
            .expect("callback should succeed");

        assert_eq!(message.role, Role::ToolResult);
        assert_eq!(message.blocks[0].id, "call_1");
        assert_eq!(message.blocks[0].content, "op=add");
    }

    #[tokio::test]
    async fn text_adapter_wraps_output_in_a_tool_result() {
        let callback = FunctionCallback::text(|arguments| {
            arguments
                .get("text")
                .and_then(Value::as_str)
                .map(ToString::to_string)
                .ok_or_else(|| ToolError::invalid_arguments("missing required string: 'text'"))
        });

        let mut arguments = ToolArguments::new();
        arguments.insert("text".to_string(), json!("hello"));

        let message = callback
            .call(&CallContext::new(), &arguments, "call_2")
            .await
            .expect("callback should succeed");
        assert_eq!(message.blocks[0].content, "hello");

        let error = callback
            .call(&CallContext::new(), &ToolArguments::new(), "call_3")
            .await
            .expect_err("missing argument should fail");
        assert_eq!(error.kind, crate::ToolErrorKind::InvalidArguments);
    }
}
