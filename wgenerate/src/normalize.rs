//! Dialog normalization for parallel tool-call answer sets.
//!
//! One backend family emits one tool-result message per call even when the
//! calls were issued together; another expects all results for a batch
//! consolidated into a single message with one block per call. `normalize`
//! rewrites a dialog into the consolidated convention. It is pure and
//! idempotent, never reorders blocks or messages, and never lengthens the
//! dialog.
//!
//! ```rust
//! use wgenerate::{Dialog, Message, normalize};
//!
//! let mut dialog = Dialog::new();
//! dialog.push(Message::user("hello"));
//! dialog.push(Message::assistant("hi"));
//!
//! let normalized = normalize(&dialog);
//! assert_eq!(normalized, dialog);
//! ```

use std::sync::Arc;

use crate::{
    CallContext, Dialog, GenOpts, Generator, GeneratorError, GeneratorFuture, GeneratorLayer,
    Message, Response, Role, TokenCounter, ToolRegister,
};

pub fn normalize(dialog: &Dialog) -> Dialog {
    let messages = dialog.messages();
    let mut out: Vec<Message> = Vec::with_capacity(messages.len());
    let mut index = 0;

    while index < messages.len() {
        if messages[index].role != Role::ToolResult {
            out.push(messages[index].clone());
            index += 1;
            continue;
        }

        // Maximal run of consecutive tool-result messages.
        let mut end = index + 1;
        while end < messages.len() && messages[end].role == Role::ToolResult {
            end += 1;
        }

        let run = &messages[index..end];
        if run.len() > 1
            && let Some(issued) = issuing_call_ids(&messages[..index])
            && issued.len() > 1
            && run_answers_batch(run, &issued)
        {
            out.push(merge_run(run));
        } else {
            out.extend(run.iter().cloned());
        }

        index = end;
    }

    Dialog::from(out)
}

/// Tool-call block ids of the nearest preceding assistant turn that issued
/// tool calls, if any.
fn issuing_call_ids(prefix: &[Message]) -> Option<Vec<String>> {
    prefix.iter().rev().find_map(|message| {
        if message.role != Role::Assistant {
            return None;
        }

        let ids: Vec<String> = message
            .tool_call_blocks()
            .map(|block| block.id.clone())
            .collect();
        if ids.is_empty() { None } else { Some(ids) }
    })
}

fn run_answers_batch(run: &[Message], issued: &[String]) -> bool {
    run.iter()
        .flat_map(|message| message.blocks.iter())
        .any(|block| issued.iter().any(|id| id == &block.id))
}

fn merge_run(run: &[Message]) -> Message {
    let blocks = run
        .iter()
        .flat_map(|message| message.blocks.iter().cloned())
        .collect();
    let failed = run.iter().any(|message| message.tool_result_error);

    Message::tool_result_blocks(blocks).with_tool_result_error(failed)
}

/// Middleware wrapper that normalizes the dialog before delegating to the
/// inner generator.
pub struct NormalizingGenerator {
    inner: Arc<dyn Generator>,
}

impl NormalizingGenerator {
    pub fn new(inner: Arc<dyn Generator>) -> Self {
        Self { inner }
    }

    pub fn layer() -> GeneratorLayer {
        Box::new(|inner| Arc::new(Self::new(inner)))
    }
}

impl Generator for NormalizingGenerator {
    fn generate<'a>(
        &'a self,
        ctx: &'a CallContext,
        dialog: &'a Dialog,
        opts: Option<&'a GenOpts>,
    ) -> GeneratorFuture<'a, Result<Response, GeneratorError>> {
        Box::pin(async move {
            let normalized = normalize(dialog);
            self.inner.generate(ctx, &normalized, opts).await
        })
    }

    fn token_counter(&self) -> Option<&dyn TokenCounter> {
        self.inner.token_counter()
    }

    fn tool_register(&self) -> Option<&dyn ToolRegister> {
        self.inner.tool_register()
    }
}
