//! The tool orchestration loop: generate, execute callbacks, fold results
//! back into the dialog, repeat until a non-tool-use turn.

use std::sync::Arc;

use wgenerate::{
    Block, BlockKind, CallContext, Dialog, FinishReason, GenOpts, Generator, Message, Response,
    Role, ToolCallInput, ToolChoice, UsageMetrics,
};
use wtooling::ToolSet;

use crate::{LoopError, LoopFailure, LoopOutcome, LoopRun, OptsSource};

pub struct ToolLoopBuilder {
    generator: Arc<dyn Generator>,
    tools: ToolSet,
    opts_source: Option<OptsSource>,
    max_turns: Option<u32>,
}

impl ToolLoopBuilder {
    fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            tools: ToolSet::new(),
            opts_source: None,
            max_turns: None,
        }
    }

    pub fn tools(mut self, tools: ToolSet) -> Self {
        self.tools = tools;
        self
    }

    pub fn opts_source<F>(mut self, source: F) -> Self
    where
        F: Fn(&Dialog) -> GenOpts + Send + Sync + 'static,
    {
        self.opts_source = Some(Arc::new(source));
        self
    }

    /// Caps the number of generation calls per run. Without a cap the loop
    /// only terminates when the generator stops requesting tool use, a
    /// terminal tool fires, or the context is cancelled.
    pub fn max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    pub fn build(self) -> ToolLoop {
        ToolLoop {
            generator: self.generator,
            tools: self.tools,
            opts_source: self.opts_source,
            max_turns: self.max_turns,
        }
    }
}

/// Drives a generator until it produces a non-tool-use turn, executing
/// registered callbacks for every tool call in between. Owns its tool set
/// for the lifetime of the instance; retry and fallback are the wrapped
/// generator's concern, never the loop's.
pub struct ToolLoop {
    generator: Arc<dyn Generator>,
    tools: ToolSet,
    opts_source: Option<OptsSource>,
    max_turns: Option<u32>,
}

impl ToolLoop {
    pub fn builder(generator: Arc<dyn Generator>) -> ToolLoopBuilder {
        ToolLoopBuilder::new(generator)
    }

    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self::builder(generator).build()
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    /// Runs the loop to completion. Every failure carries the dialog
    /// accumulated so far, including the turns appended before the error.
    pub async fn run(&self, ctx: &CallContext, dialog: Dialog) -> Result<LoopRun, LoopFailure> {
        let mut dialog = dialog;
        let mut usage = UsageMetrics::default();
        let mut turns = 0;

        match self.drive(ctx, &mut dialog, &mut usage, &mut turns).await {
            Ok(outcome) => Ok(LoopRun {
                dialog,
                outcome,
                usage,
                turns,
            }),
            Err(error) => Err(LoopFailure::new(dialog, error)),
        }
    }

    async fn drive(
        &self,
        ctx: &CallContext,
        dialog: &mut Dialog,
        usage: &mut UsageMetrics,
        turns: &mut u32,
    ) -> Result<LoopOutcome, LoopError> {
        loop {
            if let Some(max_turns) = self.max_turns
                && *turns >= max_turns
            {
                return Ok(LoopOutcome::TurnLimitReached);
            }

            let opts = self.opts_source.as_ref().map(|source| source(dialog));

            // A named tool choice is validated before any call is made.
            if let Some(opts) = &opts
                && let Some(ToolChoice::Tool(name)) = &opts.tool_choice
                && !self.tools.contains(name)
            {
                return Err(LoopError::invalid_tool_choice(format!(
                    "tool choice names unregistered tool '{name}'"
                )));
            }

            if ctx.is_cancelled() {
                return Err(LoopError::cancelled("run cancelled before generation"));
            }

            *turns += 1;
            let response = self
                .generator
                .generate(ctx, dialog, opts.as_ref())
                .await
                .map_err(LoopError::generator)?;

            let Response {
                candidates,
                finish_reason,
                usage: call_usage,
            } = response;
            usage.add(call_usage);

            let mut candidates = candidates;
            if candidates.len() != 1 {
                return Err(LoopError::invalid_response(format!(
                    "expected exactly one candidate, got {}",
                    candidates.len()
                )));
            }

            let candidate = candidates.remove(0);
            if candidate.role != Role::Assistant {
                return Err(LoopError::invalid_response(
                    "candidate role must be assistant",
                ));
            }

            let calls: Vec<Block> = candidate.tool_call_blocks().cloned().collect();
            dialog.push(candidate);

            if finish_reason != FinishReason::ToolUse {
                return Ok(LoopOutcome::Completed(finish_reason));
            }

            // Callbacks for a parallel batch run strictly sequentially in
            // block order; side-effect ordering is part of the contract.
            for call in &calls {
                let input = ToolCallInput::from_block(call)
                    .map_err(|error| LoopError::malformed_tool_call(error.message))?;

                let Some(entry) = self.tools.get(&input.name) else {
                    return Err(LoopError::unknown_tool(format!(
                        "tool '{}' is not registered",
                        input.name
                    )));
                };

                let Some(callback) = entry.callback.as_ref() else {
                    return Ok(LoopOutcome::Handoff { tool: input.name });
                };

                let message = callback
                    .call(ctx, &input.parameters, &call.id)
                    .await
                    .map_err(|error| LoopError::tool_execution(error.to_string()))?;

                validate_tool_result(&message, &call.id)?;
                dialog.push(message);
            }
        }
    }
}

fn validate_tool_result(message: &Message, call_id: &str) -> Result<(), LoopError> {
    if message.role != Role::ToolResult {
        return Err(LoopError::tool_result_validation(
            "callback must return a tool-result message",
        ));
    }

    if message.blocks.is_empty() {
        return Err(LoopError::tool_result_validation(
            "tool-result message must contain at least one block",
        ));
    }

    for block in &message.blocks {
        if block.id != call_id {
            return Err(LoopError::tool_result_validation(format!(
                "block id '{}' does not match invoking tool call id '{}'",
                block.id, call_id
            )));
        }

        if block.kind != BlockKind::ToolResult {
            return Err(LoopError::tool_result_validation(
                "tool-result messages may only contain tool-result blocks",
            ));
        }

        if let Err(error) = block.validate() {
            return Err(LoopError::tool_result_validation(error.to_string()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use wgenerate::{GeneratorError, GeneratorFuture, ToolDefinition};
    use wtooling::ToolError;

    use super::*;
    use crate::LoopErrorKind;

    fn definition(name: &str) -> ToolDefinition {
        ToolDefinition::new(name, "test tool", r#"{"type":"object"}"#)
    }

    fn user_dialog() -> Dialog {
        Dialog::from(vec![Message::user("go")])
    }

    /// Requests the named tool until a tool result appears, then ends the
    /// turn.
    struct OneToolGenerator {
        tool: &'static str,
        calls: Mutex<u32>,
    }

    impl OneToolGenerator {
        fn new(tool: &'static str) -> Self {
            Self {
                tool,
                calls: Mutex::new(0),
            }
        }
    }

    impl Generator for OneToolGenerator {
        fn generate<'a>(
            &'a self,
            _ctx: &'a CallContext,
            dialog: &'a Dialog,
            _opts: Option<&'a GenOpts>,
        ) -> GeneratorFuture<'a, Result<Response, GeneratorError>> {
            Box::pin(async move {
                *self.calls.lock().expect("calls lock") += 1;

                let answered = dialog.iter().any(|message| message.role == Role::ToolResult);
                if answered {
                    return Ok(Response::new(
                        vec![Message::assistant("done")],
                        FinishReason::EndTurn,
                    ));
                }

                Ok(Response::new(
                    vec![Message::assistant_blocks(vec![Block::tool_call(
                        "call_1",
                        &ToolCallInput::named(self.tool),
                    )])],
                    FinishReason::ToolUse,
                ))
            })
        }
    }

    struct EndTurnGenerator {
        calls: Mutex<u32>,
    }

    impl Generator for EndTurnGenerator {
        fn generate<'a>(
            &'a self,
            _ctx: &'a CallContext,
            _dialog: &'a Dialog,
            _opts: Option<&'a GenOpts>,
        ) -> GeneratorFuture<'a, Result<Response, GeneratorError>> {
            Box::pin(async move {
                *self.calls.lock().expect("calls lock") += 1;
                Ok(Response::new(
                    vec![Message::assistant("plain answer")],
                    FinishReason::EndTurn,
                ))
            })
        }
    }

    #[tokio::test]
    async fn non_tool_use_turn_terminates_after_one_call() {
        let generator = Arc::new(EndTurnGenerator {
            calls: Mutex::new(0),
        });
        let tool_loop = ToolLoop::new(generator.clone());

        let run = tool_loop
            .run(&CallContext::new(), user_dialog())
            .await
            .expect("run should complete");

        assert_eq!(run.dialog.len(), 2);
        assert_eq!(run.outcome, LoopOutcome::Completed(FinishReason::EndTurn));
        assert_eq!(run.turns, 1);
        assert_eq!(*generator.calls.lock().expect("calls lock"), 1);
    }

    #[tokio::test]
    async fn terminal_tool_stops_without_fabricating_a_result() {
        let mut tools = ToolSet::new();
        tools
            .register_manual(definition("stop"))
            .expect("registration should succeed");

        let tool_loop = ToolLoop::builder(Arc::new(OneToolGenerator::new("stop")))
            .tools(tools)
            .build();

        let run = tool_loop
            .run(&CallContext::new(), user_dialog())
            .await
            .expect("run should hand off");

        assert_eq!(
            run.outcome,
            LoopOutcome::Handoff {
                tool: "stop".to_string()
            }
        );
        // User turn plus the assistant tool-call turn, nothing else.
        assert_eq!(run.dialog.len(), 2);
        assert!(run.dialog.last().is_some_and(Message::has_tool_calls));
    }

    #[tokio::test]
    async fn mismatched_result_id_is_rejected_and_not_appended() {
        let mut tools = ToolSet::new();
        tools
            .register_fn(definition("echo"), |_arguments, _ctx, _call_id| async move {
                Ok(Message::tool_result("someone_elses_call", "output"))
            })
            .expect("registration should succeed");

        let tool_loop = ToolLoop::builder(Arc::new(OneToolGenerator::new("echo")))
            .tools(tools)
            .build();

        let failure = tool_loop
            .run(&CallContext::new(), user_dialog())
            .await
            .expect_err("mismatched id should fail");

        assert_eq!(failure.error.kind, LoopErrorKind::ToolResultValidation);
        assert_eq!(failure.dialog.len(), 2);
        assert!(
            failure
                .dialog
                .iter()
                .all(|message| message.role != Role::ToolResult)
        );
    }

    #[tokio::test]
    async fn named_tool_choice_is_validated_before_any_call() {
        let generator = Arc::new(EndTurnGenerator {
            calls: Mutex::new(0),
        });
        let tool_loop = ToolLoop::builder(generator.clone())
            .opts_source(|_dialog| GenOpts::default().with_tool_choice(ToolChoice::tool("ghost")))
            .build();

        let failure = tool_loop
            .run(&CallContext::new(), user_dialog())
            .await
            .expect_err("unregistered tool choice should fail");

        assert_eq!(failure.error.kind, LoopErrorKind::InvalidToolChoice);
        assert_eq!(failure.dialog.len(), 1);
        assert_eq!(*generator.calls.lock().expect("calls lock"), 0);
    }

    #[tokio::test]
    async fn cancellation_returns_partial_dialog() {
        let ctx = CallContext::new();
        ctx.cancellation().cancel();

        let tool_loop = ToolLoop::new(Arc::new(EndTurnGenerator {
            calls: Mutex::new(0),
        }));

        let failure = tool_loop
            .run(&ctx, user_dialog())
            .await
            .expect_err("cancelled run should fail");

        assert_eq!(failure.error.kind, LoopErrorKind::Cancelled);
        assert_eq!(failure.dialog.len(), 1);
    }

    #[tokio::test]
    async fn generator_error_surfaces_unchanged_with_dialog() {
        struct FailingGenerator;

        impl Generator for FailingGenerator {
            fn generate<'a>(
                &'a self,
                _ctx: &'a CallContext,
                _dialog: &'a Dialog,
                _opts: Option<&'a GenOpts>,
            ) -> GeneratorFuture<'a, Result<Response, GeneratorError>> {
                Box::pin(async move { Err(GeneratorError::rate_limited("throttled")) })
            }
        }

        let tool_loop = ToolLoop::new(Arc::new(FailingGenerator));
        let failure = tool_loop
            .run(&CallContext::new(), user_dialog())
            .await
            .expect_err("generator failure should surface");

        assert_eq!(failure.error.kind, LoopErrorKind::Generator);
        assert_eq!(
            failure.error.source,
            Some(GeneratorError::rate_limited("throttled"))
        );
        assert_eq!(failure.dialog.len(), 1);
    }

    #[tokio::test]
    async fn callback_execution_failure_is_unrecoverable() {
        let mut tools = ToolSet::new();
        tools
            .register_fn(definition("echo"), |_arguments, _ctx, _call_id| async move {
                Err(ToolError::execution("tool exploded"))
            })
            .expect("registration should succeed");

        let tool_loop = ToolLoop::builder(Arc::new(OneToolGenerator::new("echo")))
            .tools(tools)
            .build();

        let failure = tool_loop
            .run(&CallContext::new(), user_dialog())
            .await
            .expect_err("callback failure should surface");

        assert_eq!(failure.error.kind, LoopErrorKind::ToolExecution);
        assert!(failure.error.message.contains("tool exploded"));
        assert_eq!(failure.dialog.len(), 2);
    }

    #[tokio::test]
    async fn unregistered_tool_call_is_unrecoverable() {
        let tool_loop = ToolLoop::new(Arc::new(OneToolGenerator::new("ghost")));

        let failure = tool_loop
            .run(&CallContext::new(), user_dialog())
            .await
            .expect_err("unknown tool should fail");

        assert_eq!(failure.error.kind, LoopErrorKind::UnknownTool);
    }

    #[tokio::test]
    async fn turn_limit_is_an_outcome_not_an_error() {
        struct AlwaysToolUse;

        impl Generator for AlwaysToolUse {
            fn generate<'a>(
                &'a self,
                _ctx: &'a CallContext,
                _dialog: &'a Dialog,
                _opts: Option<&'a GenOpts>,
            ) -> GeneratorFuture<'a, Result<Response, GeneratorError>> {
                Box::pin(async move {
                    Ok(Response::new(
                        vec![Message::assistant_blocks(vec![Block::tool_call(
                            "call_n",
                            &ToolCallInput::named("echo"),
                        )])],
                        FinishReason::ToolUse,
                    ))
                })
            }
        }

        let mut tools = ToolSet::new();
        tools
            .register_text_fn(definition("echo"), |_arguments| Ok("ok".to_string()))
            .expect("registration should succeed");

        let tool_loop = ToolLoop::builder(Arc::new(AlwaysToolUse))
            .tools(tools)
            .max_turns(2)
            .build();

        let run = tool_loop
            .run(&CallContext::new(), user_dialog())
            .await
            .expect("run should stop at the cap");

        assert_eq!(run.outcome, LoopOutcome::TurnLimitReached);
        assert_eq!(run.turns, 2);
    }

    #[tokio::test]
    async fn application_level_tool_failure_feeds_back_into_the_loop() {
        let mut tools = ToolSet::new();
        tools
            .register_fn(definition("echo"), |_arguments, _ctx, call_id| async move {
                Ok(Message::tool_result(call_id, "lookup failed upstream")
                    .with_tool_result_error(true))
            })
            .expect("registration should succeed");

        let tool_loop = ToolLoop::builder(Arc::new(OneToolGenerator::new("echo")))
            .tools(tools)
            .build();

        let run = tool_loop
            .run(&CallContext::new(), user_dialog())
            .await
            .expect("flagged tool failure is not a loop error");

        assert_eq!(run.outcome, LoopOutcome::Completed(FinishReason::EndTurn));
        assert_eq!(run.dialog.len(), 4);
        let flagged = run
            .dialog
            .iter()
            .find(|message| message.role == Role::ToolResult)
            .expect("tool result should be present");
        assert!(flagged.tool_result_error);
    }

    #[tokio::test]
    async fn parallel_batch_callbacks_run_sequentially_in_block_order() {
        struct ParallelGenerator;

        impl Generator for ParallelGenerator {
            fn generate<'a>(
                &'a self,
                _ctx: &'a CallContext,
                dialog: &'a Dialog,
                _opts: Option<&'a GenOpts>,
            ) -> GeneratorFuture<'a, Result<Response, GeneratorError>> {
                Box::pin(async move {
                    let answered =
                        dialog.iter().any(|message| message.role == Role::ToolResult);
                    if answered {
                        return Ok(Response::new(
                            vec![Message::assistant("done")],
                            FinishReason::EndTurn,
                        ));
                    }

                    Ok(Response::new(
                        vec![Message::assistant_blocks(vec![
                            Block::tool_call("call_a", &ToolCallInput::named("first")),
                            Block::tool_call("call_b", &ToolCallInput::named("second")),
                        ])],
                        FinishReason::ToolUse,
                    ))
                })
            }
        }

        let order = Arc::new(Mutex::new(Vec::new()));
        let mut tools = ToolSet::new();
        for name in ["first", "second"] {
            let order = Arc::clone(&order);
            tools
                .register_fn(definition(name), move |_arguments, _ctx, call_id| {
                    let order = Arc::clone(&order);
                    async move {
                        order.lock().expect("order lock").push(name.to_string());
                        Ok(Message::tool_result(call_id, name))
                    }
                })
                .expect("registration should succeed");
        }

        let tool_loop = ToolLoop::builder(Arc::new(ParallelGenerator))
            .tools(tools)
            .build();

        let run = tool_loop
            .run(&CallContext::new(), user_dialog())
            .await
            .expect("run should complete");

        assert_eq!(
            order.lock().expect("order lock").as_slice(),
            ["first", "second"]
        );
        // User, assistant batch, two separate tool-result turns, final
        // assistant answer.
        assert_eq!(run.dialog.len(), 5);
    }

    #[tokio::test]
    async fn multi_candidate_responses_are_rejected() {
        struct TwoCandidates;

        impl Generator for TwoCandidates {
            fn generate<'a>(
                &'a self,
                _ctx: &'a CallContext,
                _dialog: &'a Dialog,
                _opts: Option<&'a GenOpts>,
            ) -> GeneratorFuture<'a, Result<Response, GeneratorError>> {
                Box::pin(async move {
                    Ok(Response::new(
                        vec![Message::assistant("one"), Message::assistant("two")],
                        FinishReason::EndTurn,
                    ))
                })
            }
        }

        let tool_loop = ToolLoop::new(Arc::new(TwoCandidates));
        let failure = tool_loop
            .run(&CallContext::new(), user_dialog())
            .await
            .expect_err("two candidates should fail");

        assert_eq!(failure.error.kind, LoopErrorKind::InvalidResponse);
    }
}
