//! Ordered failover across multiple generators.
//!
//! ```rust
//! use wgenerate::{GeneratorError, fallback_on_rate_limit};
//!
//! let predicate = fallback_on_rate_limit();
//! assert!(predicate(&GeneratorError::rate_limited("throttled")));
//! assert!(!predicate(&GeneratorError::timeout("slow")));
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use http::StatusCode;

use crate::{
    CallContext, Dialog, GenOpts, Generator, GeneratorError, GeneratorErrorKind, GeneratorFuture,
    Response, TokenCounter, ToolRegister,
};

pub type FallbackPredicate = Arc<dyn Fn(&GeneratorError) -> bool + Send + Sync>;

/// Default policy: advance to the next generator on rate limits and API
/// server errors.
pub fn default_fallback_predicate() -> FallbackPredicate {
    Arc::new(|error| match error.kind {
        GeneratorErrorKind::RateLimit => true,
        GeneratorErrorKind::Api => error.status.is_some_and(|status| status.is_server_error()),
        _ => false,
    })
}

/// Fall back only on an explicit API status-code set.
pub fn fallback_on_status_codes(codes: impl IntoIterator<Item = StatusCode>) -> FallbackPredicate {
    let codes: HashSet<StatusCode> = codes.into_iter().collect();
    Arc::new(move |error| error.status.is_some_and(|status| codes.contains(&status)))
}

/// Fall back only on rate limits.
pub fn fallback_on_rate_limit() -> FallbackPredicate {
    Arc::new(|error| error.kind == GeneratorErrorKind::RateLimit)
}

/// Tries generators strictly in order. The first success short-circuits; an
/// error the predicate rejects is returned immediately; exhausting every
/// generator returns the last error with its message wrapped.
///
/// Capability accessors delegate to the primary (first) generator.
pub struct FallbackGenerator {
    generators: Vec<Arc<dyn Generator>>,
    predicate: FallbackPredicate,
}

impl FallbackGenerator {
    pub fn new(generators: Vec<Arc<dyn Generator>>) -> Result<Self, GeneratorError> {
        if generators.len() < 2 {
            return Err(GeneratorError::invalid_parameter(
                "fallback requires at least two generators",
            ));
        }

        Ok(Self {
            generators,
            predicate: default_fallback_predicate(),
        })
    }

    pub fn with_predicate(mut self, predicate: FallbackPredicate) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

fn exhausted(count: usize, error: GeneratorError) -> GeneratorError {
    GeneratorError {
        message: format!(
            "all {count} generators exhausted; last error: {}",
            error.message
        ),
        ..error
    }
}

impl Generator for FallbackGenerator {
    fn generate<'a>(
        &'a self,
        ctx: &'a CallContext,
        dialog: &'a Dialog,
        opts: Option<&'a GenOpts>,
    ) -> GeneratorFuture<'a, Result<Response, GeneratorError>> {
        Box::pin(async move {
            let last_index = self.generators.len().saturating_sub(1);

            for (index, generator) in self.generators.iter().enumerate() {
                match generator.generate(ctx, dialog, opts).await {
                    Ok(response) => return Ok(response),
                    Err(error) => {
                        if !(self.predicate)(&error) {
                            return Err(error);
                        }

                        if index == last_index {
                            return Err(exhausted(self.generators.len(), error));
                        }
                    }
                }
            }

            Err(GeneratorError::other("fallback chain has no generators"))
        })
    }

    fn token_counter(&self) -> Option<&dyn TokenCounter> {
        self.generators
            .first()
            .and_then(|generator| generator.token_counter())
    }

    fn tool_register(&self) -> Option<&dyn ToolRegister> {
        self.generators
            .first()
            .and_then(|generator| generator.tool_register())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{FinishReason, Message};

    struct ScriptedGenerator {
        reply: Result<String, GeneratorError>,
        calls: Mutex<u32>,
    }

    impl ScriptedGenerator {
        fn ok(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                calls: Mutex::new(0),
            })
        }

        fn failing(error: GeneratorError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(error),
                calls: Mutex::new(0),
            })
        }

        fn call_count(&self) -> u32 {
            *self.calls.lock().expect("calls lock")
        }
    }

    impl Generator for ScriptedGenerator {
        fn generate<'a>(
            &'a self,
            _ctx: &'a CallContext,
            _dialog: &'a Dialog,
            _opts: Option<&'a GenOpts>,
        ) -> GeneratorFuture<'a, Result<Response, GeneratorError>> {
            Box::pin(async move {
                *self.calls.lock().expect("calls lock") += 1;
                match &self.reply {
                    Ok(text) => Ok(Response::new(
                        vec![Message::assistant(text.clone())],
                        FinishReason::EndTurn,
                    )),
                    Err(error) => Err(error.clone()),
                }
            })
        }
    }

    fn dialog() -> Dialog {
        Dialog::from(vec![Message::user("hi")])
    }

    #[test]
    fn construction_requires_at_least_two_generators() {
        let only: Vec<Arc<dyn Generator>> = vec![ScriptedGenerator::ok("only")];
        let error = FallbackGenerator::new(only)
            .err()
            .expect("single generator must be rejected");
        assert_eq!(error.kind, GeneratorErrorKind::InvalidParameter);
    }

    #[tokio::test]
    async fn first_success_short_circuits() {
        let first = ScriptedGenerator::ok("primary");
        let second = ScriptedGenerator::ok("secondary");
        let fallback = FallbackGenerator::new(vec![first.clone(), second.clone()])
            .expect("two generators should build");

        let response = fallback
            .generate(&CallContext::new(), &dialog(), None)
            .await
            .expect("primary should answer");

        assert_eq!(response.candidates[0].text(), "primary");
        assert_eq!(first.call_count(), 1);
        assert_eq!(second.call_count(), 0);
    }

    #[tokio::test]
    async fn non_fallback_worthy_error_returns_immediately() {
        let first = ScriptedGenerator::failing(GeneratorError::authentication("bad key"));
        let second = ScriptedGenerator::ok("secondary");
        let fallback = FallbackGenerator::new(vec![first.clone(), second.clone()])
            .expect("two generators should build");

        let error = fallback
            .generate(&CallContext::new(), &dialog(), None)
            .await
            .expect_err("authentication failure should not fall back");

        assert_eq!(error.kind, GeneratorErrorKind::Authentication);
        assert_eq!(second.call_count(), 0);
    }

    #[tokio::test]
    async fn rate_limited_primary_falls_back_to_secondary() {
        let first = ScriptedGenerator::failing(GeneratorError::rate_limited("throttled"));
        let second = ScriptedGenerator::ok("secondary");
        let fallback = FallbackGenerator::new(vec![first.clone(), second.clone()])
            .expect("two generators should build");

        let response = fallback
            .generate(&CallContext::new(), &dialog(), None)
            .await
            .expect("secondary should answer");

        assert_eq!(response.candidates[0].text(), "secondary");
        assert_eq!(first.call_count(), 1);
        assert_eq!(second.call_count(), 1);
    }

    #[tokio::test]
    async fn exhaustion_wraps_the_last_error() {
        let first = ScriptedGenerator::failing(GeneratorError::rate_limited("throttled"));
        let second = ScriptedGenerator::failing(GeneratorError::api(
            StatusCode::SERVICE_UNAVAILABLE,
            "down",
        ));
        let fallback = FallbackGenerator::new(vec![first, second])
            .expect("two generators should build");

        let error = fallback
            .generate(&CallContext::new(), &dialog(), None)
            .await
            .expect_err("exhaustion should fail");

        assert_eq!(error.kind, GeneratorErrorKind::Api);
        assert_eq!(error.status, Some(StatusCode::SERVICE_UNAVAILABLE));
        assert!(error.message.contains("all 2 generators exhausted"));
        assert!(error.message.contains("down"));
    }

    #[tokio::test]
    async fn custom_predicate_limits_fallback_to_status_set() {
        let first = ScriptedGenerator::failing(GeneratorError::api(
            StatusCode::BAD_GATEWAY,
            "bad gateway",
        ));
        let second = ScriptedGenerator::ok("secondary");
        let fallback = FallbackGenerator::new(vec![first, second.clone()])
            .expect("two generators should build")
            .with_predicate(fallback_on_status_codes([StatusCode::BAD_GATEWAY]));

        let response = fallback
            .generate(&CallContext::new(), &dialog(), None)
            .await
            .expect("secondary should answer");

        assert_eq!(response.candidates[0].text(), "secondary");
        assert_eq!(second.call_count(), 1);
    }
}
