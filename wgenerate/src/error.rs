//! Shared generator error kinds, helpers, and retry classification.
//!
//! ```rust
//! use wgenerate::{Disposition, GeneratorError};
//!
//! let auth = GeneratorError::authentication("bad key");
//! assert_eq!(auth.disposition(), Disposition::Permanent);
//!
//! let throttled = GeneratorError::rate_limited("slow down");
//! assert_eq!(throttled.disposition(), Disposition::Retryable);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use http::StatusCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorErrorKind {
    GenerationLimit,
    UnsupportedModality,
    InvalidToolChoice,
    InvalidParameter,
    ContextLength,
    ContentPolicy,
    ToolRegistration,
    EmptyDialog,
    Authentication,
    RateLimit,
    Timeout,
    Api,
    Cancelled,
    Other,
}

/// Whether an error is worth another attempt. Both the retry and fallback
/// policies consult this single classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Retryable,
    Permanent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorError {
    pub kind: GeneratorErrorKind,
    pub message: String,
    pub status: Option<StatusCode>,
}

impl GeneratorError {
    pub fn new(kind: GeneratorErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn generation_limit(message: impl Into<String>) -> Self {
        Self::new(GeneratorErrorKind::GenerationLimit, message)
    }

    pub fn unsupported_modality(message: impl Into<String>) -> Self {
        Self::new(GeneratorErrorKind::UnsupportedModality, message)
    }

    pub fn invalid_tool_choice(message: impl Into<String>) -> Self {
        Self::new(GeneratorErrorKind::InvalidToolChoice, message)
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::new(GeneratorErrorKind::InvalidParameter, message)
    }

    pub fn context_length(message: impl Into<String>) -> Self {
        Self::new(GeneratorErrorKind::ContextLength, message)
    }

    pub fn content_policy(message: impl Into<String>) -> Self {
        Self::new(GeneratorErrorKind::ContentPolicy, message)
    }

    pub fn tool_registration(message: impl Into<String>) -> Self {
        Self::new(GeneratorErrorKind::ToolRegistration, message)
    }

    pub fn empty_dialog(message: impl Into<String>) -> Self {
        Self::new(GeneratorErrorKind::EmptyDialog, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GeneratorErrorKind::Authentication, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(GeneratorErrorKind::RateLimit, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GeneratorErrorKind::Timeout, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(GeneratorErrorKind::Cancelled, message)
    }

    pub fn api(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(GeneratorErrorKind::Api, message).with_status(status)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(GeneratorErrorKind::Other, message)
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Centralized retryable-vs-permanent classification: timeouts, rate
    /// limits, and API 429/5xx are retryable; everything else, including
    /// upstream cancellation, is permanent.
    pub fn disposition(&self) -> Disposition {
        match self.kind {
            GeneratorErrorKind::Timeout | GeneratorErrorKind::RateLimit => Disposition::Retryable,
            GeneratorErrorKind::Api => match self.status {
                Some(status)
                    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() =>
                {
                    Disposition::Retryable
                }
                _ => Disposition::Permanent,
            },
            _ => Disposition::Permanent,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.disposition() == Disposition::Retryable
    }
}

impl Display for GeneratorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{:?} [{}]: {}", self.kind, status.as_u16(), self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for GeneratorError {}
