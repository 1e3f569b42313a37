//! Orchestration-loop errors and the partial-result failure wrapper.

use std::error::Error;
use std::fmt::{Display, Formatter};

use wgenerate::{Dialog, GeneratorError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopErrorKind {
    InvalidToolChoice,
    Cancelled,
    Generator,
    InvalidResponse,
    MalformedToolCall,
    UnknownTool,
    ToolExecution,
    ToolResultValidation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopError {
    pub kind: LoopErrorKind,
    pub message: String,
    /// The underlying generator error, passed through unchanged when the
    /// wrapped generator failed.
    pub source: Option<GeneratorError>,
}

impl LoopError {
    pub fn new(kind: LoopErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn invalid_tool_choice(message: impl Into<String>) -> Self {
        Self::new(LoopErrorKind::InvalidToolChoice, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(LoopErrorKind::Cancelled, message)
    }

    pub fn generator(error: GeneratorError) -> Self {
        Self {
            kind: LoopErrorKind::Generator,
            message: error.to_string(),
            source: Some(error),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(LoopErrorKind::InvalidResponse, message)
    }

    pub fn malformed_tool_call(message: impl Into<String>) -> Self {
        Self::new(LoopErrorKind::MalformedToolCall, message)
    }

    pub fn unknown_tool(message: impl Into<String>) -> Self {
        Self::new(LoopErrorKind::UnknownTool, message)
    }

    pub fn tool_execution(message: impl Into<String>) -> Self {
        Self::new(LoopErrorKind::ToolExecution, message)
    }

    pub fn tool_result_validation(message: impl Into<String>) -> Self {
        Self::new(LoopErrorKind::ToolResultValidation, message)
    }
}

impl Display for LoopError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for LoopError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|error| error as &(dyn Error + 'static))
    }
}

/// Terminal failure of an orchestrated run. Carries the dialog accumulated
/// up to the failure so callers see everything that happened first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopFailure {
    pub dialog: Dialog,
    pub error: LoopError,
}

impl LoopFailure {
    pub fn new(dialog: Dialog, error: LoopError) -> Self {
        Self { dialog, error }
    }
}

impl Display for LoopFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (after {} dialog messages)",
            self.error,
            self.dialog.len()
        )
    }
}

impl Error for LoopFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}
