//! Per-call generation options and the tool-choice directive.
//!
//! ```rust
//! use wgenerate::{GenOpts, ToolChoice};
//!
//! let opts = GenOpts::default()
//!     .with_temperature(0.2)
//!     .with_max_tokens(256)
//!     .with_tool_choice(ToolChoice::Auto);
//!
//! assert!(opts.validate().is_ok());
//! assert_eq!(opts.tool_choice, Some(ToolChoice::Auto));
//! ```

use std::fmt::{Display, Formatter};

use serde_json::{Map, Value};

use crate::{GeneratorError, Modality};

/// Tool names a register call must reject; they collide with the wire-level
/// tool-choice directives.
pub const RESERVED_TOOL_NAMES: [&str; 2] = ["auto", "required"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolChoice {
    Auto,
    Required,
    Tool(String),
}

impl ToolChoice {
    pub fn tool(name: impl Into<String>) -> Self {
        Self::Tool(name.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Auto => "auto",
            Self::Required => "required",
            Self::Tool(name) => name.as_str(),
        }
    }

    pub fn is_reserved_name(name: &str) -> bool {
        RESERVED_TOOL_NAMES.contains(&name)
    }
}

impl Display for ToolChoice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-constructed generation configuration, read-only to the core. The
/// orchestrator may recompute it per loop iteration from the evolving
/// dialog.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenOpts {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    pub candidate_count: Option<u32>,
    pub max_tokens: Option<u32>,
    pub tool_choice: Option<ToolChoice>,
    pub stop_sequences: Vec<String>,
    pub output_modalities: Vec<Modality>,
    pub audio_config: Option<Value>,
    pub thinking_budget: Option<u32>,
    pub extra_args: Map<String, Value>,
}

impl GenOpts {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_frequency_penalty(mut self, frequency_penalty: f32) -> Self {
        self.frequency_penalty = Some(frequency_penalty);
        self
    }

    pub fn with_presence_penalty(mut self, presence_penalty: f32) -> Self {
        self.presence_penalty = Some(presence_penalty);
        self
    }

    pub fn with_candidate_count(mut self, candidate_count: u32) -> Self {
        self.candidate_count = Some(candidate_count);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.tool_choice = Some(tool_choice);
        self
    }

    pub fn with_stop_sequence(mut self, stop_sequence: impl Into<String>) -> Self {
        self.stop_sequences.push(stop_sequence.into());
        self
    }

    pub fn with_output_modality(mut self, modality: Modality) -> Self {
        self.output_modalities.push(modality);
        self
    }

    pub fn with_audio_config(mut self, audio_config: Value) -> Self {
        self.audio_config = Some(audio_config);
        self
    }

    pub fn with_thinking_budget(mut self, thinking_budget: u32) -> Self {
        self.thinking_budget = Some(thinking_budget);
        self
    }

    pub fn with_extra_arg(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra_args.insert(key.into(), value);
        self
    }

    pub fn validate(&self) -> Result<(), GeneratorError> {
        if let Some(temperature) = self.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(GeneratorError::invalid_parameter(
                "temperature must be in the inclusive range 0.0..=2.0",
            ));
        }

        if let Some(top_p) = self.top_p
            && !(0.0..=1.0).contains(&top_p)
        {
            return Err(GeneratorError::invalid_parameter(
                "top_p must be in the inclusive range 0.0..=1.0",
            ));
        }

        if let Some(max_tokens) = self.max_tokens
            && max_tokens == 0
        {
            return Err(GeneratorError::invalid_parameter(
                "max_tokens must be greater than zero",
            ));
        }

        if let Some(candidate_count) = self.candidate_count
            && candidate_count == 0
        {
            return Err(GeneratorError::invalid_parameter(
                "candidate_count must be greater than zero",
            ));
        }

        Ok(())
    }
}
