//! Backend-agnostic conversation model: blocks, messages, and dialogs.
//!
//! ```rust
//! use wgenerate::{Block, Dialog, Message, Role};
//!
//! let mut dialog = Dialog::new();
//! dialog.push(Message::user("What is 2+2?"));
//!
//! assert_eq!(dialog.len(), 1);
//! assert_eq!(dialog.messages()[0].role, Role::User);
//! assert!(Block::text("hello").validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{GeneratorError, GeneratorErrorKind};

pub type ExtraFields = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modality {
    Text,
    Image,
    Audio,
    Video,
}

impl Modality {
    /// Required prefix for a block's mime type under this modality.
    pub fn mime_prefix(&self) -> &'static str {
        match self {
            Self::Text => "text/",
            Self::Image => "image/",
            Self::Audio => "audio/",
            Self::Video => "video/",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Content,
    ToolCall,
    ToolResult,
    Thinking,
}

/// Smallest unit of conversational content. The `id` correlates tool-call
/// blocks with the tool-result blocks that answer them; plain content blocks
/// leave it empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: String,
    pub kind: BlockKind,
    pub modality: Modality,
    pub mime_type: String,
    pub content: String,
    pub extra_fields: ExtraFields,
}

impl Block {
    pub fn new(
        kind: BlockKind,
        modality: Modality,
        mime_type: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            kind,
            modality,
            mime_type: mime_type.into(),
            content: content.into(),
            extra_fields: ExtraFields::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(BlockKind::Content, Modality::Text, "text/plain", content)
    }

    pub fn thinking(content: impl Into<String>) -> Self {
        Self::new(BlockKind::Thinking, Modality::Text, "text/plain", content)
    }

    pub fn image(mime_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(BlockKind::Content, Modality::Image, mime_type, content)
    }

    pub fn tool_call(id: impl Into<String>, input: &ToolCallInput) -> Self {
        Self::new(
            BlockKind::ToolCall,
            Modality::Text,
            "text/plain",
            input.to_content(),
        )
        .with_id(id)
    }

    pub fn tool_result(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(BlockKind::ToolResult, Modality::Text, "text/plain", content).with_id(id)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_extra_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra_fields.insert(key.into(), value);
        self
    }

    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.mime_type.trim().is_empty() {
            return Err(GeneratorError::invalid_parameter(
                "block mime type must not be empty",
            ));
        }

        if !self.mime_type.starts_with(self.modality.mime_prefix()) {
            return Err(GeneratorError::new(
                GeneratorErrorKind::UnsupportedModality,
                format!(
                    "mime type '{}' is inconsistent with {} modality",
                    self.mime_type,
                    self.modality.as_str()
                ),
            ));
        }

        if self.content.is_empty() {
            return Err(GeneratorError::invalid_parameter(
                "block content must not be empty",
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
    ToolResult,
}

/// One conversational turn. A tool-result message answers tool calls issued
/// by the most recent assistant turn; `tool_result_error` marks a tool that
/// ran and reported failure, which is fed back to the model rather than
/// surfaced as an orchestration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub blocks: Vec<Block>,
    pub tool_result_error: bool,
}

impl Message {
    pub fn new(role: Role, blocks: Vec<Block>) -> Self {
        Self {
            role,
            blocks,
            tool_result_error: false,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Block::text(content)])
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, vec![Block::text(content)])
    }

    pub fn assistant_blocks(blocks: Vec<Block>) -> Self {
        Self::new(Role::Assistant, blocks)
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(Role::ToolResult, vec![Block::tool_result(call_id, content)])
    }

    pub fn tool_result_blocks(blocks: Vec<Block>) -> Self {
        Self::new(Role::ToolResult, blocks)
    }

    pub fn with_tool_result_error(mut self, failed: bool) -> Self {
        self.tool_result_error = failed;
        self
    }

    pub fn tool_call_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks
            .iter()
            .filter(|block| block.kind == BlockKind::ToolCall)
    }

    pub fn has_tool_calls(&self) -> bool {
        self.tool_call_blocks().next().is_some()
    }

    /// Concatenated text of all plain content blocks.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .filter(|block| block.kind == BlockKind::Content && block.modality == Modality::Text)
            .map(|block| block.content.as_str())
            .collect()
    }

    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.blocks.is_empty() {
            return Err(GeneratorError::invalid_parameter(
                "message must contain at least one block",
            ));
        }

        for block in &self.blocks {
            block.validate()?;
        }

        Ok(())
    }
}

/// Append-only conversation history. The orchestrator only ever pushes new
/// messages; existing turns are never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dialog {
    messages: Vec<Message>,
}

impl Dialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.messages.is_empty() {
            return Err(GeneratorError::empty_dialog(
                "dialog must contain at least one message",
            ));
        }

        for message in &self.messages {
            message.validate()?;
        }

        Ok(())
    }
}

impl From<Vec<Message>> for Dialog {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

impl IntoIterator for Dialog {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dialog {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

/// Standardized `{name, parameters}` pair carried in a tool-call block's
/// content as JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallInput {
    pub name: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl ToolCallInput {
    pub fn new(name: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, Map::new())
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    pub fn from_block(block: &Block) -> Result<Self, GeneratorError> {
        if block.kind != BlockKind::ToolCall {
            return Err(GeneratorError::invalid_parameter(
                "tool call input can only be decoded from a tool-call block",
            ));
        }

        let input: Self = serde_json::from_str(&block.content).map_err(|err| {
            GeneratorError::invalid_parameter(format!("unparseable tool call content: {err}"))
        })?;

        if input.name.trim().is_empty() {
            return Err(GeneratorError::invalid_parameter(
                "tool call is missing a tool name",
            ));
        }

        Ok(input)
    }

    pub fn to_content(&self) -> String {
        let mut object = Map::new();
        object.insert("name".to_string(), Value::String(self.name.clone()));
        object.insert(
            "parameters".to_string(),
            Value::Object(self.parameters.clone()),
        );
        Value::Object(object).to_string()
    }
}

/// Named capability with a declared parameter schema, carried as opaque
/// JSON text the way backend adapters expect it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: String,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: input_schema.into(),
        }
    }
}
