//! Instance-owned mapping from tool name to definition and callback.
//!
//! ```rust
//! use wgenerate::ToolDefinition;
//! use wtooling::ToolSet;
//!
//! let mut tools = ToolSet::new();
//! tools
//!     .register_text_fn(
//!         ToolDefinition::new("echo", "Echoes text", r#"{"type":"object"}"#),
//!         |_arguments| Ok("echoed".to_string()),
//!     )
//!     .expect("registration should succeed");
//!
//! assert!(tools.contains("echo"));
//! ```

use std::future::Future;
use std::sync::Arc;

use wcommon::Registry;
use wgenerate::{Message, ToolChoice, ToolDefinition};

use crate::{FunctionCallback, ToolArguments, ToolCallback, ToolError};

/// One registered tool. A `None` callback marks a terminal/manual tool: the
/// orchestration loop stops and hands control back to the caller instead of
/// auto-executing it.
pub struct ToolEntry {
    pub definition: ToolDefinition,
    pub callback: Option<Arc<dyn ToolCallback>>,
}

impl ToolEntry {
    pub fn is_manual(&self) -> bool {
        self.callback.is_none()
    }
}

/// Name-keyed tool collection owned by one orchestrated run. Registration
/// rejects duplicate names and the reserved tool-choice names.
#[derive(Default)]
pub struct ToolSet {
    entries: Registry<String, ToolEntry>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        definition: ToolDefinition,
        callback: Arc<dyn ToolCallback>,
    ) -> Result<(), ToolError> {
        self.insert(definition, Some(callback))
    }

    /// Registers a terminal/manual tool with no callback.
    pub fn register_manual(&mut self, definition: ToolDefinition) -> Result<(), ToolError> {
        self.insert(definition, None)
    }

    pub fn register_fn<F, Fut>(
        &mut self,
        definition: ToolDefinition,
        handler: F,
    ) -> Result<(), ToolError>
    where
        F: Fn(ToolArguments, wgenerate::CallContext, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Message, ToolError>> + Send + 'static,
    {
        self.register(definition, Arc::new(FunctionCallback::new(handler)))
    }

    pub fn register_text_fn<F>(
        &mut self,
        definition: ToolDefinition,
        handler: F,
    ) -> Result<(), ToolError>
    where
        F: Fn(&ToolArguments) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        self.register(definition, Arc::new(FunctionCallback::text(handler)))
    }

    fn insert(
        &mut self,
        definition: ToolDefinition,
        callback: Option<Arc<dyn ToolCallback>>,
    ) -> Result<(), ToolError> {
        let name = definition.name.clone();
        if name.trim().is_empty() {
            return Err(ToolError::registration("tool name must not be empty"));
        }

        if ToolChoice::is_reserved_name(&name) {
            return Err(
                ToolError::registration(format!("'{name}' is a reserved tool name"))
                    .with_tool_name(name),
            );
        }

        if self.entries.contains_key(&name) {
            return Err(
                ToolError::registration(format!("tool '{name}' is already registered"))
                    .with_tool_name(name),
            );
        }

        self.entries.insert(
            name,
            ToolEntry {
                definition,
                callback,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ToolEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.entries
            .values()
            .map(|entry| entry.definition.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
