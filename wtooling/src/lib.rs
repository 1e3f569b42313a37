//! Capability layer for registering and executing tool callbacks.

mod args;
mod callback;
mod error;
mod toolset;

pub mod prelude {
    pub use crate::{
        FunctionCallback, ToolArguments, ToolCallback, ToolEntry, ToolError, ToolErrorKind,
        ToolFuture, ToolSet,
    };
}

pub use args::{optional_string, required_f64, required_string};
pub use callback::{FunctionCallback, ToolArguments, ToolCallback, ToolFuture};
pub use error::{ToolError, ToolErrorKind};
pub use toolset::{ToolEntry, ToolSet};
