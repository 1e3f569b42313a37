//! Argument extraction helpers for tool callbacks.
//!
//! ```rust
//! use wtooling::{ToolArguments, required_string};
//!
//! let args: ToolArguments =
//!     serde_json::from_str(r#"{"query":"rust"}"#).expect("object should parse");
//! let query = required_string(&args, "query").expect("query should be present");
//! assert_eq!(query, "rust");
//! ```

use serde_json::Value;

use crate::{ToolArguments, ToolError};

pub fn required_string(args: &ToolArguments, key: &str) -> Result<String, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required string: '{key}'")))
}

pub fn required_f64(args: &ToolArguments, key: &str) -> Result<f64, ToolError> {
    args.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required number: '{key}'")))
}

pub fn optional_string(args: &ToolArguments, key: &str) -> Option<String> {
    args.get(key).and_then(Value::as_str).map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolErrorKind;

    fn args(json: &str) -> ToolArguments {
        serde_json::from_str(json).expect("arguments should parse")
    }

    #[test]
    fn extracts_required_values() {
        let args = args(r#"{"query":"rust","count":3}"#);

        assert_eq!(required_string(&args, "query").expect("query"), "rust");
        assert_eq!(required_f64(&args, "count").expect("count"), 3.0);
        assert_eq!(optional_string(&args, "missing"), None);
    }

    #[test]
    fn missing_required_values_report_invalid_arguments() {
        let args = args("{}");

        let error = required_string(&args, "query").expect_err("missing key should fail");
        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);
        assert!(error.message.contains("query"));
    }
}
