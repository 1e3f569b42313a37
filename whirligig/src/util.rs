//! Small convenience constructors for common types.

use wgenerate::{Dialog, Message};

pub fn user_message(content: impl Into<String>) -> Message {
    Message::user(content)
}

pub fn assistant_message(content: impl Into<String>) -> Message {
    Message::assistant(content)
}

pub fn tool_result_message(
    call_id: impl Into<String>,
    content: impl Into<String>,
) -> Message {
    Message::tool_result(call_id, content)
}

pub fn dialog_from(messages: impl IntoIterator<Item = Message>) -> Dialog {
    Dialog::from(messages.into_iter().collect::<Vec<_>>())
}
