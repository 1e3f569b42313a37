/// Creates a single conversation [`Message`](crate::Message) from a role
/// shorthand.
///
/// ```rust
/// use whirligig::{Role, wg_msg};
///
/// let message = wg_msg!(assistant => "Done.");
/// assert_eq!(message.role, Role::Assistant);
/// assert_eq!(message.text(), "Done.");
/// ```
#[macro_export]
macro_rules! wg_msg {
    (user => $content:expr $(,)?) => {
        $crate::Message::user($content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::Message::assistant($content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use user or assistant")
    };
}

/// Creates a [`Dialog`](crate::Dialog) from role/content pairs.
///
/// ```rust
/// use whirligig::{Role, wg_dialog};
///
/// let dialog = wg_dialog![
///     user => "What is 2+2?",
///     assistant => "4",
/// ];
///
/// assert_eq!(dialog.len(), 2);
/// assert_eq!(dialog.messages()[0].role, Role::User);
/// ```
#[macro_export]
macro_rules! wg_dialog {
    () => {
        $crate::Dialog::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        $crate::Dialog::from(vec![$($crate::wg_msg!($role => $content)),+])
    };
}
