//! Chat transport seam.
//!
//! The platform binding (what actually talks HTTP to a chat API) lives
//! outside this workspace; the engine only consumes this capability. Every
//! call is an I/O suspension point and every deletion/edit is fallible by
//! design: messages age out, get deleted by users, or were never sent.

use async_trait::async_trait;

use crate::error::Result;
use crate::session::{ChatId, MessageId};

/// What activating an inline button does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    /// Opaque callback payload delivered back to the bot.
    Callback(String),
    /// External URL opened client-side.
    Url(String),
}

/// One inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub action: ButtonAction,
}

/// Inline keyboard builder: buttons accumulate into the current row until
/// an explicit row break.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a callback button to the current row.
    pub fn text(mut self, label: impl Into<String>, data: impl Into<String>) -> Self {
        self.push(InlineButton {
            text: label.into(),
            action: ButtonAction::Callback(data.into()),
        });
        self
    }

    /// Appends a URL button to the current row.
    pub fn url(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.push(InlineButton {
            text: label.into(),
            action: ButtonAction::Url(url.into()),
        });
        self
    }

    /// Closes the current row; the next button starts a new one.
    pub fn row(mut self) -> Self {
        if self.rows.last().is_some_and(|row| !row.is_empty()) {
            self.rows.push(Vec::new());
        }
        self
    }

    fn push(&mut self, button: InlineButton) {
        match self.rows.last_mut() {
            Some(row) => row.push(button),
            None => self.rows.push(vec![button]),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.is_empty())
    }

    /// Finished rows, without a trailing empty row from a dangling break.
    pub fn rows(&self) -> impl Iterator<Item = &[InlineButton]> {
        self.rows
            .iter()
            .filter(|row| !row.is_empty())
            .map(|row| row.as_slice())
    }
}

/// Per-send options, identical for text and photo sends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendOptions {
    pub keyboard: Option<InlineKeyboard>,
    /// Forbids forwarding/saving on platforms that support it.
    pub protect_content: bool,
}

/// Capability consumed from the chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends a text message, returning the platform message ID.
    async fn send_text(&self, chat_id: ChatId, text: &str, options: &SendOptions)
    -> Result<MessageId>;

    /// Sends a photo with a caption.
    async fn send_photo(
        &self,
        chat_id: ChatId,
        url: &str,
        caption: &str,
        options: &SendOptions,
    ) -> Result<MessageId>;

    /// Deletes a message. Callers must treat failure as routine.
    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<()>;

    /// Strips the inline keyboard from a message. Fallible like deletion.
    async fn clear_message_keyboard(&self, chat_id: ChatId, message_id: MessageId) -> Result<()>;

    /// Acknowledges a callback query so the client stops its spinner.
    async fn answer_callback(&self, callback_id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_accumulate_in_rows() {
        let keyboard = InlineKeyboard::new()
            .text("A", "layout|a")
            .text("B", "layout|b")
            .row()
            .url("Site", "https://example.com");

        let rows: Vec<_> = keyboard.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[1].len(), 1);
        assert_eq!(
            rows[1][0].action,
            ButtonAction::Url("https://example.com".to_string())
        );
    }

    #[test]
    fn trailing_row_break_is_harmless() {
        let keyboard = InlineKeyboard::new().text("A", "x").row();
        assert_eq!(keyboard.rows().count(), 1);
        assert!(!keyboard.is_empty());
    }

    #[test]
    fn double_row_break_adds_nothing() {
        let keyboard = InlineKeyboard::new().text("A", "x").row().row().text("B", "y");
        let rows: Vec<_> = keyboard.rows().collect();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn empty_keyboard_reports_empty() {
        assert!(InlineKeyboard::new().is_empty());
        assert!(InlineKeyboard::new().row().is_empty());
    }
}
