//! Inbound event model.
//!
//! The platform binding translates its update types into these events
//! before handing them to the router; nothing platform-specific survives
//! past this point.

use chatblocks_core::client::ClientProfile;
use chatblocks_core::session::{ChatId, MessageId};

/// What kind of update arrived.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEventKind {
    /// A slash command, name given without the leading slash stripped.
    Command {
        name: String,
        /// The user's own command message, for cleanup.
        message_id: Option<MessageId>,
    },
    /// An inline-button press carrying an opaque payload.
    Callback { callback_id: String, data: String },
    /// Free-form text, which this engine ignores and removes.
    Text {
        text: String,
        message_id: Option<MessageId>,
    },
}

/// One inbound chat event.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub chat_id: ChatId,
    /// Sender profile as reported with the update.
    pub profile: ClientProfile,
    pub kind: InboundEventKind,
}

impl InboundEvent {
    pub fn command(chat_id: ChatId, name: impl Into<String>) -> Self {
        Self {
            chat_id,
            profile: ClientProfile::default(),
            kind: InboundEventKind::Command {
                name: name.into(),
                message_id: None,
            },
        }
    }

    pub fn callback(chat_id: ChatId, callback_id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            chat_id,
            profile: ClientProfile::default(),
            kind: InboundEventKind::Callback {
                callback_id: callback_id.into(),
                data: data.into(),
            },
        }
    }

    pub fn text(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            profile: ClientProfile::default(),
            kind: InboundEventKind::Text {
                text: text.into(),
                message_id: None,
            },
        }
    }

    pub fn with_profile(mut self, profile: ClientProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_message_id(mut self, id: MessageId) -> Self {
        match &mut self.kind {
            InboundEventKind::Command { message_id, .. }
            | InboundEventKind::Text { message_id, .. } => *message_id = Some(id),
            InboundEventKind::Callback { .. } => {}
        }
        self
    }
}
