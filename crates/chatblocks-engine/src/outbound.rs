//! Per-session outbound channel.
//!
//! Content protection is a bot-level setting that must reach every single
//! send call. Instead of threading the flag through each renderer, the
//! channel is constructed once per session and injects it uniformly; the
//! renderers never see the flag.

use std::sync::Arc;

use chatblocks_core::error::Result;
use chatblocks_core::session::{ChatId, MessageId, SessionState};
use chatblocks_core::transport::{ChatTransport, InlineKeyboard, SendOptions};

/// Sends to one chat, with the session's content-protection flag applied
/// to every message.
#[derive(Clone)]
pub struct OutboundChannel {
    transport: Arc<dyn ChatTransport>,
    chat_id: ChatId,
    protect_content: bool,
}

impl OutboundChannel {
    pub fn new(transport: Arc<dyn ChatTransport>, chat_id: ChatId, protect_content: bool) -> Self {
        Self {
            transport,
            chat_id,
            protect_content,
        }
    }

    /// Builds the channel for a session, copying its protection flag.
    pub fn for_session(transport: Arc<dyn ChatTransport>, session: &SessionState) -> Self {
        Self::new(transport, session.chat_id, session.protect_content)
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    fn options(&self, keyboard: Option<InlineKeyboard>) -> SendOptions {
        SendOptions {
            keyboard: keyboard.filter(|k| !k.is_empty()),
            protect_content: self.protect_content,
        }
    }

    pub async fn send_text(
        &self,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageId> {
        self.transport
            .send_text(self.chat_id, text, &self.options(keyboard))
            .await
    }

    pub async fn send_photo(
        &self,
        url: &str,
        caption: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageId> {
        self.transport
            .send_photo(self.chat_id, url, caption, &self.options(keyboard))
            .await
    }

    pub async fn delete_message(&self, message_id: MessageId) -> Result<()> {
        self.transport.delete_message(self.chat_id, message_id).await
    }

    pub async fn clear_message_keyboard(&self, message_id: MessageId) -> Result<()> {
        self.transport
            .clear_message_keyboard(self.chat_id, message_id)
            .await
    }

    pub async fn answer_callback(&self, callback_id: &str) -> Result<()> {
        self.transport.answer_callback(callback_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FlagRecorder {
        flags: Mutex<Vec<bool>>,
    }

    #[async_trait]
    impl ChatTransport for FlagRecorder {
        async fn send_text(
            &self,
            _chat_id: ChatId,
            _text: &str,
            options: &SendOptions,
        ) -> Result<MessageId> {
            self.flags.lock().unwrap().push(options.protect_content);
            Ok(1)
        }

        async fn send_photo(
            &self,
            _chat_id: ChatId,
            _url: &str,
            _caption: &str,
            options: &SendOptions,
        ) -> Result<MessageId> {
            self.flags.lock().unwrap().push(options.protect_content);
            Ok(2)
        }

        async fn delete_message(&self, _chat_id: ChatId, _message_id: MessageId) -> Result<()> {
            Ok(())
        }

        async fn clear_message_keyboard(
            &self,
            _chat_id: ChatId,
            _message_id: MessageId,
        ) -> Result<()> {
            Ok(())
        }

        async fn answer_callback(&self, _callback_id: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn protection_flag_reaches_every_send() {
        let recorder = Arc::new(FlagRecorder::default());
        let channel = OutboundChannel::new(recorder.clone(), 10, true);
        channel.send_text("a", None).await.unwrap();
        channel.send_photo("http://x/p.png", "b", None).await.unwrap();
        assert_eq!(*recorder.flags.lock().unwrap(), vec![true, true]);
    }

    #[tokio::test]
    async fn empty_keyboard_is_not_attached() {
        struct AssertNoKeyboard;

        #[async_trait]
        impl ChatTransport for AssertNoKeyboard {
            async fn send_text(
                &self,
                _chat_id: ChatId,
                _text: &str,
                options: &SendOptions,
            ) -> Result<MessageId> {
                assert!(options.keyboard.is_none());
                Ok(1)
            }

            async fn send_photo(
                &self,
                _chat_id: ChatId,
                _url: &str,
                _caption: &str,
                _options: &SendOptions,
            ) -> Result<MessageId> {
                Ok(2)
            }

            async fn delete_message(&self, _c: ChatId, _m: MessageId) -> Result<()> {
                Ok(())
            }

            async fn clear_message_keyboard(&self, _c: ChatId, _m: MessageId) -> Result<()> {
                Ok(())
            }

            async fn answer_callback(&self, _id: &str) -> Result<()> {
                Ok(())
            }
        }

        let channel = OutboundChannel::new(Arc::new(AssertNoKeyboard), 10, false);
        channel
            .send_text("a", Some(InlineKeyboard::new()))
            .await
            .unwrap();
    }
}
