//! Screen message lifecycle: track, then bulk-delete on transition.
//!
//! Platform delete/edit calls are not idempotent and not always permitted
//! (message too old, already deleted), so every attempt is independently
//! best-effort: one stale ID must never block cleanup of the rest. The
//! tracked lists are always reset, even after partial failure.

use chatblocks_core::session::{MessageId, SessionState};

use crate::outbound::OutboundChannel;

async fn delete_best_effort(channel: &OutboundChannel, message_ids: &[MessageId]) {
    for &message_id in message_ids {
        if let Err(err) = channel.clear_message_keyboard(message_id).await {
            tracing::debug!(
                "[MessageLifecycle] clear keyboard failed for {}: {}",
                message_id,
                err
            );
        }
        if let Err(err) = channel.delete_message(message_id).await {
            tracing::debug!("[MessageLifecycle] delete failed for {}: {}", message_id, err);
        }
    }
}

/// Deletes every message of the current screen and resets all tracking.
pub async fn clear_screen(session: &mut SessionState, channel: &OutboundChannel) {
    let message_ids = session.take_screen_messages();
    if message_ids.is_empty() {
        return;
    }
    tracing::debug!(
        "[MessageLifecycle] clearing screen: {} message(s) in chat {}",
        message_ids.len(),
        session.chat_id
    );
    delete_best_effort(channel, &message_ids).await;
}

/// Deletes only the page-scoped catalog messages, keeping the category
/// banner and subcategory menu on screen.
pub async fn clear_page_group(session: &mut SessionState, channel: &OutboundChannel) {
    let message_ids = session.take_page_messages();
    if message_ids.is_empty() {
        return;
    }
    tracing::debug!(
        "[MessageLifecycle] clearing page group: {} message(s) in chat {}",
        message_ids.len(),
        session.chat_id
    );
    for &message_id in &message_ids {
        if let Err(err) = channel.delete_message(message_id).await {
            tracing::debug!("[MessageLifecycle] delete failed for {}: {}", message_id, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chatblocks_core::error::{ChatBlocksError, Result};
    use chatblocks_core::session::ChatId;
    use chatblocks_core::transport::{ChatTransport, SendOptions};
    use std::sync::{Arc, Mutex};

    /// Transport that fails deletion for one poisoned message ID.
    struct FlakyTransport {
        poisoned: MessageId,
        deleted: Mutex<Vec<MessageId>>,
    }

    #[async_trait]
    impl ChatTransport for FlakyTransport {
        async fn send_text(
            &self,
            _chat_id: ChatId,
            _text: &str,
            _options: &SendOptions,
        ) -> Result<MessageId> {
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

        async fn delete_message(&self, _chat_id: ChatId, message_id: MessageId) -> Result<()> {
            if message_id == self.poisoned {
                return Err(ChatBlocksError::transport("message is too old"));
            }
            self.deleted.lock().unwrap().push(message_id);
            Ok(())
        }

        async fn clear_message_keyboard(
            &self,
            _chat_id: ChatId,
            _message_id: MessageId,
        ) -> Result<()> {
            Err(ChatBlocksError::transport("no markup"))
        }

        async fn answer_callback(&self, _callback_id: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn one_failed_delete_does_not_stop_the_rest() {
        let transport = Arc::new(FlakyTransport {
            poisoned: 2,
            deleted: Mutex::new(Vec::new()),
        });
        let channel = OutboundChannel::new(transport.clone(), 1, false);

        let mut session = SessionState::new(1);
        session.track(1);
        session.track(2);
        session.track(3);

        clear_screen(&mut session, &channel).await;

        assert_eq!(*transport.deleted.lock().unwrap(), vec![1, 3]);
        assert!(session.screen_message_ids().is_empty());
    }

    #[tokio::test]
    async fn page_group_clear_leaves_screen_tracking_alone() {
        let transport = Arc::new(FlakyTransport {
            poisoned: 0,
            deleted: Mutex::new(Vec::new()),
        });
        let channel = OutboundChannel::new(transport.clone(), 1, false);

        let mut session = SessionState::new(1);
        session.track(10);
        session.track_category_layout(10);
        session.track(11);
        session.track_category_page(11);

        clear_page_group(&mut session, &channel).await;

        assert_eq!(*transport.deleted.lock().unwrap(), vec![11]);
        assert_eq!(session.screen_message_ids(), &[10, 11]);
        assert!(session.category_page_message_ids().is_empty());
    }
}
