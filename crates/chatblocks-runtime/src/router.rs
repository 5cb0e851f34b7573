//! Per-chat event serialization.
//!
//! Session state is unsynchronized by design: each chat gets exactly one
//! worker task that owns its `SessionState` and drains its queue in
//! arrival order. Two rapid taps from the same chat can therefore never
//! interleave, while independent chats proceed concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use chatblocks_core::session::ChatId;

use crate::dispatcher::BotDispatcher;
use crate::event::InboundEvent;

pub struct ChatRouter {
    dispatcher: Arc<BotDispatcher>,
    workers: Mutex<HashMap<ChatId, mpsc::UnboundedSender<InboundEvent>>>,
}

impl ChatRouter {
    pub fn new(dispatcher: Arc<BotDispatcher>) -> Self {
        Self {
            dispatcher,
            workers: Mutex::new(HashMap::new()),
        }
    }

    fn spawn_worker(&self, chat_id: ChatId) -> mpsc::UnboundedSender<InboundEvent> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<InboundEvent>();
        let dispatcher = self.dispatcher.clone();
        tokio::spawn(async move {
            tracing::debug!("[ChatRouter] worker started for chat {}", chat_id);
            let mut session = dispatcher.new_session(chat_id);
            while let Some(event) = receiver.recv().await {
                dispatcher.handle_event(&mut session, &event).await;
            }
            tracing::debug!("[ChatRouter] worker stopped for chat {}", chat_id);
        });
        sender
    }

    /// Enqueues an event for its chat's worker, spawning the worker on
    /// first contact (or again if a previous one has shut down).
    pub async fn submit(&self, event: InboundEvent) {
        let chat_id = event.chat_id;
        let mut workers = self.workers.lock().await;

        let sender = workers
            .entry(chat_id)
            .or_insert_with(|| self.spawn_worker(chat_id));
        if let Err(mpsc::error::SendError(event)) = sender.send(event) {
            let sender = self.spawn_worker(chat_id);
            let _ = sender.send(event);
            workers.insert(chat_id, sender);
        }
    }

    /// Number of chats with a live worker.
    pub async fn active_chats(&self) -> usize {
        self.workers.lock().await.len()
    }
}
