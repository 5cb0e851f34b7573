//! Client bookkeeping: who is talking to the bot, and may they.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::ChatId;

/// Status alias that blocks a client from interacting with the bot.
pub const BANNED_STATUS_ALIAS: &str = "banned";

/// Status alias assigned to clients that were never classified.
pub const NEW_STATUS_ALIAS: &str = "new";

/// Profile fields the platform reports with each update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

/// A known chat participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub chat_id: ChatId,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    /// Lifetime visit count; 1 means this is the first interaction.
    pub total_visits: u64,
    pub last_visit: DateTime<Utc>,
    /// Status alias assigned through the admin panel, never by the bot.
    pub status_alias: String,
    pub enabled: bool,
}

impl Client {
    /// The single authoritative ban predicate; evaluated once per inbound
    /// event before any rendering.
    pub fn is_banned(&self) -> bool {
        self.status_alias == BANNED_STATUS_ALIAS
    }
}

/// Persistence for clients.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Finds or creates the client for `chat_id`, refreshes profile fields,
    /// bumps the visit counter, and stamps the visit time.
    ///
    /// A freshly created client has `total_visits == 1`.
    async fn upsert_visit(&self, chat_id: ChatId, profile: &ClientProfile) -> Result<Client>;

    async fn find_by_chat_id(&self, chat_id: ChatId) -> Result<Option<Client>>;
}
