//! In-memory client repository with visit-counting upsert.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use chatblocks_core::client::{Client, ClientProfile, ClientRepository, NEW_STATUS_ALIAS};
use chatblocks_core::session::ChatId;

const ANONYMOUS_USERNAME: &str = "anonymous_user";

#[derive(Default)]
pub struct MemoryClientRepository {
    clients: RwLock<HashMap<ChatId, Client>>,
}

impl MemoryClientRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a status alias the way the admin panel would. The bot never
    /// changes statuses itself.
    pub async fn set_status_alias(&self, chat_id: ChatId, alias: impl Into<String>) {
        if let Some(client) = self.clients.write().await.get_mut(&chat_id) {
            client.status_alias = alias.into();
        }
    }
}

#[async_trait]
impl ClientRepository for MemoryClientRepository {
    async fn upsert_visit(&self, chat_id: ChatId, profile: &ClientProfile) -> Result<Client> {
        let mut clients = self.clients.write().await;
        let client = match clients.get_mut(&chat_id) {
            Some(existing) => {
                existing.total_visits += 1;
                existing.last_visit = Utc::now();
                if let Some(first_name) = &profile.first_name {
                    existing.first_name = first_name.clone();
                }
                if let Some(last_name) = &profile.last_name {
                    existing.last_name = last_name.clone();
                }
                if let Some(username) = &profile.username {
                    existing.username = username.clone();
                }
                tracing::debug!(
                    "[MemoryClientRepository] visit {} for chat {}",
                    existing.total_visits,
                    chat_id
                );
                existing.clone()
            }
            None => {
                let client = Client {
                    id: Uuid::new_v4(),
                    chat_id,
                    first_name: profile.first_name.clone().unwrap_or_default(),
                    last_name: profile.last_name.clone().unwrap_or_default(),
                    username: profile
                        .username
                        .clone()
                        .unwrap_or_else(|| ANONYMOUS_USERNAME.to_string()),
                    total_visits: 1,
                    last_visit: Utc::now(),
                    status_alias: NEW_STATUS_ALIAS.to_string(),
                    enabled: true,
                };
                tracing::debug!("[MemoryClientRepository] new client for chat {}", chat_id);
                clients.insert(chat_id, client.clone());
                client
            }
        };

        // A banned client is also disabled, mirroring the admin bookkeeping.
        if client.is_banned() {
            if let Some(stored) = clients.get_mut(&chat_id) {
                stored.enabled = false;
            }
        }
        Ok(client)
    }

    async fn find_by_chat_id(&self, chat_id: ChatId) -> Result<Option<Client>> {
        Ok(self.clients.read().await.get(&chat_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatblocks_core::client::BANNED_STATUS_ALIAS;

    fn profile(first: &str, user: &str) -> ClientProfile {
        ClientProfile {
            first_name: Some(first.to_string()),
            last_name: None,
            username: Some(user.to_string()),
        }
    }

    #[tokio::test]
    async fn first_upsert_creates_with_single_visit() {
        let repo = MemoryClientRepository::new();
        let client = repo.upsert_visit(7, &profile("Ada", "ada")).await.unwrap();
        assert_eq!(client.total_visits, 1);
        assert_eq!(client.status_alias, NEW_STATUS_ALIAS);
        assert!(!client.is_banned());
    }

    #[tokio::test]
    async fn repeat_upserts_count_visits_and_refresh_profile() {
        let repo = MemoryClientRepository::new();
        repo.upsert_visit(7, &profile("Ada", "ada")).await.unwrap();
        let client = repo
            .upsert_visit(7, &profile("Ada L.", "ada_l"))
            .await
            .unwrap();
        assert_eq!(client.total_visits, 2);
        assert_eq!(client.first_name, "Ada L.");
        assert_eq!(client.username, "ada_l");
    }

    #[tokio::test]
    async fn missing_username_defaults_to_anonymous() {
        let repo = MemoryClientRepository::new();
        let client = repo
            .upsert_visit(7, &ClientProfile::default())
            .await
            .unwrap();
        assert_eq!(client.username, ANONYMOUS_USERNAME);
    }

    #[tokio::test]
    async fn admin_ban_disables_on_next_visit() {
        let repo = MemoryClientRepository::new();
        repo.upsert_visit(7, &ClientProfile::default()).await.unwrap();
        repo.set_status_alias(7, BANNED_STATUS_ALIAS).await;

        let client = repo.upsert_visit(7, &ClientProfile::default()).await.unwrap();
        assert!(client.is_banned());
        let stored = repo.find_by_chat_id(7).await.unwrap().unwrap();
        assert!(!stored.enabled);
    }
}
