//! Per-event dispatch: the boundary between the platform binding and the
//! rendering engines.
//!
//! Every entry point catches its own failures and converts them into a
//! single user-visible notice plus a log record; nothing propagates to the
//! platform's event loop. The ban gate runs once per event before any
//! rendering.

use std::sync::Arc;

use chatblocks_core::block::{BotInterface, CommandKind};
use chatblocks_core::callback::CallbackPayload;
use chatblocks_core::client::{ClientProfile, ClientRepository};
use chatblocks_core::error::Result;
use chatblocks_core::repository::CatalogRepository;
use chatblocks_core::session::{ChatId, MessageId, SessionState};
use chatblocks_core::transport::ChatTransport;
use chatblocks_engine::{
    CatalogConfig, CatalogEngine, LayoutEngine, NavigationStateMachine, OutboundChannel,
};

use crate::commands::CommandRegistry;
use crate::event::{InboundEvent, InboundEventKind};

const BAN_NOTICE: &str = "💀 Your account is locked! 💀 \n\n🚷 You've been banned.";
const MAX_COMMAND_LENGTH: usize = 100;

/// Characters never legitimate in a command name.
fn has_dangerous_chars(input: &str) -> bool {
    input
        .chars()
        .any(|c| matches!(c, '`' | '$' | ';' | '"' | '\'' | '\\'))
}

pub struct BotDispatcher {
    interface: Arc<BotInterface>,
    transport: Arc<dyn ChatTransport>,
    layout: Arc<LayoutEngine>,
    navigation: NavigationStateMachine,
    catalog: Arc<CatalogEngine>,
    clients: Arc<dyn ClientRepository>,
    commands: CommandRegistry,
    protect_content: bool,
}

impl BotDispatcher {
    pub fn new(
        interface: Arc<BotInterface>,
        transport: Arc<dyn ChatTransport>,
        catalog_repository: Arc<dyn CatalogRepository>,
        clients: Arc<dyn ClientRepository>,
        catalog_config: CatalogConfig,
        protect_content: bool,
    ) -> Self {
        let catalog = Arc::new(CatalogEngine::new(catalog_repository, catalog_config));
        let layout = Arc::new(LayoutEngine::new(catalog.clone()));
        let navigation = NavigationStateMachine::new(layout.clone());
        let commands = CommandRegistry::from_interface(&interface);
        Self {
            interface,
            transport,
            layout,
            navigation,
            catalog,
            clients,
            commands,
            protect_content,
        }
    }

    /// Creates the session for a chat, seeded with bot-level flags.
    pub fn new_session(&self, chat_id: ChatId) -> SessionState {
        let mut session = SessionState::new(chat_id);
        session.protect_content = self.protect_content;
        session
    }

    pub fn registered_commands(&self) -> &[String] {
        self.commands.allowed()
    }

    /// Handles one inbound event against one session.
    ///
    /// This is the outermost boundary: failures become a notice in the
    /// chat, and callbacks are always answered so the client's spinner
    /// stops.
    pub async fn handle_event(&self, session: &mut SessionState, event: &InboundEvent) {
        let channel = OutboundChannel::for_session(self.transport.clone(), session);

        if let Err(err) = self.dispatch(session, event, &channel).await {
            tracing::error!(
                "[BotDispatcher] event failed in chat {}: {}",
                session.chat_id,
                err
            );
            if let Ok(message_id) = channel.send_text(&err.user_notice(), None).await {
                session.track(message_id);
            }
        }

        if let InboundEventKind::Callback { callback_id, .. } = &event.kind {
            if let Err(err) = channel.answer_callback(callback_id).await {
                tracing::debug!("[BotDispatcher] answer callback failed: {}", err);
            }
        }
    }

    async fn dispatch(
        &self,
        session: &mut SessionState,
        event: &InboundEvent,
        channel: &OutboundChannel,
    ) -> Result<()> {
        if self.refresh_ban_flag(session).await? {
            let message_id = channel.send_text(BAN_NOTICE, None).await?;
            session.track(message_id);
            return Ok(());
        }

        match &event.kind {
            InboundEventKind::Command { name, message_id } => {
                self.handle_command(session, name, *message_id, &event.profile, channel)
                    .await
            }
            InboundEventKind::Callback { data, .. } => {
                self.handle_callback(session, data, channel).await
            }
            InboundEventKind::Text { message_id, .. } => {
                self.reject_message(
                    session,
                    *message_id,
                    "Plain messages are ignored. Use commands or the buttons.",
                    channel,
                )
                .await
            }
        }
    }

    /// The single authoritative ban check: session flag first, then the
    /// client repository, caching the result on the session.
    async fn refresh_ban_flag(&self, session: &mut SessionState) -> Result<bool> {
        if session.is_banned {
            return Ok(true);
        }
        if let Some(client) = self.clients.find_by_chat_id(session.chat_id).await? {
            if client.is_banned() {
                tracing::info!("[BotDispatcher] chat {} is banned", session.chat_id);
                session.is_banned = true;
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn reject_message(
        &self,
        session: &mut SessionState,
        message_id: Option<MessageId>,
        notice: &str,
        channel: &OutboundChannel,
    ) -> Result<()> {
        let sent = channel.send_text(notice, None).await?;
        session.track(sent);
        if let Some(message_id) = message_id {
            if let Err(err) = channel.delete_message(message_id).await {
                tracing::debug!("[BotDispatcher] could not delete rejected message: {}", err);
            }
        }
        Ok(())
    }

    async fn handle_command(
        &self,
        session: &mut SessionState,
        name: &str,
        message_id: Option<MessageId>,
        profile: &ClientProfile,
        channel: &OutboundChannel,
    ) -> Result<()> {
        let normalized = name.trim().trim_start_matches('/').to_string();

        if name.len() > MAX_COMMAND_LENGTH {
            return self
                .reject_message(session, message_id, "The command is too long.", channel)
                .await;
        }
        if has_dangerous_chars(name) {
            return self
                .reject_message(
                    session,
                    message_id,
                    "The message contains disallowed characters and was removed.",
                    channel,
                )
                .await;
        }
        if !self.commands.is_allowed(&normalized) {
            return self
                .reject_message(session, message_id, "Unknown command.", channel)
                .await;
        }

        if normalized == "start" {
            return self.handle_start(session, message_id, profile, channel).await;
        }
        self.invoke_command_block(session, &normalized, channel).await
    }

    async fn handle_start(
        &self,
        session: &mut SessionState,
        message_id: Option<MessageId>,
        profile: &ClientProfile,
        channel: &OutboundChannel,
    ) -> Result<()> {
        tracing::info!("[BotDispatcher] /start in chat {}", session.chat_id);

        // Replace the previous /start message with the new one.
        if let Some(previous) = session.start_message_id.take() {
            if let Err(err) = channel.delete_message(previous).await {
                tracing::debug!("[BotDispatcher] could not delete previous /start: {}", err);
            }
        }
        session.start_message_id = message_id;

        let client = self.clients.upsert_visit(session.chat_id, profile).await?;
        session.is_banned = client.is_banned();
        if session.is_banned {
            let sent = channel.send_text(BAN_NOTICE, None).await?;
            session.track(sent);
            return Ok(());
        }

        let alias = self.interface.start_layout_alias(client.total_visits);
        self.layout
            .resolve_and_render(session, &self.interface, alias, channel)
            .await
    }

    /// Runs a registered command block: reply with its response text, or
    /// open the layout named after the command.
    async fn invoke_command_block(
        &self,
        session: &mut SessionState,
        name: &str,
        channel: &OutboundChannel,
    ) -> Result<()> {
        let Some(block) = self.commands.block(name) else {
            let sent = channel
                .send_text(&format!("Unknown command: {name}"), None)
                .await?;
            session.track(sent);
            return Ok(());
        };

        match block.command_type {
            CommandKind::Command => {
                let response = block
                    .response_text
                    .as_deref()
                    .filter(|text| !text.trim().is_empty());
                if let Some(response) = response {
                    let sent = channel.send_text(response, None).await?;
                    session.track(sent);
                } else {
                    tracing::debug!("[BotDispatcher] command \"{}\" has no response text", name);
                }
                Ok(())
            }
            CommandKind::OpenLayout => {
                self.layout
                    .resolve_and_render(session, &self.interface, name, channel)
                    .await
            }
        }
    }

    async fn handle_callback(
        &self,
        session: &mut SessionState,
        data: &str,
        channel: &OutboundChannel,
    ) -> Result<()> {
        let payload: CallbackPayload = match data.parse() {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!("[BotDispatcher] bad callback \"{}\": {}", data, err);
                let sent = channel.send_text("Unknown callback.", None).await?;
                session.track(sent);
                return Ok(());
            }
        };

        match payload {
            CallbackPayload::Layout { alias } => {
                self.layout
                    .resolve_and_render(session, &self.interface, &alias, channel)
                    .await
            }
            CallbackPayload::GoBack => {
                self.navigation
                    .go_back(session, &self.interface, channel)
                    .await
            }
            CallbackPayload::Message { text } => {
                let sent = channel.send_text(&text, None).await?;
                session.track(sent);
                Ok(())
            }
            CallbackPayload::Command { name } => {
                self.invoke_command_block(session, &name, channel).await
            }
            CallbackPayload::CatalogCategory {
                category_id,
                items_per_page,
            } => {
                self.catalog
                    .open_category(category_id, items_per_page, session, channel)
                    .await
            }
            CallbackPayload::CatalogLoadMore {
                category_id,
                page,
                items_per_page,
            }
            | CallbackPayload::CatalogBackPage {
                category_id,
                page,
                items_per_page,
            } => {
                self.catalog
                    .turn_page(category_id, page, items_per_page, session, channel)
                    .await
            }
            CallbackPayload::ProductDetails { product_id } => {
                self.catalog
                    .render_product_details(product_id, session, channel)
                    .await
            }
            CallbackPayload::Order { product_id } => {
                self.catalog
                    .acknowledge_order(product_id, session, channel)
                    .await
            }
            CallbackPayload::AddToCart { product_id } => {
                self.catalog
                    .acknowledge_add_to_cart(product_id, session, channel)
                    .await
            }
        }
    }
}
