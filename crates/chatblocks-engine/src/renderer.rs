//! Per-block rendering dispatch.
//!
//! One block in, zero or more outbound messages out. The match over
//! [`Block`] is exhaustive; configuration tags nobody recognizes arrive as
//! `Block::Unknown` and produce a visible notice instead of aborting the
//! layout.

use chatblocks_core::block::{Block, ButtonBlock, ButtonItem, CallbackKind, MessageBlock};
use chatblocks_core::error::Result;
use chatblocks_core::session::SessionState;
use chatblocks_core::transport::InlineKeyboard;

use crate::catalog::CatalogEngine;
use crate::outbound::OutboundChannel;

/// Prompt used when a standalone button block has no description.
pub const DEFAULT_BUTTON_PROMPT: &str = "Choose an action:";

/// Builds one inline keyboard from button items.
///
/// `link` buttons become URL buttons; everything else carries
/// `<callbackType>|<data>`. A button marked `new_row` closes the current
/// row after itself.
pub fn build_keyboard(items: &[ButtonItem]) -> InlineKeyboard {
    let mut keyboard = InlineKeyboard::new();
    for item in items {
        keyboard = match item.callback_type {
            CallbackKind::Link => keyboard.url(
                item.text.clone(),
                item.url.clone().unwrap_or_default(),
            ),
            kind => keyboard.text(item.text.clone(), format!("{kind}|{}", item.data)),
        };
        if item.new_row {
            keyboard = keyboard.row();
        }
    }
    keyboard
}

/// Flattens the button-block instances embedded in a message block into a
/// single button list. Their descriptions are discarded in this context.
fn flatten_embedded_buttons(message: &MessageBlock) -> Vec<ButtonItem> {
    message
        .buttons
        .iter()
        .flat_map(|group| group.buttons.iter().cloned())
        .collect()
}

async fn render_message(
    message: &MessageBlock,
    session: &mut SessionState,
    channel: &OutboundChannel,
) -> Result<()> {
    let items = flatten_embedded_buttons(message);
    let keyboard = (!items.is_empty()).then(|| build_keyboard(&items));

    let message_id = match &message.media {
        Some(media) if !media.url.trim().is_empty() => {
            channel
                .send_photo(&media.url, &message.text, keyboard)
                .await?
        }
        _ => channel.send_text(&message.text, keyboard).await?,
    };
    session.track(message_id);
    Ok(())
}

async fn render_button_block(
    block: &ButtonBlock,
    session: &mut SessionState,
    channel: &OutboundChannel,
) -> Result<()> {
    if block.buttons.is_empty() {
        tracing::warn!("[BlockRenderer] button block without buttons");
        let message_id = channel
            .send_text("This button block is empty. Please configure its buttons.", None)
            .await?;
        session.track(message_id);
        return Ok(());
    }

    let description = block
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(DEFAULT_BUTTON_PROMPT);
    let keyboard = build_keyboard(&block.buttons);
    let message_id = channel.send_text(description, Some(keyboard)).await?;
    session.track(message_id);
    Ok(())
}

/// Renders a single block into the session's chat.
pub async fn render_block(
    block: &Block,
    session: &mut SessionState,
    channel: &OutboundChannel,
    catalog: &CatalogEngine,
) -> Result<()> {
    match block {
        Block::Message(message) => render_message(message, session, channel).await,
        Block::Button(button) => render_button_block(button, session, channel).await,
        Block::Command(command) => {
            // Commands are registered at bot setup, never rendered inline.
            tracing::debug!(
                "[BlockRenderer] skipping command block \"{}\" during layout render",
                command.command
            );
            Ok(())
        }
        Block::Catalog(catalog_block) => catalog.render_root(catalog_block, session, channel).await,
        Block::Layout(layout) => {
            // Nested layouts are invalid configuration; skip, do not recurse.
            tracing::debug!(
                "[BlockRenderer] skipping nested layout \"{}\"",
                layout.alias
            );
            Ok(())
        }
        Block::Unknown { block_type } => {
            tracing::error!("[BlockRenderer] unknown block type: {}", block_type);
            let message_id = channel
                .send_text(&format!("Unknown block type: {block_type}"), None)
                .await?;
            session.track(message_id);
            Ok(())
        }
    }
}
