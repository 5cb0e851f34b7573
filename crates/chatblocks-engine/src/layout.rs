//! Layout resolution and rendering.
//!
//! The forward-navigation invariant lives here and only here: every switch
//! to a different layout alias grows the back-stack by exactly one.

use std::sync::Arc;

use chatblocks_core::block::{Block, BotInterface, LayoutBlock};
use chatblocks_core::error::Result;
use chatblocks_core::session::SessionState;

use crate::catalog::CatalogEngine;
use crate::lifecycle;
use crate::outbound::OutboundChannel;
use crate::renderer;

pub struct LayoutEngine {
    catalog: Arc<CatalogEngine>,
}

impl LayoutEngine {
    pub fn new(catalog: Arc<CatalogEngine>) -> Self {
        Self { catalog }
    }

    /// Resolves `alias` in the interface and renders it as a forward
    /// navigation.
    ///
    /// Unresolved aliases produce a single notice and leave the session
    /// untouched; a resolved layout becomes the current state, pushing the
    /// previous one onto the back-stack unless it is the same layout.
    pub async fn resolve_and_render(
        &self,
        session: &mut SessionState,
        interface: &BotInterface,
        alias: &str,
        channel: &OutboundChannel,
    ) -> Result<()> {
        tracing::debug!("[LayoutEngine] resolving layout alias \"{}\"", alias);

        let Some(layout) = interface.find_layout(alias) else {
            tracing::warn!("[LayoutEngine] layout \"{}\" not found", alias);
            let message_id = channel
                .send_text(
                    &format!("Layout \"{alias}\" was not found. Please add its blocks."),
                    None,
                )
                .await?;
            session.track(message_id);
            return Ok(());
        };

        let layout = layout.clone();
        session.enter_layout(layout.clone());
        self.render_layout(&layout, session, channel).await
    }

    /// Renders a layout's blocks without touching the navigation stack.
    ///
    /// Used both by forward navigation (after the stack update) and by
    /// back-navigation re-renders, which must not push.
    pub async fn render_layout(
        &self,
        layout: &LayoutBlock,
        session: &mut SessionState,
        channel: &OutboundChannel,
    ) -> Result<()> {
        if layout.clear_previous_messages {
            tracing::debug!(
                "[LayoutEngine] clearing previous screen before \"{}\"",
                layout.name
            );
            lifecycle::clear_screen(session, channel).await;
        }

        if layout.blocks.is_empty() {
            let message_id = channel
                .send_text(
                    &format!("Layout \"{}\" is empty. Please add its blocks.", layout.name),
                    None,
                )
                .await?;
            session.track(message_id);
            return Ok(());
        }

        for block in &layout.blocks {
            if matches!(block, Block::Layout(_)) {
                tracing::debug!(
                    "[LayoutEngine] skipping nested layout inside \"{}\"",
                    layout.alias
                );
                continue;
            }
            if let Err(err) = renderer::render_block(block, session, channel, &self.catalog).await {
                // Per-block isolation: report, keep rendering the rest.
                tracing::error!(
                    "[LayoutEngine] block failed in layout \"{}\": {}",
                    layout.name,
                    err
                );
                let notice = format!(
                    "An error occurred while processing a block in \"{}\".",
                    layout.name
                );
                if let Ok(message_id) = channel.send_text(&notice, None).await {
                    session.track(message_id);
                }
            }
        }
        Ok(())
    }
}
