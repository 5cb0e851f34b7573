//! Back-navigation state machine.

use std::sync::Arc;

use chatblocks_core::block::BotInterface;
use chatblocks_core::error::Result;
use chatblocks_core::session::{PopOutcome, SessionState};

use crate::layout::LayoutEngine;
use crate::lifecycle;
use crate::outbound::OutboundChannel;

pub struct NavigationStateMachine {
    layout: Arc<LayoutEngine>,
}

impl NavigationStateMachine {
    pub fn new(layout: Arc<LayoutEngine>) -> Self {
        Self { layout }
    }

    /// Returns the session to the previously visited layout.
    ///
    /// The current screen is cleared, one entry is popped (falling back to
    /// the current layout when the stack is empty), and the target is
    /// re-rendered WITHOUT pushing a new stack entry. The pop happens at
    /// most once: a failed re-render is reported but never retried and the
    /// popped entry is not restored.
    pub async fn go_back(
        &self,
        session: &mut SessionState,
        interface: &BotInterface,
        channel: &OutboundChannel,
    ) -> Result<()> {
        lifecycle::clear_screen(session, channel).await;

        let layout = match session.pop_for_back() {
            PopOutcome::Previous(layout) => layout,
            PopOutcome::Current(layout) => {
                tracing::debug!("[Navigation] stack empty, re-rendering current layout");
                layout
            }
            PopOutcome::Nothing => {
                let message_id = channel.send_text("No previous state.", None).await?;
                session.track(message_id);
                return Ok(());
            }
        };

        // Re-resolve by alias so a reconfigured interface wins over the
        // stale copy kept in the stack.
        let target = interface.find_layout(&layout.alias).cloned().unwrap_or(layout);

        if let Err(err) = self.layout.render_layout(&target, session, channel).await {
            tracing::error!(
                "[Navigation] go-back re-render of \"{}\" failed: {}",
                target.alias,
                err
            );
            let message_id = channel
                .send_text("Could not return to the previous state.", None)
                .await?;
            session.track(message_id);
        } else {
            tracing::info!("[Navigation] returned to layout \"{}\"", target.alias);
        }
        Ok(())
    }
}
