//! Per-chat session state.
//!
//! A session owns everything the engine mutates while a chat is alive: the
//! message IDs of the current screen, the back-navigation stack, and the
//! flags computed once per inbound event. Sessions are exclusively owned by
//! one chat; the runtime serializes event handling per chat ID, so no
//! internal locking happens here.

use serde::{Deserialize, Serialize};

use crate::block::{DisplayMode, LayoutBlock};

/// Platform chat identifier.
pub type ChatId = i64;

/// Platform message identifier.
pub type MessageId = i64;

/// Outcome of a back-navigation pop.
///
/// Back navigation is a three-way machine: the stack had a previous layout,
/// the stack was empty but a current layout exists (degenerate no-op back),
/// or there is nothing to return to at all.
#[derive(Debug, Clone, PartialEq)]
pub enum PopOutcome {
    /// A previous layout was popped; it is now the current state.
    Previous(LayoutBlock),
    /// Stack empty; the current layout is re-rendered instead.
    Current(LayoutBlock),
    /// Neither stack nor current state exist.
    Nothing,
}

/// Mutable state for one chat session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub chat_id: ChatId,
    /// Messages belonging to the current screen, cleared on transition.
    previous_message_ids: Vec<MessageId>,
    /// History for "go back": push on forward navigation, pop on back.
    state_stack: Vec<LayoutBlock>,
    /// The layout currently displayed.
    current_state: Option<LayoutBlock>,
    /// Ban gate, computed once at event entry.
    pub is_banned: bool,
    /// Bot-level content-protection flag, applied to every send.
    pub protect_content: bool,
    /// Category banner + subcategory menu messages, kept across page turns.
    category_layout_messages: Vec<MessageId>,
    /// Product/page messages, deleted when paginating within a category.
    category_page_messages: Vec<MessageId>,
    /// The last `/start` message, deleted when the command repeats.
    pub start_message_id: Option<MessageId>,
    /// Display mode of the catalog block that opened the current catalog,
    /// applied when a category callback arrives later.
    #[serde(default)]
    pub catalog_display_mode: DisplayMode,
}

impl SessionState {
    pub fn new(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            ..Default::default()
        }
    }

    // --- message tracking ---

    /// Appends a message to the current screen. No-op for non-positive IDs.
    pub fn track(&mut self, message_id: MessageId) {
        if message_id > 0 {
            self.previous_message_ids.push(message_id);
        }
    }

    /// Additionally tracks a message in the category banner/menu group.
    pub fn track_category_layout(&mut self, message_id: MessageId) {
        if message_id > 0 {
            self.category_layout_messages.push(message_id);
        }
    }

    /// Additionally tracks a message in the page-scoped group.
    pub fn track_category_page(&mut self, message_id: MessageId) {
        if message_id > 0 {
            self.category_page_messages.push(message_id);
        }
    }

    /// Drains every screen-tracked message for bulk deletion. Category
    /// groups are reset as well since the whole screen is going away.
    pub fn take_screen_messages(&mut self) -> Vec<MessageId> {
        self.category_layout_messages.clear();
        self.category_page_messages.clear();
        std::mem::take(&mut self.previous_message_ids)
    }

    /// Drains only the page-scoped group, leaving the category banner and
    /// subcategory menu on screen.
    pub fn take_page_messages(&mut self) -> Vec<MessageId> {
        std::mem::take(&mut self.category_page_messages)
    }

    /// Resets both category groups without touching the screen list.
    pub fn reset_category_groups(&mut self) {
        self.category_layout_messages.clear();
        self.category_page_messages.clear();
    }

    pub fn screen_message_ids(&self) -> &[MessageId] {
        &self.previous_message_ids
    }

    pub fn category_page_message_ids(&self) -> &[MessageId] {
        &self.category_page_messages
    }

    // --- navigation ---

    /// Records a forward transition to `layout`.
    ///
    /// The sole forward-navigation invariant: every switch to a different
    /// alias grows the back-stack by exactly one (the first transition from
    /// an empty session pushes nothing).
    pub fn enter_layout(&mut self, layout: LayoutBlock) {
        match self.current_state.take() {
            Some(current) if current.alias != layout.alias => self.state_stack.push(current),
            _ => {}
        }
        self.current_state = Some(layout);
    }

    /// Pops one entry for back-navigation, falling back to the current
    /// layout when the stack is empty. The pop happens at most once; a
    /// failed re-render afterwards must not restore the entry.
    pub fn pop_for_back(&mut self) -> PopOutcome {
        match self.state_stack.pop() {
            Some(previous) => {
                self.current_state = Some(previous.clone());
                PopOutcome::Previous(previous)
            }
            None => match &self.current_state {
                Some(current) => PopOutcome::Current(current.clone()),
                None => PopOutcome::Nothing,
            },
        }
    }

    pub fn current_state(&self) -> Option<&LayoutBlock> {
        self.current_state.as_ref()
    }

    pub fn stack_depth(&self) -> usize {
        self.state_stack.len()
    }
}
