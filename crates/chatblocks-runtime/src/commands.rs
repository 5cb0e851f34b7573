//! Command registry: the static allowlist built once at bot setup.

use std::collections::HashMap;

use chatblocks_core::block::{BotInterface, CommandBlock};

/// Commands the bot accepts, with their backing blocks.
///
/// Names are stored without the leading slash. `start` is always allowed
/// even without a block; its behavior is wired into the dispatcher.
pub struct CommandRegistry {
    allowed: Vec<String>,
    blocks: HashMap<String, CommandBlock>,
}

impl CommandRegistry {
    pub fn from_interface(interface: &BotInterface) -> Self {
        let allowed = interface.allowed_commands();
        let blocks = interface
            .command_blocks()
            .map(|block| (block.normalized_name().to_string(), block.clone()))
            .collect();
        Self { allowed, blocks }
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.allowed.iter().any(|allowed| allowed == name)
    }

    pub fn block(&self, name: &str) -> Option<&CommandBlock> {
        self.blocks.get(name)
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }
}
