//! Bot interface: the root block tree plus its start-layout defaults.

use serde::{Deserialize, Serialize};

use super::model::{Block, CommandBlock, LayoutBlock};
use crate::error::{ChatBlocksError, Result};

fn default_start_layout() -> String {
    "start".to_string()
}

fn default_first_visit_layout() -> String {
    "start_first_visit".to_string()
}

/// Root configuration consumed by the engine, read-only at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotInterface {
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default = "default_start_layout", alias = "defaultStartLayoutAlias")]
    pub default_start_layout: String,
    #[serde(
        default = "default_first_visit_layout",
        alias = "defaultFirstVisitLayoutAlias"
    )]
    pub default_first_visit_layout: String,
}

impl Default for BotInterface {
    fn default() -> Self {
        Self {
            blocks: Vec::new(),
            default_start_layout: default_start_layout(),
            default_first_visit_layout: default_first_visit_layout(),
        }
    }
}

impl BotInterface {
    /// Finds a top-level layout by alias. Nested layouts are invalid and
    /// never resolved.
    pub fn find_layout(&self, alias: &str) -> Option<&LayoutBlock> {
        self.blocks.iter().find_map(|block| match block {
            Block::Layout(layout) if layout.alias == alias => Some(layout),
            _ => None,
        })
    }

    /// All command blocks declared in the tree, in declaration order.
    pub fn command_blocks(&self) -> impl Iterator<Item = &CommandBlock> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Command(cmd) => Some(cmd),
            _ => None,
        })
    }

    /// The static command-name allowlist registered at bot setup.
    ///
    /// `start` is always allowed; command blocks contribute their names
    /// without the leading slash, deduplicated.
    pub fn allowed_commands(&self) -> Vec<String> {
        let mut allowed = vec!["start".to_string()];
        for cmd in self.command_blocks() {
            let name = cmd.normalized_name();
            if !name.is_empty() && !allowed.iter().any(|a| a == name) {
                allowed.push(name.to_string());
            }
        }
        allowed
    }

    /// Which layout a `/start` should open: the first-visit layout for a
    /// brand-new client, the regular start layout otherwise.
    pub fn start_layout_alias(&self, total_visits: u64) -> &str {
        if total_visits == 1 {
            &self.default_first_visit_layout
        } else {
            &self.default_start_layout
        }
    }

    /// Validates every top-level layout (no nesting, see
    /// [`LayoutBlock::validate`]) and that the start aliases resolve.
    pub fn validate(&self) -> Result<()> {
        for block in &self.blocks {
            if let Block::Layout(layout) = block {
                layout.validate()?;
            }
        }
        for alias in [&self.default_start_layout, &self.default_first_visit_layout] {
            if self.find_layout(alias).is_none() {
                return Err(ChatBlocksError::config(format!(
                    "start layout \"{alias}\" is not defined in the interface"
                )));
            }
        }
        Ok(())
    }
}
