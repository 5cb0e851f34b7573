//! Block tree domain module.
//!
//! - `model`: the tagged block union and its member structs
//! - `interface`: the root [`BotInterface`] configuration

mod interface;
mod model;

pub use interface::BotInterface;
pub use model::{
    Block, ButtonBlock, ButtonItem, CallbackKind, CatalogBlock, CommandBlock, CommandKind,
    DisplayMode, LayoutBlock, MediaRef, MessageBlock,
};
