//! Runtime layer for chatblocks: inbound event model, command registry,
//! per-event dispatch, and per-chat serialization.

pub mod commands;
pub mod dispatcher;
pub mod event;
pub mod router;

pub use commands::CommandRegistry;
pub use dispatcher::BotDispatcher;
pub use event::{InboundEvent, InboundEventKind};
pub use router::ChatRouter;
