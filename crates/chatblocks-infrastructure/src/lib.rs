//! Infrastructure implementations for chatblocks: in-memory repositories
//! and interface-configuration loading. Real deployments supply their own
//! storage behind the same `chatblocks-core` traits.

pub mod interface_loader;
pub mod memory_catalog;
pub mod memory_clients;

pub use interface_loader::{interface_from_json, interface_from_toml, load_interface};
pub use memory_catalog::MemoryCatalogRepository;
pub use memory_clients::MemoryClientRepository;
