//! Configuration management for the tandem monitor
//!
//! Settings are read once at startup and shared lock-free through
//! `ArcSwap`, so pollers always see a consistent snapshot.

mod defaults;
mod loader;
mod schema;

pub use defaults::DEFAULT_CONFIG_TOML;
pub use loader::ConfigLoader;
pub use schema::*;

use arc_swap::ArcSwap;
use std::sync::Arc;

/// Shared configuration handle
pub type ConfigHandle = Arc<ArcSwap<AppConfig>>;

/// Create a new config handle with defaults
pub fn new_config_handle() -> ConfigHandle {
    Arc::new(ArcSwap::from_pointee(AppConfig::default()))
}

/// Create a config handle around an already loaded configuration
pub fn config_handle(config: AppConfig) -> ConfigHandle {
    Arc::new(ArcSwap::from_pointee(config))
}
