//! tandem-utils: Common utilities shared across tandem crates
//!
//! This crate provides:
//! - Unified error types ([`TandemError`], [`Result`])
//! - Logging infrastructure ([`init_logging`], [`LogConfig`])
//! - XDG-compliant path utilities ([`paths`] module)

pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Result, TandemError};
pub use logging::{init_logging, init_logging_with_config, LogConfig, LogOutput};
pub use paths::{config_dir, config_file, ensure_all_dirs, log_dir, state_dir};
