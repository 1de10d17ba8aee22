//! Terminal multiplexer access
//!
//! Everything the monitor knows about a tool comes from tmux: whether its
//! session exists, what its pane shows, and which keys reach it.

mod keys;
pub mod naming;
mod provider;
mod tmux;

pub use keys::SpecialKey;
pub use naming::{session_name, validate_session_name, SESSION_PREFIX};
pub use provider::{CaptureRange, TerminalProvider};
pub use tmux::Tmux;
