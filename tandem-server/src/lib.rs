//! tandem-server: terminal session monitoring for AI coding CLIs
//!
//! Runs each (workspace, tool) pair in its own tmux session, classifies
//! what the tool is doing from pane captures, and turns finished replies
//! and blocking prompts into stored messages.

pub mod adapters;
pub mod config;
pub mod extract;
pub mod monitor;
pub mod poller;
pub mod prompt;
pub mod sink;
pub mod status;
pub mod store;
pub mod terminal;
pub mod text;
pub mod tools;

#[cfg(test)]
mod testing;

pub use adapters::{CliTool, Step};
pub use config::{AppConfig, ConfigHandle, ConfigLoader};
pub use extract::extract_response;
pub use monitor::SessionMonitor;
pub use poller::{PollerInfo, PollerManager};
pub use prompt::{detect_prompt, DetectOptions};
pub use sink::{BroadcastSink, MessageSink, NullSink};
pub use status::detect_session_status;
pub use store::{MemoryStore, MessageStore};
pub use terminal::{TerminalProvider, Tmux};
