//! tandem-protocol: Shared data types for the session monitoring engine
//!
//! This crate defines the identities, detection results, messages and
//! broadcast events exchanged between the monitor and its collaborators.

pub mod messages;
pub mod types;

// Re-export main types at crate root
pub use messages::{MonitorEvent, StopReason};
pub use types::{
    ChoiceOption, Confidence, ExtractionResult, Message, MessageRole, MessageType, NewMessage,
    ParseToolIdError, PromptData, PromptDetectionResult, PromptStatus, SessionKey, SessionState,
    SessionStatus, StatusDetectionResult, StatusReason, ToolId,
};
