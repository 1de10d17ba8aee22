//! Session status classification
//!
//! Reduces a pane capture to one of four statuses. The rules are checked
//! in a fixed priority order and the first match wins:
//!
//! 1. interactive prompt in the wide window: `waiting`
//! 2. thinking indicator in the narrow window: `running`
//! 3. ready marker in the wide window: `ready`
//! 4. no new output for a while: `ready` (low confidence), only when the
//!    time of the last output change is known
//! 5. otherwise `running` (low confidence)

use std::time::Duration;

use chrono::{DateTime, Utc};

use tandem_protocol::{
    Confidence, SessionStatus, StatusDetectionResult, StatusReason, ToolId,
};

use crate::prompt::{detect_prompt, DetectOptions};
use crate::text::{normalize, tail, NARROW_WINDOW, WIDE_WINDOW};
use crate::tools::profile;

/// Quiet period after which an unmarked screen is assumed to be ready
pub const STALE_OUTPUT_THRESHOLD: Duration = Duration::from_millis(5000);

/// Classify a capture using the current time
///
/// `last_output_at` is `None` for a one-off capture with no history, in
/// which case the staleness rule does not apply.
pub fn detect_session_status(
    raw: &str,
    tool: ToolId,
    last_output_at: Option<DateTime<Utc>>,
) -> StatusDetectionResult {
    classify_status(raw, tool, last_output_at, Utc::now(), STALE_OUTPUT_THRESHOLD)
}

/// Classify a capture at a given instant
///
/// Pure function of its inputs; never fails.
pub fn classify_status(
    raw: &str,
    tool: ToolId,
    last_output_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    stale_after: Duration,
) -> StatusDetectionResult {
    let profile = profile(tool);
    let lines = normalize(raw);
    let wide = tail(&lines, WIDE_WINDOW);

    let prompt = detect_prompt(&wide.join("\n"), &DetectOptions::default());
    if prompt.is_prompt {
        return StatusDetectionResult::new(
            SessionStatus::Waiting,
            Confidence::High,
            StatusReason::PromptDetected,
        )
        .with_active_prompt();
    }

    let narrow = tail(&lines, NARROW_WINDOW);
    if narrow.iter().any(|line| profile.is_thinking_line(line)) {
        return StatusDetectionResult::new(
            SessionStatus::Running,
            Confidence::High,
            StatusReason::ThinkingIndicator,
        );
    }

    if wide.iter().any(|line| profile.is_ready_line(line)) {
        return StatusDetectionResult::new(
            SessionStatus::Ready,
            Confidence::High,
            StatusReason::InputPrompt,
        );
    }

    let quiet = last_output_at.and_then(|at| now.signed_duration_since(at).to_std().ok());
    if quiet.is_some_and(|quiet| quiet > stale_after) {
        return StatusDetectionResult::new(
            SessionStatus::Ready,
            Confidence::Low,
            StatusReason::NoRecentOutput,
        );
    }

    StatusDetectionResult::new(SessionStatus::Running, Confidence::Low, StatusReason::Default)
}
