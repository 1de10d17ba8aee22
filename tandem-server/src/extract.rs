//! Response extraction
//!
//! Finds the reply a tool produced after the last consumed line
//! (the watermark) and decides whether it is finished. Scrollback can be
//! truncated or wiped by a restart, so the watermark is checked against
//! the capture before it is trusted as an offset.

use tracing::{debug, trace};

use tandem_protocol::{ExtractionResult, ToolId};

use crate::prompt::{detect_prompt, DetectOptions};
use crate::text::{join_trimmed, normalize, strip_box_drawing, tail};
use crate::tools::{profile, Completion, ToolProfile};

/// Watermark may exceed the line count by this much before the
/// scrollback counts as truncated
pub const BUFFER_SHRINK_TOLERANCE: usize = 25;

/// A buffer this small that is behind the watermark means the tool restarted
pub const RESTART_LINE_THRESHOLD: usize = 50;

/// Lines searched for completion evidence
pub const COMPLETION_WINDOW: usize = 20;

/// Lines searched for the user echo after a reset
pub const RESET_ECHO_SEARCH: usize = 200;

/// Growth small enough that the watermark may sit inside a redrawn region
pub const REDRAW_DELTA: usize = 5;

/// Lines searched for the user echo after a small growth
pub const REDRAW_ECHO_SEARCH: usize = 50;

/// Start offset from the end when no echo is found after a small growth
pub const REDRAW_LOOKBACK: usize = 40;

/// Extracted lines checked for a trailing thinking indicator
pub const TRAILING_THINKING_LINES: usize = 5;

/// Relation between a watermark and the current capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferReset {
    None,
    /// Old lines dropped out of the scrollback
    Truncated,
    /// The tool (or the pane) started over
    Restarted,
}

impl BufferReset {
    pub fn is_reset(&self) -> bool {
        !matches!(self, BufferReset::None)
    }
}

/// Compare a watermark with the line count of a fresh capture
pub fn detect_reset(watermark: usize, total: usize) -> BufferReset {
    if watermark > total + BUFFER_SHRINK_TOLERANCE {
        BufferReset::Truncated
    } else if watermark > total && total <= RESTART_LINE_THRESHOLD {
        BufferReset::Restarted
    } else {
        BufferReset::None
    }
}

/// Number of meaningful lines in a capture
pub fn line_count(raw: &str) -> usize {
    normalize(raw).len()
}

fn last_ready_index(profile: &ToolProfile, lines: &[String]) -> Option<usize> {
    lines.iter().rposition(|line| profile.is_ready_line(line))
}

/// Index where the input area starts
///
/// For tools with an input box this is the rule above the ready prompt, so
/// that the echo of the next message lands after the watermark.
pub fn input_boundary(profile: &ToolProfile, lines: &[String]) -> usize {
    let total = lines.len();
    if profile.raw_watermark {
        return total;
    }

    let window_start = total.saturating_sub(COMPLETION_WINDOW);
    match last_ready_index(profile, lines) {
        Some(idx) if idx >= window_start => {
            if idx > 0 && profile.is_separator_line(&lines[idx - 1]) {
                idx - 1
            } else {
                idx
            }
        }
        _ => total,
    }
}

/// Watermark to record right before submitting a message
pub fn send_watermark(raw: &str, tool: ToolId) -> usize {
    input_boundary(profile(tool), &normalize(raw))
}

/// Whether the tail of the capture shows the tool idle at its prompt
pub fn has_completion_evidence(profile: &ToolProfile, lines: &[String]) -> bool {
    let window = tail(lines, COMPLETION_WINDOW);
    let ready = window.iter().any(|line| profile.is_ready_line(line));
    let thinking = window.iter().any(|line| profile.is_thinking_line(line));

    match profile.completion {
        Completion::Strict => {
            let separator = window.iter().any(|line| profile.is_separator_line(line));
            ready && separator && !thinking
        }
        Completion::Lenient => ready && !thinking,
    }
}

/// Most recent echo within `span` lines, ignoring the live input line
fn last_echo_index(profile: &ToolProfile, lines: &[String], span: usize) -> Option<usize> {
    let end = last_ready_index(profile, lines).unwrap_or(lines.len());
    let begin = lines.len().saturating_sub(span);
    (begin..end.min(lines.len()))
        .rev()
        .find(|&i| profile.is_echo_line(&lines[i]))
}

fn start_index(
    profile: &ToolProfile,
    lines: &[String],
    watermark: usize,
    reset: BufferReset,
) -> Option<usize> {
    let total = lines.len();

    if reset.is_reset() {
        return Some(
            last_echo_index(profile, lines, RESET_ECHO_SEARCH)
                .map(|i| i + 1)
                .unwrap_or(0),
        );
    }

    if profile.raw_watermark {
        return Some(watermark.min(total));
    }

    if total.saturating_sub(watermark) <= REDRAW_DELTA {
        // An echo above the watermark belongs to an exchange already committed
        return match last_echo_index(profile, lines, REDRAW_ECHO_SEARCH) {
            Some(i) if i >= watermark => Some(i + 1),
            Some(_) => None,
            None => Some(total.saturating_sub(REDRAW_LOOKBACK)),
        };
    }

    Some(watermark.min(total))
}

/// Lines between the start index and the ready prompt
struct Region<'a> {
    lines: Vec<&'a str>,
    terminated: bool,
}

fn collect_region<'a>(profile: &ToolProfile, lines: &'a [String]) -> Region<'a> {
    let mut region = Vec::new();
    let mut started = false;

    for line in lines {
        let ready = profile.is_ready_line(line);
        let echo = profile.is_echo_line(line);

        // Leading echoes and a stale input line precede the reply
        if !started && (ready || echo) {
            continue;
        }
        if ready {
            return Region {
                lines: region,
                terminated: true,
            };
        }
        if echo {
            continue;
        }

        region.push(line.as_str());
        if is_content_line(profile, line) {
            started = true;
        }
    }

    Region {
        lines: region,
        terminated: false,
    }
}

fn is_content_line(profile: &ToolProfile, line: &str) -> bool {
    !line.trim().is_empty() && !profile.is_skip_line(line) && !profile.is_thinking_line(line)
}

fn ends_thinking(profile: &ToolProfile, region: &[&str]) -> bool {
    region
        .iter()
        .rev()
        .filter(|line| !line.trim().is_empty())
        .take(TRAILING_THINKING_LINES)
        .any(|line| profile.is_thinking_line(line))
}

fn clean_content(profile: &ToolProfile, region: &[&str]) -> String {
    let kept: Vec<String> = region
        .iter()
        .filter(|line| !profile.is_skip_line(line) && !profile.is_thinking_line(line))
        .map(|line| strip_box_drawing(&profile.strip_reply_marker(line)))
        .collect();
    join_trimmed(&kept)
}

/// Extract the reply written after `watermark`
///
/// Returns `None` when there is nothing new to report. Callers commit
/// `consumed_line_count` only for complete results and only after the
/// message was persisted.
pub fn extract_response(raw: &str, watermark: usize, tool: ToolId) -> Option<ExtractionResult> {
    let profile = profile(tool);
    let lines = normalize(raw);
    let total = lines.len();

    let reset = detect_reset(watermark, total);
    if reset.is_reset() {
        debug!(%tool, watermark, total, ?reset, "Buffer reset detected");
    } else if total <= watermark {
        return None;
    }

    let Some(start) = start_index(profile, &lines, watermark, reset) else {
        trace!(%tool, watermark, total, "Only committed output above the watermark");
        return None;
    };
    let new_lines = &lines[start..];
    trace!(%tool, watermark, total, start, "Extracting response");

    // A blocking prompt is reported even when a reply is also visible
    let detection = detect_prompt(&new_lines.join("\n"), &DetectOptions::default());
    if let Some(data) = detection.prompt_data {
        return Some(ExtractionResult::prompt(detection.clean_content, total, data));
    }

    let region = collect_region(profile, new_lines);
    let content = clean_content(profile, &region.lines);

    let significant = content.chars().filter(|c| !c.is_whitespace()).count();
    if significant == 0 || significant < profile.min_content_chars {
        return None;
    }

    let complete = has_completion_evidence(profile, &lines)
        && !ends_thinking(profile, &region.lines)
        && (region.terminated || profile.completion == Completion::Lenient);

    if complete {
        Some(ExtractionResult::complete(content, total))
    } else {
        Some(ExtractionResult::partial(content, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLAUDE_IDLE_BOX: &str = "\
────────────────────────────────────────
❯\u{a0}
────────────────────────────────────────
  ? for shortcuts";

    fn claude_screen(body: &str) -> String {
        format!("{body}\n\n{CLAUDE_IDLE_BOX}\n")
    }

    // ==================== Reset detection ====================

    #[test]
    fn test_detect_reset() {
        assert_eq!(detect_reset(10, 100), BufferReset::None);
        assert_eq!(detect_reset(100, 100), BufferReset::None);
        assert_eq!(detect_reset(300, 200), BufferReset::Truncated);
        assert_eq!(detect_reset(225, 200), BufferReset::None);
        assert_eq!(detect_reset(60, 40), BufferReset::Restarted);
        assert_eq!(detect_reset(60, 50), BufferReset::Restarted);
        assert_eq!(detect_reset(60, 55), BufferReset::None);
    }

    // ==================== Claude ====================

    #[test]
    fn test_claude_complete_reply() {
        let banner = "▐▛███▜▌   Claude Code v2.0.14\n▝▜█████▛▘  Sonnet 4.5 · Claude Pro\n";
        let before = format!("{banner}\n{CLAUDE_IDLE_BOX}\n");
        let watermark = send_watermark(&before, ToolId::Claude);
        assert_eq!(watermark, 3);

        let after = claude_screen(&format!(
            "{banner}\n> Tell me about X\n\n⏺ X is a thing.\n  It does stuff."
        ));
        let result = extract_response(&after, watermark, ToolId::Claude).unwrap();
        assert!(result.is_complete);
        assert_eq!(result.content, "X is a thing.\n  It does stuff.");
        assert_eq!(result.consumed_line_count, line_count(&after));
        assert!(!result.is_prompt());
    }

    #[test]
    fn test_claude_thinking_is_partial() {
        let screen = "\
> Explain
⏺ Partial answer so far
✻ Thinking… (esc to interrupt)

────────────────────────────────────────
❯
────────────────────────────────────────
";
        let result = extract_response(screen, 0, ToolId::Claude).unwrap();
        assert!(!result.is_complete);
        assert_eq!(result.content, "Partial answer so far");
    }

    #[test]
    fn test_claude_missing_separator_is_partial() {
        let screen = "> Explain\n⏺ Answer\n❯\n";
        let result = extract_response(screen, 0, ToolId::Claude).unwrap();
        assert!(!result.is_complete);
    }

    #[test]
    fn test_claude_banner_only_is_nothing() {
        let screen = format!(
            "╭──────────────────────────╮\n│ ✻ Welcome to Claude Code! │\n│   /help for help          │\n╰──────────────────────────╯\n\n{CLAUDE_IDLE_BOX}\n"
        );
        assert!(extract_response(&screen, 0, ToolId::Claude).is_none());
    }

    #[test]
    fn test_no_new_output() {
        let mut body = String::new();
        for i in 0..RESTART_LINE_THRESHOLD {
            body.push_str(&format!("history {i}\n"));
        }
        body.push_str("> hi\n⏺ hello");
        let screen = claude_screen(&body);
        let total = line_count(&screen);
        assert!(extract_response(&screen, total, ToolId::Claude).is_none());
        assert!(extract_response(&screen, total + 3, ToolId::Claude).is_none());
    }

    #[test]
    fn test_prompt_wins_over_completion() {
        let screen = "\
> run the tests
⏺ I'll run the tests.

╭────────────────────────────────────╮
│ Bash command                       │
│   npm test                         │
│ Do you want to proceed?            │
│ ❯ 1. Yes                           │
│   2. No, and tell Claude what to do differently (esc) │
╰────────────────────────────────────╯
";
        let result = extract_response(screen, 0, ToolId::Claude).unwrap();
        assert!(result.is_prompt());
        assert!(result.is_complete);
        assert_eq!(result.content, "Do you want to proceed?");
        assert_eq!(result.consumed_line_count, line_count(screen));
    }

    #[test]
    fn test_answered_prompt_above_watermark_is_ignored() {
        let screen = claude_screen(
            "\
╭────────────────────────────────────╮
│ Do you want to proceed?            │
│ ❯ 1. Yes                           │
│   2. No                            │
╰────────────────────────────────────╯
> go on
⏺ Done.",
        );
        let result = extract_response(&screen, 5, ToolId::Claude).unwrap();
        assert!(!result.is_prompt());
        assert!(result.is_complete);
        assert_eq!(result.content, "Done.");
    }

    #[test]
    fn test_small_growth_restarts_from_echo() {
        // Input box without its footer so the echo lands on the watermark
        let mut body = String::new();
        for i in 0..30 {
            body.push_str(&format!("old line {i}\n"));
        }
        body.push_str("> second question\n⏺ Second answer\n");
        let screen = format!("{body}{rule}\n❯\n{rule}\n", rule = "─".repeat(40));
        let total = line_count(&screen);
        assert_eq!(total, 35);

        let result = extract_response(&screen, 30, ToolId::Claude).unwrap();
        assert!(result.is_complete);
        assert_eq!(result.content, "Second answer");
    }

    #[test]
    fn test_small_growth_ignores_committed_echo() {
        // Watermark moved back by a send; the only echo belongs to the last exchange
        let screen = claude_screen("> first question\n⏺ first answer");
        let total = line_count(&screen);
        assert!(extract_response(&screen, total - 4, ToolId::Claude).is_none());
        assert!(extract_response(&screen, total - 2, ToolId::Claude).is_none());
    }

    #[test]
    fn test_claude_reply_keeps_block_glyph_lines() {
        let screen = claude_screen("> status?\n⏺ Build status:\n  ████████░░ 80%\n  Done.");
        let result = extract_response(&screen, 0, ToolId::Claude).unwrap();
        assert!(result.is_complete);
        assert_eq!(result.content, "Build status:\n  ████████░░ 80%\n  Done.");
    }

    #[test]
    fn test_reset_after_restart_uses_echo() {
        let screen = claude_screen("> after restart\n⏺ Fresh reply");
        let result = extract_response(&screen, 500, ToolId::Claude).unwrap();
        assert_eq!(result.content, "Fresh reply");
        assert!(result.consumed_line_count < 500);
    }

    #[test]
    fn test_reset_without_echo_starts_at_zero() {
        let screen = claude_screen("⏺ Output after truncation");
        let result = extract_response(&screen, 400, ToolId::Claude).unwrap();
        assert_eq!(result.content, "Output after truncation");
    }

    // ==================== Codex ====================

    #[test]
    fn test_codex_complete_reply() {
        let screen = "\
› fix the failing test

• Updated src/lib.rs to handle empty input.

› Ask Codex to do anything
  ⏎ send   ⌃J newline   ⌃T transcript
";
        let result = extract_response(screen, 0, ToolId::Codex).unwrap();
        assert!(result.is_complete);
        assert_eq!(result.content, "Updated src/lib.rs to handle empty input.");
    }

    #[test]
    fn test_codex_working_is_partial() {
        let screen = "\
› fix the failing test

• Working (3s • esc to interrupt)

› Ask Codex to do anything
";
        // Only the activity line is new; nothing worth reporting yet
        assert!(extract_response(screen, 0, ToolId::Codex).is_none());

        let screen = "\
› fix the failing test
Reading files
• Working (3s • esc to interrupt)
› Ask Codex to do anything
";
        let result = extract_response(screen, 0, ToolId::Codex).unwrap();
        assert!(!result.is_complete);
    }

    #[test]
    fn test_codex_minimum_length() {
        let screen = "› hi\n\nk\n\n› Ask Codex to do anything\n";
        assert!(extract_response(screen, 0, ToolId::Codex).is_none());
    }

    #[test]
    fn test_codex_loading_frames_suppressed() {
        let screen = "Booting MCP server: github\nLoading\n› Ask Codex to do anything\n";
        assert!(extract_response(screen, 0, ToolId::Codex).is_none());
    }

    // ==================== Shell tools ====================

    #[test]
    fn test_gemini_uses_raw_watermark() {
        let before = "user@host:~/ws$ \n";
        let watermark = send_watermark(before, ToolId::Gemini);
        assert_eq!(watermark, 1);

        let after = "\
user@host:~/ws$ gemini -p 'what is rust'
Loaded cached credentials.
Rust is a systems programming language.
user@host:~/ws$
";
        let result = extract_response(after, 0, ToolId::Gemini).unwrap();
        assert!(result.is_complete);
        assert_eq!(result.content, "Rust is a systems programming language.");
        assert_eq!(result.consumed_line_count, 4);
    }

    #[test]
    fn test_gemini_still_running() {
        let screen = "user@host:~/ws$ gemini -p 'long task'\nWorking on it\n";
        let result = extract_response(screen, 0, ToolId::Gemini).unwrap();
        assert!(!result.is_complete);
        assert_eq!(result.content, "Working on it");
    }

    #[test]
    fn test_local_reply() {
        let screen = "\
>>> why is the sky blue
Rayleigh scattering.

>>> Send a message (/? for help)
";
        let result = extract_response(screen, 0, ToolId::Local).unwrap();
        assert!(result.is_complete);
        assert_eq!(result.content, "Rayleigh scattering.");
    }

    // ==================== Boundaries ====================

    #[test]
    fn test_input_boundary_claude() {
        let lines = normalize(&claude_screen("⏺ reply"));
        // reply, blank, rule, prompt, rule, footer
        assert_eq!(input_boundary(profile(ToolId::Claude), &lines), 2);
    }

    #[test]
    fn test_input_boundary_without_prompt() {
        let lines = normalize("just output\nmore output\n");
        assert_eq!(input_boundary(profile(ToolId::Claude), &lines), 2);
    }
}
