//! Per-tool screen patterns
//!
//! Each supported CLI draws its UI differently. A [`ToolProfile`] holds the
//! compiled patterns and timing constants for one tool; detectors and
//! adapters look profiles up by [`ToolId`] instead of branching on the tool.

use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;

use tandem_protocol::ToolId;

use crate::prompt::is_choice_option_line;
use crate::text::is_decoration_line;

/// How the extractor decides that a reply is finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Ready prompt and separator rule visible, no thinking indicator
    Strict,
    /// Ready prompt visible, no thinking indicator
    Lenient,
}

/// Named delays used while driving a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolTiming {
    /// Wait after launching the binary before touching its UI
    pub banner_wait: Duration,
    /// Pause between typing text and pressing Enter
    pub submit_delay: Duration,
    /// Pause between startup choreography steps
    pub step_delay: Duration,
}

/// Compiled screen patterns for one tool
#[derive(Debug)]
pub struct ToolProfile {
    pub tool: ToolId,
    /// Executable looked up on `PATH`
    pub binary: &'static str,
    /// Ready marker: the empty input line
    pub prompt: Regex,
    /// Horizontal rule framing the input box
    pub separator: Option<Regex>,
    /// Spinner or activity line shown while the tool works
    pub thinking: Option<Regex>,
    /// Line echoing input the user submitted
    pub user_echo: Regex,
    /// Noise lines never part of a reply
    pub skip: Vec<Regex>,
    /// Marker prefixed to reply lines, removed from extracted content
    pub reply_marker: Option<Regex>,
    pub completion: Completion,
    /// Commit the raw line count instead of the input box position
    pub raw_watermark: bool,
    /// Minimum non-whitespace characters for a reply to count
    pub min_content_chars: usize,
    pub timing: ToolTiming,
}

impl ToolProfile {
    pub fn is_ready_line(&self, line: &str) -> bool {
        self.prompt.is_match(line)
    }

    pub fn is_separator_line(&self, line: &str) -> bool {
        self.separator
            .as_ref()
            .map(|re| re.is_match(line))
            .unwrap_or(false)
    }

    pub fn is_thinking_line(&self, line: &str) -> bool {
        self.thinking
            .as_ref()
            .map(|re| re.is_match(line))
            .unwrap_or(false)
    }

    /// Echo of submitted input; highlighted choice options do not count
    pub fn is_echo_line(&self, line: &str) -> bool {
        self.user_echo.is_match(line) && !is_choice_option_line(line)
    }

    pub fn is_skip_line(&self, line: &str) -> bool {
        is_decoration_line(line) || self.skip.iter().any(|re| re.is_match(line))
    }

    /// Remove the reply marker from the start of a line
    pub fn strip_reply_marker<'a>(&self, line: &'a str) -> std::borrow::Cow<'a, str> {
        match &self.reply_marker {
            Some(re) => re.replace(line, ""),
            None => std::borrow::Cow::Borrowed(line),
        }
    }
}

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

fn claude_profile() -> ToolProfile {
    ToolProfile {
        tool: ToolId::Claude,
        binary: "claude",
        prompt: re(r"^\s*[>❯][\s\u{a0}]*$"),
        separator: Some(re(r"─{10,}")),
        thinking: Some(re(
            r"(^\s*[·✢✳✶✻✽]\s*\S.*(…|\.\.\.))|esc to interrupt",
        )),
        user_echo: re(r"^\s*[>❯][\s\u{a0}]+\S"),
        skip: vec![
            re(r"^\s*\?\s+for shortcuts"),
            re(r"⏵⏵|shift\+tab to cycle|bypass permissions"),
            re(r"auto-compact|Context left until"),
            re(r"^\s*[·✢✳✶✻✽]\s"),
            re(r"Welcome to Claude|Claude Code v\d|/help for help|^\s*cwd:"),
            re(r"Tips for getting started|^\s*Try \x22"),
            // Logo rows open with quadrant glyphs; progress bars use full blocks
            re(r"^\s*[\u{2580}-\u{259f}]*[\u{2596}-\u{259f}]"),
        ],
        reply_marker: Some(re(r"^\s*⏺\s?")),
        completion: Completion::Strict,
        raw_watermark: false,
        min_content_chars: 1,
        timing: ToolTiming {
            banner_wait: Duration::from_millis(3000),
            submit_delay: Duration::from_millis(100),
            step_delay: Duration::from_millis(500),
        },
    }
}

fn codex_profile() -> ToolProfile {
    ToolProfile {
        tool: ToolId::Codex,
        binary: "codex",
        prompt: re(r"^\s*›"),
        separator: None,
        thinking: Some(re(
            r"•\s*(Working|Thinking|Preparing|Analyzing|Reasoning)|\(\d+s • esc to interrupt\)|esc to interrupt",
        )),
        user_echo: re(r"^\s*›\s+\S"),
        skip: vec![
            re(r"⏎ send|⌃J newline|Ctrl\+J newline|⌃T transcript"),
            re(r"\d+% context left|/model to change"),
            re(r">_ OpenAI Codex|^[\s│]*(model|directory|approval|sandbox):\s"),
            re(r"To get started, describe a task|/init - create|/status - show"),
            // Loading and auth-wait frames
            re(r"^\s*(Booting MCP server|Starting MCP|Loading|Signing in|Waiting for (authentication|sign[- ]in))"),
        ],
        reply_marker: Some(re(r"^\s*•\s")),
        completion: Completion::Lenient,
        raw_watermark: false,
        min_content_chars: 2,
        timing: ToolTiming {
            banner_wait: Duration::from_millis(3000),
            submit_delay: Duration::from_millis(150),
            step_delay: Duration::from_millis(700),
        },
    }
}

fn gemini_profile() -> ToolProfile {
    ToolProfile {
        tool: ToolId::Gemini,
        binary: "gemini",
        // Shell prompt such as `user@host:~/ws$`, optionally after `(venv)`
        prompt: re(r"^(\(\S+\)\s+)?\S*[$%#]\s*$"),
        separator: None,
        thinking: None,
        user_echo: re(r"^(\(\S+\)\s+)?\S+[$%#]\s+gemini\b"),
        skip: vec![
            re(r"^Loaded cached credentials"),
            re(r"^Data collection is disabled"),
            re(r"^\[(DEBUG|INFO)\]"),
        ],
        reply_marker: None,
        completion: Completion::Lenient,
        raw_watermark: true,
        min_content_chars: 1,
        timing: ToolTiming {
            banner_wait: Duration::ZERO,
            submit_delay: Duration::from_millis(50),
            step_delay: Duration::ZERO,
        },
    }
}

fn local_profile() -> ToolProfile {
    ToolProfile {
        tool: ToolId::Local,
        binary: "ollama",
        prompt: re(r"^>>>\s*(Send a message.*)?$"),
        separator: None,
        thinking: None,
        user_echo: re(r"^>>>\s+\S"),
        skip: vec![re(r"^\s*\.\.\.\s*$"), re(r"^pulling |^verifying |^writing manifest|^success\s*$")],
        reply_marker: None,
        completion: Completion::Lenient,
        raw_watermark: true,
        min_content_chars: 1,
        timing: ToolTiming {
            banner_wait: Duration::from_millis(5000),
            submit_delay: Duration::from_millis(100),
            step_delay: Duration::from_millis(300),
        },
    }
}

lazy_static! {
    static ref CLAUDE: ToolProfile = claude_profile();
    static ref CODEX: ToolProfile = codex_profile();
    static ref GEMINI: ToolProfile = gemini_profile();
    static ref LOCAL: ToolProfile = local_profile();
}

/// Profile for a tool
pub fn profile(tool: ToolId) -> &'static ToolProfile {
    match tool {
        ToolId::Claude => &CLAUDE,
        ToolId::Codex => &CODEX,
        ToolId::Gemini => &GEMINI,
        ToolId::Local => &LOCAL,
    }
}

/// Profile for a tool name; unknown names get the Claude profile
pub fn profile_by_name(name: &str) -> &'static ToolProfile {
    profile(ToolId::resolve(name))
}
