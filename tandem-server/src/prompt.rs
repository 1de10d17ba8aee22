//! Interactive prompt detection
//!
//! Recognizes the two kinds of blocking prompts the tools show: single-line
//! yes/no questions and numbered multiple-choice menus with a cursor glyph.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use tandem_protocol::{ChoiceOption, PromptData, PromptDetectionResult};

use crate::text::{normalize, strip_box_drawing, tail};

/// Lines scanned for a single-line yes/no question
pub const SINGLE_LINE_WINDOW: usize = 10;

/// Lines scanned for a multiple-choice menu
pub const MULTIPLE_CHOICE_WINDOW: usize = 50;

/// Hint lines allowed below the last option
pub const MAX_FOOTER_LINES: usize = 10;

/// Fragments this short are wrapped label tails
const CONTINUATION_MAX_CHARS: usize = 3;

/// Lines indented this deep are option descriptions
const CONTINUATION_INDENT: usize = 4;

const YES_NO: [&str; 2] = ["yes", "no"];

lazy_static! {
    static ref YN_PAREN: Regex = Regex::new(r"(?i)^(.+?)\s*\(y/n\)[\s:?]*$").unwrap();
    static ref YN_DEFAULT_NO: Regex = Regex::new(r"^(.+?)\s*\[y/N\][\s:?]*$").unwrap();
    static ref YN_DEFAULT_YES: Regex = Regex::new(r"^(.+?)\s*\[Y/n\][\s:?]*$").unwrap();
    static ref YES_NO_PAREN: Regex = Regex::new(r"(?i)^(.+?)\s*\(yes/no\)[\s:?]*$").unwrap();
    static ref APPROVE: Regex = Regex::new(r"^(.*?)\s*\bApprove\?\s*$").unwrap();

    static ref OPTION_LINE: Regex =
        Regex::new(r"^\s*(?:([❯›>])\s*)?(\d+)\.\s+(\S.*?)\s*$").unwrap();
    static ref TEXT_INPUT_LABEL: Regex = Regex::new(
        r"(?i)\b(type|tell|enter|write)\b.*\b(own|answer|what to do|something|custom)\b"
    )
    .unwrap();
}

/// Detector switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectOptions {
    /// Require a cursor glyph on one option before accepting a menu
    pub require_default_indicator: bool,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            require_default_indicator: true,
        }
    }
}

/// Single-line shapes in priority order
struct YesNoShape {
    pattern: &'static Regex,
    default_option: Option<&'static str>,
}

fn yes_no_shapes() -> [YesNoShape; 5] {
    [
        YesNoShape { pattern: &YN_PAREN, default_option: None },
        YesNoShape { pattern: &YN_DEFAULT_NO, default_option: Some("no") },
        YesNoShape { pattern: &YN_DEFAULT_YES, default_option: Some("yes") },
        YesNoShape { pattern: &YES_NO_PAREN, default_option: None },
        YesNoShape { pattern: &APPROVE, default_option: None },
    ]
}

/// Whether a line is a menu option carrying the cursor glyph
pub fn is_choice_option_line(line: &str) -> bool {
    OPTION_LINE
        .captures(&strip_box_drawing(line))
        .map(|caps| caps.get(1).is_some())
        .unwrap_or(false)
}

/// Detect an interactive prompt in captured text
pub fn detect_prompt(text: &str, options: &DetectOptions) -> PromptDetectionResult {
    let lines = normalize(text);

    if let Some(data) = detect_yes_no(&lines) {
        trace!(question = data.question(), "yes/no prompt detected");
        return PromptDetectionResult::prompt(data, text);
    }

    if let Some(data) = detect_multiple_choice(&lines, options) {
        trace!(question = data.question(), "multiple-choice prompt detected");
        return PromptDetectionResult::prompt(data, text);
    }

    PromptDetectionResult::none(text)
}

fn detect_yes_no(lines: &[String]) -> Option<PromptData> {
    let window = tail(lines, SINGLE_LINE_WINDOW);

    for shape in yes_no_shapes() {
        let found = window.iter().rev().find_map(|line| {
            let cleaned = strip_box_drawing(line);
            shape
                .pattern
                .captures(cleaned.trim())
                .and_then(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        });

        if let Some(question) = found {
            let question = if question.is_empty() {
                "Approve?".to_string()
            } else {
                question
            };
            return Some(PromptData::YesNo {
                question,
                options: YES_NO.iter().map(|s| s.to_string()).collect(),
                default_option: shape.default_option.map(str::to_string),
            });
        }
    }

    None
}

fn parse_option(line: &str) -> Option<ChoiceOption> {
    let caps = OPTION_LINE.captures(line)?;
    let number = caps.get(2)?.as_str().parse::<u32>().ok()?;
    let label = caps.get(3)?.as_str().trim().to_string();
    Some(ChoiceOption {
        number,
        requires_text_input: TEXT_INPUT_LABEL.is_match(&label),
        is_default: caps.get(1).is_some(),
        label,
    })
}

fn is_continuation(line: &str) -> bool {
    let indent = line.chars().take_while(|c| *c == ' ').count();
    line.trim().chars().count() <= CONTINUATION_MAX_CHARS || indent >= CONTINUATION_INDENT
}

fn detect_multiple_choice(lines: &[String], options: &DetectOptions) -> Option<PromptData> {
    let window: Vec<String> = tail(lines, MULTIPLE_CHOICE_WINDOW)
        .iter()
        .map(|line| strip_box_drawing(line).trim_end().to_string())
        .collect();

    // Cheap exit for ordinary output
    if options.require_default_indicator && !window.iter().any(|l| is_choice_option_line(l)) {
        return None;
    }

    let mut collected: Vec<ChoiceOption> = Vec::new();
    let mut footer_skipped = 0;
    let mut question: Option<String> = None;

    for line in window.iter().rev() {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(option) = parse_option(line) {
            collected.push(option);
            continue;
        }
        if collected.is_empty() {
            if footer_skipped < MAX_FOOTER_LINES {
                footer_skipped += 1;
                continue;
            }
            return None;
        }
        if is_continuation(line) {
            continue;
        }
        question = Some(line.trim().to_string());
        break;
    }

    collected.reverse();

    if collected.len() < 2 {
        return None;
    }
    let consecutive = collected
        .iter()
        .enumerate()
        .all(|(i, option)| option.number as usize == i + 1);
    if !consecutive {
        return None;
    }
    if options.require_default_indicator && !collected.iter().any(|o| o.is_default) {
        return None;
    }

    Some(PromptData::MultipleChoice {
        question: question.unwrap_or_else(|| "Select an option".to_string()),
        options: collected,
    })
}
