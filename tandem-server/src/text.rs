//! Terminal text normalization
//!
//! Captures arrive with escape sequences, box-drawing frames and a padded
//! tail of blank screen rows. Detectors work on the cleaned line list.

/// Lines considered for prompt and ready-marker detection
pub const WIDE_WINDOW: usize = 15;

/// Lines considered for thinking detection
pub const NARROW_WINDOW: usize = 5;

/// Tab stop width used when expanding tabs
pub const TAB_WIDTH: usize = 4;

/// Strip ANSI escape sequences and stray control characters
///
/// Escape parsing is done by `strip_ansi_escapes`. Tabs are expanded
/// first since the parser drops them; newlines survive. Applying it twice
/// yields the same result as applying it once.
pub fn strip_ansi(text: &str) -> String {
    let expanded = text.replace('\t', &" ".repeat(TAB_WIDTH));
    let stripped = strip_ansi_escapes::strip(expanded.as_bytes());
    // C1 controls such as an 8-bit CSI pass through as printable chars
    String::from_utf8_lossy(&stripped)
        .chars()
        .filter(|c| *c == '\n' || !c.is_control())
        .collect()
}

/// Box-drawing glyphs (U+2500..U+257F)
pub fn is_box_char(c: char) -> bool {
    ('\u{2500}'..='\u{257f}').contains(&c)
}

/// Block elements (U+2580..U+259F)
pub fn is_block_char(c: char) -> bool {
    ('\u{2580}'..='\u{259f}').contains(&c)
}

/// Remove box-drawing glyphs
///
/// Only for extracted content; separator detection needs the glyphs.
/// Block elements are kept since replies use them for bars and charts.
pub fn strip_box_drawing(text: &str) -> String {
    text.chars().filter(|c| !is_box_char(*c)).collect()
}

/// Whether a line consists only of box or block glyphs and whitespace
pub fn is_decoration_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| is_box_char(c) || is_block_char(c) || c.is_whitespace())
}

/// Drop whitespace-only lines from the end
pub fn strip_trailing_blank<S: AsRef<str>>(lines: &mut Vec<S>) {
    while lines
        .last()
        .map(|line| line.as_ref().trim().is_empty())
        .unwrap_or(false)
    {
        lines.pop();
    }
}

/// Strip escapes and trailing blank rows, returning owned lines
pub fn normalize(raw: &str) -> Vec<String> {
    let stripped = strip_ansi(raw);
    let mut lines: Vec<String> = stripped
        .split('\n')
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect();
    strip_trailing_blank(&mut lines);
    lines
}

/// Last `n` lines of a slice
pub fn tail<S>(lines: &[S], n: usize) -> &[S] {
    &lines[lines.len().saturating_sub(n)..]
}

/// Join lines and trim the whole block
pub fn join_trimmed<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(|line| line.as_ref().trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
