//! Named keys sent through `tmux send-keys`

use std::fmt;
use std::str::FromStr;

use tandem_utils::TandemError;

/// Non-literal key understood by tmux
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKey {
    Enter,
    Escape,
    Tab,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    CtrlC,
    CtrlD,
    /// Line feed; inserts a newline in composers that submit on Enter
    CtrlJ,
    CtrlU,
}

impl SpecialKey {
    /// Key name in tmux `send-keys` syntax
    pub fn tmux_name(&self) -> &'static str {
        match self {
            SpecialKey::Enter => "Enter",
            SpecialKey::Escape => "Escape",
            SpecialKey::Tab => "Tab",
            SpecialKey::Backspace => "BSpace",
            SpecialKey::Up => "Up",
            SpecialKey::Down => "Down",
            SpecialKey::Left => "Left",
            SpecialKey::Right => "Right",
            SpecialKey::CtrlC => "C-c",
            SpecialKey::CtrlD => "C-d",
            SpecialKey::CtrlJ => "C-j",
            SpecialKey::CtrlU => "C-u",
        }
    }
}

impl fmt::Display for SpecialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tmux_name())
    }
}

impl FromStr for SpecialKey {
    type Err = TandemError;

    /// Accepts tmux names (`C-c`) as well as `Ctrl+C` style names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.trim() {
            "Enter" | "Return" => SpecialKey::Enter,
            "Escape" | "Esc" => SpecialKey::Escape,
            "Tab" => SpecialKey::Tab,
            "BSpace" | "Backspace" => SpecialKey::Backspace,
            "Up" | "ArrowUp" => SpecialKey::Up,
            "Down" | "ArrowDown" => SpecialKey::Down,
            "Left" | "ArrowLeft" => SpecialKey::Left,
            "Right" | "ArrowRight" => SpecialKey::Right,
            "C-c" | "Ctrl+C" | "Ctrl+c" => SpecialKey::CtrlC,
            "C-d" | "Ctrl+D" | "Ctrl+d" => SpecialKey::CtrlD,
            "C-j" | "Ctrl+J" | "Ctrl+j" => SpecialKey::CtrlJ,
            "C-u" | "Ctrl+U" | "Ctrl+u" => SpecialKey::CtrlU,
            other => {
                return Err(TandemError::terminal(format!("unknown key name: {other}")));
            }
        };
        Ok(key)
    }
}
