//! Default configuration values
//!
//! These are embedded in the binary and used when no config file exists.

/// Default configuration as TOML (for reference/documentation)
pub const DEFAULT_CONFIG_TOML: &str = r##"
# tandem configuration

[polling]
interval_ms = 1000
max_duration_secs = 1800
stale_output_ms = 5000

[terminal]
scrollback_lines = 10000
capture_lines = 10000
tmux_binary = "tmux"

[tools]
local_model = "llama3.2"

[tools.extra_args]
# claude = ["--model", "sonnet"]
# codex = ["--full-auto"]
"##;
