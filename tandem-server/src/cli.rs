//! Command-line argument parsing for the tandem binary

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// tandem - monitor AI coding CLIs running in tmux
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file (defaults to the XDG config location)
    #[arg(long, short = 'c', env = "TANDEM_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify a terminal capture and print the status as JSON
    Status {
        /// Tool whose screen patterns apply
        #[arg(long, short = 't', default_value = "claude")]
        tool: String,

        /// Capture file; stdin when omitted
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },

    /// Look for an interactive prompt and print the result as JSON
    DetectPrompt {
        /// Capture file; stdin when omitted
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,

        /// Accept option lists without a selection marker
        #[arg(long, default_value_t = false)]
        no_default_indicator: bool,
    },

    /// Start a session, send stdin lines as messages and print events
    ///
    /// Each input line becomes one user message. Events are written to
    /// stdout as JSON lines.
    Run {
        /// Workspace identifier used in the session name
        #[arg(long, short = 'w')]
        workspace: String,

        #[arg(long, short = 't', default_value = "claude")]
        tool: String,

        /// Working directory for a new session (defaults to the current one)
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// Kill the tmux session when input ends
        #[arg(long, default_value_t = false)]
        kill_on_exit: bool,
    },
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
