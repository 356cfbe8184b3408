// SPDX-License-Identifier: Apache-2.0

//! Command-line interface definition for Techdebt.
//!
//! Uses clap's derive API with noun-verb subcommands.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use techdebt_core::StateFilter;

/// Output format for CLI results.
#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with colors (default)
    #[default]
    Text,
    /// JSON output for programmatic consumption
    Json,
}

/// Global output configuration passed to commands.
#[derive(Clone)]
pub struct OutputContext {
    /// Output format (text, json)
    pub format: OutputFormat,
    /// Whether stdout is a terminal (TTY)
    pub is_tty: bool,
}

impl OutputContext {
    /// Creates an `OutputContext` from CLI arguments.
    pub fn from_cli(format: OutputFormat) -> Self {
        Self {
            format,
            is_tty: std::io::stdout().is_terminal(),
        }
    }

    /// Returns true if interactive elements (spinners, colors) should be shown.
    pub fn is_interactive(&self) -> bool {
        self.is_tty && matches!(self.format, OutputFormat::Text)
    }

    /// Returns true if the user may be asked questions on the terminal.
    pub fn can_prompt(&self) -> bool {
        self.is_interactive() && std::io::stdin().is_terminal()
    }
}

/// Issue state accepted by `issue list`.
#[derive(Clone, Copy, Default, ValueEnum)]
pub enum StateArg {
    /// Open issues only
    #[default]
    Open,
    /// Closed issues only
    Closed,
    /// Open and closed issues
    All,
}

impl From<StateArg> for StateFilter {
    fn from(arg: StateArg) -> Self {
        match arg {
            StateArg::Open => StateFilter::Open,
            StateArg::Closed => StateFilter::Closed,
            StateArg::All => StateFilter::All,
        }
    }
}

/// Techdebt - track tech debt as labeled GitHub issues.
///
/// Detects the GitHub repository from the current workspace and manages
/// issues carrying the tech debt label.
#[derive(Parser)]
#[command(name = "techdebt")]
#[command(version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Output format (text, json)
    #[arg(long, short = 'o', global = true, default_value = "text", value_enum)]
    pub output: OutputFormat,

    /// Enable verbose output (debug-level logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workspace root used to detect the GitHub repository
    #[arg(long, short = 'w', global = true, default_value = ".")]
    pub workspace: PathBuf,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show GitHub authentication status
    #[command(subcommand)]
    Auth(AuthCommand),

    /// Show the detected repository
    #[command(subcommand)]
    Repo(RepoCommand),

    /// Work with tech debt issues
    #[command(subcommand)]
    Issue(IssueCommand),
}

/// Authentication subcommands
#[derive(Subcommand)]
pub enum AuthCommand {
    /// Show where the GitHub token comes from
    Status,
}

/// Repository subcommands
#[derive(Subcommand)]
pub enum RepoCommand {
    /// Show the repository detected for the workspace
    Show,
}

/// Issue subcommands
#[derive(Subcommand)]
pub enum IssueCommand {
    /// Create a tech debt issue
    Create {
        /// Issue title (interactive prompt if not provided)
        #[arg(long, short = 't')]
        title: Option<String>,

        /// Issue body (markdown)
        #[arg(long, short = 'b', default_value = "")]
        body: String,
    },

    /// List tech debt issues
    List {
        /// Issue state
        #[arg(long, short = 's', value_enum, default_value = "open")]
        state: StateArg,

        /// Only issues assigned to this user
        #[arg(long)]
        assignee: Option<String>,

        /// Only issues opened by this user
        #[arg(long)]
        creator: Option<String>,
    },

    /// Show an issue
    View {
        /// Issue number (e.g. 42 or #42)
        number: String,
    },

    /// List the comments on an issue
    Comments {
        /// Issue number (e.g. 42 or #42)
        number: String,
    },

    /// Comment on an issue
    Comment {
        /// Issue number (e.g. 42 or #42)
        number: String,

        /// Comment text (markdown)
        #[arg(long, short = 'b')]
        body: String,
    },

    /// Change the title or body of an issue
    Edit {
        /// Issue number (e.g. 42 or #42)
        number: String,

        /// New title
        #[arg(long, short = 't')]
        title: Option<String>,

        /// New body
        #[arg(long, short = 'b')]
        body: Option<String>,
    },

    /// Close an issue
    Close {
        /// Issue number (e.g. 42 or #42)
        number: String,
    },

    /// Reopen a closed issue
    Reopen {
        /// Issue number (e.g. 42 or #42)
        number: String,
    },

    /// Search tech debt issues by text
    Search {
        /// Search terms
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}
