// SPDX-License-Identifier: Apache-2.0

//! CLI-specific error formatting with user-friendly hints.
//!
//! Downcasts `anyhow::Error` to `TechDebtError` and appends a hint chosen by
//! error kind, so the library stays free of terminal-specific wording.

use anyhow::Error;
use techdebt_core::config::config_file_path;
use techdebt_core::{ErrorKind, TechDebtError};

/// Formats an error for CLI display with helpful hints.
///
/// If the error is not a `TechDebtError`, returns the error chain.
pub fn format_error(error: &Error) -> String {
    let Some(err) = error.downcast_ref::<TechDebtError>() else {
        return format!("{error:#}");
    };

    let tip = match err.kind() {
        ErrorKind::AuthenticationRequired => {
            "Set GH_TOKEN or sign in with `gh auth login`, then try again.".to_string()
        }
        ErrorKind::AuthenticationTimedOut => {
            "Signing in took too long. Run the command again to retry.".to_string()
        }
        ErrorKind::AuthenticationInvalid => {
            "Your token was rejected. Refresh it with `gh auth refresh -s repo` or set a new GH_TOKEN."
                .to_string()
        }
        ErrorKind::RepositoryNotResolved => {
            "Run inside a Git repository with a GitHub remote, or pass --workspace <path>."
                .to_string()
        }
        ErrorKind::Validation => "Check the command arguments and try again.".to_string(),
        ErrorKind::TransientNetwork => {
            "Check your internet connection and try again.".to_string()
        }
        ErrorKind::RemoteApi => {
            "Check the issue number and that your token can access this repository (`techdebt auth status`)."
                .to_string()
        }
        ErrorKind::NotInitialized => {
            "This is a bug: the session was used before it was initialized.".to_string()
        }
        ErrorKind::Config => match config_file_path() {
            Some(path) => format!("Check your config file at {}", path.display()),
            None => "Check your TECHDEBT_* environment variables.".to_string(),
        },
    };

    format!("{err}\n\nTip: {tip}")
}
