// SPDX-License-Identifier: Apache-2.0

//! Error types for Techdebt.
//!
//! Uses `thiserror` for deriving `std::error::Error` implementations.
//! Every variant carries only owned, display-safe data so the error can be
//! cloned and handed to every caller waiting on a shared initialization.

use thiserror::Error;

/// Coarse classification of a [`TechDebtError`].
///
/// Callers match on the kind to decide what to offer the user (sign in,
/// open a repository folder, retry, fix input) without inspecting messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No credential was available from the provider.
    AuthenticationRequired,
    /// Credential acquisition did not finish in time.
    AuthenticationTimedOut,
    /// GitHub rejected the credential (HTTP 401).
    AuthenticationInvalid,
    /// No repository identity could be determined.
    RepositoryNotResolved,
    /// Caller-supplied input failed validation.
    Validation,
    /// Connection reset, timeout or mid-stream disconnect.
    TransientNetwork,
    /// Any other non-retryable failure reported by GitHub.
    RemoteApi,
    /// A request was issued before the session finished initializing.
    NotInitialized,
    /// Configuration could not be loaded.
    Config,
}

/// Errors that can occur during Techdebt operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TechDebtError {
    /// No credential is available - the user needs to sign in.
    #[error("Authentication required - sign in to GitHub to manage tech debt issues")]
    AuthenticationRequired,

    /// The credential provider did not answer within the allotted time.
    #[error("Authentication timed out after {seconds}s - retry signing in")]
    AuthenticationTimedOut {
        /// Timeout that elapsed, in seconds.
        seconds: u64,
    },

    /// GitHub answered 401 for the credential in use.
    #[error("GitHub rejected the stored credentials - re-authenticate and try again")]
    AuthenticationInvalid,

    /// Repository identity could not be resolved from any source.
    #[error("Could not determine the GitHub repository: {message}")]
    RepositoryNotResolved {
        /// Display-safe explanation.
        message: String,
    },

    /// Invalid caller input (title, body, issue number, owner, ...).
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// Transient network failure. Retried before it is surfaced.
    #[error("Connection to GitHub was lost ({message}) - check your network and retry")]
    TransientNetwork {
        /// Display-safe description of the failure.
        message: String,
    },

    /// Non-retryable failure reported by the GitHub API.
    #[error("GitHub API error: {message}")]
    RemoteApi {
        /// HTTP status code, when GitHub returned one.
        status: Option<u16>,
        /// Display-safe error message.
        message: String,
    },

    /// A request wrapper was called before initialization completed.
    #[error("Session is not initialized - sign in and open a repository first")]
    NotInitialized,

    /// Configuration file or environment error.
    #[error("Configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },
}

impl TechDebtError {
    /// Builds a validation error for `field`.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Returns the classification tag for this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthenticationRequired => ErrorKind::AuthenticationRequired,
            Self::AuthenticationTimedOut { .. } => ErrorKind::AuthenticationTimedOut,
            Self::AuthenticationInvalid => ErrorKind::AuthenticationInvalid,
            Self::RepositoryNotResolved { .. } => ErrorKind::RepositoryNotResolved,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::TransientNetwork { .. } => ErrorKind::TransientNetwork,
            Self::RemoteApi { .. } => ErrorKind::RemoteApi,
            Self::NotInitialized => ErrorKind::NotInitialized,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// Whether a retry has a reasonable chance of succeeding.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientNetwork { .. })
    }

    /// Whether the user has to (re-)authenticate before trying again.
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::AuthenticationRequired
                | ErrorKind::AuthenticationTimedOut
                | ErrorKind::AuthenticationInvalid
        )
    }
}

impl From<config::ConfigError> for TechDebtError {
    fn from(err: config::ConfigError) -> Self {
        TechDebtError::Config {
            message: err.to_string(),
        }
    }
}
