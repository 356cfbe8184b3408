// SPDX-License-Identifier: Apache-2.0

//! Credential provider abstraction.
//!
//! Defines the `CredentialProvider` trait, which abstracts where the GitHub
//! access token comes from (an editor's OAuth session, environment
//! variables, the GitHub CLI, the system keyring, ...). The session asks for
//! a token once, bounded by a timeout, and treats `None` as a refusal.
//!
//! [`TokenChain`] is the standalone implementation. It checks, in order:
//! 1. Environment variable (`GH_TOKEN` or `GITHUB_TOKEN`)
//! 2. GitHub CLI (`gh auth token`)
//! 3. System keyring (with the `keyring` feature)

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Serialize;
use tokio::process::Command;
use tracing::{debug, instrument};

/// OAuth scopes needed to read and write issues.
pub const ISSUE_SCOPES: &[&str] = &["repo"];

/// Keyring service name for the stored token.
#[cfg(feature = "keyring")]
pub const KEYRING_SERVICE: &str = "techdebt";

/// Keyring username for the GitHub token.
#[cfg(feature = "keyring")]
pub const KEYRING_USER: &str = "github_token";

/// Provides a GitHub access token for a requested capability scope.
///
/// Implementations return `None` when the user declines or no credential
/// is available.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Retrieves an access token covering `scopes`.
    async fn access_token(&self, scopes: &[&str]) -> Option<SecretString>;
}

/// Source of a token resolved by [`TokenChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    /// Token from `GH_TOKEN` or `GITHUB_TOKEN` environment variable.
    Environment,
    /// Token from `gh auth token` command.
    GhCli,
    /// Token from system keyring.
    Keyring,
}

impl std::fmt::Display for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenSource::Environment => write!(f, "environment variable"),
            TokenSource::GhCli => write!(f, "GitHub CLI"),
            TokenSource::Keyring => write!(f, "system keyring"),
        }
    }
}

/// Token resolution chain for running outside an editor host.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenChain;

impl TokenChain {
    /// Resolves a token and reports where it came from.
    #[instrument(skip(self))]
    pub async fn resolve(&self) -> Option<(SecretString, TokenSource)> {
        if let Some(token) = token_from_env() {
            return Some((token, TokenSource::Environment));
        }

        if let Some(token) = token_from_gh_cli().await {
            debug!("Using token from GitHub CLI");
            return Some((token, TokenSource::GhCli));
        }

        #[cfg(feature = "keyring")]
        if let Some(token) = token_from_keyring() {
            debug!("Using token from system keyring");
            return Some((token, TokenSource::Keyring));
        }

        debug!("No token found in any source");
        None
    }
}

#[async_trait]
impl CredentialProvider for TokenChain {
    async fn access_token(&self, scopes: &[&str]) -> Option<SecretString> {
        debug!(?scopes, "Resolving GitHub token");
        self.resolve().await.map(|(token, _)| token)
    }
}

fn token_from_env() -> Option<SecretString> {
    for var in ["GH_TOKEN", "GITHUB_TOKEN"] {
        if let Ok(token) = std::env::var(var)
            && !token.is_empty()
        {
            debug!(var, "Using token from environment variable");
            return Some(SecretString::from(token));
        }
    }
    None
}

/// Attempts to get a token from the GitHub CLI (`gh auth token`).
///
/// Returns `None` if `gh` is not installed, not authenticated, or fails.
async fn token_from_gh_cli() -> Option<SecretString> {
    let output = Command::new("gh")
        .args(["auth", "token"])
        .kill_on_drop(true)
        .output()
        .await;

    match output {
        Ok(output) if output.status.success() => {
            let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if token.is_empty() {
                debug!("gh auth token returned empty output");
                None
            } else {
                Some(SecretString::from(token))
            }
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!(status = ?output.status, stderr = %stderr.trim(), "gh auth token failed");
            None
        }
        Err(e) => {
            debug!(error = %e, "Failed to execute gh command");
            None
        }
    }
}

#[cfg(feature = "keyring")]
fn token_from_keyring() -> Option<SecretString> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER).ok()?;
    let password = entry.get_password().ok()?;
    Some(SecretString::from(password))
}
