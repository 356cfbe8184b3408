// SPDX-License-Identifier: Apache-2.0

//! Repository identity resolution.
//!
//! Turns a Git remote URL, or manual input, into a sanitized
//! [`RepositoryIdentity`]. Sources are tried in a fixed priority order and
//! the first one that yields a parseable GitHub remote wins:
//!
//! 1. `git config --get remote.origin.url`
//! 2. `.git/config` in the workspace root
//! 3. `git remote -v`
//! 4. Manual entry (owner, then repository name)

pub mod sources;

use std::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::TechDebtError;
use crate::sanitize::{escape_for_display, sanitize_path_component};

pub use sources::{
    GitConfigCommand, GitConfigFile, GitRemoteCommand, GitRemoteReader, ManualPrompt, PromptField,
};

/// Remote URLs longer than this are cut before matching.
pub const MAX_REMOTE_URL_CHARS: usize = 2000;

/// HTTPS (any host, including GitHub Enterprise): `(scheme://)?(user@)?(www.)?host/owner/repo(.git)?`
static HTTPS_REMOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[A-Za-z][A-Za-z0-9+.-]*://)?(?:[^@/\s]+@)?(?:www\.)?[^/\s:@]+(?::\d+)?/([^/\s]+)/([^/\s]+?)(?:\.git)?/*$",
    )
    .expect("valid HTTPS remote regex")
});

/// Standard SSH: `git@host:owner/repo(.git)?` where host is a domain name.
static SSH_REMOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^git@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}:/?([^/\s]+)/([^/\s]+?)(?:\.git)?/*$")
        .expect("valid SSH remote regex")
});

/// SSH through a `~/.ssh/config` host alias: `git@github.com-work:owner/repo(.git)?`
static SSH_ALIAS_REMOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]+@[A-Za-z0-9._-]+:/?([^/\s]+)/([^/\s]+?)(?:\.git)?/*$")
        .expect("valid SSH alias remote regex")
});

/// The `{owner, name}` pair addressing a GitHub repository.
///
/// Both fields are non-empty and sanitized; case is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryIdentity {
    owner: String,
    name: String,
}

impl RepositoryIdentity {
    /// Builds an identity, sanitizing both parts.
    ///
    /// # Errors
    ///
    /// Returns `TechDebtError::Validation` if either part is empty after
    /// sanitization.
    pub fn new(owner: &str, name: &str) -> Result<Self, TechDebtError> {
        Ok(Self {
            owner: sanitize_path_component("owner", owner)?,
            name: sanitize_path_component("repository", name)?,
        })
    }

    /// Repository owner (user or organisation).
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Parses a Git remote URL into a sanitized [`RepositoryIdentity`].
///
/// Supports, in this order:
/// - HTTPS, including enterprise hosts and embedded credentials
///   (`https://github.com/owner/repo.git`, `https://user@ghe.corp/owner/repo`)
/// - SSH (`git@github.com:owner/repo.git`)
/// - SSH through a host alias (`git@github.com-work:owner/repo.git`)
///
/// The `.git` suffix and trailing slashes are optional. Input is trimmed and
/// capped at [`MAX_REMOTE_URL_CHARS`] characters before matching.
///
/// # Errors
///
/// Returns `TechDebtError::RepositoryNotResolved` if no pattern matches, or
/// `TechDebtError::Validation` if the owner or name sanitizes to nothing.
///
/// # Examples
///
/// ```
/// use techdebt_core::repository::parse_github_url;
///
/// let repo = parse_github_url("git@github.com-work:acme/widgets.git").unwrap();
/// assert_eq!(repo.owner(), "acme");
/// assert_eq!(repo.name(), "widgets");
/// ```
pub fn parse_github_url(url: &str) -> Result<RepositoryIdentity, TechDebtError> {
    let capped: String = url.trim().chars().take(MAX_REMOTE_URL_CHARS).collect();
    let candidate = capped.trim();

    for pattern in [&*HTTPS_REMOTE, &*SSH_REMOTE, &*SSH_ALIAS_REMOTE] {
        if let Some(caps) = pattern.captures(candidate)
            && let (Some(owner), Some(repo)) = (caps.get(1), caps.get(2))
        {
            let identity = RepositoryIdentity::new(owner.as_str(), repo.as_str())?;
            debug!(repository = %identity, "Parsed git remote URL");
            return Ok(identity);
        }
    }

    Err(TechDebtError::RepositoryNotResolved {
        message: format!(
            "could not parse git remote URL '{}'",
            escape_for_display(candidate)
        ),
    })
}

/// Resolves the repository identity from an ordered list of sources.
pub struct RepositoryResolver {
    sources: Vec<Box<dyn GitRemoteReader>>,
    prompt: Option<Arc<dyn ManualPrompt>>,
}

impl RepositoryResolver {
    /// Creates a resolver over explicit sources, tried in order.
    #[must_use]
    pub fn new(
        sources: Vec<Box<dyn GitRemoteReader>>,
        prompt: Option<Arc<dyn ManualPrompt>>,
    ) -> Self {
        Self { sources, prompt }
    }

    /// Creates a resolver with the standard sources for a workspace root:
    /// `git config`, `.git/config`, `git remote -v`, then `prompt` if given.
    #[must_use]
    pub fn for_workspace(root: &Path, prompt: Option<Arc<dyn ManualPrompt>>) -> Self {
        Self::new(
            vec![
                Box::new(GitConfigCommand::new(root)),
                Box::new(GitConfigFile::new(root)),
                Box::new(GitRemoteCommand::new(root)),
            ],
            prompt,
        )
    }

    /// Resolves the repository identity.
    ///
    /// # Errors
    ///
    /// Returns `TechDebtError::RepositoryNotResolved` when every automatic
    /// source fails and no manual prompt is configured, or the error from
    /// the manual prompt (required field / sanitization) when it is.
    #[instrument(skip(self))]
    pub async fn resolve(&self) -> Result<RepositoryIdentity, TechDebtError> {
        let mut failures = Vec::new();

        for source in &self.sources {
            match source.remote_url().await {
                Ok(Some(url)) => match parse_github_url(&url) {
                    Ok(identity) => {
                        info!(source = source.name(), repository = %identity, "Resolved repository");
                        return Ok(identity);
                    }
                    Err(e) => {
                        debug!(source = source.name(), error = %e, "Remote URL not usable");
                        failures.push(format!("{}: {e}", source.name()));
                    }
                },
                Ok(None) => {
                    debug!(source = source.name(), "No remote URL found");
                    failures.push(format!("{}: no remote found", source.name()));
                }
                Err(e) => {
                    debug!(source = source.name(), error = %e, "Remote source failed");
                    failures.push(format!("{}: {e}", source.name()));
                }
            }
        }

        if let Some(prompt) = &self.prompt {
            debug!("Falling back to manual repository entry");
            return resolve_manually(prompt.as_ref()).await;
        }

        Err(TechDebtError::RepositoryNotResolved {
            message: if failures.is_empty() {
                "no repository sources configured".to_string()
            } else {
                failures.join("; ")
            },
        })
    }
}

async fn resolve_manually(prompt: &dyn ManualPrompt) -> Result<RepositoryIdentity, TechDebtError> {
    let owner = ask_required(prompt, PromptField::Owner).await?;
    let name = ask_required(prompt, PromptField::Repository).await?;
    let identity = RepositoryIdentity::new(&owner, &name)?;
    info!(repository = %identity, "Resolved repository from manual entry");
    Ok(identity)
}

async fn ask_required(
    prompt: &dyn ManualPrompt,
    field: PromptField,
) -> Result<String, TechDebtError> {
    match prompt.ask(field).await {
        Some(answer) if !answer.trim().is_empty() => Ok(answer),
        _ => Err(TechDebtError::validation(field.label(), "is required")),
    }
}
