// SPDX-License-Identifier: Apache-2.0

//! Sources of Git remote URLs and the manual-entry capability.
//!
//! Each source is a small capability behind [`GitRemoteReader`] so the
//! resolver can be exercised with fakes instead of a real repository.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::parse_github_url;
use crate::error::TechDebtError;

/// `[remote "name"]` section header in a Git config file.
static REMOTE_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*\[\s*remote\s+"([^"]+)"\s*\]"#).expect("valid remote section regex")
});

/// Any other section header.
static ANY_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[").expect("valid section regex"));

/// `url = ...` entry inside a remote section.
static URL_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*url\s*=\s*(\S+)\s*$").expect("valid url entry regex"));

/// A line of `git remote -v` output: `origin  git@github.com:o/r.git (fetch)`.
static REMOTE_VERBOSE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+(\S+)\s+\((fetch|push)\)\s*$").expect("valid remote -v regex")
});

/// Reads a Git remote URL from some source.
#[async_trait]
pub trait GitRemoteReader: Send + Sync {
    /// Short human-readable name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Returns the remote URL, `Ok(None)` if the source has none.
    ///
    /// # Errors
    ///
    /// Returns an error if the source could not be read at all.
    async fn remote_url(&self) -> Result<Option<String>, TechDebtError>;
}

/// Field requested from the user during manual entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptField {
    /// Repository owner (user or organisation).
    Owner,
    /// Repository name.
    Repository,
}

impl PromptField {
    /// Field name as shown to the user and used in validation errors.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            PromptField::Owner => "owner",
            PromptField::Repository => "repository",
        }
    }
}

/// Asks the user for repository details when no remote can be detected.
#[async_trait]
pub trait ManualPrompt: Send + Sync {
    /// Returns the user's answer, or `None` if they cancelled.
    async fn ask(&self, field: PromptField) -> Option<String>;
}

/// `git config --get remote.origin.url` run in the workspace root.
#[derive(Debug, Clone)]
pub struct GitConfigCommand {
    root: PathBuf,
}

impl GitConfigCommand {
    /// Creates the source for a workspace root.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

#[async_trait]
impl GitRemoteReader for GitConfigCommand {
    fn name(&self) -> &'static str {
        "git config"
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn remote_url(&self) -> Result<Option<String>, TechDebtError> {
        let stdout = run_git(&self.root, &["config", "--get", "remote.origin.url"]).await?;
        let url = stdout.trim();
        Ok((!url.is_empty()).then(|| url.to_string()))
    }
}

/// Reads `.git/config` under the workspace root.
#[derive(Debug, Clone)]
pub struct GitConfigFile {
    path: PathBuf,
}

impl GitConfigFile {
    /// Creates the source for a workspace root.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            path: root.join(".git").join("config"),
        }
    }
}

#[async_trait]
impl GitRemoteReader for GitConfigFile {
    fn name(&self) -> &'static str {
        ".git/config"
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn remote_url(&self) -> Result<Option<String>, TechDebtError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(remote_from_git_config(&contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No .git/config in workspace");
                Ok(None)
            }
            Err(e) => Err(TechDebtError::RepositoryNotResolved {
                message: format!("failed to read .git/config: {e}"),
            }),
        }
    }
}

/// `git remote -v` run in the workspace root.
#[derive(Debug, Clone)]
pub struct GitRemoteCommand {
    root: PathBuf,
}

impl GitRemoteCommand {
    /// Creates the source for a workspace root.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

#[async_trait]
impl GitRemoteReader for GitRemoteCommand {
    fn name(&self) -> &'static str {
        "git remote"
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn remote_url(&self) -> Result<Option<String>, TechDebtError> {
        let stdout = run_git(&self.root, &["remote", "-v"]).await?;
        Ok(remote_from_remote_verbose(&stdout))
    }
}

async fn run_git(root: &Path, args: &[&str]) -> Result<String, TechDebtError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(root)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| TechDebtError::RepositoryNotResolved {
            message: format!("failed to run git: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(status = ?output.status, stderr = %stderr.trim(), "git command failed");
        return Ok(String::new());
    }

    String::from_utf8(output.stdout).map_err(|e| TechDebtError::RepositoryNotResolved {
        message: format!("invalid UTF-8 in git output: {e}"),
    })
}

/// Extracts a remote URL from the contents of a Git config file.
///
/// Prefers the `origin` remote; otherwise returns the first remote whose
/// `url` parses as a GitHub remote.
#[must_use]
pub fn remote_from_git_config(contents: &str) -> Option<String> {
    let mut current_remote: Option<&str> = None;
    let mut first: Option<String> = None;

    for line in contents.lines() {
        if let Some(caps) = REMOTE_SECTION.captures(line) {
            current_remote = caps.get(1).map(|m| m.as_str());
            continue;
        }
        if ANY_SECTION.is_match(line) {
            current_remote = None;
            continue;
        }
        let Some(remote) = current_remote else {
            continue;
        };
        if let Some(url) = URL_ENTRY.captures(line).and_then(|c| c.get(1)) {
            if remote == "origin" {
                return Some(url.as_str().to_string());
            }
            if first.is_none() && parse_github_url(url.as_str()).is_ok() {
                first = Some(url.as_str().to_string());
            }
        }
    }

    first
}

/// Extracts a remote URL from `git remote -v` output.
///
/// Prefers `origin (fetch)`, then any `origin` line, then the first line.
#[must_use]
pub fn remote_from_remote_verbose(output: &str) -> Option<String> {
    let entries: Vec<(&str, &str, &str)> = output
        .lines()
        .filter_map(|line| REMOTE_VERBOSE_LINE.captures(line.trim()))
        .filter_map(|caps| match (caps.get(1), caps.get(2), caps.get(3)) {
            (Some(name), Some(url), Some(kind)) => Some((name.as_str(), url.as_str(), kind.as_str())),
            _ => None,
        })
        .collect();

    entries
        .iter()
        .find(|(name, _, kind)| *name == "origin" && *kind == "fetch")
        .or_else(|| entries.iter().find(|(name, _, _)| *name == "origin"))
        .or_else(|| entries.first())
        .map(|(_, url, _)| (*url).to_string())
}
