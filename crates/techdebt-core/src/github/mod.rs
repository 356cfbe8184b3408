// SPDX-License-Identifier: Apache-2.0

//! GitHub integration module.
//!
//! [`IssueTracker`] is the seam between the session's request wrappers and
//! the REST API: wrappers validate and retry, trackers translate one call
//! into one HTTP request and classify its failure. [`TrackerFactory`] builds
//! a tracker from the credential obtained during initialization.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::config::GitHubConfig;
use crate::error::TechDebtError;
use crate::repository::RepositoryIdentity;
use crate::types::{IssueComment, IssueDetails, IssueEdit, IssueQuery, IssueRef, NewIssue};

pub mod client;

pub use client::{OctocrabFactory, OctocrabTracker};

/// Issue operations against a remote tracker.
///
/// Inputs are already validated; implementations report failures using the
/// [`TechDebtError`] taxonomy so the caller can decide whether to retry.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Creates an issue.
    async fn create_issue(
        &self,
        repo: &RepositoryIdentity,
        issue: &NewIssue,
    ) -> Result<IssueRef, TechDebtError>;

    /// Lists issues matching `query`. Pull requests are excluded.
    async fn list_issues(
        &self,
        repo: &RepositoryIdentity,
        query: &IssueQuery,
    ) -> Result<Vec<IssueRef>, TechDebtError>;

    /// Full-text search restricted to `repo` and `label`.
    async fn search_issues(
        &self,
        repo: &RepositoryIdentity,
        label: &str,
        terms: &str,
        per_page: u8,
    ) -> Result<Vec<IssueRef>, TechDebtError>;

    /// Fetches a single issue.
    async fn get_issue(
        &self,
        repo: &RepositoryIdentity,
        number: u64,
    ) -> Result<IssueDetails, TechDebtError>;

    /// Lists the comments on an issue, oldest first.
    async fn list_comments(
        &self,
        repo: &RepositoryIdentity,
        number: u64,
    ) -> Result<Vec<IssueComment>, TechDebtError>;

    /// Adds a comment to an issue.
    async fn add_comment(
        &self,
        repo: &RepositoryIdentity,
        number: u64,
        body: &str,
    ) -> Result<IssueComment, TechDebtError>;

    /// Applies a partial update (title, body, state).
    async fn update_issue(
        &self,
        repo: &RepositoryIdentity,
        number: u64,
        edit: &IssueEdit,
    ) -> Result<IssueRef, TechDebtError>;
}

/// Builds an [`IssueTracker`] from an access token.
pub trait TrackerFactory: Send + Sync {
    /// Creates a tracker authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be constructed.
    fn connect(
        &self,
        token: &SecretString,
        config: &GitHubConfig,
    ) -> Result<Arc<dyn IssueTracker>, TechDebtError>;
}
