// SPDX-License-Identifier: Apache-2.0

//! Result types returned by command handlers.
//!
//! Command handlers return data; the output module renders it.

use serde::Serialize;
use techdebt_core::{IssueComment, IssueDetails, IssueRef, TokenSource};

/// Result from the auth status command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AuthStatusResult {
    /// Whether a token is available.
    pub authenticated: bool,
    /// Where the token came from (if authenticated).
    pub method: Option<TokenSource>,
}

/// Result from the repo show command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RepoResult {
    /// `owner/name`.
    pub repository: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// Web URL of the repository's tech debt issues.
    pub issues_url: String,
}

/// What an issue command did.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueAction {
    Created,
    Updated,
    Closed,
    Reopened,
}

/// Result from commands that create or change one issue.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct IssueActionResult {
    pub repository: String,
    pub action: IssueAction,
    pub issue: IssueRef,
}

/// Result from the list and search commands.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct IssueListResult {
    pub repository: String,
    /// Search terms, for search results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub issues: Vec<IssueRef>,
}

/// Result from the view command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct IssueViewResult {
    pub repository: String,
    pub issue: IssueDetails,
}

/// Result from the comments command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CommentsResult {
    pub repository: String,
    pub number: u64,
    pub comments: Vec<IssueComment>,
}

/// Result from the comment command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CommentResult {
    pub repository: String,
    pub number: u64,
    pub comment: IssueComment,
}
