// SPDX-License-Identifier: Apache-2.0

//! Plain data records exchanged with callers.

use std::fmt;

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Open/closed state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    /// Issue is open.
    Open,
    /// Issue is closed.
    Closed,
}

impl IssueState {
    /// API representation (`open` / `closed`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State filter for listing issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateFilter {
    /// Open issues only.
    #[default]
    Open,
    /// Closed issues only.
    Closed,
    /// Both open and closed issues.
    All,
}

impl StateFilter {
    /// API representation (`open` / `closed` / `all`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StateFilter::Open => "open",
            StateFilter::Closed => "closed",
            StateFilter::All => "all",
        }
    }
}

/// Filter applied when listing tech debt issues.
///
/// Defaults to open issues with no assignee or creator restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Issue state to include.
    pub state: StateFilter,
    /// Only issues assigned to this user.
    pub assignee: Option<String>,
    /// Only issues opened by this user.
    pub creator: Option<String>,
}

/// Summary of an issue as shown in lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRef {
    /// Issue number (always positive).
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Current state.
    pub state: IssueState,
    /// Web URL of the issue.
    pub url: String,
}

/// Full issue details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct IssueDetails {
    /// Issue number.
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Issue body (markdown, may be empty).
    #[builder(default)]
    pub body: String,
    /// Current state.
    pub state: IssueState,
    /// Label names.
    #[builder(default)]
    pub labels: Vec<String>,
    /// Login of the issue author.
    pub author: String,
    /// Logins of the assignees.
    #[builder(default)]
    pub assignees: Vec<String>,
    /// Number of comments.
    #[builder(default)]
    pub comments: u64,
    /// Web URL of the issue.
    pub url: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A comment on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    /// Comment ID.
    pub id: u64,
    /// Login of the comment author.
    pub author: String,
    /// Comment body (markdown).
    pub body: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Web URL of the comment.
    pub url: String,
}

/// Validated payload for creating an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    /// Issue title.
    pub title: String,
    /// Issue body.
    pub body: String,
    /// Labels to apply.
    pub labels: Vec<String>,
}

/// Validated query for listing issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery {
    /// Label every returned issue must carry.
    pub label: String,
    /// State filter.
    pub state: StateFilter,
    /// Sanitized assignee login.
    pub assignee: Option<String>,
    /// Sanitized creator login.
    pub creator: Option<String>,
    /// Page size.
    pub per_page: u8,
}

/// Validated partial update of an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueEdit {
    /// New title.
    pub title: Option<String>,
    /// New body.
    pub body: Option<String>,
    /// New state.
    pub state: Option<IssueState>,
}

impl IssueEdit {
    /// Whether the edit changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.state.is_none()
    }
}
