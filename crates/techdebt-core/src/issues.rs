// SPDX-License-Identifier: Apache-2.0

//! Request wrappers for tech debt issues.
//!
//! Every wrapper checks the session is initialized, validates and sanitizes
//! its inputs, then calls the tracker under the retry policy. Validation
//! failures never reach the network.

use std::future::Future;

use tracing::{debug, instrument};

use crate::error::TechDebtError;
use crate::retry::with_retry;
use crate::sanitize::{
    sanitize_search_query, sanitize_username, validate_body, validate_comment,
    validate_issue_number, validate_title,
};
use crate::session::Session;
use crate::types::{
    FilterSpec, IssueComment, IssueDetails, IssueEdit, IssueQuery, IssueRef, IssueState,
    NewIssue,
};

/// Blank usernames mean "no filter"; anything else goes through the
/// path-safe sanitizer.
fn optional_username(value: Option<&str>) -> Result<Option<String>, TechDebtError> {
    match value {
        Some(v) if !v.trim().is_empty() => sanitize_username(v).map(Some),
        _ => Ok(None),
    }
}

impl Session {
    async fn call<T, F, Fut>(&self, operation: &'static str, attempt: F) -> Result<T, TechDebtError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TechDebtError>>,
    {
        let config = self.config();
        with_retry(operation, &config.retry, config.github.api_timeout(), attempt).await
    }

    /// Creates an issue carrying the configured tech debt label.
    ///
    /// # Errors
    ///
    /// `NotInitialized`, `Validation` for a bad title or body, or the
    /// tracker's error after retries.
    #[instrument(skip(self, title, body))]
    pub async fn create_issue(&self, title: &str, body: &str) -> Result<IssueRef, TechDebtError> {
        let ready = self.ready()?;
        let issue = NewIssue {
            title: validate_title(title)?,
            body: validate_body(body)?,
            labels: vec![self.config().issues.label.clone()],
        };

        let created = self
            .call("create_issue", || {
                ready.tracker.create_issue(&ready.repository, &issue)
            })
            .await?;

        debug!(number = created.number, "Created tech debt issue");
        Ok(created)
    }

    /// Lists tech debt issues matching `filter`.
    ///
    /// An empty result is `Ok(vec![])`.
    ///
    /// # Errors
    ///
    /// `NotInitialized`, `Validation` for an unusable username, or the
    /// tracker's error after retries.
    #[instrument(skip(self))]
    pub async fn list_issues(&self, filter: &FilterSpec) -> Result<Vec<IssueRef>, TechDebtError> {
        let ready = self.ready()?;
        let query = IssueQuery {
            label: self.config().issues.label.clone(),
            state: filter.state,
            assignee: optional_username(filter.assignee.as_deref())?,
            creator: optional_username(filter.creator.as_deref())?,
            per_page: self.config().issues.page_size(),
        };

        self.call("list_issues", || {
            ready.tracker.list_issues(&ready.repository, &query)
        })
        .await
    }

    /// Adds a comment to an issue.
    ///
    /// # Errors
    ///
    /// `NotInitialized`, `Validation` for a bad number or comment, or the
    /// tracker's error after retries.
    #[instrument(skip(self, body))]
    pub async fn add_comment(&self, number: u64, body: &str) -> Result<IssueComment, TechDebtError> {
        let ready = self.ready()?;
        let number = validate_issue_number(number)?;
        let body = validate_comment(body)?;

        self.call("add_comment", || {
            ready.tracker.add_comment(&ready.repository, number, &body)
        })
        .await
    }

    /// Searches tech debt issues by free text.
    ///
    /// # Errors
    ///
    /// `NotInitialized`, `Validation` if the query has nothing searchable,
    /// or the tracker's error after retries.
    #[instrument(skip(self))]
    pub async fn search_issues(&self, query: &str) -> Result<Vec<IssueRef>, TechDebtError> {
        let ready = self.ready()?;
        let terms = sanitize_search_query(query)?;
        let label = self.config().issues.label.as_str();
        let per_page = self.config().issues.page_size();

        self.call("search_issues", || {
            ready
                .tracker
                .search_issues(&ready.repository, label, &terms, per_page)
        })
        .await
    }

    /// Fetches full details of an issue.
    ///
    /// # Errors
    ///
    /// `NotInitialized`, `Validation` for a bad number, or the tracker's
    /// error after retries.
    #[instrument(skip(self))]
    pub async fn get_issue(&self, number: u64) -> Result<IssueDetails, TechDebtError> {
        let ready = self.ready()?;
        let number = validate_issue_number(number)?;

        self.call("get_issue", || {
            ready.tracker.get_issue(&ready.repository, number)
        })
        .await
    }

    /// Lists the comments on an issue.
    ///
    /// # Errors
    ///
    /// `NotInitialized`, `Validation` for a bad number, or the tracker's
    /// error after retries.
    #[instrument(skip(self))]
    pub async fn list_comments(&self, number: u64) -> Result<Vec<IssueComment>, TechDebtError> {
        let ready = self.ready()?;
        let number = validate_issue_number(number)?;

        self.call("list_comments", || {
            ready.tracker.list_comments(&ready.repository, number)
        })
        .await
    }

    /// Changes the title and/or body of an issue.
    ///
    /// # Errors
    ///
    /// `NotInitialized`, `Validation` if neither field is given or one is
    /// invalid, or the tracker's error after retries.
    #[instrument(skip(self, title, body))]
    pub async fn edit_issue(
        &self,
        number: u64,
        title: Option<&str>,
        body: Option<&str>,
    ) -> Result<IssueRef, TechDebtError> {
        self.ready()?;
        let edit = IssueEdit {
            title: title.map(validate_title).transpose()?,
            body: body.map(validate_body).transpose()?,
            state: None,
        };
        if edit.is_empty() {
            return Err(TechDebtError::validation(
                "edit",
                "provide a new title or body",
            ));
        }
        self.update(number, edit, "edit_issue").await
    }

    /// Closes an issue.
    ///
    /// # Errors
    ///
    /// `NotInitialized`, `Validation` for a bad number, or the tracker's
    /// error after retries.
    #[instrument(skip(self))]
    pub async fn close_issue(&self, number: u64) -> Result<IssueRef, TechDebtError> {
        let edit = IssueEdit {
            state: Some(IssueState::Closed),
            ..IssueEdit::default()
        };
        self.update(number, edit, "close_issue").await
    }

    /// Reopens a closed issue.
    ///
    /// # Errors
    ///
    /// `NotInitialized`, `Validation` for a bad number, or the tracker's
    /// error after retries.
    #[instrument(skip(self))]
    pub async fn reopen_issue(&self, number: u64) -> Result<IssueRef, TechDebtError> {
        let edit = IssueEdit {
            state: Some(IssueState::Open),
            ..IssueEdit::default()
        };
        self.update(number, edit, "reopen_issue").await
    }

    async fn update(
        &self,
        number: u64,
        edit: IssueEdit,
        operation: &'static str,
    ) -> Result<IssueRef, TechDebtError> {
        let ready = self.ready()?;
        let number = validate_issue_number(number)?;

        self.call(operation, || {
            ready.tracker.update_issue(&ready.repository, number, &edit)
        })
        .await
    }
}
