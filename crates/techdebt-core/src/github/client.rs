// SPDX-License-Identifier: Apache-2.0

//! Octocrab-backed [`IssueTracker`].
//!
//! Requests go through octocrab's raw `_get`/`_post`/`_patch` so the HTTP
//! status is checked before the body is decoded: a 401 is
//! `AuthenticationInvalid` whatever the body looks like, other non-success
//! statuses are `RemoteApi`, and transport-level failures are
//! `TransientNetwork`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use percent_encoding::{AsciiSet, CONTROLS, NON_ALPHANUMERIC, utf8_percent_encode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{IssueTracker, TrackerFactory};
use crate::config::GitHubConfig;
use crate::error::TechDebtError;
use crate::repository::RepositoryIdentity;
use crate::sanitize::escape_for_display;
use crate::types::{
    IssueComment, IssueDetails, IssueEdit, IssueQuery, IssueRef, IssueState, NewIssue,
};

/// Page size when listing comments.
const COMMENTS_PER_PAGE: u8 = 100;

/// Characters escaped inside a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b':')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Characters escaped inside a query string value (RFC 3986 unreserved kept).
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Deserialize)]
struct ApiUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ApiLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiIssue {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    state: IssueState,
    html_url: String,
    #[serde(default)]
    labels: Vec<ApiLabel>,
    #[serde(default)]
    user: Option<ApiUser>,
    #[serde(default)]
    assignees: Vec<ApiUser>,
    #[serde(default)]
    comments: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

impl ApiIssue {
    fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    fn into_ref(self) -> IssueRef {
        IssueRef {
            number: self.number,
            title: self.title,
            state: self.state,
            url: self.html_url,
        }
    }

    fn into_details(self) -> IssueDetails {
        IssueDetails::builder()
            .number(self.number)
            .title(self.title)
            .body(self.body.unwrap_or_default())
            .state(self.state)
            .labels(self.labels.into_iter().map(|l| l.name).collect())
            .author(self.user.map(|u| u.login).unwrap_or_default())
            .assignees(self.assignees.into_iter().map(|u| u.login).collect())
            .comments(self.comments)
            .url(self.html_url)
            .created_at(self.created_at)
            .updated_at(self.updated_at)
            .build()
    }
}

#[derive(Debug, Deserialize)]
struct ApiComment {
    id: u64,
    #[serde(default)]
    user: Option<ApiUser>,
    #[serde(default)]
    body: Option<String>,
    created_at: DateTime<Utc>,
    html_url: String,
}

impl From<ApiComment> for IssueComment {
    fn from(c: ApiComment) -> Self {
        IssueComment {
            id: c.id,
            author: c.user.map(|u| u.login).unwrap_or_default(),
            body: c.body.unwrap_or_default(),
            created_at: c.created_at,
            url: c.html_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Vec<ApiIssue>,
}

#[derive(Debug, Serialize)]
struct CreateIssuePayload<'a> {
    title: &'a str,
    body: &'a str,
    labels: &'a [String],
}

#[derive(Debug, Serialize)]
struct CommentPayload<'a> {
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateIssuePayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'a str>,
}

/// Joins the `source()` chain of `err`, skipping octocrab's own `Display`
/// (which carries a backtrace).
fn describe_causes(err: &octocrab::Error, fallback: &str) -> String {
    let mut causes: Vec<String> = Vec::new();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && causes.last() != Some(&text) {
            causes.push(text);
        }
        source = cause.source();
    }

    if causes.is_empty() {
        fallback.to_string()
    } else {
        escape_for_display(&causes.join(": "))
    }
}

/// Maps an octocrab error onto the error taxonomy.
#[must_use]
pub fn classify_octocrab_error(err: &octocrab::Error) -> TechDebtError {
    match err {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code.as_u16();
            if status == 401 {
                TechDebtError::AuthenticationInvalid
            } else {
                TechDebtError::RemoteApi {
                    status: Some(status),
                    message: escape_for_display(&source.message),
                }
            }
        }
        octocrab::Error::Service { .. } | octocrab::Error::Hyper { .. } => {
            TechDebtError::TransientNetwork {
                message: describe_causes(err, "connection to GitHub failed"),
            }
        }
        _ => TechDebtError::RemoteApi {
            status: None,
            message: describe_causes(err, "unexpected client error"),
        },
    }
}

/// `message` field of a GitHub JSON error body, if there is one.
fn extract_github_message(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return None;
    };
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
}

fn segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

fn issues_route(repo: &RepositoryIdentity) -> String {
    format!(
        "/repos/{}/{}/issues",
        segment(repo.owner()),
        segment(repo.name())
    )
}

fn issue_route(repo: &RepositoryIdentity, number: u64) -> String {
    format!("{}/{number}", issues_route(repo))
}

/// Appends `params` to `route` as an encoded query string.
fn with_query(route: &str, params: &[(&str, &str)]) -> String {
    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", utf8_percent_encode(value, QUERY_VALUE)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{route}?{query}")
}

#[derive(Debug, Clone, Copy)]
enum Verb {
    Get,
    Post,
    Patch,
}

/// [`IssueTracker`] talking to the GitHub REST API through octocrab.
#[derive(Debug, Clone)]
pub struct OctocrabTracker {
    client: Octocrab,
}

impl OctocrabTracker {
    /// Wraps an authenticated octocrab client.
    #[must_use]
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Sends one request and decodes a successful JSON response.
    async fn send<B, R>(
        &self,
        verb: Verb,
        route: String,
        body: Option<&B>,
    ) -> Result<R, TechDebtError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let response = match verb {
            Verb::Get => self.client._get(route).await,
            Verb::Post => self.client._post(route, body).await,
            Verb::Patch => self.client._patch(route, body).await,
        }
        .map_err(|e| classify_octocrab_error(&e))?;

        let status = response.status();
        if status.as_u16() == 401 {
            debug!("GitHub rejected the credential");
            return Err(TechDebtError::AuthenticationInvalid);
        }

        let text = self
            .client
            .body_to_string(response)
            .await
            .map_err(|e| classify_octocrab_error(&e))?;

        if !status.is_success() {
            let message = extract_github_message(&text)
                .or_else(|| status.canonical_reason().map(ToOwned::to_owned))
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(TechDebtError::RemoteApi {
                status: Some(status.as_u16()),
                message: escape_for_display(&message),
            });
        }

        serde_json::from_str(&text).map_err(|e| TechDebtError::RemoteApi {
            status: Some(status.as_u16()),
            message: format!(
                "unexpected response from GitHub: {}",
                escape_for_display(&e.to_string())
            ),
        })
    }
}

#[async_trait]
impl IssueTracker for OctocrabTracker {
    #[instrument(skip(self, issue), fields(repository = %repo))]
    async fn create_issue(
        &self,
        repo: &RepositoryIdentity,
        issue: &NewIssue,
    ) -> Result<IssueRef, TechDebtError> {
        let payload = CreateIssuePayload {
            title: &issue.title,
            body: &issue.body,
            labels: &issue.labels,
        };
        let created: ApiIssue = self
            .send(Verb::Post, issues_route(repo), Some(&payload))
            .await?;

        debug!(number = created.number, "Issue created");
        Ok(created.into_ref())
    }

    #[instrument(skip(self), fields(repository = %repo))]
    async fn list_issues(
        &self,
        repo: &RepositoryIdentity,
        query: &IssueQuery,
    ) -> Result<Vec<IssueRef>, TechDebtError> {
        let per_page = query.per_page.to_string();
        let mut params = vec![
            ("state", query.state.as_str()),
            ("labels", query.label.as_str()),
            ("per_page", per_page.as_str()),
        ];
        if let Some(assignee) = &query.assignee {
            params.push(("assignee", assignee.as_str()));
        }
        if let Some(creator) = &query.creator {
            params.push(("creator", creator.as_str()));
        }

        let page: Vec<ApiIssue> = self
            .send(Verb::Get, with_query(&issues_route(repo), &params), None::<&()>)
            .await?;

        let total = page.len();
        let issues: Vec<IssueRef> = page
            .into_iter()
            .filter(|issue| !issue.is_pull_request())
            .map(ApiIssue::into_ref)
            .collect();

        debug!(total, issues = issues.len(), "Listed issues");
        Ok(issues)
    }

    #[instrument(skip(self), fields(repository = %repo))]
    async fn search_issues(
        &self,
        repo: &RepositoryIdentity,
        label: &str,
        terms: &str,
        per_page: u8,
    ) -> Result<Vec<IssueRef>, TechDebtError> {
        let query = format!("{terms} repo:{repo} label:\"{label}\" is:issue");
        let per_page = per_page.to_string();
        let route = with_query(
            "/search/issues",
            &[("q", query.as_str()), ("per_page", per_page.as_str())],
        );
        let response: SearchResponse = self.send(Verb::Get, route, None::<&()>).await?;

        let issues: Vec<IssueRef> = response
            .items
            .into_iter()
            .filter(|issue| !issue.is_pull_request())
            .map(ApiIssue::into_ref)
            .collect();

        debug!(count = issues.len(), "Searched issues");
        Ok(issues)
    }

    #[instrument(skip(self), fields(repository = %repo))]
    async fn get_issue(
        &self,
        repo: &RepositoryIdentity,
        number: u64,
    ) -> Result<IssueDetails, TechDebtError> {
        let issue: ApiIssue = self
            .send(Verb::Get, issue_route(repo, number), None::<&()>)
            .await?;

        Ok(issue.into_details())
    }

    #[instrument(skip(self), fields(repository = %repo))]
    async fn list_comments(
        &self,
        repo: &RepositoryIdentity,
        number: u64,
    ) -> Result<Vec<IssueComment>, TechDebtError> {
        let per_page = COMMENTS_PER_PAGE.to_string();
        let route = with_query(
            &format!("{}/comments", issue_route(repo, number)),
            &[("per_page", per_page.as_str())],
        );
        let comments: Vec<ApiComment> = self.send(Verb::Get, route, None::<&()>).await?;

        Ok(comments.into_iter().map(IssueComment::from).collect())
    }

    #[instrument(skip(self, body), fields(repository = %repo))]
    async fn add_comment(
        &self,
        repo: &RepositoryIdentity,
        number: u64,
        body: &str,
    ) -> Result<IssueComment, TechDebtError> {
        let route = format!("{}/comments", issue_route(repo, number));
        let comment: ApiComment = self
            .send(Verb::Post, route, Some(&CommentPayload { body }))
            .await?;

        debug!(id = comment.id, "Comment posted");
        Ok(comment.into())
    }

    #[instrument(skip(self, edit), fields(repository = %repo))]
    async fn update_issue(
        &self,
        repo: &RepositoryIdentity,
        number: u64,
        edit: &IssueEdit,
    ) -> Result<IssueRef, TechDebtError> {
        let payload = UpdateIssuePayload {
            title: edit.title.as_deref(),
            body: edit.body.as_deref(),
            state: edit.state.as_ref().map(IssueState::as_str),
        };
        let updated: ApiIssue = self
            .send(Verb::Patch, issue_route(repo, number), Some(&payload))
            .await?;

        debug!(state = %updated.state, "Issue updated");
        Ok(updated.into_ref())
    }
}

/// Builds [`OctocrabTracker`]s with the configured timeouts and base URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct OctocrabFactory;

impl TrackerFactory for OctocrabFactory {
    fn connect(
        &self,
        token: &SecretString,
        config: &GitHubConfig,
    ) -> Result<Arc<dyn IssueTracker>, TechDebtError> {
        let timeout = config.api_timeout();
        let mut builder = Octocrab::builder()
            .personal_token(token.expose_secret().to_string())
            .set_connect_timeout(Some(timeout))
            .set_read_timeout(Some(timeout))
            .set_write_timeout(Some(timeout));

        if let Some(base_url) = &config.api_base_url {
            builder = builder
                .base_uri(base_url.as_str())
                .map_err(|e| TechDebtError::Config {
                    message: format!(
                        "invalid github.api_base_url: {}",
                        describe_causes(&e, "not a valid URI")
                    ),
                })?;
        }

        let client = builder.build().map_err(|e| TechDebtError::Config {
            message: format!(
                "failed to build GitHub client: {}",
                describe_causes(&e, "client construction failed")
            ),
        })?;

        debug!(timeout_secs = timeout.as_secs(), "Created GitHub client");
        Ok(Arc::new(OctocrabTracker::new(client)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, RetryConfig};
    use crate::error::ErrorKind;
    use crate::repository::RepositoryResolver;
    use crate::session::Session;
    use crate::session::tests::{FakeCredentials, FixedRemote};
    use crate::types::{FilterSpec, StateFilter};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn repo() -> RepositoryIdentity {
        RepositoryIdentity::new("acme", "widgets").unwrap()
    }

    fn issue_json(number: u64, state: &str) -> serde_json::Value {
        json!({
            "number": number,
            "title": format!("Debt #{number}"),
            "body": "Refactor me",
            "state": state,
            "html_url": format!("https://github.com/acme/widgets/issues/{number}"),
            "labels": [{ "name": "tech-debt" }],
            "user": { "login": "octocat" },
            "assignees": [{ "login": "hubot" }],
            "comments": 2,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-02T00:00:00Z"
        })
    }

    fn tracker_for(server: &MockServer) -> Arc<dyn IssueTracker> {
        let config = GitHubConfig {
            api_base_url: Some(server.uri()),
            ..GitHubConfig::default()
        };
        OctocrabFactory
            .connect(&SecretString::from("test-token".to_string()), &config)
            .unwrap()
    }

    #[tokio::test]
    async fn create_issue_sends_label_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/widgets/issues"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_json(json!({
                "title": "Debt #7",
                "body": "Refactor me",
                "labels": ["tech-debt"]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(issue_json(7, "open")))
            .expect(1)
            .mount(&server)
            .await;

        let created = tracker_for(&server)
            .create_issue(
                &repo(),
                &NewIssue {
                    title: "Debt #7".to_string(),
                    body: "Refactor me".to_string(),
                    labels: vec!["tech-debt".to_string()],
                },
            )
            .await
            .unwrap();

        assert_eq!(created.number, 7);
        assert_eq!(created.state, IssueState::Open);
        assert_eq!(created.url, "https://github.com/acme/widgets/issues/7");
    }

    #[tokio::test]
    async fn list_issues_filters_pull_requests() {
        let server = MockServer::start().await;
        let mut pr = issue_json(2, "open");
        pr["pull_request"] = json!({ "url": "https://api.github.com/repos/acme/widgets/pulls/2" });

        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/issues"))
            .and(query_param("state", "open"))
            .and(query_param("labels", "tech-debt"))
            .and(query_param("assignee", "hubot"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([issue_json(1, "open"), pr])),
            )
            .mount(&server)
            .await;

        let issues = tracker_for(&server)
            .list_issues(
                &repo(),
                &IssueQuery {
                    label: "tech-debt".to_string(),
                    state: StateFilter::Open,
                    assignee: Some("hubot".to_string()),
                    creator: None,
                    per_page: 100,
                },
            )
            .await
            .unwrap();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].number, 1);
    }

    #[tokio::test]
    async fn empty_list_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/issues"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let issues = tracker_for(&server)
            .list_issues(
                &repo(),
                &IssueQuery {
                    label: "tech-debt".to_string(),
                    state: StateFilter::Closed,
                    assignee: None,
                    creator: None,
                    per_page: 100,
                },
            )
            .await
            .unwrap();

        assert!(issues.is_empty());
    }

    #[tokio::test]
    async fn unauthorized_maps_to_authentication_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/issues/5"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "Bad credentials",
                "documentation_url": "https://docs.github.com/rest"
            })))
            .mount(&server)
            .await;

        let err = tracker_for(&server).get_issue(&repo(), 5).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationInvalid);
    }

    #[tokio::test]
    async fn not_found_maps_to_remote_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/issues/404"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Not Found",
                "documentation_url": "https://docs.github.com/rest"
            })))
            .mount(&server)
            .await;

        let err = tracker_for(&server)
            .get_issue(&repo(), 404)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TechDebtError::RemoteApi {
                status: Some(404),
                message: "Not Found".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn get_issue_maps_details() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/issues/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(issue_json(3, "closed")))
            .mount(&server)
            .await;

        let details = tracker_for(&server).get_issue(&repo(), 3).await.unwrap();
        assert_eq!(details.state, IssueState::Closed);
        assert_eq!(details.author, "octocat");
        assert_eq!(details.assignees, vec!["hubot".to_string()]);
        assert_eq!(details.labels, vec!["tech-debt".to_string()]);
        assert_eq!(details.comments, 2);
    }

    #[tokio::test]
    async fn update_issue_sends_only_changed_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/repos/acme/widgets/issues/9"))
            .and(body_json(json!({ "state": "closed" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(issue_json(9, "closed")))
            .expect(1)
            .mount(&server)
            .await;

        let updated = tracker_for(&server)
            .update_issue(
                &repo(),
                9,
                &IssueEdit {
                    state: Some(IssueState::Closed),
                    ..IssueEdit::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.state, IssueState::Closed);
    }

    #[tokio::test]
    async fn search_scopes_query_to_repository_and_label() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(query_param(
                "q",
                "flaky tests repo:acme/widgets label:\"tech-debt\" is:issue",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 1,
                "incomplete_results": false,
                "items": [issue_json(4, "open")]
            })))
            .mount(&server)
            .await;

        let issues = tracker_for(&server)
            .search_issues(&repo(), "tech-debt", "flaky tests", 30)
            .await
            .unwrap();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].number, 4);
    }

    #[tokio::test]
    async fn comments_are_mapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/issues/3/comments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 11,
                "user": { "login": "hubot" },
                "body": "Still relevant",
                "created_at": "2025-01-03T00:00:00Z",
                "html_url": "https://github.com/acme/widgets/issues/3#issuecomment-11"
            }])))
            .mount(&server)
            .await;

        let comments = tracker_for(&server)
            .list_comments(&repo(), 3)
            .await
            .unwrap();

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].author, "hubot");
        assert_eq!(comments[0].body, "Still relevant");
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let config = GitHubConfig {
            api_base_url: Some("not a url".to_string()),
            ..GitHubConfig::default()
        };
        let result = OctocrabFactory.connect(&SecretString::from("t".to_string()), &config);
        assert!(matches!(result, Err(TechDebtError::Config { .. })));
    }

    fn tracker_with_timeout(base_url: String, seconds: u64) -> Arc<dyn IssueTracker> {
        let config = GitHubConfig {
            api_base_url: Some(base_url),
            api_timeout_seconds: seconds,
            ..GitHubConfig::default()
        };
        OctocrabFactory
            .connect(&SecretString::from("test-token".to_string()), &config)
            .unwrap()
    }

    /// Accepts TCP connections and closes them without answering.
    async fn hang_up_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                drop(socket);
            }
        });
        format!("http://{addr}")
    }

    fn assert_clean_message(err: &TechDebtError) {
        let message = err.to_string();
        assert!(!message.contains("snafu"), "message: {message}");
        assert!(!message.contains("Found at"), "message: {message}");
        assert!(!message.contains(".cargo"), "message: {message}");
    }

    #[tokio::test]
    async fn unauthorized_without_body_maps_to_authentication_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/issues/5"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = tracker_for(&server).get_issue(&repo(), 5).await.unwrap_err();
        assert_eq!(err, TechDebtError::AuthenticationInvalid);
    }

    #[tokio::test]
    async fn unauthorized_with_plain_text_body_maps_to_authentication_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/widgets/issues/5/comments"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let err = tracker_for(&server)
            .add_comment(&repo(), 5, "Still relevant")
            .await
            .unwrap_err();
        assert_eq!(err, TechDebtError::AuthenticationInvalid);
    }

    #[tokio::test]
    async fn server_error_without_json_body_uses_status_reason() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/issues/5"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let err = tracker_for(&server).get_issue(&repo(), 5).await.unwrap_err();
        assert_eq!(
            err,
            TechDebtError::RemoteApi {
                status: Some(502),
                message: "Bad Gateway".to_string(),
            }
        );
    }

    #[test]
    fn path_segments_are_percent_encoded() {
        let repo = RepositoryIdentity::new("acme corp", "wid?gets").unwrap();
        assert_eq!(issues_route(&repo), "/repos/acme%20corp/wid%3Fgets/issues");
        assert_eq!(
            issue_route(&repo, 4),
            "/repos/acme%20corp/wid%3Fgets/issues/4"
        );
    }

    #[test]
    fn query_values_are_percent_encoded() {
        assert_eq!(
            with_query("/search/issues", &[("q", "a b:\"c\""), ("per_page", "30")]),
            "/search/issues?q=a%20b%3A%22c%22&per_page=30"
        );
    }

    #[tokio::test]
    async fn question_mark_in_name_stays_in_the_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/wid%3Fgets/issues"))
            .and(query_param("state", "open"))
            .and(query_param("labels", "tech-debt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([issue_json(1, "open")])))
            .expect(1)
            .mount(&server)
            .await;

        let issues = tracker_for(&server)
            .list_issues(
                &RepositoryIdentity::new("acme", "wid?gets").unwrap(),
                &IssueQuery {
                    label: "tech-debt".to_string(),
                    state: StateFilter::Open,
                    assignee: None,
                    creator: None,
                    per_page: 100,
                },
            )
            .await
            .unwrap();

        assert_eq!(issues.len(), 1);
    }

    #[tokio::test]
    async fn dropped_connection_is_transient() {
        let tracker = tracker_with_timeout(hang_up_server().await, 5);

        let err = tracker.get_issue(&repo(), 1).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransientNetwork);
        assert_clean_message(&err);
    }

    #[tokio::test]
    async fn slow_response_times_out_as_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/issues/1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(issue_json(1, "open"))
                    .set_delay(Duration::from_secs(4)),
            )
            .mount(&server)
            .await;

        let err = tracker_with_timeout(server.uri(), 1)
            .get_issue(&repo(), 1)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransientNetwork);
        assert_clean_message(&err);
    }

    #[tokio::test]
    async fn session_retries_timed_out_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/issues"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_secs(4)),
            )
            .mount(&server)
            .await;

        let config = AppConfig {
            github: GitHubConfig {
                api_base_url: Some(server.uri()),
                api_timeout_seconds: 1,
                ..GitHubConfig::default()
            },
            retry: RetryConfig {
                max_attempts: 3,
                base_delay_ms: 10,
            },
            ..AppConfig::default()
        };
        let session = Session::builder()
            .credentials(FakeCredentials::granting())
            .resolver(RepositoryResolver::new(
                vec![Box::new(FixedRemote(Some("git@github.com:acme/widgets.git")))],
                None,
            ))
            .config(config)
            .build();
        session.initialize().await.unwrap();

        let err = session.list_issues(&FilterSpec::default()).await.unwrap_err();

        assert!(err.is_transient());
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);
    }
}
