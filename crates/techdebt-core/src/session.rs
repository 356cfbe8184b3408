// SPDX-License-Identifier: Apache-2.0

//! Session lifecycle: one authenticated tracker and one resolved repository.
//!
//! Initialization is coalesced. While a handshake is in flight, further
//! `initialize` calls await the same shared future instead of starting a
//! second one, and every waiter observes the same outcome. The state lock is
//! never held across an await point.
//!
//! ```text
//! NotStarted -> InProgress -> Initialized
//!                    |   ^
//!                    v   |
//!                   Failed
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::auth::{CredentialProvider, ISSUE_SCOPES};
use crate::config::AppConfig;
use crate::error::TechDebtError;
use crate::github::{IssueTracker, OctocrabFactory, TrackerFactory};
use crate::repository::{RepositoryIdentity, RepositoryResolver};

/// Observable lifecycle state of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// `initialize` has not been called yet.
    NotStarted,
    /// A handshake is running.
    InProgress,
    /// Tracker and repository are available.
    Initialized,
    /// The last handshake failed; `initialize` may be called again.
    Failed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::NotStarted => "not started",
            SessionStatus::InProgress => "in progress",
            SessionStatus::Initialized => "initialized",
            SessionStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Everything a request wrapper needs once the session is ready.
pub(crate) struct Ready {
    pub(crate) tracker: Arc<dyn IssueTracker>,
    pub(crate) repository: RepositoryIdentity,
}

type InitFuture = Shared<BoxFuture<'static, Result<Arc<Ready>, TechDebtError>>>;

enum State {
    NotStarted,
    InProgress(InitFuture),
    Initialized(Arc<Ready>),
    Failed(TechDebtError),
}

struct SessionInner {
    config: AppConfig,
    credentials: Arc<dyn CredentialProvider>,
    factory: Arc<dyn TrackerFactory>,
    resolver: RepositoryResolver,
    state: Mutex<State>,
}

impl SessionInner {
    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn handshake(&self) -> Result<Arc<Ready>, TechDebtError> {
        let auth_timeout = self.config.github.auth_timeout();
        let token = tokio::time::timeout(auth_timeout, self.credentials.access_token(ISSUE_SCOPES))
            .await
            .map_err(|_| TechDebtError::AuthenticationTimedOut {
                seconds: auth_timeout.as_secs(),
            })?
            .ok_or(TechDebtError::AuthenticationRequired)?;
        debug!("Credential acquired");

        let tracker = self.factory.connect(&token, &self.config.github)?;
        let repository = self.resolver.resolve().await?;

        Ok(Arc::new(Ready {
            tracker,
            repository,
        }))
    }
}

/// Runs the handshake and records its outcome as the new state.
async fn run_initialization(inner: Arc<SessionInner>) -> Result<Arc<Ready>, TechDebtError> {
    let result = inner.handshake().await;

    let mut state = inner.lock_state();
    match &result {
        Ok(ready) => {
            info!(repository = %ready.repository, "Session initialized");
            *state = State::Initialized(Arc::clone(ready));
        }
        Err(e) => {
            warn!(error = %e, kind = ?e.kind(), "Session initialization failed");
            *state = State::Failed(e.clone());
        }
    }
    result
}

fn default_factory() -> Arc<dyn TrackerFactory> {
    Arc::new(OctocrabFactory)
}

/// Owns the authenticated tracker and the resolved repository identity.
///
/// Cheap to clone; clones share the same lifecycle. Construct one per
/// running instance and pass it to whoever issues requests.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[bon::bon]
impl Session {
    /// Creates a session in the `NotStarted` state.
    #[builder]
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        resolver: RepositoryResolver,
        #[builder(default = default_factory())] factory: Arc<dyn TrackerFactory>,
        #[builder(default)] config: AppConfig,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                config,
                credentials,
                factory,
                resolver,
                state: Mutex::new(State::NotStarted),
            }),
        }
    }
}

impl Session {
    /// Ensures the session is initialized.
    ///
    /// Returns immediately when already initialized. Joins the in-flight
    /// handshake if one is running; otherwise starts a new one (also after
    /// a previous failure).
    ///
    /// # Errors
    ///
    /// - `AuthenticationTimedOut` if the credential provider did not answer
    ///   within `github.auth_timeout_seconds`
    /// - `AuthenticationRequired` if it answered without a credential
    /// - `RepositoryNotResolved` or `Validation` if the repository could not
    ///   be determined
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<(), TechDebtError> {
        let pending = {
            let mut state = self.inner.lock_state();
            match &*state {
                State::Initialized(_) => return Ok(()),
                State::InProgress(fut) => {
                    debug!("Joining in-flight initialization");
                    fut.clone()
                }
                State::NotStarted | State::Failed(_) => {
                    debug!("Starting initialization");
                    let fut = run_initialization(Arc::clone(&self.inner))
                        .boxed()
                        .shared();
                    *state = State::InProgress(fut.clone());
                    fut
                }
            }
        };

        pending.await.map(|_| ())
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        match &*self.inner.lock_state() {
            State::NotStarted => SessionStatus::NotStarted,
            State::InProgress(_) => SessionStatus::InProgress,
            State::Initialized(_) => SessionStatus::Initialized,
            State::Failed(_) => SessionStatus::Failed,
        }
    }

    /// Error from the last failed initialization, if the session is `Failed`.
    #[must_use]
    pub fn last_error(&self) -> Option<TechDebtError> {
        match &*self.inner.lock_state() {
            State::Failed(e) => Some(e.clone()),
            _ => None,
        }
    }

    /// Repository identity once initialized.
    #[must_use]
    pub fn repository(&self) -> Option<RepositoryIdentity> {
        match &*self.inner.lock_state() {
            State::Initialized(ready) => Some(ready.repository.clone()),
            _ => None,
        }
    }

    /// Loaded configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Tracker and repository, or `NotInitialized`.
    pub(crate) fn ready(&self) -> Result<Arc<Ready>, TechDebtError> {
        match &*self.inner.lock_state() {
            State::Initialized(ready) => Ok(Arc::clone(ready)),
            _ => Err(TechDebtError::NotInitialized),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("status", &self.status())
            .field("repository", &self.repository())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::GitHubConfig;
    use crate::error::ErrorKind;
    use crate::repository::GitRemoteReader;
    use crate::types::{
        IssueComment, IssueDetails, IssueEdit, IssueQuery, IssueRef, NewIssue,
    };
    use async_trait::async_trait;
    use secrecy::SecretString;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Credential provider that counts handshakes and can stall or refuse.
    pub(crate) struct FakeCredentials {
        pub(crate) calls: AtomicUsize,
        delay: Duration,
        refuse: bool,
    }

    impl FakeCredentials {
        pub(crate) fn granting() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delay: Duration::from_millis(50),
                refuse: false,
            })
        }

        fn refusing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
                refuse: true,
            })
        }

        fn stalled() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delay: Duration::from_secs(3600),
                refuse: false,
            })
        }
    }

    #[async_trait]
    impl CredentialProvider for FakeCredentials {
        async fn access_token(&self, scopes: &[&str]) -> Option<SecretString> {
            assert_eq!(scopes, ISSUE_SCOPES);
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            (!self.refuse).then(|| SecretString::from("token".to_string()))
        }
    }

    /// Remote source returning a fixed URL (or nothing).
    pub(crate) struct FixedRemote(pub(crate) Option<&'static str>);

    #[async_trait]
    impl GitRemoteReader for FixedRemote {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn remote_url(&self) -> Result<Option<String>, TechDebtError> {
            Ok(self.0.map(str::to_string))
        }
    }

    /// Tracker whose every method fails; session tests never reach it.
    struct UnusedTracker;

    #[async_trait]
    impl IssueTracker for UnusedTracker {
        async fn create_issue(
            &self,
            _: &RepositoryIdentity,
            _: &NewIssue,
        ) -> Result<IssueRef, TechDebtError> {
            Err(TechDebtError::NotInitialized)
        }

        async fn list_issues(
            &self,
            _: &RepositoryIdentity,
            _: &IssueQuery,
        ) -> Result<Vec<IssueRef>, TechDebtError> {
            Err(TechDebtError::NotInitialized)
        }

        async fn search_issues(
            &self,
            _: &RepositoryIdentity,
            _: &str,
            _: &str,
            _: u8,
        ) -> Result<Vec<IssueRef>, TechDebtError> {
            Err(TechDebtError::NotInitialized)
        }

        async fn get_issue(
            &self,
            _: &RepositoryIdentity,
            _: u64,
        ) -> Result<IssueDetails, TechDebtError> {
            Err(TechDebtError::NotInitialized)
        }

        async fn list_comments(
            &self,
            _: &RepositoryIdentity,
            _: u64,
        ) -> Result<Vec<IssueComment>, TechDebtError> {
            Err(TechDebtError::NotInitialized)
        }

        async fn add_comment(
            &self,
            _: &RepositoryIdentity,
            _: u64,
            _: &str,
        ) -> Result<IssueComment, TechDebtError> {
            Err(TechDebtError::NotInitialized)
        }

        async fn update_issue(
            &self,
            _: &RepositoryIdentity,
            _: u64,
            _: &IssueEdit,
        ) -> Result<IssueRef, TechDebtError> {
            Err(TechDebtError::NotInitialized)
        }
    }

    /// Factory handing out a prepared tracker and counting connects.
    pub(crate) struct FakeFactory {
        tracker: Arc<dyn IssueTracker>,
        pub(crate) connects: AtomicUsize,
    }

    impl FakeFactory {
        pub(crate) fn new(tracker: Arc<dyn IssueTracker>) -> Arc<Self> {
            Arc::new(Self {
                tracker,
                connects: AtomicUsize::new(0),
            })
        }
    }

    impl TrackerFactory for FakeFactory {
        fn connect(
            &self,
            _token: &SecretString,
            _config: &GitHubConfig,
        ) -> Result<Arc<dyn IssueTracker>, TechDebtError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::clone(&self.tracker))
        }
    }

    fn resolver(url: Option<&'static str>) -> RepositoryResolver {
        RepositoryResolver::new(vec![Box::new(FixedRemote(url))], None)
    }

    fn session_with(credentials: Arc<FakeCredentials>, url: Option<&'static str>) -> Session {
        Session::builder()
            .credentials(credentials)
            .resolver(resolver(url))
            .factory(FakeFactory::new(Arc::new(UnusedTracker)))
            .build()
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_initialize_runs_one_handshake() {
        let credentials = FakeCredentials::granting();
        let session = session_with(
            Arc::clone(&credentials),
            Some("https://github.com/acme/widgets.git"),
        );

        let (a, b) = tokio::join!(session.initialize(), session.initialize());

        assert_eq!(a, Ok(()));
        assert_eq!(b, Ok(()));
        assert_eq!(credentials.calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.status(), SessionStatus::Initialized);
        assert_eq!(
            session.repository().map(|r| r.to_string()).as_deref(),
            Some("acme/widgets")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_failure() {
        let credentials = FakeCredentials::refusing();
        let session = session_with(Arc::clone(&credentials), Some("git@github.com:a/b.git"));

        let (a, b) = tokio::join!(session.initialize(), session.initialize());

        assert_eq!(a, Err(TechDebtError::AuthenticationRequired));
        assert_eq!(a, b);
        assert_eq!(credentials.calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.status(), SessionStatus::Failed);
        assert_eq!(session.last_error(), Some(TechDebtError::AuthenticationRequired));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_initialize_from_spawned_tasks() {
        let credentials = FakeCredentials::granting();
        let session = session_with(Arc::clone(&credentials), Some("git@github.com:a/b.git"));

        let first = tokio::spawn({
            let session = session.clone();
            async move { session.initialize().await }
        });
        let second = tokio::spawn({
            let session = session.clone();
            async move { session.initialize().await }
        });

        assert_eq!(first.await.unwrap(), Ok(()));
        assert_eq!(second.await.unwrap(), Ok(()));
        assert_eq!(credentials.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn initialize_after_success_is_a_noop() {
        let credentials = FakeCredentials::granting();
        let factory = FakeFactory::new(Arc::new(UnusedTracker));
        let session = Session::builder()
            .credentials(credentials.clone())
            .resolver(resolver(Some("git@github.com:a/b.git")))
            .factory(factory.clone())
            .build();

        session.initialize().await.unwrap();
        session.initialize().await.unwrap();
        session.initialize().await.unwrap();

        assert_eq!(credentials.calls.load(Ordering::SeqCst), 1);
        assert_eq!(factory.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn auth_timeout_is_distinct() {
        let credentials = FakeCredentials::stalled();
        let session = session_with(credentials, Some("git@github.com:a/b.git"));

        let err = session.initialize().await.unwrap_err();

        assert_eq!(err, TechDebtError::AuthenticationTimedOut { seconds: 30 });
        assert_eq!(session.status(), SessionStatus::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn repository_failure_is_not_an_auth_failure() {
        let session = session_with(FakeCredentials::granting(), None);

        let err = session.initialize().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RepositoryNotResolved);
        assert!(!err.is_authentication());
        assert!(session.repository().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_session_retries_on_next_initialize() {
        let credentials = FakeCredentials::granting();
        let session = session_with(Arc::clone(&credentials), Some("not a remote"));

        assert!(session.initialize().await.is_err());
        assert!(session.initialize().await.is_err());

        assert_eq!(credentials.calls.load(Ordering::SeqCst), 2);
        assert_eq!(session.status(), SessionStatus::Failed);
    }

    #[test]
    fn new_session_is_not_started() {
        let session = session_with(FakeCredentials::granting(), None);
        assert_eq!(session.status(), SessionStatus::NotStarted);
        assert!(session.last_error().is_none());
        assert!(matches!(session.ready(), Err(TechDebtError::NotInitialized)));
    }
}
