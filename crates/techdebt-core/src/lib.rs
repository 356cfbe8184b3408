// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # Techdebt Core
//!
//! Core library for tracking tech debt as labeled GitHub issues.
//!
//! This crate provides reusable components for:
//! - Resolving the GitHub repository from local Git configuration
//! - A coalesced, timeout-bounded session lifecycle (credential + repository)
//! - Validated request wrappers with retry for transient network failures
//! - Configuration management
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use techdebt_core::{FilterSpec, RepositoryResolver, Session, TokenChain, load_config};
//!
//! # async fn example() -> techdebt_core::Result<()> {
//! let session = Session::builder()
//!     .credentials(Arc::new(TokenChain))
//!     .resolver(RepositoryResolver::for_workspace(Path::new("."), None))
//!     .config(load_config()?)
//!     .build();
//!
//! session.initialize().await?;
//!
//! let created = session.create_issue("Replace legacy parser", "").await?;
//! println!("Created #{}", created.number);
//!
//! for issue in session.list_issues(&FilterSpec::default()).await? {
//!     println!("#{} {}", issue.number, issue.title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`repository`] - Repository identity and remote URL resolution
//! - [`session`] - Session lifecycle
//! - [`issues`] - Request wrappers
//! - [`github`] - GitHub API seam and octocrab implementation
//! - [`config`] - Configuration loading and paths
//! - [`error`] - Error types

// ============================================================================
// Authentication
// ============================================================================

pub use auth::{CredentialProvider, ISSUE_SCOPES, TokenChain, TokenSource};

// ============================================================================
// Error Handling
// ============================================================================

pub use error::{ErrorKind, TechDebtError};

/// Convenience Result type for Techdebt operations.
///
/// This is equivalent to `std::result::Result<T, TechDebtError>`.
pub type Result<T> = std::result::Result<T, TechDebtError>;

// ============================================================================
// Configuration
// ============================================================================

pub use config::{
    AppConfig, DEFAULT_LABEL, GitHubConfig, IssuesConfig, RetryConfig, config_dir,
    config_file_path, load_config,
};

// ============================================================================
// Repository Resolution
// ============================================================================

pub use repository::{
    GitConfigCommand, GitConfigFile, GitRemoteCommand, GitRemoteReader, ManualPrompt,
    PromptField, RepositoryIdentity, RepositoryResolver, parse_github_url,
};

// ============================================================================
// Session & Issues
// ============================================================================

pub use github::{IssueTracker, OctocrabFactory, OctocrabTracker, TrackerFactory};
pub use session::{Session, SessionStatus};
pub use types::{
    FilterSpec, IssueComment, IssueDetails, IssueEdit, IssueQuery, IssueRef, IssueState,
    NewIssue, StateFilter,
};

// ============================================================================
// Sanitization
// ============================================================================

pub use sanitize::{escape_for_display, parse_issue_number, sanitize_path_component};

// ============================================================================
// Retry Logic
// ============================================================================

pub use retry::{retry_backoff, with_retry};

// ============================================================================
// Modules
// ============================================================================

pub mod auth;
pub mod config;
pub mod error;
pub mod github;
pub mod issues;
pub mod repository;
pub mod retry;
pub mod sanitize;
pub mod session;
pub mod types;
