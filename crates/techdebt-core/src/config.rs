// SPDX-License-Identifier: Apache-2.0

//! Configuration management for Techdebt.
//!
//! Provides layered configuration from files and environment variables.
//! Uses XDG-compliant paths with environment variable support.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables (prefix: `TECHDEBT_`)
//! 2. Config file: `~/.config/techdebt/config.toml`
//! 3. Built-in defaults
//!
//! # Examples
//!
//! ```bash
//! # Use a different label for tracked issues
//! TECHDEBT_ISSUES__LABEL=debt techdebt issue list
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::TechDebtError;

/// Label applied to every issue created through Techdebt.
pub const DEFAULT_LABEL: &str = "tech-debt";

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// GitHub API settings.
    pub github: GitHubConfig,
    /// Retry settings for transient network failures.
    pub retry: RetryConfig,
    /// Issue settings.
    pub issues: IssuesConfig,
}

impl AppConfig {
    /// Rejects values that would make every request or handshake fail.
    ///
    /// # Errors
    ///
    /// Returns `TechDebtError::Config` naming the first offending key.
    pub fn validate(&self) -> Result<(), TechDebtError> {
        let checks = [
            ("github.api_timeout_seconds", self.github.api_timeout_seconds == 0),
            ("github.auth_timeout_seconds", self.github.auth_timeout_seconds == 0),
            ("retry.max_attempts", self.retry.max_attempts == 0),
        ];
        match checks.iter().find(|(_, invalid)| *invalid) {
            Some((key, _)) => Err(TechDebtError::Config {
                message: format!("{key} must be at least 1"),
            }),
            None => Ok(()),
        }
    }
}

/// GitHub API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// API request timeout in seconds.
    pub api_timeout_seconds: u64,
    /// Upper bound on credential acquisition, in seconds.
    pub auth_timeout_seconds: u64,
    /// REST base URL for GitHub Enterprise (defaults to api.github.com).
    pub api_base_url: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_timeout_seconds: 10,
            auth_timeout_seconds: 30,
            api_base_url: None,
        }
    }
}

impl GitHubConfig {
    /// Per-request timeout.
    #[must_use]
    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_seconds)
    }

    /// Credential acquisition timeout.
    #[must_use]
    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_seconds)
    }
}

/// Retry settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per request, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds; doubles afterwards.
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

/// Issue settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IssuesConfig {
    /// Label that marks an issue as tech debt.
    pub label: String,
    /// Page size for list and search requests (GitHub caps this at 100).
    pub per_page: u8,
}

impl Default for IssuesConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            per_page: 100,
        }
    }
}

impl IssuesConfig {
    /// Page size clamped to the range GitHub accepts.
    #[must_use]
    pub fn page_size(&self) -> u8 {
        self.per_page.clamp(1, 100)
    }
}

/// Returns the Techdebt configuration directory.
///
/// Respects the `XDG_CONFIG_HOME` environment variable if set,
/// otherwise defaults to `~/.config/techdebt`. Returns `None` when no home
/// directory can be determined.
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        return Some(PathBuf::from(xdg_config).join("techdebt"));
    }
    dirs::home_dir().map(|home| home.join(".config").join("techdebt"))
}

/// Returns the path to the configuration file.
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Load application configuration.
///
/// Loads from config file (if exists) and environment variables.
/// Environment variables use the prefix `TECHDEBT_` and double underscore
/// for nested keys (e.g., `TECHDEBT_GITHUB__API_TIMEOUT_SECONDS`).
///
/// # Errors
///
/// Returns `TechDebtError::Config` if the config file exists but is invalid,
/// or if a timeout or attempt count is zero.
pub fn load_config() -> Result<AppConfig, TechDebtError> {
    let mut builder = Config::builder();

    if let Some(config_path) = config_file_path() {
        builder = builder
            .add_source(File::with_name(config_path.to_string_lossy().as_ref()).required(false));
    }

    let config = builder
        .add_source(
            Environment::with_prefix("TECHDEBT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;
    app_config.validate()?;

    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_load_config_defaults() {
        // Without any config file or env vars, should return defaults
        let config = load_config().expect("should load with defaults");

        assert_eq!(config.github.api_timeout_seconds, 10);
        assert_eq!(config.github.auth_timeout_seconds, 30);
        assert!(config.github.api_base_url.is_none());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_ms, 1000);
        assert_eq!(config.issues.label, "tech-debt");
    }

    #[test]
    #[serial]
    fn test_env_overrides_nested_keys() {
        // SAFETY: serialized with other env-mutating tests.
        unsafe {
            std::env::set_var("TECHDEBT_ISSUES__LABEL", "debt");
            std::env::set_var("TECHDEBT_GITHUB__API_TIMEOUT_SECONDS", "5");
        }

        let config = load_config();

        unsafe {
            std::env::remove_var("TECHDEBT_ISSUES__LABEL");
            std::env::remove_var("TECHDEBT_GITHUB__API_TIMEOUT_SECONDS");
        }

        let config = config.expect("should load with env overrides");
        assert_eq!(config.issues.label, "debt");
        assert_eq!(config.github.api_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_config_file_path() {
        if let Some(path) = config_file_path() {
            assert!(path.ends_with("techdebt/config.toml"));
        }
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config_str = r#"
[github]
api_base_url = "https://ghe.example.com/api/v3"

[retry]
max_attempts = 5
"#;

        let config = Config::builder()
            .add_source(config::File::from_str(config_str, config::FileFormat::Toml))
            .build()
            .expect("should build config");

        let app_config: AppConfig = config.try_deserialize().expect("should deserialize");

        assert_eq!(
            app_config.github.api_base_url.as_deref(),
            Some("https://ghe.example.com/api/v3")
        );
        assert_eq!(app_config.github.api_timeout_seconds, 10);
        assert_eq!(app_config.retry.max_attempts, 5);
        assert_eq!(app_config.retry.base_delay_ms, 1000);
        assert_eq!(app_config.issues.label, DEFAULT_LABEL);
    }

    #[test]
    fn test_page_size_is_clamped() {
        let mut issues = IssuesConfig::default();
        assert_eq!(issues.page_size(), 100);

        issues.per_page = 0;
        assert_eq!(issues.page_size(), 1);

        issues.per_page = 250;
        assert_eq!(issues.page_size(), 100);
    }

    #[test]
    fn test_validate_rejects_zero_timeouts() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.github.api_timeout_seconds = 0;
        assert_eq!(
            config.validate().unwrap_err(),
            TechDebtError::Config {
                message: "github.api_timeout_seconds must be at least 1".to_string(),
            }
        );

        config.github.api_timeout_seconds = 1;
        config.github.auth_timeout_seconds = 0;
        assert_eq!(
            config.validate().unwrap_err(),
            TechDebtError::Config {
                message: "github.auth_timeout_seconds must be at least 1".to_string(),
            }
        );
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = AppConfig::default();
        config.retry.max_attempts = 0;
        assert!(matches!(config.validate(), Err(TechDebtError::Config { .. })));
    }

    #[test]
    #[serial]
    fn test_zero_timeout_from_env_is_rejected() {
        // SAFETY: serialized with other env-mutating tests.
        unsafe {
            std::env::set_var("TECHDEBT_GITHUB__AUTH_TIMEOUT_SECONDS", "0");
        }

        let result = load_config();

        unsafe {
            std::env::remove_var("TECHDEBT_GITHUB__AUTH_TIMEOUT_SECONDS");
        }

        assert!(matches!(result, Err(TechDebtError::Config { .. })));
    }
}
