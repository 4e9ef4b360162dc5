//! Configuration management for the SQL workspace.
//!
//! Handles loading configuration from TOML files and environment variables,
//! with support for named SQL service endpoints.

use crate::error::{Result, WorkspaceError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Built-in service URL used when nothing else is configured.
pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000";

/// Environment variable consulted when no URL was given explicitly.
pub const SERVICE_URL_ENV: &str = "SQL_WORKSPACE_URL";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Named service endpoints.
    #[serde(default)]
    pub services: HashMap<String, ServiceConfig>,
}

/// Connection settings for one SQL service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Base URL of the service (e.g. `http://127.0.0.1:5000`).
    pub url: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServiceConfig {
    /// Creates a config pointing at the given URL with the default timeout.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Fills in the URL from `SQL_WORKSPACE_URL` if none was set.
    pub fn apply_env_defaults(&mut self) {
        if self.url.is_none() {
            self.url = std::env::var(SERVICE_URL_ENV).ok();
        }
    }

    /// Returns the validated base URL, without a trailing slash.
    pub fn base_url(&self) -> Result<String> {
        let raw = self.url.as_deref().unwrap_or(DEFAULT_SERVICE_URL);
        let url = Url::parse(raw)
            .map_err(|e| WorkspaceError::config(format!("Invalid service URL '{raw}': {e}")))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(WorkspaceError::config(format!(
                "Invalid scheme '{}'. Expected 'http' or 'https'",
                url.scheme()
            )));
        }

        Ok(raw.trim_end_matches('/').to_string())
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sql-workspace")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| WorkspaceError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            WorkspaceError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Gets a named service, or the `default` service if name is None.
    pub fn get_service(&self, name: Option<&str>) -> Option<&ServiceConfig> {
        self.services.get(name.unwrap_or("default"))
    }

    /// Resolves the effective service settings.
    ///
    /// Precedence: explicit URL, named service, `default` service,
    /// `SQL_WORKSPACE_URL`, built-in default.
    pub fn resolve_service(&self, url: Option<&str>, name: Option<&str>) -> Result<ServiceConfig> {
        let mut service = match name {
            Some(n) => self
                .get_service(Some(n))
                .cloned()
                .ok_or_else(|| {
                    WorkspaceError::config(format!("Service '{n}' not found in config file"))
                })?,
            None => self.get_service(None).cloned().unwrap_or_default(),
        };

        if let Some(url) = url {
            service.url = Some(url.to_string());
        }
        service.apply_env_defaults();

        // Surface a bad URL at startup rather than on the first request
        service.base_url()?;
        Ok(service)
    }
}
