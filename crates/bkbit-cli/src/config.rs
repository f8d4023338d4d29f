//! Configuration management for the bkbit CLI
//!
//! Settings come from the environment (a `.env` file is loaded first by the
//! binary) and can be overridden by command-line flags.

use crate::error::{CliError, Result};
use bkbit_translators::specimen::endpoints::DEFAULT_PORTAL_URL;
use bkbit_translators::taxonomy::{default_taxonomy_dir, TAXONOMY_DIR_ENV};
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Environment Variables
// ============================================================================

pub const SPECIMEN_PORTAL_URL_ENV: &str = "BKBIT_SPECIMEN_PORTAL_URL";

/// Bearer token for the specimen portal
pub const JWT_TOKEN_ENV: &str = "jwt_token";

pub const HTTP_TIMEOUT_ENV: &str = "BKBIT_HTTP_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct Config {
    pub specimen_portal_url: String,
    pub jwt_token: Option<String>,
    pub taxonomy_dir: PathBuf,
    /// Overrides the per-request timeouts of the specimen portal client
    pub http_timeout: Option<Duration>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            specimen_portal_url: DEFAULT_PORTAL_URL.to_string(),
            jwt_token: None,
            taxonomy_dir: default_taxonomy_dir(),
            http_timeout: None,
        }
    }

    /// Load config from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = lookup(SPECIMEN_PORTAL_URL_ENV) {
            config.specimen_portal_url = url;
        }
        config.jwt_token = lookup(JWT_TOKEN_ENV);
        if let Some(dir) = lookup(TAXONOMY_DIR_ENV) {
            config.taxonomy_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup(HTTP_TIMEOUT_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                CliError::config(format!("{} must be a whole number of seconds, got '{}'", HTTP_TIMEOUT_ENV, secs))
            })?;
            config.http_timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn set_specimen_portal_url(&mut self, url: String) {
        self.specimen_portal_url = url;
    }

    pub fn set_taxonomy_dir(&mut self, dir: PathBuf) {
        self.taxonomy_dir = dir;
    }

    /// The portal token, or an error telling the user how to provide it
    pub fn require_jwt_token(&self) -> Result<&str> {
        self.jwt_token.as_deref().ok_or(CliError::MissingToken)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
