use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::driver::web::{BrowserType, WebDriverConfig};

/// Locales the application under test serves
pub const SUPPORTED_LOCALES: [&str; 2] = ["de", "fr"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("base URL must start with http:// or https://, got '{0}'")]
    InvalidBaseUrl(String),
    #[error("unsupported locale '{0}' (expected one of: de, fr)")]
    UnsupportedLocale(String),
    #[error("unknown browser '{0}' (expected chromium, firefox or webkit)")]
    UnknownBrowser(String),
}

/// Test account for the identity-provider login
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Both fields are required; anything less selects the unauthenticated subset
    pub fn from_parts(email: Option<String>, password: Option<String>) -> Option<Self> {
        let email = email.unwrap_or_default();
        let password = password.unwrap_or_default();
        if email.is_empty() || password.is_empty() {
            None
        } else {
            Some(Self { email, password })
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Harness configuration
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Origin of the application under test, without trailing slash
    pub base_url: String,
    /// Locale path segment used for every route (e.g. "de")
    pub locale: String,
    pub credentials: Option<Credentials>,
    /// Where diagnostic screenshots are written
    pub artifacts_dir: PathBuf,
    /// Where JSON and JUnit reports are written, if anywhere
    pub report_dir: Option<PathBuf>,
    pub browser: WebDriverConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            locale: "de".to_string(),
            credentials: None,
            artifacts_dir: PathBuf::from("/tmp"),
            report_dir: None,
            browser: WebDriverConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Validate and normalize raw settings
    pub fn new(
        base_url: &str,
        locale: &str,
        credentials: Option<Credentials>,
        artifacts_dir: &Path,
    ) -> Result<Self, ConfigError> {
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(base_url.to_string()));
        }
        if !SUPPORTED_LOCALES.contains(&locale) {
            return Err(ConfigError::UnsupportedLocale(locale.to_string()));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            locale: locale.to_string(),
            credentials,
            artifacts_dir: artifacts_dir.to_path_buf(),
            ..Self::default()
        })
    }

    /// Absolute URL for an application path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Absolute URL for a path below the locale segment, e.g. "/communities"
    pub fn localized_url(&self, path: &str) -> String {
        self.url(&format!("/{}{}", self.locale, path))
    }

    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.artifacts_dir.join(file_name)
    }

    pub fn auth_enabled(&self) -> bool {
        self.credentials.is_some()
    }
}

/// Parse a browser name as accepted on the command line
pub fn parse_browser(name: &str) -> Result<BrowserType, ConfigError> {
    match name.trim().to_lowercase().as_str() {
        "chromium" | "chrome" => Ok(BrowserType::Chromium),
        "firefox" => Ok(BrowserType::Firefox),
        "webkit" => Ok(BrowserType::Webkit),
        _ => Err(ConfigError::UnknownBrowser(name.to_string())),
    }
}
