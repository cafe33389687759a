use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::filter::LeadFilter;

pub const ENV_API_URL: &str = "LEADBOARD_API_URL";
pub const ENV_USERNAME: &str = "LEADBOARD_USERNAME";
pub const ENV_PASSWORD: &str = "LEADBOARD_PASSWORD";

/// Top-level configuration loaded from `~/.leadboard/config.toml`.
///
/// Passwords are never stored here; see [`Config::password_from_env`].
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config from `~/.leadboard/config.toml`, falling back to defaults
    /// when the file does not exist. Env overrides are applied afterwards.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        let mut cfg = if path.exists() {
            Self::read(&path)?
        } else {
            Config::default()
        };
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a specific path. No env overrides.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let cfg = Self::read(&path.into())?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        self.validate()?;
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Write the config, creating the parent directory if needed.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = self.to_toml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        std::fs::write(path, text).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Apply `LEADBOARD_API_URL` / `LEADBOARD_USERNAME`. The lookup is
    /// injected so tests do not touch the process environment.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.backend.url = url.trim().to_string();
        }
        if let Some(user) = lookup(ENV_USERNAME).filter(|v| !v.trim().is_empty()) {
            self.auth.username = Some(user.trim().to_string());
        }
    }

    pub fn password_from_env() -> Option<String> {
        std::env::var(ENV_PASSWORD).ok().filter(|p| !p.is_empty())
    }

    /// Semantic validation for settings that are not fully expressible via type checks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend.validate()?;
        self.ui.validate()?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".leadboard")
            .join("config.toml")
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(String),
    #[error("parse: {0}")]
    Parse(String),
    #[error("validation: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Section structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub url: String,
    /// No timeout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            request_timeout_secs: None,
        }
    }
}

fn default_backend_url() -> String {
    "http://127.0.0.1:8001".into()
}

impl BackendConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(ConfigError::Validation("backend.url must not be empty".into()));
        }
        let parsed = url::Url::parse(url)
            .map_err(|e| ConfigError::Validation(format!("backend.url '{url}' is invalid: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "backend.url must use http or https (got '{url}')"
            )));
        }
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(ConfigError::Validation(format!("backend.url has no host: '{url}'")));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(ConfigError::Validation(format!(
                "backend.url must not carry a query or fragment: '{url}'"
            )));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "backend.request_timeout_secs must be positive (omit it for no timeout)".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ReportsConfig {
    /// Current directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl ReportsConfig {
    pub fn dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    #[serde(default = "default_filter_name")]
    pub default_filter: String,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_filter: default_filter_name(),
            tick_ms: default_tick_ms(),
        }
    }
}

fn default_filter_name() -> String {
    "all".into()
}
fn default_tick_ms() -> u64 {
    250
}

impl UiConfig {
    pub fn filter(&self) -> LeadFilter {
        self.default_filter.parse().unwrap_or_default()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.default_filter
            .parse::<LeadFilter>()
            .map_err(|e| ConfigError::Validation(format!("ui.default_filter: {e}")))?;
        if self.tick_ms == 0 {
            return Err(ConfigError::Validation("ui.tick_ms must be > 0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.backend.url, "http://127.0.0.1:8001");
        assert_eq!(cfg.backend.request_timeout_secs, None);
        assert_eq!(cfg.ui.filter(), LeadFilter::All);
    }

    #[test]
    fn env_overrides_url_and_username() {
        let mut cfg = Config::default();
        cfg.apply_env_overrides(|key| match key {
            ENV_API_URL => Some("https://crm.example.com ".into()),
            ENV_USERNAME => Some("ana".into()),
            _ => None,
        });
        assert_eq!(cfg.backend.url, "https://crm.example.com");
        assert_eq!(cfg.auth.username.as_deref(), Some("ana"));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut cfg = Config::default();
        cfg.apply_env_overrides(|_| Some("  ".into()));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn rejects_bad_url_filter_and_tick() {
        let mut cfg = Config::default();
        cfg.backend.url = "localhost:8001".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));

        for bad in [
            "http://",
            "http://:8001",
            "http://bad host:8001",
            "http://127.0.0.1:99999",
            "ftp://crm.example.com",
            "http://crm.example.com/?token=x",
        ] {
            let mut cfg = Config::default();
            cfg.backend.url = bad.into();
            assert!(
                matches!(cfg.validate(), Err(ConfigError::Validation(_))),
                "{bad} should be rejected"
            );
        }

        let mut cfg = Config::default();
        cfg.backend.url = "https://crm.example.com:8443/base/".into();
        assert!(cfg.validate().is_ok());

        let mut cfg = Config::default();
        cfg.ui.default_filter = "lukewarm".into();
        assert!(cfg.validate().unwrap_err().to_string().contains("ui.default_filter"));

        let mut cfg = Config::default();
        cfg.ui.tick_ms = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.backend.request_timeout_secs = Some(0);
        assert!(cfg.validate().is_err());
    }
}
