/*
 * Responsibility
 * - 環境変数や設定の読み込み (API base address, timeout, storage path, 401 policy)
 * - 設定値のバリデーション (不正なら起動失敗)
 */
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_API_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_STORAGE_PATH: &str = ".portal-client/storage.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub app_env: AppEnv,

    pub api_base_url: Url,
    pub api_timeout: Duration,

    // Persistent client storage (holds the credential under the `token` key)
    pub storage_path: PathBuf,

    // On HTTP 401: clear the credential (true) or only report it (false)
    pub clear_credential_on_unauthorized: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, map in tests, ...).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let api_base_url = lookup("API_BASE_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_base_url =
            Url::parse(&api_base_url).map_err(|_| ConfigError::Invalid("API_BASE_URL"))?;
        if !matches!(api_base_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid("API_BASE_URL"));
        }

        let api_timeout_ms = match lookup("API_TIMEOUT_MS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("API_TIMEOUT_MS"))?,
            None => DEFAULT_API_TIMEOUT_MS,
        };
        if api_timeout_ms == 0 {
            return Err(ConfigError::Invalid("API_TIMEOUT_MS"));
        }

        let storage_path = lookup("PORTAL_STORAGE_PATH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH));

        let clear_credential_on_unauthorized = match lookup("CLEAR_CREDENTIAL_ON_UNAUTHORIZED") {
            Some(v) => parse_bool(&v).ok_or(ConfigError::Invalid("CLEAR_CREDENTIAL_ON_UNAUTHORIZED"))?,
            None => false,
        };

        Ok(Self {
            app_env,
            api_base_url,
            api_timeout: Duration::from_millis(api_timeout_ms),
            storage_path,
            clear_credential_on_unauthorized,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.api_base_url.as_str(), "http://127.0.0.1:8000/api");
        assert_eq!(config.api_timeout, Duration::from_millis(5000));
        assert_eq!(config.storage_path, PathBuf::from(DEFAULT_STORAGE_PATH));
        assert!(!config.clear_credential_on_unauthorized);
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("APP_ENV", "PROD"),
            ("API_BASE_URL", "https://portal.example.com/api"),
            ("API_TIMEOUT_MS", "1500"),
            ("PORTAL_STORAGE_PATH", "/tmp/portal.json"),
            ("CLEAR_CREDENTIAL_ON_UNAUTHORIZED", "yes"),
        ])
        .unwrap();

        assert!(config.app_env.is_production());
        assert_eq!(config.api_base_url.host_str(), Some("portal.example.com"));
        assert_eq!(config.api_timeout, Duration::from_millis(1500));
        assert_eq!(config.storage_path, PathBuf::from("/tmp/portal.json"));
        assert!(config.clear_credential_on_unauthorized);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_eq!(
            config(&[("API_BASE_URL", "not a url")]).unwrap_err(),
            ConfigError::Invalid("API_BASE_URL")
        );
        assert_eq!(
            config(&[("API_BASE_URL", "ftp://example.com")]).unwrap_err(),
            ConfigError::Invalid("API_BASE_URL")
        );
        assert_eq!(
            config(&[("API_TIMEOUT_MS", "0")]).unwrap_err(),
            ConfigError::Invalid("API_TIMEOUT_MS")
        );
        assert_eq!(
            config(&[("API_TIMEOUT_MS", "soon")]).unwrap_err(),
            ConfigError::Invalid("API_TIMEOUT_MS")
        );
        assert_eq!(
            config(&[("CLEAR_CREDENTIAL_ON_UNAUTHORIZED", "maybe")]).unwrap_err(),
            ConfigError::Invalid("CLEAR_CREDENTIAL_ON_UNAUTHORIZED")
        );
    }
}
