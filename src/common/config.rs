use crate::common::types::{PelotonError, PelotonResult};
use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.onepeloton.com";
pub const DEFAULT_PLATFORM: &str = "web";
pub const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_millis(100);
// Retries are opt-in; a failed request surfaces on the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 0;

pub const USERNAME_VAR: &str = "PELOTON_USERNAME";
pub const PASSWORD_VAR: &str = "PELOTON_PASSWORD";

/// Username/email and password for a single account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> PelotonResult<Self> {
        let username = username.into();
        let password = password.into();

        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(PelotonError::Configuration(format!(
                "Username and password required. Provide as arguments or set \
                 {USERNAME_VAR} and {PASSWORD_VAR} environment variables."
            )));
        }

        Ok(Self { username, password })
    }

    /// Explicit values win; missing ones fall back to the environment.
    pub fn resolve(username: Option<String>, password: Option<String>) -> PelotonResult<Self> {
        Self::resolve_with(username, password, |key| env::var(key).ok())
    }

    pub fn from_env() -> PelotonResult<Self> {
        Self::resolve(None, None)
    }

    pub fn resolve_with<F>(
        username: Option<String>,
        password: Option<String>,
        lookup: F,
    ) -> PelotonResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = username
            .filter(|u| !u.is_empty())
            .or_else(|| lookup(USERNAME_VAR))
            .unwrap_or_default();
        let password = password
            .filter(|p| !p.is_empty())
            .or_else(|| lookup(PASSWORD_VAR))
            .unwrap_or_default();

        Self::new(username, password)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

// Keep the password out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub platform: String,
    pub min_request_interval: Duration,
    pub max_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("peloton-history/{}", env!("CARGO_PKG_VERSION")),
            platform: DEFAULT_PLATFORM.to_string(),
            min_request_interval: DEFAULT_REQUEST_INTERVAL,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }

    /// Defaults overridden by `PELOTON_BASE_URL`, `PELOTON_REQUEST_INTERVAL_MS`
    /// and `PELOTON_MAX_RETRIES` when set.
    pub fn from_env() -> PelotonResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> PelotonResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup("PELOTON_BASE_URL").filter(|v| !v.is_empty()) {
            config = config.with_base_url(base_url);
        }

        if let Some(raw) = lookup("PELOTON_REQUEST_INTERVAL_MS") {
            let millis: u64 = raw.parse().map_err(|_| {
                PelotonError::Configuration(format!(
                    "PELOTON_REQUEST_INTERVAL_MS must be a whole number of milliseconds, got {raw:?}"
                ))
            })?;
            config.min_request_interval = Duration::from_millis(millis);
        }

        if let Some(raw) = lookup("PELOTON_MAX_RETRIES") {
            config.max_retries = raw.parse().map_err(|_| {
                PelotonError::Configuration(format!(
                    "PELOTON_MAX_RETRIES must be a non-negative integer, got {raw:?}"
                ))
            })?;
        }

        Ok(config)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_or_empty_credentials_rejected() {
        let cases = [
            (None, None),
            (Some("rider@example.com"), None),
            (None, Some("secret")),
            (Some(""), Some("secret")),
            (Some("rider@example.com"), Some("")),
            (Some("   "), Some("secret")),
            (Some("rider@example.com"), Some(" \t ")),
        ];

        for (username, password) in cases {
            let result = Credentials::resolve_with(
                username.map(String::from),
                password.map(String::from),
                env_of(&[]),
            );
            assert!(
                matches!(result, Err(PelotonError::Configuration(_))),
                "expected configuration error for {username:?}/{password:?}"
            );
        }
    }

    #[test]
    fn test_credentials_fall_back_to_environment() {
        let lookup = env_of(&[(USERNAME_VAR, "env-user"), (PASSWORD_VAR, "env-pass")]);

        let creds = Credentials::resolve_with(None, None, &lookup).unwrap();
        assert_eq!(creds.username(), "env-user");
        assert_eq!(creds.password(), "env-pass");

        let creds = Credentials::resolve_with(Some("arg-user".into()), None, &lookup).unwrap();
        assert_eq!(creds.username(), "arg-user");
        assert_eq!(creds.password(), "env-pass");
    }

    #[test]
    fn test_debug_hides_password() {
        let creds = Credentials::new("rider", "hunter2").unwrap();
        let printed = format!("{creds:?}");
        assert!(printed.contains("rider"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_config_from_lookup() {
        let config = ClientConfig::from_lookup(env_of(&[
            ("PELOTON_BASE_URL", "http://localhost:8080/"),
            ("PELOTON_REQUEST_INTERVAL_MS", "250"),
            ("PELOTON_MAX_RETRIES", "3"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.url("/api/me"), "http://localhost:8080/api/me");
        assert_eq!(config.min_request_interval, Duration::from_millis(250));
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_config_defaults_and_bad_values() {
        let config = ClientConfig::from_lookup(env_of(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.platform, "web");
        assert_eq!(config.min_request_interval, Duration::from_millis(100));
        assert_eq!(config.max_retries, 0);

        let bad = ClientConfig::from_lookup(env_of(&[("PELOTON_MAX_RETRIES", "lots")]));
        assert!(matches!(bad, Err(PelotonError::Configuration(_))));
    }
}
