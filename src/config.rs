use std::fmt;
use std::time::Duration;

use crate::errors::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_RETRY_SECS: u64 = 600;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct Config {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
    /// Homework status endpoint. Set via HOMEWORK_ENDPOINT.
    pub endpoint: String,
    /// Telegram Bot API base URL. Set via TELEGRAM_API_URL.
    pub telegram_api_url: String,
    /// Fixed pause between poll cycles. Set via HOMEWORK_RETRY_SECS. Default: 600.
    pub retry_interval: Duration,
    /// Per-request timeout for both HTTP clients. Default: 30s.
    pub request_timeout: Duration,
}

// Tokens never reach the logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("practicum_token", &"[REDACTED]")
            .field("telegram_token", &"[REDACTED]")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("endpoint", &self.endpoint)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("retry_interval", &self.retry_interval)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Config {
    /// Build a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let practicum_token = get("PRACTICUM_TOKEN");
        let telegram_token = get("TELEGRAM_TOKEN");
        let telegram_chat_id = get("TELEGRAM_CHAT_ID");

        let (practicum_token, telegram_token, telegram_chat_id) =
            match (practicum_token, telegram_token, telegram_chat_id) {
                (Some(p), Some(t), Some(c)) => (p, t, c),
                (p, t, c) => {
                    let names = [
                        ("PRACTICUM_TOKEN", p.is_none()),
                        ("TELEGRAM_TOKEN", t.is_none()),
                        ("TELEGRAM_CHAT_ID", c.is_none()),
                    ]
                    .into_iter()
                    .filter(|(_, missing)| *missing)
                    .map(|(name, _)| name)
                    .collect();
                    return Err(ConfigError::MissingCredentials { names });
                }
            };

        let endpoint = get("HOMEWORK_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.into());
        check_url("HOMEWORK_ENDPOINT", &endpoint)?;

        let telegram_api_url = get("TELEGRAM_API_URL")
            .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.into())
            .trim_end_matches('/')
            .to_string();
        check_url("TELEGRAM_API_URL", &telegram_api_url)?;

        let retry_interval = secs(get("HOMEWORK_RETRY_SECS"), "HOMEWORK_RETRY_SECS", DEFAULT_RETRY_SECS)?;
        let request_timeout = secs(
            get("HOMEWORK_REQUEST_TIMEOUT_SECS"),
            "HOMEWORK_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        Ok(Config {
            practicum_token,
            telegram_token,
            telegram_chat_id,
            endpoint,
            telegram_api_url,
            retry_interval,
            request_timeout,
        })
    }
}

/// Load configuration from `.env` (if present) and the process environment.
pub fn load() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    Config::from_lookup(|key| std::env::var(key).ok())
}

fn check_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidValue {
            name,
            reason: e.to_string(),
        })
}

fn secs(raw: Option<String>, name: &'static str, default: u64) -> Result<Duration, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Duration::from_secs(default));
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            name,
            reason: "must be greater than zero".into(),
        }),
        Ok(n) => Ok(Duration::from_secs(n)),
        Err(e) => Err(ConfigError::InvalidValue {
            name,
            reason: format!("'{}': {}", raw, e),
        }),
    }
}
