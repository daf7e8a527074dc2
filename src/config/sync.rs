// src/config/sync.rs
use std::str::FromStr;
use std::time::Duration;

use crate::error::SyncError;

pub const ENV_OURA_TOKEN: &str = "OURA_ACCESS_TOKEN";
pub const ENV_NOTION_TOKEN: &str = "NOTION_TOKEN";
pub const ENV_NOTION_DATABASE_ID: &str = "NOTION_DATABASE_ID";

pub const ENV_WINDOW_DAYS: &str = "SYNC_WINDOW_DAYS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "SYNC_HTTP_TIMEOUT_SECS";
pub const ENV_HTTP_RETRIES: &str = "SYNC_HTTP_RETRIES";
pub const ENV_HTTP_BACKOFF_MS: &str = "SYNC_HTTP_BACKOFF_MS";
pub const ENV_OURA_API_BASE: &str = "OURA_API_BASE";
pub const ENV_NOTION_API_BASE: &str = "NOTION_API_BASE";
pub const ENV_NOTION_VERSION: &str = "NOTION_VERSION";

pub const DEFAULT_WINDOW_DAYS: u32 = 7;
pub const MAX_WINDOW_DAYS: u32 = 90;
pub const DEFAULT_OURA_API_BASE: &str = "https://api.ouraring.com";
pub const DEFAULT_NOTION_API_BASE: &str = "https://api.notion.com";
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// Timeout and retry budget shared by both API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpPolicy {
    pub timeout: Duration,
    /// Extra attempts after the first one, for transient failures only.
    pub retries: u8,
    /// Delay before the first retry; doubled for each following one.
    pub backoff: Duration,
}

impl Default for HttpPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retries: 2,
            backoff: Duration::from_millis(500),
        }
    }
}

impl HttpPolicy {
    /// Delay before retry number `retry` (1-based).
    pub fn backoff_for(&self, retry: u8) -> Duration {
        let shift = u32::from(retry.saturating_sub(1)).min(16);
        self.backoff.saturating_mul(1u32 << shift)
    }
}

/// Everything the job needs, read once at startup and passed by reference.
#[derive(Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub oura_token: String,
    pub notion_token: String,
    pub notion_database_id: String,
    pub window_days: u32,
    pub http: HttpPolicy,
    pub oura_api_base: String,
    pub notion_api_base: String,
    pub notion_version: String,
}

// Tokens stay out of logs.
impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("oura_token_len", &self.oura_token.len())
            .field("notion_token_len", &self.notion_token.len())
            .field("notion_database_id", &self.notion_database_id)
            .field("window_days", &self.window_days)
            .field("http", &self.http)
            .field("oura_api_base", &self.oura_api_base)
            .field("notion_api_base", &self.notion_api_base)
            .field("notion_version", &self.notion_version)
            .finish()
    }
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any key lookup. All three required variables are checked
    /// before returning, so one error names every missing one.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut missing = Vec::new();
        let mut required = |name: &'static str| {
            let v = get(name);
            if v.is_none() {
                missing.push(name);
            }
            v.unwrap_or_default()
        };
        let oura_token = required(ENV_OURA_TOKEN);
        let notion_token = required(ENV_NOTION_TOKEN);
        let notion_database_id = required(ENV_NOTION_DATABASE_ID);
        if !missing.is_empty() {
            return Err(SyncError::MissingConfig(missing));
        }

        let window_days = parse_or(get(ENV_WINDOW_DAYS), ENV_WINDOW_DAYS, DEFAULT_WINDOW_DAYS)?;
        if !(1..=MAX_WINDOW_DAYS).contains(&window_days) {
            return Err(SyncError::InvalidConfig {
                name: ENV_WINDOW_DAYS,
                value: window_days.to_string(),
                reason: format!("must be between 1 and {MAX_WINDOW_DAYS}"),
            });
        }

        let defaults = HttpPolicy::default();
        let timeout_secs: u64 = parse_or(
            get(ENV_HTTP_TIMEOUT_SECS),
            ENV_HTTP_TIMEOUT_SECS,
            defaults.timeout.as_secs(),
        )?;
        if timeout_secs == 0 {
            return Err(SyncError::InvalidConfig {
                name: ENV_HTTP_TIMEOUT_SECS,
                value: "0".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        let retries: u8 = parse_or(get(ENV_HTTP_RETRIES), ENV_HTTP_RETRIES, defaults.retries)?;
        let backoff_ms: u64 = parse_or(
            get(ENV_HTTP_BACKOFF_MS),
            ENV_HTTP_BACKOFF_MS,
            defaults.backoff.as_millis() as u64,
        )?;

        Ok(Self {
            oura_token,
            notion_token,
            notion_database_id,
            window_days,
            http: HttpPolicy {
                timeout: Duration::from_secs(timeout_secs),
                retries,
                backoff: Duration::from_millis(backoff_ms),
            },
            oura_api_base: base_url(get(ENV_OURA_API_BASE), DEFAULT_OURA_API_BASE),
            notion_api_base: base_url(get(ENV_NOTION_API_BASE), DEFAULT_NOTION_API_BASE),
            notion_version: get(ENV_NOTION_VERSION)
                .unwrap_or_else(|| DEFAULT_NOTION_VERSION.to_string()),
        })
    }
}

fn parse_or<T>(raw: Option<String>, name: &'static str, default: T) -> Result<T, SyncError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(v) => v.parse().map_err(|e: T::Err| SyncError::InvalidConfig {
            name,
            value: v.clone(),
            reason: e.to_string(),
        }),
    }
}

fn base_url(raw: Option<String>, default: &str) -> String {
    raw.unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}
