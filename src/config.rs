use std::env;
use std::fmt;
use std::time::Duration;

use anyhow::{Context, bail};

pub const DEFAULT_BASE_URL: &str = "https://api.hevyapp.com";
pub const DEFAULT_X_API_KEY: &str = "shelobs_hevy_web";
pub const DEFAULT_NAME: &str = "Hevy";
pub const DEFAULT_WORKOUTS_COUNT: u32 = 5;
pub const DEFAULT_SCAN_INTERVAL_MINUTES: u64 = 60;
pub const DEFAULT_PORT: &str = "3000";

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    ApiKey { api_key: String },
    Token {
        auth_token: String,
        username: String,
        x_api_key: String,
    },
}

// Secrets never end up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ApiKey { .. } => f
                .debug_struct("ApiKey")
                .field("api_key", &"<redacted>")
                .finish(),
            Credentials::Token {
                username,
                x_api_key,
                ..
            } => f
                .debug_struct("Token")
                .field("auth_token", &"<redacted>")
                .field("username", username)
                .field("x_api_key", x_api_key)
                .finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub hevy_api_url: String,
    pub name: String,
    pub scan_interval: Duration,
    pub workouts_page_size: u32,
    pub port: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let credentials = match (
            var("HEVY_API_KEY"),
            var("HEVY_AUTH_TOKEN"),
            var("HEVY_USERNAME"),
        ) {
            (Some(api_key), _, _) => Credentials::ApiKey { api_key },
            (None, Some(auth_token), Some(username)) => Credentials::Token {
                auth_token,
                username,
                x_api_key: var("HEVY_X_API_KEY").unwrap_or_else(|| DEFAULT_X_API_KEY.to_string()),
            },
            (None, Some(_), None) => bail!("HEVY_USERNAME is required with HEVY_AUTH_TOKEN"),
            (None, None, _) => bail!("either HEVY_API_KEY or HEVY_AUTH_TOKEN must be set"),
        };

        let scan_interval_minutes = match var("SCAN_INTERVAL_MINUTES") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("invalid SCAN_INTERVAL_MINUTES: {}", raw))?,
            None => DEFAULT_SCAN_INTERVAL_MINUTES,
        };
        if scan_interval_minutes == 0 {
            bail!("SCAN_INTERVAL_MINUTES must be greater than zero");
        }

        let workouts_page_size = match var("WORKOUTS_PAGE_SIZE") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("invalid WORKOUTS_PAGE_SIZE: {}", raw))?,
            None => DEFAULT_WORKOUTS_COUNT,
        };
        if workouts_page_size == 0 {
            bail!("WORKOUTS_PAGE_SIZE must be greater than zero");
        }

        Ok(Self {
            credentials,
            hevy_api_url: var("BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            name: var("HEVY_NAME").unwrap_or_else(|| DEFAULT_NAME.to_string()),
            scan_interval: Duration::from_secs(scan_interval_minutes * 60),
            workouts_page_size,
            port: var("PORT").unwrap_or_else(|| DEFAULT_PORT.to_string()),
        })
    }
}
