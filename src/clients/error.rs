use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HevyApiError {
    #[error("Invalid authentication token (status {status})")]
    Authentication { status: StatusCode },

    #[error("Timeout error fetching information - {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("Error fetching information - {0}")]
    Transport(#[source] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Something really wrong happened! - {0}")]
    Client(String),
}

pub type Result<T> = std::result::Result<T, HevyApiError>;

impl HevyApiError {
    pub fn client(msg: impl Into<String>) -> Self {
        Self::Client(msg.into())
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    pub fn is_communication(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Transport(_) | Self::Status { .. }
        )
    }

    #[cfg(test)]
    pub fn is_client(&self) -> bool {
        matches!(self, Self::Client(_))
    }

    pub fn kind(&self) -> &'static str {
        if self.is_authentication() {
            "authentication"
        } else if self.is_communication() {
            "communication"
        } else {
            "client"
        }
    }
}

impl From<reqwest::Error> for HevyApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err)
        } else if err.is_connect() || err.is_request() || err.is_body() || err.is_status() {
            Self::Transport(err)
        } else {
            Self::Client(err.to_string())
        }
    }
}

impl From<serde_json::Error> for HevyApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Client(format!("Failed to parse response: {}", err))
    }
}
