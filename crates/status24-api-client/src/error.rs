use thiserror::Error;

/// Shown when a failure carries nothing the user can act on.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum ClientError {
    /// The draft was rejected locally; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// A request for the same target is still in flight.
    #[error("A request for {0} is already in progress")]
    Busy(String),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; `detail` is the server's explanation when it sent one.
    #[error("API request failed with status {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Text for a transient error notification.
    pub fn notification_message(&self) -> String {
        match self {
            ClientError::Validation(message) => message.clone(),
            ClientError::Api { detail, .. } if !detail.is_empty() => detail.clone(),
            ClientError::Busy(_) => self.to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
