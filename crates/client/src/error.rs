use engine::EngineError;
use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Input rejected before anything was sent.
    #[error(transparent)]
    Validation(#[from] EngineError),
    /// Missing, invalid or expired credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Any other non-2xx response.
    #[error("{status}: {message}")]
    Api { status: StatusCode, message: String },
    /// The request never reached the service.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("session storage error: {0}")]
    Storage(String),
    #[error("invalid base_url: {0}")]
    BaseUrl(String),
}

impl ClientError {
    /// Text rendered inline next to the action that failed.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Unauthorized(message) => message.clone(),
            Self::Api { message, .. } => message.clone(),
            Self::Network(_) => "Server unreachable. Try again later.".to_string(),
            Self::Decode(_) => "The server sent an unexpected response.".to_string(),
            Self::Storage(message) => format!("Could not save the session: {message}"),
            Self::BaseUrl(message) => format!("Invalid server address: {message}"),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}
