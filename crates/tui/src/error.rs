use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Client(#[from] client::ClientError),
    #[error(transparent)]
    Engine(#[from] engine::EngineError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("terminal error: {0}")]
    Terminal(String),
    #[error("{0}")]
    Usage(String),
}

impl AppError {
    /// One line for the user, without transport internals.
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}
