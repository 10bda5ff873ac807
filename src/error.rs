use thiserror::Error;

/// Failures surfaced by the extraction workflow.
///
/// The `Display` text of every variant is what ends up in the
/// workflow's `error` field, so messages are written for end users.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Request { status: u16, message: String },

    /// The request never completed or the body could not be decoded.
    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
