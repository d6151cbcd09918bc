// Error types for the HTTP layer

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HttpError>;

#[derive(Error, Debug)]
pub enum HttpError {
    /// The request could not be read: malformed body or query string.
    #[error("Bad Request: {0}")]
    BadRequest(String),

    /// A rule could not run; the request was not validated.
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl HttpError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            HttpError::BadRequest(_) => 400,
            HttpError::Internal(_) | HttpError::Config(_) | HttpError::Serialization(_) => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}
