use reqwest::StatusCode;
use serde::Deserialize;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Unexpected response ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request already in flight: {0}")]
    Busy(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Cause classes a page can branch on when rendering a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotAuthorized,
    NotFound,
    ValidationRejected,
    TransientNetwork,
    Unknown,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Unauthorized(_) => ErrorKind::NotAuthorized,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Rejected(_) => ErrorKind::ValidationRejected,
            Error::Reqwest(err) if err.is_timeout() || err.is_connect() || err.is_request() => {
                ErrorKind::TransientNetwork
            }
            Error::Reqwest(err) => match err.status() {
                Some(status) => classify_status(status),
                None if err.is_decode() || err.is_body() => ErrorKind::Unknown,
                None => ErrorKind::TransientNetwork,
            },
            Error::Status { status, .. } => StatusCode::from_u16(*status)
                .map(classify_status)
                .unwrap_or(ErrorKind::Unknown),
            Error::Busy(_) => ErrorKind::TransientNetwork,
            Error::Config(_) | Error::Json(_) | Error::Io(_) | Error::Url(_) => ErrorKind::Unknown,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::TransientNetwork | ErrorKind::Unknown)
    }

    /// Maps a non-success response onto the error taxonomy, preferring the
    /// server's own `message`/`error` field over the bare status line.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized(message),
            StatusCode::NOT_FOUND => Error::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                Error::Rejected(message)
            }
            other => Error::Status {
                status: other.as_u16(),
                message,
            },
        }
    }
}

fn classify_status(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorKind::NotAuthorized,
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            ErrorKind::ValidationRejected
        }
        StatusCode::REQUEST_TIMEOUT
        | StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => ErrorKind::TransientNetwork,
        _ => ErrorKind::Unknown,
    }
}
