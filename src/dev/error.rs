use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DevError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Invalid proxy target: {0}")]
    InvalidTarget(String),

    #[error("Timed out connecting to backend")]
    ConnectTimeout,

    #[error("Malformed upgrade handshake: {0}")]
    MalformedHandshake(String),

    #[error("Backend refused protocol upgrade with status {0}")]
    UpgradeRejected(u16),

    #[error("No alias matches import specifier: {0}")]
    UnknownAlias(String),
}

impl ResponseError for DevError {
    fn status_code(&self) -> StatusCode {
        match self {
            DevError::ConnectTimeout => StatusCode::GATEWAY_TIMEOUT,
            DevError::UnknownAlias(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}
