use crate::mail::MailError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read configuration: {0}")]
    ConfigError(#[from] config::ConfigError),
    #[error(transparent)]
    ConfigurationError(#[from] ConfigurationError),
    #[error("socket address parsing error: {0}")]
    SocketAddressParsingError(#[from] std::net::AddrParseError),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("mail relay host is empty")]
    MissingRelayHost,
    #[error("{0} must be greater than zero")]
    ZeroTtl(&'static str),
}

/// Request outcomes that end the contact flow with an error status.
///
/// Bodies stay generic; details are only logged.
#[derive(Error, Debug)]
pub enum AppErrors {
    #[error("no valid contact in session")]
    Forbidden,
    #[error("failed to send mail: {0}")]
    MailFailure(#[from] MailError),
    #[error("failed to store session value: {0}")]
    Session(#[from] serde_json::Error),
}

impl AppErrors {
    pub fn status(&self) -> StatusCode {
        match self {
            AppErrors::Forbidden => StatusCode::FORBIDDEN,
            AppErrors::MailFailure(_) | AppErrors::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppErrors {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = status.canonical_reason().unwrap_or_default();
        (status, body).into_response()
    }
}
