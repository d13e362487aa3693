use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use super::dto::ErrorResponse;
use crate::core::DeckError;

/// Failures starting or running the server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind REST server on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid bind address '{0}'")]
    Address(String),
    #[error("REST server terminated unexpectedly: {0}")]
    Serve(#[source] std::io::Error),
}

/// A request failure with its HTTP status
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<DeckError> for ApiError {
    fn from(error: DeckError) -> Self {
        let status = match &error {
            DeckError::Provider(_) | DeckError::Http(_) | DeckError::MissingApiKey => {
                StatusCode::BAD_GATEWAY
            }
            DeckError::Attachment(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(DeckError::provider("overloaded")).status,
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(DeckError::attachment("nothing usable")).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(DeckError::export("disk full")).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
