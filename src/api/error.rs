use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::models::ErrorBody;

#[derive(Debug, Error)]
pub enum ProxyError {
    /// A required query parameter was absent or blank.
    #[error("{0}")]
    BadRequest(&'static str),

    /// The provider could not be reached or answered with a failure.
    #[error("{message}: {details}")]
    Upstream {
        message: &'static str,
        details: String,
    },
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ProxyError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody { error: message.to_string(), details: None },
            ),
            ProxyError::Upstream { message, details } => {
                tracing::error!("{}: {}", message, details);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody { error: message.to_string(), details: Some(details) },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
