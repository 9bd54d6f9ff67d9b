use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::auth::AUTH_HEADER;
use crate::models::{Action, GatewayResponse};

pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Everything that ends a request early
///
/// Each variant renders as a [`GatewayResponse`] with `isSuccess: false`.
/// Store failures are logged here and reach the caller only as a generic
/// message.
#[derive(Debug)]
pub enum GatewayError {
    /// Missing or wrong `jerry-auth` header
    Forbidden,
    /// Body could not be buffered within the size limit
    BodyTooLarge,
    /// Body is not valid JSON
    InvalidJson,
    /// `action` missing or not one of read, put, delete, list
    ActionNotFound,
    /// `key` missing for an action that needs it
    MissingKey(Action),
    /// `put` without both `key` and `content`
    MissingKeyOrContent,
    /// `read` of an absent key
    ValueNotFound,
    /// The store failed while serving the action
    Store(anyhow::Error),
}

impl GatewayError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            GatewayError::Forbidden => (
                StatusCode::FORBIDDEN,
                format!("Forbidden: Invalid or missing {} header", AUTH_HEADER),
            ),
            GatewayError::BodyTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large".to_string(),
            ),
            GatewayError::InvalidJson => (StatusCode::BAD_REQUEST, "Invalid JSON body".to_string()),
            GatewayError::ActionNotFound => (StatusCode::NOT_FOUND, "Action not found".to_string()),
            GatewayError::MissingKey(action) => (
                StatusCode::BAD_REQUEST,
                format!("Key is required for {} action", action),
            ),
            GatewayError::MissingKeyOrContent => (
                StatusCode::BAD_REQUEST,
                "Key and content are required for put action".to_string(),
            ),
            GatewayError::ValueNotFound => (StatusCode::NOT_FOUND, "Value not found".to_string()),
            GatewayError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_SERVER_ERROR.to_string(),
            ),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        if let GatewayError::Store(err) = &self {
            tracing::error!("KV operation error: {:#}", err);
        }

        let (status, message) = self.status_and_message();
        GatewayResponse::failure(status, message).into_response()
    }
}

impl From<anyhow::Error> for GatewayError {
    fn from(err: anyhow::Error) -> Self {
        GatewayError::Store(err)
    }
}

/// Render a handler panic as the generic 500 envelope.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };
    tracing::error!("Handler panicked: {}", detail);

    GatewayResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR).into_response()
}
