use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value as JsonValue;

use super::{delete_action, list_action, put_action, read_action};
use crate::auth::presented_secret;
use crate::error::GatewayError;
use crate::models::{Action, GatewayResponse, RequestEnvelope};
use crate::state::AppState;

/// Largest request body the gateway buffers. Leaves room for JSON framing
/// around a 25 MiB value.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Any path - the single gateway endpoint
///
/// `OPTIONS` answers the CORS preflight without checking credentials.
/// Every other method authenticates, parses the JSON envelope and runs the
/// requested action against the store.
#[utoipa::path(
    post,
    path = "/",
    request_body = RequestEnvelope,
    params(
        ("jerry-auth" = String, Header, description = "Shared secret")
    ),
    responses(
        (status = 200, description = "Action completed, or put was a no-op (isSuccess false)", body = GatewayResponse),
        (status = 204, description = "CORS preflight"),
        (status = 400, description = "Invalid JSON body or missing key/content", body = GatewayResponse),
        (status = 403, description = "Missing or wrong jerry-auth header", body = GatewayResponse),
        (status = 404, description = "Unknown action, or read of an absent key", body = GatewayResponse),
        (status = 413, description = "Authenticated body over the size limit", body = GatewayResponse),
        (status = 500, description = "Store failure", body = GatewayResponse)
    ),
    tag = "kv"
)]
pub async fn gateway_handler(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }

    match process(&state, &headers, body).await {
        Ok(response) => response.into_response(),
        Err(err) => err.into_response(),
    }
}

/// The body is only buffered once the caller has authenticated.
async fn process(
    state: &AppState,
    headers: &HeaderMap,
    body: Body,
) -> Result<GatewayResponse, GatewayError> {
    if !state.authenticator.authenticate(presented_secret(headers)) {
        tracing::warn!("Rejected request with invalid or missing credentials");
        return Err(GatewayError::Forbidden);
    }

    let body = axum::body::to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| {
        tracing::warn!("Failed to read request body: {}", e);
        GatewayError::BodyTooLarge
    })?;

    let payload: JsonValue = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("Rejected malformed body: {}", e);
        GatewayError::InvalidJson
    })?;

    let request = RequestEnvelope::from_json(&payload);
    let action = request.action.ok_or(GatewayError::ActionNotFound)?;

    let store = state.store.as_ref();
    match action {
        Action::Read => read_action(store, &request).await,
        Action::Put => put_action(store, &request).await,
        Action::Delete => delete_action(store, &request).await,
        Action::List => list_action(store, &request).await,
    }
}
