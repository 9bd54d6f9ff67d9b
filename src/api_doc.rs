use utoipa::OpenApi;

use crate::handlers;
use crate::models::{Action, GatewayResponse, ListResult, RequestEnvelope};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "kv-gateway API",
        version = "0.1.0",
        description = "Single-endpoint JSON gateway to a key-value store, guarded by the jerry-auth header"
    ),
    paths(handlers::gateway::gateway_handler),
    components(
        schemas(
            Action,
            RequestEnvelope,
            GatewayResponse,
            ListResult
        )
    ),
    tags(
        (name = "kv", description = "Key-value store operations")
    )
)]
pub struct ApiDoc;
