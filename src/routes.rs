// Route path constants and router assembly

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{
        HeaderName, HeaderValue,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
    },
};
use tower_http::{
    catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;
use crate::error::handle_panic;
use crate::handlers::gateway::{MAX_BODY_BYTES, gateway_handler};
use crate::state::AppState;

pub const SWAGGER_UI: &str = "/swagger-ui";
pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, jerry-auth";

/// Build the application router.
///
/// The gateway is the fallback, so it answers on any path and method.
/// Layers are applied so that the CORS headers land on every response,
/// including the 500 produced for a panicking handler.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new();

    if state.config.swagger_ui {
        router = router.merge(SwaggerUi::new(SWAGGER_UI).url(OPENAPI_JSON, ApiDoc::openapi()));
    }

    router
        .fallback(gateway_handler)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_header(ACCESS_CONTROL_ALLOW_HEADERS, CORS_ALLOW_HEADERS))
        .layer(cors_header(ACCESS_CONTROL_ALLOW_METHODS, CORS_ALLOW_METHODS))
        .layer(cors_header(ACCESS_CONTROL_ALLOW_ORIGIN, CORS_ALLOW_ORIGIN))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}
