//! HTTP surface: request dispatch, CORS and the response relay.

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::client::{ForwardError, RestletClient};
use crate::types::ErrorBody;

const ALLOWED_METHODS: &str = "POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type";

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    client: Arc<RestletClient>,
}

/// Build the Axum application.
///
/// Every path is served by the lead handler; `OPTIONS` is answered by the CORS layer.
/// All responses carry the full set of CORS headers.
pub fn build_app(client: Arc<RestletClient>) -> Router {
    let state = AppState { client };

    Router::new()
        .fallback(submit_lead)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static(ALLOWED_METHODS),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static(ALLOWED_HEADERS),
                ))
                .layer(cors_layer()),
        )
        .with_state(state)
}

/// Any origin may `POST` JSON.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE])
}

/// Forward a lead to NetSuite and relay the answer.
async fn submit_lead(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    if method != Method::POST {
        tracing::debug!(%method, "Rejecting method");
        return Err(ApiError::MethodNotAllowed);
    }

    // Validate only; the caller's bytes are what gets signed and sent.
    serde_json::from_slice::<serde::de::IgnoredAny>(&body).map_err(|e| {
        tracing::warn!("Rejecting lead with invalid JSON body: {}", e);
        ApiError::BadRequest(format!("invalid JSON body: {}", e))
    })?;
    tracing::debug!(payload_bytes = body.len(), "Received lead submission");

    let response = state.client.submit(&body).await?;
    Ok(Json(response))
}

/// API error types
#[derive(Debug)]
pub enum ApiError {
    MethodNotAllowed,
    BadRequest(String),
    InternalError(String),
}

impl From<ForwardError> for ApiError {
    fn from(error: ForwardError) -> Self {
        ApiError::InternalError(error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS))],
                Json(ErrorBody::method_not_allowed()),
            )
                .into_response(),
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody::bad_request(msg))).into_response()
            }
            ApiError::InternalError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::internal(msg)),
            )
                .into_response(),
        }
    }
}
