use crate::config::BridgeConfig;
use crate::error::Result;
use crate::logging::SharedLogger;
use crate::proxy::{self, BackendBody, ProxyResult};
use crate::translate::anthropic_types::{ErrorResponse, MessagesRequest};

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MESSAGES_PATH: &str = "/v1/messages";
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: BridgeConfig,
    pub client: reqwest::Client,
    pub logger: SharedLogger,
}

impl AppState {
    /// Build the shared state with an HTTP client bounded by the configured timeout.
    pub fn new(config: BridgeConfig, logger: SharedLogger) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.backend.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            client,
            logger,
        })
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(MESSAGES_PATH, post(handle_messages))
        .route("/health", get(handle_health))
        .route("/", get(handle_health))
        .fallback(handle_fallback)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Clients that prefix the API path (`/anthropic/v1/messages`, ...) still
/// reach the messages handler; everything else is a 404.
async fn handle_fallback(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    if method == Method::POST && uri.path().ends_with(MESSAGES_PATH) {
        return handle_messages(State(state), body).await;
    }

    state
        .logger
        .warn("server", format!("404: no route for {} {}", method, uri.path()));
    let err = ErrorResponse::not_found(format!("Not Found: {}", uri.path()));
    (StatusCode::NOT_FOUND, Json(err)).into_response()
}

async fn handle_messages(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    if body.is_empty() {
        state.logger.warn("server", "Rejected request with empty body");
        let err = ErrorResponse::invalid_request("Empty request body");
        return (StatusCode::BAD_REQUEST, Json(err)).into_response();
    }

    let doc: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            state.logger.warn("server", format!("Invalid JSON: {}", e));
            let err = ErrorResponse::invalid_request(format!("Invalid JSON: {}", e));
            return (StatusCode::BAD_REQUEST, Json(err)).into_response();
        }
    };

    if !doc.is_object() {
        state.logger.warn("server", "Rejected request body that is not a JSON object");
        let err = ErrorResponse::invalid_request("Request body must be a JSON object");
        return (StatusCode::BAD_REQUEST, Json(err)).into_response();
    }

    let req = match MessagesRequest::deserialize(&doc) {
        Ok(r) => r,
        Err(e) => {
            state.logger.error("server", format!("Failed to read request: {}", e));
            let err = ErrorResponse::invalid_request(format!("Invalid request body: {}", e));
            return (StatusCode::BAD_REQUEST, Json(err)).into_response();
        }
    };

    state.logger.info(
        "server",
        format!(
            "Request: model={} messages={} tools={}",
            req.model.as_deref().unwrap_or("(default)"),
            req.messages.len(),
            req.tools.len()
        ),
    );

    match proxy::forward(&req, &state.config, &state.client, &state.logger).await {
        Ok(ProxyResult::Success(resp)) => Json(resp).into_response(),
        Ok(ProxyResult::BackendError { status, body }) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            relay_backend_error(status, body)
        }
        Err(e) => {
            state
                .logger
                .error("server", format!("Proxy error ({}): {}", e.kind(), e));
            let err = ErrorResponse::proxy_error(e.to_string());
            (StatusCode::INTERNAL_SERVER_ERROR, Json(err)).into_response()
        }
    }
}

fn relay_backend_error(status: StatusCode, body: BackendBody) -> Response {
    match body {
        BackendBody::Json(json) => (status, Json(json)).into_response(),
        BackendBody::Raw {
            content_type,
            bytes,
        } => Response::builder()
            .status(status)
            .header(
                header::CONTENT_TYPE,
                content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
            )
            .body(Body::from(bytes))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
    }
}

async fn handle_health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "proxy": "running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
