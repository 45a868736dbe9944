mod keywords;

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use promptbank_core::BackendType;
use promptbank_engine::{AppliedKeywordCache, EngineError, KeywordEngine};
use serde::Serialize;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<KeywordEngine>,
    pub cache: Arc<Mutex<AppliedKeywordCache>>,
    /// Request body limit for `POST /api/v1/keywords/apply`, which carries the
    /// full response population.
    pub max_body_bytes: usize,
}

impl AppState {
    #[must_use]
    pub fn new(engine: KeywordEngine, cache_max_entries: usize, max_body_bytes: usize) -> Self {
        Self {
            engine: Arc::new(engine),
            cache: Arc::new(Mutex::new(AppliedKeywordCache::new(cache_max_entries))),
            max_body_bytes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    engine_threads: usize,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "invalid_pattern" => StatusCode::UNPROCESSABLE_ENTITY,
            "payload_too_large" => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_engine_error(request_id: &str, error: &EngineError) -> ApiError {
    match error {
        EngineError::PatternCompilation { .. } => {
            tracing::warn!(error = %error, "rejected keyword pattern");
            ApiError::new(request_id, "invalid_pattern", error.to_string())
        }
        EngineError::WorkerPool(_) => {
            tracing::error!(error = %error, "keyword engine unavailable");
            ApiError::new(request_id, "internal_error", "keyword engine unavailable")
        }
    }
}

/// Wrap a rejected JSON body in the error envelope.
///
/// Oversized bodies keep their 413; every other rejection (malformed JSON,
/// unknown backend type, missing content type) is a 400 `bad_request`.
pub(super) fn map_json_rejection(request_id: &str, rejection: &JsonRejection) -> ApiError {
    let status = rejection.status();
    tracing::warn!(%status, error = %rejection.body_text(), "rejected request body");
    let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
        "payload_too_large"
    } else {
        "bad_request"
    };
    ApiError::new(request_id, code, rejection.body_text())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

pub fn build_app(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/backend-types", get(list_backend_types))
        .route(
            "/api/v1/keywords/apply",
            post(keywords::apply_keywords).layer(body_limit),
        )
        .route("/api/v1/keywords/cache", delete(keywords::clear_cache))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(CompressionLayer::new())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            data: HealthData {
                status: "ok",
                engine_threads: state.engine.worker_threads(),
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}

async fn list_backend_types(
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<BackendType>>> {
    Json(ApiResponse {
        data: BackendType::ALL.to_vec(),
        meta: ResponseMeta::new(req_id.0),
    })
}
