//! Keyword application handlers: run the engine over posted keywords and
//! responses, and manage the shared result cache.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use promptbank_core::{AppliedKeyword, Keyword, Response};
use promptbank_engine::{
    AppliedKeywordCache, CacheLookup, EngineError, InputFingerprint, KeywordEngine,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::middleware::RequestId;

use super::{
    map_engine_error, map_json_rejection, ApiError, ApiResponse, AppState, ResponseMeta,
};

#[derive(Debug, Deserialize)]
pub(super) struct ApplyKeywordsRequest {
    pub keywords: Vec<Keyword>,
    pub responses: Vec<Response>,
    #[serde(default)]
    pub force_refresh: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct ApplyKeywordsResponse {
    pub cached: bool,
    pub applied_keywords: Vec<AppliedKeyword>,
}

#[derive(Debug, Serialize)]
pub(super) struct ClearCacheResponse {
    pub cleared: usize,
}

/// `POST /api/v1/keywords/apply`: compute per-backend match statistics.
///
/// The engine is CPU-bound, so it runs on the blocking pool rather than the
/// async runtime.
pub(super) async fn apply_keywords(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<ApplyKeywordsRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ApplyKeywordsResponse>>, ApiError> {
    let rid = req_id.0.clone();
    let Json(body) = body.map_err(|rejection| map_json_rejection(&rid, &rejection))?;
    let keyword_count = body.keywords.len();
    let response_count = body.responses.len();

    let engine = Arc::clone(&state.engine);
    let cache = Arc::clone(&state.cache);
    let lookup = tokio::task::spawn_blocking(move || {
        apply_with_cache(
            &engine,
            &cache,
            &body.keywords,
            &body.responses,
            body.force_refresh,
        )
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "keyword engine task failed");
        ApiError::new(&rid, "internal_error", "keyword engine task failed")
    })?
    .map_err(|e| map_engine_error(&rid, &e))?;

    tracing::info!(
        request_id = %rid,
        keywords = keyword_count,
        responses = response_count,
        records = lookup.applied.len(),
        cached = lookup.cached,
        "applied keywords"
    );

    Ok(Json(ApiResponse {
        data: ApplyKeywordsResponse {
            cached: lookup.cached,
            applied_keywords: lookup.applied.to_vec(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Serve from the shared cache or run the engine and store the result.
///
/// Blocking; call from `spawn_blocking`. The cache lock is taken only for the
/// lookup and the insert, never across the engine run, so concurrent applies
/// and cache clears proceed while a computation is in flight.
pub(super) fn apply_with_cache(
    engine: &KeywordEngine,
    cache: &Mutex<AppliedKeywordCache>,
    keywords: &[Keyword],
    responses: &[Response],
    force_refresh: bool,
) -> Result<CacheLookup, EngineError> {
    let fingerprint = InputFingerprint::of(keywords, responses);

    if !force_refresh {
        let hit = cache.blocking_lock().get(&fingerprint);
        if let Some(applied) = hit {
            return Ok(CacheLookup {
                applied,
                cached: true,
            });
        }
    }

    let applied: Arc<[AppliedKeyword]> =
        engine.compute_applied_keywords(keywords, responses)?.into();
    cache
        .blocking_lock()
        .insert(fingerprint, Arc::clone(&applied));

    Ok(CacheLookup {
        applied,
        cached: false,
    })
}

/// `DELETE /api/v1/keywords/cache`: drop every cached result.
pub(super) async fn clear_cache(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<ClearCacheResponse>> {
    let mut cache = state.cache.lock().await;
    let cleared = cache.len();
    cache.invalidate();
    drop(cache);

    tracing::info!(request_id = %req_id.0, cleared, "applied keywords cache cleared");

    Json(ApiResponse {
        data: ClearCacheResponse { cleared },
        meta: ResponseMeta::new(req_id.0),
    })
}
