//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint. Handlers check the
//! request shape and delegate to [`ShardedCache`].

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use tracing::debug;

use crate::cache::ShardedCache;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{ApiResponse, HealthResponse, KeyQuery, PutRequest, StatsResponse};
use crate::tasks::MonitorStatus;

/// Application state shared across all handlers.
///
/// The cache is built once at startup and shared by handle with the memory
/// monitor; shard locks make it safe to use without an outer lock.
#[derive(Clone)]
pub struct AppState {
    /// Sharded cache engine
    pub cache: Arc<ShardedCache>,
    /// Memory monitor status, reported by `/stats`
    pub monitor: Arc<MonitorStatus>,
}

impl AppState {
    /// Creates a new AppState owning the given cache.
    pub fn new(cache: ShardedCache) -> Self {
        Self::with_shared(Arc::new(cache), Arc::new(MonitorStatus::new()))
    }

    /// Creates a new AppState from handles shared with the memory monitor.
    pub fn with_shared(cache: Arc<ShardedCache>, monitor: Arc<MonitorStatus>) -> Self {
        Self { cache, monitor }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(ShardedCache::from_config(config))
    }
}

/// Handler for PUT /put
///
/// Stores a key-value pair, overwriting any previous value.
pub async fn put_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PutRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>> {
    let Json(req) = payload.map_err(|rejection| {
        CacheError::InvalidRequest(format!("Invalid request format: {}", rejection.body_text()))
    })?;

    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state.cache.put(req.key, req.value)?;

    Ok(Json(ApiResponse::ok("Key inserted/updated successfully.")))
}

/// Handler for GET /get?key=...
///
/// Retrieves a value and marks it most recently used.
pub async fn get_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<KeyQuery>, QueryRejection>,
) -> Result<Json<ApiResponse>> {
    let key = extract_key(query)?;

    match state.cache.get(&key)? {
        Some(value) => Ok(Json(ApiResponse::found(key, value))),
        None => {
            debug!("Cache miss for key '{}'", key);
            Err(CacheError::NotFound(key))
        }
    }
}

/// Handler for DELETE /delete?key=...
pub async fn delete_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<KeyQuery>, QueryRejection>,
) -> Result<Json<ApiResponse>> {
    let key = extract_key(query)?;
    state.cache.delete(&key)?;

    Ok(Json(ApiResponse::ok(format!("Key '{}' deleted successfully.", key))))
}

/// Handler for GET /stats
///
/// Returns cache statistics and the memory monitor's last reading.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats();
    Json(StatsResponse::new(&stats, &state.monitor))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Fallback for unsupported methods on the key-value paths.
pub async fn method_not_allowed() -> CacheError {
    CacheError::MethodNotAllowed
}

fn extract_key(query: std::result::Result<Query<KeyQuery>, QueryRejection>) -> Result<String> {
    let Query(query) =
        query.map_err(|rejection| CacheError::InvalidRequest(rejection.body_text()))?;
    query.require_key()
}
