//! Serves a generated site, search artifacts included, for local preview.

use anyhow::Result;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use sitesearch_core::persist::{load_artifacts, IndexPaths};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[derive(Debug, Serialize, PartialEq)]
pub struct StatusResponse {
    pub search_available: bool,
    pub documents: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub site_root: PathBuf,
    pub paths: Arc<IndexPaths>,
}

pub fn build_app(site_root: PathBuf, paths: IndexPaths) -> Result<Router> {
    if !site_root.is_dir() {
        anyhow::bail!("site root {} is not a directory", site_root.display());
    }
    let state = AppState { site_root: site_root.clone(), paths: Arc::new(paths) };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/status", get(status_handler))
        .with_state(state)
        .fallback_service(ServeDir::new(site_root))
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

/// Whether the artifacts on disk would let a visitor search right now.
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let paths = state.paths.clone();
    let loaded = tokio::task::spawn_blocking(move || load_artifacts(&paths)).await;
    let response = match loaded {
        Ok(Ok((index, _))) => StatusResponse { search_available: true, documents: index.num_docs(), error: None },
        Ok(Err(err)) => {
            tracing::warn!(error = %format!("{err:#}"), site = %state.site_root.display(), "search artifacts unusable");
            StatusResponse { search_available: false, documents: 0, error: Some(format!("{err:#}")) }
        }
        Err(err) => StatusResponse { search_available: false, documents: 0, error: Some(err.to_string()) },
    };
    Json(response)
}
