//! HTTP route handlers for Axum.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::{info, warn};

use super::{types::ReportRequest, AppState};
use crate::report::{BatchReport, GeneReport};

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

pub async fn health() -> &'static str {
    "ok"
}

/// Run a new batch; replaces whatever the cache held before.
pub async fn submit_batch(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> ApiResult<BatchReport> {
    let symbols = request.genes.symbols();
    if symbols.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "no gene symbols supplied".to_string(),
        ));
    }
    info!(genes = symbols.len(), "batch submitted");
    let batch = state.assembler.assemble_batch(&symbols).await;
    state.cache.write().await.replace(batch.clone());
    Ok(Json(batch))
}

pub async fn latest_batch(State(state): State<AppState>) -> ApiResult<BatchReport> {
    let cache = state.cache.read().await;
    cache
        .latest()
        .cloned()
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, "no batch submitted yet".to_string()))
}

pub async fn gene_report(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<GeneReport> {
    let cache = state.cache.read().await;
    cache.get(&symbol).cloned().map(Json).ok_or_else(|| {
        warn!(%symbol, "gene not in last batch");
        (
            StatusCode::NOT_FOUND,
            format!("{symbol} is not part of the last batch"),
        )
    })
}

pub async fn download_structure(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let cache = state.cache.read().await;
    let (name, bytes) = cache.structure(&symbol).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            format!("no structure data for {symbol}"),
        )
    })?;
    let headers = [
        (header::CONTENT_TYPE, "chemical/x-pdb".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{name}\""),
        ),
    ];
    Ok((headers, bytes.to_vec()))
}

#[cfg(feature = "askama")]
pub async fn latest_html(
    State(state): State<AppState>,
) -> Result<axum::response::Html<String>, (StatusCode, String)> {
    let cache = state.cache.read().await;
    let batch = cache
        .latest()
        .ok_or_else(|| (StatusCode::NOT_FOUND, "no batch submitted yet".to_string()))?;
    crate::report::render::render_html(batch, 10)
        .map(axum::response::Html)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}
