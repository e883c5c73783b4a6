//! HTTP layer running batches and serving the last results.

pub mod routes;
pub mod types;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    config::Settings,
    data::Sources,
    report::{cache::ReportCache, ReportAssembler},
};

#[derive(Clone)]
pub struct AppState {
    pub assembler: ReportAssembler,
    pub cache: Arc<RwLock<ReportCache>>,
}

impl AppState {
    pub fn new(assembler: ReportAssembler) -> Self {
        Self {
            assembler,
            cache: Arc::new(RwLock::new(ReportCache::new())),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let sources = Sources::from_settings(settings)?;
        Ok(Self::new(ReportAssembler::new(sources, settings.concurrency)))
    }
}

pub fn router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(routes::health))
        .route("/reports", post(routes::submit_batch).get(routes::latest_batch))
        .route("/reports/:symbol", get(routes::gene_report))
        .route("/structures/:symbol", get(routes::download_structure));

    #[cfg(feature = "askama")]
    let router = router.route("/report.html", get(routes::latest_html));

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(settings: &Settings, host: &str, port: u16) -> Result<()> {
    let state = AppState::from_settings(settings)?;
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!(%addr, "serving target-scope API");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
