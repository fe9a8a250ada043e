//! dupwatch-api - HTTP API server for dupwatch

mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use dupwatch_core::Result;
use dupwatch_inference::OllamaBackend;
use dupwatch_scanner::ScanEngine;
use dupwatch_store::{create_pool, ConfigStore, PgKeyValueStore};
use dupwatch_tracker::TrackerClient;

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically across log
/// streams.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ScanEngine>,
    pub tracker: Arc<TrackerClient>,
    pub config: ConfigStore,
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/scan/batch", post(handlers::scan_batch))
        .route("/scan/item/:key", post(handlers::scan_item))
        .route("/alerts/:key", get(handlers::get_alert))
        .route("/alerts/:key/dismiss", post(handlers::dismiss_candidate))
        .route("/events/item-changed", post(handlers::item_changed))
        .route("/config", get(handlers::get_config).put(handlers::save_config))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "dupwatch_api=info,dupwatch_scanner=info,dupwatch_store=info,\
             dupwatch_inference=info,dupwatch_tracker=info,tower_http=warn"
                .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/dupwatch".to_string());
    let pool = create_pool(&database_url).await?;
    dupwatch_store::migrate(&pool).await?;

    let store = Arc::new(PgKeyValueStore::new(pool));
    let tracker = Arc::new(TrackerClient::from_env()?);
    let ollama = Arc::new(OllamaBackend::from_env());

    let engine = Arc::new(ScanEngine::new(
        tracker.clone(),
        ollama.clone(),
        ollama,
        store.clone(),
    ));

    let state = AppState {
        engine,
        tracker,
        config: ConfigStore::new(store),
    };

    let addr: SocketAddr = std::env::var("DUPWATCH_BIND")
        .unwrap_or_else(|_| "0.0.0.0:8086".to_string())
        .parse()
        .map_err(|e| dupwatch_core::Error::Config(format!("Invalid bind address: {e}")))?;

    info!(subsystem = "api", %addr, "dupwatch API listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}
