use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/news", get(handlers::latest_news))
        .route("/api/news/defi", get(handlers::defi_news))
        .route("/api/analysis", get(handlers::news_analysis))
        .route("/api/sources", get(handlers::list_sources))
        .route("/api/archive", get(handlers::query_archive))
        .route("/api/archive/stats", get(handlers::archive_stats))
        .route("/api/archive/trending", get(handlers::trending_tickers))
        .route("/api/archive/market", get(handlers::market_history))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::{create_app, AppState};
    pub use cn_core::{Article, Error, Result};
}
