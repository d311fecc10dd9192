use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub mod request_id;

pub use request_id::{request_id_middleware, request_span, RequestId, X_REQUEST_ID};

use crate::controllers::{feed::FeedController, health};
use crate::infrastructure::config::Config;
use crate::infrastructure::db::DbPool;

/// Build the application router
pub fn build_router(pool: Arc<DbPool>, feed_controller: Arc<FeedController>) -> Router {
    let feed_routes = Router::new()
        .route("/:file_name", get(FeedController::get_rss))
        .with_state(feed_controller);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(pool)
        .merge(feed_routes)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(request_span)),
        )
}

/// Start the HTTP server
pub async fn start_http_server(
    pool: Arc<DbPool>,
    config: Arc<Config>,
    feed_controller: Arc<FeedController>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(pool, feed_controller);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
