use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use rss_feed_server::controllers::feed::FeedController;
use rss_feed_server::domain::feed::FeedService;
use rss_feed_server::infrastructure::config::{Config, LogFormat};
use rss_feed_server::infrastructure::db::{check_connection, create_pool};
use rss_feed_server::infrastructure::http::start_http_server;
use rss_feed_server::infrastructure::repositories::PgItemRepository;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        environment = ?config.environment,
        "Starting RSS feed server on {}:{}",
        config.host,
        config.port
    );

    let pool = create_pool(
        &config.database_url,
        config.db_max_connections,
        config.db_acquire_timeout(),
    )?;
    tracing::info!("Database connection pool created");

    // Each request reports its own connectivity failures, so an unreachable
    // database only warrants a warning here
    match check_connection(&pool).await {
        Ok(_) => tracing::info!("Database connection verified"),
        Err(e) => tracing::warn!(error = %e, "Database not reachable at startup"),
    }

    if let Some(allowed) = &config.allowed_idents {
        tracing::info!(count = allowed.len(), "Serving allow-listed feeds only");
    }

    let pool = Arc::new(pool);
    let config = Arc::new(config);

    let item_repo = Arc::new(PgItemRepository::new(pool.clone()));
    let feed_service = Arc::new(FeedService::new(
        item_repo,
        config.source_label.clone(),
        config.allowed_idents.clone(),
    ));
    let feed_controller = Arc::new(FeedController::new(feed_service));

    start_http_server(pool, config, feed_controller).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rss_feed_server=debug,tower_http=debug".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
