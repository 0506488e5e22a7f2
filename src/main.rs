use axum::{
    routing::{get, post},
    Router,
};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use price_scout_api::config::Config;
use price_scout_api::handlers::{self, AppState};
use price_scout_api::oracle::PriceOracleClient;

/// Main entry point for the application.
///
/// Initializes tracing, configuration, the oracle client (when a key is
/// configured), the quote cache, and the HTTP routes with their middleware,
/// then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "price_scout_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration (logs its own summary)
    let config = Config::from_env()?;

    // Initialize the oracle client; without a key every search degrades to
    // the mock generator.
    let oracle_client = match &config.oracle_api_key {
        Some(api_key) => match PriceOracleClient::new(
            config.oracle_base_url.clone(),
            api_key.clone(),
            config.oracle_model.clone(),
            config.oracle_timeout_secs,
        ) {
            Ok(client) => {
                tracing::info!("✓ Price oracle client initialized: {}", config.oracle_base_url);
                Some(client)
            }
            Err(e) => {
                tracing::error!("Failed to initialize oracle client: {}", e);
                None
            }
        },
        None => None,
    };

    // Sanitized quote cache (10 minute TTL, 10k max entries)
    let quote_cache = Cache::builder()
        .time_to_live(Duration::from_secs(600))
        .max_capacity(10_000)
        .build();
    tracing::info!("Quote cache initialized (10m TTL, 10k capacity)");

    // Build application state
    let app_state = Arc::new(AppState {
        config: config.clone(),
        oracle_client,
        quote_cache,
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .unwrap(),
    );

    // Build protected routes with security layers
    let protected_routes = Router::new()
        .route("/api/v1/price-search", post(handlers::price_search))
        .route(
            "/api/v1/payment-methods",
            get(handlers::list_payment_methods).post(handlers::validate_payment_method),
        )
        .route(
            "/api/v1/payment-methods/recommend",
            post(handlers::recommend_payment_options),
        )
        .layer(
            ServiceBuilder::new()
                // Request size limit: 1MB max payload
                .layer(RequestBodyLimitLayer::new(1024 * 1024))
                // Rate limiting: 10 req/sec per IP, burst of 20
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Build final app with health check (bypasses rate limiting)
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
