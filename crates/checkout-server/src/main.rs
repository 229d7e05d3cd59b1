//! stripe-checkout HTTP Server
//!
//! Axum-based server creating payment intents for the embedded checkout
//! and serving the WASM frontend.

mod handlers;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkout_payments::{
    CheckoutConfig, CollaboratorKind, IntentCollaborator, IntentService, MemoryTokenStore,
    MockIntentCollaborator, StripeClient,
};

use crate::handlers::{client_config, create_checkout_session, health_check, setup_stripe};
use crate::state::{AppState, Payments, RateLimit};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Initialize payments
    let payments = match CheckoutConfig::from_env() {
        Ok(config) => {
            let collaborator: Arc<dyn IntentCollaborator> = match config.collaborator {
                CollaboratorKind::Mock => {
                    tracing::warn!("⚠ Using mock payment collaborator - no real charges");
                    Arc::new(MockIntentCollaborator::new())
                }
                CollaboratorKind::Stripe => Arc::new(StripeClient::new(&config.secret_key)),
            };

            tracing::info!(
                collaborator = collaborator.name(),
                currency = %config.currency,
                "✓ Payments configured"
            );

            Some(Payments {
                intents: IntentService::new(collaborator, config.currency.clone()),
                config: Arc::new(config),
            })
        }
        Err(e) => {
            tracing::warn!("⚠ Payments not configured - {}", e);
            tracing::warn!("  Set STRIPE_SECRET_KEY and STRIPE_PUBLISHABLE_KEY in .env");
            tracing::warn!("  or CHECKOUT_COLLABORATOR=mock for local development");
            None
        }
    };

    // Build application state
    let state = AppState {
        payments,
        tokens: Arc::new(MemoryTokenStore::new()),
        rate_limit: RateLimit::from_env().context("Invalid rate limit settings")?,
    };

    let app = router(state)?;

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 stripe-checkout server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                - Health check");
    tracing::info!("  GET  /api/config            - Publishable key for the frontend");
    tracing::info!("  POST /api/checkout/session  - Issue checkout token");
    tracing::info!("  POST /api/setup-stripe      - Create payment intent");
    tracing::info!("");

    // Peer address backs the rate limiter when no proxy headers are present
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn router(state: AppState) -> anyhow::Result<Router> {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Per-IP limit on token issue and intent creation. SmartIpKeyExtractor
    // reads X-Forwarded-For / X-Real-IP first, then the peer address.
    let governor = GovernorConfigBuilder::default()
        .period(state.rate_limit.period)
        .burst_size(state.rate_limit.burst)
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .context("Rate limit period and burst must be non-zero")?;

    // Checkout
    let checkout_routes = Router::new()
        .route("/api/checkout/session", post(create_checkout_session))
        .route("/api/setup-stripe", post(setup_stripe))
        .layer(GovernorLayer::new(Arc::new(governor)));

    Ok(Router::new()
        .route("/health", get(health_check))
        .route("/api/config", get(client_config))
        .merge(checkout_routes)
        // Static files (WASM frontend)
        .fallback_service(ServeDir::new("static"))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
