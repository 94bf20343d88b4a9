//! Vida FitPro Client
//!
//! A fitness-coaching client backed by a managed identity and record
//! storage service.
//!
//! ## Architecture
//!
//! The client follows a layered architecture:
//! - App: screen-state machine and event loop
//! - Services: derived state (nutrition, water, reminders, rest timer)
//! - Repositories: typed record access over the gateway
//! - Gateway: HTTP boundary to the remote backend

use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vida_fitpro_client::{
    app::App,
    config::AppConfig,
    gateway::RestGateway,
    notify::LogNotifier,
    prefs::PrefsStore,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if AppConfig::is_production() { "production" } else { "development" },
        "Starting Vida FitPro client"
    );

    let gateway = Arc::new(RestGateway::new(&config.gateway)?);
    let notifier = Arc::new(LogNotifier::new());
    let prefs_store = PrefsStore::default_location();

    let (mut app, events) = App::new(gateway, notifier, prefs_store, config).await;

    // Position the user at the right screen before handling events.
    app.initialize().await;
    info!(screen = ?app.state().screen, "startup routing complete");

    // Run until interrupted; the event loop owns all state mutations.
    tokio::select! {
        _ = app.run(events) => {}
        _ = shutdown_signal() => {
            info!("Shutdown complete");
        }
    }

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if AppConfig::is_production() {
            "vida_fitpro_client=info".into()
        } else {
            "vida_fitpro_client=debug".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
