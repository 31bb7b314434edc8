//! Loan Portal Server
//!
//! Serves the portal on 127.0.0.1 and talks to the lending API configured in
//! `API_BASE_URL`.

use std::net::SocketAddr;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

use loan_portal::client::ApiClient;
use loan_portal::config::Config;
use loan_portal::routes;
use loan_portal::session::{SessionEvent, SessionStore};
use loan_portal::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!(
        profile = %config.profile,
        api = %config.api_base_url,
        "Starting loan portal"
    );

    // Restore the saved session, if any
    let session = SessionStore::persistent(&config.session_file);
    spawn_session_logger(&session);
    match session.init().await {
        Ok(Some(user)) => tracing::info!(
            user_id = user.id,
            role = user.role.as_str(),
            "Session restored"
        ),
        Ok(None) => tracing::info!("No saved session"),
        Err(e) => tracing::warn!(error = %e, "Could not read saved session, starting signed out"),
    }

    let client = ApiClient::new(&config.api_base_url, config.request_timeout, session)
        .context("Failed to create lending API client")?;
    let app_state = AppState::from_client(client);

    let app = routes::router(app_state)
        .layer(configure_cors(config.cors_allowed_origins.as_deref()));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!("Portal listening on http://{}", addr);
    tracing::info!("Health check at http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Portal shutdown complete");
    Ok(())
}

/// Logs every session lifecycle change
fn spawn_session_logger(session: &SessionStore) {
    let mut events = session.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::Restored { user_id, role }) => {
                    tracing::debug!(user_id, role = role.as_str(), "Session restored from disk");
                }
                Ok(SessionEvent::SignedIn { user_id, role }) => {
                    tracing::info!(user_id, role = role.as_str(), "Session started");
                }
                Ok(SessionEvent::Updated { user_id, role }) => {
                    tracing::debug!(user_id, role = role.as_str(), "Session user refreshed");
                }
                Ok(SessionEvent::Cleared { reason }) => {
                    tracing::info!(reason = reason.as_str(), "Session ended");
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Session logger fell behind");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

fn configure_cors(allowed_origins: Option<&str>) -> CorsLayer {
    let allowed_origins_str = allowed_origins.unwrap_or_default();

    if allowed_origins_str.trim().is_empty() {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins_str
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
