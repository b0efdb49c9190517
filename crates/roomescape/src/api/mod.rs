//! JSON HTTP API.
//!
//! Routes map one-to-one onto service operations. Domain errors become
//! `{"code", "message"}` bodies with 404 for missing records, 409 for
//! duplicates and records still in use, and 400 for invalid input.

pub mod error;
mod handlers;
pub mod state;

use std::net::SocketAddr;

use axum::routing::{delete, get};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::Result;

pub use error::{ApiError, ErrorBody};
pub use handlers::AvailabilityQuery;
pub use state::AppState;

/// Build the router with every route and request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/reservations",
            get(handlers::list_reservations).post(handlers::create_reservation),
        )
        .route("/reservations/{id}", delete(handlers::delete_reservation))
        .route("/times", get(handlers::list_times).post(handlers::create_time))
        .route("/times/available", get(handlers::available_times))
        .route("/times/{id}", delete(handlers::delete_time))
        .route("/themes", get(handlers::list_themes).post(handlers::create_theme))
        .route("/themes/popular", get(handlers::popular_themes))
        .route("/themes/{id}", delete(handlers::delete_theme))
        .route("/members", get(handlers::list_members).post(handlers::create_member))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on `addr` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
