//! REST API over a closed billing period.
//!
//! Provides three GET endpoints:
//! - `/rates` returns the rate table the period was billed against
//! - `/bills` returns bill lines, optionally filtered by `?utility=`
//! - `/summary` returns statement totals, overall and per utility

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::rates::RateTable;
use crate::statement::BillStatement;

pub use types::{ErrorResponse, SummaryResponse, UtilityTotal};

/// Immutable application state shared across all request handlers.
///
/// Constructed once after the billing period closes and wrapped in `Arc`;
/// all data is read-only.
#[derive(Debug)]
pub struct AppState {
    /// Rate table snapshot.
    pub rates: RateTable,
    /// Period statement.
    pub statement: BillStatement,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/rates", get(handlers::get_rates))
        .route("/bills", get(handlers::get_bills))
        .route("/summary", get(handlers::get_summary))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
