//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{BillsQuery, ErrorResponse, SummaryResponse};
use crate::accounts::UtilityKind;
use crate::rates::RateTable;
use crate::statement::BillLine;

/// Returns the rate table.
///
/// `GET /rates` → 200 + `RateTable` JSON (unbounded limits as `null`)
pub async fn get_rates(State(state): State<Arc<AppState>>) -> Json<RateTable> {
    Json(state.rates.clone())
}

/// Returns bill lines, optionally filtered by utility.
///
/// `GET /bills` → 200 + `Vec<BillLine>` JSON
/// `GET /bills?utility=water` → water lines only
/// `GET /bills?utility=steam` → 400 + `ErrorResponse`
pub async fn get_bills(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BillsQuery>,
) -> impl IntoResponse {
    let filter = match query.utility.as_deref().map(str::parse::<UtilityKind>) {
        None => None,
        Some(Ok(kind)) => Some(kind),
        Some(Err(e)) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ));
        }
    };

    let lines: Vec<BillLine> = state
        .statement
        .lines()
        .iter()
        .filter(|l| filter.is_none_or(|k| l.utility == k))
        .cloned()
        .collect();

    Ok(Json(lines))
}

/// Returns statement totals.
///
/// `GET /summary` → 200 + `SummaryResponse` JSON
pub async fn get_summary(State(state): State<Arc<AppState>>) -> Json<SummaryResponse> {
    Json(SummaryResponse::from(&state.statement))
}
