//! Menu route handler.

use axum::{Json, extract::State, response::IntoResponse};
use tracing::instrument;

use crate::menu::MenuData;
use crate::state::AppState;

/// Serve the menu dataset.
///
/// `GET /api/menu`
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> impl IntoResponse {
    Json::<MenuData>(state.menu().data().clone())
}
