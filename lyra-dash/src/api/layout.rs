//! Page view-model endpoint

use axum::{extract::State, Json};

use crate::layout::Node;
use crate::AppState;

/// GET /api/layout
///
/// Returns the page tree composed at startup. Interactive regions are empty
/// placeholders; the client fills them through `/api/update`.
pub async fn get_layout(State(state): State<AppState>) -> Json<Node> {
    Json(state.page.as_ref().clone())
}
