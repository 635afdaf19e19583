//! Interaction endpoint
//!
//! The browser posts every dropdown change here and swaps the returned
//! content into the named region.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::interaction::{InteractionError, RegionUpdate};
use crate::AppState;

/// Control value change sent by the page
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    /// Id of the control that changed
    pub control: String,
    /// New value of the control
    pub value: String,
}

/// POST /api/update
pub async fn post_update(
    State(state): State<AppState>,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<RegionUpdate>, UpdateError> {
    let update = state
        .interactions
        .dispatch(&request.control, &request.value)
        .await?;
    Ok(Json(update))
}

/// Update API errors
#[derive(Debug)]
pub enum UpdateError {
    UnknownControl(String),
    InvalidInput(String),
    DatabaseError(String),
}

impl From<InteractionError> for UpdateError {
    fn from(err: InteractionError) -> Self {
        match err {
            InteractionError::UnknownControl(control) => UpdateError::UnknownControl(control),
            InteractionError::Data(lyra_common::Error::InvalidInput(msg)) => {
                UpdateError::InvalidInput(msg)
            }
            InteractionError::Data(other) => UpdateError::DatabaseError(other.to_string()),
        }
    }
}

impl IntoResponse for UpdateError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            UpdateError::UnknownControl(control) => {
                (StatusCode::NOT_FOUND, format!("Unknown control: {}", control))
            }
            UpdateError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, format!("Invalid input: {}", msg))
            }
            UpdateError::DatabaseError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
