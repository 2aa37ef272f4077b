//! Requester lookup API handler.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use helpdesk_core::RequesterRecord;
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

/// Error response
#[derive(Debug, Serialize)]
pub struct RequesterErrorResponse {
    pub error: String,
}

/// Get a requester record and its tickets by email
pub async fn get_requester(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<RequesterRecord>, impl IntoResponse> {
    match state.store().get(&email) {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(RequesterErrorResponse {
                error: format!("Requester not found: {}", email),
            }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(RequesterErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}
