//! Ticket submission endpoint.
//!
//! The body is parsed by hand so that an empty body, malformed JSON and
//! validation failures each map to their own 400 message. A whitespace-only
//! body is malformed JSON, not a missing one. Every response,
//! including errors and the preflight, carries the same fixed CORS headers.

use axum::{
    body::Bytes,
    extract::State,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};

use helpdesk_core::metrics::{TICKETS_SUBMITTED, VALIDATION_FAILURES};
use helpdesk_core::{validate, RawSubmission, TicketMessage};

use crate::state::AppState;

pub const SUBMITTED_MESSAGE: &str = "Ticket validated and sent to the queue successfully";
pub const MISSING_BODY_MESSAGE: &str = "Missing request body";
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON in request body";
pub const QUEUE_UNAVAILABLE_MESSAGE: &str = "Ticket queue is unavailable, please retry later";

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct IntakeErrorResponse {
    pub error: String,
}

fn cors_headers(origin: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_str(origin).unwrap_or_else(|_| HeaderValue::from_static("*")),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST,OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("false"),
    );
    headers
}

fn rejected(state: &AppState, status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        cors_headers(state.allowed_origin()),
        Json(IntakeErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Validate a submission and enqueue it for processing
pub async fn submit_ticket(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    if body.is_empty() {
        VALIDATION_FAILURES.with_label_values(&["malformed_body"]).inc();
        return rejected(&state, StatusCode::BAD_REQUEST, MISSING_BODY_MESSAGE);
    }

    let raw: RawSubmission = match serde_json::from_slice(&body) {
        Ok(raw) => raw,
        Err(e) => {
            debug!("Rejecting submission with malformed body: {}", e);
            VALIDATION_FAILURES.with_label_values(&["malformed_body"]).inc();
            return rejected(&state, StatusCode::BAD_REQUEST, INVALID_JSON_MESSAGE);
        }
    };

    let request = match validate(&raw) {
        Ok(request) => request,
        Err(e) => {
            debug!("Rejecting submission: {}", e);
            VALIDATION_FAILURES.with_label_values(&[e.reason()]).inc();
            return rejected(&state, StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    let ticket_id = request.ticket_id.clone();
    if let Err(e) = state.queue().enqueue(TicketMessage::from(request)) {
        error!("Failed to enqueue ticket {}: {}", ticket_id, e);
        return rejected(&state, StatusCode::SERVICE_UNAVAILABLE, QUEUE_UNAVAILABLE_MESSAGE);
    }

    TICKETS_SUBMITTED.inc();
    info!("Ticket {} accepted onto queue {}", ticket_id, state.queue().name());

    (
        StatusCode::OK,
        cors_headers(state.allowed_origin()),
        Json(SubmitResponse {
            message: SUBMITTED_MESSAGE.to_string(),
        }),
    )
        .into_response()
}

/// CORS preflight
pub async fn preflight(State(state): State<Arc<AppState>>) -> Response {
    (StatusCode::OK, cors_headers(state.allowed_origin())).into_response()
}
