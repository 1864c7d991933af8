//! Response mapping.
//!
//! # Responsibilities
//! - Map dispatch outcomes to HTTP responses
//!
//! # Design Decisions
//! - Redirects carry a fixed location and no query
//! - Forbidden and server-error bodies are static; no internals leak
//! - Delegated responses pass through untouched

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};

use crate::config::GateConfig;
use crate::dispatch::Outcome;

/// Turn an outcome into the single response sent for the request.
pub fn outcome_response(outcome: Outcome, gate: &GateConfig) -> Response {
    match outcome {
        Outcome::Redirect { location } => Redirect::to(&location).into_response(),
        Outcome::Forbidden => (StatusCode::FORBIDDEN, gate.forbidden_message.clone()).into_response(),
        Outcome::Rendered { body } => Html(body).into_response(),
        Outcome::Delegated(response) => response,
        Outcome::ServerError => {
            (StatusCode::INTERNAL_SERVER_ERROR, gate.server_error_message.clone()).into_response()
        }
        Outcome::NotFound => not_found(),
    }
}

pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "No matching route found").into_response()
}
