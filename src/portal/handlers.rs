//! Handler overrides.

use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use futures_util::future::{BoxFuture, FutureExt};

use crate::routing::{RouteHandler, RouteRequest};
use crate::session::SessionStore;

/// Invalidates the caller's session and sends them home.
pub struct LogoutHandler {
    sessions: SessionStore,
    home_location: String,
}

impl LogoutHandler {
    pub fn new(sessions: SessionStore, home_location: impl Into<String>) -> Self {
        Self {
            sessions,
            home_location: home_location.into(),
        }
    }
}

impl RouteHandler for LogoutHandler {
    fn handle(&self, request: RouteRequest) -> BoxFuture<'static, Response> {
        if let Some(id) = request.session_id {
            if self.sessions.remove(id) {
                tracing::info!(user_id = ?request.session.user_id, "Session closed");
            }
        }
        let response = (
            [(header::SET_COOKIE, self.sessions.clear_cookie())],
            Redirect::to(&self.home_location),
        )
            .into_response();
        async move { response }.boxed()
    }
}
