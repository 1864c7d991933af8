//! HTTP server setup.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all route handler
//! - Wire up middleware (request ID, tracing)
//! - Resolve request paths against the route registry
//! - Resolve the caller's session and run the dispatcher
//! - Serve until shutdown

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, GateConfig};
use crate::dispatch::Dispatcher;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response::{not_found, outcome_response};
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::metrics;
use crate::routing::{RouteRegistry, RouteRequest};
use crate::session::SessionStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub sessions: SessionStore,
    pub gate: Arc<GateConfig>,
}

/// HTTP server for the portal.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: AppConfig, dispatcher: Arc<Dispatcher>, sessions: SessionStore) -> Self {
        let state = AppState {
            dispatcher,
            sessions,
            gate: Arc::new(config.gate.clone()),
        };
        let router = Self::build_router(state.clone());
        Self {
            router,
            config,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", get(route_handler))
            .route("/{*path}", get(route_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(propagate_request_id_layer()),
            )
    }

    /// A clone of the configured router, e.g. for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.state.sessions
    }

    pub fn registry(&self) -> &RouteRegistry {
        self.state.dispatcher.registry()
    }

    /// Run the server until Ctrl+C, SIGTERM, or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.registry().len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: resolve the path, then dispatch.
async fn route_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let started = Instant::now();
    let path = request.uri().path().to_string();
    let request_id = request_id(request.headers()).to_string();
    let registry = state.dispatcher.registry();

    let Some((target, declared)) = registry
        .resolve(&path)
        .and_then(|target| registry.route(target).map(|route| (target, route.path().to_string())))
    else {
        tracing::warn!(request_id = %request_id, path = %path, "No route matched");
        metrics::record_unmatched();
        return not_found();
    };

    let (session_id, session) = state.sessions.resolve(request.headers());
    let dispatch = state
        .dispatcher
        .dispatch(
            target,
            RouteRequest {
                session_id,
                session,
                request,
            },
        )
        .await;

    tracing::debug!(
        request_id = %request_id,
        path = %path,
        route = %declared,
        outcome = dispatch.outcome.label(),
        stages = ?dispatch.trail,
        "Request dispatched"
    );
    metrics::record_dispatch(&declared, dispatch.outcome.label(), started);

    outcome_response(dispatch.outcome, &state.gate)
}
