//! Data-loading and handler bindings attached to routes.
//!
//! A route either renders a view (optionally fed by a loader) or hands the
//! whole request to a handler. The two are exclusive: see [`Binding`].

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::future::{BoxFuture, FutureExt};
use serde_json::Value;
use thiserror::Error;

use crate::providers::ProviderError;
use crate::routing::access::RoleSet;
use crate::session::{Session, SessionId};

/// Failure of a loader or one of the providers it called.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("failed to encode loaded data: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type LoadResult = Result<Value, LoadError>;

/// Produces the data for a route's render context.
///
/// Receives the caller's roles for this request only. Loaders are expected
/// to be read-only: dropping the returned future abandons the load.
pub trait DataLoader: Send + Sync {
    fn load(&self, caller: &RoleSet) -> BoxFuture<'static, LoadResult>;
}

/// Adapter turning an async closure into a [`DataLoader`].
pub struct FnLoader<F>(pub F);

impl<F, Fut> DataLoader for FnLoader<F>
where
    F: Fn(RoleSet) -> Fut + Send + Sync,
    Fut: Future<Output = LoadResult> + Send + 'static,
{
    fn load(&self, caller: &RoleSet) -> BoxFuture<'static, LoadResult> {
        (self.0)(caller.clone()).boxed()
    }
}

/// Wrap an async closure as a shared loader.
pub fn loader_fn<F, Fut>(f: F) -> Arc<dyn DataLoader>
where
    F: Fn(RoleSet) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = LoadResult> + Send + 'static,
{
    Arc::new(FnLoader(f))
}

/// A request as seen by the dispatcher and by handler overrides.
pub struct RouteRequest {
    pub session_id: Option<SessionId>,
    pub session: Session,
    pub request: Request<Body>,
}

/// Full request/response override for a route.
pub trait RouteHandler: Send + Sync {
    fn handle(&self, request: RouteRequest) -> BoxFuture<'static, Response>;
}

/// How a route produces its response once both gates pass.
#[derive(Clone)]
pub enum Binding {
    /// Render `view` with data from `loader` (no loader means no data).
    Render {
        view: String,
        loader: Option<Arc<dyn DataLoader>>,
    },
    /// Delegate the whole request.
    Handler(Arc<dyn RouteHandler>),
}

impl Binding {
    pub fn view(&self) -> Option<&str> {
        match self {
            Binding::Render { view, .. } => Some(view),
            Binding::Handler(_) => None,
        }
    }

    pub fn has_loader(&self) -> bool {
        matches!(self, Binding::Render { loader: Some(_), .. })
    }

    pub fn is_handler(&self) -> bool {
        matches!(self, Binding::Handler(_))
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Binding::Render { view, loader } => f
                .debug_struct("Render")
                .field("view", view)
                .field("loader", &loader.is_some())
                .finish(),
            Binding::Handler(_) => f.write_str("Handler"),
        }
    }
}
