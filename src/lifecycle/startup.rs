//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize collaborators (directory, sessions, renderer)
//! - Build and validate the route registry
//! - Assemble the HTTP server
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Every registry problem is reported, not just the first
//! - Listeners start last (traffic only when ready)

use std::sync::Arc;

use thiserror::Error;

use crate::config::AppConfig;
use crate::dispatch::Dispatcher;
use crate::http::HttpServer;
use crate::portal::{self, PortalDeps};
use crate::providers::{Directory, MemoryDirectory, ProviderError, Seed};
use crate::render::{MiniJinjaRenderer, RenderError, Renderer};
use crate::routing::{RegistryError, RouteRegistry};
use crate::session::SessionStore;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load seed data: {0}")]
    Seed(#[from] ProviderError),

    #[error("failed to load templates: {0}")]
    Templates(#[from] RenderError),

    #[error("invalid route declaration: {}", join(.0))]
    Registry(Vec<RegistryError>),
}

fn join(errors: &[RegistryError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Build the portal's registry with the given collaborators.
pub fn build_registry(deps: &PortalDeps) -> Result<RouteRegistry, StartupError> {
    RouteRegistry::build(portal::declaration(deps)).map_err(StartupError::Registry)
}

/// Wire every subsystem from configuration.
pub fn build_server(config: AppConfig) -> Result<HttpServer, StartupError> {
    let seed = match &config.data.seed_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading seed data");
            Seed::load(path)?
        }
        None => Seed::builtin(),
    };
    let directory: Arc<dyn Directory> = Arc::new(MemoryDirectory::new(seed));
    let sessions = SessionStore::new(config.session.cookie_name.clone());

    let deps = PortalDeps {
        directory: directory.clone(),
        sessions: sessions.clone(),
        home_location: config.gate.home_location.clone(),
    };
    let registry = Arc::new(build_registry(&deps)?);
    tracing::info!(routes = registry.len(), "Route registry built");

    let renderer: Arc<dyn Renderer> =
        Arc::new(MiniJinjaRenderer::from_dir(&config.templates.directory)?);
    tracing::info!(directory = %config.templates.directory.display(), "Templates compiled");
    let dispatcher = Arc::new(Dispatcher::new(
        registry,
        renderer,
        directory,
        config.gate.home_location.clone(),
    ));

    Ok(HttpServer::new(config, dispatcher, sessions))
}
