//! Route Gate (v1)
//!
//! Serves a server-rendered portal whose pages are gated by a static,
//! role-annotated route table.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ routing::registry (resolve path)
//!                          │
//!                          ▼
//!                    session::store (cookie → Session)
//!                          │
//!                          ▼
//!                    dispatch::Dispatcher
//!                      gate → predicate → handler | loader → render
//!                          │                          │         │
//!                          │                   providers   render::jinja
//!                          ▼
//!     Client Response ◀── http::response (redirect / 403 / 500 / page)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;

use route_gate::config::{self, AppConfig};
use route_gate::lifecycle::{build_server, Shutdown};
use route_gate::observability::{logging, metrics};
use route_gate::RouteRegistry;

#[derive(Debug, Parser)]
#[command(name = "route-gate", version, about = "Role-gated portal server")]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "ROUTE_GATE_CONFIG")]
    config: Option<PathBuf>,

    /// Validate configuration and routes, print the route table, and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match config::load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => AppConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!("route-gate v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        templates = %config.templates.directory.display(),
        home_location = %config.gate.home_location,
        "Configuration loaded"
    );

    let server = match build_server(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    if args.check {
        print_routes(server.registry());
        return ExitCode::SUCCESS;
    }

    let observability = server.config().observability.clone();
    if observability.metrics_enabled {
        match observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = match TcpListener::bind(&server.config().listener.bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    if let Err(e) = server.run(listener, shutdown.subscribe()).await {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}

fn print_routes(registry: &RouteRegistry) {
    let line = |indent: &str, route: &route_gate::routing::Route| {
        let access = if route.requires_authentication() { "auth" } else { "public" };
        let target = route.binding().view().unwrap_or("<handler>");
        println!(
            "{indent}{:<24} {:<6} {:<40} {}",
            route.path(),
            access,
            route.required_roles().to_string(),
            target
        );
    };
    for node in registry.nodes() {
        line("", node.route());
        for sub in node.sub_nodes() {
            line("  ", sub);
        }
    }
}
