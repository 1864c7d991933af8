//! Role-gated route registry for a server-rendered portal.

pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod portal;
pub mod providers;
pub mod render;
pub mod routing;
pub mod session;

pub use config::AppConfig;
pub use dispatch::Dispatcher;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RouteRegistry;
