//! Routing subsystem: the route-permission tree.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     RouteDecl[]
//!     → registry.rs (validate, fail fast on misconfiguration)
//!     → Freeze as immutable RouteRegistry
//!
//! Incoming Request (path, session):
//!     → registry.rs (resolve path → Target)
//!     → gate.rs (authentication check)
//!     → access.rs (role predicate)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Gate and predicate are separate, independently testable checks
//! - Caller roles are request-scoped values, never stored on routes

pub mod access;
pub mod binding;
pub mod gate;
pub mod matcher;
pub mod node;
pub mod registry;

pub use access::{allows, AccessPredicate, RoleSet};
pub use binding::{loader_fn, Binding, DataLoader, RouteRequest, LoadError, RouteHandler};
pub use gate::must_redirect;
pub use node::{NavEntry, Route, RouteDecl, RouteNode};
pub use registry::{RegistryError, RouteRegistry, Target};
