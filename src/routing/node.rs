//! Route nodes and their declarations.
//!
//! [`RouteDecl`] is the loose, declarative form written by hand at startup.
//! [`RouteRegistry::build`](crate::routing::RouteRegistry::build) checks it
//! and produces the frozen [`RouteNode`] / [`Route`] pair used at request time.

use std::sync::Arc;

use serde::Serialize;

use crate::routing::access::RoleSet;
use crate::routing::binding::{Binding, DataLoader, RouteHandler};

/// One addressable route.
///
/// Immutable after construction and shared by every request; nothing
/// request-scoped is ever stored here.
#[derive(Debug, Clone)]
pub struct Route {
    pub(crate) path: String,
    pub(crate) title: String,
    pub(crate) icon: Option<String>,
    pub(crate) required_roles: RoleSet,
    pub(crate) requires_authentication: bool,
    pub(crate) binding: Binding,
}

impl Route {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn required_roles(&self) -> &RoleSet {
        &self.required_roles
    }

    pub fn requires_authentication(&self) -> bool {
        self.requires_authentication
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }
}

/// A top-level route and its flat list of sub-routes.
///
/// Sub-routes are plain [`Route`]s, so nesting stops at one level.
#[derive(Debug, Clone)]
pub struct RouteNode {
    pub(crate) route: Route,
    pub(crate) sub_nodes: Vec<Route>,
}

impl RouteNode {
    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn sub_nodes(&self) -> &[Route] {
        &self.sub_nodes
    }
}

/// Declarative description of a route, validated when the registry is built.
#[derive(Default, Clone)]
pub struct RouteDecl {
    pub path: String,
    pub title: String,
    pub icon: Option<String>,
    pub required_roles: RoleSet,
    pub requires_authentication: bool,
    pub view: Option<String>,
    pub loader: Option<Arc<dyn DataLoader>>,
    pub handler: Option<Arc<dyn RouteHandler>>,
    pub sub_routes: Vec<RouteDecl>,
}

impl RouteDecl {
    pub fn new(path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_roles = roles.into_iter().collect();
        self
    }

    pub fn requires_authentication(mut self, required: bool) -> Self {
        self.requires_authentication = required;
        self
    }

    pub fn view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    pub fn loader(mut self, loader: Arc<dyn DataLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn handler(mut self, handler: Arc<dyn RouteHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn sub_route(mut self, sub: RouteDecl) -> Self {
        self.sub_routes.push(sub);
        self
    }
}

impl std::fmt::Debug for RouteDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteDecl")
            .field("path", &self.path)
            .field("required_roles", &self.required_roles)
            .field("requires_authentication", &self.requires_authentication)
            .field("view", &self.view)
            .field("loader", &self.loader.is_some())
            .field("handler", &self.handler.is_some())
            .field("sub_routes", &self.sub_routes)
            .finish()
    }
}

/// Serializable listing of a route, used for navigation in templates.
#[derive(Debug, Clone, Serialize)]
pub struct NavEntry {
    pub path: String,
    pub title: String,
    pub icon: Option<String>,
    pub required_roles: RoleSet,
    pub requires_authentication: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_routes: Vec<NavEntry>,
}

impl NavEntry {
    pub(crate) fn of(route: &Route, sub_routes: Vec<NavEntry>) -> Self {
        Self {
            path: route.path.clone(),
            title: route.title.clone(),
            icon: route.icon.clone(),
            required_roles: route.required_roles.clone(),
            requires_authentication: route.requires_authentication,
            sub_routes,
        }
    }
}
