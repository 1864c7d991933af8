//! Route registry: construction, validation and lookup.
//!
//! # Responsibilities
//! - Validate route declarations once, at startup
//! - Freeze them into an immutable table of [`RouteNode`]s
//! - Resolve request paths to a route
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc, no locks)
//! - Returns all declaration errors, not just the first
//! - O(n) prefix scan, longest prefix first; ties go to the first declared
//! - Explicit `None` for unmatched paths rather than a silent default

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::routing::binding::Binding;
use crate::routing::matcher::PathPrefixMatcher;
use crate::routing::node::{NavEntry, Route, RouteDecl, RouteNode};

/// A declaration problem found while building the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("route path '{0}' must start with '/' and must not end with '/'")]
    InvalidPath(String),

    #[error("duplicate top-level route '{0}'")]
    DuplicatePath(String),

    #[error("duplicate sub-route '{path}' under '{parent}'")]
    DuplicateSubPath { parent: String, path: String },

    #[error("route '{0}' declares neither a view nor a handler")]
    MissingBinding(String),

    #[error("route '{0}' declares a handler together with a view or loader")]
    ConflictingBinding(String),

    #[error("sub-route '{0}' declares its own sub-routes; only one level is supported")]
    NestedTooDeep(String),
}

/// Position of a route inside the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Node(usize),
    SubNode { node: usize, sub: usize },
}

impl Target {
    pub fn is_sub_node(&self) -> bool {
        matches!(self, Target::SubNode { .. })
    }
}

/// The ordered, immutable table of top-level routes.
#[derive(Debug)]
pub struct RouteRegistry {
    nodes: Vec<RouteNode>,
    /// Every routable path, longest prefix first.
    index: Vec<(PathPrefixMatcher, Target)>,
    navigation: Vec<NavEntry>,
}

impl RouteRegistry {
    /// Validate declarations and build the registry.
    pub fn build(decls: Vec<RouteDecl>) -> Result<Self, Vec<RegistryError>> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();
        // Sub-route path to the first parent declaring it.
        let mut sub_owners: HashMap<String, String> = HashMap::new();
        let mut nodes = Vec::with_capacity(decls.len());

        for mut decl in decls {
            if !seen.insert(decl.path.clone()) {
                errors.push(RegistryError::DuplicatePath(decl.path.clone()));
            }

            let mut sub_seen = HashSet::new();
            let mut sub_nodes = Vec::with_capacity(decl.sub_routes.len());
            for sub in std::mem::take(&mut decl.sub_routes) {
                if !sub_seen.insert(sub.path.clone()) {
                    errors.push(RegistryError::DuplicateSubPath {
                        parent: decl.path.clone(),
                        path: sub.path.clone(),
                    });
                }
                match sub_owners.get(&sub.path) {
                    Some(owner) if *owner != decl.path => tracing::warn!(
                        path = %sub.path,
                        parent = %decl.path,
                        shadowed_by = %owner,
                        "Sub-route is also declared under another parent; requests resolve to the first"
                    ),
                    Some(_) => {}
                    None => {
                        sub_owners.insert(sub.path.clone(), decl.path.clone());
                    }
                }
                if !sub.sub_routes.is_empty() {
                    errors.push(RegistryError::NestedTooDeep(sub.path.clone()));
                }
                if let Some(route) = compile(sub, &mut errors) {
                    sub_nodes.push(route);
                }
            }

            if let Some(route) = compile(decl, &mut errors) {
                nodes.push(RouteNode { route, sub_nodes });
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let mut index = Vec::new();
        for (n, node) in nodes.iter().enumerate() {
            index.push((PathPrefixMatcher::new(node.route.path.clone()), Target::Node(n)));
            for (s, sub) in node.sub_nodes.iter().enumerate() {
                index.push((
                    PathPrefixMatcher::new(sub.path.clone()),
                    Target::SubNode { node: n, sub: s },
                ));
            }
        }
        // Stable: equal prefixes keep declaration order.
        index.sort_by(|a, b| b.0.prefix().len().cmp(&a.0.prefix().len()));

        let navigation = nodes
            .iter()
            .map(|node| {
                let subs = node.sub_nodes.iter().map(|s| NavEntry::of(s, Vec::new())).collect();
                NavEntry::of(&node.route, subs)
            })
            .collect();

        Ok(Self {
            nodes,
            index,
            navigation,
        })
    }

    pub fn nodes(&self) -> &[RouteNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Serializable snapshot of the full table, for navigation.
    pub fn navigation(&self) -> &[NavEntry] {
        &self.navigation
    }

    /// Look up a route by its exact declared path.
    pub fn find(&self, path: &str) -> Option<Target> {
        self.index
            .iter()
            .find(|(matcher, _)| matcher.prefix() == path)
            .map(|(_, target)| *target)
    }

    /// Resolve a request path to the most specific declared prefix.
    pub fn resolve(&self, path: &str) -> Option<Target> {
        self.index
            .iter()
            .find(|(matcher, _)| matcher.matches(path))
            .map(|(_, target)| *target)
    }

    pub fn route(&self, target: Target) -> Option<&Route> {
        match target {
            Target::Node(n) => self.nodes.get(n).map(|node| &node.route),
            Target::SubNode { node, sub } => {
                self.nodes.get(node).and_then(|node| node.sub_nodes.get(sub))
            }
        }
    }
}

fn valid_path(path: &str) -> bool {
    path == "/" || (path.starts_with('/') && !path.ends_with('/'))
}

/// Turn one declaration into a route, recording any problems.
fn compile(decl: RouteDecl, errors: &mut Vec<RegistryError>) -> Option<Route> {
    if !valid_path(&decl.path) {
        errors.push(RegistryError::InvalidPath(decl.path));
        return None;
    }

    let binding = match (decl.handler, decl.view, decl.loader) {
        (Some(handler), None, None) => Binding::Handler(handler),
        (Some(_), _, _) => {
            errors.push(RegistryError::ConflictingBinding(decl.path));
            return None;
        }
        (None, Some(view), loader) => Binding::Render { view, loader },
        (None, None, _) => {
            errors.push(RegistryError::MissingBinding(decl.path));
            return None;
        }
    };

    Some(Route {
        path: decl.path,
        title: decl.title,
        icon: decl.icon,
        required_roles: decl.required_roles,
        requires_authentication: decl.requires_authentication,
        binding,
    })
}
