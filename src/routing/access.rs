//! Role sets and the access predicate.
//!
//! # Design Decisions
//! - Roles are flat labels; no role implies another
//! - An empty requirement means "no role restriction", never "deny all"
//! - At-least-one match, not all-required

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A set of role names.
///
/// Ordered so that rendering and logging are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<String>);

impl RoleSet {
    /// The empty role set.
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn contains(&self, role: &str) -> bool {
        self.0.contains(role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// True if at least one role is shared with `other`.
    pub fn intersects(&self, other: &RoleSet) -> bool {
        // Walk the smaller set.
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.0.iter().any(|role| large.0.contains(role))
    }
}

impl<S: Into<String>> FromIterator<S> for RoleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl std::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, role) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", role)?;
        }
        write!(f, "}}")
    }
}

/// Signature of the access predicate, as exported to the templating layer.
pub type AccessPredicate = fn(&RoleSet, &RoleSet) -> bool;

/// Decide whether a caller holding `caller` may reach a route requiring `required`.
pub fn allows(caller: &RoleSet, required: &RoleSet) -> bool {
    required.is_empty() || caller.intersects(required)
}
