//! Path prefix matching.
//!
//! # Responsibilities
//! - Match request paths against a declared route prefix
//! - Respect segment boundaries ("/users" matches "/users/admin", not "/usersx")
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - No patterns or regex: a prefix is a literal path
//! - Trailing slash on the request is accepted

/// Matches the request path against a literal prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true if `path` equals the prefix or continues it at a `/`.
    pub fn matches(&self, path: &str) -> bool {
        if self.prefix == "/" {
            return path.starts_with('/');
        }
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}
