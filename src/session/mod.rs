//! Session collaborator.
//!
//! # Data Flow
//! ```text
//! Cookie header (sid=<uuid>)
//!     → store.rs (lookup)
//!     → Session (or the anonymous session)
//! ```

pub mod store;

use serde::{Deserialize, Serialize};

use crate::routing::access::RoleSet;

pub use store::{SessionId, SessionStore};

/// What the session layer knows about the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub authenticated: bool,
    pub roles: RoleSet,
    /// Opaque identity used to fetch the caller's profile.
    pub user_id: Option<String>,
    /// Display name.
    pub name: Option<String>,
}

impl Session {
    /// The session of a caller without a session: unauthenticated, no roles.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user_id: impl Into<String>, name: impl Into<String>, roles: RoleSet) -> Self {
        Self {
            authenticated: true,
            roles,
            user_id: Some(user_id.into()),
            name: Some(name.into()),
        }
    }
}
