//! Authentication gate.
//!
//! Runs before the access predicate. The two checks stay separate: a route
//! can be public (no authentication) and still role-restricted, or require
//! authentication with no role restriction.

use crate::routing::node::Route;
use crate::session::Session;

/// True when the caller must be sent to the home location instead of served.
pub fn must_redirect(session: &Session, route: &Route) -> bool {
    route.requires_authentication() && !session.authenticated
}
