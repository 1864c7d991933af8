//! In-memory session store keyed by cookie.

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use dashmap::DashMap;
use uuid::Uuid;

use crate::session::Session;

/// Identifier carried in the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw).ok().map(Self)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Concurrent session table.
#[derive(Clone)]
pub struct SessionStore {
    cookie_name: String,
    sessions: Arc<DashMap<SessionId, Session>>,
}

impl SessionStore {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            sessions: Arc::new(DashMap::new()),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Store a session and return its new id.
    pub fn insert(&self, session: Session) -> SessionId {
        let id = SessionId(Uuid::new_v4());
        self.sessions.insert(id, session);
        id
    }

    pub fn get(&self, id: SessionId) -> Option<Session> {
        self.sessions.get(&id).map(|r| r.value().clone())
    }

    /// Invalidate a session. Returns true if it existed.
    pub fn remove(&self, id: SessionId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Resolve the caller's session from request headers.
    ///
    /// The id is returned only if it names a live session; anything else
    /// resolves to the anonymous session.
    pub fn resolve(&self, headers: &HeaderMap) -> (Option<SessionId>, Session) {
        let found = self
            .session_id(headers)
            .and_then(|id| self.get(id).map(|session| (id, session)));
        match found {
            Some((id, session)) => (Some(id), session),
            None => (None, Session::anonymous()),
        }
    }

    /// `Set-Cookie` value that clears the session cookie.
    pub fn clear_cookie(&self) -> String {
        format!("{}=; Path=/; Max-Age=0; HttpOnly", self.cookie_name)
    }

    /// `Set-Cookie` value that binds `id` to the client.
    pub fn set_cookie(&self, id: SessionId) -> String {
        format!("{}={}; Path=/; HttpOnly", self.cookie_name, id)
    }

    fn session_id(&self, headers: &HeaderMap) -> Option<SessionId> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .and_then(|(_, value)| SessionId::parse(value.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_resolve_known_session() {
        let store = SessionStore::new("sid");
        let session = Session::authenticated("u1", "Ana", ["Doctor"].into_iter().collect());
        let id = store.insert(session.clone());

        let (resolved_id, resolved) = store.resolve(&headers(&format!("theme=dark; sid={}", id)));
        assert_eq!(resolved_id, Some(id));
        assert_eq!(resolved, session);
    }

    #[test]
    fn test_missing_or_unknown_cookie_is_anonymous() {
        let store = SessionStore::new("sid");

        let (id, session) = store.resolve(&HeaderMap::new());
        assert_eq!(id, None);
        assert_eq!(session, Session::anonymous());

        let (id, session) = store.resolve(&headers(&format!("sid={}", Uuid::new_v4())));
        assert_eq!(id, None);
        assert!(!session.authenticated);

        let (id, _) = store.resolve(&headers("sid=not-a-uuid"));
        assert_eq!(id, None);
    }

    #[test]
    fn test_cookie_strings_round_trip() {
        let store = SessionStore::new("sid");
        let id = store.insert(Session::anonymous());
        let set = store.set_cookie(id);
        let pair = set.split(';').next().unwrap();

        assert_eq!(store.resolve(&headers(pair)).0, Some(id));
        assert!(store.clear_cookie().starts_with("sid=;"));
    }

    #[test]
    fn test_remove_invalidates() {
        let store = SessionStore::new("sid");
        let id = store.insert(Session::authenticated("u1", "Ana", Default::default()));
        assert!(store.remove(id));
        assert!(!store.remove(id));
        assert!(store.get(id).is_none());
    }
}
