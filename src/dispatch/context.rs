//! Render context assembly.

use serde::Serialize;
use serde_json::Value;

use crate::providers::{Directory, Role, User};
use crate::routing::access::{self, AccessPredicate, RoleSet};
use crate::routing::binding::LoadError;
use crate::routing::node::NavEntry;
use crate::session::Session;

/// Everything a view is rendered with.
///
/// Borrows request-scoped values (caller roles, session fields) and the
/// registry's navigation snapshot; nothing here outlives the request.
#[derive(Serialize)]
pub struct RenderContext<'a> {
    pub title: &'a str,
    pub items: Value,
    pub caller_roles: &'a RoleSet,
    pub is_authenticated: bool,
    pub username: Option<&'a str>,
    pub routes: &'a [NavEntry],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_roles: Option<Vec<Role>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_users: Option<Vec<User>>,
    /// The access predicate, for renderers deciding what to show.
    #[serde(skip)]
    pub has_access: AccessPredicate,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        title: &'a str,
        items: Value,
        caller_roles: &'a RoleSet,
        is_authenticated: bool,
        username: Option<&'a str>,
        routes: &'a [NavEntry],
    ) -> Self {
        Self {
            title,
            items,
            caller_roles,
            is_authenticated,
            username,
            routes,
            profile: None,
            all_roles: None,
            all_users: None,
            has_access: access::allows,
        }
    }

    pub fn with_directory_view(mut self, view: DirectoryView) -> Self {
        self.profile = view.profile;
        self.all_roles = Some(view.all_roles);
        self.all_users = Some(view.all_users);
        self
    }
}

/// Directory data shown on every top-level page.
#[derive(Debug, Clone)]
pub struct DirectoryView {
    pub profile: Option<User>,
    pub all_roles: Vec<Role>,
    pub all_users: Vec<User>,
}

impl DirectoryView {
    /// Fetch roles, users and the caller's profile concurrently.
    pub async fn fetch(directory: &dyn Directory, session: &Session) -> Result<Self, LoadError> {
        let profile = async {
            match session.user_id.as_deref() {
                Some(id) => directory.user(id).await,
                None => Ok(None),
            }
        };
        let (all_roles, all_users, profile) =
            futures_util::try_join!(directory.roles(), directory.users(), profile)?;
        Ok(Self {
            profile,
            all_roles,
            all_users,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{MemoryDirectory, Seed};
    use serde_json::json;

    #[tokio::test]
    async fn test_fetch_profile_for_session_user() {
        let directory = MemoryDirectory::new(Seed::builtin());
        let session = Session::authenticated("u-doctor", "Diana", ["Doctor"].into_iter().collect());

        let view = DirectoryView::fetch(&directory, &session).await.unwrap();
        assert_eq!(view.profile.unwrap().name, "Diana Doctora");
        assert_eq!(view.all_roles.len(), 4);
        assert_eq!(view.all_users.len(), 4);
    }

    #[tokio::test]
    async fn test_fetch_without_user_id_has_no_profile() {
        let directory = MemoryDirectory::new(Seed::builtin());
        let view = DirectoryView::fetch(&directory, &Session::anonymous()).await.unwrap();
        assert!(view.profile.is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let roles: RoleSet = ["Paciente"].into_iter().collect();
        let ctx = RenderContext::new("Citas", json!([]), &roles, true, Some("Pablo"), &[]);
        let value = serde_json::to_value(&ctx).unwrap();

        assert_eq!(value["title"], "Citas");
        assert_eq!(value["caller_roles"], json!(["Paciente"]));
        assert_eq!(value["username"], "Pablo");
        assert!(value.get("profile").is_none());
        assert!(value.get("has_access").is_none());
        assert!((ctx.has_access)(&roles, &["Paciente"].into_iter().collect()));
    }
}
