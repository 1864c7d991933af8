//! Data loaders for the portal's pages.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::providers::Directory;
use crate::routing::{loader_fn, DataLoader, LoadError, RoleSet};

/// A dashboard shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub title: &'static str,
    pub link: &'static str,
}

const fn item(title: &'static str, link: &'static str) -> MenuItem {
    MenuItem { title, link }
}

/// Dashboard shortcuts for the caller's roles, in role order.
///
/// Entries are not deduplicated across roles.
pub fn dashboard_menu(roles: &RoleSet) -> Vec<MenuItem> {
    let mut items = Vec::new();

    if roles.contains("Doctor") {
        items.extend([
            item("Gestión de Usuarios", "/users"),
            item("Mis Especialidades", "/speciality"),
            item("Mis Horarios de Atención", "/schedule"),
            item("Mis Disponibilidad", "/availability"),
            item("Mis Citas", "/appointment"),
        ]);
    }
    if roles.contains("Paciente") {
        items.extend([
            item("Mis Citas", "/appointment"),
            item("Historia Clínica", "/historyClinic"),
        ]);
    }
    if roles.contains("Administrador") {
        items.extend([
            item("Gestión de Usuarios", "/users"),
            item("Roles y Permisos", "/roles"),
        ]);
    }
    items.push(item("Configuración", "/dashboard/configuracion"));

    items
}

pub fn dashboard() -> Arc<dyn DataLoader> {
    loader_fn(|roles: RoleSet| async move {
        Ok::<_, LoadError>(serde_json::to_value(dashboard_menu(&roles))?)
    })
}

/// All permissions.
pub fn permissions(directory: Arc<dyn Directory>) -> Arc<dyn DataLoader> {
    loader_fn(move |_roles: RoleSet| {
        let directory = directory.clone();
        async move {
            let permissions = directory.permissions().await?;
            Ok::<_, LoadError>(serde_json::to_value(permissions)?)
        }
    })
}

/// Roles with their permissions, all permissions, and users with their roles.
pub fn roles_overview(directory: Arc<dyn Directory>) -> Arc<dyn DataLoader> {
    loader_fn(move |_roles: RoleSet| {
        let directory = directory.clone();
        async move {
            let (permissions, roles, users) = futures_util::try_join!(
                directory.permissions(),
                directory.roles(),
                directory.users()
            )?;
            Ok::<_, LoadError>(json!({
                "roles": roles,
                "permissions": permissions,
                "users": users,
            }))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{MemoryDirectory, Seed};

    fn roles(names: &[&str]) -> RoleSet {
        names.iter().copied().collect()
    }

    fn links(items: &[MenuItem]) -> Vec<&str> {
        items.iter().map(|i| i.link).collect()
    }

    #[test]
    fn test_menu_without_roles_has_settings_only() {
        assert_eq!(links(&dashboard_menu(&RoleSet::new())), ["/dashboard/configuracion"]);
    }

    #[test]
    fn test_menu_for_patient() {
        assert_eq!(
            links(&dashboard_menu(&roles(&["Paciente"]))),
            ["/appointment", "/historyClinic", "/dashboard/configuracion"]
        );
    }

    #[test]
    fn test_menu_combines_roles_in_order() {
        let menu = dashboard_menu(&roles(&["Administrador", "Doctor"]));
        assert_eq!(menu.len(), 8);
        assert_eq!(menu[0].link, "/users");
        assert_eq!(menu[5], item("Gestión de Usuarios", "/users"));
        assert_eq!(menu[6].link, "/roles");
    }

    #[tokio::test]
    async fn test_dashboard_loader_uses_caller_roles() {
        let value = dashboard().load(&roles(&["Paciente"])).await.unwrap();
        assert_eq!(value.as_array().unwrap().len(), 3);
        assert_eq!(value[1]["title"], "Historia Clínica");
    }

    #[tokio::test]
    async fn test_roles_overview_shape() {
        let directory: Arc<dyn Directory> = Arc::new(MemoryDirectory::new(Seed::builtin()));
        let value = roles_overview(directory).load(&RoleSet::new()).await.unwrap();

        assert_eq!(value["roles"].as_array().unwrap().len(), 4);
        assert_eq!(value["permissions"].as_array().unwrap().len(), 4);
        assert_eq!(value["users"][0]["roles"][0]["name"], "Administrador");
    }

    #[tokio::test]
    async fn test_permissions_loader() {
        let directory: Arc<dyn Directory> = Arc::new(MemoryDirectory::new(Seed::builtin()));
        let value = permissions(directory).load(&RoleSet::new()).await.unwrap();
        assert_eq!(value[0]["id"], "p-users");
    }
}
