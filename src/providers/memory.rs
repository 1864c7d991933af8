//! In-memory directory populated from seed data.

use std::path::Path;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};

use crate::providers::{Directory, Permission, ProviderResult, Role, User};

/// Role as stored: permissions by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedRole {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// User as stored: roles by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Raw records, referencing each other by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub permissions: Vec<Permission>,
    pub roles: Vec<SeedRole>,
    pub users: Vec<SeedUser>,
}

impl Seed {
    /// Load seed data from a JSON file.
    pub fn load(path: &Path) -> ProviderResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// A small portal with one user per role.
    pub fn builtin() -> Self {
        let permission = |id: &str, name: &str, description: &str| Permission {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        };
        let role = |id: &str, name: &str, permissions: &[&str]| SeedRole {
            id: id.into(),
            name: name.into(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        };
        let user = |id: &str, name: &str, email: &str, roles: &[&str]| SeedUser {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        };

        Self {
            permissions: vec![
                permission("p-users", "Gestionar usuarios", "Crear y editar usuarios"),
                permission("p-roles", "Gestionar roles", "Asignar roles y permisos"),
                permission("p-schedule", "Gestionar horarios", "Definir horarios de atención"),
                permission("p-appointments", "Gestionar citas", "Reservar y cancelar citas"),
            ],
            roles: vec![
                role("r-admin", "Administrador", &["p-users", "p-roles"]),
                role("r-chief", "Jefe Médico", &["p-users", "p-schedule"]),
                role("r-doctor", "Doctor", &["p-schedule", "p-appointments"]),
                role("r-patient", "Paciente", &["p-appointments"]),
            ],
            users: vec![
                user("u-admin", "Ada Admin", "admin@clinica.test", &["r-admin"]),
                user("u-chief", "Carlos Jefe", "jefe@clinica.test", &["r-chief", "r-doctor"]),
                user("u-doctor", "Diana Doctora", "doctora@clinica.test", &["r-doctor"]),
                user("u-patient", "Pablo Paciente", "paciente@clinica.test", &["r-patient"]),
            ],
        }
    }
}

/// [`Directory`] over an immutable, fully populated snapshot.
#[derive(Debug, Clone)]
pub struct MemoryDirectory {
    permissions: Arc<[Permission]>,
    roles: Arc<[Role]>,
    users: Arc<[User]>,
}

impl MemoryDirectory {
    /// Populate role and user references. Unknown ids are skipped.
    pub fn new(seed: Seed) -> Self {
        let roles: Vec<Role> = seed
            .roles
            .into_iter()
            .map(|r| Role {
                permissions: r
                    .permissions
                    .iter()
                    .filter_map(|id| seed.permissions.iter().find(|p| &p.id == id).cloned())
                    .collect(),
                id: r.id,
                name: r.name,
            })
            .collect();

        let users: Vec<User> = seed
            .users
            .into_iter()
            .map(|u| User {
                roles: u
                    .roles
                    .iter()
                    .filter_map(|id| roles.iter().find(|r| &r.id == id).cloned())
                    .collect(),
                id: u.id,
                name: u.name,
                email: u.email,
            })
            .collect();

        Self {
            permissions: seed.permissions.into(),
            roles: roles.into(),
            users: users.into(),
        }
    }
}

impl Directory for MemoryDirectory {
    fn permissions(&self) -> BoxFuture<'_, ProviderResult<Vec<Permission>>> {
        async move { Ok(self.permissions.to_vec()) }.boxed()
    }

    fn roles(&self) -> BoxFuture<'_, ProviderResult<Vec<Role>>> {
        async move { Ok(self.roles.to_vec()) }.boxed()
    }

    fn users(&self) -> BoxFuture<'_, ProviderResult<Vec<User>>> {
        async move { Ok(self.users.to_vec()) }.boxed()
    }

    fn user<'a>(&'a self, id: &'a str) -> BoxFuture<'a, ProviderResult<Option<User>>> {
        async move { Ok(self.users.iter().find(|u| u.id == id).cloned()) }.boxed()
    }
}
