//! Data-provider collaborators.
//!
//! Loaders reach domain records only through [`Directory`]. Query logic
//! behind it is opaque to routing and dispatch.

pub mod memory;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::{MemoryDirectory, Seed};

/// Errors surfaced by a data provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read seed data: {0}")]
    SeedIo(#[from] std::io::Error),

    #[error("failed to parse seed data: {0}")]
    SeedParse(#[from] serde_json::Error),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A role with its permissions populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// A user with their roles populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// Read-only queries over permissions, roles and users.
pub trait Directory: Send + Sync {
    fn permissions(&self) -> BoxFuture<'_, ProviderResult<Vec<Permission>>>;

    fn roles(&self) -> BoxFuture<'_, ProviderResult<Vec<Role>>>;

    fn users(&self) -> BoxFuture<'_, ProviderResult<Vec<User>>>;

    fn user<'a>(&'a self, id: &'a str) -> BoxFuture<'a, ProviderResult<Option<User>>>;
}
