//! The identity store trait.

use crate::types::{
    ClientHandle, ClientSpec, ClientWithRoles, CredentialSpec, GroupRef, RealmHandle, RealmSpec,
    RoleRef, UserRef, UserSpec,
};
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by an identity store implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness constraint fired (name or id already taken).
    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: &'static str, name: String },

    /// A referenced entity is gone (or was never created).
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    /// Anything else the backend reports.
    #[error("Store error: {0}")]
    Backend(String),
}

/// Create/read operations the populate engine needs from a backend.
///
/// Implementations own transactions, uniqueness enforcement and
/// credential hashing; the engine only sequences calls and keeps its
/// own bookkeeping. All listing methods return the backend's native
/// order, which the engine never relies on.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn realm_exists(&self, name: &str) -> Result<bool, StoreError>;

    async fn create_realm(&self, spec: &RealmSpec) -> Result<RealmHandle, StoreError>;

    async fn create_realm_role(
        &self,
        realm: &RealmHandle,
        name: &str,
    ) -> Result<RoleRef, StoreError>;

    async fn create_group(&self, realm: &RealmHandle, name: &str) -> Result<GroupRef, StoreError>;

    async fn create_client(
        &self,
        realm: &RealmHandle,
        spec: &ClientSpec,
    ) -> Result<ClientHandle, StoreError>;

    async fn create_client_role(
        &self,
        realm: &RealmHandle,
        client: &ClientHandle,
        name: &str,
    ) -> Result<RoleRef, StoreError>;

    async fn create_user(
        &self,
        realm: &RealmHandle,
        spec: &UserSpec,
    ) -> Result<UserRef, StoreError>;

    async fn set_credential(
        &self,
        realm: &RealmHandle,
        user: &UserRef,
        credential: &CredentialSpec,
    ) -> Result<(), StoreError>;

    async fn grant_role(
        &self,
        realm: &RealmHandle,
        user: &UserRef,
        role: &RoleRef,
    ) -> Result<(), StoreError>;

    async fn join_group(
        &self,
        realm: &RealmHandle,
        user: &UserRef,
        group: &GroupRef,
    ) -> Result<(), StoreError>;

    async fn list_realm_roles(&self, realm: &RealmHandle) -> Result<Vec<RoleRef>, StoreError>;

    async fn list_groups(&self, realm: &RealmHandle) -> Result<Vec<GroupRef>, StoreError>;

    /// List clients together with their client roles.
    async fn list_clients(&self, realm: &RealmHandle) -> Result<Vec<ClientWithRoles>, StoreError>;

    /// Re-read the realm handle from the backend.
    ///
    /// Backends with a caching layer may hand out stale handles after
    /// writes; the engine calls this at defined points instead of
    /// assuming freshness.
    async fn refresh_realm(&self, realm: &RealmHandle) -> Result<RealmHandle, StoreError>;
}

/// Optional cache collaborator for backends that shadow reads.
#[async_trait]
pub trait RealmCache: Send + Sync {
    /// Drop any cached snapshot of the given realm.
    async fn invalidate(&self, realm_id: &str, realm_name: &str) -> Result<(), StoreError>;
}
