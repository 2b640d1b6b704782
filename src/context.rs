//! Per-realm accumulation of created entities.
//!
//! Everything created for one realm is collected here so later phases
//! can index into the pools without store lookups. The handles held
//! here are references (id + name), not live connections; callers
//! must not assume they are fresh across transaction boundaries.

use identity_store::{ClientHandle, GroupRef, RealmHandle, RoleRef, UserRef};
use thiserror::Error;

/// Misuse of the context's lifecycle rules.
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Realm handle already set")]
    RealmAlreadySet,

    #[error("Realm handle not set yet")]
    RealmNotSet,

    /// Each pool may be replaced exactly once, after client creation.
    /// A second replacement would silently invalidate indices already
    /// handed to in-flight assignment computations.
    #[error("Pool '{pool}' was already replaced")]
    PoolAlreadyReplaced { pool: &'static str },
}

/// Accumulator for one realm of one populate run.
///
/// Owned exclusively by the orchestrator invocation that created it;
/// append-only during a phase, with a one-time bulk replacement of
/// the role/client/group pools after pool re-synchronization.
#[derive(Default)]
pub struct GenerationContext {
    realm: Option<RealmHandle>,
    realm_roles: Vec<RoleRef>,
    clients: Vec<ClientHandle>,
    /// Client roles of all clients, flattened in client-then-role
    /// order.
    client_roles: Vec<RoleRef>,
    groups: Vec<GroupRef>,
    users: Vec<UserRef>,
    roles_replaced: bool,
    clients_replaced: bool,
    client_roles_replaced: bool,
    groups_replaced: bool,
}

impl GenerationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the realm handle. Allowed exactly once.
    pub fn set_realm(&mut self, realm: RealmHandle) -> Result<(), ContextError> {
        if self.realm.is_some() {
            return Err(ContextError::RealmAlreadySet);
        }
        self.realm = Some(realm);
        Ok(())
    }

    /// Swap in a freshly read handle for the same realm.
    ///
    /// Used after a cache invalidation; this is not a realm change.
    pub fn refresh_realm_handle(&mut self, realm: RealmHandle) -> Result<(), ContextError> {
        if self.realm.is_none() {
            return Err(ContextError::RealmNotSet);
        }
        self.realm = Some(realm);
        Ok(())
    }

    pub fn realm(&self) -> Option<&RealmHandle> {
        self.realm.as_ref()
    }

    pub fn record_realm_role(&mut self, role: RoleRef) -> usize {
        self.realm_roles.push(role);
        self.realm_roles.len()
    }

    pub fn record_client(&mut self, client: ClientHandle) -> usize {
        self.clients.push(client);
        self.clients.len()
    }

    pub fn record_client_role(&mut self, role: RoleRef) -> usize {
        self.client_roles.push(role);
        self.client_roles.len()
    }

    pub fn record_group(&mut self, group: GroupRef) -> usize {
        self.groups.push(group);
        self.groups.len()
    }

    pub fn record_user(&mut self, user: UserRef) -> usize {
        self.users.push(user);
        self.users.len()
    }

    pub fn replace_realm_roles(&mut self, roles: Vec<RoleRef>) -> Result<(), ContextError> {
        if self.roles_replaced {
            return Err(ContextError::PoolAlreadyReplaced { pool: "realm roles" });
        }
        self.realm_roles = roles;
        self.roles_replaced = true;
        Ok(())
    }

    pub fn replace_clients(&mut self, clients: Vec<ClientHandle>) -> Result<(), ContextError> {
        if self.clients_replaced {
            return Err(ContextError::PoolAlreadyReplaced { pool: "clients" });
        }
        self.clients = clients;
        self.clients_replaced = true;
        Ok(())
    }

    pub fn replace_client_roles(&mut self, roles: Vec<RoleRef>) -> Result<(), ContextError> {
        if self.client_roles_replaced {
            return Err(ContextError::PoolAlreadyReplaced {
                pool: "client roles",
            });
        }
        self.client_roles = roles;
        self.client_roles_replaced = true;
        Ok(())
    }

    pub fn replace_groups(&mut self, groups: Vec<GroupRef>) -> Result<(), ContextError> {
        if self.groups_replaced {
            return Err(ContextError::PoolAlreadyReplaced { pool: "groups" });
        }
        self.groups = groups;
        self.groups_replaced = true;
        Ok(())
    }

    pub fn realm_roles(&self) -> &[RoleRef] {
        &self.realm_roles
    }

    pub fn clients(&self) -> &[ClientHandle] {
        &self.clients
    }

    pub fn client_roles(&self) -> &[RoleRef] {
        &self.client_roles
    }

    pub fn groups(&self) -> &[GroupRef] {
        &self.groups
    }

    pub fn users(&self) -> &[UserRef] {
        &self.users
    }
}
