//! In-memory identity store.
//!
//! Reference implementation of [`IdentityStore`] used by the CLI
//! dry-run mode, the HTTP harness and the integration tests. It
//! enforces the same uniqueness constraints a real backend would and
//! deliberately lists children in lexicographic name order
//! (`role-10` before `role-2`), so consumers that need index order
//! are forced through the same re-sort they need against a real
//! backend.

use crate::store::{IdentityStore, RealmCache, StoreError};
use crate::types::{
    ClientHandle, ClientSpec, ClientWithRoles, CredentialSpec, GroupRef, RealmHandle, RealmSpec,
    RoleRef, UserRef, UserSpec,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared-handle in-memory store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    realms: BTreeMap<String, RealmRecord>,
    invalidations: u64,
}

struct RealmRecord {
    handle: RealmHandle,
    #[allow(dead_code)]
    spec: RealmSpec,
    roles: BTreeMap<String, RoleRef>,
    groups: BTreeMap<String, GroupRef>,
    clients: BTreeMap<String, ClientRecord>,
    users: BTreeMap<String, UserRecord>,
}

struct ClientRecord {
    handle: ClientHandle,
    #[allow(dead_code)]
    spec: ClientSpec,
    roles: BTreeMap<String, RoleRef>,
}

struct UserRecord {
    user: UserRef,
    #[allow(dead_code)]
    spec: UserSpec,
    credential: Option<CredentialSpec>,
    granted_roles: Vec<String>,
    joined_groups: Vec<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cache invalidations requested so far.
    pub async fn invalidation_count(&self) -> u64 {
        self.inner.read().await.invalidations
    }

    /// Names of all realms, lexicographic.
    pub async fn realm_names(&self) -> Vec<String> {
        self.inner.read().await.realms.keys().cloned().collect()
    }

    /// Role names granted to a user, in grant order.
    pub async fn user_role_names(
        &self,
        realm: &str,
        username: &str,
    ) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().await;
        let user = Self::user_record(&inner, realm, username)?;
        Ok(user.granted_roles.clone())
    }

    /// Group names a user has joined, in join order.
    pub async fn user_group_names(
        &self,
        realm: &str,
        username: &str,
    ) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().await;
        let user = Self::user_record(&inner, realm, username)?;
        Ok(user.joined_groups.clone())
    }

    /// The password set for a user, if any.
    pub async fn user_password(
        &self,
        realm: &str,
        username: &str,
    ) -> Result<Option<String>, StoreError> {
        let inner = self.inner.read().await;
        let user = Self::user_record(&inner, realm, username)?;
        Ok(user.credential.as_ref().map(|c| c.password.clone()))
    }

    /// Entity counts for a realm: (roles, groups, clients, client
    /// roles, users).
    pub async fn realm_counts(&self, realm: &str) -> Result<(usize, usize, usize, usize, usize), StoreError> {
        let inner = self.inner.read().await;
        let record = Self::realm_record(&inner, realm)?;
        let client_roles = record.clients.values().map(|c| c.roles.len()).sum();
        Ok((
            record.roles.len(),
            record.groups.len(),
            record.clients.len(),
            client_roles,
            record.users.len(),
        ))
    }

    fn realm_record<'a>(inner: &'a Inner, realm: &str) -> Result<&'a RealmRecord, StoreError> {
        inner.realms.get(realm).ok_or_else(|| StoreError::NotFound {
            kind: "realm",
            name: realm.to_string(),
        })
    }

    fn realm_record_mut<'a>(
        inner: &'a mut Inner,
        realm: &str,
    ) -> Result<&'a mut RealmRecord, StoreError> {
        inner
            .realms
            .get_mut(realm)
            .ok_or_else(|| StoreError::NotFound {
                kind: "realm",
                name: realm.to_string(),
            })
    }

    fn user_record<'a>(
        inner: &'a Inner,
        realm: &str,
        username: &str,
    ) -> Result<&'a UserRecord, StoreError> {
        Self::realm_record(inner, realm)?
            .users
            .get(username)
            .ok_or_else(|| StoreError::NotFound {
                kind: "user",
                name: username.to_string(),
            })
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn realm_exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.inner.read().await.realms.contains_key(name))
    }

    async fn create_realm(&self, spec: &RealmSpec) -> Result<RealmHandle, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.realms.contains_key(&spec.name) {
            return Err(StoreError::AlreadyExists {
                kind: "realm",
                name: spec.name.clone(),
            });
        }
        let handle = RealmHandle {
            id: spec.name.clone(),
            name: spec.name.clone(),
        };
        inner.realms.insert(
            spec.name.clone(),
            RealmRecord {
                handle: handle.clone(),
                spec: spec.clone(),
                roles: BTreeMap::new(),
                groups: BTreeMap::new(),
                clients: BTreeMap::new(),
                users: BTreeMap::new(),
            },
        );
        Ok(handle)
    }

    async fn create_realm_role(
        &self,
        realm: &RealmHandle,
        name: &str,
    ) -> Result<RoleRef, StoreError> {
        let mut inner = self.inner.write().await;
        let record = Self::realm_record_mut(&mut inner, &realm.name)?;
        if record.roles.contains_key(name) {
            return Err(StoreError::AlreadyExists {
                kind: "role",
                name: name.to_string(),
            });
        }
        let role = RoleRef {
            id: format!("{}:role:{}", realm.name, name),
            name: name.to_string(),
        };
        record.roles.insert(name.to_string(), role.clone());
        Ok(role)
    }

    async fn create_group(&self, realm: &RealmHandle, name: &str) -> Result<GroupRef, StoreError> {
        let mut inner = self.inner.write().await;
        let record = Self::realm_record_mut(&mut inner, &realm.name)?;
        if record.groups.contains_key(name) {
            return Err(StoreError::AlreadyExists {
                kind: "group",
                name: name.to_string(),
            });
        }
        let group = GroupRef {
            id: format!("{}:group:{}", realm.name, name),
            name: name.to_string(),
        };
        record.groups.insert(name.to_string(), group.clone());
        Ok(group)
    }

    async fn create_client(
        &self,
        realm: &RealmHandle,
        spec: &ClientSpec,
    ) -> Result<ClientHandle, StoreError> {
        let mut inner = self.inner.write().await;
        let record = Self::realm_record_mut(&mut inner, &realm.name)?;
        if record.clients.contains_key(&spec.client_id) {
            return Err(StoreError::AlreadyExists {
                kind: "client",
                name: spec.client_id.clone(),
            });
        }
        let handle = ClientHandle {
            id: format!("{}:client:{}", realm.name, spec.client_id),
            client_id: spec.client_id.clone(),
        };
        record.clients.insert(
            spec.client_id.clone(),
            ClientRecord {
                handle: handle.clone(),
                spec: spec.clone(),
                roles: BTreeMap::new(),
            },
        );
        Ok(handle)
    }

    async fn create_client_role(
        &self,
        realm: &RealmHandle,
        client: &ClientHandle,
        name: &str,
    ) -> Result<RoleRef, StoreError> {
        let mut inner = self.inner.write().await;
        let record = Self::realm_record_mut(&mut inner, &realm.name)?;
        let client_record =
            record
                .clients
                .get_mut(&client.client_id)
                .ok_or_else(|| StoreError::NotFound {
                    kind: "client",
                    name: client.client_id.clone(),
                })?;
        if client_record.roles.contains_key(name) {
            return Err(StoreError::AlreadyExists {
                kind: "client role",
                name: name.to_string(),
            });
        }
        let role = RoleRef {
            id: format!("{}:client-role:{}", realm.name, name),
            name: name.to_string(),
        };
        client_record.roles.insert(name.to_string(), role.clone());
        Ok(role)
    }

    async fn create_user(
        &self,
        realm: &RealmHandle,
        spec: &UserSpec,
    ) -> Result<UserRef, StoreError> {
        let mut inner = self.inner.write().await;
        let record = Self::realm_record_mut(&mut inner, &realm.name)?;
        if record.users.contains_key(&spec.username) {
            return Err(StoreError::AlreadyExists {
                kind: "user",
                name: spec.username.clone(),
            });
        }
        let user = UserRef {
            id: format!("{}:user:{}", realm.name, spec.username),
            username: spec.username.clone(),
        };
        record.users.insert(
            spec.username.clone(),
            UserRecord {
                user: user.clone(),
                spec: spec.clone(),
                credential: None,
                granted_roles: Vec::new(),
                joined_groups: Vec::new(),
            },
        );
        Ok(user)
    }

    async fn set_credential(
        &self,
        realm: &RealmHandle,
        user: &UserRef,
        credential: &CredentialSpec,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let record = Self::realm_record_mut(&mut inner, &realm.name)?;
        let user_record =
            record
                .users
                .get_mut(&user.username)
                .ok_or_else(|| StoreError::NotFound {
                    kind: "user",
                    name: user.username.clone(),
                })?;
        user_record.credential = Some(credential.clone());
        Ok(())
    }

    async fn grant_role(
        &self,
        realm: &RealmHandle,
        user: &UserRef,
        role: &RoleRef,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let record = Self::realm_record_mut(&mut inner, &realm.name)?;
        let known = record.roles.values().any(|r| r.id == role.id)
            || record
                .clients
                .values()
                .any(|c| c.roles.values().any(|r| r.id == role.id));
        if !known {
            return Err(StoreError::NotFound {
                kind: "role",
                name: role.name.clone(),
            });
        }
        let user_record =
            record
                .users
                .get_mut(&user.username)
                .ok_or_else(|| StoreError::NotFound {
                    kind: "user",
                    name: user.username.clone(),
                })?;
        user_record.granted_roles.push(role.name.clone());
        Ok(())
    }

    async fn join_group(
        &self,
        realm: &RealmHandle,
        user: &UserRef,
        group: &GroupRef,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let record = Self::realm_record_mut(&mut inner, &realm.name)?;
        if !record.groups.contains_key(&group.name) {
            return Err(StoreError::NotFound {
                kind: "group",
                name: group.name.clone(),
            });
        }
        let user_record =
            record
                .users
                .get_mut(&user.username)
                .ok_or_else(|| StoreError::NotFound {
                    kind: "user",
                    name: user.username.clone(),
                })?;
        user_record.joined_groups.push(group.name.clone());
        Ok(())
    }

    async fn list_realm_roles(&self, realm: &RealmHandle) -> Result<Vec<RoleRef>, StoreError> {
        let inner = self.inner.read().await;
        let record = Self::realm_record(&inner, &realm.name)?;
        Ok(record.roles.values().cloned().collect())
    }

    async fn list_groups(&self, realm: &RealmHandle) -> Result<Vec<GroupRef>, StoreError> {
        let inner = self.inner.read().await;
        let record = Self::realm_record(&inner, &realm.name)?;
        Ok(record.groups.values().cloned().collect())
    }

    async fn list_clients(&self, realm: &RealmHandle) -> Result<Vec<ClientWithRoles>, StoreError> {
        let inner = self.inner.read().await;
        let record = Self::realm_record(&inner, &realm.name)?;
        Ok(record
            .clients
            .values()
            .map(|c| ClientWithRoles {
                client: c.handle.clone(),
                roles: c.roles.values().cloned().collect(),
            })
            .collect())
    }

    async fn refresh_realm(&self, realm: &RealmHandle) -> Result<RealmHandle, StoreError> {
        let inner = self.inner.read().await;
        let record = Self::realm_record(&inner, &realm.name)?;
        Ok(record.handle.clone())
    }
}

#[async_trait]
impl RealmCache for MemoryStore {
    async fn invalidate(&self, _realm_id: &str, _realm_name: &str) -> Result<(), StoreError> {
        self.inner.write().await.invalidations += 1;
        Ok(())
    }
}
