//! Failure surfacing and partial-dataset semantics.
//!
//! A store failure mid-chunk must abort the run with the phase and
//! range it happened in, leaving everything created so far in place
//! (the backend's transaction boundary governs persistence, not this
//! engine).

use async_trait::async_trait;
use dataset_core::{DatasetError, GenerationConfig, GenerationPhase};
use identity_store::{
    ClientHandle, ClientSpec, ClientWithRoles, CredentialSpec, GroupRef, IdentityStore,
    MemoryStore, RealmHandle, RealmSpec, RoleRef, StoreError, UserRef, UserSpec,
};
use idp_populate::DatasetPopulator;
use std::sync::Arc;

/// Delegates to a MemoryStore but fails creation of one named entity.
struct FailingStore {
    inner: MemoryStore,
    fail_client: Option<String>,
    fail_user: Option<String>,
}

impl FailingStore {
    fn failing_client(name: &str) -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_client: Some(name.to_string()),
            fail_user: None,
        }
    }

    fn failing_user(name: &str) -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_client: None,
            fail_user: Some(name.to_string()),
        }
    }
}

#[async_trait]
impl IdentityStore for FailingStore {
    async fn realm_exists(&self, name: &str) -> Result<bool, StoreError> {
        self.inner.realm_exists(name).await
    }

    async fn create_realm(&self, spec: &RealmSpec) -> Result<RealmHandle, StoreError> {
        self.inner.create_realm(spec).await
    }

    async fn create_realm_role(
        &self,
        realm: &RealmHandle,
        name: &str,
    ) -> Result<RoleRef, StoreError> {
        self.inner.create_realm_role(realm, name).await
    }

    async fn create_group(&self, realm: &RealmHandle, name: &str) -> Result<GroupRef, StoreError> {
        self.inner.create_group(realm, name).await
    }

    async fn create_client(
        &self,
        realm: &RealmHandle,
        spec: &ClientSpec,
    ) -> Result<ClientHandle, StoreError> {
        if self.fail_client.as_deref() == Some(spec.client_id.as_str()) {
            return Err(StoreError::Backend("injected client failure".to_string()));
        }
        self.inner.create_client(realm, spec).await
    }

    async fn create_client_role(
        &self,
        realm: &RealmHandle,
        client: &ClientHandle,
        name: &str,
    ) -> Result<RoleRef, StoreError> {
        self.inner.create_client_role(realm, client, name).await
    }

    async fn create_user(
        &self,
        realm: &RealmHandle,
        spec: &UserSpec,
    ) -> Result<UserRef, StoreError> {
        if self.fail_user.as_deref() == Some(spec.username.as_str()) {
            return Err(StoreError::Backend("injected user failure".to_string()));
        }
        self.inner.create_user(realm, spec).await
    }

    async fn set_credential(
        &self,
        realm: &RealmHandle,
        user: &UserRef,
        credential: &CredentialSpec,
    ) -> Result<(), StoreError> {
        self.inner.set_credential(realm, user, credential).await
    }

    async fn grant_role(
        &self,
        realm: &RealmHandle,
        user: &UserRef,
        role: &RoleRef,
    ) -> Result<(), StoreError> {
        self.inner.grant_role(realm, user, role).await
    }

    async fn join_group(
        &self,
        realm: &RealmHandle,
        user: &UserRef,
        group: &GroupRef,
    ) -> Result<(), StoreError> {
        self.inner.join_group(realm, user, group).await
    }

    async fn list_realm_roles(&self, realm: &RealmHandle) -> Result<Vec<RoleRef>, StoreError> {
        self.inner.list_realm_roles(realm).await
    }

    async fn list_groups(&self, realm: &RealmHandle) -> Result<Vec<GroupRef>, StoreError> {
        self.inner.list_groups(realm).await
    }

    async fn list_clients(&self, realm: &RealmHandle) -> Result<Vec<ClientWithRoles>, StoreError> {
        self.inner.list_clients(realm).await
    }

    async fn refresh_realm(&self, realm: &RealmHandle) -> Result<RealmHandle, StoreError> {
        self.inner.refresh_realm(realm).await
    }
}

fn failure_config() -> GenerationConfig {
    let mut config = GenerationConfig::with_count(1);
    config.realm_roles_per_realm = 5;
    config.groups_per_realm = 3;
    config.clients_per_realm = 5;
    config.client_roles_per_client = 2;
    config.users_per_realm = 4;
    config.realm_roles_per_user = 2;
    config.client_roles_per_user = 1;
    config.groups_per_user = 1;
    config.clients_per_transaction = 2;
    config.users_per_transaction = 2;
    config
}

#[tokio::test]
async fn test_client_failure_reports_phase_and_range() {
    // client-3 sits in the second chunk, [2..4).
    let store = Arc::new(FailingStore::failing_client("client-3"));
    let err = DatasetPopulator::new(Arc::clone(&store), failure_config())
        .run()
        .await
        .unwrap_err();

    match err {
        DatasetError::UnitOfWork { phase, range, .. } => {
            assert_eq!(phase, GenerationPhase::CreatingClients);
            let range = range.expect("chunked phase carries its range");
            assert_eq!((range.start, range.end), (2, 4));
        }
        other => panic!("unexpected error: {other}"),
    }

    // Everything up to the failure stays: realm, roles, groups, and
    // the clients created before the injected error. No users exist.
    let (roles, groups, clients, _, users) =
        store.inner.realm_counts("realm-0").await.unwrap();
    assert_eq!(roles, 5);
    assert_eq!(groups, 3);
    assert_eq!(clients, 3);
    assert_eq!(users, 0);
}

#[tokio::test]
async fn test_user_failure_keeps_earlier_users() {
    // user-2 sits in the second chunk, [2..4).
    let store = Arc::new(FailingStore::failing_user("user-2"));
    let err = DatasetPopulator::new(Arc::clone(&store), failure_config())
        .run()
        .await
        .unwrap_err();

    match err {
        DatasetError::UnitOfWork { phase, range, .. } => {
            assert_eq!(phase, GenerationPhase::CreatingUsers);
            assert_eq!(range.map(|r| (r.start, r.end)), Some((2, 4)));
        }
        other => panic!("unexpected error: {other}"),
    }

    let (_, _, _, _, users) = store.inner.realm_counts("realm-0").await.unwrap();
    assert_eq!(users, 2);
}

#[tokio::test]
async fn test_failed_run_is_resumable_under_a_fresh_prefix_index() {
    let store = Arc::new(FailingStore::failing_user("user-2"));
    DatasetPopulator::new(Arc::clone(&store), failure_config())
        .run()
        .await
        .unwrap_err();

    // The half-populated realm-0 occupies its index, so a re-run
    // probes past it instead of colliding.
    let summary = DatasetPopulator::new(Arc::clone(&store), failure_config())
        .run()
        .await
        .expect("resumed run failed");
    assert_eq!(summary.start_index, 1);
    assert_eq!(
        store.inner.realm_names().await,
        vec!["realm-0", "realm-1"]
    );
}
