//! Deterministic end-to-end scenario.
//!
//! One realm with 5 realm roles, 3 groups, 2 clients of 2 client
//! roles each and 3 users, with per-user fan-outs 2/1/1. Every entity
//! name and every user's assignment is known in advance; the test
//! pins them all down.

use dataset_core::GenerationConfig;
use identity_store::{MemoryStore, RealmCache};
use idp_populate::DatasetPopulator;
use std::sync::Arc;

fn scenario_config() -> GenerationConfig {
    let mut config = GenerationConfig::with_count(1);
    config.realm_roles_per_realm = 5;
    config.groups_per_realm = 3;
    config.clients_per_realm = 2;
    config.client_roles_per_client = 2;
    config.users_per_realm = 3;
    config.realm_roles_per_user = 2;
    config.client_roles_per_user = 1;
    config.groups_per_user = 1;
    // Small chunks so the run actually exercises batching.
    config.clients_per_transaction = 1;
    config.users_per_transaction = 2;
    config
}

#[tokio::test]
async fn test_scenario_creates_exactly_the_expected_dataset() {
    tracing_subscriber::fmt()
        .with_env_filter("idp_populate=info")
        .try_init()
        .ok();

    let store = Arc::new(MemoryStore::new());
    let populator = DatasetPopulator::new(Arc::clone(&store), scenario_config())
        .with_cache(Arc::clone(&store) as Arc<dyn RealmCache>);
    let summary = populator.run().await.expect("populate run failed");

    assert_eq!(store.realm_names().await, vec!["realm-0"]);
    let (roles, groups, clients, client_roles, users) =
        store.realm_counts("realm-0").await.unwrap();
    assert_eq!(roles, 5);
    assert_eq!(groups, 3);
    assert_eq!(clients, 2);
    assert_eq!(client_roles, 4);
    assert_eq!(users, 3);

    assert_eq!(summary.total_entities(), 18);
    assert_eq!(summary.users_created, 3);
}

#[tokio::test]
async fn test_scenario_assignments_follow_the_sliding_window() {
    let store = Arc::new(MemoryStore::new());
    DatasetPopulator::new(Arc::clone(&store), scenario_config())
        .run()
        .await
        .expect("populate run failed");

    // user-0: realm roles {0,1}, client role {0}, group {0}
    assert_eq!(
        store.user_role_names("realm-0", "user-0").await.unwrap(),
        vec!["role-0", "role-1", "client-0-client-role-0"]
    );
    assert_eq!(
        store.user_group_names("realm-0", "user-0").await.unwrap(),
        vec!["group-0"]
    );

    // user-1: realm roles {2,3}, client role {1}, group {1}
    assert_eq!(
        store.user_role_names("realm-0", "user-1").await.unwrap(),
        vec!["role-2", "role-3", "client-0-client-role-1"]
    );
    assert_eq!(
        store.user_group_names("realm-0", "user-1").await.unwrap(),
        vec!["group-1"]
    );

    // user-2 wraps: realm roles {4,0}, client role {2}, group {2}
    assert_eq!(
        store.user_role_names("realm-0", "user-2").await.unwrap(),
        vec!["role-4", "role-0", "client-1-client-role-0"]
    );
    assert_eq!(
        store.user_group_names("realm-0", "user-2").await.unwrap(),
        vec!["group-2"]
    );
}

#[tokio::test]
async fn test_scenario_credentials_are_deterministic() {
    let store = Arc::new(MemoryStore::new());
    DatasetPopulator::new(Arc::clone(&store), scenario_config())
        .run()
        .await
        .expect("populate run failed");

    for username in ["user-0", "user-1", "user-2"] {
        assert_eq!(
            store.user_password("realm-0", username).await.unwrap(),
            Some(format!("{username}-password"))
        );
    }
}

#[tokio::test]
async fn test_two_runs_on_fresh_stores_produce_identical_datasets() {
    let build = || async {
        let store = Arc::new(MemoryStore::new());
        DatasetPopulator::new(Arc::clone(&store), scenario_config())
            .run()
            .await
            .expect("populate run failed");
        store
    };
    let first = build().await;
    let second = build().await;

    for username in ["user-0", "user-1", "user-2"] {
        assert_eq!(
            first.user_role_names("realm-0", username).await.unwrap(),
            second.user_role_names("realm-0", username).await.unwrap()
        );
        assert_eq!(
            first.user_group_names("realm-0", username).await.unwrap(),
            second.user_group_names("realm-0", username).await.unwrap()
        );
    }
}

#[tokio::test]
async fn test_cache_is_invalidated_once_per_client_chunk() {
    let store = Arc::new(MemoryStore::new());
    DatasetPopulator::new(Arc::clone(&store), scenario_config())
        .with_cache(Arc::clone(&store) as Arc<dyn RealmCache>)
        .run()
        .await
        .expect("populate run failed");

    // 2 clients at 1 per transaction.
    assert_eq!(store.invalidation_count().await, 2);
}
