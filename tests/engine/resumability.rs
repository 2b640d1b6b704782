//! Resuming a populated store.
//!
//! Re-invoking the populator must probe past the realms that already
//! exist and continue from there, without touching them.

use dataset_core::GenerationConfig;
use identity_store::MemoryStore;
use idp_populate::DatasetPopulator;
use std::sync::Arc;

fn small_config(count: u64) -> GenerationConfig {
    let mut config = GenerationConfig::with_count(count);
    config.realm_roles_per_realm = 5;
    config.groups_per_realm = 3;
    config.clients_per_realm = 2;
    config.client_roles_per_client = 2;
    config.users_per_realm = 2;
    config.realm_roles_per_user = 2;
    config.client_roles_per_user = 1;
    config.groups_per_user = 1;
    config
}

#[tokio::test]
async fn test_second_run_starts_after_existing_realms() {
    let store = Arc::new(MemoryStore::new());

    let first = DatasetPopulator::new(Arc::clone(&store), small_config(2))
        .run()
        .await
        .expect("first run failed");
    assert_eq!(first.start_index, 0);
    assert_eq!(store.realm_names().await, vec!["realm-0", "realm-1"]);

    let second = DatasetPopulator::new(Arc::clone(&store), small_config(3))
        .run()
        .await
        .expect("second run failed");
    assert_eq!(second.start_index, 2);
    assert_eq!(second.realms_created, 3);
    assert_eq!(
        store.realm_names().await,
        vec!["realm-0", "realm-1", "realm-2", "realm-3", "realm-4"]
    );
}

#[tokio::test]
async fn test_second_run_leaves_existing_realms_untouched() {
    let store = Arc::new(MemoryStore::new());

    DatasetPopulator::new(Arc::clone(&store), small_config(1))
        .run()
        .await
        .expect("first run failed");
    let before = store.realm_counts("realm-0").await.unwrap();

    DatasetPopulator::new(Arc::clone(&store), small_config(1))
        .run()
        .await
        .expect("second run failed");
    let after = store.realm_counts("realm-0").await.unwrap();

    assert_eq!(before, after);
    assert_eq!(store.realm_names().await, vec!["realm-0", "realm-1"]);
}

#[tokio::test]
async fn test_distinct_prefixes_do_not_interfere() {
    let store = Arc::new(MemoryStore::new());

    DatasetPopulator::new(Arc::clone(&store), small_config(1))
        .run()
        .await
        .expect("first run failed");

    let mut config = small_config(1);
    config.realm_prefix = "perf-".to_string();
    let summary = DatasetPopulator::new(Arc::clone(&store), config)
        .run()
        .await
        .expect("prefixed run failed");

    // A fresh prefix starts from index 0 regardless of other realms.
    assert_eq!(summary.start_index, 0);
    assert_eq!(store.realm_names().await, vec!["perf-0", "realm-0"]);
}
