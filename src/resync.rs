//! Pool re-synchronization.
//!
//! Client creation is chunked and, behind a caching layer, listing
//! order after many writes is whatever the store feels like. Before
//! any user is created the realm's child pools are therefore reloaded
//! once, filtered to the configured name prefixes, and re-sorted into
//! ascending numeric-suffix order. That order is the index space the
//! assignment allocator computes against; it must be canonical and it
//! must be established exactly once.

use crate::context::GenerationContext;
use dataset_core::{names, DatasetError, GenerationConfig, GenerationPhase};
use identity_store::{ClientHandle, GroupRef, IdentityStore, RealmHandle, RoleRef};

/// The realm's child pools in canonical index order.
#[derive(Debug, Clone)]
pub struct SortedPools {
    pub realm_roles: Vec<RoleRef>,
    pub clients: Vec<ClientHandle>,
    /// Flattened client-then-role order.
    pub client_roles: Vec<RoleRef>,
    pub groups: Vec<GroupRef>,
}

/// Reload and canonically order the realm's children.
///
/// Pure with respect to the store state: calling it twice against an
/// unchanged store yields identical pools.
pub async fn load_sorted_pools<S: IdentityStore>(
    store: &S,
    config: &GenerationConfig,
    realm: &RealmHandle,
) -> Result<SortedPools, DatasetError> {
    let roles = store.list_realm_roles(realm).await.map_err(resync_failure)?;
    let realm_roles =
        names::filter_sort_indexed(roles, &config.realm_role_prefix, |r| r.name.as_str());

    let groups = store.list_groups(realm).await.map_err(resync_failure)?;
    let groups = names::filter_sort_indexed(groups, &config.group_prefix, |g| g.name.as_str());

    let listed = store.list_clients(realm).await.map_err(resync_failure)?;
    let listed = names::filter_sort_indexed(listed, &config.client_prefix, |c| {
        c.client.client_id.as_str()
    });

    let mut clients = Vec::with_capacity(listed.len());
    let mut client_roles = Vec::new();
    for entry in listed {
        // Client roles are namespaced by their owning client, so the
        // per-client prefix keeps one client's roles from matching
        // another's.
        let role_prefix = format!("{}-{}", entry.client.client_id, config.client_role_prefix);
        let mut sorted =
            names::filter_sort_indexed(entry.roles, &role_prefix, |r| r.name.as_str());
        client_roles.append(&mut sorted);
        clients.push(entry.client);
    }

    Ok(SortedPools {
        realm_roles,
        clients,
        client_roles,
        groups,
    })
}

/// Reload, verify and swap the canonical pools into the context.
///
/// A pool smaller than configured means the modulo-based assignment
/// would wrap against the wrong size, so the run stops here, before
/// any user exists.
pub async fn resync_pools<S: IdentityStore>(
    store: &S,
    config: &GenerationConfig,
    ctx: &mut GenerationContext,
) -> Result<(), DatasetError> {
    let realm = ctx
        .realm()
        .cloned()
        .ok_or_else(|| resync_failure(anyhow::anyhow!("realm handle not set before resync")))?;

    let pools = load_sorted_pools(store, config, &realm).await?;

    check_pool("realm roles", config.realm_roles_per_realm, pools.realm_roles.len())?;
    check_pool("groups", config.groups_per_realm, pools.groups.len())?;
    check_pool("clients", config.clients_per_realm, pools.clients.len())?;
    check_pool(
        "client roles",
        config.clients_per_realm * config.client_roles_per_client,
        pools.client_roles.len(),
    )?;

    ctx.replace_realm_roles(pools.realm_roles)
        .map_err(resync_failure)?;
    ctx.replace_clients(pools.clients).map_err(resync_failure)?;
    ctx.replace_client_roles(pools.client_roles)
        .map_err(resync_failure)?;
    ctx.replace_groups(pools.groups).map_err(resync_failure)?;
    Ok(())
}

fn check_pool(pool: &'static str, expected: u64, actual: usize) -> Result<(), DatasetError> {
    if (actual as u64) < expected {
        return Err(DatasetError::Consistency {
            pool,
            expected,
            actual: actual as u64,
        });
    }
    Ok(())
}

fn resync_failure(source: impl Into<anyhow::Error>) -> DatasetError {
    DatasetError::UnitOfWork {
        phase: GenerationPhase::ResyncingPools,
        range: None,
        source: source.into(),
    }
}
