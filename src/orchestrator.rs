//! End-to-end dataset population.
//!
//! One [`DatasetPopulator`] invocation drives one run: resolve the
//! start offset, then per realm create the realm with its roles and
//! groups, the clients in bounded chunks, re-synchronize the child
//! pools, and create the users in bounded chunks. Phases run strictly
//! in order because each later phase indexes into the pools recorded
//! by the earlier ones.
//!
//! Nothing is rolled back on failure. The backend's transaction
//! boundary governs what persists, and whatever was created stays
//! addressable by name, so a re-run resolves a fresh start offset and
//! continues where the failed run stopped.

use crate::context::GenerationContext;
use crate::metrics::RunSummary;
use crate::resync;
use crate::timer::ProgressTimer;
use crate::txn::UnitOfWorkRunner;
use anyhow::anyhow;
use dataset_core::{
    find_free_index, names, planner, AssignmentAllocator, DatasetError, GenerationConfig,
    GenerationPhase, PoolSizes,
};
use identity_store::{ClientSpec, CredentialSpec, IdentityStore, RealmCache, RealmSpec, UserSpec};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Drives one populate run against an identity store.
pub struct DatasetPopulator<S> {
    store: Arc<S>,
    cache: Option<Arc<dyn RealmCache>>,
    config: GenerationConfig,
}

impl<S: IdentityStore> DatasetPopulator<S> {
    pub fn new(store: Arc<S>, config: GenerationConfig) -> Self {
        Self {
            store,
            cache: None,
            config,
        }
    }

    /// Attach the backend's cache collaborator. When present, the
    /// realm handle is invalidated and re-read before every
    /// client-creation unit of work.
    pub fn with_cache(mut self, cache: Arc<dyn RealmCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Execute the full run and report what was created.
    pub async fn run(&self) -> Result<RunSummary, DatasetError> {
        self.config.validate()?;

        let start = self.resolve_start().await?;
        let resolved = self.config.clone().resolved(start);
        let first_realm = names::indexed_name(&self.config.realm_prefix, start);
        info!(
            start,
            count = self.config.count,
            "Will start creating realms from {first_realm}"
        );

        let timer = ProgressTimer::start(format!("Start creation of realm {first_realm}"));
        let mut summary = RunSummary::begin(start);

        for index in resolved.realm_indices() {
            self.populate_realm(index, &timer, &mut summary).await?;
        }

        summary.finish();
        timer.event(&format!(
            "Run {}: {} entities in {} realms ({:.2} entities/sec)",
            GenerationPhase::Done,
            summary.total_entities(),
            summary.realms_created,
            summary.entities_per_second()
        ));
        Ok(summary)
    }

    /// Probe for the first realm ordinal that does not exist yet.
    async fn resolve_start(&self) -> Result<u64, DatasetError> {
        let store = Arc::clone(&self.store);
        let prefix = self.config.realm_prefix.clone();
        let start = find_free_index(move |index| {
            let store = Arc::clone(&store);
            let name = names::indexed_name(&prefix, index);
            async move { Ok(store.realm_exists(&name).await?) }
        })
        .await?;
        Ok(start)
    }

    async fn populate_realm(
        &self,
        index: u64,
        timer: &ProgressTimer,
        summary: &mut RunSummary,
    ) -> Result<(), DatasetError> {
        let config = &self.config;
        let store = &*self.store;
        let runner = UnitOfWorkRunner::new(config.transaction_timeout());
        let mut ctx = GenerationContext::new();
        let realm_name = names::indexed_name(&config.realm_prefix, index);

        // Phase: realm + realm roles + groups, one unit of work.
        runner
            .run(GenerationPhase::CreatingRealmRolesGroups, None, async {
                let spec =
                    RealmSpec::load_test_defaults(&realm_name, config.password_hash_iterations);
                let realm = store.create_realm(&spec).await?;
                ctx.set_realm(realm.clone())?;

                for i in 0..config.realm_roles_per_realm {
                    let role_name = names::indexed_name(&config.realm_role_prefix, i);
                    let role = store.create_realm_role(&realm, &role_name).await?;
                    ctx.record_realm_role(role);
                }
                for i in 0..config.groups_per_realm {
                    let group_name = names::indexed_name(&config.group_prefix, i);
                    let group = store.create_group(&realm, &group_name).await?;
                    ctx.record_group(group);
                }
                Ok(())
            })
            .await?;
        timer.event(&format!(
            "Created realm {realm_name} with {} roles and {} groups",
            ctx.realm_roles().len(),
            ctx.groups().len()
        ));

        // Phase: clients, chunked.
        for range in planner::chunks(config.clients_per_realm, config.clients_per_transaction)? {
            runner
                .run(GenerationPhase::CreatingClients, Some(range), async {
                    // The previous chunk's writes may have gone around
                    // a caching layer; re-read the realm handle before
                    // writing through it again.
                    if let Some(cache) = &self.cache {
                        let realm = ctx
                            .realm()
                            .cloned()
                            .ok_or_else(|| anyhow!("realm handle not set"))?;
                        cache.invalidate(&realm.id, &realm.name).await?;
                        let fresh = store.refresh_realm(&realm).await?;
                        ctx.refresh_realm_handle(fresh)?;
                    }
                    let realm = ctx
                        .realm()
                        .cloned()
                        .ok_or_else(|| anyhow!("realm handle not set"))?;

                    for i in range.indices() {
                        let client_id = names::indexed_name(&config.client_prefix, i);
                        let client = store
                            .create_client(&realm, &ClientSpec::load_test_defaults(&client_id))
                            .await?;
                        for k in 0..config.client_roles_per_client {
                            let role_name = format!(
                                "{client_id}-{}",
                                names::indexed_name(&config.client_role_prefix, k)
                            );
                            let role =
                                store.create_client_role(&realm, &client, &role_name).await?;
                            ctx.record_client_role(role);
                        }
                        let created = ctx.record_client(client);
                        debug!(client = %client_id, total = created, "Created client");
                    }
                    Ok(())
                })
                .await?;
            timer.event(&format!(
                "Created {} clients in realm {realm_name}",
                ctx.clients().len()
            ));
        }

        // Phase: canonical re-sort of the pools the user phase will
        // index into.
        resync::resync_pools(store, config, &mut ctx).await?;
        timer.event(&format!(
            "Resynced pools in realm {realm_name}: {} roles, {} clients, {} client roles, {} groups",
            ctx.realm_roles().len(),
            ctx.clients().len(),
            ctx.client_roles().len(),
            ctx.groups().len()
        ));

        // Fail fast on impossible fan-outs before the first user.
        let allocator = AssignmentAllocator::new(
            config.fan_out(),
            PoolSizes {
                realm_roles: ctx.realm_roles().len(),
                client_roles: ctx.client_roles().len(),
                groups: ctx.groups().len(),
            },
        )?;

        // Phase: users, chunked.
        for range in planner::chunks(config.users_per_realm, config.users_per_transaction)? {
            runner
                .run(GenerationPhase::CreatingUsers, Some(range), async {
                    let realm = ctx
                        .realm()
                        .cloned()
                        .ok_or_else(|| anyhow!("realm handle not set"))?;

                    for i in range.indices() {
                        let username = names::indexed_name(&config.user_prefix, i);
                        let user = store
                            .create_user(
                                &realm,
                                &UserSpec::load_test_defaults(&username, &realm.name),
                            )
                            .await?;
                        store
                            .set_credential(
                                &realm,
                                &user,
                                &CredentialSpec::derived_password(&username),
                            )
                            .await?;

                        let assignment = allocator.for_user(i as usize);
                        for idx in &assignment.realm_roles {
                            let role = &ctx.realm_roles()[*idx];
                            store.grant_role(&realm, &user, role).await?;
                            trace!(role = %role.name, user = %username, "Granted realm role");
                        }
                        for idx in &assignment.client_roles {
                            let role = &ctx.client_roles()[*idx];
                            store.grant_role(&realm, &user, role).await?;
                            trace!(role = %role.name, user = %username, "Granted client role");
                        }
                        for idx in &assignment.groups {
                            let group = &ctx.groups()[*idx];
                            store.join_group(&realm, &user, group).await?;
                            trace!(group = %group.name, user = %username, "Joined group");
                        }

                        let created = ctx.record_user(user);
                        if created % 10 == 0 {
                            timer.event(&format!(
                                "Created {created} users in realm {realm_name}"
                            ));
                        }
                    }
                    Ok(())
                })
                .await?;
        }
        timer.event(&format!(
            "Created {} users in realm {realm_name}",
            ctx.users().len()
        ));

        summary.realms_created += 1;
        summary.realm_roles_created += ctx.realm_roles().len() as u64;
        summary.clients_created += ctx.clients().len() as u64;
        summary.client_roles_created += ctx.client_roles().len() as u64;
        summary.groups_created += ctx.groups().len() as u64;
        summary.users_created += ctx.users().len() as u64;
        Ok(())
    }
}
