//! idp-populate
//!
//! Populates an identity-management backend with large,
//! deterministically structured synthetic datasets (realms, clients,
//! roles, groups, users and their cross-relationships) for load
//! testing.
//!
//! # Usage Examples
//!
//! ```bash
//! # Run the HTTP trigger server (in-memory backend)
//! idp-populate serve --listen 127.0.0.1:8180
//!
//! # Trigger a run
//! curl 'http://127.0.0.1:8180/create-realms?count=2&users-per-realm=500'
//!
//! # One in-process dry run
//! idp-populate populate --count 1 --users-per-realm 50
//! ```
//!
//! # Architecture
//!
//! ```text
//! dataset-core      pure algorithms: config, free-index probe,
//!                   chunk planner, assignment allocator, naming
//! identity-store    backend interface + in-memory reference store
//! idp-populate      orchestration: phase state machine, per-realm
//! (this crate)      context, unit-of-work budget, progress timing,
//!                   HTTP trigger endpoint
//! ```
//!
//! A run resolves its start offset by probing the store, then per
//! realm: creates the realm with its roles and groups in one unit of
//! work, creates clients in bounded chunks, re-synchronizes the child
//! pools into canonical numeric order, and finally creates users in
//! bounded chunks, assigning roles and groups deterministically from
//! each user's ordinal. A failed run leaves a partially populated,
//! resumable dataset; re-running skips everything that already
//! exists.

pub mod context;
pub mod metrics;
pub mod orchestrator;
pub mod resync;
pub mod server;
pub mod timer;
pub mod txn;

pub use context::GenerationContext;
pub use metrics::RunSummary;
pub use orchestrator::DatasetPopulator;
pub use server::TriggerServer;
pub use timer::ProgressTimer;
pub use txn::UnitOfWorkRunner;
