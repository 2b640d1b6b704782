//! Identity backend interface for idp-populate.
//!
//! The populate engine treats the identity store as an external
//! collaborator: everything it needs is expressed by the
//! [`IdentityStore`] trait (entity creation, child listing, realm
//! handle refresh) plus the optional [`RealmCache`] trait for
//! backends that shadow reads behind a cache.
//!
//! The crate ships [`MemoryStore`], an in-memory implementation of
//! both traits. It backs the CLI dry-run mode, the HTTP harness and
//! the integration tests; production deployments implement
//! [`IdentityStore`] against their real backend instead.

pub mod memory;
pub mod store;
pub mod types;

pub use memory::MemoryStore;
pub use store::{IdentityStore, RealmCache, StoreError};
pub use types::{
    ClientHandle, ClientSpec, ClientWithRoles, CredentialSpec, GroupRef, RealmHandle, RealmSpec,
    RoleRef, UserRef, UserSpec,
};
