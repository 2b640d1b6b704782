//! Populate run phases.

use serde::{Deserialize, Serialize};

/// The phases a populate run moves through, in order.
///
/// Phases execute strictly sequentially because each later phase's
/// index space depends on the pools recorded by the earlier ones.
/// The phase is carried in unit-of-work errors so a failed run says
/// exactly where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenerationPhase {
    /// Probing for the first free realm index.
    ResolvingStart,

    /// One unit of work: the realm itself plus its realm roles and
    /// groups.
    CreatingRealmRolesGroups,

    /// Chunked client (and client role) creation.
    CreatingClients,

    /// Reloading and re-sorting the realm's child pools so that
    /// index-based assignment sees a canonical order.
    ResyncingPools,

    /// Chunked user creation, credentials and role/group assignment.
    CreatingUsers,

    /// All phases completed.
    Done,
}

impl GenerationPhase {
    /// String form used in logs and error messages.
    pub fn as_str(&self) -> &str {
        match self {
            GenerationPhase::ResolvingStart => "resolving_start",
            GenerationPhase::CreatingRealmRolesGroups => "creating_realm_roles_groups",
            GenerationPhase::CreatingClients => "creating_clients",
            GenerationPhase::ResyncingPools => "resyncing_pools",
            GenerationPhase::CreatingUsers => "creating_users",
            GenerationPhase::Done => "done",
        }
    }
}

impl std::fmt::Display for GenerationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
