//! Run configuration.
//!
//! One populate run is described by a [`GenerationConfig`], built
//! either from HTTP query parameters or from CLI flags. Parsing is an
//! explicit field-by-field affair: every parameter is named once,
//! with its default next to it, and validation runs before anything
//! touches the store.
//!
//! The `start` offset is deliberately NOT a parameter. It is resolved
//! exactly once per run by probing the store for the first free realm
//! index, producing a [`ResolvedConfig`]; this is what makes repeated
//! invocations resume instead of colliding.

use crate::assign::{AssignmentAllocator, FanOut, PoolSizes};
use crate::error::ConfigError;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_REALM_PREFIX: &str = "realm-";
pub const DEFAULT_REALM_ROLE_PREFIX: &str = "role-";
pub const DEFAULT_REALM_ROLES_PER_REALM: u64 = 25;
pub const DEFAULT_CLIENT_PREFIX: &str = "client-";
pub const DEFAULT_CLIENTS_PER_REALM: u64 = 30;
pub const DEFAULT_CLIENT_ROLE_PREFIX: &str = "client-role-";
pub const DEFAULT_CLIENT_ROLES_PER_CLIENT: u64 = 10;
pub const DEFAULT_GROUP_PREFIX: &str = "group-";
pub const DEFAULT_GROUPS_PER_REALM: u64 = 20;
pub const DEFAULT_USER_PREFIX: &str = "user-";
pub const DEFAULT_USERS_PER_REALM: u64 = 200;
pub const DEFAULT_REALM_ROLES_PER_USER: u64 = 4;
pub const DEFAULT_CLIENT_ROLES_PER_USER: u64 = 4;
pub const DEFAULT_GROUPS_PER_USER: u64 = 4;
pub const DEFAULT_PASSWORD_HASH_ITERATIONS: u64 = 20_000;
pub const DEFAULT_CLIENTS_PER_TRANSACTION: u64 = 10;
pub const DEFAULT_USERS_PER_TRANSACTION: u64 = 10;
pub const DEFAULT_TRANSACTION_TIMEOUT_SECS: u64 = 300;

/// Parameters for one populate run. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    /// Realms are named `realm_prefix + index`.
    pub realm_prefix: String,
    /// Number of realms to create.
    pub count: u64,
    pub realm_role_prefix: String,
    pub realm_roles_per_realm: u64,
    pub client_prefix: String,
    pub clients_per_realm: u64,
    /// Client roles are namespaced by their owning client:
    /// `<client>-<client_role_prefix><k>`.
    pub client_role_prefix: String,
    pub client_roles_per_client: u64,
    pub group_prefix: String,
    pub groups_per_realm: u64,
    pub user_prefix: String,
    pub users_per_realm: u64,
    pub realm_roles_per_user: u64,
    pub client_roles_per_user: u64,
    pub groups_per_user: u64,
    /// Fed into the realm's password policy (`hashIterations(N)`).
    pub password_hash_iterations: u64,
    /// Clients created per unit of work.
    pub clients_per_transaction: u64,
    /// Users created per unit of work.
    pub users_per_transaction: u64,
    /// Budget for a single unit of work.
    pub transaction_timeout_secs: u64,
}

impl GenerationConfig {
    /// All defaults, with the required realm count filled in.
    pub fn with_count(count: u64) -> Self {
        Self {
            realm_prefix: DEFAULT_REALM_PREFIX.to_string(),
            count,
            realm_role_prefix: DEFAULT_REALM_ROLE_PREFIX.to_string(),
            realm_roles_per_realm: DEFAULT_REALM_ROLES_PER_REALM,
            client_prefix: DEFAULT_CLIENT_PREFIX.to_string(),
            clients_per_realm: DEFAULT_CLIENTS_PER_REALM,
            client_role_prefix: DEFAULT_CLIENT_ROLE_PREFIX.to_string(),
            client_roles_per_client: DEFAULT_CLIENT_ROLES_PER_CLIENT,
            group_prefix: DEFAULT_GROUP_PREFIX.to_string(),
            groups_per_realm: DEFAULT_GROUPS_PER_REALM,
            user_prefix: DEFAULT_USER_PREFIX.to_string(),
            users_per_realm: DEFAULT_USERS_PER_REALM,
            realm_roles_per_user: DEFAULT_REALM_ROLES_PER_USER,
            client_roles_per_user: DEFAULT_CLIENT_ROLES_PER_USER,
            groups_per_user: DEFAULT_GROUPS_PER_USER,
            password_hash_iterations: DEFAULT_PASSWORD_HASH_ITERATIONS,
            clients_per_transaction: DEFAULT_CLIENTS_PER_TRANSACTION,
            users_per_transaction: DEFAULT_USERS_PER_TRANSACTION,
            transaction_timeout_secs: DEFAULT_TRANSACTION_TIMEOUT_SECS,
        }
    }

    /// Build a configuration from decoded query pairs.
    ///
    /// `count` is required; every other parameter falls back to its
    /// documented default. Unknown parameters are ignored.
    pub fn from_query_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, ConfigError> {
        let map: HashMap<&str, &str> = pairs.into_iter().collect();

        let config = Self {
            realm_prefix: string_param(&map, "realm-prefix", DEFAULT_REALM_PREFIX),
            count: required_int_param(&map, "count")?,
            realm_role_prefix: string_param(&map, "realm-role-prefix", DEFAULT_REALM_ROLE_PREFIX),
            realm_roles_per_realm: int_param(
                &map,
                "realm-roles-per-realm",
                DEFAULT_REALM_ROLES_PER_REALM,
            )?,
            client_prefix: string_param(&map, "client-prefix", DEFAULT_CLIENT_PREFIX),
            clients_per_realm: int_param(&map, "clients-per-realm", DEFAULT_CLIENTS_PER_REALM)?,
            client_role_prefix: string_param(
                &map,
                "client-role-prefix",
                DEFAULT_CLIENT_ROLE_PREFIX,
            ),
            client_roles_per_client: int_param(
                &map,
                "client-roles-per-client",
                DEFAULT_CLIENT_ROLES_PER_CLIENT,
            )?,
            group_prefix: string_param(&map, "group-prefix", DEFAULT_GROUP_PREFIX),
            groups_per_realm: int_param(&map, "groups-per-realm", DEFAULT_GROUPS_PER_REALM)?,
            user_prefix: string_param(&map, "user-prefix", DEFAULT_USER_PREFIX),
            users_per_realm: int_param(&map, "users-per-realm", DEFAULT_USERS_PER_REALM)?,
            realm_roles_per_user: int_param(
                &map,
                "realm-roles-per-user",
                DEFAULT_REALM_ROLES_PER_USER,
            )?,
            client_roles_per_user: int_param(
                &map,
                "client-roles-per-user",
                DEFAULT_CLIENT_ROLES_PER_USER,
            )?,
            groups_per_user: int_param(&map, "groups-per-user", DEFAULT_GROUPS_PER_USER)?,
            password_hash_iterations: int_param(
                &map,
                "password-hash-iterations",
                DEFAULT_PASSWORD_HASH_ITERATIONS,
            )?,
            clients_per_transaction: int_param(
                &map,
                "clients-per-transaction",
                DEFAULT_CLIENTS_PER_TRANSACTION,
            )?,
            users_per_transaction: int_param(
                &map,
                "users-per-transaction",
                DEFAULT_USERS_PER_TRANSACTION,
            )?,
            transaction_timeout_secs: int_param(
                &map,
                "transaction-timeout",
                DEFAULT_TRANSACTION_TIMEOUT_SECS,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that could never run to completion.
    ///
    /// Runs before any store write: zero counts where at least one is
    /// needed, zero chunk sizes, and fan-outs that an assignment
    /// window could not be cut from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "count",
                value: "0".to_string(),
                reason: "at least one realm must be requested".to_string(),
            });
        }
        if self.clients_per_transaction == 0 {
            return Err(ConfigError::NonPositiveChunkSize {
                name: "clients-per-transaction",
                value: 0,
            });
        }
        if self.users_per_transaction == 0 {
            return Err(ConfigError::NonPositiveChunkSize {
                name: "users-per-transaction",
                value: 0,
            });
        }
        if self.transaction_timeout_secs == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "transaction-timeout",
                value: "0".to_string(),
                reason: "a unit of work needs a nonzero budget".to_string(),
            });
        }
        // The same checks guard the user phase against the actual
        // pools after resync; here they catch impossible requests
        // before a single entity exists.
        AssignmentAllocator::new(self.fan_out(), self.configured_pools())?;
        Ok(())
    }

    /// Per-user fan-out configured for this run.
    pub fn fan_out(&self) -> FanOut {
        FanOut {
            realm_roles_per_user: self.realm_roles_per_user as usize,
            client_roles_per_user: self.client_roles_per_user as usize,
            groups_per_user: self.groups_per_user as usize,
        }
    }

    /// Pool sizes as configured (not as observed in the store).
    pub fn configured_pools(&self) -> PoolSizes {
        PoolSizes {
            realm_roles: self.realm_roles_per_realm as usize,
            client_roles: (self.clients_per_realm * self.client_roles_per_client) as usize,
            groups: self.groups_per_realm as usize,
        }
    }

    /// Budget for one unit of work.
    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_secs(self.transaction_timeout_secs)
    }

    /// Attach the probed start offset.
    pub fn resolved(self, start: u64) -> ResolvedConfig {
        ResolvedConfig {
            start,
            config: self,
        }
    }
}

/// A configuration plus the start offset probed from the store.
///
/// Built exactly once per run, before any entity is created; the
/// offset never changes afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub start: u64,
    pub config: GenerationConfig,
}

impl ResolvedConfig {
    /// The realm ordinals this run will create, ascending.
    pub fn realm_indices(&self) -> std::ops::Range<u64> {
        self.start..self.start + self.config.count
    }
}

fn string_param(map: &HashMap<&str, &str>, name: &str, default: &str) -> String {
    map.get(name).copied().unwrap_or(default).to_string()
}

fn int_param(
    map: &HashMap<&str, &str>,
    name: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match map.get(name) {
        None => Ok(default),
        Some(raw) => parse_int(name, raw),
    }
}

fn required_int_param(map: &HashMap<&str, &str>, name: &'static str) -> Result<u64, ConfigError> {
    let raw = map.get(name).ok_or(ConfigError::MissingParameter(name))?;
    parse_int(name, raw)
}

fn parse_int(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse().map_err(|e| ConfigError::InvalidParameter {
        name,
        value: raw.to_string(),
        reason: format!("{e}"),
    })
}
