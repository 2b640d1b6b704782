//! Deterministic role/group assignment.
//!
//! User `i` receives a sliding window of the available pools:
//! indices `(i * f + j) mod pool_size` for `j in 0..f`. Consecutive
//! users share most of their roles and groups with a one-slot shift,
//! the distribution is even, and the whole relationship graph is a
//! pure function of the configuration. Two properties follow:
//!
//! - the same configuration always produces the same graph, so
//!   benchmark runs are repeatable;
//! - the assignment of any user is computable without looking at any
//!   other user, so chunks can be executed independently.

use crate::error::ConfigError;

/// How many of each pool every user receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanOut {
    pub realm_roles_per_user: usize,
    pub client_roles_per_user: usize,
    pub groups_per_user: usize,
}

/// Sizes of the pools the windows are cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSizes {
    pub realm_roles: usize,
    pub client_roles: usize,
    pub groups: usize,
}

/// The pool indices assigned to one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAssignment {
    pub realm_roles: Vec<usize>,
    pub client_roles: Vec<usize>,
    pub groups: Vec<usize>,
}

/// Maps a user ordinal to its deterministic set of pool indices.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentAllocator {
    fan_out: FanOut,
    pools: PoolSizes,
}

impl AssignmentAllocator {
    /// Validate fan-outs against the pools and build the allocator.
    ///
    /// A fan-out over an empty pool would divide by zero in the
    /// modulo step, and a fan-out larger than its pool would assign
    /// duplicate entities to one user; both are rejected here, before
    /// any user is created.
    pub fn new(fan_out: FanOut, pools: PoolSizes) -> Result<Self, ConfigError> {
        Self::check_pool("realm roles", fan_out.realm_roles_per_user, pools.realm_roles)?;
        Self::check_pool(
            "client roles",
            fan_out.client_roles_per_user,
            pools.client_roles,
        )?;
        Self::check_pool("groups", fan_out.groups_per_user, pools.groups)?;
        Ok(Self { fan_out, pools })
    }

    fn check_pool(pool: &'static str, fan_out: usize, pool_size: usize) -> Result<(), ConfigError> {
        if fan_out == 0 {
            return Ok(());
        }
        if pool_size == 0 {
            return Err(ConfigError::EmptyPool { pool, fan_out });
        }
        if fan_out > pool_size {
            return Err(ConfigError::FanOutExceedsPool {
                pool,
                fan_out,
                pool_size,
            });
        }
        Ok(())
    }

    /// The assignment for the user at `ordinal` (0-based, per realm).
    pub fn for_user(&self, ordinal: usize) -> UserAssignment {
        UserAssignment {
            realm_roles: window(ordinal, self.fan_out.realm_roles_per_user, self.pools.realm_roles),
            client_roles: window(
                ordinal,
                self.fan_out.client_roles_per_user,
                self.pools.client_roles,
            ),
            groups: window(ordinal, self.fan_out.groups_per_user, self.pools.groups),
        }
    }
}

fn window(ordinal: usize, fan_out: usize, pool_size: usize) -> Vec<usize> {
    if fan_out == 0 {
        return Vec::new();
    }
    (0..fan_out)
        .map(|j| (ordinal * fan_out + j) % pool_size)
        .collect()
}
