//! Error types for the generation engine.

use crate::phase::GenerationPhase;
use crate::planner::ChunkRange;
use thiserror::Error;

/// Errors caused by an invalid or incomplete configuration.
///
/// All of these are surfaced before any entity is created.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required query parameter / flag was not supplied.
    #[error("Required parameter '{0}' not present")]
    MissingParameter(&'static str),

    /// A parameter was present but could not be parsed.
    #[error("Invalid value '{value}' for parameter '{name}': {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Chunk sizes must be at least 1.
    #[error("Chunk size '{name}' must be positive, got {value}")]
    NonPositiveChunkSize { name: &'static str, value: u64 },

    /// A per-user fan-out points at an empty pool.
    #[error("{fan_out} {pool} requested per user but the {pool} pool is empty")]
    EmptyPool { pool: &'static str, fan_out: usize },

    /// A per-user fan-out exceeds the pool it draws from.
    #[error("{fan_out} {pool} requested per user but only {pool_size} exist")]
    FanOutExceedsPool {
        pool: &'static str,
        fan_out: usize,
        pool_size: usize,
    },
}

/// Errors from the free-index probe.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The exponential probe never found a free index below the cap.
    ///
    /// The predicate is assumed monotonic, so this means the naming
    /// prefix matches an unreasonably large existing dataset (or the
    /// predicate is broken), not a workload we should keep doubling
    /// into.
    #[error("No free index found below {cap}; check the configured name prefix")]
    BoundExceeded { cap: u64 },

    /// The existence predicate itself failed (store read error).
    #[error("Index probe failed: {0}")]
    Predicate(#[source] anyhow::Error),
}

/// Top-level error for one populate run.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Rejected before any store write.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The start offset could not be resolved.
    #[error("Start resolution error: {0}")]
    Resolution(#[from] ProbeError),

    /// A unit of work failed mid-phase; the dataset is left partially
    /// populated and resumable.
    #[error("Unit of work failed in phase '{phase}'{}: {source}", range_suffix(.range))]
    UnitOfWork {
        phase: GenerationPhase,
        range: Option<ChunkRange>,
        #[source]
        source: anyhow::Error,
    },

    /// Pool re-synchronization found fewer entities than configured.
    ///
    /// Proceeding would make the modulo-based assignment wrap against
    /// the wrong pool size, so the run stops before any user exists.
    #[error("Pool '{pool}' holds {actual} entities after resync, expected {expected}")]
    Consistency {
        pool: &'static str,
        expected: u64,
        actual: u64,
    },
}

fn range_suffix(range: &Option<ChunkRange>) -> String {
    match range {
        Some(r) => format!(", range {r}"),
        None => String::new(),
    }
}

impl DatasetError {
    /// Whether this error maps to a client mistake (HTTP 400) rather
    /// than a server-side failure (HTTP 500).
    pub fn is_client_error(&self) -> bool {
        matches!(self, DatasetError::Config(_))
    }
}
