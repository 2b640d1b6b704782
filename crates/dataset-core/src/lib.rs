//! Core generation engine for idp-populate.
//!
//! This crate holds the pure, I/O-free pieces of the dataset
//! populator:
//!
//! - [`GenerationConfig`] - resolved parameters for one populate run
//! - [`probe::find_free_index`] - where did the previous run stop?
//! - [`planner::chunks`] - split a creation request into bounded ranges
//! - [`AssignmentAllocator`] - which roles/groups does user `i` get?
//! - [`names`] - `prefix + index` naming and ordinal recovery
//!
//! # Architecture
//!
//! ```text
//! dataset-core (this crate)
//!    │
//!    ├─── identity-store   (backend interface, consumes the types)
//!    └─── idp-populate     (orchestrator, drives the algorithms)
//! ```
//!
//! Everything here is deterministic: the same configuration always
//! produces the same plan and the same relationship graph, which is
//! what makes populate runs repeatable and chunk-parallelizable.

pub mod assign;
pub mod config;
pub mod error;
pub mod names;
pub mod phase;
pub mod planner;
pub mod probe;

pub use assign::{AssignmentAllocator, FanOut, PoolSizes, UserAssignment};
pub use config::{GenerationConfig, ResolvedConfig};
pub use error::{ConfigError, DatasetError, ProbeError};
pub use phase::GenerationPhase;
pub use planner::{chunks, ChunkRange, Chunks};
pub use probe::find_free_index;
