//! Unit-of-work execution under a time budget.
//!
//! The backend owns real transaction boundaries; what the engine
//! enforces is that no single unit of work can hang a run. Every
//! chunk runs under the configured transaction timeout and a breach
//! is an error carrying the phase and range it happened in, not a
//! silent stall.

use dataset_core::{ChunkRange, DatasetError, GenerationPhase};
use std::future::Future;
use std::time::Duration;

/// Runs units of work against the configured budget.
#[derive(Debug, Clone, Copy)]
pub struct UnitOfWorkRunner {
    budget: Duration,
}

impl UnitOfWorkRunner {
    pub fn new(budget: Duration) -> Self {
        Self { budget }
    }

    /// Drive `work` to completion or to the budget, whichever is
    /// first. Failures and timeouts are tagged with `phase` and
    /// `range` so a failed run reports exactly where it stopped.
    pub async fn run<T>(
        &self,
        phase: GenerationPhase,
        range: Option<ChunkRange>,
        work: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, DatasetError> {
        match tokio::time::timeout(self.budget, work).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(DatasetError::UnitOfWork {
                phase,
                range,
                source,
            }),
            Err(_) => Err(DatasetError::UnitOfWork {
                phase,
                range,
                source: anyhow::anyhow!(
                    "unit of work exceeded its {}s budget",
                    self.budget.as_secs()
                ),
            }),
        }
    }
}
