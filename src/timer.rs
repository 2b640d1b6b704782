//! Run-scoped progress timing.
//!
//! A value created at the start of a run and threaded through it, so
//! every progress event carries the time elapsed since the run began.

use std::time::{Duration, Instant};
use tracing::info;

/// Emits progress events stamped with elapsed time.
#[derive(Debug)]
pub struct ProgressTimer {
    label: String,
    started: Instant,
}

impl ProgressTimer {
    /// Start timing and log the opening event.
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!("{label}");
        Self {
            label,
            started: Instant::now(),
        }
    }

    /// Log a progress event with milliseconds since the run started.
    pub fn event(&self, message: &str) {
        info!(
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            since = %self.label,
            "{message}"
        );
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
