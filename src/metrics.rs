//! Counters for one populate run.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// What one run created, and how fast.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// First realm ordinal this run created.
    pub start_index: u64,
    pub realms_created: u64,
    pub realm_roles_created: u64,
    pub clients_created: u64,
    pub client_roles_created: u64,
    pub groups_created: u64,
    pub users_created: u64,
}

impl RunSummary {
    pub fn begin(start_index: u64) -> Self {
        Self {
            started_at: Utc::now(),
            completed_at: None,
            start_index,
            realms_created: 0,
            realm_roles_created: 0,
            clients_created: 0,
            client_roles_created: 0,
            groups_created: 0,
            users_created: 0,
        }
    }

    pub fn finish(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    pub fn total_entities(&self) -> u64 {
        self.realms_created
            + self.realm_roles_created
            + self.clients_created
            + self.client_roles_created
            + self.groups_created
            + self.users_created
    }

    /// Creation throughput over the whole run.
    pub fn entities_per_second(&self) -> f64 {
        let end = self.completed_at.unwrap_or_else(Utc::now);
        let millis = (end - self.started_at).num_milliseconds();
        if millis <= 0 {
            return 0.0;
        }
        self.total_entities() as f64 * 1000.0 / millis as f64
    }
}
