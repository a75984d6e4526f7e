use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::db::Database;
use crate::services::repetition::SelectionPolicy;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    db: Database,
    policy: Arc<SelectionPolicy>,
}

impl AppState {
    pub fn new(db: Database, policy: SelectionPolicy) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            db,
            policy: Arc::new(policy),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn policy(&self) -> Arc<SelectionPolicy> {
        Arc::clone(&self.policy)
    }
}
