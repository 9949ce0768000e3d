//! Tracks bulk-load jobs spawned from HTTP handlers.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobState {
    Running,
    Completed {
        collection: String,
        categories: usize,
    },
    Failed {
        error: String,
    },
}

#[derive(Clone, Default)]
pub struct JobTracker {
    inner: Arc<RwLock<HashMap<String, JobState>>>,
}

impl JobTracker {
    /// Register a new running job and hand back its id.
    pub fn start(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.inner
            .write()
            .expect("job lock poisoned")
            .insert(id.clone(), JobState::Running);
        id
    }

    pub fn finish(&self, id: &str, state: JobState) {
        self.inner
            .write()
            .expect("job lock poisoned")
            .insert(id.to_string(), state);
    }

    pub fn get(&self, id: &str) -> Option<JobState> {
        self.inner
            .read()
            .expect("job lock poisoned")
            .get(id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_lifecycle_is_observable() {
        let tracker = JobTracker::default();
        let id = tracker.start();
        assert!(matches!(tracker.get(&id), Some(JobState::Running)));
        tracker.finish(
            &id,
            JobState::Completed {
                collection: "merchant_categories".into(),
                categories: 9,
            },
        );
        assert!(matches!(tracker.get(&id), Some(JobState::Completed { .. })));
        assert!(tracker.get("nope").is_none());
    }
}
