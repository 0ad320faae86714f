//! Session plan cache - file-backed snapshot of the last generated plan
//!
//! Lets `play --resume` survive a process restart. The planner and player
//! never touch this; it is purely a host convenience.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use crate::planner::WorkoutPlan;

pub struct PlanCache {
    path: PathBuf,
}

impl PlanCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn save(&self, plan: &WorkoutPlan) -> Result<()> {
        let json = serde_json::to_string_pretty(plan)?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write plan cache {}", self.path.display()))?;
        debug!(path = %self.path.display(), "plan cached");
        Ok(())
    }

    /// Returns `None` when no readable plan snapshot exists
    pub fn load(&self) -> Option<WorkoutPlan> {
        let json = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&json).ok()
    }

    pub fn clear(&self) {
        let _ = fs::remove_file(&self.path);
    }
}
