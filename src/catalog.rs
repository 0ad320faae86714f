//! Exercise catalog providers and an explicit TTL cache

use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::debug;

use crate::exercises::{Exercise, builtin_exercises};

/// Source of active exercises. The generator treats the result as a pure
/// input snapshot and never calls back into the provider.
pub trait ExerciseCatalog {
    fn get_all(&self) -> Result<Vec<Exercise>>;
}

/// Catalog backed by the built-in exercise set
pub struct BuiltinCatalog;

impl ExerciseCatalog for BuiltinCatalog {
    fn get_all(&self) -> Result<Vec<Exercise>> {
        Ok(builtin_exercises()
            .into_iter()
            .filter(|e| e.is_active)
            .collect())
    }
}

/// Caching wrapper around any catalog with an explicitly configured TTL.
/// Holds the last fetch and serves it until the TTL elapses or the cache
/// is invalidated.
pub struct CachedCatalog<C: ExerciseCatalog> {
    inner: C,
    ttl: Duration,
    slot: Mutex<Option<(Instant, Vec<Exercise>)>>,
}

impl<C: ExerciseCatalog> CachedCatalog<C> {
    pub fn new(inner: C, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Drop the cached snapshot; the next `get_all` refetches
    pub fn invalidate(&self) {
        *self.slot.lock().unwrap() = None;
    }
}

impl<C: ExerciseCatalog> ExerciseCatalog for CachedCatalog<C> {
    fn get_all(&self) -> Result<Vec<Exercise>> {
        let mut slot = self.slot.lock().unwrap();

        if let Some((fetched_at, exercises)) = slot.as_ref()
            && fetched_at.elapsed() < self.ttl
        {
            return Ok(exercises.clone());
        }

        debug!("exercise cache miss, fetching");
        let exercises = self.inner.get_all()?;
        *slot = Some((Instant::now(), exercises.clone()));
        Ok(exercises)
    }
}
