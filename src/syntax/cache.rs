//! Pattern set cache shared by every document of a language
//!
//! Entries are created once per distinct path and never evicted; the set of
//! languages is small and fixed. The cache does no locking of its own:
//! callers sharing it across threads wrap it in a mutex.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Result, SyntaxError};
use super::patterns::PatternSet;

/// Path-keyed store of loaded pattern sets
#[derive(Debug, Default)]
pub struct PatternCache {
    sets: HashMap<PathBuf, Arc<PatternSet>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pattern set for `path`, loading it on first request.
    ///
    /// A failed load leaves no entry behind, so a later request retries.
    pub fn get(&mut self, path: impl AsRef<Path>) -> Result<Arc<PatternSet>> {
        let path = path.as_ref();
        if let Some(set) = self.sets.get(path) {
            return Ok(Arc::clone(set));
        }

        let set = Arc::new(PatternSet::load(path)?);
        debug!(file = %path.display(), "pattern set loaded");
        self.sets.insert(path.to_path_buf(), Arc::clone(&set));
        Ok(set)
    }

    /// Already-loaded pattern set, without touching the disk
    pub fn cached(&self, path: impl AsRef<Path>) -> Option<Arc<PatternSet>> {
        self.sets.get(path.as_ref()).cloned()
    }

    /// Warm the cache for a list of paths.
    ///
    /// Failures are logged and returned; the other paths still load.
    pub fn preload<I, P>(&mut self, paths: I) -> Vec<(PathBuf, SyntaxError)>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut failures = Vec::new();
        for path in paths {
            let path = path.as_ref();
            if let Err(e) = self.get(path) {
                warn!(file = %path.display(), error = %e, "preload failed");
                failures.push((path.to_path_buf(), e));
            }
        }
        failures
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.sets.contains_key(path.as_ref())
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
