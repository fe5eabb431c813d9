//! Access Cache - Persist access decisions across runs
//!
//! Maps publication id to its access URI in a single JSON object. Loaded
//! once at startup, mutated in memory, written back in full on flush.
//! Entries never expire.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::CacheResult;
use crate::models::AccessRights;

/// Persistent publication id -> access decision store
#[derive(Debug)]
pub struct AccessCache {
    /// File the decisions are read from and flushed to
    path: PathBuf,
    /// Known decisions (publication id -> rights)
    decisions: BTreeMap<String, AccessRights>,
}

impl AccessCache {
    /// Load the cache file, starting empty when it does not exist yet
    pub fn load(path: impl AsRef<Path>) -> CacheResult<Self> {
        let path = PathBuf::from(path.as_ref());
        let decisions: BTreeMap<String, AccessRights> = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            BTreeMap::new()
        };
        info!("Loaded [{}] access decisions from [{}]", decisions.len(), path.display());
        Ok(Self { path, decisions })
    }

    /// An empty cache that will be flushed to `path`
    pub fn empty(path: impl AsRef<Path>) -> Self {
        Self {
            path: PathBuf::from(path.as_ref()),
            decisions: BTreeMap::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<AccessRights> {
        self.decisions.get(id).copied()
    }

    /// Store a decision and return the one in effect.
    ///
    /// An existing decision is never replaced.
    pub fn record(&mut self, id: &str, rights: AccessRights) -> AccessRights {
        let stored = *self.decisions.entry(id.to_string()).or_insert(rights);
        if stored != rights {
            warn!(
                "Keeping cached access {:?} for {} over new decision {:?}",
                stored, id, rights
            );
        }
        stored
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// Rewrite the cache file with every decision.
    ///
    /// Nothing is written when the cache is empty. Returns whether the file
    /// was written.
    pub fn flush(&self) -> CacheResult<bool> {
        if self.decisions.is_empty() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.decisions)?;
        fs::write(&self.path, content)?;
        info!("Stored [{}] access decisions in [{}]", self.decisions.len(), self.path.display());
        Ok(true)
    }
}
