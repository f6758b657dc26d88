//! Snapshot cache over a [`DataSource`].
//!
//! `Reload` prepares fresh tables on every request. `Snapshot` prepares once
//! and hands out the same immutable `Arc<PreparedData>` until
//! [`SnapshotCache::invalidate`] is called; later changes to the underlying
//! files are not seen before that. Failed loads are never cached.

use crate::pipeline::{prepare, MarketingAnalyzer, PreparedData};
use campaign_intel_core::{CachePolicy, DataSource, IntelResult};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

pub struct SnapshotCache<S> {
    source: S,
    policy: CachePolicy,
    slot: RwLock<Option<Arc<PreparedData>>>,
}

impl<S: DataSource> SnapshotCache<S> {
    pub fn new(source: S, policy: CachePolicy) -> Self {
        Self {
            source,
            policy,
            slot: RwLock::new(None),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Prepared tables according to the cache policy.
    pub fn get(&self) -> IntelResult<Arc<PreparedData>> {
        match self.policy {
            CachePolicy::Reload => self.load(),
            CachePolicy::Snapshot => {
                if let Some(data) = self.slot.read().as_ref() {
                    debug!("Serving cached snapshot");
                    return Ok(Arc::clone(data));
                }
                let mut slot = self.slot.write();
                // Another caller may have filled the slot while we waited.
                if let Some(data) = slot.as_ref() {
                    return Ok(Arc::clone(data));
                }
                let data = self.load()?;
                *slot = Some(Arc::clone(&data));
                Ok(data)
            }
        }
    }

    /// Convenience: an analyzer over the current tables.
    pub fn analyzer(&self) -> IntelResult<MarketingAnalyzer> {
        Ok(MarketingAnalyzer::new(self.get()?))
    }

    /// Drop the cached snapshot; the next `get` reloads.
    pub fn invalidate(&self) {
        if self.slot.write().take().is_some() {
            info!("Snapshot invalidated");
        }
    }

    fn load(&self) -> IntelResult<Arc<PreparedData>> {
        let tables = self.source.load()?;
        Ok(Arc::new(prepare(&tables)?))
    }
}
