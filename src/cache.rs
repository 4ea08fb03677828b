//! # Name Index Cache Module
//!
//! TTL-refreshed cache for the ingredient/menu name indexes the resolver
//! matches against. The cache is injected into callers rather than living
//! as ambient global state. Staleness is decided per request from the
//! fetch timestamp; there is no in-flight flag that can get stuck.

use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::model::EntityKind;

/// Default time-to-live for a cached name index
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CachedIndex {
    names: Arc<Vec<String>>,
    fetched_at: Instant,
}

/// Cached name indexes keyed by entity kind
pub struct NameIndexCache {
    ttl: Duration,
    entries: Mutex<HashMap<EntityKind, CachedIndex>>,
}

impl NameIndexCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached index for `kind`, refreshing via `fetch` when the
    /// entry is missing or older than the TTL
    pub fn get_or_refresh<F>(&self, kind: EntityKind, fetch: F) -> anyhow::Result<Arc<Vec<String>>>
    where
        F: FnOnce() -> anyhow::Result<Vec<String>>,
    {
        {
            let entries = self.entries.lock().unwrap();
            if let Some(cached) = entries.get(&kind) {
                if cached.fetched_at.elapsed() < self.ttl {
                    return Ok(Arc::clone(&cached.names));
                }
            }
        }

        debug!("Refreshing {} name index", kind.as_str());
        let names = Arc::new(fetch()?);
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            kind,
            CachedIndex {
                names: Arc::clone(&names),
                fetched_at: Instant::now(),
            },
        );
        Ok(names)
    }

    /// Drop the cached index for `kind`, forcing the next lookup to refetch
    ///
    /// Called after a write that changes the index (e.g. auto-provisioning a
    /// new ingredient).
    pub fn invalidate(&self, kind: EntityKind) {
        let mut entries = self.entries.lock().unwrap();
        if entries.remove(&kind).is_some() {
            debug!("Invalidated {} name index", kind.as_str());
        }
    }
}

impl Default for NameIndexCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
