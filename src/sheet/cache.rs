//! Injectable sheet map cache
//!
//! Owns the in-memory snapshot, the persisted copy, and the refresh path
//! against the remote endpoint. Single-writer discipline: `set` and `clear`
//! are atomic whole-snapshot replacements (last writer wins), which is
//! acceptable because refreshes are infrequent and idempotent.

use crate::error::Result;
use crate::sheet::map::SheetMap;
use crate::sheet::store::MapStore;
use crate::sheet::transport::SheetTransport;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub struct SheetMapCache {
    store: MapStore,
    transport: Arc<dyn SheetTransport>,
    state: Mutex<Option<(SheetMap, String)>>,
}

impl SheetMapCache {
    /// Create a cache, loading any persisted snapshot.
    pub fn new(store: MapStore, transport: Arc<dyn SheetTransport>) -> Self {
        let state = store.load();
        Self {
            store,
            transport,
            state: Mutex::new(state),
        }
    }

    /// Current snapshot and its group, if any.
    pub fn get(&self) -> Option<(SheetMap, String)> {
        self.state.lock().expect("cache lock poisoned").clone()
    }

    /// Atomically replace the snapshot (memory and disk together).
    pub fn set(&self, map: SheetMap, group: &str) -> Result<()> {
        self.store.save(&map, group)?;
        *self.state.lock().expect("cache lock poisoned") = Some((map, group.trim().to_string()));
        Ok(())
    }

    /// Drop the snapshot entirely.
    pub fn clear(&self) -> Result<()> {
        self.store.clear()?;
        *self.state.lock().expect("cache lock poisoned") = None;
        Ok(())
    }

    /// Fetch the authoritative map for `group` and replace the snapshot on
    /// a structurally valid response.
    ///
    /// Soft-failure contract: an invalid or unreachable response returns
    /// `None` and leaves any previously good snapshot untouched, so a flaky
    /// refresh never destroys the cache.
    pub async fn refresh(&self, group: &str) -> Option<SheetMap> {
        let group = group.trim();
        if group.is_empty() {
            return None;
        }
        let fetched = match self.transport.fetch_map(group).await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("map refresh failed: {e}");
                return None;
            }
        };
        let map = fetched?;
        if let Err(e) = self.set(map.clone(), group) {
            warn!("failed to persist refreshed map: {e}");
        }
        debug!(
            group,
            students = map.students.len(),
            problems = map.problems.len(),
            "sheet map refreshed"
        );
        Some(map)
    }

    /// Proactive refresh on startup or group change. Failures are logged
    /// only; this path is speculative and must never surface to the user.
    pub async fn warm(&self, group: &str) {
        let cached_group = self.get().map(|(_, g)| g);
        if let Some(cached) = cached_group {
            if cached != group.trim() {
                // Switching groups invalidates the whole cache, even if the
                // refresh below fails.
                if let Err(e) = self.clear() {
                    warn!("failed to clear cache on group change: {e}");
                }
            }
        }
        if self.refresh(group).await.is_none() {
            debug!("proactive map refresh did not yield a map");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::TrackingRecord;
    use crate::error::Error;
    use crate::sheet::transport::DeliveryOutcome;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tempfile::TempDir;

    struct ScriptedFetch {
        responses: Mutex<Vec<Result<Option<SheetMap>>>>,
    }

    impl ScriptedFetch {
        fn new(responses: Vec<Result<Option<SheetMap>>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
            })
        }
    }

    #[async_trait]
    impl SheetTransport for ScriptedFetch {
        async fn fetch_map(&self, _group: &str) -> Result<Option<SheetMap>> {
            self.responses.lock().unwrap().remove(0)
        }

        async fn push(&self, _record: &TrackingRecord) -> Result<DeliveryOutcome> {
            unreachable!("cache tests never push");
        }
    }

    fn map_with_student(name: &str, row: u32) -> SheetMap {
        SheetMap {
            students: HashMap::from([(name.to_string(), row)]),
            problems: HashMap::from([("1a".to_string(), 3)]),
            solved: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn refresh_replaces_snapshot_wholesale() {
        let dir = TempDir::new().unwrap();
        let transport = ScriptedFetch::new(vec![Ok(Some(map_with_student("Ada Lovelace", 6)))]);
        let cache = SheetMapCache::new(MapStore::new(dir.path()).unwrap(), transport);

        assert!(cache.get().is_none());
        let map = cache.refresh("G71").await.unwrap();
        assert_eq!(map.students.get("Ada Lovelace"), Some(&6));
        let (cached, group) = cache.get().unwrap();
        assert_eq!(group, "G71");
        assert_eq!(cached, map);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let transport = ScriptedFetch::new(vec![
            Ok(Some(map_with_student("Ada Lovelace", 6))),
            Ok(None),
            Err(Error::Delivery("endpoint down".to_string())),
        ]);
        let cache = SheetMapCache::new(MapStore::new(dir.path()).unwrap(), transport);

        cache.refresh("G71").await.unwrap();
        assert!(cache.refresh("G71").await.is_none());
        assert!(cache.refresh("G71").await.is_none());
        // The good snapshot survived both soft failures.
        assert!(cache.get().is_some());
    }

    #[tokio::test]
    async fn empty_group_never_fetches() {
        let dir = TempDir::new().unwrap();
        let transport = ScriptedFetch::new(vec![]);
        let cache = SheetMapCache::new(MapStore::new(dir.path()).unwrap(), transport);
        assert!(cache.refresh("   ").await.is_none());
    }

    #[tokio::test]
    async fn warm_invalidates_on_group_change() {
        let dir = TempDir::new().unwrap();
        let transport = ScriptedFetch::new(vec![
            Ok(Some(map_with_student("Ada Lovelace", 6))),
            // Refresh for the new group fails: cache must still be empty.
            Ok(None),
        ]);
        let cache = SheetMapCache::new(MapStore::new(dir.path()).unwrap(), transport);

        cache.refresh("G71").await.unwrap();
        cache.warm("G72").await;
        assert!(cache.get().is_none());
    }

    #[tokio::test]
    async fn snapshot_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        {
            let transport = ScriptedFetch::new(vec![Ok(Some(map_with_student("Ada Lovelace", 6)))]);
            let cache = SheetMapCache::new(MapStore::new(dir.path()).unwrap(), transport);
            cache.refresh("G71").await.unwrap();
        }
        let transport = ScriptedFetch::new(vec![]);
        let cache = SheetMapCache::new(MapStore::new(dir.path()).unwrap(), transport);
        let (_, group) = cache.get().unwrap();
        assert_eq!(group, "G71");
    }
}
