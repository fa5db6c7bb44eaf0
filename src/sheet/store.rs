//! Persisted sheet map snapshot
//!
//! The map and its group identifier are one snapshot: they are written
//! together and read together, never one without the other. Writes go
//! through a temp file and rename so a crash never leaves a torn snapshot.

use crate::error::Result;
use crate::sheet::map::SheetMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

const SNAPSHOT_FILE: &str = "sheet_map.json";

#[derive(Debug, Serialize, Deserialize)]
struct StoredSnapshot {
    group: String,
    map: SheetMap,
    fetched_at: DateTime<Utc>,
}

/// File-backed store for the cached map snapshot.
pub struct MapStore {
    path: PathBuf,
}

impl MapStore {
    /// Create a store rooted at the given data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = data_dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            path: dir.join(SNAPSHOT_FILE),
        })
    }

    /// Load the persisted snapshot, or `None` if absent or incomplete.
    ///
    /// A corrupt or partially written file invalidates the whole entry; it is
    /// logged and treated as an empty cache, never surfaced as an error.
    pub fn load(&self) -> Option<(SheetMap, String)> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("failed to read sheet map snapshot: {e}");
                return None;
            }
        };
        match serde_json::from_str::<StoredSnapshot>(&contents) {
            Ok(snapshot) if !snapshot.group.trim().is_empty() => {
                Some((snapshot.map, snapshot.group))
            }
            Ok(_) => None,
            Err(e) => {
                warn!("discarding unreadable sheet map snapshot: {e}");
                None
            }
        }
    }

    /// Atomically replace the snapshot.
    pub fn save(&self, map: &SheetMap, group: &str) -> Result<()> {
        let snapshot = StoredSnapshot {
            group: group.trim().to_string(),
            map: map.clone(),
            fetched_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&snapshot)?;
        let temp = self.path.with_extension("tmp");
        fs::write(&temp, json)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    /// Delete the snapshot (map and group together).
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
