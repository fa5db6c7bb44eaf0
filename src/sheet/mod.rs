//! Shared tracking sheet: cached index and remote endpoint access
//!
//! - `map` - the cached `{problem -> column, student -> row}` snapshot and
//!   coordinate resolution
//! - `store` - persisted snapshot (map + group written and read together)
//! - `cache` - injectable cache object with `get`/`set`/`clear`/`refresh`
//! - `transport` - remote endpoint client and response classification

pub mod cache;
pub mod map;
pub mod store;
pub mod transport;

pub use cache::SheetMapCache;
pub use map::{resolve_coordinates, CellRef, SheetMap};
pub use store::MapStore;
pub use transport::{DeliveryOutcome, HttpSheetTransport, SheetTransport};
