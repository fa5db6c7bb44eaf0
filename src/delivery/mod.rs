//! Delivery engine for tracking records
//!
//! Sends a coordinate-bound record to the spreadsheet endpoint and reacts
//! to the classified response:
//!
//! - `success`: done.
//! - `busy`: another writer holds the sheet lock; wait a fixed backoff and
//!   resend the same record unchanged.
//! - `sync_required`: the cached row no longer matches the roster; refresh
//!   the map once, patch the record's row, and resend. If the refresh fails
//!   or the student is gone, clear the cache and fail closed with a re-sync
//!   prompt rather than write to a stale coordinate.
//! - anything else: unrecoverable; notify unless the caller suppresses it.
//!
//! Transitions for one record are strictly sequential; no two remote calls
//! for the same record are ever in flight at once. The spreadsheet write is
//! an upsert by coordinate, so a repeated success is harmless.

use crate::error::{Error, Result};
use crate::sheet::cache::SheetMapCache;
use crate::sheet::map::CellRef;
use crate::sheet::transport::{DeliveryOutcome, SheetTransport};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// One submission's tracking data, consumed exactly once by the engine.
///
/// Either coordinate-bound (both indices known) or coordinate-free; never
/// half-bound. Retries reuse the same record; reconciliation mutates only
/// the row, the column is stable across roster edits.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingRecord {
    pub group: String,
    pub student_full_name: String,
    pub problem_url: String,
    pub github_link: String,
    pub attempts: u32,
    pub time_minutes: f64,
    pub coordinate: Option<CellRef>,
}

impl TrackingRecord {
    pub fn is_bound(&self) -> bool {
        self.coordinate.is_some()
    }
}

/// Per-delivery options.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeliveryOptions {
    /// Skip the passive failure notification (caller shows its own error UI).
    pub suppress_notification: bool,
}

/// Passive user-facing notification sink.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Default notifier: surfaces the message through the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        error!("{message}");
    }
}

pub const RESYNC_MESSAGE: &str = "An instructor just updated the spreadsheet. \
    Please sync and push again to record your solution.";

const DEFAULT_FAILURE_MESSAGE: &str = "We had a hiccup saving to the tracker. \
    Please check that your name is matched correctly and push again.";

const DEFAULT_BUSY_BACKOFF: Duration = Duration::from_secs(3);

pub struct DeliveryEngine {
    transport: Arc<dyn SheetTransport>,
    cache: Arc<SheetMapCache>,
    notifier: Arc<dyn Notifier>,
    busy_backoff: Duration,
    /// `None` retries busy forever; callers then own the deadline.
    max_busy_retries: Option<u32>,
}

impl DeliveryEngine {
    pub fn new(
        transport: Arc<dyn SheetTransport>,
        cache: Arc<SheetMapCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            transport,
            cache,
            notifier,
            busy_backoff: DEFAULT_BUSY_BACKOFF,
            max_busy_retries: Some(100),
        }
    }

    pub fn with_busy_policy(mut self, backoff: Duration, max_retries: Option<u32>) -> Self {
        self.busy_backoff = backoff;
        self.max_busy_retries = max_retries;
        self
    }

    /// Deliver one coordinate-bound record, retrying and reconciling as
    /// needed. On success the record has been upserted at its coordinate;
    /// on failure the archive made beforehand is untouched.
    pub async fn deliver(
        &self,
        record: &mut TrackingRecord,
        options: DeliveryOptions,
    ) -> Result<()> {
        let bound = self.validate(record)?;
        let col = bound.col;
        let mut busy_retries: u32 = 0;
        let mut reconciled = false;

        loop {
            let outcome = match self.transport.push(record).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    return Err(self.fail(
                        format!("{DEFAULT_FAILURE_MESSAGE} ({e})"),
                        options,
                    ));
                }
            };

            match outcome {
                DeliveryOutcome::Success => {
                    info!(
                        student = %record.student_full_name,
                        problem = %record.problem_url,
                        "tracking record written"
                    );
                    return Ok(());
                }
                DeliveryOutcome::Busy => {
                    if let Some(cap) = self.max_busy_retries {
                        if busy_retries >= cap {
                            return Err(self.fail(
                                format!(
                                    "the sheet stayed busy after {cap} retries; \
                                     please push again in a minute"
                                ),
                                options,
                            ));
                        }
                    }
                    busy_retries += 1;
                    debug!(
                        retry = busy_retries,
                        "endpoint busy, retrying in {:?}", self.busy_backoff
                    );
                    sleep(self.busy_backoff).await;
                }
                DeliveryOutcome::SyncRequired => {
                    warn!("endpoint reported stale coordinates, reconciling");
                    if !reconciled {
                        if let Some(row) = self.reconcile(record).await {
                            record.coordinate = Some(CellRef { row, col });
                            reconciled = true;
                            continue;
                        }
                    }
                    // Reconciliation could not re-bind the row: fail closed
                    // and make the user re-sync instead of guessing a cell.
                    if let Err(e) = self.cache.clear() {
                        warn!("failed to clear stale cache: {e}");
                    }
                    if !options.suppress_notification {
                        self.notifier.notify(RESYNC_MESSAGE);
                    }
                    return Err(Error::SyncRequired(RESYNC_MESSAGE.to_string()));
                }
                DeliveryOutcome::Error(message) => {
                    let message = if message.trim().is_empty() {
                        DEFAULT_FAILURE_MESSAGE.to_string()
                    } else {
                        message
                    };
                    return Err(self.fail(message, options));
                }
            }
        }
    }

    /// Client-side validation, before any network call.
    fn validate(&self, record: &TrackingRecord) -> Result<CellRef> {
        let bound = record.coordinate.ok_or_else(|| {
            Error::Validation("tracking record is not coordinate-bound".to_string())
        })?;
        if !record.time_minutes.is_finite() || record.time_minutes < 0.0 {
            return Err(Error::Validation(format!(
                "time taken must be a finite non-negative number, got {}",
                record.time_minutes
            )));
        }
        Ok(bound)
    }

    /// One reconciliation pass: re-fetch the map and look the student up in
    /// the refreshed roster.
    async fn reconcile(&self, record: &TrackingRecord) -> Option<u32> {
        let map = self.cache.refresh(&record.group).await?;
        map.row_for_student(&record.student_full_name)
    }

    fn fail(&self, message: String, options: DeliveryOptions) -> Error {
        if !options.suppress_notification {
            self.notifier.notify(&message);
        }
        Error::Delivery(message)
    }
}
