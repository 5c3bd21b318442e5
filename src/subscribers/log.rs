//! # LogWriter: event renderer backed by `tracing`.
//!
//! A subscriber that turns every [`Event`] into one structured `tracing` record.
//! Routine traffic (queued events, recorded assets) is logged at `debug`,
//! outcomes at `info`, drops and failures at `warn`.
//!
//! ## Example output (fmt layer)
//! ```text
//! INFO  summary delivered tenant="g1" destination="c1" count=2
//! WARN  batch dropped tenant="g2" count=1 reason="delivery_no_destination"
//! INFO  destination registered tenant="g1" destination="c1"
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Debug, Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let tenant = e.tenant.as_deref().unwrap_or("-");
        let asset = e.asset.as_deref().unwrap_or("-");
        let destination = e.destination.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        let count = e.count.unwrap_or(0);

        match e.kind {
            EventKind::AssetRecorded => {
                debug!(seq = e.seq, tenant, asset, "asset recorded");
            }
            EventKind::EventQueued => {
                debug!(seq = e.seq, tenant, asset, "new asset queued");
            }
            EventKind::TickStarted => {
                debug!(seq = e.seq, pending_tenants = count, "tick");
            }
            EventKind::SummaryDelivered => {
                info!(seq = e.seq, tenant, destination, count, "summary delivered");
            }
            EventKind::BatchDropped => {
                warn!(seq = e.seq, tenant, count, reason, "batch dropped");
            }
            EventKind::DestinationRegistered => {
                info!(seq = e.seq, tenant, destination, "destination registered");
            }
            EventKind::DestinationUnregistered => {
                info!(seq = e.seq, tenant, destination, "destination unregistered");
            }
            EventKind::DirectoryRestored => {
                info!(seq = e.seq, entries = count, "directory restored");
            }
            EventKind::DirectoryRestoreFailed => {
                warn!(seq = e.seq, reason, "directory restore failed; starting empty");
            }
            EventKind::DirectoryPersisted => {
                info!(seq = e.seq, entries = count, "directory persisted");
            }
            EventKind::DirectoryPersistFailed => {
                warn!(seq = e.seq, reason, "directory persist failed");
            }
            EventKind::ShutdownRequested => {
                info!(seq = e.seq, "shutdown requested");
            }
            EventKind::WorkerStopped => {
                info!(seq = e.seq, dropped = count, "aggregation worker stopped");
            }
            EventKind::SubscriberOverflow => {
                warn!(seq = e.seq, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                warn!(seq = e.seq, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
