//! # Runtime events emitted by the notifier components.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Ingestion events**: assets recorded in the registry, events queued for a tenant
//! - **Flush events**: tick started, summary delivered, batch dropped
//! - **Directory events**: register/unregister, restore/persist of the durable mapping
//! - **Runtime events**: shutdown, worker stop, subscriber failures
//!
//! The [`Event`] struct carries additional metadata such as timestamps, tenant,
//! asset, destination, counts and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use emoji_notifier::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::BatchDropped)
//!     .with_tenant("g1")
//!     .with_count(3)
//!     .with_reason("delivery_no_destination");
//!
//! assert_eq!(ev.kind, EventKind::BatchDropped);
//! assert_eq!(ev.tenant.as_deref(), Some("g1"));
//! assert_eq!(ev.count, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Ingestion events ===
    /// An asset id was recorded for the first time in a tenant's registry.
    ///
    /// Sets:
    /// - `tenant`: tenant id
    /// - `asset`: asset id
    AssetRecorded,

    /// A genuinely new asset was queued for the next summary.
    ///
    /// Sets:
    /// - `tenant`: tenant id
    /// - `asset`: asset id
    EventQueued,

    // === Flush events ===
    /// The aggregation window elapsed (or a flush was forced).
    ///
    /// Sets:
    /// - `count`: number of tenants with pending events
    TickStarted,

    /// A tenant's summary was delivered.
    ///
    /// Sets:
    /// - `tenant`: tenant id
    /// - `destination`: destination id
    /// - `count`: number of assets in the summary
    SummaryDelivered,

    /// A tenant's batch was discarded (no retry).
    ///
    /// Sets:
    /// - `tenant`: tenant id
    /// - `count`: number of discarded assets
    /// - `reason`: error label
    BatchDropped,

    // === Directory events ===
    /// A destination was registered for a tenant.
    ///
    /// Sets:
    /// - `tenant`, `destination`
    DestinationRegistered,

    /// A tenant's destination was removed.
    ///
    /// Sets:
    /// - `tenant`, `destination`
    DestinationUnregistered,

    /// The mapping was loaded from the durable store.
    ///
    /// Sets:
    /// - `count`: number of restored entries
    DirectoryRestored,

    /// Loading the durable mapping failed; the directory starts empty.
    ///
    /// Sets:
    /// - `reason`: error message
    DirectoryRestoreFailed,

    /// The mapping was written to the durable store.
    ///
    /// Sets:
    /// - `count`: number of persisted entries
    DirectoryPersisted,

    /// Writing the durable mapping failed.
    ///
    /// Sets:
    /// - `reason`: error message
    DirectoryPersistFailed,

    // === Runtime events ===
    /// Shutdown requested (OS signal observed or explicit request).
    ShutdownRequested,

    /// The aggregation worker left its loop.
    ///
    /// Sets:
    /// - `count`: number of pending events dropped on exit
    WorkerStopped,

    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `reason`: subscriber name and panic info
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `reason`: subscriber name and cause
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Tenant the event relates to.
    pub tenant: Option<Arc<str>>,
    /// Asset id the event relates to.
    pub asset: Option<Arc<str>>,
    /// Destination id the event relates to.
    pub destination: Option<Arc<str>>,
    /// Count (tenants, assets or entries depending on the kind).
    pub count: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            tenant: None,
            asset: None,
            destination: None,
            count: None,
            reason: None,
        }
    }

    /// Attaches a tenant id.
    #[inline]
    pub fn with_tenant(mut self, tenant: impl Into<Arc<str>>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Attaches an asset id.
    #[inline]
    pub fn with_asset(mut self, asset: impl Into<Arc<str>>) -> Self {
        self.asset = Some(asset.into());
        self
    }

    /// Attaches a destination id.
    #[inline]
    pub fn with_destination(mut self, destination: impl Into<Arc<str>>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Attaches a count (saturates at `u32::MAX`).
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(u32::try_from(n).unwrap_or(u32::MAX));
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::TickStarted);
        let b = Event::new(EventKind::TickStarted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_count_saturates() {
        let ev = Event::new(EventKind::TickStarted).with_count(usize::MAX);
        assert_eq!(ev.count, Some(u32::MAX));
    }
}
