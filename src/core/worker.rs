//! # AggregationWorker - timer + hand-off loop owning the pending queue.
//!
//! Batches newly observed assets per tenant and delivers one summary per
//! tenant each aggregation window.
//!
//! ## Architecture
//! ```text
//!                      ┌──────────────── select! ────────────────┐
//! EventIngestor ──► [mpsc] ──► handle(msg)          ticker.tick() ──► flush()
//!                      │        ├─ Observed  → classify → enqueue      │
//!                      │        ├─ Backfill  → registry.backfill       │
//!                      │        ├─ Flush     → flush() → reply         │
//!                      │        └─ Shutdown  → exit loop               │
//!                      └───────────────────────────────────────────────┘
//! ```
//!
//! ## Flush protocol
//! ```text
//! drain_all() (one lock acquisition)
//!   └─► per tenant:
//!         ├─► dedup_latest (last occurrence wins, first-seen order kept)
//!         ├─► drop assets already in the registry
//!         ├─► tenant_name + directory.lookup + delivery.send
//!         │     ├─ Ok  ──► registry.record(each asset), SummaryDelivered
//!         │     └─ Err ──► BatchDropped (discarded, never retried)
//!         └─► next tenant (failures are isolated)
//! ```
//!
//! ## Rules
//! - The worker is the single owner of the [`PendingQueue`] and the [`AssetRegistry`]
//! - No cancellation token: shutdown is a message (or channel closure) processed
//!   after everything queued before it, so the current tick always completes
//! - Pending events are dropped on shutdown, never flushed or persisted
//! - Registry updates after a successful send cannot fail, so a tenant's
//!   batch is recorded all-or-nothing

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::core::directory::DestinationDirectory;
use crate::core::ingest::{EventIngestor, classify};
use crate::core::queue::PendingQueue;
use crate::core::registry::AssetRegistry;
use crate::error::{ConfigError, DeliveryError};
use crate::events::{Bus, Event, EventKind};
use crate::model::{Asset, NotificationEvent, Summary};
use crate::transport::Delivery;

/// Messages accepted on the hand-off channel.
pub(crate) enum Message {
    /// Full current listing of a tenant's assets.
    Observed { tenant: String, assets: Vec<Asset> },
    /// Listing to record without notifying (initial sync).
    Backfill { tenant: String, assets: Vec<Asset> },
    /// Flush now and report.
    Flush { reply: oneshot::Sender<FlushReport> },
    /// Leave the loop after the messages queued so far.
    Shutdown,
}

/// Summary delivered for one tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredBatch {
    /// Tenant id.
    pub tenant: String,
    /// Destination the summary was sent to.
    pub destination: String,
    /// Deduplicated assets that were announced.
    pub assets: Vec<Asset>,
}

/// Batch discarded for one tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedBatch {
    /// Tenant id.
    pub tenant: String,
    /// Deduplicated assets that were not announced.
    pub assets: Vec<Asset>,
    /// Why delivery failed.
    pub error: DeliveryError,
}

/// Outcome of one flush.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Tenants whose summary was delivered.
    pub delivered: Vec<DeliveredBatch>,
    /// Tenants whose batch was discarded.
    pub dropped: Vec<DroppedBatch>,
}

impl FlushReport {
    /// True if the flush had nothing to do.
    pub fn is_empty(&self) -> bool {
        self.delivered.is_empty() && self.dropped.is_empty()
    }

    /// Total number of announced assets.
    pub fn delivered_assets(&self) -> usize {
        self.delivered.iter().map(|b| b.assets.len()).sum()
    }
}

/// Deduplicates by asset id, keeping the **last** state of every id.
///
/// Ids keep the position of their first occurrence, so summaries list assets
/// in the order they were first seen.
///
/// # Example
/// ```
/// use emoji_notifier::{dedup_latest, Asset, NotificationEvent};
///
/// let events = vec![
///     NotificationEvent::new("g1", Asset::new("a", "foo")),
///     NotificationEvent::new("g1", Asset::new("b", "bar")),
///     NotificationEvent::new("g1", Asset::new("a", "foo2")),
/// ];
/// let assets = dedup_latest(events);
/// assert_eq!(assets, vec![Asset::new("a", "foo2"), Asset::new("b", "bar")]);
/// ```
pub fn dedup_latest(events: Vec<NotificationEvent>) -> Vec<Asset> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(events.len());
    let mut out: Vec<Asset> = Vec::with_capacity(events.len());

    for ev in events {
        match index.get(&ev.asset.id) {
            Some(&i) => out[i] = ev.asset,
            None => {
                index.insert(ev.asset.id.clone(), out.len());
                out.push(ev.asset);
            }
        }
    }
    out
}

/// Single consumer of the hand-off channel; see the module docs.
pub struct AggregationWorker {
    window: Duration,
    queue: PendingQueue,
    registry: AssetRegistry,
    directory: DestinationDirectory,
    delivery: Arc<dyn Delivery>,
    bus: Bus,
    rx: mpsc::Receiver<Message>,
}

impl AggregationWorker {
    pub(crate) fn new(
        window: Duration,
        directory: DestinationDirectory,
        delivery: Arc<dyn Delivery>,
        bus: Bus,
        rx: mpsc::Receiver<Message>,
    ) -> Self {
        Self {
            window,
            queue: PendingQueue::new(),
            registry: AssetRegistry::new(bus.clone()),
            directory,
            delivery,
            bus,
            rx,
        }
    }

    /// Creates a worker together with the ingestor feeding it.
    ///
    /// `capacity` bounds the hand-off channel (clamped to at least 1).
    /// A zero `window` is rejected with [`ConfigError::InvalidWindow`].
    pub fn channel(
        window: Duration,
        directory: DestinationDirectory,
        delivery: Arc<dyn Delivery>,
        bus: Bus,
        capacity: usize,
    ) -> Result<(Self, EventIngestor), ConfigError> {
        if window.is_zero() {
            return Err(ConfigError::InvalidWindow {
                value: format!("{window:?}"),
            });
        }
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let worker = Self::new(window, directory, delivery, bus, rx);
        Ok((worker, EventIngestor::new(tx)))
    }

    /// Runs until a shutdown message arrives or every producer is gone.
    ///
    /// Returns the registry so the caller can report what was tracked.
    pub async fn run(mut self) -> AssetRegistry {
        let mut ticker = time::interval_at(Instant::now() + self.window, self.window);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.flush().await;
                }
                msg = self.rx.recv() => match msg {
                    Some(Message::Shutdown) | None => break,
                    Some(msg) => self.handle(msg).await,
                }
            }
        }

        let dropped = self.queue.len().await;
        if dropped > 0 {
            tracing::warn!(dropped, "dropping pending events on shutdown");
        }
        self.bus
            .publish(Event::new(EventKind::WorkerStopped).with_count(dropped));
        self.registry
    }

    async fn handle(&mut self, msg: Message) {
        match msg {
            Message::Observed { tenant, assets } => self.ingest(&tenant, assets).await,
            Message::Backfill { tenant, assets } => {
                self.registry.backfill(&tenant, assets);
                tracing::debug!(%tenant, known = self.registry.len(&tenant), "backfilled");
            }
            Message::Flush { reply } => {
                let report = self.flush().await;
                let _ = reply.send(report);
            }
            Message::Shutdown => {}
        }
    }

    async fn ingest(&mut self, tenant: &str, listing: Vec<Asset>) {
        for ev in classify(&self.registry, tenant, listing) {
            tracing::info!(tenant, asset = %ev.asset.id, name = %ev.asset.name, "new emoji");
            self.bus.publish(
                Event::new(EventKind::EventQueued)
                    .with_tenant(tenant)
                    .with_asset(ev.asset.id.as_str()),
            );
            self.queue.enqueue(ev).await;
        }
    }

    /// Drains every tenant and delivers one summary per tenant.
    pub(crate) async fn flush(&mut self) -> FlushReport {
        let pending = self.queue.drain_all().await;
        self.bus
            .publish(Event::new(EventKind::TickStarted).with_count(pending.len()));

        let mut report = FlushReport::default();
        for (tenant, events) in pending {
            tracing::debug!(%tenant, queued = events.len(), "draining tenant");

            let fresh: Vec<Asset> = dedup_latest(events)
                .into_iter()
                .filter(|asset| !self.registry.contains(&tenant, &asset.id))
                .collect();
            if fresh.is_empty() {
                continue;
            }

            match self.deliver(&tenant, &fresh).await {
                Ok(destination) => {
                    for asset in &fresh {
                        self.registry.record(&tenant, asset.clone());
                    }
                    self.bus.publish(
                        Event::new(EventKind::SummaryDelivered)
                            .with_tenant(tenant.as_str())
                            .with_destination(destination.as_str())
                            .with_count(fresh.len()),
                    );
                    report.delivered.push(DeliveredBatch {
                        tenant,
                        destination,
                        assets: fresh,
                    });
                }
                Err(error) => {
                    tracing::warn!(%tenant, error = %error, label = error.as_label(), "failed to notify new emoji");
                    self.bus.publish(
                        Event::new(EventKind::BatchDropped)
                            .with_tenant(tenant.as_str())
                            .with_count(fresh.len())
                            .with_reason(error.as_label()),
                    );
                    report.dropped.push(DroppedBatch {
                        tenant,
                        assets: fresh,
                        error,
                    });
                }
            }
        }
        report
    }

    async fn deliver(&self, tenant: &str, assets: &[Asset]) -> Result<String, DeliveryError> {
        let name = self
            .delivery
            .tenant_name(tenant)
            .await
            .ok_or_else(|| DeliveryError::UnknownTenant {
                tenant: tenant.to_string(),
            })?;
        let destination =
            self.directory
                .lookup(tenant)
                .await
                .ok_or_else(|| DeliveryError::NoDestination {
                    tenant: tenant.to_string(),
                })?;

        let summary = Summary::build(&name, assets, Utc::now());
        self.delivery.send(&destination, &summary).await?;
        Ok(destination)
    }
}
