//! # EventIngestor - producer side of the hand-off channel.
//!
//! The subscription transport pushes the *full current listing* of a tenant's
//! assets whenever one of them changes. The ingestor forwards that listing to
//! the aggregation worker, which runs [`classify`] against its registry and
//! enqueues one event per genuinely new asset.
//!
//! ```text
//! transport ──► EventIngestor::observe ──► [hand-off mpsc] ──► AggregationWorker
//!                                                                 └─► classify ──► PendingQueue
//! ```
//!
//! Classification happens in the worker's context so the registry has a
//! single owner and needs no lock.

use tokio::sync::{mpsc, oneshot};

use crate::core::registry::AssetRegistry;
use crate::core::worker::{FlushReport, Message};
use crate::error::IngestError;
use crate::model::{Asset, NotificationEvent};

/// Cloneable handle feeding the aggregation worker.
#[derive(Clone, Debug)]
pub struct EventIngestor {
    tx: mpsc::Sender<Message>,
}

impl EventIngestor {
    pub(crate) fn new(tx: mpsc::Sender<Message>) -> Self {
        Self { tx }
    }

    /// Forwards a tenant's full asset listing (waits if the hand-off queue is full).
    pub async fn observe(
        &self,
        tenant: impl Into<String>,
        assets: Vec<Asset>,
    ) -> Result<(), IngestError> {
        self.send(Message::Observed {
            tenant: tenant.into(),
            assets,
        })
        .await
    }

    /// Forwards a listing without waiting (fails if the hand-off queue is full).
    pub fn try_observe(
        &self,
        tenant: impl Into<String>,
        assets: Vec<Asset>,
    ) -> Result<(), IngestError> {
        self.tx
            .try_send(Message::Observed {
                tenant: tenant.into(),
                assets,
            })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => IngestError::Full,
                mpsc::error::TrySendError::Closed(_) => IngestError::Closed,
            })
    }

    /// Records a listing as already known, so none of it is ever announced.
    pub async fn backfill(
        &self,
        tenant: impl Into<String>,
        assets: Vec<Asset>,
    ) -> Result<(), IngestError> {
        self.send(Message::Backfill {
            tenant: tenant.into(),
            assets,
        })
        .await
    }

    /// Runs a flush now, without waiting for the window to elapse.
    ///
    /// Messages sent before this call are processed first.
    pub async fn flush(&self) -> Result<FlushReport, IngestError> {
        let (reply, rx) = oneshot::channel();
        self.send(Message::Flush { reply }).await?;
        rx.await.map_err(|_| IngestError::Closed)
    }

    /// Asks the worker to stop after the messages already queued.
    pub(crate) async fn shutdown(&self) -> Result<(), IngestError> {
        self.send(Message::Shutdown).await
    }

    async fn send(&self, msg: Message) -> Result<(), IngestError> {
        self.tx.send(msg).await.map_err(|_| IngestError::Closed)
    }
}

/// Returns one [`NotificationEvent`] per asset of `listing` unknown to `registry`.
///
/// Listing order is preserved. Duplicate ids within one listing are kept;
/// the flush deduplicates them.
pub fn classify(
    registry: &AssetRegistry,
    tenant: &str,
    listing: Vec<Asset>,
) -> Vec<NotificationEvent> {
    listing
        .into_iter()
        .filter(|asset| !registry.contains(tenant, &asset.id))
        .map(|asset| NotificationEvent::new(tenant, asset))
        .collect()
}
