//! # emoji-notifier
//!
//! **emoji-notifier** announces newly added custom emoji of a multi-tenant
//! chat platform. Rapid additions are batched into one periodic summary per
//! tenant instead of one message per addition.
//!
//! The crate is the aggregation and deduplication engine. The chat platform
//! itself sits behind the [`Delivery`] and [`DirectoryStore`] traits.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   subscription transport          command transport
//!   (full asset listings)           (register / unregister)
//!            │                                │
//!            ▼                                ▼
//!   ┌─────────────────┐             ┌──────────────────┐
//!   │  EventIngestor  │             │  CommandRouter   │
//!   └────────┬────────┘             └────────┬─────────┘
//!            │ mpsc (hand-off)               ▼
//!            ▼                      ┌──────────────────────┐
//! ┌─────────────────────────────┐   │ DestinationDirectory │◄──► DirectoryStore
//! │  AggregationWorker          │   │ (tenant → channel)   │     (restore / persist)
//! │  - AssetRegistry (known ids)│   └──────────┬───────────┘
//! │  - PendingQueue  (per tenant)──── lookup ──┘
//! │  - interval(notify_window)  │
//! └──────────────┬──────────────┘
//!                │ one Summary per tenant and tick
//!                ▼
//!            Delivery
//!
//!   every component ── publish(Event) ──► Bus ──► SubscriberSet ──► LogWriter / custom
//! ```
//!
//! ### Tick
//! ```text
//! every notify_window:
//!   ├─► PendingQueue::drain_all          (atomic per tenant)
//!   ├─► dedup_latest                     (last state wins, first position kept)
//!   ├─► drop ids already in AssetRegistry
//!   ├─► Delivery::tenant_name / DestinationDirectory::lookup / Delivery::send
//!   │       ├─ Ok  ──► AssetRegistry::record, publish SummaryDelivered
//!   │       └─ Err ──► batch discarded (no retry), publish BatchDropped
//!   └─► next tenant (failures never block other tenants)
//! ```
//!
//! ## Features
//! | Area              | Description                                        | Key types / traits                          |
//! |-------------------|----------------------------------------------------|---------------------------------------------|
//! | **Runtime**       | Build, run and shut down the engine.               | [`Notifier`], [`NotifierBuilder`]           |
//! | **Ingestion**     | Feed asset listings, force flushes.                | [`EventIngestor`], [`FlushReport`]          |
//! | **Commands**      | Register / unregister notification channels.       | [`CommandRouter`], [`Command`]              |
//! | **Transports**    | Platform boundary.                                 | [`Delivery`], [`DirectoryStore`]            |
//! | **Subscriber API**| Hook into runtime events.                          | [`Subscribe`], [`Event`], [`EventKind`]     |
//! | **Errors**        | Typed errors per component.                        | [`DirectoryError`], [`DeliveryError`], ...  |
//! | **Configuration** | Environment-driven settings.                       | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging` (default): [`LogWriter`] subscriber and [`logging::init_logging`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use emoji_notifier::{Asset, Config, MemoryDelivery, MemoryStore, Notifier};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let delivery = Arc::new(MemoryDelivery::new());
//!     delivery.add_tenant("g1", "My Guild").await;
//!     delivery.add_destination("c1").await;
//!
//!     let notifier = Notifier::builder(Config::with_token("token"))
//!         .with_store(Arc::new(MemoryStore::new()))
//!         .build(delivery.clone())
//!         .await?;
//!
//!     notifier.backfill("g1", vec![Asset::new("1", "old")]).await?;
//!     notifier.commands().handle("register", "g1", "c1").await;
//!
//!     let ingestor = notifier.ingestor();
//!     ingestor
//!         .observe("g1", vec![Asset::new("1", "old"), Asset::new("2", "new")])
//!         .await?;
//!     ingestor.flush().await?;
//!
//!     notifier.run_until(async {}).await?;
//!     assert_eq!(delivery.sent().await.len(), 1);
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod model;
mod subscribers;
mod transport;

#[cfg(feature = "logging")]
pub mod logging;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{
    AggregationWorker, AssetRegistry, Command, CommandRouter, DeliveredBatch,
    DestinationDirectory, DroppedBatch, EventIngestor, FlushReport, INVALID_REPLY, Notifier,
    NotifierBuilder, PendingQueue, REGISTERED_REPLY, ShutdownReport, UNREGISTERED_REPLY, classify,
    dedup_latest,
};
pub use error::{ConfigError, DeliveryError, DirectoryError, IngestError, NotifierError, StoreError};
pub use events::{Bus, Event, EventKind};
pub use model::{Asset, NotificationEvent, SUMMARY_COLOR, SUMMARY_TITLE, Summary};
pub use subscribers::{Subscribe, SubscriberSet};
pub use transport::{Delivery, DirectoryStore, JsonFileStore, MemoryDelivery, MemoryStore};

#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
