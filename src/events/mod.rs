//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used as the
//! observability sink. The bus is created once by the `Notifier` builder and
//! passed explicitly to every component that reports what it does.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `AssetRegistry`, `AggregationWorker`, `DestinationDirectory`,
//!   `Notifier`, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the sink listener spawned by `Notifier`, which fans out to a `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
