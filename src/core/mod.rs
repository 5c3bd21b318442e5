//! Runtime core: aggregation, routing and lifecycle.
//!
//! The public entry point is [`Notifier`], which wires every component
//! together and owns graceful shutdown. The components are public too so
//! they can be driven directly.
//!
//! Internal modules:
//! - [`registry`]: per-tenant set of already known asset ids;
//! - [`queue`]: per-tenant pending events with an atomic drain;
//! - [`worker`]: timer loop that drains, deduplicates and delivers;
//! - [`ingest`]: producer handle feeding the worker;
//! - [`directory`]: tenant → destination mapping with persistence;
//! - [`commands`]: `register` / `unregister` routing;
//! - [`shutdown`]: cross-platform shutdown signal handling;
//! - [`notifier`] / [`builder`]: construction and lifecycle.

mod builder;
mod commands;
mod directory;
mod ingest;
mod notifier;
mod queue;
mod registry;
mod shutdown;
mod worker;

pub use builder::NotifierBuilder;
pub use commands::{Command, CommandRouter, INVALID_REPLY, REGISTERED_REPLY, UNREGISTERED_REPLY};
pub use directory::DestinationDirectory;
pub use ingest::{EventIngestor, classify};
pub use notifier::{Notifier, ShutdownReport};
pub use queue::PendingQueue;
pub use registry::AssetRegistry;
pub use worker::{AggregationWorker, DeliveredBatch, DroppedBatch, FlushReport, dedup_latest};
