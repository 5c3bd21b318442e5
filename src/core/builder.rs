use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    error::ConfigError,
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
    transport::{Delivery, DirectoryStore, JsonFileStore},
};

use super::{
    directory::DestinationDirectory,
    notifier::{Notifier, NotifierParts, spawn_sink},
    worker::AggregationWorker,
};

/// Builder for constructing a [`Notifier`].
pub struct NotifierBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    store: Option<Arc<dyn DirectoryStore>>,
}

impl NotifierBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            store: None,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (queued assets, deliveries, drops, ...)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Overrides the durable store (default: [`JsonFileStore`] at `Config::store_path`).
    pub fn with_store(mut self, store: Arc<dyn DirectoryStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Builds the notifier and starts its background tasks.
    ///
    /// This consumes the builder and:
    /// - validates the configuration (empty token or zero window is rejected)
    /// - creates the observability bus and starts the subscriber sink
    /// - restores the destination directory from the durable store
    /// - spawns the aggregation worker
    ///
    /// Must be called from within a tokio runtime.
    pub async fn build(self, delivery: Arc<dyn Delivery>) -> Result<Notifier, ConfigError> {
        let cfg = self.cfg;
        cfg.validate()?;
        let bus = Bus::new(cfg.bus_capacity_clamped());

        let sink_token = CancellationToken::new();
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        let sink = spawn_sink(bus.subscribe(), subs, sink_token.clone());

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(JsonFileStore::new(cfg.store_path.clone())));

        let directory = DestinationDirectory::new(Arc::clone(&delivery), bus.clone());
        directory.restore(store.as_ref()).await;

        let (worker, ingestor) = AggregationWorker::channel(
            cfg.notify_window,
            directory.clone(),
            delivery,
            bus.clone(),
            cfg.ingest_capacity_clamped(),
        )?;
        let worker = tokio::spawn(worker.run());

        tracing::info!(
            window = ?cfg.notify_window,
            store = ?cfg.store_path,
            registered = directory.len().await,
            "notifier started"
        );

        Ok(Notifier::from_parts(NotifierParts {
            cfg,
            bus,
            directory,
            store,
            ingestor,
            worker,
            sink,
            sink_token,
        }))
    }
}
