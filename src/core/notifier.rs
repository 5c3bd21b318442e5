//! # Notifier: owns the components, the observability sink and graceful shutdown.
//!
//! ## High-level architecture
//! ```text
//! NotifierBuilder::build(delivery)
//!   ├─► Bus + SubscriberSet ──► sink listener (fan-out, fire-and-forget)
//!   ├─► DestinationDirectory::restore(store)
//!   └─► tokio::spawn(AggregationWorker::run)
//!
//! Producers (while running):
//!   subscription transport ──► EventIngestor::observe ──► worker
//!   command transport      ──► CommandRouter::handle  ──► directory
//!
//! Shutdown path:
//!   signal / shutdown_token / run_until future
//!     └─► Bus.publish(ShutdownRequested)
//!     └─► Shutdown message → worker finishes its current tick and exits
//!     └─► DestinationDirectory::persist(store)   (failure logged, not fatal)
//!     └─► sink drained → SubscriberSet::shutdown
//! ```
//!
//! Pending events are not flushed on shutdown; they are dropped.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    error::{IngestError, NotifierError},
    events::{Bus, Event, EventKind},
    model::Asset,
    subscribers::SubscriberSet,
    transport::DirectoryStore,
};

use super::{
    builder::NotifierBuilder, commands::CommandRouter, directory::DestinationDirectory,
    ingest::EventIngestor, registry::AssetRegistry, shutdown,
};

/// What the notifier left behind after shutdown.
#[derive(Debug)]
pub struct ShutdownReport {
    /// Final state of the asset registry.
    pub registry: AssetRegistry,
    /// Number of persisted directory entries (`None` if persisting failed).
    pub persisted: Option<usize>,
}

pub(super) struct NotifierParts {
    pub cfg: Config,
    pub bus: Bus,
    pub directory: DestinationDirectory,
    pub store: Arc<dyn DirectoryStore>,
    pub ingestor: EventIngestor,
    pub worker: JoinHandle<AssetRegistry>,
    pub sink: JoinHandle<()>,
    pub sink_token: CancellationToken,
}

/// Runtime owner of the aggregation engine.
pub struct Notifier {
    cfg: Config,
    bus: Bus,
    directory: DestinationDirectory,
    store: Arc<dyn DirectoryStore>,
    ingestor: EventIngestor,
    worker: JoinHandle<AssetRegistry>,
    sink: JoinHandle<()>,
    sink_token: CancellationToken,
    shutdown: CancellationToken,
}

impl Notifier {
    /// Creates a builder.
    pub fn builder(cfg: Config) -> NotifierBuilder {
        NotifierBuilder::new(cfg)
    }

    pub(super) fn from_parts(parts: NotifierParts) -> Self {
        Self {
            cfg: parts.cfg,
            bus: parts.bus,
            directory: parts.directory,
            store: parts.store,
            ingestor: parts.ingestor,
            worker: parts.worker,
            sink: parts.sink,
            sink_token: parts.sink_token,
            shutdown: CancellationToken::new(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Observability bus (subscribe for raw events).
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Handle for the subscription transport.
    pub fn ingestor(&self) -> EventIngestor {
        self.ingestor.clone()
    }

    /// Handle for the command transport.
    pub fn commands(&self) -> CommandRouter {
        CommandRouter::new(self.directory.clone())
    }

    /// Shared destination directory.
    pub fn directory(&self) -> &DestinationDirectory {
        &self.directory
    }

    /// Initial sync: marks a tenant's current listing as already known.
    pub async fn backfill(
        &self,
        tenant: impl Into<String>,
        assets: Vec<Asset>,
    ) -> Result<(), IngestError> {
        self.ingestor.backfill(tenant, assets).await
    }

    /// Token that stops [`run`](Self::run) / [`run_until`](Self::run_until) when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Runs until a termination signal or the shutdown token, then shuts down gracefully.
    ///
    /// If signal listeners cannot be installed the notifier shuts down
    /// immediately and returns [`NotifierError::Signal`].
    pub async fn run(self) -> Result<ShutdownReport, NotifierError> {
        let token = self.shutdown.clone();
        let signal = shutdown::shutdown_requested(&token).await;
        if let Err(e) = &signal {
            tracing::error!(error = %e, "cannot listen for shutdown signals");
        }
        let report = self.shutdown_gracefully().await?;
        signal.map_err(NotifierError::Signal)?;
        Ok(report)
    }

    /// Runs until `signal` completes or the shutdown token is cancelled.
    pub async fn run_until<F>(self, signal: F) -> Result<ShutdownReport, NotifierError>
    where
        F: Future<Output = ()>,
    {
        let token = self.shutdown.clone();
        tokio::select! {
            _ = signal => {},
            _ = token.cancelled() => {},
        }
        self.shutdown_gracefully().await
    }

    async fn shutdown_gracefully(self) -> Result<ShutdownReport, NotifierError> {
        self.bus.publish(Event::new(EventKind::ShutdownRequested));

        if self.ingestor.shutdown().await.is_err() {
            tracing::debug!("aggregation worker already stopped");
        }
        drop(self.ingestor);
        let worker = self.worker.await;

        let persisted = self.directory.persist(self.store.as_ref()).await.ok();

        self.sink_token.cancel();
        if let Err(e) = self.sink.await {
            tracing::error!(error = %e, "observability sink panicked");
        }

        let registry = worker.map_err(|e| {
            tracing::error!(error = %e, "aggregation worker panicked");
            NotifierError::WorkerPanicked
        })?;
        Ok(ShutdownReport {
            registry,
            persisted,
        })
    }
}

/// Forwards bus events to the subscriber set until `token` is cancelled,
/// then drains what is left and shuts the set down.
pub(super) fn spawn_sink(
    mut rx: broadcast::Receiver<Event>,
    set: SubscriberSet,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "observability sink lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = token.cancelled() => break,
            }
        }

        loop {
            match rx.try_recv() {
                Ok(ev) => set.emit(&ev),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        set.shutdown().await;
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;
    use crate::error::ConfigError;
    use crate::subscribers::Subscribe;
    use crate::transport::{MemoryDelivery, MemoryStore};

    #[derive(Default)]
    struct Recorder {
        kinds: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.kinds.lock().await.push(event.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    async fn delivery() -> Arc<MemoryDelivery> {
        let delivery = Arc::new(MemoryDelivery::new());
        delivery.add_tenant("g1", "Guild One").await;
        delivery.add_destination("c1").await;
        delivery
    }

    #[tokio::test]
    async fn test_end_to_end_lifecycle() {
        let delivery = delivery().await;
        let store = Arc::new(MemoryStore::new());
        let recorder = Arc::new(Recorder::default());

        let notifier = Notifier::builder(Config::with_token("t"))
            .with_store(store.clone())
            .with_subscribers(vec![recorder.clone()])
            .build(delivery.clone())
            .await
            .unwrap();

        notifier
            .backfill("g1", vec![Asset::new("old", "legacy")])
            .await
            .unwrap();
        assert_eq!(
            notifier.commands().handle("register", "g1", "c1").await,
            "okay, I will notify here for new emojis!"
        );

        let ingestor = notifier.ingestor();
        ingestor
            .observe("g1", vec![Asset::new("old", "legacy"), Asset::new("new", "shiny")])
            .await
            .unwrap();
        let report = ingestor.flush().await.unwrap();
        assert_eq!(report.delivered_assets(), 1);

        let token = notifier.shutdown_token();
        token.cancel();
        let shutdown = notifier.run_until(std::future::pending()).await.unwrap();

        assert!(shutdown.registry.contains("g1", "new"));
        assert_eq!(shutdown.persisted, Some(1));
        let mut expected = HashMap::new();
        expected.insert("g1".to_string(), "c1".to_string());
        assert_eq!(store.record().await, Some(expected));

        let sent = delivery.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.lines, vec!["<:shiny:new> (`:shiny:`)".to_string()]);

        let kinds = recorder.kinds.lock().await.clone();
        assert!(kinds.contains(&EventKind::DestinationRegistered));
        assert!(kinds.contains(&EventKind::SummaryDelivered));
        assert!(kinds.contains(&EventKind::ShutdownRequested));
        assert!(kinds.contains(&EventKind::WorkerStopped));
        assert!(kinds.contains(&EventKind::DirectoryPersisted));

        assert_eq!(ingestor.flush().await.unwrap_err(), IngestError::Closed);
    }

    #[tokio::test]
    async fn test_restores_directory_on_build() {
        let mut record = HashMap::new();
        record.insert("g1".to_string(), "c1".to_string());
        let store = Arc::new(MemoryStore::with_record(record));

        let notifier = Notifier::builder(Config::with_token("t"))
            .with_store(store)
            .build(delivery().await)
            .await
            .unwrap();

        assert_eq!(notifier.directory().lookup("g1").await.as_deref(), Some("c1"));
        notifier.run_until(async {}).await.unwrap();
    }

    #[tokio::test]
    async fn test_persist_failure_is_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(crate::transport::JsonFileStore::new(
            tmp.path().join("missing-dir").join("channels.json"),
        ));

        let notifier = Notifier::builder(Config::with_token("t"))
            .with_store(store)
            .build(delivery().await)
            .await
            .unwrap();
        notifier.commands().handle("register", "g1", "c1").await;

        let report = notifier.run_until(async {}).await.unwrap();
        assert_eq!(report.persisted, None);
    }

    #[tokio::test]
    async fn test_build_rejects_invalid_config() {
        let err = Notifier::builder(Config::default())
            .with_store(Arc::new(MemoryStore::new()))
            .build(delivery().await)
            .await
            .err()
            .unwrap();
        assert_eq!(err, ConfigError::MissingToken);

        let mut cfg = Config::with_token("t");
        cfg.notify_window = Duration::ZERO;
        let err = Notifier::builder(cfg)
            .with_store(Arc::new(MemoryStore::new()))
            .build(delivery().await)
            .await
            .err()
            .unwrap();
        assert_eq!(err.as_label(), "config_invalid_window");
    }

    #[tokio::test]
    async fn test_shutdown_survives_failed_sink() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Notifier::builder(Config::with_token("t"))
            .with_store(store.clone())
            .build(delivery().await)
            .await
            .unwrap();
        notifier.commands().handle("register", "g1", "c1").await;
        notifier.sink.abort();

        let report = notifier.run_until(async {}).await.unwrap();
        assert_eq!(report.persisted, Some(1));
        assert!(store.record().await.is_some());
    }
}
