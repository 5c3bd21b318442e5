//! # DestinationDirectory - tenant → destination mapping.
//!
//! Mutated by the `register`/`unregister` commands and read by the
//! aggregation worker at flush time.
//!
//! ## Architecture
//! ```text
//! CommandRouter ──► register / unregister ──┐
//!                                           ├──► RwLock<HashMap<tenant, destination>>
//! AggregationWorker ──► lookup ─────────────┘
//!
//! startup:  DirectoryStore::load ──► restore (missing/malformed → empty + warning)
//! shutdown: persist ──► DirectoryStore::save (failure → warning)
//! ```
//!
//! ## Rules
//! - One reader/writer lock, owned by the type and never exposed
//! - `register` validates the destination with the delivery transport before
//!   taking the write lock, so a slow transport never blocks lookups
//! - `unregister` only succeeds with the currently registered destination

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{DirectoryError, StoreError};
use crate::events::{Bus, Event, EventKind};
use crate::transport::{Delivery, DirectoryStore};

/// Shared tenant → destination mapping. Cheap to clone.
#[derive(Clone)]
pub struct DestinationDirectory {
    map: Arc<RwLock<HashMap<String, String>>>,
    delivery: Arc<dyn Delivery>,
    bus: Bus,
}

impl DestinationDirectory {
    /// Creates an empty directory validating destinations through `delivery`.
    pub fn new(delivery: Arc<dyn Delivery>, bus: Bus) -> Self {
        Self {
            map: Arc::new(RwLock::new(HashMap::new())),
            delivery,
            bus,
        }
    }

    /// Registers `destination` for `tenant`, replacing any previous one.
    pub async fn register(&self, tenant: &str, destination: &str) -> Result<(), DirectoryError> {
        if let Err(e) = self.delivery.resolve(destination).await {
            tracing::debug!(tenant, destination, error = %e, "destination not resolvable");
            return Err(DirectoryError::DestinationUnreachable {
                destination: destination.to_string(),
            });
        }

        self.map
            .write()
            .await
            .insert(tenant.to_string(), destination.to_string());

        self.bus.publish(
            Event::new(EventKind::DestinationRegistered)
                .with_tenant(tenant)
                .with_destination(destination),
        );
        Ok(())
    }

    /// Removes the tenant's mapping if `destination` is the registered one.
    pub async fn unregister(&self, tenant: &str, destination: &str) -> Result<(), DirectoryError> {
        let mut map = self.map.write().await;
        match map.get(tenant) {
            None => {
                return Err(DirectoryError::NotRegistered {
                    tenant: tenant.to_string(),
                });
            }
            Some(registered) if registered != destination => {
                return Err(DirectoryError::DestinationMismatch {
                    requested: destination.to_string(),
                    registered: registered.clone(),
                });
            }
            Some(_) => {}
        }
        map.remove(tenant);
        drop(map);

        self.bus.publish(
            Event::new(EventKind::DestinationUnregistered)
                .with_tenant(tenant)
                .with_destination(destination),
        );
        Ok(())
    }

    /// Destination registered for `tenant`.
    pub async fn lookup(&self, tenant: &str) -> Option<String> {
        self.map.read().await.get(tenant).cloned()
    }

    /// Copy of the whole mapping.
    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.map.read().await.clone()
    }

    /// Number of registered tenants.
    pub async fn len(&self) -> usize {
        self.map.read().await.len()
    }

    /// True if no tenant is registered.
    pub async fn is_empty(&self) -> bool {
        self.map.read().await.is_empty()
    }

    /// Replaces the mapping with the durable record.
    ///
    /// Never fails: a missing or unreadable record leaves the directory empty
    /// and is reported as a warning. Returns the number of restored entries.
    pub async fn restore(&self, store: &dyn DirectoryStore) -> usize {
        let loaded = match store.load().await {
            Ok(map) => map,
            Err(e) => {
                self.report_restore_failure(&e);
                HashMap::new()
            }
        };

        let n = loaded.len();
        *self.map.write().await = loaded;
        if n > 0 {
            self.bus
                .publish(Event::new(EventKind::DirectoryRestored).with_count(n));
        }
        n
    }

    /// Writes the mapping to the durable record.
    ///
    /// Failures are reported on the bus and returned; callers at shutdown
    /// are expected to log and continue.
    pub async fn persist(&self, store: &dyn DirectoryStore) -> Result<usize, StoreError> {
        let snapshot = self.snapshot().await;
        match store.save(&snapshot).await {
            Ok(()) => {
                self.bus.publish(
                    Event::new(EventKind::DirectoryPersisted).with_count(snapshot.len()),
                );
                Ok(snapshot.len())
            }
            Err(e) => {
                tracing::warn!(error = %e, label = e.as_label(), "failed to persist directory");
                self.bus.publish(
                    Event::new(EventKind::DirectoryPersistFailed).with_reason(e.to_string()),
                );
                Err(e)
            }
        }
    }

    fn report_restore_failure(&self, e: &StoreError) {
        tracing::warn!(error = %e, label = e.as_label(), "failed to restore directory; starting empty");
        self.bus
            .publish(Event::new(EventKind::DirectoryRestoreFailed).with_reason(e.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MemoryDelivery, MemoryStore};

    async fn directory() -> (DestinationDirectory, Arc<MemoryDelivery>) {
        let delivery = Arc::new(MemoryDelivery::new());
        delivery.add_destination("c1").await;
        delivery.add_destination("c2").await;
        (DestinationDirectory::new(delivery.clone(), Bus::new(16)), delivery)
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let (dir, _) = directory().await;
        dir.register("g1", "c1").await.unwrap();
        assert_eq!(dir.lookup("g1").await.as_deref(), Some("c1"));

        dir.register("g1", "c2").await.unwrap();
        assert_eq!(dir.lookup("g1").await.as_deref(), Some("c2"));
        assert_eq!(dir.len().await, 1);
    }

    #[tokio::test]
    async fn test_register_unreachable_leaves_mapping_untouched() {
        let (dir, _) = directory().await;
        let err = dir.register("G1", "C9").await.unwrap_err();
        assert_eq!(
            err,
            DirectoryError::DestinationUnreachable {
                destination: "C9".into()
            }
        );
        assert_eq!(dir.lookup("G1").await, None);
    }

    #[tokio::test]
    async fn test_unregister_mismatch_leaves_mapping_untouched() {
        let (dir, _) = directory().await;
        dir.register("g1", "c2").await.unwrap();

        let err = dir.unregister("g1", "c1").await.unwrap_err();
        assert_eq!(err.as_label(), "directory_destination_mismatch");
        assert_eq!(dir.lookup("g1").await.as_deref(), Some("c2"));
    }

    #[tokio::test]
    async fn test_unregister_not_registered() {
        let (dir, _) = directory().await;
        let err = dir.unregister("g1", "c1").await.unwrap_err();
        assert_eq!(err, DirectoryError::NotRegistered { tenant: "g1".into() });
    }

    #[tokio::test]
    async fn test_unregister_matching_destination() {
        let (dir, _) = directory().await;
        dir.register("g1", "c1").await.unwrap();
        dir.unregister("g1", "c1").await.unwrap();
        assert!(dir.is_empty().await);
    }

    #[tokio::test]
    async fn test_restore_missing_record_is_empty() {
        let (dir, _) = directory().await;
        let store = MemoryStore::new();
        assert_eq!(dir.restore(&store).await, 0);
        assert!(dir.is_empty().await);
    }

    #[tokio::test]
    async fn test_restore_malformed_record_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("channels.json");
        std::fs::write(&path, b"{not json").unwrap();

        let (dir, _) = directory().await;
        let bus_rx = {
            let mut rx = dir.bus.subscribe();
            assert_eq!(dir.restore(&crate::transport::JsonFileStore::new(path)).await, 0);
            rx.recv().await.unwrap()
        };
        assert_eq!(bus_rx.kind, EventKind::DirectoryRestoreFailed);
        assert!(dir.is_empty().await);
    }

    #[tokio::test]
    async fn test_persist_then_restore() {
        let (dir, delivery) = directory().await;
        dir.register("g1", "c1").await.unwrap();
        dir.register("g2", "c2").await.unwrap();

        let store = MemoryStore::new();
        assert_eq!(dir.persist(&store).await.unwrap(), 2);

        let fresh = DestinationDirectory::new(delivery, Bus::new(16));
        assert_eq!(fresh.restore(&store).await, 2);
        assert_eq!(fresh.snapshot().await, dir.snapshot().await);
    }
}
