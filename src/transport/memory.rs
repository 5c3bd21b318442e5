//! In-process transport doubles.
//!
//! [`MemoryDelivery`] knows a fixed set of tenants and destinations and keeps
//! every summary it was asked to send. Destinations can be made unreachable
//! or failing to exercise the error paths.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{DeliveryError, StoreError};
use crate::model::Summary;

use super::{Delivery, DirectoryStore};

#[derive(Debug, Default)]
struct DeliveryState {
    tenants: HashMap<String, String>,
    destinations: HashSet<String>,
    failing: HashSet<String>,
    sent: Vec<(String, Summary)>,
}

/// [`Delivery`] that records summaries in memory.
#[derive(Debug, Default)]
pub struct MemoryDelivery {
    state: Mutex<DeliveryState>,
}

impl MemoryDelivery {
    /// Creates an empty transport: no tenants, no destinations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `tenant` known to the session under `name`.
    pub async fn add_tenant(&self, tenant: impl Into<String>, name: impl Into<String>) {
        self.state
            .lock()
            .await
            .tenants
            .insert(tenant.into(), name.into());
    }

    /// Makes `destination` resolvable.
    pub async fn add_destination(&self, destination: impl Into<String>) {
        self.state
            .lock()
            .await
            .destinations
            .insert(destination.into());
    }

    /// Makes `destination` unresolvable (e.g. deleted channel).
    pub async fn remove_destination(&self, destination: &str) {
        self.state.lock().await.destinations.remove(destination);
    }

    /// Makes every send to `destination` fail.
    pub async fn fail_destination(&self, destination: impl Into<String>) {
        self.state.lock().await.failing.insert(destination.into());
    }

    /// Summaries sent so far, with their destination.
    pub async fn sent(&self) -> Vec<(String, Summary)> {
        self.state.lock().await.sent.clone()
    }
}

#[async_trait]
impl Delivery for MemoryDelivery {
    async fn tenant_name(&self, tenant: &str) -> Option<String> {
        self.state.lock().await.tenants.get(tenant).cloned()
    }

    async fn resolve(&self, destination: &str) -> Result<(), DeliveryError> {
        if self.state.lock().await.destinations.contains(destination) {
            Ok(())
        } else {
            Err(DeliveryError::transport(format!(
                "unknown channel {destination}"
            )))
        }
    }

    async fn send(&self, destination: &str, summary: &Summary) -> Result<(), DeliveryError> {
        let mut state = self.state.lock().await;
        if !state.destinations.contains(destination) {
            return Err(DeliveryError::transport(format!(
                "unknown channel {destination}"
            )));
        }
        if state.failing.contains(destination) {
            return Err(DeliveryError::transport(format!(
                "send to {destination} rejected"
            )));
        }
        state.sent.push((destination.to_string(), summary.clone()));
        Ok(())
    }
}

/// [`DirectoryStore`] kept in memory; starts missing until the first save.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Option<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Creates a store with no record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `map`.
    pub fn with_record(map: HashMap<String, String>) -> Self {
        Self {
            record: Mutex::new(Some(map)),
        }
    }

    /// Current record, if any.
    pub async fn record(&self) -> Option<HashMap<String, String>> {
        self.record.lock().await.clone()
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn load(&self) -> Result<HashMap<String, String>, StoreError> {
        self.record
            .lock()
            .await
            .clone()
            .ok_or_else(|| StoreError::Missing {
                path: "memory".into(),
            })
    }

    async fn save(&self, map: &HashMap<String, String>) -> Result<(), StoreError> {
        *self.record.lock().await = Some(map.clone());
        Ok(())
    }
}
