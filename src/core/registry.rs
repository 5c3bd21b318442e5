//! # AssetRegistry - per-tenant set of already-notified assets.
//!
//! Membership means "a summary for this asset was delivered, or the asset
//! already existed when the initial sync ran". The registry is append-only for
//! the lifetime of the process.
//!
//! ## Architecture
//! ```text
//! Notifier::backfill ──┐
//!                      ├──► hand-off channel ──► AggregationWorker ──► AssetRegistry
//! successful flush  ───┘                          (single owner)      tenant → {id → Asset}
//! ```
//!
//! ## Rules
//! - Owned by the aggregation worker; no lock is needed because every writer
//!   funnels through the worker's hand-off channel
//! - `record` overwrites the stored state but never removes an id
//! - The first record of an id publishes `AssetRecorded` on the bus

use std::collections::HashMap;

use crate::events::{Bus, Event, EventKind};
use crate::model::Asset;

/// Tenant → (asset id → Asset).
#[derive(Debug)]
pub struct AssetRegistry {
    tenants: HashMap<String, HashMap<String, Asset>>,
    bus: Bus,
}

impl AssetRegistry {
    /// Creates an empty registry publishing to `bus`.
    pub fn new(bus: Bus) -> Self {
        Self {
            tenants: HashMap::new(),
            bus,
        }
    }

    /// True if `asset_id` is known for `tenant`.
    pub fn contains(&self, tenant: &str, asset_id: &str) -> bool {
        self.tenants
            .get(tenant)
            .is_some_and(|assets| assets.contains_key(asset_id))
    }

    /// Inserts or overwrites `asset` for `tenant`.
    pub fn record(&mut self, tenant: &str, asset: Asset) {
        let assets = self.tenants.entry(tenant.to_string()).or_default();
        let id = asset.id.clone();
        if assets.insert(id.clone(), asset).is_none() {
            self.bus.publish(
                Event::new(EventKind::AssetRecorded)
                    .with_tenant(tenant)
                    .with_asset(id),
            );
        }
    }

    /// Records every asset of a full listing without notifying.
    pub fn backfill(&mut self, tenant: &str, assets: impl IntoIterator<Item = Asset>) {
        for asset in assets {
            self.record(tenant, asset);
        }
    }

    /// Number of known assets for `tenant`.
    pub fn len(&self, tenant: &str) -> usize {
        self.tenants.get(tenant).map_or(0, HashMap::len)
    }

    /// True if no tenant has any known asset.
    pub fn is_empty(&self) -> bool {
        self.tenants.values().all(HashMap::is_empty)
    }

    /// Stored state of `asset_id`, if known.
    pub fn get(&self, tenant: &str, asset_id: &str) -> Option<&Asset> {
        self.tenants.get(tenant)?.get(asset_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_publishes_once_per_id() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let mut registry = AssetRegistry::new(bus);

        registry.record("g1", Asset::new("a", "foo"));
        registry.record("g1", Asset::new("a", "foo2"));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::AssetRecorded);
        assert_eq!(ev.asset.as_deref(), Some("a"));
        assert!(rx.try_recv().is_err());

        assert_eq!(registry.len("g1"), 1);
        assert_eq!(registry.get("g1", "a").map(|a| a.name.as_str()), Some("foo2"));
    }

    #[test]
    fn test_tenants_are_isolated() {
        let mut registry = AssetRegistry::new(Bus::new(1));
        registry.backfill("g1", vec![Asset::new("a", "foo"), Asset::new("b", "bar")]);

        assert!(registry.contains("g1", "a"));
        assert!(registry.contains("g1", "b"));
        assert!(!registry.contains("g2", "a"));
        assert_eq!(registry.len("g2"), 0);
        assert!(!registry.is_empty());
    }
}
