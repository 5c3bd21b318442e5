//! # PendingQueue - per-tenant buffer of events awaiting the next flush.
//!
//! ## Rules
//! - One mutex guards the whole map; it is never exposed
//! - `enqueue` and every drain acquire that same mutex, so a drain never
//!   observes a partially appended event
//! - Insertion order within a tenant is preserved; there is no cross-tenant order
//! - A drain atomically replaces the tenant's sequence with an empty one

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::model::NotificationEvent;

/// Tenant → ordered pending events.
#[derive(Debug, Default)]
pub struct PendingQueue {
    inner: Mutex<HashMap<String, Vec<NotificationEvent>>>,
}

impl PendingQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `event` to its tenant's sequence, creating it on first use.
    pub async fn enqueue(&self, event: NotificationEvent) {
        let mut map = self.inner.lock().await;
        map.entry(event.tenant.clone()).or_default().push(event);
    }

    /// Returns the tenant's sequence and resets it to empty.
    ///
    /// An unknown tenant yields an empty sequence.
    pub async fn drain_and_clear(&self, tenant: &str) -> Vec<NotificationEvent> {
        let mut map = self.inner.lock().await;
        map.get_mut(tenant).map(std::mem::take).unwrap_or_default()
    }

    /// Drains every non-empty tenant under a single lock acquisition.
    ///
    /// Emptied tenants are evicted from the map so idle tenants cost nothing.
    pub async fn drain_all(&self) -> Vec<(String, Vec<NotificationEvent>)> {
        let mut map = self.inner.lock().await;
        map.drain().filter(|(_, events)| !events.is_empty()).collect()
    }

    /// Tenants with a non-empty sequence at call time.
    pub async fn tenants(&self) -> Vec<String> {
        let map = self.inner.lock().await;
        let mut tenants: Vec<String> = map
            .iter()
            .filter(|(_, events)| !events.is_empty())
            .map(|(tenant, _)| tenant.clone())
            .collect();
        tenants.sort_unstable();
        tenants
    }

    /// Total number of pending events across tenants.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.values().map(Vec::len).sum()
    }

    /// True if nothing is pending.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;
    use crate::model::Asset;

    fn ev(tenant: &str, id: &str) -> NotificationEvent {
        NotificationEvent::new(tenant, Asset::new(id, id))
    }

    #[tokio::test]
    async fn test_drain_preserves_order_and_clears() {
        let queue = PendingQueue::new();
        queue.enqueue(ev("g1", "a")).await;
        queue.enqueue(ev("g1", "b")).await;
        queue.enqueue(ev("g1", "c")).await;

        let drained = queue.drain_and_clear("g1").await;
        let ids: Vec<_> = drained.iter().map(|e| e.asset.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        assert!(queue.drain_and_clear("g1").await.is_empty());
        assert!(queue.tenants().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tenant_drains_empty() {
        let queue = PendingQueue::new();
        assert!(queue.drain_and_clear("nobody").await.is_empty());
    }

    #[tokio::test]
    async fn test_tenants_are_isolated() {
        let queue = PendingQueue::new();
        queue.enqueue(ev("A", "x")).await;
        queue.enqueue(ev("B", "y")).await;

        assert_eq!(queue.tenants().await, vec!["A".to_string(), "B".to_string()]);

        let b = queue.drain_and_clear("B").await;
        assert_eq!(b.len(), 1);
        assert!(b.iter().all(|e| e.tenant == "B"));

        assert_eq!(queue.tenants().await, vec!["A".to_string()]);
        assert_eq!(queue.len().await, 1);
    }

    #[tokio::test]
    async fn test_drain_all_skips_empty_tenants() {
        let queue = PendingQueue::new();
        queue.enqueue(ev("A", "x")).await;
        queue.enqueue(ev("B", "y")).await;
        let _ = queue.drain_and_clear("B").await;

        let drained = queue.drain_all().await;
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].0, "A");
        assert!(queue.is_empty().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_enqueue_and_drain_loses_nothing() {
        const PRODUCERS: usize = 4;
        const PER_PRODUCER: usize = 250;

        let queue = Arc::new(PendingQueue::new());

        let mut producers = Vec::new();
        for p in 0..PRODUCERS {
            let queue = Arc::clone(&queue);
            producers.push(tokio::spawn(async move {
                for i in 0..PER_PRODUCER {
                    queue.enqueue(ev("g1", &format!("{p}-{i}"))).await;
                    tokio::task::yield_now().await;
                }
            }));
        }

        let drainer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move {
                let mut seen = Vec::new();
                for _ in 0..200 {
                    seen.extend(queue.drain_and_clear("g1").await);
                    tokio::task::yield_now().await;
                }
                seen
            })
        };

        for p in producers {
            p.await.unwrap();
        }
        let mut seen = drainer.await.unwrap();
        seen.extend(queue.drain_and_clear("g1").await);

        let ids: HashSet<_> = seen.iter().map(|e| e.asset.id.clone()).collect();
        assert_eq!(seen.len(), PRODUCERS * PER_PRODUCER, "duplicated or lost events");
        assert_eq!(ids.len(), PRODUCERS * PER_PRODUCER);
    }
}
