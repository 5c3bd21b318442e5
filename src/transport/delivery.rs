use async_trait::async_trait;

use crate::error::DeliveryError;
use crate::model::Summary;

/// Outbound message-delivery transport.
///
/// Implementations wrap the platform client. All calls are best effort; the
/// aggregation worker treats any error as terminal for the current tick.
#[async_trait]
pub trait Delivery: Send + Sync + 'static {
    /// Display name of a tenant known to the current session, if any.
    async fn tenant_name(&self, tenant: &str) -> Option<String>;

    /// Checks that `destination` is currently addressable.
    async fn resolve(&self, destination: &str) -> Result<(), DeliveryError>;

    /// Sends `summary` to `destination`.
    async fn send(&self, destination: &str, summary: &Summary) -> Result<(), DeliveryError>;
}
