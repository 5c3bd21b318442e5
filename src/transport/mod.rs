//! External collaborators, expressed as traits at their interface boundary.
//!
//! - [`Delivery`]: resolves tenants and destinations and sends summaries.
//! - [`DirectoryStore`]: durable home of the tenant→destination mapping.
//!
//! Shipped implementations:
//! - [`JsonFileStore`]: flat JSON object on disk.
//! - [`MemoryDelivery`], [`MemoryStore`]: in-process doubles for tests and demos.

mod delivery;
mod memory;
mod store;

pub use delivery::Delivery;
pub use memory::{MemoryDelivery, MemoryStore};
pub use store::{DirectoryStore, JsonFileStore};
