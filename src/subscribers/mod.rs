//! # Event subscribers for the notifier runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Worker / Directory ── publish(Event) ──► Bus ──► sink listener ──► SubscriberSet
//!                                                                       │
//!                                                         ┌─────────────┼─────────────┐
//!                                                         ▼             ▼             ▼
//!                                                     LogWriter      Metrics        Custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
