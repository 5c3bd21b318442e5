//! Error types used by the notifier runtime.
//!
//! Each enum covers one failure domain:
//!
//! - [`ConfigError`]: invalid process configuration (fatal at startup).
//! - [`DirectoryError`]: register/unregister failures surfaced to the command caller.
//! - [`DeliveryError`]: per-tenant delivery failures; the tenant's batch is dropped.
//! - [`StoreError`]: durable store failures; logged, never fatal.
//! - [`IngestError`]: the hand-off channel to the worker is full or closed.
//! - [`NotifierError`]: failures of the runtime itself during shutdown.
//!
//! Every type provides `as_label` (a short stable snake_case label for logs).

use std::path::PathBuf;

use thiserror::Error;

/// # Errors produced while building a [`Config`](crate::Config).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The service credential is missing or empty.
    #[error("BOT_TOKEN is required")]
    MissingToken,

    /// The aggregation window could not be parsed or is zero.
    #[error("invalid notify window {value:?}: expected a positive number of seconds")]
    InvalidWindow {
        /// Raw value as read from the environment.
        value: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use emoji_notifier::ConfigError;
    ///
    /// assert_eq!(ConfigError::MissingToken.as_label(), "config_missing_token");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::MissingToken => "config_missing_token",
            ConfigError::InvalidWindow { .. } => "config_invalid_window",
        }
    }
}

/// # Errors produced by [`DestinationDirectory`](crate::DestinationDirectory) mutations.
///
/// These are never fatal: the command transport renders them as a reply.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The destination could not be resolved by the delivery transport.
    #[error("could not find out the channel you've requested (might be wrong permissions?)")]
    DestinationUnreachable {
        /// Destination the caller asked for.
        destination: String,
    },

    /// The tenant has no registered destination.
    #[error("no channel registered")]
    NotRegistered {
        /// Tenant that issued the command.
        tenant: String,
    },

    /// The tenant is registered to a different destination.
    #[error("this channel is not registered as the notification channel")]
    DestinationMismatch {
        /// Destination the caller supplied.
        requested: String,
        /// Destination currently registered.
        registered: String,
    },
}

impl DirectoryError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            DirectoryError::DestinationUnreachable { .. } => "directory_destination_unreachable",
            DirectoryError::NotRegistered { .. } => "directory_not_registered",
            DirectoryError::DestinationMismatch { .. } => "directory_destination_mismatch",
        }
    }
}

/// # Errors produced while delivering a tenant's summary.
///
/// A delivery error is terminal for the tick: the batch is discarded and never retried.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The tenant is not known to the current transport session.
    #[error("the guild (id:{tenant}) is not included in bot session")]
    UnknownTenant {
        /// Tenant whose batch was dropped.
        tenant: String,
    },

    /// The tenant has not registered a destination.
    #[error("the guild (id:{tenant}) has no registered notify channel")]
    NoDestination {
        /// Tenant whose batch was dropped.
        tenant: String,
    },

    /// The delivery transport rejected the call.
    #[error("transport failed: {error}")]
    Transport {
        /// The underlying error message.
        error: String,
    },
}

impl DeliveryError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use emoji_notifier::DeliveryError;
    ///
    /// let err = DeliveryError::NoDestination { tenant: "g1".into() };
    /// assert_eq!(err.as_label(), "delivery_no_destination");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DeliveryError::UnknownTenant { .. } => "delivery_unknown_tenant",
            DeliveryError::NoDestination { .. } => "delivery_no_destination",
            DeliveryError::Transport { .. } => "delivery_transport",
        }
    }

    /// Shorthand for [`DeliveryError::Transport`].
    pub fn transport(error: impl std::fmt::Display) -> Self {
        DeliveryError::Transport {
            error: error.to_string(),
        }
    }
}

/// # Errors produced by a [`DirectoryStore`](crate::DirectoryStore).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StoreError {
    /// No durable record exists yet.
    #[error("no durable record at {path:?}")]
    Missing {
        /// Location that was probed.
        path: PathBuf,
    },

    /// The record exists but could not be decoded.
    #[error("malformed durable record at {path:?}: {source}")]
    Malformed {
        /// Location of the record.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing the record failed.
    #[error("durable store i/o failed at {path:?}: {source}")]
    Io {
        /// Location of the record.
        path: PathBuf,
        /// Underlying i/o error.
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            StoreError::Missing { .. } => "store_missing",
            StoreError::Malformed { .. } => "store_malformed",
            StoreError::Io { .. } => "store_io",
        }
    }
}

/// # Errors returned by [`EventIngestor`](crate::EventIngestor).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestError {
    /// Hand-off queue is full (try again later or use the async variant).
    #[error("hand-off queue full")]
    Full,

    /// The aggregation worker has stopped.
    #[error("aggregation worker stopped")]
    Closed,
}

impl IngestError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            IngestError::Full => "ingest_full",
            IngestError::Closed => "ingest_closed",
        }
    }
}

/// # Errors produced by the [`Notifier`](crate::Notifier) runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum NotifierError {
    /// Registering OS signal listeners failed.
    #[error("failed to listen for shutdown signals: {0}")]
    Signal(#[source] std::io::Error),

    /// The aggregation worker panicked before shutdown.
    #[error("aggregation worker panicked")]
    WorkerPanicked,
}

impl NotifierError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            NotifierError::Signal(_) => "notifier_signal",
            NotifierError::WorkerPanicked => "notifier_worker_panicked",
        }
    }
}
