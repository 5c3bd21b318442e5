//! # CommandRouter - `register` / `unregister` commands.
//!
//! Commands are issued from within a tenant + destination context (a guild
//! channel). The router maps them onto the [`DestinationDirectory`] and returns
//! the short textual acknowledgment the command transport sends back.

use crate::core::directory::DestinationDirectory;
use crate::error::DirectoryError;

/// Reply to a successful `register`.
pub const REGISTERED_REPLY: &str = "okay, I will notify here for new emojis!";
/// Reply to a successful `unregister`.
pub const UNREGISTERED_REPLY: &str = "unregistered!";
/// Reply to an unknown command name.
pub const INVALID_REPLY: &str = "invalid command :(";

/// Commands understood by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Make the calling destination the tenant's notification destination.
    Register,
    /// Stop notifying the calling destination.
    Unregister,
}

impl Command {
    /// Every command, in registration order.
    pub const ALL: [Command; 2] = [Command::Register, Command::Unregister];

    /// Parses a command name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "register" => Some(Command::Register),
            "unregister" => Some(Command::Unregister),
            _ => None,
        }
    }

    /// Name registered with the command transport.
    pub fn name(self) -> &'static str {
        match self {
            Command::Register => "register",
            Command::Unregister => "unregister",
        }
    }

    /// Description registered with the command transport.
    pub fn description(self) -> &'static str {
        match self {
            Command::Register => "make this channel to a notification channel",
            Command::Unregister => "stop to notify here",
        }
    }
}

/// Routes commands to the directory. Cheap to clone.
#[derive(Clone)]
pub struct CommandRouter {
    directory: DestinationDirectory,
}

impl CommandRouter {
    /// Creates a router over `directory`.
    pub fn new(directory: DestinationDirectory) -> Self {
        Self { directory }
    }

    /// `(name, description)` of every command, for registration with the transport.
    pub fn definitions() -> Vec<(&'static str, &'static str)> {
        Command::ALL
            .iter()
            .map(|c| (c.name(), c.description()))
            .collect()
    }

    /// Executes `command` for `tenant` from `destination`.
    pub async fn execute(
        &self,
        command: Command,
        tenant: &str,
        destination: &str,
    ) -> Result<(), DirectoryError> {
        match command {
            Command::Register => self.directory.register(tenant, destination).await,
            Command::Unregister => self.directory.unregister(tenant, destination).await,
        }
    }

    /// Executes the command called `name` and renders the reply text.
    pub async fn handle(&self, name: &str, tenant: &str, destination: &str) -> String {
        let Some(command) = Command::parse(name) else {
            tracing::debug!(name, tenant, "unknown command");
            return INVALID_REPLY.to_string();
        };

        match self.execute(command, tenant, destination).await {
            Ok(()) => match command {
                Command::Register => REGISTERED_REPLY.to_string(),
                Command::Unregister => UNREGISTERED_REPLY.to_string(),
            },
            Err(e) => {
                tracing::info!(command = command.name(), tenant, destination, label = e.as_label(), "command rejected");
                format!("hmm, something went wrong: {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::events::Bus;
    use crate::transport::MemoryDelivery;

    async fn router() -> (CommandRouter, DestinationDirectory) {
        let delivery = Arc::new(MemoryDelivery::new());
        delivery.add_destination("c1").await;
        delivery.add_destination("c2").await;
        let directory = DestinationDirectory::new(delivery, Bus::new(16));
        (CommandRouter::new(directory.clone()), directory)
    }

    #[tokio::test]
    async fn test_register_then_unregister() {
        let (router, directory) = router().await;

        assert_eq!(router.handle("register", "g1", "c1").await, REGISTERED_REPLY);
        assert_eq!(directory.lookup("g1").await.as_deref(), Some("c1"));

        assert_eq!(router.handle("unregister", "g1", "c1").await, UNREGISTERED_REPLY);
        assert_eq!(directory.lookup("g1").await, None);
    }

    #[tokio::test]
    async fn test_errors_are_rendered() {
        let (router, _) = router().await;

        assert_eq!(
            router.handle("register", "g1", "c404").await,
            "hmm, something went wrong: could not find out the channel you've requested (might be wrong permissions?)"
        );
        assert_eq!(
            router.handle("unregister", "g1", "c1").await,
            "hmm, something went wrong: no channel registered"
        );

        router.handle("register", "g1", "c1").await;
        assert_eq!(
            router.handle("unregister", "g1", "c2").await,
            "hmm, something went wrong: this channel is not registered as the notification channel"
        );
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let (router, _) = router().await;
        assert_eq!(router.handle("subscribe", "g1", "c1").await, INVALID_REPLY);
    }

    #[test]
    fn test_definitions() {
        assert_eq!(
            CommandRouter::definitions(),
            vec![
                ("register", "make this channel to a notification channel"),
                ("unregister", "stop to notify here"),
            ]
        );
    }
}
