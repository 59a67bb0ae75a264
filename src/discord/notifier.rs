//! Status message delivery into the guild's status channel.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::discord::client::DiscordClient;
use crate::discord::types::{DiscordError, DiscordResult};
use crate::observability::metrics;

const CHANNEL_REASON: &str = "Used for Minecraft server status updates";

/// Best-effort delivery of a status message.
///
/// Implementations log failures and never report them to the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, text: &str);
}

/// Posts into a named text channel, creating it when missing.
pub struct DiscordNotifier {
    client: DiscordClient,
    guild_id: Option<String>,
    channel_name: String,
    /// Resolved channel id. The lock also serializes deliveries so two
    /// concurrent senders never both create the channel.
    channel: Mutex<Option<String>>,
}

impl DiscordNotifier {
    pub fn new(client: DiscordClient, guild_id: Option<String>, channel_name: impl Into<String>) -> Self {
        Self {
            client,
            guild_id,
            channel_name: channel_name.into(),
            channel: Mutex::new(None),
        }
    }

    /// Deliver `text`, reporting failures.
    pub async fn send(&self, text: &str) -> DiscordResult<()> {
        let mut cached = self.channel.lock().await;

        let channel_id = match cached.as_ref() {
            Some(id) => id.clone(),
            None => {
                let id = self.resolve_channel().await?;
                *cached = Some(id.clone());
                id
            }
        };

        if let Err(e) = self.client.create_message(&channel_id, text).await {
            // The channel may have been deleted; look it up again next time.
            *cached = None;
            return Err(e);
        }
        Ok(())
    }

    async fn resolve_guild(&self) -> DiscordResult<String> {
        if let Some(id) = &self.guild_id {
            return Ok(id.clone());
        }
        self.client
            .guilds()
            .await?
            .into_iter()
            .next()
            .map(|guild| guild.id)
            .ok_or(DiscordError::NoGuild)
    }

    async fn resolve_channel(&self) -> DiscordResult<String> {
        let guild_id = self.resolve_guild().await?;
        let channels = self.client.guild_channels(&guild_id).await?;

        if let Some(channel) = channels.iter().find(|c| c.is_text_named(&self.channel_name)) {
            return Ok(channel.id.clone());
        }

        tracing::info!(guild_id = %guild_id, channel = %self.channel_name, "Creating status channel");
        let channel = self
            .client
            .create_text_channel(&guild_id, &self.channel_name, CHANNEL_REASON)
            .await?;
        Ok(channel.id)
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn deliver(&self, text: &str) {
        if let Err(e) = self.send(text).await {
            tracing::error!(error = %e, channel = %self.channel_name, "Error sending status message");
            metrics::record_delivery_failure();
        }
    }
}
