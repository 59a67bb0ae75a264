//! Discord REST client with timeout and error handling.
//!
//! # Responsibilities
//! - Authenticate with the bot token
//! - Resolve guilds and channels, create the status channel
//! - Post messages and answer interactions
//! - Register application commands

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

use crate::commands::CommandDefinition;
use crate::config::DiscordConfig;
use crate::discord::types::{
    ApplicationCommand, Channel, CurrentUser, DiscordError, DiscordResult, Guild,
    InteractionResponse, Message, GUILD_TEXT,
};

/// Thin wrapper over the Discord REST API.
#[derive(Clone)]
pub struct DiscordClient {
    http: Client,
    api_base: String,
    token: String,
}

impl std::fmt::Debug for DiscordClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl DiscordClient {
    pub fn new(config: &DiscordConfig) -> DiscordResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("DiscordBot (status-relay, ", env!("CARGO_PKG_VERSION"), ")"))
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION, format!("Bot {}", self.token))
    }

    async fn execute(&self, request: RequestBuilder) -> DiscordResult<reqwest::Response> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(DiscordError::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn execute_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> DiscordResult<T> {
        Ok(self.execute(request).await?.json().await?)
    }

    /// The bot's own user. Fails when the token is rejected.
    pub async fn current_user(&self) -> DiscordResult<CurrentUser> {
        self.execute_json(self.http.get(self.url("/users/@me"))).await
    }

    pub async fn guilds(&self) -> DiscordResult<Vec<Guild>> {
        self.execute_json(self.http.get(self.url("/users/@me/guilds")))
            .await
    }

    pub async fn guild_channels(&self, guild_id: &str) -> DiscordResult<Vec<Channel>> {
        self.execute_json(self.http.get(self.url(&format!("/guilds/{guild_id}/channels"))))
            .await
    }

    pub async fn create_text_channel(
        &self,
        guild_id: &str,
        name: &str,
        reason: &str,
    ) -> DiscordResult<Channel> {
        let request = self
            .http
            .post(self.url(&format!("/guilds/{guild_id}/channels")))
            .header("X-Audit-Log-Reason", reason)
            .json(&json!({ "name": name, "type": GUILD_TEXT }));
        self.execute_json(request).await
    }

    pub async fn create_message(&self, channel_id: &str, content: &str) -> DiscordResult<Message> {
        let request = self
            .http
            .post(self.url(&format!("/channels/{channel_id}/messages")))
            .json(&json!({ "content": content }));
        self.execute_json(request).await
    }

    pub async fn create_interaction_response(
        &self,
        interaction_id: &str,
        interaction_token: &str,
        response: &InteractionResponse,
    ) -> DiscordResult<()> {
        let request = self
            .http
            .post(self.url(&format!(
                "/interactions/{interaction_id}/{interaction_token}/callback"
            )))
            .json(response);
        self.execute(request).await?;
        Ok(())
    }

    /// Replace the deferred placeholder of an interaction with `content`.
    pub async fn edit_original_response(
        &self,
        application_id: &str,
        interaction_token: &str,
        content: &str,
    ) -> DiscordResult<()> {
        let request = self
            .http
            .patch(self.url(&format!(
                "/webhooks/{application_id}/{interaction_token}/messages/@original"
            )))
            .json(&json!({ "content": content }));
        self.execute(request).await?;
        Ok(())
    }

    /// Replace every global command of the application with `commands`.
    pub async fn overwrite_global_commands(
        &self,
        application_id: &str,
        commands: &[CommandDefinition],
    ) -> DiscordResult<Vec<ApplicationCommand>> {
        let request = self
            .http
            .put(self.url(&format!("/applications/{application_id}/commands")))
            .json(commands);
        self.execute_json(request).await
    }
}
