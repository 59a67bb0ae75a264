//! Host machine status client.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::time::Duration;

use crate::probe::types::{MachineStatus, ProbeError};
use crate::probe::MachineProbe;

/// Fetches machine metrics from an HTTP endpoint guarded by a Bearer token.
#[derive(Debug, Clone)]
pub struct HttpMachineProbe {
    client: Client,
    url: String,
}

impl HttpMachineProbe {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    async fn try_fetch(&self, token: &str) -> Result<Option<MachineStatus>, ProbeError> {
        let response = self
            .client
            .get(&self.url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), "Machine status request failed");
            return Ok(None);
        }

        let status = response
            .json::<MachineStatus>()
            .await
            .map_err(|e| ProbeError::Payload(e.to_string()))?;
        Ok(Some(status))
    }
}

#[async_trait]
impl MachineProbe for HttpMachineProbe {
    async fn fetch(&self, token: &str) -> Option<MachineStatus> {
        match self.try_fetch(token).await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!(error = %e, "Error checking machine status");
                None
            }
        }
    }
}
