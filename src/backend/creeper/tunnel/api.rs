//! Client for the ngrok agent's local web API.

use crate::utils::{Error, Result};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct StartTunnel<'a> {
    name: &'a str,
    addr: String,
    proto: &'a str,
}

#[derive(Debug, Deserialize)]
struct TunnelInfo {
    public_url: String,
}

/// Error body returned by the agent, e.g. when the authtoken is rejected.
#[derive(Debug, Deserialize)]
struct ApiError {
    msg: Option<String>,
    details: Option<ApiErrorDetails>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetails {
    err: Option<String>,
}

impl ApiError {
    fn describe(self) -> Option<String> {
        let err = self.details.and_then(|d| d.err);
        match (self.msg, err) {
            (Some(msg), Some(err)) => Some(format!("{msg}: {err}")),
            (msg, err) => msg.or(err),
        }
    }
}

pub struct AgentApi {
    client: Client,
    base_url: String,
}

impl AgentApi {
    /// `addr` is the `host:port` the agent's web service listens on.
    pub fn new(addr: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Tunnel(format!("could not build agent API client: {e}")))?;
        Ok(Self {
            client,
            base_url: format!("http://{addr}"),
        })
    }

    /// Asks the agent for a TCP tunnel to `local_port` and returns its public URL.
    pub async fn start_tcp_tunnel(&self, name: &str, local_port: u16) -> Result<String> {
        let url = format!("{}/api/tunnels", self.base_url);
        let body = StartTunnel {
            name,
            addr: local_port.to_string(),
            proto: "tcp",
        };
        debug!("POST {url} {body:?}");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Tunnel(format!("ngrok agent API unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ApiError>(&text)
                .ok()
                .and_then(ApiError::describe)
                .unwrap_or(text);
            return Err(Error::Tunnel(format!(
                "ngrok refused the tunnel (HTTP {status}): {reason}"
            )));
        }

        let info: TunnelInfo = response
            .json()
            .await
            .map_err(|e| Error::Tunnel(format!("unexpected ngrok agent response: {e}")))?;
        Ok(info.public_url)
    }
}
