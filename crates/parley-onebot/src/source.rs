// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OneBot event socket.
//!
//! Reads text frames from the OneBot websocket. A broken connection is
//! reported as a read error and re-established on the following read.

use async_trait::async_trait;
use futures::StreamExt;
use parley_config::model::WebSocketConfig;
use parley_core::{AdapterType, EventSource, HealthStatus, PluginAdapter, RelayError};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};
use url::Url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Builds the socket URL, passing the token as the `access_token` query parameter.
///
/// The token is percent-encoded and appended to any query already present.
pub fn socket_url(ws_url: &str, token: &str) -> Result<String, RelayError> {
    let mut url = Url::parse(ws_url)
        .map_err(|e| RelayError::Config(format!("invalid websocket.wsURL `{ws_url}`: {e}")))?;
    url.query_pairs_mut().append_pair("access_token", token);
    Ok(url.into())
}

/// [`EventSource`] over the OneBot websocket.
pub struct OneBotSource {
    /// Full URL including the token. Never logged.
    url: String,
    /// URL without the token, for logs.
    display_url: String,
    stream: Option<WsStream>,
}

impl OneBotSource {
    pub fn new(config: &WebSocketConfig) -> Result<Self, RelayError> {
        Ok(Self {
            url: socket_url(&config.ws_url, &config.ws_token)?,
            display_url: config.ws_url.clone(),
            stream: None,
        })
    }

    async fn open(&self) -> Result<WsStream, RelayError> {
        let (stream, response) = connect_async(self.url.as_str()).await.map_err(|e| {
            RelayError::Source {
                message: format!("failed to connect to {}: {e}", self.display_url),
                source: Some(Box::new(e)),
            }
        })?;
        debug!(status = %response.status(), "websocket handshake completed");
        Ok(stream)
    }
}

#[async_trait]
impl PluginAdapter for OneBotSource {
    fn name(&self) -> &str {
        "onebot-ws"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Source
    }

    async fn health_check(&self) -> Result<HealthStatus, RelayError> {
        if self.stream.is_some() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded("websocket disconnected".into()))
        }
    }

    async fn shutdown(&self) -> Result<(), RelayError> {
        debug!("OneBot source shutting down");
        Ok(())
    }
}

#[async_trait]
impl EventSource for OneBotSource {
    async fn connect(&mut self) -> Result<(), RelayError> {
        self.stream = Some(self.open().await?);
        info!(url = %self.display_url, "connected to OneBot websocket");
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<String, RelayError> {
        if self.stream.is_none() {
            let stream = self.open().await?;
            info!(url = %self.display_url, "reconnected to OneBot websocket");
            self.stream = Some(stream);
        }
        let Some(stream) = self.stream.as_mut() else {
            return Err(RelayError::Internal("websocket unavailable".into()));
        };

        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text.as_str().to_owned()),
                Some(Ok(Message::Close(frame))) => {
                    warn!(?frame, "websocket closed by server");
                    self.stream = None;
                    return Err(RelayError::source_closed("websocket closed by server"));
                }
                // Binary, ping, pong and raw frames carry no events.
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    self.stream = None;
                    return Err(RelayError::Source {
                        message: format!("websocket read failed: {e}"),
                        source: Some(Box::new(e)),
                    });
                }
                None => {
                    self.stream = None;
                    return Err(RelayError::source_closed("websocket stream ended"));
                }
            }
        }
    }
}
