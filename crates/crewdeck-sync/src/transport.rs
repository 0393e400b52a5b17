//! WebSocket channel driver.
//!
//! Owns the physical side of the realtime channel: connect, authenticate,
//! retry with exponential backoff, and shuttle typed events between the
//! socket and the session's queues. Everything logical — connection state,
//! room membership, routing — lives upstream in the [`ConnectionManager`]
//! and session; the driver only reports lifecycle signals.
//!
//! [`ConnectionManager`]: crate::connection::ConnectionManager

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

use crewdeck_config::ReconnectConfig;
use crewdeck_types::{Error, Result};

use crate::connection::ChannelSignal;
use crate::protocol::{ClientEvent, ServerEvent};

/// One message delivered from the driver to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelMessage {
    /// Lifecycle signal for the connection state machine.
    Signal(ChannelSignal),
    /// A typed server event.
    Event(ServerEvent),
}

/// Handle to the background channel task.
///
/// Dropping the driver aborts the task; [`shutdown`](Self::shutdown) does
/// so explicitly and synchronously deregisters the socket, which is what
/// logout and identity switches require before a new channel may open.
pub struct ChannelDriver {
    task: tokio::task::JoinHandle<()>,
}

impl ChannelDriver {
    /// Spawn the channel task.
    ///
    /// `server_url` is the dashboard's HTTP base URL; the driver derives
    /// the WebSocket endpoint from it. Outbound events are drained from
    /// `outbound_rx`; signals and inbound events are pushed to `inbound_tx`.
    pub fn spawn(
        server_url: &str,
        auth_token: String,
        reconnect: ReconnectConfig,
        outbound_rx: mpsc::UnboundedReceiver<ClientEvent>,
        inbound_tx: mpsc::UnboundedSender<ChannelMessage>,
    ) -> Result<Self> {
        let ws_url = channel_url(server_url)?;
        let task = tokio::spawn(connection_loop(
            ws_url,
            auth_token,
            reconnect,
            outbound_rx,
            inbound_tx,
        ));
        Ok(Self { task })
    }

    /// Abort the channel task and release the socket.
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for ChannelDriver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Connection loop with reconnection and backoff.
async fn connection_loop(
    ws_url: String,
    auth_token: String,
    reconnect: ReconnectConfig,
    mut outbound_rx: mpsc::UnboundedReceiver<ClientEvent>,
    inbound_tx: mpsc::UnboundedSender<ChannelMessage>,
) {
    let mut attempt = 0u32;

    loop {
        if inbound_tx
            .send(ChannelMessage::Signal(ChannelSignal::Connecting { attempt }))
            .is_err()
        {
            return;
        }

        tracing::info!(url = %ws_url, attempt, "connecting to channel");
        match connect_async(&ws_url).await {
            Ok((ws_stream, _)) => {
                attempt = 0;
                let disconnected = handle_connection(
                    ws_stream,
                    &auth_token,
                    &mut outbound_rx,
                    &inbound_tx,
                )
                .await;

                if !disconnected {
                    // Clean shutdown requested.
                    let _ = inbound_tx.send(ChannelMessage::Signal(ChannelSignal::Disconnected));
                    return;
                }
                tracing::warn!("channel lost, will reconnect");
            }
            Err(e) => {
                tracing::warn!(error = %e, "channel connect failed");
            }
        }

        attempt += 1;
        if !reconnect.allows_attempt(attempt) {
            tracing::warn!(attempt, "reconnect budget exhausted");
            let _ = inbound_tx.send(ChannelMessage::Signal(ChannelSignal::Disconnected));
            return;
        }
        let backoff = reconnect.backoff_for_attempt(attempt);
        tracing::debug!(?backoff, "reconnecting after backoff");
        tokio::time::sleep(backoff).await;
    }
}

/// Handle an active channel connection.
/// Returns true if we should reconnect, false for clean shutdown.
async fn handle_connection(
    ws_stream: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    auth_token: &str,
    outbound_rx: &mut mpsc::UnboundedReceiver<ClientEvent>,
    inbound_tx: &mpsc::UnboundedSender<ChannelMessage>,
) -> bool {
    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    // Authenticate before anything else; joins are queued upstream until
    // the connect signal lands.
    let auth = ClientEvent::Auth {
        token: auth_token.to_string(),
    };
    match serde_json::to_string(&auth) {
        Ok(json) => {
            if let Err(e) = ws_sink.send(Message::Text(json.into())).await {
                tracing::error!(error = %e, "failed to send auth");
                return true;
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize auth");
            return true;
        }
    }

    if inbound_tx
        .send(ChannelMessage::Signal(ChannelSignal::Connected))
        .is_err()
    {
        return false;
    }
    tracing::info!("channel connected");

    loop {
        tokio::select! {
            // Outbound event from the session
            Some(event) = outbound_rx.recv() => {
                let json = match serde_json::to_string(&event) {
                    Ok(j) => j,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to serialize outbound event");
                        continue;
                    }
                };

                if let Err(e) = ws_sink.send(Message::Text(json.into())).await {
                    tracing::error!(error = %e, "failed to send outbound event");
                    return true; // Reconnect
                }
            }

            // Inbound frame from the server
            Some(msg) = ws_stream.next() => {
                match msg {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<ServerEvent>(&text) {
                            Ok(event) => {
                                if inbound_tx.send(ChannelMessage::Event(event)).is_err() {
                                    // Receiver dropped, clean shutdown
                                    return false;
                                }
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, frame = %text, "unparseable server frame");
                            }
                        }
                    }
                    Ok(Message::Ping(data)) => {
                        let _ = ws_sink.send(Message::Pong(data)).await;
                    }
                    Ok(Message::Pong(_)) => {}
                    Ok(Message::Close(_)) => {
                        tracing::info!("server closed channel");
                        return true; // Reconnect
                    }
                    Ok(Message::Binary(_)) => {
                        tracing::warn!("unexpected binary frame");
                    }
                    Ok(Message::Frame(_)) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "channel error");
                        return true; // Reconnect
                    }
                }
            }

            // Both channels closed
            else => {
                return false; // Clean shutdown
            }
        }
    }
}

/// Derive the channel endpoint from the dashboard's HTTP base URL.
fn channel_url(http_url: &str) -> Result<String> {
    let mut url =
        Url::parse(http_url).map_err(|e| Error::Channel(format!("invalid server URL: {}", e)))?;

    let new_scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(Error::Channel(format!("unsupported URL scheme: {}", other)));
        }
    };

    url.set_scheme(new_scheme)
        .map_err(|_| Error::Channel("failed to set scheme".to_string()))?;
    url.set_path("/channel");

    Ok(url.to_string())
}
