//! WebSocket transport.
//!
//! One task per connection runs the read loop, the outbound-queue drain,
//! and the heartbeat in a single select. Authentication happens once at
//! connection time from the URL query string (`token`, and optionally
//! `share`); a failed authentication gets an error frame and close code
//! 4001. After that the [`Session`] owns all protocol behavior.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info};
use uuid::Uuid;

use vellum_protocol::{encode_server, ServerMessage};

use crate::auth::Authenticator;
use crate::constants::{
    CLOSE_AUTH_FAILURE, DEFAULT_BIND_ADDRESS, DEFAULT_PORT, HEARTBEAT_INTERVAL,
    OUTBOUND_QUEUE_DEPTH,
};
use crate::error::SessionError;
use crate::registry::RoomRegistry;
use crate::session::Session;
use crate::storage::DocumentStore;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Accept loop. Runs until the listener fails fatally.
pub async fn run_server(
    config: ServerConfig,
    registry: Arc<RoomRegistry>,
    store: Arc<dyn DocumentStore>,
    auth: Arc<dyn Authenticator>,
) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "listening for collaboration connections");

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let registry = registry.clone();
                let store = store.clone();
                let auth = auth.clone();
                tokio::spawn(async move {
                    handle_connection(stream, peer, registry, store, auth).await;
                });
            }
            Err(err) => {
                error!(%err, "accept failed");
            }
        }
    }
}

fn query_param(query: &str, key: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then(|| v.to_string())
    })
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    registry: Arc<RoomRegistry>,
    store: Arc<dyn DocumentStore>,
    auth: Arc<dyn Authenticator>,
) {
    let connection_id = Uuid::new_v4();
    let mut token: Option<String> = None;
    let mut share_token: Option<String> = None;

    let ws = match tokio_tungstenite::accept_hdr_async(stream, |request: &Request, response: Response| {
        if let Some(query) = request.uri().query() {
            token = query_param(query, "token");
            share_token = query_param(query, "share");
        }
        Ok(response)
    })
    .await
    {
        Ok(ws) => ws,
        Err(err) => {
            debug!(%peer, %err, "websocket handshake failed");
            return;
        }
    };
    let (mut sink, mut source) = ws.split();

    let user = match &token {
        Some(token) => auth.session_user(token).await,
        None => None,
    };
    let Some(user) = user else {
        info!(%peer, %connection_id, "rejecting unauthenticated connection");
        let error = ServerMessage::Error {
            message: SessionError::AuthFailure.to_string(),
        };
        let _ = sink.send(Message::Text(encode_server(&error))).await;
        let _ = sink
            .send(Message::Close(Some(CloseFrame {
                code: CloseCode::Library(CLOSE_AUTH_FAILURE),
                reason: "authentication failed".into(),
            })))
            .await;
        return;
    };
    info!(%peer, %connection_id, user_id = %user.user_id, "connection authenticated");

    let (out_tx, mut out_rx) = mpsc::channel::<ServerMessage>(OUTBOUND_QUEUE_DEPTH);
    let mut session = Session::new(registry, store, auth, user, share_token, out_tx);

    let mut alive = true;
    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await; // the first tick fires immediately

    loop {
        tokio::select! {
            frame = source.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    alive = true;
                    session.handle_frame(&text).await;
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                    alive = true;
                }
                Some(Ok(Message::Close(_))) | None => {
                    debug!(%connection_id, "connection closed by peer");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    debug!(%connection_id, %err, "read error");
                    break;
                }
            },
            outbound = out_rx.recv() => match outbound {
                Some(message) => {
                    if sink
                        .send(Message::Text(encode_server(&message)))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                // The room dropped us (stalled queue); terminate.
                None => break,
            },
            _ = heartbeat.tick() => {
                if !std::mem::replace(&mut alive, false) {
                    info!(%connection_id, "heartbeat timeout, terminating");
                    break;
                }
                if sink.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    session.leave_current();
    let _ = sink.close().await;
}
