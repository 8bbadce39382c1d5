// ABOUTME: Shared fixtures for integration tests
// ABOUTME: A local mock node speaking the WebSocket side of the protocol

#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use lava::ConnectionConfig;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::HeaderMap;
use tokio_tungstenite::tungstenite::Message;

pub const PASSWORD: &str = "youshallnotpass";
pub const BOT_ID: u64 = 1;
pub const TIMEOUT: Duration = Duration::from_secs(5);

/// Accepts any number of client connections on 127.0.0.1
pub struct MockNode {
    pub addr: SocketAddr,
    connections: mpsc::UnboundedReceiver<MockConnection>,
}

/// Server side of one accepted WebSocket
pub struct MockConnection {
    pub path: String,
    pub headers: HeaderMap,
    outgoing: mpsc::UnboundedSender<Message>,
    client_closed: Option<oneshot::Receiver<()>>,
}

impl MockNode {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (conn_tx, connections) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let (handshake_tx, handshake_rx) = oneshot::channel();
                let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                    let _ = handshake_tx.send((req.uri().path().to_string(), req.headers().clone()));
                    Ok(resp)
                };

                let Ok(ws) = tokio_tungstenite::accept_hdr_async(stream, callback).await else {
                    continue;
                };
                let (path, headers) = handshake_rx.await.unwrap();

                let (outgoing, out_rx) = mpsc::unbounded_channel();
                let (closed_tx, client_closed) = oneshot::channel();
                tokio::spawn(serve(ws, out_rx, closed_tx));

                let connection = MockConnection {
                    path,
                    headers,
                    outgoing,
                    client_closed: Some(client_closed),
                };
                if conn_tx.send(connection).is_err() {
                    break;
                }
            }
        });

        Self { addr, connections }
    }

    pub fn config(&self) -> ConnectionConfig {
        ConnectionConfig::new("127.0.0.1", self.addr.port(), PASSWORD, BOT_ID)
    }

    pub async fn accept(&mut self) -> MockConnection {
        tokio::time::timeout(TIMEOUT, self.connections.recv())
            .await
            .expect("no client connected")
            .expect("mock node stopped")
    }
}

async fn serve(
    ws: tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>,
    mut out_rx: mpsc::UnboundedReceiver<Message>,
    closed_tx: oneshot::Sender<()>,
) {
    let (mut sink, mut stream) = ws.split();
    let mut closed_tx = Some(closed_tx);

    loop {
        tokio::select! {
            out = out_rx.recv() => match out {
                Some(message) => {
                    let is_close = matches!(message, Message::Close(_));
                    if sink.send(message).await.is_err() || is_close {
                        break;
                    }
                }
                None => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                    if let Some(tx) = closed_tx.take() {
                        let _ = tx.send(());
                    }
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }
}

impl MockConnection {
    pub fn send_json(&self, frame: Value) {
        self.send_raw(&frame.to_string());
    }

    pub fn send_raw(&self, text: &str) {
        self.outgoing.send(Message::text(text.to_string())).unwrap();
    }

    /// Send a close frame and drop the socket
    pub fn close(&self) {
        self.outgoing.send(Message::Close(None)).unwrap();
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Wait until the client sends a close frame or drops the connection
    pub async fn client_closed(&mut self) {
        let rx = self.client_closed.take().expect("already awaited");
        tokio::time::timeout(TIMEOUT, rx)
            .await
            .expect("client never closed")
            .ok();
    }
}

pub fn ready_frame(session_id: &str) -> Value {
    json!({ "op": "ready", "resumed": false, "sessionId": session_id })
}

pub fn track_start_frame(guild_id: &str) -> Value {
    json!({
        "op": "event",
        "type": "TrackStartEvent",
        "guildId": guild_id,
        "encodedTrack": "QAAAjQIAJVJpY2sgQXN0bGV5"
    })
}

pub fn stats_frame() -> Value {
    json!({
        "op": "stats",
        "players": 3,
        "playingPlayers": 1,
        "uptime": 123456789,
        "memory": { "free": 123, "used": 456, "allocated": 789, "reservable": 1000 },
        "cpu": { "cores": 4, "systemLoad": 0.5, "lavalinkLoad": 0.25 },
        "frameStats": { "sent": 6000, "nulled": 10, "deficit": -3010 }
    })
}

pub fn player_json(guild_id: &str, title: &str) -> Value {
    json!({
        "guildId": guild_id,
        "track": {
            "encoded": "QAAAjQIAJVJpY2sgQXN0bGV5",
            "info": {
                "identifier": "dQw4w9WgXcQ",
                "isSeekable": true,
                "author": "RickAstleyVEVO",
                "length": 212000,
                "isStream": false,
                "position": 60000,
                "title": title,
                "uri": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
                "sourceName": "youtube"
            }
        },
        "volume": 100,
        "paused": false,
        "voice": {
            "token": "voice-token",
            "endpoint": "eu-west.discord.media",
            "sessionId": "voice-session",
            "connected": true,
            "ping": 20
        },
        "filters": {}
    })
}
