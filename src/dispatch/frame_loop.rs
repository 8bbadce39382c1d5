// ABOUTME: Background task reading the node's WebSocket feed
// ABOUTME: Decodes frames in arrival order and hands events to the registry

use super::registry::ListenerRegistry;
use super::ConnectionStatus;
use crate::error::Error;
use crate::protocol::events::Event;
use futures_util::StreamExt;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

/// Socket type produced by the client handshake
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Read frames until the socket closes, errors, violates the protocol, or `cancel` fires.
///
/// The terminal status is published on `status` before returning. On cancellation the close
/// frame gets at most `close_timeout` to go out.
pub async fn run(
    mut socket: WsStream,
    registry: Arc<ListenerRegistry>,
    cancel: CancellationToken,
    status: watch::Sender<ConnectionStatus>,
    close_timeout: Duration,
) {
    let outcome = loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                match tokio::time::timeout(close_timeout, socket.close(None)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => log::debug!("Close handshake failed: {e}"),
                    Err(_) => log::warn!("Close frame not sent within {close_timeout:?}"),
                }
                break ConnectionStatus::Closed;
            }

            frame = socket.next() => match frame {
                Some(Ok(message)) => {
                    if let ControlFlow::Break(outcome) = handle_message(&registry, message) {
                        break outcome;
                    }
                }
                Some(Err(e)) => {
                    break ConnectionStatus::Errored(Error::WebSocket(e.to_string()).to_string())
                }
                None => break ConnectionStatus::Closed,
            },
        }
    };

    match &outcome {
        ConnectionStatus::Errored(reason) => log::error!("Event loop stopped: {reason}"),
        _ => log::info!("Event loop stopped: socket closed"),
    }

    status.send_replace(outcome);
}

fn handle_message(registry: &ListenerRegistry, message: WsMessage) -> ControlFlow<ConnectionStatus> {
    match message {
        WsMessage::Text(text) => match Event::from_json(text.as_str()) {
            Ok(Some(event)) => {
                log::debug!("Received {:?}", event.kind());
                registry.dispatch(event);
                ControlFlow::Continue(())
            }
            Ok(None) => ControlFlow::Continue(()),
            Err(e) => ControlFlow::Break(ConnectionStatus::Errored(e.to_string())),
        },
        WsMessage::Binary(data) => {
            log::warn!("Ignoring {} byte binary frame", data.len());
            ControlFlow::Continue(())
        }
        WsMessage::Close(frame) => {
            if let Some(frame) = frame {
                log::info!("Node closed the socket: {} {}", frame.code, frame.reason.as_str());
            }
            ControlFlow::Break(ConnectionStatus::Closed)
        }
        // Ping replies are queued by tungstenite itself
        WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => ControlFlow::Continue(()),
    }
}
