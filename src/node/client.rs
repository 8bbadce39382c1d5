// ABOUTME: Lavalink client owning one logical connection to a node
// ABOUTME: Handles connect/close, listener registration, and REST accessors

use super::config::ConnectionConfig;
use super::state::{SessionState, SocketHandle};
use crate::dispatch::frame_loop;
use crate::dispatch::{ConnectionStatus, ListenerError, ListenerRegistry};
use crate::error::Error;
use crate::protocol::events::{Event, EventType};
use crate::protocol::models::Player;
use crate::rest::RestClient;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_util::sync::CancellationToken;

/// Client for one Lavalink node.
///
/// Listeners may be registered before or after [`connect`](Self::connect) and survive
/// reconnects. Every session accessor fails with [`Error::NotConnected`] until `connect`
/// has succeeded.
#[derive(Debug, Default)]
pub struct Lavalink {
    registry: Arc<ListenerRegistry>,
    state: Option<SessionState>,
}

impl Lavalink {
    /// Create an unconnected client
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the WebSocket feed and spawn the frame loop.
    ///
    /// Returns once the handshake completes; it does not wait for the node's `ready` frame.
    /// An existing session is closed first. The handshake is bounded by the config's
    /// `request_timeout`.
    pub async fn connect(&mut self, config: ConnectionConfig) -> Result<(), Error> {
        if let Some(previous) = self.state.take() {
            log::info!("Closing session on {} before reconnecting", previous.socket.url());
            previous.socket.shutdown().await;
        }

        let rest = RestClient::new(&config)?;
        let url = config.websocket_url();

        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| Error::Connection(e.to_string()))?;
        request.headers_mut().extend(config.headers()?);

        let handshake = tokio::time::timeout(config.request_timeout, connect_async(request));
        let (socket, _response) = handshake
            .await
            .map_err(|_| {
                Error::Connection(format!("handshake timed out after {:?}", config.request_timeout))
            })?
            .map_err(|e| Error::Connection(e.to_string()))?;
        log::info!("Connected to {url}");

        let cancel = CancellationToken::new();
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Open);
        let task = tokio::spawn(frame_loop::run(
            socket,
            Arc::clone(&self.registry),
            cancel.clone(),
            status_tx,
            config.request_timeout,
        ));

        self.state = Some(SessionState {
            config,
            rest,
            socket: SocketHandle::new(url, cancel, task, status_rx),
        });

        Ok(())
    }

    /// Close the socket and drop the REST transport.
    ///
    /// Listener tasks already running are not awaited.
    pub async fn close(&mut self) -> Result<(), Error> {
        let state = self.state.take().ok_or(Error::NotConnected)?;
        state.socket.shutdown().await;
        log::info!("Closed connection to {}:{}", state.config.host, state.config.port);
        Ok(())
    }

    fn state(&self) -> Result<&SessionState, Error> {
        self.state.as_ref().ok_or(Error::NotConnected)
    }

    /// Whether the session uses `wss`/`https`
    pub fn is_ssl(&self) -> Result<bool, Error> {
        Ok(self.state()?.config.ssl)
    }

    /// Host of the connected node
    pub fn host(&self) -> Result<&str, Error> {
        Ok(&self.state()?.config.host)
    }

    /// Port of the connected node
    pub fn port(&self) -> Result<u16, Error> {
        Ok(self.state()?.config.port)
    }

    /// Authenticated REST transport of the current session
    pub fn session(&self) -> Result<&RestClient, Error> {
        Ok(&self.state()?.rest)
    }

    /// Handle to the current WebSocket
    pub fn websocket(&self) -> Result<&SocketHandle, Error> {
        Ok(&self.state()?.socket)
    }

    /// Status of the frame loop
    pub fn status(&self) -> Result<ConnectionStatus, Error> {
        Ok(self.websocket()?.status())
    }

    /// Watch the frame loop's status, e.g. to learn when the node went away
    pub fn subscribe_status(&self) -> Result<watch::Receiver<ConnectionStatus>, Error> {
        Ok(self.websocket()?.subscribe())
    }

    /// Registry shared with the frame loop
    pub fn registry(&self) -> &Arc<ListenerRegistry> {
        &self.registry
    }

    /// Register an async callback for event type `E`.
    ///
    /// ```no_run
    /// # use lava::Lavalink;
    /// # use lava::protocol::events::TrackStartEvent;
    /// let lavalink = Lavalink::new();
    /// lavalink.listen(|event: TrackStartEvent| async move {
    ///     println!("guild {} started {}", event.guild_id, event.encoded_track);
    ///     Ok(())
    /// });
    /// ```
    pub fn listen<E, F, Fut>(&self, callback: F)
    where
        E: EventType,
        F: Fn(E) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ListenerError>> + Send + 'static,
    {
        self.registry.listen::<E, F, Fut>(callback);
    }

    /// Schedule every listener for `event`; returns how many were scheduled.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn dispatch(&self, event: Event) -> usize {
        self.registry.dispatch(event)
    }

    /// GET `/v3/{path}` on the connected node
    pub async fn get(&self, path: &str) -> Result<Value, Error> {
        self.session()?.get(path).await
    }

    /// Players of `session_id`, in server order
    pub async fn get_players(&self, session_id: &str) -> Result<Vec<Player>, Error> {
        self.session()?.get_players(session_id).await
    }
}
