// ABOUTME: Per-connection session state owned by the client
// ABOUTME: Set once in connect(), torn down in close()

use crate::dispatch::ConnectionStatus;
use crate::node::ConnectionConfig;
use crate::rest::RestClient;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Everything a live connection owns
#[derive(Debug)]
pub(crate) struct SessionState {
    pub(crate) config: ConnectionConfig,
    pub(crate) rest: RestClient,
    pub(crate) socket: SocketHandle,
}

/// Handle to the WebSocket and the frame loop reading it
#[derive(Debug)]
pub struct SocketHandle {
    url: String,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    status: watch::Receiver<ConnectionStatus>,
}

impl SocketHandle {
    pub(crate) fn new(
        url: String,
        cancel: CancellationToken,
        task: JoinHandle<()>,
        status: watch::Receiver<ConnectionStatus>,
    ) -> Self {
        Self {
            url,
            cancel,
            task: Some(task),
            status,
        }
    }

    /// URL the socket was opened against
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Current loop status
    pub fn status(&self) -> ConnectionStatus {
        self.status.borrow().clone()
    }

    /// Receiver that observes every status change
    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    /// Stop the frame loop and wait for it to send the close frame.
    /// Listener tasks already spawned keep running.
    pub(crate) async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::error!("Event loop task failed: {e}");
            }
        }
    }
}

impl Drop for SocketHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
