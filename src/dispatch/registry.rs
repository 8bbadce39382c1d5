// ABOUTME: Listener registry keyed by event kind
// ABOUTME: Each dispatch spawns one task per listener and never waits on them

use crate::protocol::events::{Event, EventKind, EventType};
use futures_util::FutureExt;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;

/// Error a listener may return; it is logged and otherwise dropped
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

type ListenerFuture = Pin<Box<dyn Future<Output = Result<(), ListenerError>> + Send>>;
type Listener = Arc<dyn Fn(Event) -> ListenerFuture + Send + Sync>;

/// Ordered async callbacks per event kind, shared by the client and the frame loop
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<HashMap<EventKind, Vec<Listener>>>,
}

impl ListenerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `callback` to the listeners for `E`.
    ///
    /// Listeners cannot be removed; registration order is fan-out order.
    pub fn listen<E, F, Fut>(&self, callback: F)
    where
        E: EventType,
        F: Fn(E) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ListenerError>> + Send + 'static,
    {
        let listener: Listener = Arc::new(move |event: Event| -> ListenerFuture {
            match E::from_event(event) {
                Some(payload) => Box::pin(callback(payload)),
                None => Box::pin(std::future::ready(Ok(()))),
            }
        });

        self.listeners.write().entry(E::KIND).or_default().push(listener);
    }

    /// Number of listeners registered for `kind`
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.read().get(&kind).map_or(0, Vec::len)
    }

    /// Spawn every listener for the event's kind and return how many were scheduled.
    ///
    /// Must be called from within a Tokio runtime. Returns without waiting for any listener;
    /// failures and panics are logged per listener.
    pub fn dispatch(&self, event: Event) -> usize {
        let kind = event.kind();

        // Snapshot; the lock is released before any listener runs.
        let listeners = match self.listeners.read().get(&kind) {
            Some(listeners) => listeners.clone(),
            None => return 0,
        };

        for listener in &listeners {
            let listener = Arc::clone(listener);
            let event = event.clone();

            tokio::spawn(async move {
                let outcome = AssertUnwindSafe(async move { listener(event).await })
                    .catch_unwind()
                    .await;

                match outcome {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => log::error!("{kind:?} listener failed: {e}"),
                    Err(_) => log::error!("{kind:?} listener panicked"),
                }
            });
        }

        log::debug!("Scheduled {} {kind:?} listener(s)", listeners.len());
        listeners.len()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<EventKind, usize> = self
            .listeners
            .read()
            .iter()
            .map(|(kind, listeners)| (*kind, listeners.len()))
            .collect();
        f.debug_struct("ListenerRegistry").field("listeners", &counts).finish()
    }
}
