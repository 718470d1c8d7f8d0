//! Model change notifications
//!
//! Provides the [`ModelEvent`] variants a validation pass publishes and an
//! [`EventBus`] that fans them out two ways:
//!
//! - **Subscribers** get a bounded `tokio::sync::broadcast` receiver. A
//!   subscriber that falls more than the bus capacity behind loses the
//!   oldest events.
//! - **Listeners** get an unbounded `tokio::sync::mpsc` receiver and see
//!   every event. Bindings listen this way, so render callbacks in event
//!   mode are never skipped.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};

use crate::controller::InvalidAttrs;
use crate::foundation::Snapshot;

// ---------------------------------------------------------------------------
// ModelEvent
// ---------------------------------------------------------------------------

/// Events published on a model's bus by a validation pass.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    /// A pass finished. Published after the pass, on the next task queue
    /// flush.
    Validated {
        /// Whether the model has no invalid attributes.
        is_valid: bool,
        /// Invalid attributes and their messages.
        invalid_attrs: InvalidAttrs,
        /// The flattened attributes the pass considered changed.
        changed: Snapshot,
    },
    /// A pass finished and the model is valid. Follows [`Self::Validated`].
    ValidatedValid {
        /// Always empty; kept for symmetry with the invalid event.
        invalid_attrs: InvalidAttrs,
        /// The flattened attributes the pass considered changed.
        changed: Snapshot,
    },
    /// A pass finished and the model is invalid. Follows [`Self::Validated`].
    ValidatedInvalid {
        /// Invalid attributes and their messages.
        invalid_attrs: InvalidAttrs,
        /// The flattened attributes the pass considered changed.
        changed: Snapshot,
    },
    /// One attribute was validated. Published synchronously during the pass
    /// when the binding uses events instead of render callbacks.
    AttrValidated {
        /// The attribute.
        attr: String,
        /// Whether it passed.
        is_valid: bool,
        /// Its failure message.
        error: Option<String>,
        /// It was among the changed attributes.
        is_changed: bool,
        /// One of its dependencies was among the changed attributes.
        is_dependency_changed: bool,
        /// The pass validated every declared attribute.
        validate_all: bool,
    },
}

impl ModelEvent {
    /// Conventional event name: `validated`, `validated:valid`,
    /// `validated:invalid` or `attr:validated`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Validated { .. } => "validated",
            Self::ValidatedValid { .. } => "validated:valid",
            Self::ValidatedInvalid { .. } => "validated:invalid",
            Self::AttrValidated { .. } => "attr:validated",
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Receiving end of [`EventBus::listen`].
pub type Listener = mpsc::UnboundedReceiver<ModelEvent>;

/// Change notifier of a model. Clones publish to the same receivers.
///
/// Emission is fire-and-forget: with no receivers the event is dropped.
/// Listeners whose receiver was dropped are pruned on the next emit.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ModelEvent>,
    listeners: Arc<Mutex<Vec<mpsc::UnboundedSender<ModelEvent>>>>,
}

impl EventBus {
    /// Creates a bus that buffers `capacity` events per lagging subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Publishes an event to all current listeners and subscribers.
    pub fn emit(&self, event: ModelEvent) {
        self.listeners
            .lock()
            .retain(|listener| listener.send(event.clone()).is_ok());
        // No subscribers is not an error.
        let _ = self.sender.send(event);
    }

    /// Subscribes to events published after this call. Lags past the bus
    /// capacity.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ModelEvent> {
        self.sender.subscribe()
    }

    /// Listens to every event published after this call.
    #[must_use]
    pub fn listen(&self) -> Listener {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.lock().push(tx);
        rx
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Number of listeners, including ones dropped since the last emit.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.sender.receiver_count())
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

/// Drains every event currently buffered for `rx`.
///
/// Lagged notifications are skipped; the receiver resumes at the oldest
/// retained event.
pub fn drain(rx: &mut broadcast::Receiver<ModelEvent>) -> Vec<ModelEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(_)) => {}
            Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed) => {
                break;
            }
        }
    }
    events
}

/// Drains every event queued for `listener`.
pub fn drain_listener(listener: &mut Listener) -> Vec<ModelEvent> {
    let mut events = Vec::new();
    while let Ok(event) = listener.try_recv() {
        events.push(event);
    }
    events
}
