//! Initialization progress broadcast.
//!
//! Every state change of a session's initialization is published to all
//! subscribers. Late subscribers miss earlier events but can read the
//! current state at any time.

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};

use super::state::SessionId;

/// Events beyond this capacity make slow subscribers lag.
const DEFAULT_CAPACITY: usize = 64;

/// Where a session's initialization stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitState {
    Unresolved,
    Exchanging,
    FetchingLaunchData,
    SendingInitRecord,
    Ready,
    Inert,
    Error,
}

impl InitState {
    /// Ready, inert and error are final; nothing follows them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, InitState::Ready | InitState::Inert | InitState::Error)
    }
}

/// What subscribers of a session receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    Transition { session_id: SessionId, state: InitState },

    /// Initialization failed. Sent once, before the transition to inert.
    Failed { session_id: SessionId, message: String },
}

/// Initialization progress of one session: the current state plus a
/// broadcast of every change to it.
///
/// Uses a tokio broadcast channel for events and a watch channel for the
/// state, so the state stays readable without a subscription.
pub struct SessionEvents {
    session_id: SessionId,
    sender: broadcast::Sender<SessionEvent>,
    state: watch::Sender<InitState>,
}

impl SessionEvents {
    /// Create the events of `session_id` with default capacity, starting
    /// `Unresolved`.
    pub fn new(session_id: SessionId) -> Self {
        Self::with_capacity(session_id, DEFAULT_CAPACITY)
    }

    /// Create the events of `session_id` with the specified capacity.
    ///
    /// The capacity determines how many events can be buffered before slow
    /// subscribers start missing events (experiencing lag).
    ///
    /// # Arguments
    ///
    /// * `session_id` - The session every event is tagged with
    /// * `capacity` - Broadcast buffer size, must be greater than zero
    pub fn with_capacity(session_id: SessionId, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        let (state, _) = watch::channel(InitState::Unresolved);
        Self {
            session_id,
            sender,
            state,
        }
    }

    /// The state as of the latest transition.
    pub fn state(&self) -> InitState {
        *self.state.borrow()
    }

    /// Move to `state` and tell subscribers.
    ///
    /// The new state is readable through `state()` before the event is sent.
    /// Returns the number of subscribers that received the event; with no
    /// subscribers the event is dropped and 0 is returned.
    pub fn transition(&self, state: InitState) -> usize {
        let previous = self.state.send_replace(state);
        log::debug!(
            "Session {}: {:?} -> {:?}",
            self.session_id,
            previous,
            state
        );
        self.sender
            .send(SessionEvent::Transition {
                session_id: self.session_id.clone(),
                state,
            })
            .unwrap_or(0)
    }

    /// Report an initialization failure to all subscribers.
    ///
    /// Does not change the state. Returns the number of subscribers that
    /// received the event.
    ///
    /// # Arguments
    ///
    /// * `message` - Human-readable cause, e.g. the exchange error
    pub fn failed(&self, message: impl Into<String>) -> usize {
        self.sender
            .send(SessionEvent::Failed {
                session_id: self.session_id.clone(),
                message: message.into(),
            })
            .unwrap_or(0)
    }

    /// Subscribe to this session's events.
    ///
    /// Returns a receiver that will receive all future events.
    /// Past events are not delivered to new subscribers; read `state()` for
    /// where initialization already is.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Get the current number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
