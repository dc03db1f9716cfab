//! State shared between a course and its initialization chain.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use uuid::Uuid;

use super::events::SessionEvents;
use super::outcome::OutcomeCell;
use crate::error::XapiError;

/// Local identifier of a course session, used in logs and events.
///
/// Not the cmi5 session id, which the LMS hands out in the context template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub struct SessionShared {
    pub id: SessionId,
    pub outcome: OutcomeCell,
    pub events: SessionEvents,
    init_error: Mutex<Option<XapiError>>,
}

impl SessionShared {
    pub fn new(id: SessionId) -> Self {
        Self {
            events: SessionEvents::new(id.clone()),
            outcome: OutcomeCell::new(),
            init_error: Mutex::new(None),
            id,
        }
    }

    pub fn record_init_error(&self, error: XapiError) {
        let mut slot = self.init_error.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(error);
    }

    /// The initialization error, handed out once.
    pub fn take_init_error(&self) -> Option<XapiError> {
        self.init_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod session_id {
        use super::*;

        #[test]
        fn new_generates_unique_ids() {
            assert_ne!(SessionId::new(), SessionId::new());
        }

        #[test]
        fn display_is_inner_string() {
            assert_eq!(SessionId("abc".to_string()).to_string(), "abc");
        }
    }

    mod init_error {
        use super::*;

        #[test]
        fn is_taken_once() {
            let shared = SessionShared::new(SessionId::new());
            assert_eq!(shared.take_init_error(), None);

            shared.record_init_error(XapiError::AuthExchange("denied".to_string()));
            assert_eq!(
                shared.take_init_error(),
                Some(XapiError::AuthExchange("denied".to_string()))
            );
            assert_eq!(shared.take_init_error(), None);
        }
    }
}
