//! The terminal result of session initialization.

use std::sync::Arc;
use tokio::sync::watch;

use super::state::SessionId;
use crate::client::LrsClient;
use crate::compose::ContextComposer;
use crate::error::XapiError;
use crate::launch::{LaunchData, LaunchParameters};
use crate::model::Actor;

/// An initialized session: a client bound to the LRS plus what the launch
/// captured.
pub struct SessionHandle {
    id: SessionId,
    client: LrsClient,
    params: LaunchParameters,
    launch_data: Option<LaunchData>,
    composer: ContextComposer,
}

impl SessionHandle {
    /// The composer takes the launch data's context template, or an empty
    /// one when there is no launch data.
    pub fn new(
        id: SessionId,
        client: LrsClient,
        params: LaunchParameters,
        launch_data: Option<LaunchData>,
    ) -> Self {
        let template = launch_data
            .as_ref()
            .map(|data| data.context_template.clone())
            .unwrap_or_default();
        let composer = ContextComposer::new(template, params.registration.clone());
        Self {
            id,
            client,
            params,
            launch_data,
            composer,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn client(&self) -> &LrsClient {
        &self.client
    }

    pub fn actor(&self) -> &Actor {
        &self.params.actor
    }

    pub fn registration(&self) -> Option<&str> {
        self.params.registration.as_deref()
    }

    pub fn activity_id(&self) -> Option<&str> {
        self.params.activity_id.as_deref()
    }

    /// Present only on the fetch-URL path.
    pub fn launch_data(&self) -> Option<&LaunchData> {
        self.launch_data.as_ref()
    }

    pub fn composer(&self) -> &ContextComposer {
        &self.composer
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id)
            .field("endpoint", &self.client.config().endpoint)
            .field("params", &self.params)
            .field("launch_data", &self.launch_data)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum SessionOutcome {
    Ready(Arc<SessionHandle>),

    /// Not launched, or initialization failed. Dispatch degrades to stubs.
    Inert,

    /// Launch input was present but unusable.
    Error(XapiError),
}

impl SessionOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, SessionOutcome::Ready(_))
    }

    pub fn is_inert(&self) -> bool {
        matches!(self, SessionOutcome::Inert)
    }

    pub fn handle(&self) -> Option<&Arc<SessionHandle>> {
        match self {
            SessionOutcome::Ready(handle) => Some(handle),
            _ => None,
        }
    }
}

/// Write-once cell every waiter reads the same outcome from.
pub struct OutcomeCell {
    sender: watch::Sender<Option<SessionOutcome>>,
}

impl OutcomeCell {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    /// Store the outcome. Only the first call has an effect; returns whether
    /// this call was it.
    pub fn set(&self, outcome: SessionOutcome) -> bool {
        let mut outcome = Some(outcome);
        self.sender.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = outcome.take();
            true
        })
    }

    pub fn get(&self) -> Option<SessionOutcome> {
        self.sender.borrow().clone()
    }

    /// Wait until the outcome is known.
    pub async fn wait(&self) -> SessionOutcome {
        let mut receiver = self.sender.subscribe();
        let outcome = match receiver.wait_for(Option::is_some).await {
            Ok(slot) => slot.clone().unwrap_or(SessionOutcome::Inert),
            // The sender lives as long as `self`.
            Err(_) => SessionOutcome::Inert,
        };
        outcome
    }
}

impl Default for OutcomeCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::LrsConfig;
    use crate::model::Context;
    use crate::testing::MockTransport;
    use crate::transport::LrsResponse;

    fn handle(launch_data: Option<LaunchData>) -> SessionHandle {
        let transport = MockTransport::responding(|_| Ok(LrsResponse::new(200, None)));
        let params = LaunchParameters::with_static_token(
            "https://lrs",
            "Basic abc",
            Actor::mbox("Ann", "ann@example.com"),
        )
        .registration("r-1");
        SessionHandle::new(
            SessionId::new(),
            LrsClient::new(LrsConfig::new("https://lrs", Some("Basic abc".to_string())), transport),
            params,
            launch_data,
        )
    }

    mod session_handle {
        use super::*;
        use serde_json::json;

        #[test]
        fn static_handle_composes_from_empty_template() {
            let handle = handle(None);
            assert_eq!(handle.composer().template(), &Context::default());
            assert_eq!(
                handle.composer().compose(None).registration.as_deref(),
                Some("r-1")
            );
        }

        #[test]
        fn launch_data_supplies_template() {
            let data: LaunchData = serde_json::from_value(json!({
                "contextTemplate": {"platform": "lms"},
                "launchMode": "Browse",
                "moveOn": "Completed"
            }))
            .unwrap();
            let handle = handle(Some(data));
            assert_eq!(handle.composer().template().platform.as_deref(), Some("lms"));
            assert!(handle.launch_data().is_some());
        }

        #[test]
        fn debug_hides_authorization() {
            let debug = format!("{:?}", handle(None));
            assert!(debug.contains("https://lrs"));
            assert!(!debug.contains("Basic abc"));
        }
    }

    mod outcome_cell {
        use super::*;

        #[test]
        fn first_set_wins() {
            let cell = OutcomeCell::new();
            assert!(cell.get().is_none());
            assert!(cell.set(SessionOutcome::Inert));
            assert!(!cell.set(SessionOutcome::Error(XapiError::Configuration("late".to_string()))));
            assert!(cell.get().unwrap().is_inert());
        }

        #[tokio::test]
        async fn wait_returns_stored_outcome() {
            let cell = OutcomeCell::new();
            cell.set(SessionOutcome::Inert);
            assert!(cell.wait().await.is_inert());
        }

        #[tokio::test]
        async fn waiters_before_and_after_see_the_same_outcome() {
            let cell = Arc::new(OutcomeCell::new());
            let early = {
                let cell = cell.clone();
                tokio::spawn(async move { cell.wait().await })
            };
            tokio::task::yield_now().await;

            let handle = Arc::new(handle(None));
            cell.set(SessionOutcome::Ready(handle.clone()));

            let early = early.await.unwrap();
            let late = cell.wait().await;
            assert!(Arc::ptr_eq(early.handle().unwrap(), &handle));
            assert!(Arc::ptr_eq(late.handle().unwrap(), &handle));
        }
    }
}
