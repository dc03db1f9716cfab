//! The initialization chain.
//!
//! ```text
//! Unresolved ──(no launch)──────────────────────────────────────────► Inert
//! Unresolved ──(partial producer input)─────────────────────────────► Error
//! Unresolved ──(static token)───────────────────────────────────────► Ready
//! Unresolved ─► Exchanging ─► FetchingLaunchData ─► SendingInitRecord ─► Ready
//!                    └───────────────┴──────────────────┴──(failure)──► Inert
//! ```
//!
//! Exactly one outcome is stored per session, after the matching terminal
//! state is visible, so a woken waiter never reads a stale state. Failures on the fetch path are
//! not retried; the error is kept for a single `take_init_error` call.

use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::events::InitState;
use super::outcome::{SessionHandle, SessionOutcome};
use super::state::SessionShared;
use crate::client::{LrsClient, LrsConfig};
use crate::error::XapiError;
use crate::launch::cmi5::cmi5_category;
use crate::launch::{
    AuthorizationExchanger, LaunchAuth, LaunchDataFetcher, LaunchInput, LaunchParameters,
    Resolution,
};
use crate::model::{verb, Activity, Context, ContextActivities, Statement};
use crate::transport::Transport;

pub struct SessionInitializer {
    shared: Arc<SessionShared>,
    transport: Arc<dyn Transport>,
    xapi_version: String,
}

impl SessionInitializer {
    pub fn new(
        shared: Arc<SessionShared>,
        transport: Arc<dyn Transport>,
        xapi_version: impl Into<String>,
    ) -> Self {
        Self {
            shared,
            transport,
            xapi_version: xapi_version.into(),
        }
    }

    /// Start initialization.
    ///
    /// Outcomes known without I/O (no launch, static token) are stored before
    /// this returns. Anything else runs on a spawned task whose handle is
    /// returned; this needs a tokio runtime.
    pub fn start(self, resolution: Resolution) -> Result<Option<JoinHandle<()>>, XapiError> {
        match resolution {
            Resolution::Resolved(None) => {
                self.finish_inert();
                Ok(None)
            }
            Resolution::Resolved(Some(params)) if params.fetch_url().is_none() => {
                self.finish_static(params);
                Ok(None)
            }
            Resolution::Resolved(Some(params)) => {
                let runtime = current_runtime()?;
                Ok(Some(runtime.spawn(async move { self.run_fetch(params).await })))
            }
            Resolution::Pending(producer) => {
                let runtime = current_runtime()?;
                Ok(Some(runtime.spawn(async move {
                    let input = producer.await;
                    self.run_produced(input).await;
                })))
            }
        }
    }

    async fn run_produced(self, input: Option<LaunchInput>) {
        let params = match input.map(LaunchInput::into_parameters).transpose() {
            Ok(params) => params.flatten(),
            Err(e) => {
                log::warn!("Session {}: unusable launch input: {}", self.shared.id, e);
                self.shared.events.transition(InitState::Error);
                self.shared.outcome.set(SessionOutcome::Error(e));
                return;
            }
        };

        match params {
            None => self.finish_inert(),
            Some(params) if params.fetch_url().is_none() => self.finish_static(params),
            Some(params) => self.run_fetch(params).await,
        }
    }

    fn finish_inert(&self) {
        log::debug!("Session {}: not launched", self.shared.id);
        self.shared.events.transition(InitState::Inert);
        self.shared.outcome.set(SessionOutcome::Inert);
    }

    fn finish_static(&self, params: LaunchParameters) {
        let authorization = match &params.auth {
            LaunchAuth::Static(token) => Some(token.clone()),
            LaunchAuth::Fetch(_) => None,
        };
        let client = self.client(&params.endpoint, authorization);
        let handle = SessionHandle::new(self.shared.id.clone(), client, params, None);
        self.publish_ready(handle);
    }

    async fn run_fetch(self, params: LaunchParameters) {
        match self.initialize(params).await {
            Ok(handle) => self.publish_ready(handle),
            Err(e) => {
                log::error!("Session {} initialization failed: {}", self.shared.id, e);
                self.shared.events.failed(e.to_string());
                self.shared.record_init_error(e);
                self.shared.events.transition(InitState::Inert);
                self.shared.outcome.set(SessionOutcome::Inert);
            }
        }
    }

    async fn initialize(&self, params: LaunchParameters) -> Result<SessionHandle, XapiError> {
        let fetch_url = params
            .fetch_url()
            .ok_or_else(|| XapiError::Configuration("launch has no fetch URL".to_string()))?
            .to_string();

        self.shared.events.transition(InitState::Exchanging);
        let token = AuthorizationExchanger::new(self.transport.clone())
            .exchange(&fetch_url)
            .await?;
        let client = self.client(&params.endpoint, Some(format!("Basic {}", token)));

        self.shared.events.transition(InitState::FetchingLaunchData);
        let launch_data = LaunchDataFetcher::new(client.clone()).fetch(&params).await?;

        self.shared.events.transition(InitState::SendingInitRecord);
        let handle = SessionHandle::new(self.shared.id.clone(), client, params, Some(launch_data));
        let record = init_record(&handle)?;
        handle.client().post_statement(&record).await?;

        Ok(handle)
    }

    fn publish_ready(&self, handle: SessionHandle) {
        log::info!(
            "Session {} ready against {}",
            self.shared.id,
            handle.client().config().endpoint
        );
        self.shared.events.transition(InitState::Ready);
        self.shared
            .outcome
            .set(SessionOutcome::Ready(Arc::new(handle)));
    }

    fn client(&self, endpoint: &str, authorization: Option<String>) -> LrsClient {
        let mut config = LrsConfig::new(endpoint, authorization);
        config.version = self.xapi_version.clone();
        LrsClient::new(config, self.transport.clone())
    }
}

/// The cmi5 `initialized` statement: the launch context template merged
/// with the cmi5 category.
pub fn init_record(handle: &SessionHandle) -> Result<Statement, XapiError> {
    let activity_id = handle
        .activity_id()
        .ok_or(XapiError::MissingField("object"))?;

    let cmi5 = Context {
        context_activities: Some(ContextActivities {
            category: Some(vec![cmi5_category()]),
            ..ContextActivities::default()
        }),
        ..Context::default()
    };

    Ok(Statement {
        id: Some(Uuid::new_v4().to_string()),
        actor: handle.actor().clone(),
        verb: verb::initialized(),
        object: Activity::new(activity_id),
        result: None,
        context: Some(handle.composer().compose(Some(&cmi5))),
        timestamp: Some(Utc::now()),
    })
}

fn current_runtime() -> Result<tokio::runtime::Handle, XapiError> {
    tokio::runtime::Handle::try_current().map_err(|e| {
        XapiError::Configuration(format!("fetch launch needs a tokio runtime: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launch::cmi5::CMI5_CATEGORY;
    use crate::launch::LaunchData;
    use crate::model::Actor;
    use crate::session::state::SessionId;
    use crate::testing::MockTransport;
    use crate::transport::LrsResponse;
    use serde_json::json;

    fn launch_data() -> LaunchData {
        serde_json::from_value(json!({
            "contextTemplate": {
                "contextActivities": {
                    "category": [{"id": "https://lms/category"}],
                    "grouping": [{"id": "https://publisher/au"}]
                },
                "extensions": {
                    "https://w3id.org/xapi/cmi5/context/extensions/sessionid": "s-1"
                }
            },
            "launchMode": "Normal",
            "moveOn": "Completed"
        }))
        .unwrap()
    }

    #[test]
    fn init_record_merges_cmi5_category_into_template() {
        let transport = MockTransport::responding(|_| Ok(LrsResponse::new(200, None)));
        let params = LaunchParameters::with_fetch_url(
            "https://lrs",
            "https://lms/fetch",
            Actor::mbox("Ann", "ann@example.com"),
        )
        .registration("r-1")
        .activity_id("https://course/au");
        let handle = SessionHandle::new(
            SessionId::new(),
            LrsClient::new(LrsConfig::new("https://lrs", None), transport),
            params,
            Some(launch_data()),
        );

        let record = init_record(&handle).unwrap();
        assert_eq!(record.verb, verb::initialized());
        assert_eq!(record.object.id, "https://course/au");
        assert!(record.id.is_some());

        let context = record.context.unwrap();
        assert_eq!(context.registration.as_deref(), Some("r-1"));
        let activities = context.context_activities.unwrap();
        let categories: Vec<String> = activities
            .category
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(categories, vec![CMI5_CATEGORY, "https://lms/category"]);
        assert_eq!(activities.grouping.unwrap().len(), 1);
        assert!(context
            .extensions
            .unwrap()
            .contains_key("https://w3id.org/xapi/cmi5/context/extensions/sessionid"));
    }

    #[test]
    fn static_launch_is_ready_without_runtime() {
        let shared = Arc::new(SessionShared::new(SessionId::new()));
        let transport = MockTransport::responding(|_| Ok(LrsResponse::new(200, None)));
        let params = LaunchParameters::with_static_token(
            "https://lrs",
            "Basic abc",
            Actor::mbox("Ann", "ann@example.com"),
        );

        let task = SessionInitializer::new(shared.clone(), transport.clone(), "1.0.3")
            .start(Resolution::Resolved(Some(params)))
            .unwrap();

        assert!(task.is_none());
        assert!(shared.outcome.get().unwrap().is_ready());
        assert_eq!(shared.events.state(), InitState::Ready);
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn fetch_launch_without_runtime_is_configuration_error() {
        let shared = Arc::new(SessionShared::new(SessionId::new()));
        let transport = MockTransport::responding(|_| Ok(LrsResponse::new(200, None)));
        let params = LaunchParameters::with_fetch_url(
            "https://lrs",
            "https://lms/fetch",
            Actor::mbox("Ann", "ann@example.com"),
        );

        let err = SessionInitializer::new(shared, transport, "1.0.3")
            .start(Resolution::Resolved(Some(params)))
            .unwrap_err();
        assert!(matches!(err, XapiError::Configuration(_)));
    }
}
