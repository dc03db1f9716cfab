//! XapiCourse: the tracking surface a course talks to.
//!
//! Every operation waits for the session outcome first. A ready session
//! fills in statement defaults and goes to the LRS; an inert one answers
//! with stand-ins and never touches the network; an errored one returns the
//! launch configuration error.
//!
//! ```text
//!   launch input ──► LaunchResolver ──► SessionInitializer ──► OutcomeCell
//!                                                                   │
//!   send / send_with / get / put ──── wait ◄───────────────────────┘
//! ```

use chrono::Utc;
use serde_json::{json, Value};
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::client::{DocumentOptions, StateParams, XAPI_VERSION};
use crate::error::XapiError;
use crate::launch::{LaunchInput, LaunchResolver};
use crate::logging::open_log_file;
use crate::model::{verb, Activity, ActivityDefinition, Context, PartialStatement, Statement};
use crate::session::{
    InitState, SessionEvent, SessionHandle, SessionId, SessionInitializer, SessionOutcome,
    SessionShared,
};
use crate::transport::{LrsResponse, Transport, UreqTransport};

/// Per-course settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseConfig {
    /// Sent as `X-Experience-API-Version`.
    pub xapi_version: String,

    /// Where the LRS traffic log goes. `None` disables it.
    pub log_dir: Option<PathBuf>,
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            xapi_version: XAPI_VERSION.to_string(),
            log_dir: None,
        }
    }
}

/// Collects the launch source and collaborators of an [`XapiCourse`].
///
/// Without a launch source the course is built not launched (inert).
#[derive(Default)]
pub struct XapiCourseBuilder {
    resolver: LaunchResolver,
    transport: Option<Arc<dyn Transport>>,
    config: Option<CourseConfig>,
    course_definition: Option<ActivityDefinition>,
}

impl XapiCourseBuilder {
    /// Create a builder with no launch source and default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Launch with these values. Takes priority over a producer or location.
    pub fn launch(mut self, input: impl Into<LaunchInput>) -> Self {
        self.resolver = self.resolver.explicit(input);
        self
    }

    /// Launch with values produced later, e.g. from a settings lookup.
    pub fn producer<F>(mut self, producer: F) -> Self
    where
        F: Future<Output = Option<LaunchInput>> + Send + 'static,
    {
        self.resolver = self.resolver.producer(producer);
        self
    }

    /// Launch URL or query string to read parameters from.
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.resolver = self.resolver.location(location);
        self
    }

    /// Use a custom transport (for testing or custom HTTP stacks).
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Override the default [`CourseConfig`].
    pub fn config(mut self, config: CourseConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Definition attached to the default statement object.
    ///
    /// Can be replaced later with [`XapiCourse::set_course_definition`].
    pub fn course_definition(mut self, definition: ActivityDefinition) -> Self {
        self.course_definition = Some(definition);
        self
    }

    /// Resolve the launch and start initialization.
    ///
    /// Partial or malformed explicit/location input fails here. A fetch-URL
    /// or producer launch needs a running tokio runtime.
    pub fn build(self) -> Result<XapiCourse, XapiError> {
        let config = self.config.unwrap_or_default();
        let id = SessionId::new();
        let resolution = self.resolver.resolve()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let log = open_log_file(config.log_dir.as_deref(), &format!("xapi-{}", id));
                Arc::new(UreqTransport::new().with_log(log))
            }
        };

        let shared = Arc::new(SessionShared::new(id));
        let chain = SessionInitializer::new(shared.clone(), transport, config.xapi_version)
            .start(resolution)?;

        Ok(XapiCourse {
            shared,
            course_definition: Mutex::new(self.course_definition),
            chain,
        })
    }
}

/// A course bound to (at most) one LRS session.
///
/// Dropping the course aborts an initialization still in flight.
pub struct XapiCourse {
    shared: Arc<SessionShared>,
    course_definition: Mutex<Option<ActivityDefinition>>,
    chain: Option<JoinHandle<()>>,
}

impl XapiCourse {
    /// Start building a course. Shorthand for [`XapiCourseBuilder::new`].
    pub fn builder() -> XapiCourseBuilder {
        XapiCourseBuilder::new()
    }

    /// Identifier of this course's session, fixed at build time.
    ///
    /// It tags every [`SessionEvent`] and names the traffic log file.
    pub fn id(&self) -> &SessionId {
        &self.shared.id
    }

    /// Wait for initialization to finish. Every caller sees the same value.
    pub async fn outcome(&self) -> SessionOutcome {
        self.shared.outcome.wait().await
    }

    /// Where initialization stands right now.
    ///
    /// Once `outcome()` has returned, this is the matching terminal state.
    pub fn state(&self) -> InitState {
        self.shared.events.state()
    }

    /// Subscribe to initialization events.
    ///
    /// Returns a receiver that will receive all future transitions and the
    /// failure report, if any. Past events are not delivered; read
    /// [`state`](Self::state) for where initialization already is.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    /// Why initialization failed, if it did. Returned to the first caller only.
    pub fn take_init_error(&self) -> Option<XapiError> {
        self.shared.take_init_error()
    }

    /// Definition attached to the default statement object from now on.
    pub fn set_course_definition(&self, definition: ActivityDefinition) {
        let mut slot = self
            .course_definition
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        *slot = Some(definition);
    }

    /// Send a statement, filling in whatever it leaves out: actor and object
    /// from the launch, the current time, and the session context merged
    /// under the statement's own.
    ///
    /// The verb is the caller's to give; a statement without one fails with
    /// `MissingField("verb")` before anything is sent.
    pub async fn send(&self, statement: PartialStatement) -> Result<LrsResponse, XapiError> {
        let Some(handle) = self.session().await? else {
            return Ok(stored_stub());
        };
        let statement = self.complete(&handle, statement)?;
        handle.client().post_statement(&statement).await
    }

    /// Send the statement `build` returns from the fully defaulted one.
    ///
    /// The defaulted statement carries `experienced` as a placeholder verb.
    /// The returned statement is sent as is: dropping the context drops the
    /// registration and template with it.
    pub async fn send_with<F>(&self, build: F) -> Result<LrsResponse, XapiError>
    where
        F: FnOnce(Statement) -> Statement,
    {
        let Some(handle) = self.session().await? else {
            return Ok(stored_stub());
        };
        let placeholder = PartialStatement::verb(verb::experienced());
        let statement = build(self.complete(&handle, placeholder)?);
        handle.client().post_statement(&statement).await
    }

    /// Send a `completed` statement about the course activity.
    pub async fn send_completed(&self) -> Result<LrsResponse, XapiError> {
        self.send(PartialStatement::verb(verb::completed())).await
    }

    /// Read a state document of the launched activity.
    pub async fn get(&self, state_id: &str) -> Result<LrsResponse, XapiError> {
        let Some(handle) = self.session().await? else {
            return Ok(LrsResponse::not_found());
        };
        handle.client().get_state(&state_params(&handle, state_id)?).await
    }

    /// Replace a state document of the launched activity.
    pub async fn put(
        &self,
        value: &Value,
        state_id: &str,
        options: &DocumentOptions,
    ) -> Result<LrsResponse, XapiError> {
        let Some(handle) = self.session().await? else {
            return Ok(LrsResponse::not_found());
        };
        handle
            .client()
            .put_state(value, &state_params(&handle, state_id)?, options)
            .await
    }

    async fn session(&self) -> Result<Option<Arc<SessionHandle>>, XapiError> {
        match self.outcome().await {
            SessionOutcome::Ready(handle) => Ok(Some(handle)),
            SessionOutcome::Inert => Ok(None),
            SessionOutcome::Error(e) => Err(e),
        }
    }

    fn complete(
        &self,
        handle: &SessionHandle,
        partial: PartialStatement,
    ) -> Result<Statement, XapiError> {
        let verb = partial.verb.ok_or(XapiError::MissingField("verb"))?;
        let object = match partial.object {
            Some(object) => object,
            None => self
                .course_activity(handle)
                .ok_or(XapiError::MissingField("object"))?,
        };
        let context = handle.composer().compose(partial.context.as_ref());

        Ok(Statement {
            id: partial.id,
            actor: partial.actor.unwrap_or_else(|| handle.actor().clone()),
            verb,
            object,
            result: partial.result,
            context: Some(context).filter(|c| c != &Context::default()),
            timestamp: Some(partial.timestamp.unwrap_or_else(Utc::now)),
        })
    }

    fn course_activity(&self, handle: &SessionHandle) -> Option<Activity> {
        let id = handle.activity_id()?;
        let definition = self
            .course_definition
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        Some(Activity {
            definition,
            ..Activity::new(id)
        })
    }
}

impl Drop for XapiCourse {
    fn drop(&mut self) {
        if let Some(chain) = self.chain.take() {
            chain.abort();
        }
    }
}

/// What an inert session answers to a statement POST.
fn stored_stub() -> LrsResponse {
    LrsResponse::new(200, Some(json!([Uuid::new_v4().to_string()])))
}

fn state_params(handle: &SessionHandle, state_id: &str) -> Result<StateParams, XapiError> {
    let activity_id = handle
        .activity_id()
        .ok_or(XapiError::MissingField("activityId"))?;
    Ok(StateParams {
        activity_id: activity_id.to_string(),
        agent: handle.actor().clone(),
        state_id: state_id.to_string(),
        registration: handle.registration().map(str::to_string),
    })
}
