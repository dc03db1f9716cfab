//! Ready-made statements for the usual lifecycle verbs.
//!
//! Every factory assigns a fresh statement id and stamps the current time
//! unless a timestamp is given.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::model::{verb, Activity, Actor, Context, Extensions, Statement, Verb, XapiResult};

/// Result extension carrying progress as a 0-100 percentage.
pub const PROGRESS_EXTENSION: &str = "https://w3id.org/xapi/cmi5/result/extensions/progress";

/// Shared fields of the lifecycle factories.
#[derive(Debug, Clone)]
pub struct StatementBase {
    pub actor: Actor,
    pub object: Activity,
    pub context: Option<Context>,
    pub registration: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl StatementBase {
    pub fn new(actor: Actor, object: Activity) -> Self {
        Self {
            actor,
            object,
            context: None,
            registration: None,
            timestamp: None,
        }
    }

    pub fn context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    pub fn registration(mut self, registration: impl Into<String>) -> Self {
        self.registration = Some(registration.into());
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// `registration` overrides whatever the context carried.
    fn into_statement(self, verb: Verb) -> Statement {
        let context = match (self.context, self.registration) {
            (context, None) => context,
            (context, Some(registration)) => Some(Context {
                registration: Some(registration),
                ..context.unwrap_or_default()
            }),
        };

        Statement {
            id: Some(Uuid::new_v4().to_string()),
            actor: self.actor,
            verb,
            object: self.object,
            result: None,
            context,
            timestamp: Some(self.timestamp.unwrap_or_else(Utc::now)),
        }
    }
}

/// The actor registered for the activity. Registration is mandatory here.
pub fn registered(actor: Actor, object: Activity, registration: &str) -> Statement {
    StatementBase::new(actor, object)
        .registration(registration)
        .into_statement(verb::registered())
}

pub fn initialized(base: StatementBase) -> Statement {
    base.into_statement(verb::initialized())
}

/// `duration` is an ISO 8601 duration, e.g. `PT4M30S`.
pub fn completed(base: StatementBase, duration: &str) -> Statement {
    let mut statement = base.into_statement(verb::completed());
    statement.result = Some(XapiResult {
        completion: Some(true),
        duration: Some(duration.to_string()),
        ..XapiResult::default()
    });
    statement
}

pub fn terminated(base: StatementBase, duration: &str) -> Statement {
    let mut statement = base.into_statement(verb::terminated());
    statement.result = Some(XapiResult {
        duration: Some(duration.to_string()),
        ..XapiResult::default()
    });
    statement
}

pub fn progressed(base: StatementBase, progress: u8) -> Statement {
    let mut statement = base.into_statement(verb::progressed());
    let mut extensions = Extensions::new();
    extensions.insert(PROGRESS_EXTENSION.to_string(), Value::from(progress));
    statement.result = Some(XapiResult {
        extensions: Some(extensions),
        ..XapiResult::default()
    });
    statement
}
