//! cmi5 defined statements and their IRIs.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::data::{LaunchMode, MoveOn};
use crate::model::{verb, Activity, Actor, Context, ContextActivities, Extensions, Statement, Verb};

pub const CMI5_CATEGORY: &str = "https://w3id.org/xapi/cmi5/context/categories/cmi5";
pub const MOVE_ON_CATEGORY: &str = "https://w3id.org/xapi/cmi5/context/categories/moveon";

pub const SESSION_ID_EXTENSION: &str = "https://w3id.org/xapi/cmi5/context/extensions/sessionid";
pub const MASTERY_SCORE_EXTENSION: &str =
    "https://w3id.org/xapi/cmi5/context/extensions/masteryscore";
pub const LAUNCH_MODE_EXTENSION: &str = "https://w3id.org/xapi/cmi5/context/extensions/launchmode";
pub const LAUNCH_URL_EXTENSION: &str = "https://w3id.org/xapi/cmi5/context/extensions/launchurl";
pub const MOVE_ON_EXTENSION: &str = "https://w3id.org/xapi/cmi5/context/extensions/moveon";
pub const LAUNCH_PARAMETERS_EXTENSION: &str =
    "https://w3id.org/xapi/cmi5/context/extensions/launchparameters";

/// The `cmi5` category activity every cmi5 defined statement carries.
pub fn cmi5_category() -> Activity {
    Activity::typed(CMI5_CATEGORY)
}

pub fn move_on_category() -> Activity {
    Activity::typed(MOVE_ON_CATEGORY)
}

/// Context extensions of cmi5 defined statements. Only the session id is
/// mandatory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cmi5Extensions {
    pub session_id: String,
    pub launch_mode: Option<LaunchMode>,
    pub launch_url: Option<String>,
    pub move_on: Option<MoveOn>,
    pub mastery_score: Option<f64>,
    pub launch_parameters: Option<String>,
}

impl Cmi5Extensions {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Self::default()
        }
    }

    pub fn to_extensions(&self) -> Extensions {
        let mut extensions = Extensions::new();
        extensions.insert(
            SESSION_ID_EXTENSION.to_string(),
            Value::String(self.session_id.clone()),
        );
        if let Some(mode) = self.launch_mode {
            extensions.insert(LAUNCH_MODE_EXTENSION.to_string(), mode.as_str().into());
        }
        if let Some(url) = &self.launch_url {
            extensions.insert(LAUNCH_URL_EXTENSION.to_string(), url.as_str().into());
        }
        if let Some(move_on) = self.move_on {
            extensions.insert(MOVE_ON_EXTENSION.to_string(), move_on.as_str().into());
        }
        if let Some(score) = self.mastery_score {
            extensions.insert(MASTERY_SCORE_EXTENSION.to_string(), score.into());
        }
        if let Some(params) = &self.launch_parameters {
            extensions.insert(LAUNCH_PARAMETERS_EXTENSION.to_string(), params.as_str().into());
        }
        extensions
    }
}

/// The LMS launched the AU. Written by the LMS, not the AU itself.
pub fn launched(
    actor: Actor,
    activity: Activity,
    extensions: &Cmi5Extensions,
    publisher: Activity,
    registration: &str,
    timestamp: Option<DateTime<Utc>>,
) -> Statement {
    defined_statement(
        verb::launched(),
        actor,
        activity,
        extensions,
        publisher,
        registration,
        timestamp,
    )
}

/// The AU is ready for the learner. Only `session_id` and
/// `mastery_score` belong in `extensions` here.
pub fn initialized(
    actor: Actor,
    activity: Activity,
    extensions: &Cmi5Extensions,
    publisher: Activity,
    registration: &str,
    timestamp: Option<DateTime<Utc>>,
) -> Statement {
    defined_statement(
        verb::initialized(),
        actor,
        activity,
        extensions,
        publisher,
        registration,
        timestamp,
    )
}

fn defined_statement(
    verb: Verb,
    actor: Actor,
    activity: Activity,
    extensions: &Cmi5Extensions,
    publisher: Activity,
    registration: &str,
    timestamp: Option<DateTime<Utc>>,
) -> Statement {
    Statement {
        id: Some(Uuid::new_v4().to_string()),
        actor,
        verb,
        object: activity,
        result: None,
        context: Some(Context {
            registration: Some(registration.to_string()),
            context_activities: Some(ContextActivities {
                grouping: Some(vec![publisher]),
                category: Some(vec![cmi5_category()]),
                ..ContextActivities::default()
            }),
            extensions: Some(extensions.to_extensions()),
            ..Context::default()
        }),
        timestamp: Some(timestamp.unwrap_or_else(Utc::now)),
    }
}
