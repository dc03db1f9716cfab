//! Statements, the records sent to the LRS.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Activity, Actor, Context, Extensions, Verb, XapiResult};

/// A complete statement: actor, verb, object and optional extras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    /// Statement UUID. Assigned by the LRS when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub actor: Actor,

    pub verb: Verb,

    pub object: Activity,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<XapiResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A statement with any property left out.
///
/// Omitted properties are filled from session defaults before sending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialStatement {
    pub id: Option<String>,
    pub actor: Option<Actor>,
    pub verb: Option<Verb>,
    pub object: Option<Activity>,
    pub result: Option<XapiResult>,
    pub context: Option<Context>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl PartialStatement {
    pub fn verb(verb: Verb) -> Self {
        Self {
            verb: Some(verb),
            ..Self::default()
        }
    }

    pub fn with_object(mut self, object: Activity) -> Self {
        self.object = Some(object);
        self
    }

    pub fn with_result(mut self, result: XapiResult) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }
}

impl From<Statement> for PartialStatement {
    fn from(statement: Statement) -> Self {
        Self {
            id: statement.id,
            actor: Some(statement.actor),
            verb: Some(statement.verb),
            object: Some(statement.object),
            result: statement.result,
            context: statement.context,
            timestamp: statement.timestamp,
        }
    }
}

/// One page of a statement query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementResult {
    pub statements: Vec<Statement>,

    /// Relative IRL for the next page, if any.
    #[serde(default)]
    pub more: Option<String>,
}

/// Versions and extensions supported by an LRS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct About {
    pub version: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Extensions>,
}
