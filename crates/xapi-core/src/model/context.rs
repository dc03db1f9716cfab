//! Statement context.

use serde::{Deserialize, Serialize};

use super::{Activity, Actor, Extensions};

/// Reference to another statement by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementReference {
    pub object_type: String,
    pub id: String,
}

/// Activities that provide context for a statement, by relationship.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextActivities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Vec<Activity>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub grouping: Option<Vec<Activity>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<Activity>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub other: Option<Vec<Activity>>,
}

impl ContextActivities {
    pub fn is_empty(&self) -> bool {
        self.parent.is_none()
            && self.grouping.is_none()
            && self.category.is_none()
            && self.other.is_none()
    }
}

/// Context that gives a statement more meaning.
///
/// In a cmi5 session the LMS hands out a context template in the launch data;
/// every statement sent during the session is expected to carry it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    /// Registration UUID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<Actor>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Actor>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_activities: Option<ContextActivities>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement: Option<StatementReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Extensions>,
}
