use serde::{Deserialize, Serialize};

use super::{Extensions, LanguageMap};

/// Metadata describing an activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<LanguageMap>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<LanguageMap>,

    /// Activity type IRI.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub more_info: Option<String>,

    /// One of `true-false`, `choice`, `fill-in`, `long-fill-in`, `matching`,
    /// `performance`, `sequencing`, `likert`, `numeric`, `other`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_responses_pattern: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Extensions>,
}

/// The object of a statement when it is an activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,

    /// Activity IRI.
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<ActivityDefinition>,
}

impl Activity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            object_type: None,
            id: id.into(),
            definition: None,
        }
    }

    /// Activity with an explicit `"objectType": "Activity"`, as cmi5 context
    /// activities are written.
    pub fn typed(id: impl Into<String>) -> Self {
        Self {
            object_type: Some("Activity".to_string()),
            ..Self::new(id)
        }
    }
}
