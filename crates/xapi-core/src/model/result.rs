use serde::{Deserialize, Serialize};

use super::Extensions;

/// Score of the agent in relation to the experience.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Score normalized to `-1.0..=1.0`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaled: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Measured outcome of a statement.
///
/// Named `XapiResult` so it does not shadow `std::result::Result`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XapiResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    /// ISO 8601 duration, e.g. `PT1M30S`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Extensions>,
}
