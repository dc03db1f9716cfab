//! cmi5 launch data: the state document the LMS writes before launch.

use serde::{Deserialize, Serialize};

use super::params::LaunchParameters;
use crate::client::{LrsClient, StateParams};
use crate::error::XapiError;
use crate::model::Context;

/// Reserved state id of the launch data document.
pub const LAUNCH_DATA_STATE_ID: &str = "LMS.LaunchData";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchMode {
    Normal,
    Browse,
    Review,
}

impl LaunchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LaunchMode::Normal => "Normal",
            LaunchMode::Browse => "Browse",
            LaunchMode::Review => "Review",
        }
    }
}

/// What the learner must do for the AU to be satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOn {
    Passed,
    Completed,
    CompletedAndPassed,
    CompletedOrPassed,
    NotApplicable,
}

impl MoveOn {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveOn::Passed => "Passed",
            MoveOn::Completed => "Completed",
            MoveOn::CompletedAndPassed => "CompletedAndPassed",
            MoveOn::CompletedOrPassed => "CompletedOrPassed",
            MoveOn::NotApplicable => "NotApplicable",
        }
    }
}

/// Present only if the course structure declares one for the AU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementKey {
    pub course_structure: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchData {
    /// Context every statement of the session must carry.
    pub context_template: Context,

    pub launch_mode: LaunchMode,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_parameters: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mastery_score: Option<f64>,

    pub move_on: MoveOn,

    #[serde(rename = "returnURL", skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entitlement_key: Option<EntitlementKey>,
}

/// Reads `LMS.LaunchData` for the launched activity, actor and registration.
pub struct LaunchDataFetcher {
    client: LrsClient,
}

impl LaunchDataFetcher {
    /// `client` must already carry the session's authorization.
    pub fn new(client: LrsClient) -> Self {
        Self { client }
    }

    /// Every failure is [`XapiError::LaunchData`]. A missing document is a
    /// failure too: an LMS that launches with a fetch URL must have written it.
    pub async fn fetch(&self, params: &LaunchParameters) -> Result<LaunchData, XapiError> {
        let activity_id = params
            .activity_id
            .clone()
            .ok_or_else(|| XapiError::LaunchData("launch has no activityId".to_string()))?;

        let state = StateParams {
            activity_id,
            agent: params.actor.clone(),
            state_id: LAUNCH_DATA_STATE_ID.to_string(),
            registration: params.registration.clone(),
        };

        let response = self
            .client
            .get_state(&state)
            .await
            .map_err(|e| XapiError::LaunchData(e.to_string()))?;

        if response.is_not_found() {
            return Err(XapiError::LaunchData("no launch data document".to_string()));
        }

        response
            .json::<LaunchData>()
            .map_err(|e| XapiError::LaunchData(e.to_string()))?
            .ok_or_else(|| XapiError::LaunchData("launch data document is empty".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::LrsConfig;
    use crate::model::Actor;
    use crate::testing::MockTransport;
    use crate::transport::{LrsResponse, Method};
    use serde_json::json;

    fn launch_data_json() -> serde_json::Value {
        json!({
            "contextTemplate": {
                "contextActivities": {
                    "grouping": [{"id": "https://publisher/au/1"}]
                },
                "extensions": {
                    "https://w3id.org/xapi/cmi5/context/extensions/sessionid": "s-1"
                }
            },
            "launchMode": "Normal",
            "masteryScore": 0.8,
            "moveOn": "CompletedOrPassed",
            "returnURL": "https://lms/return"
        })
    }

    fn params() -> LaunchParameters {
        LaunchParameters::with_fetch_url(
            "https://lrs/xapi",
            "https://lms/fetch",
            Actor::mbox("Ann", "ann@example.com"),
        )
        .registration("r-1")
        .activity_id("https://course/au/1")
    }

    fn fetcher(response: LrsResponse) -> (LaunchDataFetcher, std::sync::Arc<MockTransport>) {
        let transport = MockTransport::responding(move |_| Ok(response.clone()));
        let client = LrsClient::new(
            LrsConfig::new("https://lrs/xapi", Some("Basic dG9r".to_string())),
            transport.clone(),
        );
        (LaunchDataFetcher::new(client), transport)
    }

    mod decode {
        use super::*;

        #[test]
        fn reads_cmi5_field_names() {
            let data: LaunchData = serde_json::from_value(launch_data_json()).unwrap();
            assert_eq!(data.launch_mode, LaunchMode::Normal);
            assert_eq!(data.move_on, MoveOn::CompletedOrPassed);
            assert_eq!(data.mastery_score, Some(0.8));
            assert_eq!(data.return_url.as_deref(), Some("https://lms/return"));
            assert!(data.entitlement_key.is_none());
        }

        #[test]
        fn writes_return_url_spelling() {
            let data: LaunchData = serde_json::from_value(launch_data_json()).unwrap();
            let value = serde_json::to_value(&data).unwrap();
            assert_eq!(value["returnURL"], "https://lms/return");
            assert!(value.get("launchParameters").is_none());
        }
    }

    mod fetch {
        use super::*;

        #[tokio::test]
        async fn reads_launch_data_state() {
            let (fetcher, transport) =
                fetcher(LrsResponse::new(200, Some(launch_data_json())));
            let data = fetcher.fetch(&params()).await.unwrap();
            assert_eq!(data.move_on, MoveOn::CompletedOrPassed);

            let request = transport.only_request();
            assert_eq!(request.method, Method::Get);
            assert_eq!(request.url, "https://lrs/xapi/activities/state");
            assert_eq!(request.query_param("stateId"), Some(LAUNCH_DATA_STATE_ID));
            assert_eq!(request.query_param("activityId"), Some("https://course/au/1"));
            assert_eq!(request.query_param("registration"), Some("r-1"));
            assert_eq!(request.header("Authorization"), Some("Basic dG9r"));
        }

        #[tokio::test]
        async fn empty_body_is_an_error() {
            let (fetcher, _) = fetcher(LrsResponse::new(200, None));
            let err = fetcher.fetch(&params()).await.unwrap_err();
            assert!(matches!(err, XapiError::LaunchData(_)));
        }

        #[tokio::test]
        async fn missing_document_is_an_error() {
            let (fetcher, _) = fetcher(LrsResponse::not_found());
            let err = fetcher.fetch(&params()).await.unwrap_err();
            assert!(matches!(err, XapiError::LaunchData(_)));
        }

        #[tokio::test]
        async fn server_error_is_an_error() {
            let (fetcher, _) = fetcher(LrsResponse::new(500, Some(json!("boom"))));
            let err = fetcher.fetch(&params()).await.unwrap_err();
            assert!(matches!(err, XapiError::LaunchData(msg) if msg.contains("500")));
        }

        #[tokio::test]
        async fn undecodable_body_is_an_error() {
            let (fetcher, _) = fetcher(LrsResponse::new(200, Some(json!({"launchMode": "Sideways"}))));
            let err = fetcher.fetch(&params()).await.unwrap_err();
            assert!(matches!(err, XapiError::LaunchData(_)));
        }

        #[tokio::test]
        async fn missing_activity_id_makes_no_request() {
            let (fetcher, transport) = fetcher(LrsResponse::new(200, Some(launch_data_json())));
            let mut params = params();
            params.activity_id = None;
            let err = fetcher.fetch(&params).await.unwrap_err();
            assert!(matches!(err, XapiError::LaunchData(_)));
            assert_eq!(transport.request_count(), 0);
        }
    }
}
