//! Launch parameters: the raw launch input and its validated form.

use url::form_urlencoded;

use crate::error::XapiError;
use crate::model::Actor;

/// Launch values as they arrive, any of them possibly missing.
///
/// Field names follow the launch query string: `endpoint`, `auth`, `fetch`,
/// `actor` (JSON), `registration`, `activityId`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchInput {
    pub endpoint: Option<String>,
    pub auth: Option<String>,
    pub fetch: Option<String>,
    pub actor: Option<Actor>,
    pub registration: Option<String>,
    pub activity_id: Option<String>,
}

impl LaunchInput {
    /// Parse launch values out of a location.
    ///
    /// Accepts a full URL, `?query` or a bare query. The fragment and unknown
    /// keys are ignored, empty values count as missing. An `actor` that is not
    /// a JSON agent is an error.
    pub fn from_query(location: &str) -> Result<Self, XapiError> {
        let query = match location.split_once('?') {
            Some((_, query)) => query,
            None => location,
        };
        let query = query.split('#').next().unwrap_or_default();

        let mut input = LaunchInput::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            match &*key {
                "endpoint" => input.endpoint = Some(value.into_owned()),
                "auth" => input.auth = Some(value.into_owned()),
                "fetch" => input.fetch = Some(value.into_owned()),
                "registration" => input.registration = Some(value.into_owned()),
                "activityId" => input.activity_id = Some(value.into_owned()),
                "actor" => {
                    let actor = serde_json::from_str(&value).map_err(|e| {
                        XapiError::Configuration(format!("actor is not a valid JSON agent: {}", e))
                    })?;
                    input.actor = Some(actor);
                }
                _ => {}
            }
        }
        Ok(input)
    }

    pub fn is_empty(&self) -> bool {
        self == &LaunchInput::default()
    }

    /// Validate into launch parameters.
    ///
    /// Empty input means "not launched" and yields `Ok(None)`. Anything else
    /// needs an endpoint, an actor and either `auth` or `fetch`.
    pub fn into_parameters(self) -> Result<Option<LaunchParameters>, XapiError> {
        if self.is_empty() {
            return Ok(None);
        }

        let auth = match (self.auth, self.fetch) {
            (Some(token), _) => Some(LaunchAuth::Static(token)),
            (None, Some(url)) => Some(LaunchAuth::Fetch(url)),
            (None, None) => None,
        };

        match (self.endpoint, self.actor, auth) {
            (Some(endpoint), Some(actor), Some(auth)) => Ok(Some(LaunchParameters {
                endpoint,
                auth,
                actor,
                registration: self.registration,
                activity_id: self.activity_id,
            })),
            (endpoint, actor, auth) => {
                let mut missing = Vec::new();
                if endpoint.is_none() {
                    missing.push("endpoint");
                }
                if actor.is_none() {
                    missing.push("actor");
                }
                if auth.is_none() {
                    missing.push("auth or fetch");
                }
                Err(XapiError::Configuration(format!(
                    "missing launch parameter(s): {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

/// How the session obtains its LRS credentials.
#[derive(Clone, PartialEq)]
pub enum LaunchAuth {
    /// Ready-made `Authorization` header value.
    Static(String),

    /// cmi5 fetch URL to exchange for a token.
    Fetch(String),
}

impl std::fmt::Debug for LaunchAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchAuth::Static(_) => f.write_str("Static(<redacted>)"),
            LaunchAuth::Fetch(url) => f.debug_tuple("Fetch").field(url).finish(),
        }
    }
}

/// Validated launch parameters: enough to bind a session.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchParameters {
    pub endpoint: String,
    pub auth: LaunchAuth,
    pub actor: Actor,
    pub registration: Option<String>,
    pub activity_id: Option<String>,
}

impl LaunchParameters {
    pub fn with_static_token(
        endpoint: impl Into<String>,
        authorization: impl Into<String>,
        actor: Actor,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth: LaunchAuth::Static(authorization.into()),
            actor,
            registration: None,
            activity_id: None,
        }
    }

    pub fn with_fetch_url(endpoint: impl Into<String>, fetch: impl Into<String>, actor: Actor) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth: LaunchAuth::Fetch(fetch.into()),
            actor,
            registration: None,
            activity_id: None,
        }
    }

    pub fn registration(mut self, registration: impl Into<String>) -> Self {
        self.registration = Some(registration.into());
        self
    }

    pub fn activity_id(mut self, activity_id: impl Into<String>) -> Self {
        self.activity_id = Some(activity_id.into());
        self
    }

    pub fn fetch_url(&self) -> Option<&str> {
        match &self.auth {
            LaunchAuth::Fetch(url) => Some(url),
            LaunchAuth::Static(_) => None,
        }
    }
}

impl From<LaunchParameters> for LaunchInput {
    fn from(params: LaunchParameters) -> Self {
        let (auth, fetch) = match params.auth {
            LaunchAuth::Static(token) => (Some(token), None),
            LaunchAuth::Fetch(url) => (None, Some(url)),
        };
        Self {
            endpoint: Some(params.endpoint),
            auth,
            fetch,
            actor: Some(params.actor),
            registration: params.registration,
            activity_id: params.activity_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTOR: &str = "%7B%22mbox%22%3A%22mailto%3Aann%40example.com%22%7D";

    mod from_query {
        use super::*;

        #[test]
        fn parses_full_launch_url() {
            let url = format!(
                "https://course.example.com/index.html?endpoint=https%3A%2F%2Flrs%2Fxapi&fetch=https%3A%2F%2Flms%2Ftoken&actor={}&registration=r-1&activityId=https%3A%2F%2Fcourse#top",
                ACTOR
            );
            let input = LaunchInput::from_query(&url).unwrap();

            assert_eq!(input.endpoint.as_deref(), Some("https://lrs/xapi"));
            assert_eq!(input.fetch.as_deref(), Some("https://lms/token"));
            assert_eq!(input.registration.as_deref(), Some("r-1"));
            assert_eq!(input.activity_id.as_deref(), Some("https://course"));
            assert_eq!(
                input.actor.unwrap().mbox.as_deref(),
                Some("mailto:ann@example.com")
            );
        }

        #[test]
        fn accepts_bare_query() {
            let input = LaunchInput::from_query("endpoint=https%3A%2F%2Flrs&auth=Basic%20abc").unwrap();
            assert_eq!(input.endpoint.as_deref(), Some("https://lrs"));
            assert_eq!(input.auth.as_deref(), Some("Basic abc"));
        }

        #[test]
        fn no_query_is_empty() {
            let input = LaunchInput::from_query("https://course.example.com/index.html").unwrap();
            assert!(input.is_empty());
        }

        #[test]
        fn empty_values_and_unknown_keys_are_ignored() {
            let input = LaunchInput::from_query("?endpoint=&lang=en").unwrap();
            assert!(input.is_empty());
        }

        #[test]
        fn malformed_actor_is_configuration_error() {
            let err = LaunchInput::from_query("?actor=%7Bnot-json").unwrap_err();
            assert!(matches!(err, XapiError::Configuration(msg) if msg.contains("actor")));
        }
    }

    mod into_parameters {
        use super::*;

        fn actor() -> Actor {
            Actor::mbox("Ann", "ann@example.com")
        }

        #[test]
        fn empty_input_is_no_launch() {
            assert_eq!(LaunchInput::default().into_parameters().unwrap(), None);
        }

        #[test]
        fn static_token_launch() {
            let input = LaunchInput {
                endpoint: Some("https://lrs".to_string()),
                auth: Some("Basic abc".to_string()),
                actor: Some(actor()),
                ..LaunchInput::default()
            };
            let params = input.into_parameters().unwrap().unwrap();
            assert_eq!(params.auth, LaunchAuth::Static("Basic abc".to_string()));
            assert_eq!(params.fetch_url(), None);
        }

        #[test]
        fn static_token_wins_over_fetch() {
            let input = LaunchInput {
                endpoint: Some("https://lrs".to_string()),
                auth: Some("Basic abc".to_string()),
                fetch: Some("https://lms/fetch".to_string()),
                actor: Some(actor()),
                ..LaunchInput::default()
            };
            let params = input.into_parameters().unwrap().unwrap();
            assert!(matches!(params.auth, LaunchAuth::Static(_)));
        }

        #[test]
        fn fetch_launch() {
            let input = LaunchInput {
                endpoint: Some("https://lrs".to_string()),
                fetch: Some("https://lms/fetch".to_string()),
                actor: Some(actor()),
                ..LaunchInput::default()
            };
            let params = input.into_parameters().unwrap().unwrap();
            assert_eq!(params.fetch_url(), Some("https://lms/fetch"));
        }

        #[test]
        fn partial_input_names_what_is_missing() {
            let input = LaunchInput {
                endpoint: Some("https://lrs".to_string()),
                ..LaunchInput::default()
            };
            let err = input.into_parameters().unwrap_err();
            assert_eq!(
                err,
                XapiError::Configuration(
                    "missing launch parameter(s): actor, auth or fetch".to_string()
                )
            );
        }

        #[test]
        fn round_trips_through_input() {
            let params = LaunchParameters::with_fetch_url("https://lrs", "https://lms/f", actor())
                .registration("r-1")
                .activity_id("https://course");
            let back = LaunchInput::from(params.clone()).into_parameters().unwrap();
            assert_eq!(back, Some(params));
        }
    }

    #[test]
    fn debug_redacts_static_token() {
        let auth = LaunchAuth::Static("Basic secret".to_string());
        assert_eq!(format!("{:?}", auth), "Static(<redacted>)");
    }
}
