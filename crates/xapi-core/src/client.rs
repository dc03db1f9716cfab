//! LRS resource client.
//!
//! Formats requests for the xAPI REST resources (statements, state, agent and
//! activity profiles, about) and hands them to a [`Transport`]. Holds no
//! session logic: the endpoint and authorization are fixed at construction.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

use crate::error::{TransportError, XapiError};
use crate::model::{About, Activity, Actor, Statement, StatementResult};
use crate::transport::{LrsRequest, LrsResponse, Method, Transport};

/// xAPI version sent in `X-Experience-API-Version` unless configured otherwise.
pub const XAPI_VERSION: &str = "1.0.3";

const STATE_RESOURCE: &str = "activities/state";
const STATEMENTS_RESOURCE: &str = "statements";
const ACTIVITIES_RESOURCE: &str = "activities";
const AGENT_PROFILE_RESOURCE: &str = "agents/profile";
const ACTIVITY_PROFILE_RESOURCE: &str = "activities/profile";
const ABOUT_RESOURCE: &str = "about";

/// Where the LRS lives and how to authenticate against it.
#[derive(Debug, Clone, PartialEq)]
pub struct LrsConfig {
    /// Base URL of the xAPI endpoint, e.g. `https://lrs.example.com/xapi/`.
    pub endpoint: String,

    /// Full `Authorization` header value, e.g. `Basic dXNlcjpwYXNz`.
    pub authorization: Option<String>,

    pub version: String,
}

impl LrsConfig {
    pub fn new(endpoint: impl Into<String>, authorization: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            authorization,
            version: XAPI_VERSION.to_string(),
        }
    }
}

/// Conditional-request and content options for document writes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentOptions {
    pub content_type: Option<String>,
    pub etag: Option<String>,

    /// `true` sends `If-Match`, `false` sends `If-None-Match`.
    pub match_etag: bool,
}

impl DocumentOptions {
    pub fn json() -> Self {
        Self {
            content_type: Some("application/json".to_string()),
            ..Self::default()
        }
    }

    pub fn if_match(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self.match_etag = true;
        self
    }

    pub fn if_none_match(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self.match_etag = false;
        self
    }
}

/// Key of a single state document.
#[derive(Debug, Clone, PartialEq)]
pub struct StateParams {
    pub activity_id: String,
    pub agent: Actor,
    pub state_id: String,
    pub registration: Option<String>,
}

/// Scope of a state id listing or bulk delete.
#[derive(Debug, Clone, PartialEq)]
pub struct StatesParams {
    pub activity_id: String,
    pub agent: Actor,
    pub registration: Option<String>,
    pub since: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentProfileParams {
    pub agent: Actor,
    pub profile_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityProfileParams {
    pub activity_id: String,
    pub profile_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementFormat {
    Ids,
    Exact,
    Canonical,
}

impl StatementFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementFormat::Ids => "ids",
            StatementFormat::Exact => "exact",
            StatementFormat::Canonical => "canonical",
        }
    }
}

/// Filters for a statement query. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementsParams {
    pub agent: Option<Actor>,
    pub verb: Option<String>,
    pub activity: Option<String>,
    pub registration: Option<String>,
    pub related_activities: bool,
    pub related_agents: bool,
    pub since: Option<String>,
    pub until: Option<String>,
    pub limit: Option<u32>,
    pub format: Option<StatementFormat>,
    pub attachments: bool,
    pub ascending: bool,
}

/// Client for one LRS endpoint.
#[derive(Clone)]
pub struct LrsClient {
    config: LrsConfig,
    transport: Arc<dyn Transport>,
}

impl LrsClient {
    /// Create a client for `config.endpoint`.
    ///
    /// # Arguments
    ///
    /// * `config` - Endpoint, authorization and xAPI version of every request
    /// * `transport` - Carries the requests; `UreqTransport` outside tests
    pub fn new(config: LrsConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// The settings every request of this client is built from.
    pub fn config(&self) -> &LrsConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    /// Get a state document. A missing document is a 404 response, not an error.
    pub async fn get_state(&self, params: &StateParams) -> Result<LrsResponse, XapiError> {
        let mut request = self.request(Method::Get, STATE_RESOURCE, None)?;
        request.query = state_query(params)?;
        self.send_allowing_not_found(request).await
    }

    /// List the state ids stored for an activity and agent.
    pub async fn get_state_ids(&self, params: &StatesParams) -> Result<Vec<String>, XapiError> {
        let mut request = self.request(Method::Get, STATE_RESOURCE, None)?;
        request.query = states_query(params)?;
        let response = self.send(request).await?;
        Ok(response.json::<Vec<String>>()?.unwrap_or_default())
    }

    /// Replace a state document.
    pub async fn put_state(
        &self,
        document: &Value,
        params: &StateParams,
        options: &DocumentOptions,
    ) -> Result<LrsResponse, XapiError> {
        let mut request = self.request(Method::Put, STATE_RESOURCE, Some(options))?;
        request.query = state_query(params)?;
        request.body = Some(document.clone());
        self.send(request).await
    }

    /// Merge a JSON object into a state document.
    pub async fn post_state(
        &self,
        document: &Value,
        params: &StateParams,
        options: &DocumentOptions,
    ) -> Result<LrsResponse, XapiError> {
        let mut request = self.request(Method::Post, STATE_RESOURCE, Some(options))?;
        request.query = state_query(params)?;
        request.body = Some(document.clone());
        self.send(request).await
    }

    /// Delete a state document. Deleting a missing document is not an error:
    /// a 404 comes back as the response.
    pub async fn delete_state(
        &self,
        params: &StateParams,
        options: &DocumentOptions,
    ) -> Result<LrsResponse, XapiError> {
        let mut request = self.request(Method::Delete, STATE_RESOURCE, Some(options))?;
        request.query = state_query(params)?;
        self.send_allowing_not_found(request).await
    }

    /// Delete every state document in scope.
    pub async fn delete_states(&self, params: &StatesParams) -> Result<LrsResponse, XapiError> {
        let mut request = self.request(Method::Delete, STATE_RESOURCE, None)?;
        request.query = states_query(params)?;
        self.send(request).await
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    /// Store one statement. Alias for [`post_statements`](Self::post_statements).
    pub async fn post_statement(&self, statement: &Statement) -> Result<LrsResponse, XapiError> {
        self.post_statements(std::slice::from_ref(statement)).await
    }

    /// Store statements; the response body lists their ids in order.
    pub async fn post_statements(
        &self,
        statements: &[Statement],
    ) -> Result<LrsResponse, XapiError> {
        let mut request = self.request(Method::Post, STATEMENTS_RESOURCE, None)?;
        request.body = Some(serde_json::to_value(statements)?);
        self.send(request).await
    }

    pub async fn get_statement(
        &self,
        statement_id: &str,
        format: Option<StatementFormat>,
    ) -> Result<Statement, XapiError> {
        self.get_single_statement("statementId", statement_id, format)
            .await
    }

    pub async fn get_voided_statement(
        &self,
        voided_statement_id: &str,
        format: Option<StatementFormat>,
    ) -> Result<Statement, XapiError> {
        self.get_single_statement("voidedStatementId", voided_statement_id, format)
            .await
    }

    async fn get_single_statement(
        &self,
        id_param: &str,
        id: &str,
        format: Option<StatementFormat>,
    ) -> Result<Statement, XapiError> {
        let mut request = self.request(Method::Get, STATEMENTS_RESOURCE, None)?;
        request.query.push((id_param.to_string(), id.to_string()));
        if let Some(format) = format {
            request
                .query
                .push(("format".to_string(), format.as_str().to_string()));
        }
        let response = self.send(request).await?;
        response
            .json()?
            .ok_or_else(|| XapiError::Json(format!("empty body for statement {}", id)))
    }

    pub async fn get_statements(
        &self,
        params: &StatementsParams,
    ) -> Result<StatementResult, XapiError> {
        let mut request = self.request(Method::Get, STATEMENTS_RESOURCE, None)?;
        request.query = statements_query(params)?;
        let response = self.send(request).await?;
        response
            .json()?
            .ok_or_else(|| XapiError::Json("empty statement result".to_string()))
    }

    /// Follow the `more` link of a previous [`StatementResult`].
    ///
    /// `more` is relative to the endpoint's origin, not its path.
    pub async fn get_more_statements(&self, more: &str) -> Result<StatementResult, XapiError> {
        let url = Url::parse(&self.config.endpoint)
            .and_then(|base| base.join(more))
            .map_err(|_| TransportError::InvalidEndpoint(self.config.endpoint.clone()))?;
        let mut request = LrsRequest::new(Method::Get, url.to_string());
        request.headers = self.headers(None);
        let response = self.send(request).await?;
        response
            .json()?
            .ok_or_else(|| XapiError::Json("empty statement result".to_string()))
    }

    // ------------------------------------------------------------------
    // Activities and profiles
    // ------------------------------------------------------------------

    pub async fn get_activity(&self, activity_id: &str) -> Result<Activity, XapiError> {
        let mut request = self.request(Method::Get, ACTIVITIES_RESOURCE, None)?;
        request
            .query
            .push(("activityId".to_string(), activity_id.to_string()));
        let response = self.send(request).await?;
        response
            .json()?
            .ok_or_else(|| XapiError::Json(format!("empty body for activity {}", activity_id)))
    }

    pub async fn get_agent_profile(
        &self,
        params: &AgentProfileParams,
    ) -> Result<LrsResponse, XapiError> {
        let mut request = self.request(Method::Get, AGENT_PROFILE_RESOURCE, None)?;
        request.query = agent_profile_query(params)?;
        self.send_allowing_not_found(request).await
    }

    pub async fn put_agent_profile(
        &self,
        document: &Value,
        params: &AgentProfileParams,
        options: &DocumentOptions,
    ) -> Result<LrsResponse, XapiError> {
        self.write_document(
            Method::Put,
            AGENT_PROFILE_RESOURCE,
            agent_profile_query(params)?,
            document,
            options,
        )
        .await
    }

    pub async fn post_agent_profile(
        &self,
        document: &Value,
        params: &AgentProfileParams,
        options: &DocumentOptions,
    ) -> Result<LrsResponse, XapiError> {
        self.write_document(
            Method::Post,
            AGENT_PROFILE_RESOURCE,
            agent_profile_query(params)?,
            document,
            options,
        )
        .await
    }

    pub async fn delete_agent_profile(
        &self,
        params: &AgentProfileParams,
        options: &DocumentOptions,
    ) -> Result<LrsResponse, XapiError> {
        let mut request = self.request(Method::Delete, AGENT_PROFILE_RESOURCE, Some(options))?;
        request.query = agent_profile_query(params)?;
        self.send(request).await
    }

    pub async fn get_activity_profile(
        &self,
        params: &ActivityProfileParams,
    ) -> Result<LrsResponse, XapiError> {
        let mut request = self.request(Method::Get, ACTIVITY_PROFILE_RESOURCE, None)?;
        request.query = activity_profile_query(params);
        self.send_allowing_not_found(request).await
    }

    pub async fn put_activity_profile(
        &self,
        document: &Value,
        params: &ActivityProfileParams,
        options: &DocumentOptions,
    ) -> Result<LrsResponse, XapiError> {
        self.write_document(
            Method::Put,
            ACTIVITY_PROFILE_RESOURCE,
            activity_profile_query(params),
            document,
            options,
        )
        .await
    }

    pub async fn post_activity_profile(
        &self,
        document: &Value,
        params: &ActivityProfileParams,
        options: &DocumentOptions,
    ) -> Result<LrsResponse, XapiError> {
        self.write_document(
            Method::Post,
            ACTIVITY_PROFILE_RESOURCE,
            activity_profile_query(params),
            document,
            options,
        )
        .await
    }

    pub async fn delete_activity_profile(
        &self,
        params: &ActivityProfileParams,
        options: &DocumentOptions,
    ) -> Result<LrsResponse, XapiError> {
        let mut request =
            self.request(Method::Delete, ACTIVITY_PROFILE_RESOURCE, Some(options))?;
        request.query = activity_profile_query(params);
        self.send(request).await
    }

    /// Versions and extensions the LRS supports.
    pub async fn get_about(&self) -> Result<About, XapiError> {
        let request = self.request(Method::Get, ABOUT_RESOURCE, None)?;
        let response = self.send(request).await?;
        response
            .json()?
            .ok_or_else(|| XapiError::Json("empty about document".to_string()))
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    async fn write_document(
        &self,
        method: Method,
        resource: &str,
        query: Vec<(String, String)>,
        document: &Value,
        options: &DocumentOptions,
    ) -> Result<LrsResponse, XapiError> {
        let mut request = self.request(method, resource, Some(options))?;
        request.query = query;
        request.body = Some(document.clone());
        self.send(request).await
    }

    fn request(
        &self,
        method: Method,
        resource: &str,
        options: Option<&DocumentOptions>,
    ) -> Result<LrsRequest, XapiError> {
        let mut request = LrsRequest::new(method, normalize(&self.config.endpoint, resource)?);
        request.headers = self.headers(options);
        Ok(request)
    }

    fn headers(&self, options: Option<&DocumentOptions>) -> Vec<(String, String)> {
        xapi_headers(
            &self.config.version,
            self.config.authorization.as_deref(),
            options,
        )
    }

    async fn send(&self, request: LrsRequest) -> Result<LrsResponse, XapiError> {
        let response = self.transport.request(request).await?;
        ensure_success(response, false)
    }

    /// Like `send`, but a 404 is a response rather than an error.
    async fn send_allowing_not_found(&self, request: LrsRequest) -> Result<LrsResponse, XapiError> {
        let response = self.transport.request(request).await?;
        ensure_success(response, true)
    }
}

/// Headers every xAPI request carries, plus the optional conditional ones.
pub fn xapi_headers(
    version: &str,
    authorization: Option<&str>,
    options: Option<&DocumentOptions>,
) -> Vec<(String, String)> {
    let mut headers = vec![("X-Experience-API-Version".to_string(), version.to_string())];

    if let Some(authorization) = authorization {
        headers.push(("Authorization".to_string(), authorization.to_string()));
    }

    if let Some(options) = options {
        if let Some(content_type) = &options.content_type {
            headers.push(("Content-Type".to_string(), content_type.clone()));
        }
        if let Some(etag) = &options.etag {
            let name = if options.match_etag {
                "If-Match"
            } else {
                "If-None-Match"
            };
            headers.push((name.to_string(), etag.clone()));
        }
    }

    headers
}

/// Resolve `resource` against `endpoint`, treating the endpoint as a directory.
pub fn normalize(endpoint: &str, resource: &str) -> Result<String, TransportError> {
    let base = if endpoint.ends_with('/') {
        endpoint.to_string()
    } else {
        format!("{}/", endpoint)
    };

    Url::parse(&base)
        .and_then(|url| url.join(resource))
        .map(|url| url.to_string())
        .map_err(|_| TransportError::InvalidEndpoint(base))
}

fn ensure_success(response: LrsResponse, allow_not_found: bool) -> Result<LrsResponse, XapiError> {
    if response.is_success() || (allow_not_found && response.is_not_found()) {
        return Ok(response);
    }
    let body = response
        .body
        .as_ref()
        .map(|b| match b {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_default();
    Err(TransportError::Status {
        status: response.status,
        body,
    }
    .into())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, XapiError> {
    Ok(serde_json::to_string(value)?)
}

fn state_query(params: &StateParams) -> Result<Vec<(String, String)>, XapiError> {
    let mut query = vec![
        ("activityId".to_string(), params.activity_id.clone()),
        ("stateId".to_string(), params.state_id.clone()),
        ("agent".to_string(), to_json(&params.agent)?),
    ];
    if let Some(registration) = &params.registration {
        query.push(("registration".to_string(), registration.clone()));
    }
    Ok(query)
}

fn states_query(params: &StatesParams) -> Result<Vec<(String, String)>, XapiError> {
    let mut query = vec![
        ("activityId".to_string(), params.activity_id.clone()),
        ("agent".to_string(), to_json(&params.agent)?),
    ];
    if let Some(registration) = &params.registration {
        query.push(("registration".to_string(), registration.clone()));
    }
    if let Some(since) = &params.since {
        query.push(("since".to_string(), since.clone()));
    }
    Ok(query)
}

fn agent_profile_query(params: &AgentProfileParams) -> Result<Vec<(String, String)>, XapiError> {
    Ok(vec![
        ("profileId".to_string(), params.profile_id.clone()),
        ("agent".to_string(), to_json(&params.agent)?),
    ])
}

fn activity_profile_query(params: &ActivityProfileParams) -> Vec<(String, String)> {
    vec![
        ("activityId".to_string(), params.activity_id.clone()),
        ("profileId".to_string(), params.profile_id.clone()),
    ]
}

fn statements_query(params: &StatementsParams) -> Result<Vec<(String, String)>, XapiError> {
    let mut query = Vec::new();
    let mut push = |name: &str, value: String| query.push((name.to_string(), value));

    if let Some(agent) = &params.agent {
        push("agent", to_json(agent)?);
    }
    if let Some(verb) = &params.verb {
        push("verb", verb.clone());
    }
    if let Some(activity) = &params.activity {
        push("activity", activity.clone());
    }
    if let Some(registration) = &params.registration {
        push("registration", registration.clone());
    }
    if params.related_activities {
        push("related_activities", "true".to_string());
    }
    if params.related_agents {
        push("related_agents", "true".to_string());
    }
    if let Some(since) = &params.since {
        push("since", since.clone());
    }
    if let Some(until) = &params.until {
        push("until", until.clone());
    }
    if let Some(limit) = params.limit {
        push("limit", limit.to_string());
    }
    if let Some(format) = params.format {
        push("format", format.as_str().to_string());
    }
    if params.attachments {
        push("attachments", "true".to_string());
    }
    if params.ascending {
        push("ascending", "true".to_string());
    }
    Ok(query)
}
