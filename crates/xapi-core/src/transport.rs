//! HTTP transport seam.
//!
//! Everything that talks to the network goes through [`Transport`]: the LRS
//! resource client, the cmi5 token exchange and the launch-data read. The
//! default [`UreqTransport`] runs blocking `ureq` calls on tokio's blocking
//! pool; tests substitute an in-memory implementation.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

use crate::error::{TransportError, XapiError};
use crate::logging::{self, log_line, LogHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One HTTP request, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct LrsRequest {
    pub method: Method,

    /// Absolute URL. `query` pairs are appended to it.
    pub url: String,

    pub query: Vec<(String, String)>,

    pub headers: Vec<(String, String)>,

    /// JSON body. Sent as `application/json` unless a `Content-Type` header is set.
    pub body: Option<Value>,
}

impl LrsRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response of any status.
#[derive(Debug, Clone, PartialEq)]
pub struct LrsResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,

    /// Decoded body. Non-JSON text is kept as a JSON string; an empty body is `None`.
    pub body: Option<Value>,
}

impl LrsResponse {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body,
        }
    }

    /// Stand-in for a document that does not exist.
    pub fn not_found() -> Self {
        Self::new(404, None)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn etag(&self) -> Option<&str> {
        self.header("ETag")
    }

    /// Statement ids returned by a statements POST.
    pub fn statement_ids(&self) -> Vec<String> {
        match &self.body {
            Some(Value::Array(ids)) => ids
                .iter()
                .filter_map(|id| id.as_str().map(str::to_string))
                .collect(),
            Some(Value::String(id)) => vec![id.clone()],
            _ => Vec::new(),
        }
    }

    /// Decode the body. `Ok(None)` when there is no body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<Option<T>, XapiError> {
        match &self.body {
            None => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
        }
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Sends one request and returns whatever the server answered.
///
/// Non-2xx statuses are returned as responses, not errors; only failures to
/// get an answer at all are a [`TransportError`]. Timeouts are the
/// implementation's concern.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, request: LrsRequest) -> Result<LrsResponse, TransportError>;
}

/// Blocking `ureq` transport moved onto tokio's blocking pool.
pub struct UreqTransport {
    agent: ureq::Agent,
    log: LogHandle,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            log: logging::disabled(),
        }
    }

    /// Record every request and response status in `log`.
    pub fn with_log(mut self, log: LogHandle) -> Self {
        self.log = log;
        self
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn request(&self, request: LrsRequest) -> Result<LrsResponse, TransportError> {
        let agent = self.agent.clone();
        let log = self.log.clone();
        let url = request.url.clone();

        tokio::task::spawn_blocking(move || send_blocking(&agent, &log, request))
            .await
            .map_err(|e| TransportError::Network {
                url,
                message: e.to_string(),
            })?
    }
}

fn send_blocking(
    agent: &ureq::Agent,
    log: &LogHandle,
    request: LrsRequest,
) -> Result<LrsResponse, TransportError> {
    log_line(log, "REQUEST", &format!("{} {}", request.method, request.url));

    let mut call = agent.request(request.method.as_str(), &request.url);
    for (name, value) in &request.query {
        call = call.query(name, value);
    }
    for (name, value) in &request.headers {
        call = call.set(name, value);
    }

    let result = match &request.body {
        Some(body) => {
            if request.header("Content-Type").is_none() {
                call = call.set("Content-Type", "application/json");
            }
            call.send_string(&body.to_string())
        }
        None => call.call(),
    };

    let response = match result {
        Ok(response) => response,
        Err(ureq::Error::Status(_, response)) => response,
        Err(ureq::Error::Transport(e)) => {
            log_line(log, "ERROR", &e.to_string());
            return Err(TransportError::Network {
                url: request.url,
                message: e.to_string(),
            });
        }
    };

    let status = response.status();
    let headers: Vec<(String, String)> = response
        .headers_names()
        .into_iter()
        .filter_map(|name| {
            let value = response.header(&name)?.to_string();
            Some((name, value))
        })
        .collect();
    let text = response
        .into_string()
        .map_err(|e| TransportError::Network {
            url: request.url.clone(),
            message: e.to_string(),
        })?;
    log_line(log, "RESPONSE", &format!("{} {}", status, request.url));

    Ok(LrsResponse {
        status,
        headers,
        body: decode_body(&text),
    })
}

fn decode_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
}
