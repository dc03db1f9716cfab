//! cmi5 fetch-URL token exchange.

use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::error::XapiError;
use crate::transport::{LrsRequest, Method, Transport};

/// Body of a fetch URL response: a token or an error, per cmi5.
#[derive(Debug, Default, Deserialize)]
struct FetchResponse {
    #[serde(rename = "auth-token")]
    auth_token: Option<String>,

    #[serde(rename = "error-code")]
    error_code: Option<Value>,

    #[serde(rename = "error-text")]
    error_text: Option<String>,
}

/// Trades a one-time fetch URL for an LRS token.
///
/// Makes exactly one POST per call and never retries: cmi5 fetch URLs are
/// single use, a second attempt would be rejected anyway.
pub struct AuthorizationExchanger {
    transport: Arc<dyn Transport>,
}

impl AuthorizationExchanger {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn exchange(&self, fetch_url: &str) -> Result<String, XapiError> {
        let response = self
            .transport
            .request(LrsRequest::new(Method::Post, fetch_url))
            .await
            .map_err(|e| XapiError::AuthExchange(e.to_string()))?;

        let body = match &response.body {
            Some(value @ Value::Object(_)) => {
                serde_json::from_value::<FetchResponse>(value.clone()).unwrap_or_default()
            }
            _ => FetchResponse::default(),
        };

        if let Some(token) = body.auth_token.filter(|t| !t.is_empty()) {
            return Ok(token);
        }

        match (body.error_code, body.error_text) {
            (None, None) => Err(XapiError::AuthExchange(format!(
                "unexpected fetch response (HTTP {})",
                response.status
            ))),
            (code, text) => {
                let code = code
                    .map(|c| match c {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .unwrap_or_else(|| "unknown".to_string());
                Err(XapiError::AuthExchange(format!(
                    "error-code {}: {}",
                    code,
                    text.unwrap_or_default()
                )))
            }
        }
    }
}
