//! reqwest-backed [`Transport`].
//!
//! The reqwest cookie store holds the HTTP-only renewal cookie, so refresh
//! and logout calls present it without this crate ever reading it.

use async_trait::async_trait;
use hostauth_core::models::ErrorDetail;
use hostauth_core::transport::{
    ApiRequest, ApiResponse, REQUEST_ID_HEADER, Transport, TransportError,
};
use reqwest::header::AUTHORIZATION;
use tracing::trace;
use url::Url;

use crate::SetupError;
use crate::config::ClientConfig;

/// Sends [`ApiRequest`]s over HTTP with a persistent cookie jar.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, SetupError> {
        Url::parse(&config.base_url)?;
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &serde_json::Value) -> String {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(|v| v.as_str()))
        .or_else(|| body.as_str())
        .unwrap_or_default()
        .to_string()
}

/// Field-level `errorDetails`, if the body carries a well-formed list.
fn error_details(body: &serde_json::Value) -> Vec<ErrorDetail> {
    body.get("errorDetails")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.endpoint(&request.path);
        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(REQUEST_ID_HEADER, request.request_id.to_string());

        let query: Vec<(&str, &str)> = request.effective_query().collect();
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(authorization) = request.authorization() {
            builder = builder.header(AUTHORIZATION, authorization);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        trace!(request_id = %request.request_id, method = %request.method, %url, "sending");
        let resp = builder
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| TransportError::Network(format!("reading body: {e}")))?;
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        trace!(request_id = %request.request_id, status = status.as_u16(), "received");
        if status.is_success() {
            Ok(ApiResponse::new(status, body))
        } else {
            Err(
                TransportError::from_status(status.as_u16(), error_message(&body))
                    .with_details(error_details(&body)),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let transport = HttpTransport::new(&ClientConfig::new("http://localhost:3100/api/")).unwrap();
        assert_eq!(
            transport.endpoint("/auth/me"),
            "http://localhost:3100/api/auth/me"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(HttpTransport::new(&ClientConfig::new("not a url")).is_err());
    }

    #[test]
    fn error_message_prefers_message_field() {
        let body = serde_json::json!({ "statusCode": 401, "error": "unauthorized", "message": "Token expired" });
        assert_eq!(error_message(&body), "Token expired");
        let body = serde_json::json!({ "statusCode": 401, "error": "Session expired" });
        assert_eq!(error_message(&body), "Session expired");
        assert_eq!(error_message(&serde_json::json!("plain text")), "plain text");
        assert_eq!(error_message(&serde_json::Value::Null), "");
    }

    #[test]
    fn error_details_are_parsed_when_present() {
        let body = serde_json::json!({
            "statusCode": 400,
            "error": "validation_error",
            "errorDetails": [{ "code": "required", "field": "email", "message": "Email is required" }]
        });
        let details = error_details(&body);
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].field.as_deref(), Some("email"));

        assert!(error_details(&serde_json::json!({ "errorDetails": "oops" })).is_empty());
        assert!(error_details(&serde_json::Value::Null).is_empty());
    }
}
