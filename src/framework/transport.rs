//! # Transport
//!
//! The engine never speaks HTTP itself. It hands a [`RequestDescriptor`] to a
//! [`Transport`] and gets back a [`Response`]. Connection pooling, TLS and
//! timeouts all live behind this seam; retries are deliberately absent, so one
//! call is always one terminal outcome.

use async_trait::async_trait;
use serde_json::{json, Value as Json};
use tracing::warn;

use crate::framework::descriptor::{Method, RequestDescriptor};

/// The result of executing one descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: u16,
    body: Json,
    reason: Option<String>,
}

impl Response {
    pub fn new(status: u16, body: Json) -> Self {
        Self {
            status,
            body,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// A success marker for resources hydrated from a collection page. No
    /// request produced it.
    pub fn synthetic() -> Self {
        Self::new(200, Json::Null).with_reason("synthetic")
    }

    /// Failure used when the request never reached the platform.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(0, json!({ "error": { "message": message.into() } })).with_reason("transport error")
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &Json {
        &self.body
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The platform's error message (`error.message`), when it sent one.
    pub fn error_message(&self) -> Option<&str> {
        self.body
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
    }

    /// The best available description of a failure, for error collections.
    pub fn failure_message(&self) -> String {
        self.error_message()
            .or(self.reason.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("request failed with status {}", self.status))
    }
}

/// The single capability the engine needs from the network.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &RequestDescriptor) -> Response;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Clone, Default)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Delete => reqwest::Method::DELETE,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
        }
    }

    async fn send(&self, request: &RequestDescriptor) -> Result<Response, reqwest::Error> {
        // Strings go out bare, everything else JSON-encoded (arrays, filters).
        let query: Vec<(&str, String)> = request
            .query()
            .iter()
            .map(|(k, v)| match v {
                Json::String(s) => (k.as_str(), s.clone()),
                other => (k.as_str(), other.to_string()),
            })
            .collect();

        let mut builder = self
            .http
            .request(Self::method(request.method()), request.url())
            .query(&query);
        for (key, value) in request.headers() {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.json_body() {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body = if text.is_empty() {
            Json::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Json::String(text))
        };

        let mut response = Response::new(status.as_u16(), body);
        if let Some(reason) = status.canonical_reason() {
            response = response.with_reason(reason);
        }
        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &RequestDescriptor) -> Response {
        match self.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(method = %request.method(), url = request.url(), error = %e, "Request did not complete");
                Response::unreachable(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        assert!(Response::new(200, Json::Null).is_success());
        assert!(Response::new(204, Json::Null).is_success());
        assert!(!Response::new(400, Json::Null).is_success());
        assert!(!Response::unreachable("dns").is_success());
    }

    #[test]
    fn test_error_message() {
        let response = Response::new(400, json!({ "error": { "message": "no no no" } }));
        assert_eq!(response.error_message(), Some("no no no"));
        assert_eq!(Response::synthetic().error_message(), None);
    }

    #[test]
    fn test_failure_message_falls_back_to_reason() {
        let response = Response::new(502, Json::Null).with_reason("Bad Gateway");
        assert_eq!(response.reason(), Some("Bad Gateway"));
        assert_eq!(response.failure_message(), "Bad Gateway");
        assert_eq!(Response::new(418, Json::Null).failure_message(), "request failed with status 418");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_failed_response() {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .unwrap();
        let transport = HttpTransport::with_client(http);

        let response = transport
            .execute(&RequestDescriptor::get("http://127.0.0.1:1/v11.0/me"))
            .await;

        assert_eq!(response.status(), 0);
        assert_eq!(response.reason(), Some("transport error"));
        assert!(response.error_message().is_some());
    }
}
