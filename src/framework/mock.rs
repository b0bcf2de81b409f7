//! # Mock Transport
//!
//! Utilities for testing resources without a network.
//!
//! [`MockTransport`] answers requests from a queue of expectations and keeps a
//! log of every request it saw, so it doubles as a transport spy.
//!
//! # Example
//! ```ignore
//! let mock = MockTransport::new();
//! mock.expect(Method::Get, "https://graph.facebook.com/v11.0/123")
//!     .return_ok(json!({ "id": "123", "name": "Spring" }));
//!
//! let client = Client::new(Arc::new(mock.clone()), "https://graph.facebook.com/v11.0");
//! let campaign = Resource::<Campaign>::find(&client, "123").await?;
//!
//! mock.verify(); // Ensures all expectations were met
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value as Json};

use crate::framework::descriptor::{Method, RequestDescriptor};
use crate::framework::transport::{Response, Transport};

/// An expected request and the response to answer it with.
struct Expectation {
    method: Option<Method>,
    url: Option<String>,
    response: Response,
}

/// A scripted [`Transport`].
///
/// Clones share the same expectations and request log.
#[derive(Clone, Default)]
pub struct MockTransport {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    requests: Arc<Mutex<Vec<RequestDescriptor>>>,
}

impl MockTransport {
    /// Creates a mock with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a request with this method and URL (query parameters are not
    /// part of the URL).
    pub fn expect(&self, method: Method, url: impl Into<String>) -> ExpectationBuilder {
        ExpectationBuilder {
            method: Some(method),
            url: Some(url.into()),
            expectations: self.expectations.clone(),
        }
    }

    /// Expects any request.
    pub fn expect_any(&self) -> ExpectationBuilder {
        ExpectationBuilder {
            method: None,
            url: None,
            expectations: self.expectations.clone(),
        }
    }

    /// Every request executed so far, in order.
    pub fn requests(&self) -> Vec<RequestDescriptor> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: &RequestDescriptor) -> Response {
        self.requests.lock().unwrap().push(request.clone());

        let expectation = self.expectations.lock().unwrap().pop_front();
        let Some(expectation) = expectation else {
            panic!("Unexpected request: {request:?}");
        };

        if let Some(method) = expectation.method {
            assert_eq!(request.method(), method, "Unexpected method for {}", request.url());
        }
        if let Some(url) = &expectation.url {
            assert_eq!(request.url(), url, "Unexpected url");
        }
        expectation.response
    }
}

/// Builder for one expectation.
pub struct ExpectationBuilder {
    method: Option<Method>,
    url: Option<String>,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl ExpectationBuilder {
    /// Answers with `200 OK` and this body.
    pub fn return_ok(self, body: Json) {
        self.return_status(200, body);
    }

    /// Answers with an arbitrary status and body.
    pub fn return_status(self, status: u16, body: Json) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation {
            method: self.method,
            url: self.url,
            response: Response::new(status, body),
        });
    }

    /// Answers with a platform error (`{"error": {"message": ..}}`).
    pub fn return_error(self, status: u16, message: &str) {
        self.return_status(status, json!({ "error": { "message": message } }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_answers_in_order_and_logs() {
        let mock = MockTransport::new();
        mock.expect(Method::Get, "https://x/1").return_ok(json!({ "id": "1" }));
        mock.expect_any().return_error(400, "bad");

        let first = mock.execute(&RequestDescriptor::get("https://x/1")).await;
        let second = mock.execute(&RequestDescriptor::post("https://x/2")).await;

        assert_eq!(first.body()["id"], "1");
        assert_eq!(second.error_message(), Some("bad"));
        assert_eq!(mock.request_count(), 2);
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Unexpected request")]
    async fn test_unexpected_request_panics() {
        let mock = MockTransport::new();
        mock.execute(&RequestDescriptor::get("https://x/1")).await;
    }

    #[test]
    #[should_panic(expected = "Not all expectations were met")]
    fn test_verify_panics_on_leftovers() {
        let mock = MockTransport::new();
        mock.expect_any().return_ok(Json::Null);
        mock.verify();
    }
}
