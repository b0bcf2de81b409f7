//! # Client
//!
//! The immutable connection value threaded through every resource and
//! relation: which transport to use, where the platform lives, and under which
//! credentials and policy. Cloning is cheap (the transport is shared).

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::framework::descriptor::RequestDescriptor;
use crate::framework::transport::{Response, Transport};

/// The process policy for lenient-vs-strict behavior.
///
/// - `strict_associations`: belongs-to accessors use `find_strict` (raising
///   `RecordNotFound`) instead of `find`.
/// - `strict_pagination`: a failed page raises `PageNotLoaded`; when off, the
///   enumeration simply ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub strict_associations: bool,
    pub strict_pagination: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            strict_associations: false,
            strict_pagination: true,
        }
    }
}

#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    base_url: String,
    api_version: String,
    access_token: Option<String>,
    policy: Policy,
}

impl Client {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_version: String::new(),
            access_token: None,
            policy: Policy::default(),
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// `base_url` joined with a path.
    pub fn url(&self, path: impl fmt::Display) -> String {
        format!("{}/{}", self.base_url, path.to_string().trim_start_matches('/'))
    }

    /// Executes one descriptor: exactly one round trip, one outcome.
    pub async fn execute(&self, request: &RequestDescriptor) -> Response {
        debug!(?request, "Sending request");
        let response = self.transport.execute(request).await;
        if response.is_success() {
            debug!(method = %request.method(), url = request.url(), status = response.status(), "Request succeeded");
        } else {
            warn!(
                method = %request.method(),
                url = request.url(),
                status = response.status(),
                error = response.error_message().unwrap_or_default(),
                "Request failed"
            );
        }
        response
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("access_token", &self.access_token.as_ref().map(|_| "[FILTERED]"))
            .field("policy", &self.policy)
            .finish()
    }
}
