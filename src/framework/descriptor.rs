//! # Request Descriptors
//!
//! A [`RequestDescriptor`] describes exactly one HTTP operation. Resource kinds
//! build them (`create_request`, `index_request`, ...) and the engine hands them
//! to the [`Transport`](crate::framework::Transport) untouched.
//!
//! Descriptors are immutable once built: the builder methods consume `self`
//! and there are no setters.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::framework::error::ResourceError;

/// Ordered query parameters, filters, or a JSON body.
pub type Params = IndexMap<String, Json>;

/// Keys whose values never reach the logs.
const FILTERED_PARAMS: &[&str] = &["access_token", "client_secret", "fb_exchange_token"];

/// The HTTP verbs a descriptor may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Delete,
    Post,
    Put,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Delete => "DELETE",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "DELETE" => Ok(Method::Delete),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            other => Err(ResourceError::Request(format!(
                "request method was {other}, must be one of GET, HEAD, DELETE, POST, PUT, PATCH"
            ))),
        }
    }
}

/// One HTTP operation: `{method, url, params?, headers?, body?}`.
#[derive(Clone, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    url: String,
    params: Params,
    headers: IndexMap<String, String>,
    body: Option<Params>,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: Params::new(),
            headers: IndexMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    /// Adds one query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Json>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Merges query parameters; later keys win.
    pub fn params(mut self, params: Params) -> Self {
        self.params.extend(params);
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the JSON body, replacing any previous one.
    pub fn body(mut self, body: Params) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn query(&self) -> &Params {
        &self.params
    }

    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    pub fn json_body(&self) -> Option<&Params> {
        self.body.as_ref()
    }
}

fn redacted(params: &Params) -> IndexMap<&str, String> {
    params
        .iter()
        .map(|(k, v)| {
            if FILTERED_PARAMS.contains(&k.as_str()) {
                (k.as_str(), "[FILTERED]".to_string())
            } else {
                (k.as_str(), v.to_string())
            }
        })
        .collect()
}

// Secrets are masked so descriptors can be logged with `?descriptor`.
impl fmt::Debug for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("RequestDescriptor");
        s.field("method", &self.method).field("url", &self.url);
        if !self.params.is_empty() {
            s.field("params", &redacted(&self.params));
        }
        if !self.headers.is_empty() {
            s.field("headers", &self.headers.keys().collect::<Vec<_>>());
        }
        if let Some(body) = &self.body {
            s.field("body", &redacted(body));
        }
        s.finish()
    }
}
