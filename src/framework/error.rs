//! Error types for the resource engine.

use std::fmt;

use serde_json::{Map, Value as Json};
use thiserror::Error;

use crate::framework::transport::Response;
use crate::framework::validation::Errors;

/// What a record error remembers about the resource that failed.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSnapshot {
    pub kind: &'static str,
    pub id: Option<Json>,
    /// Attributes under their wire names.
    pub attributes: Map<String, Json>,
    pub errors: Errors,
}

impl fmt::Display for RecordSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(Json::String(id)) => write!(f, "{} {id}", self.kind),
            Some(id) => write!(f, "{} {id}", self.kind),
            None => write!(f, "new {}", self.kind),
        }
    }
}

/// Errors raised by resource operations.
///
/// The non-strict operations only ever return [`ResourceError::Request`];
/// every other variant comes from a `*_strict` form or from the strict
/// pagination policy.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Local validation failed; no request was sent.
    #[error("{record} is invalid: {}", .record.errors)]
    RecordInvalid { record: Box<RecordSnapshot> },

    #[error("{record} was not saved: {}", .response.failure_message())]
    RecordNotSaved {
        record: Box<RecordSnapshot>,
        response: Box<Response>,
    },

    #[error("{record} was not found: {}", .response.failure_message())]
    RecordNotFound {
        record: Box<RecordSnapshot>,
        response: Box<Response>,
    },

    #[error("{record} was not deleted: {}", .response.failure_message())]
    RecordNotDeleted {
        record: Box<RecordSnapshot>,
        response: Box<Response>,
    },

    #[error("{record} was not linked: {}", .response.failure_message())]
    RecordNotLinked {
        record: Box<RecordSnapshot>,
        response: Box<Response>,
    },

    #[error("{record} was not unlinked: {}", .response.failure_message())]
    RecordNotUnlinked {
        record: Box<RecordSnapshot>,
        response: Box<Response>,
    },

    /// The request could not be built. Raised before any transport attempt.
    #[error("Invalid request: {0}")]
    Request(String),

    /// A collection page failed under the strict pagination policy.
    #[error("Page of {kind} was not loaded: {}", .response.failure_message())]
    PageNotLoaded {
        kind: &'static str,
        response: Box<Response>,
    },

    #[error("Login failed: {}", .response.failure_message())]
    Login { response: Box<Response> },

    #[error("Unknown attribute `{name}` for {kind}")]
    UnknownAttribute { kind: &'static str, name: String },
}

impl ResourceError {
    /// The raw response carried by transport-failure variants.
    pub fn response(&self) -> Option<&Response> {
        match self {
            ResourceError::RecordNotSaved { response, .. }
            | ResourceError::RecordNotFound { response, .. }
            | ResourceError::RecordNotDeleted { response, .. }
            | ResourceError::RecordNotLinked { response, .. }
            | ResourceError::RecordNotUnlinked { response, .. }
            | ResourceError::PageNotLoaded { response, .. }
            | ResourceError::Login { response } => Some(response),
            _ => None,
        }
    }

    pub fn record(&self) -> Option<&RecordSnapshot> {
        match self {
            ResourceError::RecordInvalid { record }
            | ResourceError::RecordNotSaved { record, .. }
            | ResourceError::RecordNotFound { record, .. }
            | ResourceError::RecordNotDeleted { record, .. }
            | ResourceError::RecordNotLinked { record, .. }
            | ResourceError::RecordNotUnlinked { record, .. } => Some(record),
            _ => None,
        }
    }
}
