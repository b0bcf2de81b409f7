//! Generic resource-mapping engine.
//!
//! This module provides the building blocks for treating remote platform
//! entities as local objects with create/read/update/delete/link semantics.
//!
//! # Main Components
//!
//! - [`ResourceKind`] - Trait that each remote entity kind implements
//! - [`Resource`] - One entity: attributes, dirty tracking, validation, lifecycle
//! - [`Relation`] - Lazily paginated, immutable-by-clone collection query
//! - [`Schema`] - Typed attribute declarations with wire-name aliases
//! - [`RequestDescriptor`] / [`Transport`] - The single seam to the network
//! - [`ResourceError`] - Error taxonomy of the strict operations
//!
//! # Testing
//!
//! See [`mock`] module for a scripted transport.

pub mod association;
pub mod attribute;
pub mod client;
pub mod descriptor;
pub mod error;
pub mod hooks;
pub mod mock;
pub mod relation;
pub mod resource;
pub mod transport;
pub mod validation;

pub use association::{AssociationKind, AssociationSpec};
pub use attribute::{AttrType, Attribute, Attributes, Schema, SchemaBuilder, Value};
pub use client::{Client, Policy};
pub use descriptor::{Method, Params, RequestDescriptor};
pub use error::{RecordSnapshot, ResourceError};
pub use hooks::{Hooks, Operation, Phase};
pub use relation::{Records, Relation};
pub use resource::{forbidden, Resource, ResourceKind, SaveOptions};
pub use transport::{HttpTransport, Response, Transport};
pub use validation::{Errors, On, ValidationContext, Validations};
