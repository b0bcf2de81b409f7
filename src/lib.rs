#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Ad Resource
//!
//! > **Remote advertising entities as local, typed resources.**
//!
//! This crate lets you treat ad-platform objects (accounts, campaigns, ad sets,
//! ads, creatives, pixels, audiences) like local records: build them, validate
//! them, track what changed, save them, and walk their associations. Every
//! mutation is still exactly one HTTP call to the platform.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Kinds describe, the engine acts
//! A platform entity is a zero-sized *kind* implementing
//! [`ResourceKind`](framework::ResourceKind): its schema, validations, hooks and
//! how to build each request. The engine ([`Resource<K>`](framework::Resource),
//! [`Relation<K>`](framework::Relation)) is written **once** and works for every
//! kind.
//!
//! ### Requests are values
//! Kinds never talk to the network. They return a
//! [`RequestDescriptor`](framework::RequestDescriptor), and a single
//! [`Transport`](framework::Transport) executes it. Swap in
//! [`MockTransport`](framework::mock::MockTransport) and the whole crate runs
//! offline.
//!
//! ### Nothing is global
//! Credentials, API version and policy live in an immutable
//! [`Client`](framework::Client) passed to every call. Build one from
//! [`Config`](config::Config) with [`Platform::connect`](platform::Platform::connect).
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Lenient and strict forms
//! `save`, `update`, `destroy`, `link`, `unlink` and `find` report failure
//! through their return value and the resource's `errors()`. The `*_strict`
//! forms turn the same failures into [`ResourceError`](framework::ResourceError)
//! variants carrying a snapshot of the record and the platform response.
//!
//! ### 2. Dirty tracking
//! Every resource keeps the last state it synchronized with the platform.
//! Updates send exactly the changed attributes, and saving an unchanged
//! persisted resource sends nothing.
//!
//! ### 3. Lazy pagination
//! A [`Relation`](framework::Relation) fetches one page at a time while you
//! iterate, and never more than a `limit` needs.
//!
//! ### 4. Observability
//! We use `tracing` everywhere with structured fields. Operations open spans,
//! and secrets are filtered from logged requests. See [`runtime::setup_tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! - [`framework`] - the generic engine: attributes, validation, hooks,
//!   resources, relations, transport.
//! - [`facebook`] - the Facebook Marketing API kinds and token exchange.
//! - [`platform`] - the registry of supported platforms.
//! - [`config`] - TOML plus environment configuration.
//! - [`runtime`] - tracing bootstrap.
//!
//! ## 🚀 Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use ad_resource::config::load_config;
//! use ad_resource::facebook::Campaign;
//! use ad_resource::framework::{HttpTransport, Resource};
//! use serde_json::json;
//!
//! let config = load_config("ad-resource.toml")?;
//! let client = config.platform.connect(&config, Arc::new(HttpTransport::new()))?;
//!
//! let mut campaign = Resource::<Campaign>::build(&client, json!({ "account_id": 123, "name": "Spring" }))?;
//! campaign.save_strict().await?;
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod config;
pub mod facebook;
pub mod framework;
pub mod platform;
pub mod runtime;

#[doc(hidden)]
pub use paste;
