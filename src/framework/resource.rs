//! # Resource Engine
//!
//! [`Resource<K>`] is one remote entity held in memory: its attributes, the
//! last-synced baseline they are diffed against, an error collection, and the
//! last transport response. [`ResourceKind`] is what a concrete kind (campaign,
//! pixel, ...) supplies: its schema, rules, hooks and request descriptors.
//!
//! ## Lifecycle
//!
//! A resource is `New` until it has an identity and `Persisted` afterwards.
//! The state is derived from the identity attribute, never stored.
//!
//! | operation | request | on success |
//! |-----------|---------|------------|
//! | `save` (new) | `create_request` | identity set, baseline cleared |
//! | `save` (persisted) | `update_request` (changed set only) | baseline cleared |
//! | `destroy` | `delete_request` | resource refuses further mutation |
//! | `link` / `unlink` | `link_request` / `unlink_request` | nothing local |
//! | `find` / `fetch` | `read_request` | attributes hydrated, baseline cleared |
//!
//! The plain forms return `Ok(false)` (or the resource) when validation or the
//! transport fails and leave the error collection and
//! [`last_response`](Resource::last_response) to inspect. The `*_strict` forms
//! turn those failures into [`ResourceError`] variants. Both forms return
//! `Err(ResourceError::Request)` when a descriptor cannot be built, before any
//! request is sent.
//!
//! Every operation takes `&mut self`, so one instance can never have two saves
//! in flight.

use std::fmt;
use std::sync::OnceLock;

use indexmap::IndexMap;
use serde_json::{Map, Value as Json};
use tracing::{debug, info, instrument};

use crate::framework::association::AssociationSpec;
use crate::framework::attribute::{AttrType, Attributes, Schema, Value, RESERVED_KEYS};
use crate::framework::client::Client;
use crate::framework::descriptor::{Params, RequestDescriptor};
use crate::framework::error::{RecordSnapshot, ResourceError};
use crate::framework::hooks::{Hooks, Operation, Phase};
use crate::framework::relation::Relation;
use crate::framework::transport::Response;
use crate::framework::validation::{Errors, ValidationContext, Validations};

static NULL: Value = Value::Null;

fn no_validations() -> &'static Validations {
    static EMPTY: OnceLock<Validations> = OnceLock::new();
    EMPTY.get_or_init(Validations::new)
}

/// The `Request` error for an operation a kind does not support.
pub fn forbidden<K: ResourceKind>(operation: &str) -> ResourceError {
    ResourceError::Request(format!("Cannot {operation} a {}", K::NAME.replace('_', " ")))
}

/// Trait that every resource kind implements.
///
/// A kind is a zero-sized marker type; all of its state lives in
/// [`Resource<Self>`]. Only [`schema`](Self::schema),
/// [`index_request`](Self::index_request) and
/// [`read_request`](Self::read_request) are required. Mutating requests
/// default to a `Request` error, so a kind opts into each one it supports.
pub trait ResourceKind: Sized + Send + Sync + 'static {
    /// Snake-case kind name; also the prefix of the foreign key that child
    /// kinds carry (`campaign` → `campaign_id`).
    const NAME: &'static str;

    /// Query parameter the page cursor is sent under.
    const CURSOR_PARAM: &'static str = "after";

    fn schema() -> &'static Schema;

    fn validations() -> &'static Validations {
        no_validations()
    }

    /// Hooks every new instance starts with.
    fn hooks() -> Hooks<Self> {
        Hooks::new()
    }

    fn associations() -> &'static [AssociationSpec] {
        &[]
    }

    /// Builds the request for one page of the collection described by
    /// `filters`.
    fn index_request(client: &Client, filters: &Params) -> Result<RequestDescriptor, ResourceError>;

    fn read_request(resource: &Resource<Self>, params: &Params) -> Result<RequestDescriptor, ResourceError>;

    fn create_request(_resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        Err(forbidden::<Self>("create"))
    }

    fn update_request(_resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        Err(forbidden::<Self>("update"))
    }

    fn delete_request(_resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        Err(forbidden::<Self>("delete"))
    }

    fn link_request(_resource: &Resource<Self>, _params: &Params) -> Result<RequestDescriptor, ResourceError> {
        Err(forbidden::<Self>("link"))
    }

    fn unlink_request(_resource: &Resource<Self>, _params: &Params) -> Result<RequestDescriptor, ResourceError> {
        Err(forbidden::<Self>("unlink"))
    }

    /// Reads the new identity out of a successful create response.
    fn create_response_id(response: &Response) -> Option<Json> {
        response.body().get("id").cloned()
    }

    /// Turns an identity as callers or the platform spell it into the raw
    /// value the identity attribute is cast from.
    fn identity_value(raw: &Json) -> Json {
        raw.clone()
    }

    /// The rows of one collection page.
    fn page_rows(response: &Response) -> Vec<Map<String, Json>> {
        response
            .body()
            .get("data")
            .and_then(Json::as_array)
            .map(|rows| rows.iter().filter_map(|r| r.as_object().cloned()).collect())
            .unwrap_or_default()
    }

    /// The opaque cursor of the next page, if there is one.
    fn page_cursor(response: &Response) -> Option<String> {
        response
            .body()
            .pointer("/paging/cursors/after")
            .and_then(Json::as_str)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    }
}

/// Options for [`Resource::save_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    pub validate: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self { validate: true }
    }
}

impl SaveOptions {
    /// Reads the reserved `validate` key of constructor attributes.
    fn from_attributes(attributes: &Json) -> Self {
        Self {
            validate: attributes.get("validate").and_then(Json::as_bool).unwrap_or(true),
        }
    }
}

enum SaveOutcome {
    Saved,
    Unchanged,
    Invalid,
    Failed,
}

/// One remote entity of kind `K`.
pub struct Resource<K: ResourceKind> {
    client: Client,
    attributes: Attributes,
    baseline: Attributes,
    errors: Errors,
    response: Option<Response>,
    hooks: Hooks<K>,
    ignored: Vec<String>,
    destroyed: bool,
}

impl<K: ResourceKind> Resource<K> {
    /// A new resource holding the kind's defaults. Defaults are not changes.
    pub fn new(client: &Client) -> Self {
        let attributes = K::schema().defaults();
        Self {
            client: client.clone(),
            baseline: attributes.clone(),
            attributes,
            errors: Errors::new(),
            response: None,
            hooks: K::hooks(),
            ignored: Vec::new(),
            destroyed: false,
        }
    }

    /// A new resource with caller-supplied attributes, by canonical (or wire)
    /// name. Passing `"stale": true` marks them as already synchronized.
    pub fn build(client: &Client, attributes: Json) -> Result<Self, ResourceError> {
        let mut resource = Self::new(client);
        let stale = attributes.get("stale").and_then(Json::as_bool).unwrap_or(false);
        resource.set_all(attributes)?;
        if stale {
            resource.changes_applied();
        }
        Ok(resource)
    }

    /// Like [`build`](Self::build), but the attributes are taken as the remote
    /// state without a round trip.
    pub fn stale(client: &Client, attributes: Json) -> Result<Self, ResourceError> {
        let mut resource = Self::build(client, attributes)?;
        resource.changes_applied();
        Ok(resource)
    }

    /// Hydrates a resource from one collection row. The row already is the
    /// remote state, so the resource is clean and carries a synthetic success
    /// response.
    pub fn from_row(client: &Client, row: &Map<String, Json>) -> Self {
        let mut resource = Self::new(client);
        resource.assign(row);
        resource.response = Some(Response::synthetic());
        resource.changes_applied();
        resource
    }

    /// Builds and saves in one call. The resource comes back whatever the
    /// outcome, so check [`is_persisted`](Self::is_persisted) and
    /// [`errors`](Self::errors). `"validate": false` skips validation.
    pub async fn create(client: &Client, attributes: Json) -> Result<Self, ResourceError> {
        let options = SaveOptions::from_attributes(&attributes);
        let mut resource = Self::build(client, attributes)?;
        resource.save_with(options).await?;
        Ok(resource)
    }

    /// [`create`](Self::create) that fails with `RecordInvalid` or
    /// `RecordNotSaved` instead of returning an unsaved resource.
    pub async fn create_strict(client: &Client, attributes: Json) -> Result<Self, ResourceError> {
        let options = SaveOptions::from_attributes(&attributes);
        let mut resource = Self::build(client, attributes)?;
        resource.save_strict_with(options).await?;
        Ok(resource)
    }

    /// An empty scope over every resource of this kind.
    pub fn all(client: &Client) -> Relation<K> {
        Relation::new(client)
    }

    // --- Attributes ---

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn id(&self) -> &Value {
        self.get(K::schema().identity())
    }

    pub fn is_new(&self) -> bool {
        self.id().is_null()
    }

    pub fn is_persisted(&self) -> bool {
        !self.is_new()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Current value of an attribute; `Null` for undeclared names.
    pub fn get(&self, name: &str) -> &Value {
        self.attributes.get(name).unwrap_or(&NULL)
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Sets one declared attribute, coercing the value to its declared type.
    pub fn set(&mut self, name: &str, value: impl Into<Json>) -> Result<(), ResourceError> {
        self.ensure_live("modify")?;
        let schema = K::schema();
        let attribute = schema
            .get(name)
            .or_else(|| schema.resolve(name).and_then(|canonical| schema.get(canonical)))
            .ok_or_else(|| ResourceError::UnknownAttribute {
                kind: K::NAME,
                name: name.to_string(),
            })?;
        self.attributes.insert(attribute.name, attribute.ty.cast(&value.into()));
        Ok(())
    }

    /// Sets every key of a JSON object. Reserved control keys are skipped.
    pub fn set_all(&mut self, attributes: Json) -> Result<(), ResourceError> {
        let Json::Object(map) = attributes else {
            return Err(ResourceError::Request(format!(
                "{} attributes must be a JSON object",
                K::NAME
            )));
        };
        for (key, value) in map {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            self.set(&key, value)?;
        }
        Ok(())
    }

    /// Hydrates from a raw platform payload keyed by wire names. Keys this kind
    /// does not declare are skipped and kept in
    /// [`ignored_attributes`](Self::ignored_attributes).
    pub fn assign(&mut self, raw: &Map<String, Json>) {
        let (values, ignored) = K::schema().hydrate(raw);
        self.attributes.extend(values);
        if !ignored.is_empty() {
            debug!(kind = K::NAME, ignored = ?ignored, "Ignoring undeclared attributes");
            for key in ignored {
                if !self.ignored.contains(&key) {
                    self.ignored.push(key);
                }
            }
        }
    }

    /// Wire names met during hydration that this kind does not declare.
    pub fn ignored_attributes(&self) -> &[String] {
        &self.ignored
    }

    // --- Dirty tracking ---

    /// Names whose value differs from the last-synced baseline.
    pub fn changed_attributes(&self) -> Vec<&'static str> {
        self.attributes
            .iter()
            .filter(|(name, value)| self.baseline.get(*name).unwrap_or(&NULL) != *value)
            .map(|(name, _)| *name)
            .collect()
    }

    pub fn is_changed(&self) -> bool {
        !self.changed_attributes().is_empty()
    }

    /// `name → (baseline, current)` for every changed attribute.
    pub fn changes(&self) -> IndexMap<&'static str, (Value, Value)> {
        self.changed_attributes()
            .into_iter()
            .map(|name| {
                let before = self.baseline.get(name).cloned().unwrap_or_default();
                (name, (before, self.get(name).clone()))
            })
            .collect()
    }

    /// Makes the current attributes the new baseline.
    pub fn changes_applied(&mut self) {
        self.baseline = self.attributes.clone();
    }

    /// Create payload: every non-null attribute under its wire name, without
    /// the identity.
    pub fn attributes_for_create(&self) -> Params {
        let schema = K::schema();
        schema.serialize(&self.attributes, schema.names(), true)
    }

    /// Update payload: exactly the changed set under wire names, without the
    /// identity.
    pub fn attributes_for_update(&self) -> Params {
        K::schema().serialize(&self.attributes, self.changed_attributes(), false)
    }

    // --- Validation ---

    pub fn validation_context(&self) -> ValidationContext {
        if self.is_new() {
            ValidationContext::Create
        } else {
            ValidationContext::Update
        }
    }

    /// Runs the rules of the current context and replaces the error collection.
    pub fn is_valid(&mut self) -> bool {
        let context = self.validation_context();
        let mut errors = K::validations().validate(&self.attributes, context);

        let identity = K::schema().identity();
        if context == ValidationContext::Update {
            let synced = self.baseline.get(identity).unwrap_or(&NULL);
            if !synced.is_null() && synced != self.get(identity) {
                errors.add(identity, "cannot be changed");
            }
        }

        self.errors = errors;
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    pub fn last_response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    // --- Hooks ---

    pub fn hooks_mut(&mut self) -> &mut Hooks<K> {
        &mut self.hooks
    }

    fn run_hooks(&mut self, operation: Operation, phase: Phase) {
        for hook in self.hooks.matching(operation, phase) {
            hook(self);
        }
    }

    // --- Lifecycle ---

    fn ensure_live(&self, operation: &str) -> Result<(), ResourceError> {
        if self.destroyed {
            return Err(ResourceError::Request(format!(
                "Cannot {operation} a destroyed {}",
                K::NAME
            )));
        }
        Ok(())
    }

    /// Executes one descriptor and records its outcome.
    async fn transact(&mut self, request: &RequestDescriptor) -> bool {
        let response = self.client.execute(request).await;
        let success = response.is_success();
        if !success {
            self.errors.add_api(response.failure_message());
        }
        self.response = Some(response);
        success
    }

    pub async fn save(&mut self) -> Result<bool, ResourceError> {
        self.save_with(SaveOptions::default()).await
    }

    /// Returns `false` without a request when validation fails or when a
    /// persisted resource has no changes.
    pub async fn save_with(&mut self, options: SaveOptions) -> Result<bool, ResourceError> {
        Ok(matches!(self.persist(options).await?, SaveOutcome::Saved))
    }

    /// Like [`save`](Self::save) but failures are errors: `RecordInvalid` when
    /// validation failed, `RecordNotSaved` when the platform refused.
    ///
    /// Returns `Ok(false)` when there was nothing to save.
    pub async fn save_strict(&mut self) -> Result<bool, ResourceError> {
        self.save_strict_with(SaveOptions::default()).await
    }

    pub async fn save_strict_with(&mut self, options: SaveOptions) -> Result<bool, ResourceError> {
        match self.persist(options).await? {
            SaveOutcome::Saved => Ok(true),
            SaveOutcome::Unchanged => Ok(false),
            SaveOutcome::Invalid => Err(ResourceError::RecordInvalid {
                record: Box::new(self.snapshot()),
            }),
            SaveOutcome::Failed => Err(ResourceError::RecordNotSaved {
                record: Box::new(self.snapshot()),
                response: self.boxed_response(),
            }),
        }
    }

    #[instrument(name = "save", skip_all, fields(kind = K::NAME, id = %self.id()))]
    async fn persist(&mut self, options: SaveOptions) -> Result<SaveOutcome, ResourceError> {
        self.ensure_live("save")?;
        self.errors.clear();

        if options.validate && !self.is_valid() {
            debug!(errors = %self.errors, "Validation failed");
            return Ok(SaveOutcome::Invalid);
        }
        if self.is_persisted() && !self.is_changed() {
            debug!("Nothing to save");
            return Ok(SaveOutcome::Unchanged);
        }

        self.run_hooks(Operation::Save, Phase::Before);
        let saved = if self.is_new() {
            self.create_remote().await?
        } else {
            self.update_remote().await?
        };
        self.run_hooks(Operation::Save, Phase::After);

        Ok(if saved {
            SaveOutcome::Saved
        } else {
            SaveOutcome::Failed
        })
    }

    async fn create_remote(&mut self) -> Result<bool, ResourceError> {
        self.run_hooks(Operation::Create, Phase::Before);
        let request = K::create_request(self)?;
        let success = self.transact(&request).await;
        if success {
            let id = self.response.as_ref().and_then(K::create_response_id);
            if let Some(id) = id {
                self.set_identity(&id);
            }
            self.changes_applied();
            info!(kind = K::NAME, id = %self.id(), "Created");
        }
        self.run_hooks(Operation::Create, Phase::After);
        Ok(success)
    }

    async fn update_remote(&mut self) -> Result<bool, ResourceError> {
        self.run_hooks(Operation::Update, Phase::Before);
        let request = K::update_request(self)?;
        let success = self.transact(&request).await;
        if success {
            info!(kind = K::NAME, id = %self.id(), changed = ?self.changed_attributes(), "Updated");
            self.changes_applied();
        }
        self.run_hooks(Operation::Update, Phase::After);
        Ok(success)
    }

    fn set_identity(&mut self, id: &Json) {
        let identity = K::schema().identity();
        let ty = K::schema().get(identity).map(|a| a.ty).unwrap_or(AttrType::String);
        self.attributes.insert(identity, ty.cast(&K::identity_value(id)));
    }

    /// Assigns `attributes` first, so dirty tracking sees them, then saves.
    pub async fn update(&mut self, attributes: Json) -> Result<bool, ResourceError> {
        self.set_all(attributes)?;
        self.save().await
    }

    pub async fn update_strict(&mut self, attributes: Json) -> Result<bool, ResourceError> {
        self.set_all(attributes)?;
        self.save_strict().await
    }

    #[instrument(name = "destroy", skip_all, fields(kind = K::NAME, id = %self.id()))]
    pub async fn destroy(&mut self) -> Result<bool, ResourceError> {
        self.ensure_live("destroy")?;
        self.errors.clear();
        self.run_hooks(Operation::Destroy, Phase::Before);
        let request = K::delete_request(self)?;
        let success = self.transact(&request).await;
        if success {
            self.destroyed = true;
            info!("Destroyed");
        }
        self.run_hooks(Operation::Destroy, Phase::After);
        Ok(success)
    }

    pub async fn destroy_strict(&mut self) -> Result<(), ResourceError> {
        if self.destroy().await? {
            return Ok(());
        }
        Err(ResourceError::RecordNotDeleted {
            record: Box::new(self.snapshot()),
            response: self.boxed_response(),
        })
    }

    /// Creates a relationship between this resource and the one named in
    /// `params`, e.g. sharing a pixel with an account.
    #[instrument(name = "link", skip_all, fields(kind = K::NAME, id = %self.id()))]
    pub async fn link(&mut self, params: Params) -> Result<bool, ResourceError> {
        self.ensure_live("link")?;
        self.errors.clear();
        self.run_hooks(Operation::Link, Phase::Before);
        let request = K::link_request(self, &params)?;
        let success = self.transact(&request).await;
        if success {
            info!("Linked");
        }
        self.run_hooks(Operation::Link, Phase::After);
        Ok(success)
    }

    pub async fn link_strict(&mut self, params: Params) -> Result<(), ResourceError> {
        if self.link(params).await? {
            return Ok(());
        }
        Err(ResourceError::RecordNotLinked {
            record: Box::new(self.snapshot()),
            response: self.boxed_response(),
        })
    }

    #[instrument(name = "unlink", skip_all, fields(kind = K::NAME, id = %self.id()))]
    pub async fn unlink(&mut self, params: Params) -> Result<bool, ResourceError> {
        self.ensure_live("unlink")?;
        self.errors.clear();
        self.run_hooks(Operation::Unlink, Phase::Before);
        let request = K::unlink_request(self, &params)?;
        let success = self.transact(&request).await;
        if success {
            info!("Unlinked");
        }
        self.run_hooks(Operation::Unlink, Phase::After);
        Ok(success)
    }

    pub async fn unlink_strict(&mut self, params: Params) -> Result<(), ResourceError> {
        if self.unlink(params).await? {
            return Ok(());
        }
        Err(ResourceError::RecordNotUnlinked {
            record: Box::new(self.snapshot()),
            response: self.boxed_response(),
        })
    }

    // --- Lookup ---

    /// Reads the resource with identity `id`. The resource is returned
    /// whatever the outcome; check [`last_response`](Self::last_response).
    pub async fn find(client: &Client, id: impl Into<Json>) -> Result<Self, ResourceError> {
        Self::find_with(client, id, Params::new()).await
    }

    /// [`find`](Self::find) with extra read parameters (e.g. `fields`).
    pub async fn find_with(client: &Client, id: impl Into<Json>, params: Params) -> Result<Self, ResourceError> {
        let mut resource = Self::new(client);
        resource.set_identity(&id.into());
        resource.fetch(&params).await?;
        Ok(resource)
    }

    /// [`find`](Self::find) that raises `RecordNotFound` when the read fails.
    pub async fn find_strict(client: &Client, id: impl Into<Json>) -> Result<Self, ResourceError> {
        Self::find_strict_with(client, id, Params::new()).await
    }

    pub async fn find_strict_with(
        client: &Client,
        id: impl Into<Json>,
        params: Params,
    ) -> Result<Self, ResourceError> {
        let mut resource = Self::new(client);
        resource.set_identity(&id.into());
        if resource.fetch(&params).await? {
            return Ok(resource);
        }
        Err(ResourceError::RecordNotFound {
            record: Box::new(resource.snapshot()),
            response: resource.boxed_response(),
        })
    }

    /// Reads this resource's remote state into it. The fetched state,
    /// including whatever the after-find hooks derive from it, becomes the
    /// new baseline.
    #[instrument(name = "find", skip_all, fields(kind = K::NAME, id = %self.id()))]
    pub async fn fetch(&mut self, params: &Params) -> Result<bool, ResourceError> {
        self.errors.clear();
        self.run_hooks(Operation::Find, Phase::Before);
        let request = K::read_request(self, params)?;
        let success = self.transact(&request).await;
        if success {
            let row = self
                .response
                .as_ref()
                .and_then(|r| r.body().as_object().cloned());
            if let Some(row) = row {
                self.assign(&row);
            }
        }
        self.run_hooks(Operation::Find, Phase::After);
        if success {
            self.changes_applied();
        }
        Ok(success)
    }

    /// Re-reads this resource with the default parameters.
    pub async fn reload(&mut self) -> Result<bool, ResourceError> {
        self.fetch(&Params::new()).await
    }

    // --- Associations ---

    /// Looks up the parent of kind `P` named by `foreign_key`. `None` when the
    /// key is empty. Always a fresh read; the client's policy picks between
    /// `find` and `find_strict`.
    pub async fn belongs_to<P: ResourceKind>(&self, foreign_key: &str) -> Result<Option<Resource<P>>, ResourceError> {
        let id = self.get(foreign_key);
        if id.is_null() {
            return Ok(None);
        }
        let id = id.to_json();
        let parent = if self.client.policy().strict_associations {
            Resource::<P>::find_strict(&self.client, id).await?
        } else {
            Resource::<P>::find(&self.client, id).await?
        };
        Ok(Some(parent))
    }

    /// The children of kind `C`, filtered on `<kind>_id = self.id`.
    pub fn has_many<C: ResourceKind>(&self) -> Result<Relation<C>, ResourceError> {
        if self.is_new() {
            return Err(ResourceError::Request(format!(
                "Cannot list {} of a new {}",
                C::NAME,
                K::NAME
            )));
        }
        let foreign_key = format!("{}_id", K::NAME);
        Ok(Relation::new(&self.client).filter([(foreign_key, self.id().to_json())]))
    }

    // --- Diagnostics ---

    pub fn snapshot(&self) -> RecordSnapshot {
        let id = self.id();
        RecordSnapshot {
            kind: K::NAME,
            id: (!id.is_null()).then(|| id.to_json()),
            attributes: self.attributes_for_create().into_iter().collect(),
            errors: self.errors.clone(),
        }
    }

    fn boxed_response(&self) -> Box<Response> {
        Box::new(
            self.response
                .clone()
                .unwrap_or_else(|| Response::unreachable("no response recorded")),
        )
    }
}

impl<K: ResourceKind> Clone for Resource<K> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            attributes: self.attributes.clone(),
            baseline: self.baseline.clone(),
            errors: self.errors.clone(),
            response: self.response.clone(),
            hooks: self.hooks.clone(),
            ignored: self.ignored.clone(),
            destroyed: self.destroyed,
        }
    }
}

impl<K: ResourceKind> fmt::Debug for Resource<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("kind", &K::NAME)
            .field("attributes", &self.attributes)
            .field("changed", &self.changed_attributes())
            .field("errors", &self.errors)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::attribute::AttrType;
    use crate::framework::descriptor::Method;
    use crate::framework::mock::MockTransport;
    use crate::framework::validation::On;
    use serde_json::json;
    use std::sync::Arc;

    struct Widget;

    impl ResourceKind for Widget {
        const NAME: &'static str = "widget";

        fn schema() -> &'static Schema {
            static SCHEMA: OnceLock<Schema> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                Schema::builder()
                    .attribute("id", AttrType::String)
                    .attribute("name", AttrType::String)
                    .attribute("size", AttrType::Integer)
                    .attribute("label", AttrType::String)
                    .alias("display_label", "label")
                    .build()
            })
        }

        fn validations() -> &'static Validations {
            static RULES: OnceLock<Validations> = OnceLock::new();
            RULES.get_or_init(|| {
                Validations::new()
                    .presence(&["name"], On::Create)
                    .numericality(&["size"], 0, On::Update)
                    .custom(On::Always, |attributes, errors| {
                        let label = attributes.get("label").and_then(Value::as_str);
                        if label.is_some_and(|l| l.eq_ignore_ascii_case("none")) {
                            errors.add("label", "is reserved");
                        }
                    })
            })
        }

        fn index_request(client: &Client, filters: &Params) -> Result<RequestDescriptor, ResourceError> {
            Ok(RequestDescriptor::get(client.url("widgets")).params(filters.clone()))
        }

        fn read_request(resource: &Resource<Self>, params: &Params) -> Result<RequestDescriptor, ResourceError> {
            Ok(RequestDescriptor::get(resource.client().url(resource.id())).params(params.clone()))
        }

        fn create_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
            Ok(RequestDescriptor::post(resource.client().url("widgets")).body(resource.attributes_for_create()))
        }

        fn update_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
            Ok(RequestDescriptor::post(resource.client().url(resource.id())).body(resource.attributes_for_update()))
        }
    }

    fn client(mock: &MockTransport) -> Client {
        Client::new(Arc::new(mock.clone()), "https://api.example.com")
    }

    #[test]
    fn test_set_tracks_changes() {
        let mock = MockTransport::new();
        let mut widget = Resource::<Widget>::stale(&client(&mock), json!({ "id": "1", "size": 3 })).unwrap();
        assert!(!widget.is_changed());

        widget.set("size", 3).unwrap();
        assert!(!widget.is_changed());

        widget.set("size", "4").unwrap();
        assert_eq!(widget.changed_attributes(), vec!["size"]);
        assert_eq!(widget.changes()["size"], (Value::Integer(3), Value::Integer(4)));
    }

    #[test]
    fn test_set_rejects_unknown_attribute() {
        let mock = MockTransport::new();
        let mut widget = Resource::<Widget>::new(&client(&mock));
        let result = widget.set("colour", "red");
        assert!(matches!(result, Err(ResourceError::UnknownAttribute { name, .. }) if name == "colour"));
    }

    #[test]
    fn test_set_accepts_wire_name() {
        let mock = MockTransport::new();
        let mut widget = Resource::<Widget>::new(&client(&mock));
        widget.set("display_label", "shiny").unwrap();
        assert_eq!(widget.get("label").as_str(), Some("shiny"));
    }

    #[test]
    fn test_identity_change_is_invalid() {
        let mock = MockTransport::new();
        let mut widget = Resource::<Widget>::stale(&client(&mock), json!({ "id": "1" })).unwrap();
        widget.set("id", "2").unwrap();
        assert!(!widget.is_valid());
        assert_eq!(widget.errors().full_messages(), vec!["id cannot be changed"]);
    }

    #[test]
    fn test_update_rules_skip_new_resources() {
        let mock = MockTransport::new();
        let mut widget = Resource::<Widget>::build(&client(&mock), json!({ "name": "w", "size": 0 })).unwrap();
        assert!(widget.is_valid());
        assert!(widget.errors().on("size").is_empty());

        let mut stored = Resource::<Widget>::stale(&client(&mock), json!({ "id": "1", "size": 0 })).unwrap();
        assert!(!stored.is_valid());
        assert_eq!(stored.errors().on("size"), vec!["must be greater than 0"]);
    }

    #[test]
    fn test_custom_rule_runs_in_every_context() {
        let mock = MockTransport::new();
        let mut widget =
            Resource::<Widget>::build(&client(&mock), json!({ "name": "w", "label": "NONE" })).unwrap();
        assert!(!widget.is_valid());
        assert_eq!(widget.errors().full_messages(), vec!["label is reserved"]);

        let mut stored = Resource::<Widget>::stale(&client(&mock), json!({ "id": "1", "label": "none" })).unwrap();
        assert!(!stored.is_valid());
    }

    #[tokio::test]
    async fn test_create_builds_and_saves() {
        let mock = MockTransport::new();
        mock.expect(Method::Post, "https://api.example.com/widgets").return_ok(json!({ "id": "7" }));

        let widget = Resource::<Widget>::create(&client(&mock), json!({ "name": "w", "size": 2 }))
            .await
            .unwrap();

        assert!(widget.is_persisted());
        assert_eq!(widget.id().as_str(), Some("7"));
        assert!(!widget.is_changed());
        let body = mock.requests()[0].json_body().cloned().unwrap();
        assert!(!body.contains_key("validate"));
        mock.verify();
    }

    #[tokio::test]
    async fn test_create_reports_failure_through_the_resource() {
        let mock = MockTransport::new();
        mock.expect_any().return_error(400, "Invalid parameter");

        let invalid = Resource::<Widget>::create(&client(&mock), json!({ "size": 2 })).await.unwrap();
        assert!(invalid.is_new());
        assert_eq!(invalid.errors().on("name"), vec!["can't be blank"]);
        assert_eq!(mock.request_count(), 0);

        let refused = Resource::<Widget>::create(&client(&mock), json!({ "name": "w" })).await.unwrap();
        assert!(refused.is_new());
        assert_eq!(refused.errors().full_messages(), vec!["Invalid parameter"]);
        mock.verify();
    }

    #[tokio::test]
    async fn test_create_strict_honours_validate_flag() {
        let mock = MockTransport::new();
        mock.expect_any().return_ok(json!({ "id": "8" }));

        let error = Resource::<Widget>::create_strict(&client(&mock), json!({ "size": 2 }))
            .await
            .unwrap_err();
        assert!(matches!(error, ResourceError::RecordInvalid { .. }));
        assert_eq!(mock.request_count(), 0);

        let widget = Resource::<Widget>::create_strict(&client(&mock), json!({ "size": 2, "validate": false }))
            .await
            .unwrap();
        assert_eq!(widget.id().as_str(), Some("8"));
        mock.verify();
    }

    #[tokio::test]
    async fn test_create_strict_raises_when_refused() {
        let mock = MockTransport::new();
        mock.expect_any().return_error(400, "Invalid parameter");

        let error = Resource::<Widget>::create_strict(&client(&mock), json!({ "name": "w" }))
            .await
            .unwrap_err();

        assert!(matches!(error, ResourceError::RecordNotSaved { .. }));
        assert_eq!(error.response().map(Response::status), Some(400));
    }

    #[tokio::test]
    async fn test_save_invalid_sends_nothing() {
        let mock = MockTransport::new();
        let mut widget = Resource::<Widget>::new(&client(&mock));
        assert!(!widget.save().await.unwrap());
        assert_eq!(widget.errors().on("name"), vec!["can't be blank"]);
        assert_eq!(mock.request_count(), 0);

        let error = widget.save_strict().await.unwrap_err();
        assert!(matches!(error, ResourceError::RecordInvalid { .. }));
    }

    #[tokio::test]
    async fn test_save_without_validation() {
        let mock = MockTransport::new();
        mock.expect_any().return_ok(json!({ "id": "9" }));
        let mut widget = Resource::<Widget>::new(&client(&mock));
        assert!(widget.save_with(SaveOptions { validate: false }).await.unwrap());
        assert_eq!(widget.id().as_str(), Some("9"));
        mock.verify();
    }

    #[tokio::test]
    async fn test_hooks_run_in_order() {
        let mock = MockTransport::new();
        mock.expect_any().return_ok(json!({ "id": "5" }));
        let mut widget = Resource::<Widget>::build(&client(&mock), json!({ "name": "w" })).unwrap();
        widget.hooks_mut().add(Operation::Save, Phase::Before, |w: &mut Resource<Widget>| {
            w.set("label", "before").unwrap();
        });
        widget.hooks_mut().add(Operation::Create, Phase::After, |w: &mut Resource<Widget>| {
            let seen = w.last_response().map(Response::status).unwrap_or_default();
            w.set("size", seen as i64).unwrap();
        });

        assert!(widget.save().await.unwrap());
        let sent = &mock.requests()[0];
        assert_eq!(sent.json_body().unwrap().get("display_label"), Some(&json!("before")));
        assert_eq!(widget.get("size").as_i64(), Some(200));
    }

    #[tokio::test]
    async fn test_forbidden_delete_fails_before_request() {
        let mock = MockTransport::new();
        let mut widget = Resource::<Widget>::stale(&client(&mock), json!({ "id": "1" })).unwrap();
        let result = widget.destroy().await;
        assert!(matches!(result, Err(ResourceError::Request(message)) if message == "Cannot delete a widget"));
        assert_eq!(mock.request_count(), 0);
    }
}
