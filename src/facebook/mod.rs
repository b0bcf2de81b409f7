//! Facebook Marketing API resource kinds.
//!
//! Every kind here is a marker type implementing
//! [`ResourceKind`](crate::framework::ResourceKind). Requests go to the Graph
//! API under `https://graph.facebook.com/v{api_version}` and carry the client's
//! access token; collection pages use `paging.cursors.after`.
//!
//! ```ignore
//! let client = Platform::Facebook.connect(&config, Arc::new(HttpTransport::new()))?;
//! let account = Resource::<Account>::find_strict(&client, 123).await?;
//! let mut campaigns = account.campaigns()?.filter([("effective_status", json!(["ACTIVE"]))]).iter();
//! while let Some(campaign) = campaigns.next().await? {
//!     println!("{}", campaign.get("name"));
//! }
//! ```

pub mod account;
pub mod ad;
pub mod ad_creative;
pub mod ad_set;
pub mod business;
pub mod campaign;
pub mod custom_audience;
pub mod login;
pub mod page;
pub mod permission;
pub mod pixel;
pub mod saved_audience;
pub mod user;

pub use account::Account;
pub use ad::Ad;
pub use ad_creative::AdCreative;
pub use ad_set::AdSet;
pub use business::Business;
pub use campaign::Campaign;
pub use custom_audience::CustomAudience;
pub use login::login;
pub use page::Page;
pub use permission::Permission;
pub use pixel::Pixel;
pub use saved_audience::SavedAudience;
pub use user::User;

use serde_json::{json, Value as Json};
use tracing::warn;

use crate::framework::{Client, Method, Params, RequestDescriptor, Resource, ResourceError, ResourceKind};

pub const GRAPH_URL: &str = "https://graph.facebook.com";
pub const API_VERSION: &str = "11.0";

/// `https://graph.facebook.com/v{api_version}`
pub fn base_url(api_version: &str) -> String {
    format!("{GRAPH_URL}/v{api_version}")
}

/// Renders an id as a path segment.
fn segment(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Ad accounts are addressed as `act_<id>`.
pub(crate) fn account_path(id: impl std::fmt::Display) -> String {
    let id = id.to_string();
    if id.starts_with("act_") {
        id
    } else {
        format!("act_{id}")
    }
}

pub(crate) fn with_token(client: &Client, mut params: Params) -> Params {
    if let Some(token) = client.access_token() {
        params.insert("access_token".to_string(), json!(token));
    }
    params
}

/// Read parameters: caller params, the access token, and `fields` (the
/// caller's list, or `defaults`) extended with the relational fields.
pub(crate) fn read_params(client: &Client, params: &Params, defaults: &[&str], relational: &[&str]) -> Params {
    let mut params = params.clone();
    let requested: Vec<String> = match params.shift_remove("fields") {
        Some(Json::String(list)) => list.split(',').map(|f| f.trim().to_string()).collect(),
        Some(Json::Array(list)) => list.iter().filter_map(Json::as_str).map(str::to_string).collect(),
        _ => defaults.iter().map(|f| f.to_string()).collect(),
    };

    let mut fields: Vec<String> = Vec::with_capacity(requested.len() + relational.len());
    for field in requested.into_iter().chain(relational.iter().map(|f| f.to_string())) {
        if !field.is_empty() && !fields.contains(&field) {
            fields.push(field);
        }
    }

    params.insert("fields".to_string(), json!(fields.join(",")));
    with_token(client, params)
}

/// Picks the parent a collection is listed under: the first of `keys` present
/// in the filters. Returns the parent's path segment and the remaining
/// filters, which are sent as query parameters.
pub(crate) fn index_target(kind: &str, filters: &Params, keys: &[&str]) -> Result<(String, Params), ResourceError> {
    let mut params = filters.clone();
    let mut target = None;
    for key in keys {
        let Some(value) = params.shift_remove(*key) else {
            continue;
        };
        if target.is_none() && !value.is_null() {
            let id = segment(&value);
            target = Some(if *key == "account_id" { account_path(id) } else { id });
        }
    }
    let target = target.ok_or_else(|| {
        ResourceError::Request(format!(
            "Expected one of {} to list {kind}, got {:?}",
            keys.join(", "),
            filters.keys().collect::<Vec<_>>()
        ))
    })?;
    Ok((target, params))
}

/// `GET {parent}/{edge}` for one page of a collection.
pub(crate) fn index_request<K: ResourceKind>(
    client: &Client,
    filters: &Params,
    keys: &[&str],
    edge: &str,
    read_fields: &[&str],
    relational: &[&str],
) -> Result<RequestDescriptor, ResourceError> {
    let (parent, params) = index_target(K::NAME, filters, keys)?;
    Ok(RequestDescriptor::get(client.url(format!("{parent}/{edge}")))
        .params(read_params(client, &params, read_fields, relational)))
}

/// `GET {id}` with the read parameters.
pub(crate) fn read_request<K: ResourceKind>(
    resource: &Resource<K>,
    params: &Params,
    read_fields: &[&str],
    relational: &[&str],
) -> Result<RequestDescriptor, ResourceError> {
    let id = require_id(resource, "read")?;
    let client = resource.client();
    Ok(RequestDescriptor::get(client.url(id)).params(read_params(client, params, read_fields, relational)))
}

/// `POST {id}` with the changed attributes.
pub(crate) fn update_request<K: ResourceKind>(resource: &Resource<K>) -> Result<RequestDescriptor, ResourceError> {
    let id = require_id(resource, "update")?;
    let client = resource.client();
    Ok(RequestDescriptor::post(client.url(id)).body(with_token(client, resource.attributes_for_update())))
}

/// `DELETE {id}`
pub(crate) fn delete_request<K: ResourceKind>(resource: &Resource<K>) -> Result<RequestDescriptor, ResourceError> {
    let id = require_id(resource, "delete")?;
    let client = resource.client();
    Ok(RequestDescriptor::delete(client.url(id)).params(with_token(client, Params::new())))
}

/// `POST act_{account_id}/{edge}`. The account id lives in the URL only.
pub(crate) fn create_under_account<K: ResourceKind>(
    resource: &Resource<K>,
    edge: &str,
) -> Result<RequestDescriptor, ResourceError> {
    let account_id = resource.get("account_id");
    if account_id.is_null() {
        return Err(ResourceError::Request(format!(
            "Expected account_id to create a {}",
            K::NAME
        )));
    }
    let client = resource.client();
    let mut body = resource.attributes_for_create();
    body.shift_remove("account_id");
    Ok(RequestDescriptor::post(client.url(format!("{}/{edge}", account_path(account_id))))
        .body(with_token(client, body)))
}

/// One edge a link or unlink call can target.
pub(crate) struct EdgeMapping {
    /// Key the caller passes (`account_id`).
    pub key: &'static str,
    /// Edge under the resource (`shared_accounts`).
    pub path: &'static str,
    /// Name the platform expects the id under.
    pub param: &'static str,
}

/// Builds `{method} {id}/{path}` from the first mapped key in `params`; the
/// key is renamed to what the platform expects.
pub(crate) fn edge_request<K: ResourceKind>(
    resource: &Resource<K>,
    method: Method,
    params: &Params,
    mappings: &[EdgeMapping],
) -> Result<RequestDescriptor, ResourceError> {
    let operation = if method == Method::Delete { "unlink" } else { "link" };
    let id = require_id(resource, operation)?;
    let mut params = params.clone();
    let (mapping, value) = mappings
        .iter()
        .find_map(|m| params.shift_remove(m.key).map(|v| (m, v)))
        .ok_or_else(|| {
            ResourceError::Request(format!(
                "missing keyword: must include one of {}; received {:?}",
                mappings.iter().map(|m| m.key).collect::<Vec<_>>().join(", "),
                params.keys().collect::<Vec<_>>()
            ))
        })?;
    params.insert(mapping.param.to_string(), value);
    let client = resource.client();
    Ok(RequestDescriptor::new(method, client.url(format!("{id}/{}", mapping.path)))
        .params(with_token(client, params)))
}

/// Copies a nested id out of an opaque attribute (`owner_business.id`) into a
/// flat foreign key. Nothing happens when the nested value is missing.
pub(crate) fn copy_nested_id<K: ResourceKind>(resource: &mut Resource<K>, source: &str, pointer: &str, target: &str) {
    let Some(id) = resource.get(source).to_json().pointer(pointer).cloned() else {
        return;
    };
    if id.is_null() {
        return;
    }
    if let Err(error) = resource.set(target, id) {
        warn!(kind = K::NAME, field = target, %error, "Could not copy nested id");
    }
}

fn require_id<K: ResourceKind>(resource: &Resource<K>, operation: &str) -> Result<String, ResourceError> {
    let id = resource.id();
    if id.is_null() {
        return Err(ResourceError::Request(format!(
            "Cannot {operation} a {} without an id",
            K::NAME
        )));
    }
    Ok(id.to_string())
}
