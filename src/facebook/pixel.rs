//! Ads pixels.
//!
//! A pixel is owned by one ad account or business and may be shared with
//! others. Reads request `owner_ad_account` and `owner_business`, and the
//! after-find hooks flatten them into `account_id` and `business_id`.

use std::sync::OnceLock;

use crate::associations;
use crate::facebook::{
    account::Account, business::Business, copy_nested_id, create_under_account, custom_audience::CustomAudience,
    edge_request, index_request, read_request, update_request, EdgeMapping,
};
use crate::framework::{
    AssociationSpec, AttrType, Client, Hooks, Method, On, Operation, Params, RequestDescriptor, Resource,
    ResourceError, ResourceKind, Schema, Validations,
};

pub const READ_FIELDS: &[&str] = &[
    "id",
    "automatic_matching_fields",
    "can_proxy",
    "code",
    "creation_time",
    "data_use_setting",
    "enable_automatic_matching",
    "first_party_cookie_status",
    "is_created_by_business",
    "is_crm",
    "is_unavailable",
    "last_fired_time",
    "name",
    "owner_ad_account",
    "owner_business",
];

const RELATIONAL: &[&str] = &["owner_ad_account", "owner_business"];

pub const DATA_USE_SETTINGS: &[&str] = &["EMPTY", "ADVERTISING_AND_ANALYTICS", "ANALYTICS_ONLY"];

pub const FIRST_PARTY_COOKIE_STATUS: &[&str] =
    &["EMPTY", "FIRST_PARTY_COOKIE_ENABLED", "FIRST_PARTY_COOKIE_DISABLED"];

const SHARED_WITH: &[EdgeMapping] = &[
    EdgeMapping {
        key: "account_id",
        path: "shared_accounts",
        param: "account_id",
    },
    EdgeMapping {
        key: "business_id",
        path: "shared_accounts",
        param: "business",
    },
];

pub struct Pixel;

associations! {
    Pixel {
        belongs_to account: Account;
        belongs_to business: Business;
        has_many custom_audiences: CustomAudience;
    }
}

impl ResourceKind for Pixel {
    const NAME: &'static str = "pixel";

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::builder()
                .attributes(&["id", "account_id", "business_id"], AttrType::Integer)
                .attributes(&["name", "code", "data_use_setting", "first_party_cookie_status"], AttrType::String)
                .attributes(&["automatic_matching_fields", "server_events_business_ids"], AttrType::Array)
                .attributes(
                    &["can_proxy", "enable_automatic_matching", "is_created_by_business", "is_crm", "is_unavailable"],
                    AttrType::Boolean,
                )
                .attributes(&["creator", "owner_ad_account", "owner_business"], AttrType::Json)
                .attributes(&["created_at", "last_fired_at"], AttrType::DateTime)
                .alias("creation_time", "created_at")
                .alias("last_fired_time", "last_fired_at")
                .build()
        })
    }

    fn validations() -> &'static Validations {
        static RULES: OnceLock<Validations> = OnceLock::new();
        RULES.get_or_init(|| {
            Validations::new()
                .presence(&["name"], On::Create)
                .inclusion_ignore_case("data_use_setting", DATA_USE_SETTINGS, On::Always)
                .inclusion_ignore_case("first_party_cookie_status", FIRST_PARTY_COOKIE_STATUS, On::Always)
        })
    }

    fn hooks() -> Hooks<Self> {
        Hooks::new()
            .after(Operation::Find, |pixel| {
                copy_nested_id(pixel, "owner_ad_account", "/account_id", "account_id")
            })
            .after(Operation::Find, |pixel| {
                copy_nested_id(pixel, "owner_business", "/id", "business_id")
            })
    }

    fn associations() -> &'static [AssociationSpec] {
        Self::ASSOCIATIONS
    }

    fn index_request(client: &Client, filters: &Params) -> Result<RequestDescriptor, ResourceError> {
        index_request::<Self>(client, filters, &["account_id", "business_id"], "adspixels", READ_FIELDS, &[])
    }

    fn read_request(resource: &Resource<Self>, params: &Params) -> Result<RequestDescriptor, ResourceError> {
        read_request(resource, params, READ_FIELDS, RELATIONAL)
    }

    fn create_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        create_under_account(resource, "adspixels")
    }

    fn update_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        update_request(resource)
    }

    fn delete_request(_resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        Err(ResourceError::Request("Cannot delete a pixel".to_string()))
    }

    /// Shares the pixel: `POST {id}/shared_accounts`.
    fn link_request(resource: &Resource<Self>, params: &Params) -> Result<RequestDescriptor, ResourceError> {
        edge_request(resource, Method::Post, params, SHARED_WITH)
    }

    /// Stops sharing: `DELETE {id}/shared_accounts`.
    fn unlink_request(resource: &Resource<Self>, params: &Params) -> Result<RequestDescriptor, ResourceError> {
        edge_request(resource, Method::Delete, params, SHARED_WITH)
    }
}
