//! Ad accounts.
//!
//! The Graph API addresses an account as `act_<account_id>` and also returns
//! that prefixed form as `id`, so the identity here is the bare numeric
//! `account_id`.

use std::sync::OnceLock;

use crate::associations;
use crate::facebook::{
    account_path, ad::Ad, ad_creative::AdCreative, ad_set::AdSet, business::Business, campaign::Campaign,
    copy_nested_id, custom_audience::CustomAudience, index_request, pixel::Pixel, read_params, saved_audience::SavedAudience,
    with_token,
};
use crate::framework::{
    AssociationSpec, AttrType, Client, Hooks, Operation, Params, RequestDescriptor, Resource, ResourceError,
    ResourceKind, Response, Schema, Validations, On,
};
use serde_json::{json, Value as Json};

/// Requesting `direct_deals_tos_accepted` answers `(#3) Ad Account must be on
/// allowlist`, so it is not part of the default read.
pub const READ_FIELDS: &[&str] = &[
    "account_status",
    "age",
    "amount_spent",
    "balance",
    "business_city",
    "business_country_code",
    "business_name",
    "business_state",
    "business_street",
    "business_street2",
    "business_zip",
    "capabilities",
    "created_time",
    "currency",
    "disable_reason",
    "end_advertiser",
    "end_advertiser_name",
    "failed_delivery_checks",
    "funding_source",
    "funding_source_details",
    "is_direct_deals_enabled",
    "is_notifications_enabled",
    "is_personal",
    "is_prepay_account",
    "media_agency",
    "min_campaign_group_spend_cap",
    "min_daily_budget",
    "name",
    "offsite_pixels_tos_accepted",
    "owner",
    "partner",
    "rf_spec",
    "spend_cap",
    "timezone_id",
    "timezone_name",
    "timezone_offset_hours_utc",
    "tos_accepted",
    "user_tos_accepted",
];

const RELATIONAL: &[&str] = &["account_id", "business"];

/// Pacific time.
pub const DEFAULT_TIMEZONE_ID: i64 = 474;

pub struct Account;

associations! {
    Account {
        belongs_to business: Business;
        has_many campaigns: Campaign;
        has_many ad_sets: AdSet;
        has_many ads: Ad;
        has_many ad_creatives: AdCreative;
        has_many pixels: Pixel;
        has_many custom_audiences: CustomAudience;
        has_many saved_audiences: SavedAudience;
    }
}

impl ResourceKind for Account {
    const NAME: &'static str = "account";

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::builder()
                .attribute("id", AttrType::Integer)
                .attribute("business_id", AttrType::Integer)
                .attribute("name", AttrType::String)
                .attribute("status", AttrType::Integer)
                .attribute("currency", AttrType::String)
                .attribute("timezone_id", AttrType::Integer)
                .attribute("timezone_name", AttrType::String)
                .attribute("end_advertiser_id", AttrType::String)
                .attribute("media_agency_id", AttrType::String)
                .attribute("partner_id", AttrType::String)
                .attributes(&["amount_spent", "balance", "spend_cap", "min_daily_budget"], AttrType::String)
                .attributes(&["age"], AttrType::Json)
                .attributes(
                    &[
                        "business_city",
                        "business_country_code",
                        "business_name",
                        "business_state",
                        "business_street",
                        "business_street2",
                        "business_zip",
                        "end_advertiser_name",
                        "funding_source",
                    ],
                    AttrType::String,
                )
                .attributes(
                    &["is_notifications_enabled", "is_personal", "is_prepay_account", "is_direct_deals_enabled"],
                    AttrType::Boolean,
                )
                .attributes(&["capabilities", "failed_delivery_checks"], AttrType::Array)
                .attributes(
                    &["business", "funding_source_details", "owner", "rf_spec", "tos_accepted", "user_tos_accepted"],
                    AttrType::Json,
                )
                .attribute("disable_reason", AttrType::Integer)
                .attribute("created_at", AttrType::DateTime)
                .alias("account_id", "id")
                .alias("account_status", "status")
                .alias("end_advertiser", "end_advertiser_id")
                .alias("media_agency", "media_agency_id")
                .alias("partner", "partner_id")
                .alias("created_time", "created_at")
                .default("currency", "USD")
                .default("timezone_id", DEFAULT_TIMEZONE_ID)
                .default("end_advertiser_id", "NONE")
                .default("media_agency_id", "NONE")
                .default("partner_id", "NONE")
                .build()
        })
    }

    fn validations() -> &'static Validations {
        static RULES: OnceLock<Validations> = OnceLock::new();
        RULES.get_or_init(|| {
            Validations::new()
                .presence(&["name", "business_id"], On::Create)
                .numericality(&["business_id", "timezone_id"], 0, On::Always)
        })
    }

    fn hooks() -> Hooks<Self> {
        Hooks::new().after(Operation::Find, |account| {
            copy_nested_id(account, "business", "/id", "business_id")
        })
    }

    fn associations() -> &'static [AssociationSpec] {
        Self::ASSOCIATIONS
    }

    /// `GET {business_id}/owned_ad_accounts` or `GET {user_id}/adaccounts`.
    fn index_request(client: &Client, filters: &Params) -> Result<RequestDescriptor, ResourceError> {
        let edge = if filters.contains_key("business_id") {
            "owned_ad_accounts"
        } else {
            "adaccounts"
        };
        index_request::<Self>(client, filters, &["business_id", "user_id"], edge, READ_FIELDS, RELATIONAL)
    }

    fn read_request(resource: &Resource<Self>, params: &Params) -> Result<RequestDescriptor, ResourceError> {
        let client = resource.client();
        Ok(RequestDescriptor::get(client.url(act_path(resource)?))
            .params(read_params(client, params, READ_FIELDS, RELATIONAL)))
    }

    /// `POST {business_id}/adaccount`. The platform expects the page/app
    /// aliases as plain strings, `NONE` when unset.
    fn create_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        let business_id = resource.get("business_id");
        if business_id.is_null() {
            return Err(ResourceError::Request("Expected business_id to create an account".to_string()));
        }
        let client = resource.client();
        let mut body = resource.attributes_for_create();
        body.shift_remove("business_id");
        Ok(RequestDescriptor::post(client.url(format!("{business_id}/adaccount"))).body(with_token(client, body)))
    }

    fn update_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        let client = resource.client();
        Ok(RequestDescriptor::post(client.url(act_path(resource)?))
            .body(with_token(client, resource.attributes_for_update())))
    }

    fn delete_request(_resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        Err(ResourceError::Request("Cannot delete an ad account".to_string()))
    }

    /// Creation answers with both `id` (`act_<n>`) and the bare `account_id`.
    fn create_response_id(response: &Response) -> Option<Json> {
        let body = response.body();
        body.get("account_id").or_else(|| body.get("id")).cloned()
    }

    /// `act_123` and `123` name the same account.
    fn identity_value(raw: &Json) -> Json {
        match raw.as_str() {
            Some(id) => json!(id.strip_prefix("act_").unwrap_or(id)),
            None => raw.clone(),
        }
    }
}

fn act_path(resource: &Resource<Account>) -> Result<String, ResourceError> {
    let id = resource.id();
    if id.is_null() {
        return Err(ResourceError::Request("Cannot address an account without an id".to_string()));
    }
    Ok(account_path(id))
}
