use std::sync::OnceLock;

use crate::associations;
use crate::facebook::{
    account::Account, ad::Ad, ad_set::AdSet, create_under_account, delete_request, index_request, read_request,
    update_request,
};
use crate::framework::{
    AssociationSpec, AttrType, Client, On, Params, RequestDescriptor, Resource, ResourceError, ResourceKind, Schema,
    Validations,
};

pub const READ_FIELDS: &[&str] = &[
    "ad_strategy_id",
    "adlabels",
    "bid_strategy",
    "budget_remaining",
    "buying_type",
    "can_use_spend_cap",
    "configured_status",
    "created_time",
    "daily_budget",
    "effective_status",
    "issues_info",
    "last_budget_toggling_time",
    "lifetime_budget",
    "name",
    "objective",
    "pacing_type",
    "promoted_object",
    "source_campaign",
    "source_campaign_id",
    "special_ad_categories",
    "special_ad_category",
    "special_ad_category_country",
    "spend_cap",
    "start_time",
    "status",
    "stop_time",
    "updated_time",
];

const RELATIONAL: &[&str] = &["account_id"];

pub const STATUSES: &[&str] = &["ACTIVE", "PAUSED", "DELETED", "ARCHIVED"];

pub struct Campaign;

associations! {
    Campaign {
        belongs_to account: Account;
        has_many ad_sets: AdSet;
        has_many ads: Ad;
    }
}

impl ResourceKind for Campaign {
    const NAME: &'static str = "campaign";

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::builder()
                .attribute("id", AttrType::Integer)
                .attribute("account_id", AttrType::Integer)
                .attribute("name", AttrType::String)
                .attribute("bid_strategy", AttrType::Enum)
                .attribute("buying_type", AttrType::Enum)
                .attribute("objective", AttrType::Enum)
                .attribute("status", AttrType::Enum)
                .attribute("configured_status", AttrType::Enum)
                .attribute("effective_status", AttrType::Enum)
                .attribute("special_ad_categories", AttrType::Array)
                .attributes(
                    &["daily_budget", "lifetime_budget", "budget_remaining", "spend_cap"],
                    AttrType::Integer,
                )
                .attributes(&["ad_labels", "issues_info"], AttrType::Array)
                .attribute("promoted_object", AttrType::Json)
                .attributes(&["created_at", "start_at", "stop_at", "updated_at"], AttrType::DateTime)
                .alias("adlabels", "ad_labels")
                .alias("created_time", "created_at")
                .alias("start_time", "start_at")
                .alias("stop_time", "stop_at")
                .alias("updated_time", "updated_at")
                .default("objective", "LINK_CLICKS")
                .default("special_ad_categories", serde_json::json!([]))
                .default("status", "PAUSED")
                .build()
        })
    }

    fn validations() -> &'static Validations {
        static RULES: OnceLock<Validations> = OnceLock::new();
        RULES.get_or_init(|| {
            Validations::new()
                .presence(&["name", "status", "objective"], On::Create)
                .inclusion("status", STATUSES, On::Always)
                .numericality(&["account_id", "daily_budget", "lifetime_budget"], 0, On::Always)
        })
    }

    fn associations() -> &'static [AssociationSpec] {
        Self::ASSOCIATIONS
    }

    fn index_request(client: &Client, filters: &Params) -> Result<RequestDescriptor, ResourceError> {
        index_request::<Self>(client, filters, &["account_id"], "campaigns", READ_FIELDS, RELATIONAL)
    }

    fn read_request(resource: &Resource<Self>, params: &Params) -> Result<RequestDescriptor, ResourceError> {
        read_request(resource, params, READ_FIELDS, RELATIONAL)
    }

    fn create_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        create_under_account(resource, "campaigns")
    }

    fn update_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        update_request(resource)
    }

    fn delete_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        delete_request(resource)
    }
}
