//! Ad sets group ads under one budget, schedule and targeting.

use std::sync::OnceLock;

use crate::associations;
use crate::facebook::{
    account::Account, ad::Ad, campaign::Campaign, create_under_account, delete_request, index_request, read_request,
    update_request,
};
use crate::framework::{
    AssociationSpec, AttrType, Client, On, Params, RequestDescriptor, Resource, ResourceError, ResourceKind, Schema,
    Validations,
};

pub const READ_FIELDS: &[&str] = &[
    "id",
    "account_id",
    "adlabels",
    "adset_schedule",
    "asset_feed_id",
    "attribution_spec",
    "bid_adjustments",
    "bid_amount",
    "bid_constraints",
    "bid_info",
    "bid_strategy",
    "billing_event",
    "budget_remaining",
    "campaign_id",
    "configured_status",
    "created_time",
    "creative_sequence",
    "daily_budget",
    "daily_min_spend_target",
    "daily_spend_cap",
    "destination_type",
    "effective_status",
    "end_time",
    "frequency_control_specs",
    "instagram_actor_id",
    "is_dynamic_creative",
    "issues_info",
    "learning_stage_info",
    "lifetime_budget",
    "lifetime_imps",
    "lifetime_min_spend_target",
    "lifetime_spend_cap",
    "multi_optimization_goal_weight",
    "name",
    "optimization_goal",
    "optimization_sub_event",
    "pacing_type",
    "promoted_object",
    "recommendations",
    "recurring_budget_semantics",
    "review_feedback",
    "rf_prediction_id",
    "source_adset",
    "source_adset_id",
    "start_time",
    "status",
    "targeting",
    "time_based_ad_rotation_id_blocks",
    "time_based_ad_rotation_intervals",
    "updated_time",
    "use_new_app_click",
];

const RELATIONAL: &[&str] = &["account_id", "campaign_id"];

pub const BID_STRATEGIES: &[&str] = &["LOWEST_COST_WITHOUT_CAP", "LOWEST_COST_WITH_BID_CAP", "COST_CAP"];

pub const BILLING_EVENTS: &[&str] = &[
    "APP_INSTALLS",
    "CLICKS",
    "IMPRESSIONS",
    "LINK_CLICKS",
    "NONE",
    "OFFER_CLAIMS",
    "PAGE_LIKES",
    "POST_ENGAGEMENT",
    "THRUPLAY",
    "PURCHASE",
    "LISTING_INTERACTION",
];

pub const DESTINATION_TYPES: &[&str] = &["UNDEFINED", "WEBSITE", "APP", "MESSENGER", "APPLINKS_AUTOMATIC", "FACEBOOK"];

pub const MULTI_OPTIMIZATION_GOAL_WEIGHTS: &[&str] = &["UNDEFINED", "BALANCED", "PREFER_INSTALL", "PREFER_EVENT"];

pub const OPTIMIZATION_GOALS: &[&str] = &[
    "NONE",
    "APP_INSTALLS",
    "BRAND_AWARENESS",
    "AD_RECALL_LIFT",
    "CLICKS",
    "ENGAGED_USERS",
    "EVENT_RESPONSES",
    "IMPRESSIONS",
    "LEAD_GENERATION",
    "QUALITY_LEAD",
    "LINK_CLICKS",
    "OFFER_CLAIMS",
    "OFFSITE_CONVERSIONS",
    "PAGE_ENGAGEMENT",
    "PAGE_LIKES",
    "POST_ENGAGEMENT",
    "QUALITY_CALL",
    "REACH",
    "SOCIAL_IMPRESSIONS",
    "APP_DOWNLOADS",
    "TWO_SECOND_CONTINUOUS_VIDEO_VIEWS",
    "LANDING_PAGE_VIEWS",
    "VISIT_INSTAGRAM_PROFILE",
    "VALUE",
    "THRUPLAY",
    "REPLIES",
    "DERIVED_EVENTS",
];

pub const OPTIMIZATION_SUB_EVENTS: &[&str] = &[
    "NONE",
    "VIDEO_SOUND_ON",
    "TRIP_CONSIDERATION",
    "TRAVEL_INTENT",
    "TRAVEL_INTENT_NO_DESTINATION_INTENT",
    "TRAVEL_INTENT_BUCKET_01",
    "TRAVEL_INTENT_BUCKET_02",
    "TRAVEL_INTENT_BUCKET_03",
    "TRAVEL_INTENT_BUCKET_04",
    "TRAVEL_INTENT_BUCKET_05",
];

pub const STATUSES: &[&str] = &["ACTIVE", "PAUSED", "DELETED", "ARCHIVED"];

pub const TUNE_FOR_CATEGORIES: &[&str] = &["NONE", "EMPLOYMENT", "HOUSING", "CREDIT", "ISSUES_ELECTIONS_POLITICS"];

pub struct AdSet;

associations! {
    AdSet {
        belongs_to account: Account;
        belongs_to campaign: Campaign;
        has_many ads: Ad;
    }
}

impl ResourceKind for AdSet {
    const NAME: &'static str = "ad_set";

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::builder()
                .attributes(
                    &[
                        "id",
                        "account_id",
                        "asset_feed_id",
                        "bid_amount",
                        "budget_remaining",
                        "campaign_id",
                        "daily_budget",
                        "daily_imps",
                        "daily_min_spend_target",
                        "daily_spend_cap",
                        "instagram_actor_id",
                        "lifetime_budget",
                        "lifetime_imps",
                        "lifetime_min_spend_target",
                        "lifetime_spend_cap",
                        "rf_prediction_id",
                        "source_adset_id",
                    ],
                    AttrType::Integer,
                )
                .attributes(&["name", "review_feedback"], AttrType::String)
                .attributes(
                    &[
                        "bid_strategy",
                        "billing_event",
                        "configured_status",
                        "destination_type",
                        "effective_status",
                        "multi_optimization_goal_weight",
                        "optimization_goal",
                        "optimization_sub_event",
                        "status",
                        "tune_for_category",
                    ],
                    AttrType::Enum,
                )
                .attributes(
                    &[
                        "ad_labels",
                        "adset_schedule",
                        "attribution_spec",
                        "creative_sequence",
                        "execution_options",
                        "frequency_control_specs",
                        "issues_info",
                        "pacing_type",
                        "recommendations",
                        "time_based_ad_rotation_id_blocks",
                        "time_based_ad_rotation_intervals",
                    ],
                    AttrType::Array,
                )
                .attributes(
                    &[
                        "bid_adjustments",
                        "bid_constraints",
                        "bid_info",
                        "campaign_spec",
                        "contextual_bundling_spec",
                        "learning_stage_info",
                        "promoted_object",
                        "source_adset",
                        "targeting",
                    ],
                    AttrType::Json,
                )
                .attributes(
                    &["is_dynamic_creative", "recurring_budget_semantics", "use_new_app_click"],
                    AttrType::Boolean,
                )
                .attributes(
                    &["created_at", "end_at", "start_at", "time_start", "time_stop", "updated_at"],
                    AttrType::DateTime,
                )
                .alias("adlabels", "ad_labels")
                .alias("created_time", "created_at")
                .alias("end_time", "end_at")
                .alias("start_time", "start_at")
                .alias("updated_time", "updated_at")
                .build()
        })
    }

    fn validations() -> &'static Validations {
        static RULES: OnceLock<Validations> = OnceLock::new();
        RULES.get_or_init(|| {
            Validations::new()
                .presence(&["name", "status"], On::Create)
                .inclusion("bid_strategy", BID_STRATEGIES, On::Always)
                .inclusion("billing_event", BILLING_EVENTS, On::Always)
                .inclusion("destination_type", DESTINATION_TYPES, On::Always)
                .inclusion("multi_optimization_goal_weight", MULTI_OPTIMIZATION_GOAL_WEIGHTS, On::Always)
                .inclusion("optimization_goal", OPTIMIZATION_GOALS, On::Always)
                .inclusion("optimization_sub_event", OPTIMIZATION_SUB_EVENTS, On::Always)
                .inclusion("status", STATUSES, On::Always)
                .inclusion("tune_for_category", TUNE_FOR_CATEGORIES, On::Always)
                .numericality(
                    &[
                        "account_id",
                        "campaign_id",
                        "bid_amount",
                        "daily_budget",
                        "daily_imps",
                        "daily_min_spend_target",
                        "daily_spend_cap",
                        "lifetime_budget",
                        "lifetime_imps",
                        "lifetime_min_spend_target",
                        "lifetime_spend_cap",
                        "rf_prediction_id",
                    ],
                    0,
                    On::Always,
                )
        })
    }

    fn associations() -> &'static [AssociationSpec] {
        Self::ASSOCIATIONS
    }

    /// `GET {campaign_id}/adsets`, or `GET act_{account_id}/adsets`.
    fn index_request(client: &Client, filters: &Params) -> Result<RequestDescriptor, ResourceError> {
        index_request::<Self>(client, filters, &["campaign_id", "account_id"], "adsets", READ_FIELDS, RELATIONAL)
    }

    fn read_request(resource: &Resource<Self>, params: &Params) -> Result<RequestDescriptor, ResourceError> {
        read_request(resource, params, READ_FIELDS, RELATIONAL)
    }

    fn create_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        create_under_account(resource, "adsets")
    }

    fn update_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        update_request(resource)
    }

    fn delete_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        delete_request(resource)
    }
}
