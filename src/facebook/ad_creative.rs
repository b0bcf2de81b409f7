use std::sync::OnceLock;

use crate::associations;
use crate::facebook::{
    account::Account, create_under_account, delete_request, index_request, read_request, update_request,
};
use crate::framework::{
    AssociationSpec, AttrType, Client, On, Params, RequestDescriptor, Resource, ResourceError, ResourceKind, Schema,
    Validations,
};

pub const READ_FIELDS: &[&str] = &[
    "account_id",
    "actor_id",
    "applink_treatment",
    "asset_feed_spec",
    "authorization_category",
    "body",
    "branded_content_sponsor_page_id",
    "bundle_folder_id",
    "call_to_action_type",
    "categorization_criteria",
    "category_media_source",
    "destination_set_id",
    "dynamic_ad_voice",
    "effective_authorization_category",
    "effective_object_story_id",
    "enable_direct_install",
    "enable_launch_instant_app",
    "image_crops",
    "image_hash",
    "image_url",
    "interactive_components_spec",
    "link_destination_display_url",
    "link_og_id",
    "link_url",
    "messenger_sponsored_message",
    "name",
    "object_id",
    "object_store_url",
    "object_story_id",
    "object_story_spec",
    "object_type",
    "object_url",
    "place_page_set_id",
    "platform_customizations",
    "playable_asset_id",
    "portrait_customizations",
    "product_set_id",
    "recommender_settings",
    "status",
    "template_url",
    "template_url_spec",
    "thumbnail_url",
    "title",
    "url_tags",
    "use_page_actor_override",
    "video_id",
];

const RELATIONAL: &[&str] = &["account_id"];

pub struct AdCreative;

associations! {
    AdCreative {
        belongs_to account: Account;
    }
}

impl ResourceKind for AdCreative {
    const NAME: &'static str = "ad_creative";

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::builder()
                .attributes(&["id", "account_id", "actor_id", "product_set_id", "video_id"], AttrType::Integer)
                .attributes(
                    &[
                        "name",
                        "description",
                        "title",
                        "call_to_action_type",
                        "image_hash",
                        "image_url",
                        "link_url",
                        "object_story_id",
                        "object_type",
                        "object_url",
                        "thumbnail_url",
                        "url_tags",
                    ],
                    AttrType::String,
                )
                .attribute("status", AttrType::Enum)
                .attribute("titles", AttrType::Array)
                .attributes(
                    &["asset_feed_spec", "image_crops", "object_story_spec", "platform_customizations", "template_url_spec"],
                    AttrType::Json,
                )
                .attribute("use_page_actor_override", AttrType::Boolean)
                .alias("body", "description")
                .build()
        })
    }

    fn validations() -> &'static Validations {
        static RULES: OnceLock<Validations> = OnceLock::new();
        RULES.get_or_init(|| {
            Validations::new()
                .presence(&["name"], On::Create)
                .titles_length("titles", &[24, 50], On::Always)
        })
    }

    fn associations() -> &'static [AssociationSpec] {
        Self::ASSOCIATIONS
    }

    /// `GET {ad_id}/adcreatives` or `GET act_{account_id}/adcreatives`.
    fn index_request(client: &Client, filters: &Params) -> Result<RequestDescriptor, ResourceError> {
        index_request::<Self>(client, filters, &["ad_id", "account_id"], "adcreatives", READ_FIELDS, RELATIONAL)
    }

    fn read_request(resource: &Resource<Self>, params: &Params) -> Result<RequestDescriptor, ResourceError> {
        read_request(resource, params, READ_FIELDS, RELATIONAL)
    }

    fn create_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        create_under_account(resource, "adcreatives")
    }

    fn update_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        update_request(resource)
    }

    fn delete_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        delete_request(resource)
    }
}
