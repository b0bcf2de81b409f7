use std::sync::OnceLock;

use crate::associations;
use crate::facebook::{
    account::Account, create_under_account, delete_request, index_request, pixel::Pixel, read_request,
    update_request,
};
use crate::framework::{
    AssociationSpec, AttrType, Client, On, Params, RequestDescriptor, Resource, ResourceError, ResourceKind, Schema,
    Validations,
};

pub const READ_FIELDS: &[&str] = &[
    "id",
    "account_id",
    "approximate_count",
    "customer_file_source",
    "data_source",
    "delivery_status",
    "description",
    "external_event_source",
    "is_value_based",
    "lookalike_audience_ids",
    "lookalike_spec",
    "name",
    "operation_status",
    "opt_out_link",
    "permission_for_actions",
    "pixel_id",
    "retention_days",
    "rule",
    "rule_aggregation",
    "sharing_status",
    "subtype",
    "time_content_updated",
    "time_created",
    "time_updated",
];

const RELATIONAL: &[&str] = &["account_id", "pixel_id"];

pub const CLAIM_OBJECTIVES: &[&str] = &[
    "AUTOMOTIVE_MODEL",
    "COLLABORATIVE_ADS",
    "HOME_LISTING",
    "MEDIA_TITLE",
    "PRODUCT",
    "TRAVEL",
    "VEHICLE",
    "VEHICLE_OFFER",
];

pub const CONTENT_TYPES: &[&str] = &[
    "AUTOMOTIVE_MODEL",
    "DESTINATION",
    "FLIGHT",
    "HOME_LISTING",
    "HOTEL",
    "JOB",
    "LOCAL_SERVICE_BUSINESS",
    "LOCATION_BASED_ITEM",
    "MEDIA_TITLE",
    "OFFLINE_PRODUCT",
    "PRODUCT",
    "VEHICLE",
    "VEHICLE_OFFER",
];

pub const CUSTOMER_FILE_SOURCES: &[&str] =
    &["USER_PROVIDED_ONLY", "PARTNER_PROVIDED_ONLY", "BOTH_USER_AND_PARTNER_PROVIDED"];

pub const SUBTYPES: &[&str] = &[
    "CUSTOM",
    "WEBSITE",
    "APP",
    "OFFLINE_CONVERSION",
    "CLAIM",
    "PARTNER",
    "MANAGED",
    "VIDEO",
    "LOOKALIKE",
    "ENGAGEMENT",
    "BAG_OF_ACCOUNTS",
    "STUDY_RULE_AUDIENCE",
    "FOX",
    "MEASUREMENT",
    "REGULATED_CATEGORIES_AUDIENCE",
];

pub struct CustomAudience;

associations! {
    CustomAudience {
        belongs_to account: Account;
        belongs_to pixel: Pixel;
    }
}

impl ResourceKind for CustomAudience {
    const NAME: &'static str = "custom_audience";

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::builder()
                .attributes(
                    &[
                        "id",
                        "account_id",
                        "approximate_count",
                        "dataset_id",
                        "event_source_group",
                        "origin_audience_id",
                        "pixel_id",
                        "product_set_id",
                        "retention_days",
                        "content_updated_at",
                    ],
                    AttrType::Integer,
                )
                .attributes(&["name", "description", "opt_out_link", "rule", "rule_aggregation"], AttrType::String)
                .attributes(&["claim_objective", "content_type", "customer_file_source", "subtype"], AttrType::Enum)
                .attributes(&["allowed_domains", "lookalike_audience_ids"], AttrType::Array)
                .attributes(&["enable_fetch_or_create", "is_value_based", "prefill"], AttrType::Boolean)
                .attributes(
                    &[
                        "data_source",
                        "delivery_status",
                        "event_sources",
                        "external_event_source",
                        "lookalike_spec",
                        "operation_status",
                        "permission_for_actions",
                        "sharing_status",
                    ],
                    AttrType::Json,
                )
                .attributes(&["created_at", "updated_at"], AttrType::DateTime)
                .alias("time_content_updated", "content_updated_at")
                .alias("time_created", "created_at")
                .alias("time_updated", "updated_at")
                .build()
        })
    }

    fn validations() -> &'static Validations {
        static RULES: OnceLock<Validations> = OnceLock::new();
        RULES.get_or_init(|| {
            Validations::new()
                .presence(&["account_id", "name", "subtype"], On::Create)
                .inclusion("claim_objective", CLAIM_OBJECTIVES, On::Always)
                .inclusion("content_type", CONTENT_TYPES, On::Always)
                .inclusion("customer_file_source", CUSTOMER_FILE_SOURCES, On::Always)
                .inclusion_required("subtype", SUBTYPES, On::Create)
                .numericality(
                    &["account_id", "dataset_id", "origin_audience_id", "pixel_id"],
                    0,
                    On::Create,
                )
                .numericality(&["product_set_id"], 0, On::Always)
        })
    }

    fn associations() -> &'static [AssociationSpec] {
        Self::ASSOCIATIONS
    }

    fn index_request(client: &Client, filters: &Params) -> Result<RequestDescriptor, ResourceError> {
        index_request::<Self>(
            client,
            filters,
            &["account_id", "pixel_id"],
            "customaudiences",
            READ_FIELDS,
            RELATIONAL,
        )
    }

    fn read_request(resource: &Resource<Self>, params: &Params) -> Result<RequestDescriptor, ResourceError> {
        read_request(resource, params, READ_FIELDS, RELATIONAL)
    }

    fn create_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        create_under_account(resource, "customaudiences")
    }

    fn update_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        update_request(resource)
    }

    fn delete_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        delete_request(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facebook::{base_url, API_VERSION};
    use crate::framework::mock::MockTransport;
    use serde_json::json;
    use std::sync::Arc;

    fn client(mock: &MockTransport) -> Client {
        Client::new(Arc::new(mock.clone()), base_url(API_VERSION)).with_access_token("token")
    }

    #[test]
    fn test_subtype_required_on_create_only() {
        let mock = MockTransport::new();
        let mut audience =
            Resource::<CustomAudience>::build(&client(&mock), json!({ "account_id": 1, "name": "Buyers" })).unwrap();
        assert!(!audience.is_valid());
        assert_eq!(audience.errors().on("subtype").len(), 2);

        let mut stored =
            Resource::<CustomAudience>::stale(&client(&mock), json!({ "id": 4, "name": "Buyers" })).unwrap();
        assert!(stored.is_valid());
    }

    #[test]
    fn test_subtype_inclusion_message() {
        let mock = MockTransport::new();
        let mut audience = Resource::<CustomAudience>::build(
            &client(&mock),
            json!({ "account_id": 1, "name": "Buyers", "subtype": "FRIENDS" }),
        )
        .unwrap();
        assert!(!audience.is_valid());
        let message = audience.errors().on("subtype")[0].to_string();
        assert!(message.starts_with("FRIENDS is not included in the list: CUSTOM, WEBSITE"));
    }
}
