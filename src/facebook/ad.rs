use std::sync::OnceLock;

use crate::associations;
use crate::facebook::{
    account::Account, ad_creative::AdCreative, ad_set::AdSet, campaign::Campaign, create_under_account,
    delete_request, index_request, read_request, update_request,
};
use crate::framework::{
    AssociationSpec, AttrType, Client, On, Params, RequestDescriptor, Resource, ResourceError, ResourceKind, Schema,
    Validations,
};

pub const READ_FIELDS: &[&str] = &[
    "account_id",
    "ad_review_feedback",
    "adlabels",
    "adset_id",
    "bid_amount",
    "campaign_id",
    "configured_status",
    "conversion_domain",
    "created_time",
    "creative",
    "effective_status",
    "issues_info",
    "last_updated_by_app_id",
    "name",
    "preview_shareable_link",
    "recommendations",
    "source_ad_id",
    "status",
    "tracking_specs",
    "updated_time",
];

const RELATIONAL: &[&str] = &["account_id", "campaign_id", "adset_id"];

pub const STATUSES: &[&str] = &["ACTIVE", "PAUSED", "DELETED", "ARCHIVED"];

pub struct Ad;

associations! {
    Ad {
        belongs_to account: Account;
        belongs_to campaign: Campaign;
        belongs_to ad_set: AdSet;
        has_many ad_creatives: AdCreative;
    }
}

impl ResourceKind for Ad {
    const NAME: &'static str = "ad";

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::builder()
                .attributes(
                    &["id", "account_id", "ad_set_id", "campaign_id", "bid_amount", "source_ad_id"],
                    AttrType::Integer,
                )
                .attributes(&["name", "title", "conversion_domain", "preview_shareable_link"], AttrType::String)
                .attributes(&["status", "configured_status", "effective_status"], AttrType::Enum)
                .attributes(&["creative", "ad_review_feedback"], AttrType::Json)
                .attributes(&["ad_labels", "issues_info", "recommendations", "tracking_specs"], AttrType::Array)
                .attributes(&["created_at", "updated_at"], AttrType::DateTime)
                .alias("adset_id", "ad_set_id")
                .alias("adlabels", "ad_labels")
                .alias("created_time", "created_at")
                .alias("updated_time", "updated_at")
                .default("status", "PAUSED")
                .build()
        })
    }

    fn validations() -> &'static Validations {
        static RULES: OnceLock<Validations> = OnceLock::new();
        RULES.get_or_init(|| {
            Validations::new()
                .presence(&["name", "status"], On::Create)
                .inclusion("status", STATUSES, On::Always)
                .length("title", 24, On::Always)
        })
    }

    fn associations() -> &'static [AssociationSpec] {
        Self::ASSOCIATIONS
    }

    /// Lists under the narrowest parent given: ad set, campaign, then account.
    fn index_request(client: &Client, filters: &Params) -> Result<RequestDescriptor, ResourceError> {
        index_request::<Self>(
            client,
            filters,
            &["ad_set_id", "campaign_id", "account_id"],
            "ads",
            READ_FIELDS,
            RELATIONAL,
        )
    }

    fn read_request(resource: &Resource<Self>, params: &Params) -> Result<RequestDescriptor, ResourceError> {
        read_request(resource, params, READ_FIELDS, RELATIONAL)
    }

    fn create_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        create_under_account(resource, "ads")
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
    use crate::framework::{Method, Value};
    use serde_json::json;
    use std::sync::Arc;

    fn client(mock: &MockTransport) -> Client {
        Client::new(Arc::new(mock.clone()), base_url(API_VERSION)).with_access_token("token")
    }

    #[tokio::test]
    async fn test_ad_set_id_travels_as_adset_id() {
        let mock = MockTransport::new();
        mock.expect(Method::Post, "https://graph.facebook.com/v11.0/act_1/ads")
            .return_ok(json!({ "id": "31" }));
        let mut ad = Resource::<Ad>::build(
            &client(&mock),
            json!({ "account_id": 1, "ad_set_id": 20, "name": "Carousel", "creative": { "creative_id": "5" } }),
        )
        .unwrap();

        assert!(ad.save_strict().await.unwrap());

        let body = mock.requests()[0].json_body().cloned().unwrap();
        assert_eq!(body["adset_id"], json!(20));
        assert_eq!(body["creative"], json!({ "creative_id": "5" }));
        assert!(!body.contains_key("ad_set_id"));
    }

    #[tokio::test]
    async fn test_find_hydrates_wire_names() {
        let mock = MockTransport::new();
        mock.expect(Method::Get, "https://graph.facebook.com/v11.0/31")
            .return_ok(json!({ "id": "31", "adset_id": "20", "name": "Carousel", "status": "ACTIVE" }));

        let ad = Resource::<Ad>::find(&client(&mock), 31).await.unwrap();

        assert_eq!(ad.ad_set_id(), &Value::Integer(20));
        let fields = mock.requests()[0].query()["fields"].as_str().unwrap().to_string();
        assert!(fields.ends_with("updated_time"));
        assert!(fields.contains("adset_id"));
    }

    #[test]
    fn test_title_length() {
        let mock = MockTransport::new();
        let mut ad = Resource::<Ad>::build(
            &client(&mock),
            json!({ "name": "n", "title": "a title that is much too long for this slot" }),
        )
        .unwrap();
        assert!(!ad.is_valid());
        assert_eq!(ad.errors().on("title"), vec!["is too long (maximum is 24 characters)"]);
    }
}
