//! Business Manager accounts.

use std::sync::OnceLock;

use crate::associations;
use crate::facebook::{
    account::Account, copy_nested_id, edge_request, index_request, page::Page, pixel::Pixel, read_request,
    update_request, user::User, with_token, EdgeMapping,
};
use crate::framework::{
    AssociationSpec, AttrType, Client, Hooks, Method, On, Operation, Params, RequestDescriptor, Resource,
    ResourceError, ResourceKind, Schema, Validations,
};

pub const READ_FIELDS: &[&str] = &[
    "id",
    "block_offline_analytics",
    "created_by",
    "created_time",
    "extended_updated_time",
    "is_hidden",
    "link",
    "name",
    "payment_account_id",
    "primary_page",
    "profile_picture_uri",
    "timezone_id",
    "two_factor_type",
    "updated_by",
    "updated_time",
    "verification_status",
    "vertical",
    "vertical_id",
];

pub const SURVEY_BUSINESS_TYPES: &[&str] = &["AGENCY", "ADVERTISER", "APP_DEVELOPER", "PUBLISHER"];

pub const VERTICALS: &[&str] = &[
    "ADVERTISING",
    "AUTOMOTIVE",
    "CONSUMER_PACKAGED_GOODS",
    "ECOMMERCE",
    "EDUCATION",
    "ENERGY_AND_UTILITIES",
    "ENTERTAINMENT_AND_MEDIA",
    "FINANCIAL_SERVICES",
    "GAMING",
    "GOVERNMENT_AND_POLITICS",
    "MARKETING",
    "ORGANIZATIONS_AND_ASSOCIATIONS",
    "PROFESSIONAL_SERVICES",
    "RETAIL",
    "TECHNOLOGY",
    "TELECOM",
    "TRAVEL",
    "NON_PROFIT",
    "RESTAURANT",
    "HEALTH",
    "LUXURY",
    "OTHER",
];

const UNLINKABLE: &[EdgeMapping] = &[
    EdgeMapping {
        key: "ad_account_id",
        path: "ad_accounts",
        param: "adaccount_id",
    },
    EdgeMapping {
        key: "agency_id",
        path: "agencies",
        param: "business",
    },
    EdgeMapping {
        key: "client_id",
        path: "clients",
        param: "business",
    },
    EdgeMapping {
        key: "instagram_account_id",
        path: "instagram_accounts",
        param: "instagram_account",
    },
    EdgeMapping {
        key: "owned_business_id",
        path: "owned_businesses",
        param: "client_id",
    },
    EdgeMapping {
        key: "page_id",
        path: "pages",
        param: "page_id",
    },
];

pub struct Business;

associations! {
    Business {
        belongs_to user: User;
        belongs_to page: Page;
        has_many accounts: Account;
        has_many pixels: Pixel;
    }
}

impl ResourceKind for Business {
    const NAME: &'static str = "business";

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::builder()
                .attributes(
                    &[
                        "id",
                        "page_id",
                        "payment_account_id",
                        "survey_num_assets",
                        "survey_num_people",
                        "timezone_id",
                        "user_id",
                        "vertical_id",
                    ],
                    AttrType::Integer,
                )
                .attributes(
                    &[
                        "name",
                        "child_business_external_id",
                        "email",
                        "link",
                        "profile_picture_uri",
                        "sales_rep_email",
                        "two_factor_type",
                        "verification_status",
                    ],
                    AttrType::String,
                )
                .attributes(&["survey_business_type", "vertical"], AttrType::Enum)
                .attributes(&["block_offline_analytics", "is_hidden"], AttrType::Boolean)
                .attributes(
                    &[
                        "collaborative_ads_managed_partner_business_info",
                        "collaborative_ads_managed_partner_eligibility",
                        "created_by",
                        "primary_page",
                        "updated_by",
                    ],
                    AttrType::Json,
                )
                .attributes(&["created_at", "extended_updated_at", "updated_at"], AttrType::DateTime)
                .alias("created_time", "created_at")
                .alias("extended_updated_time", "extended_updated_at")
                .alias("updated_time", "updated_at")
                .build()
        })
    }

    fn validations() -> &'static Validations {
        static RULES: OnceLock<Validations> = OnceLock::new();
        RULES.get_or_init(|| {
            Validations::new()
                .presence(&["name", "vertical"], On::Create)
                .inclusion("survey_business_type", SURVEY_BUSINESS_TYPES, On::Always)
                .inclusion("vertical", VERTICALS, On::Always)
                .numericality(&["survey_num_assets", "survey_num_people"], 0, On::Always)
        })
    }

    /// `page_id` is the primary page, read back as `primary_page`.
    fn hooks() -> Hooks<Self> {
        Hooks::new().after(Operation::Find, |business| {
            copy_nested_id(business, "primary_page", "/id", "page_id")
        })
    }

    fn associations() -> &'static [AssociationSpec] {
        Self::ASSOCIATIONS
    }

    /// `GET {user_id}/businesses`.
    fn index_request(client: &Client, filters: &Params) -> Result<RequestDescriptor, ResourceError> {
        index_request::<Self>(client, filters, &["user_id"], "businesses", READ_FIELDS, &[])
    }

    fn read_request(resource: &Resource<Self>, params: &Params) -> Result<RequestDescriptor, ResourceError> {
        read_request(resource, params, READ_FIELDS, &[])
    }

    /// `POST {user_id}/businesses`.
    fn create_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        let user_id = resource.get("user_id");
        if user_id.is_null() {
            return Err(ResourceError::Request("Expected user_id to create a business".to_string()));
        }
        let client = resource.client();
        let mut body = resource.attributes_for_create();
        body.shift_remove("user_id");
        body.shift_remove("page_id");
        Ok(RequestDescriptor::post(client.url(format!("{user_id}/businesses"))).body(with_token(client, body)))
    }

    fn update_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        let request = update_request(resource)?;
        let mut body = request.json_body().cloned().unwrap_or_default();
        body.shift_remove("page_id");
        Ok(request.body(body))
    }

    fn delete_request(_resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        Err(ResourceError::Request("Cannot delete a business".to_string()))
    }

    /// `DELETE {id}/{edge}` for the first recognized key: ad accounts,
    /// agencies, clients, instagram accounts, owned businesses or pages.
    fn unlink_request(resource: &Resource<Self>, params: &Params) -> Result<RequestDescriptor, ResourceError> {
        edge_request(resource, Method::Delete, params, UNLINKABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facebook::{base_url, API_VERSION};
    use crate::framework::mock::MockTransport;
    use crate::framework::Value;
    use serde_json::json;
    use std::sync::Arc;

    fn client(mock: &MockTransport) -> Client {
        Client::new(Arc::new(mock.clone()), base_url(API_VERSION)).with_access_token("token")
    }

    #[tokio::test]
    async fn test_unlink_page() {
        let mock = MockTransport::new();
        mock.expect(Method::Delete, "https://graph.facebook.com/v11.0/77/pages")
            .return_ok(json!({ "success": true }));
        let mut business = Resource::<Business>::stale(&client(&mock), json!({ "id": 77 })).unwrap();

        let linked = business
            .unlink(Params::from([("page_id".to_string(), json!("300"))]))
            .await
            .unwrap();

        assert!(linked);
        assert_eq!(mock.requests()[0].query()["page_id"], json!("300"));
        mock.verify();
    }

    #[tokio::test]
    async fn test_find_reads_primary_page_id() {
        let mock = MockTransport::new();
        mock.expect(Method::Get, "https://graph.facebook.com/v11.0/77").return_ok(json!({
            "id": "77",
            "name": "Shop",
            "primary_page": { "id": "100", "name": "Corner Shop" }
        }));

        let business = Resource::<Business>::find_strict(&client(&mock), 77).await.unwrap();

        assert_eq!(business.page_id(), &Value::Integer(100));
        assert!(!business.is_changed());
        mock.verify();
    }

    #[tokio::test]
    async fn test_page_id_is_never_sent() {
        let mock = MockTransport::new();
        mock.expect(Method::Post, "https://graph.facebook.com/v11.0/77").return_ok(json!({ "success": true }));
        let mut business = Resource::<Business>::stale(&client(&mock), json!({ "id": 77 })).unwrap();
        business.set("page_id", 100).unwrap();
        business.set("name", "Renamed").unwrap();

        assert!(business.save_strict().await.unwrap());

        let body = mock.requests()[0].json_body().cloned().unwrap();
        assert_eq!(body["name"], json!("Renamed"));
        assert!(!body.contains_key("page_id"));
        mock.verify();
    }

    #[tokio::test]
    async fn test_link_is_forbidden() {
        let mock = MockTransport::new();
        let mut business = Resource::<Business>::stale(&client(&mock), json!({ "id": 77 })).unwrap();
        let result = business.link(Params::new()).await;
        assert!(matches!(result, Err(ResourceError::Request(m)) if m == "Cannot link a business"));
    }

    #[tokio::test]
    async fn test_create_requires_vertical() {
        let mock = MockTransport::new();
        let mut business =
            Resource::<Business>::build(&client(&mock), json!({ "name": "Shop", "user_id": 9 })).unwrap();

        let result = business.save_strict().await;

        match result {
            Err(ResourceError::RecordInvalid { record }) => {
                assert_eq!(record.errors.on("vertical"), vec!["can't be blank"]);
            }
            other => panic!("expected RecordInvalid, got {other:?}"),
        }
        assert_eq!(mock.request_count(), 0);
    }
}
