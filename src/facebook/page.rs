//! Facebook Pages. Read-only here: pages are created and edited outside the
//! Marketing API.

use std::sync::OnceLock;

use crate::associations;
use crate::facebook::{business::Business, copy_nested_id, index_request, read_request};
use crate::framework::{
    AssociationSpec, AttrType, Client, Hooks, Operation, Params, RequestDescriptor, Resource, ResourceError,
    ResourceKind, Schema,
};

pub const READ_FIELDS: &[&str] = &[
    "id",
    "about",
    "app_id",
    "bio",
    "business",
    "can_post",
    "category",
    "category_list",
    "checkins",
    "cover",
    "description",
    "emails",
    "engagement",
    "fan_count",
    "followers_count",
    "global_brand_page_name",
    "global_brand_root_id",
    "has_whatsapp_number",
    "instagram_business_account",
    "is_owned",
    "is_published",
    "is_unclaimed",
    "leadgen_tos_acceptance_time",
    "leadgen_tos_accepted",
    "link",
    "location",
    "name",
    "overall_star_rating",
    "parent_page",
    "phone",
    "promotion_eligible",
    "promotion_ineligible_reason",
    "rating_count",
    "recipient",
    "single_line_address",
    "talking_about_count",
    "username",
    "verification_status",
    "website",
    "were_here_count",
    "whatsapp_number",
];

const RELATIONAL: &[&str] = &["business"];

pub struct Page;

associations! {
    Page {
        belongs_to business: Business;
    }
}

impl ResourceKind for Page {
    const NAME: &'static str = "page";

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::builder()
                .attributes(
                    &[
                        "id",
                        "app_id",
                        "business_id",
                        "checkins",
                        "fan_count",
                        "followers_count",
                        "global_brand_root_id",
                        "rating_count",
                        "recipient_id",
                        "talking_about_count",
                        "were_here_count",
                    ],
                    AttrType::Integer,
                )
                .attributes(
                    &[
                        "about",
                        "bio",
                        "category",
                        "description",
                        "global_brand_page_name",
                        "link",
                        "name",
                        "phone",
                        "promotion_ineligible_reason",
                        "single_line_address",
                        "username",
                        "verification_status",
                        "website",
                        "whatsapp_number",
                    ],
                    AttrType::String,
                )
                .attributes(
                    &[
                        "can_post",
                        "has_whatsapp_number",
                        "is_owned",
                        "is_published",
                        "is_unclaimed",
                        "leadgen_tos_accepted",
                        "promotion_eligible",
                    ],
                    AttrType::Boolean,
                )
                .attributes(&["category_list", "emails"], AttrType::Array)
                .attributes(
                    &[
                        "business",
                        "cover",
                        "engagement",
                        "instagram_business_account",
                        "location",
                        "overall_star_rating",
                        "parent_page",
                    ],
                    AttrType::Json,
                )
                .attribute("leadgen_tos_acceptance_at", AttrType::DateTime)
                .alias("leadgen_tos_acceptance_time", "leadgen_tos_acceptance_at")
                .alias("recipient", "recipient_id")
                .build()
        })
    }

    fn hooks() -> Hooks<Self> {
        Hooks::new().after(Operation::Find, |page| copy_nested_id(page, "business", "/id", "business_id"))
    }

    fn associations() -> &'static [AssociationSpec] {
        Self::ASSOCIATIONS
    }

    /// `GET {business_id}/pages` or `GET {user_id}/pages`.
    fn index_request(client: &Client, filters: &Params) -> Result<RequestDescriptor, ResourceError> {
        index_request::<Self>(client, filters, &["business_id", "user_id"], "pages", READ_FIELDS, &[])
    }

    fn read_request(resource: &Resource<Self>, params: &Params) -> Result<RequestDescriptor, ResourceError> {
        read_request(resource, params, READ_FIELDS, RELATIONAL)
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
    async fn test_find_flattens_business() {
        let mock = MockTransport::new();
        mock.expect(Method::Get, "https://graph.facebook.com/v11.0/101").return_ok(json!({
            "id": "101",
            "name": "Corner Shop",
            "fan_count": 12,
            "business": { "id": "100", "name": "Shop Inc" }
        }));

        let page = Resource::<Page>::find_strict(&client(&mock), "101").await.unwrap();

        assert_eq!(page.id(), &Value::Integer(101));
        assert_eq!(page.business_id(), &Value::Integer(100));
        assert!(!page.is_changed());
        let query = mock.requests()[0].query().clone();
        assert!(query["fields"].as_str().unwrap().split(',').any(|f| f == "business"));
        assert_eq!(query["access_token"], json!("token"));
        mock.verify();
    }

    #[tokio::test]
    async fn test_missing_page() {
        let mock = MockTransport::new();
        mock.expect(Method::Get, "https://graph.facebook.com/v11.0/901").return_error(404, "no no no!");
        mock.expect(Method::Get, "https://graph.facebook.com/v11.0/901").return_error(404, "no no no!");

        let page = Resource::<Page>::find(&client(&mock), "901").await.unwrap();
        assert!(page.last_response().is_some_and(|r| !r.is_success()));

        let error = Resource::<Page>::find_strict(&client(&mock), "901").await.unwrap_err();
        assert!(matches!(error, ResourceError::RecordNotFound { .. }));
        mock.verify();
    }

    #[tokio::test]
    async fn test_page_is_read_only() {
        let mock = MockTransport::new();
        let mut page = Resource::<Page>::stale(&client(&mock), json!({ "id": 101 })).unwrap();
        page.set("name", "Renamed").unwrap();

        let result = page.save().await;

        assert!(matches!(result, Err(ResourceError::Request(m)) if m == "Cannot update a page"));
        assert_eq!(mock.request_count(), 0);
    }
}
