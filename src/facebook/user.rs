//! The user behind the access token.

use std::sync::OnceLock;

use crate::associations;
use crate::facebook::{business::Business, permission::Permission, read_params};
use crate::framework::{
    forbidden, AssociationSpec, AttrType, Client, Params, RequestDescriptor, Resource, ResourceError, ResourceKind,
    Schema,
};

/// The `public_profile` permission covers `id`, `first_name`, `last_name`,
/// `middle_name`, `name`, `name_format`, `picture` and `short_name`; the
/// rest need their own permissions.
pub const READ_FIELDS: &[&str] = &[
    "id",
    "about",
    "age_range",
    "birthday",
    "cover",
    "currency",
    "devices",
    "education",
    "email",
    "favorite_athletes",
    "favorite_teams",
    "first_name",
    "gender",
    "hometown",
    "inspirational_people",
    "installed",
    "is_guest_user",
    "languages",
    "last_name",
    "link",
    "locale",
    "location",
    "middle_name",
    "name",
    "name_format",
    "payment_pricepoints",
    "picture",
    "political",
    "quotes",
    "relationship_status",
    "religion",
    "short_name",
    "significant_other",
    "supports_donate_button_in_live_video",
    "third_party_id",
    "timezone",
    "token_for_business",
    "verified",
    "video_upload_limits",
    "website",
    "work",
];

pub struct User;

associations! {
    User {
        has_many businesses: Business;
        has_many permissions: Permission;
    }
}

impl ResourceKind for User {
    const NAME: &'static str = "user";

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::builder()
                .attributes(&["id", "third_party_id", "timezone"], AttrType::Integer)
                .attributes(
                    &[
                        "about",
                        "birthday",
                        "email",
                        "first_name",
                        "gender",
                        "last_name",
                        "link",
                        "locale",
                        "middle_name",
                        "name",
                        "name_format",
                        "political",
                        "quotes",
                        "relationship_status",
                        "religion",
                        "short_name",
                        "token_for_business",
                        "verified",
                        "website",
                    ],
                    AttrType::String,
                )
                .attributes(
                    &[
                        "devices",
                        "education",
                        "favorite_athletes",
                        "favorite_teams",
                        "inspirational_people",
                        "languages",
                        "work",
                    ],
                    AttrType::Array,
                )
                .attributes(
                    &["installed", "is_guest_user", "is_verified", "supports_donate_button_in_live_video"],
                    AttrType::Boolean,
                )
                .attributes(
                    &[
                        "age_range",
                        "context",
                        "cover",
                        "currency",
                        "hometown",
                        "location",
                        "payment_pricepoints",
                        "picture",
                        "significant_other",
                        "video_upload_limits",
                    ],
                    AttrType::Json,
                )
                .build()
        })
    }

    fn associations() -> &'static [AssociationSpec] {
        Self::ASSOCIATIONS
    }

    fn index_request(_client: &Client, _filters: &Params) -> Result<RequestDescriptor, ResourceError> {
        Err(forbidden::<Self>("list"))
    }

    /// `GET {id}`, or `GET me` for a user without an id.
    fn read_request(resource: &Resource<Self>, params: &Params) -> Result<RequestDescriptor, ResourceError> {
        let client = resource.client();
        let path = match resource.id() {
            id if id.is_null() => "me".to_string(),
            id => id.to_string(),
        };
        Ok(RequestDescriptor::get(client.url(path)).params(read_params(client, params, READ_FIELDS, &[])))
    }
}

impl Resource<User> {
    /// Reads the user the client's access token belongs to.
    pub async fn me(client: &Client) -> Result<Self, ResourceError> {
        let mut user = Self::new(client);
        user.fetch(&Params::new()).await?;
        Ok(user)
    }
}
