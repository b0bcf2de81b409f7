//! Permissions a user has granted or declined to the app. A permission is
//! named, not numbered, so its name is the identity.

use std::sync::OnceLock;

use crate::associations;
use crate::facebook::{index_target, user::User, with_token};
use crate::framework::{
    forbidden, AssociationSpec, AttrType, Client, Params, RequestDescriptor, Resource, ResourceError, ResourceKind,
    Schema,
};

pub struct Permission;

associations! {
    Permission {
        belongs_to user: User;
    }
}

impl ResourceKind for Permission {
    const NAME: &'static str = "permission";

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::builder()
                .attributes(&["permission", "status"], AttrType::String)
                .attribute("user_id", AttrType::Integer)
                .identity("permission")
                .build()
        })
    }

    fn associations() -> &'static [AssociationSpec] {
        Self::ASSOCIATIONS
    }

    /// `GET {user_id}/permissions`. The edge takes no field list.
    fn index_request(client: &Client, filters: &Params) -> Result<RequestDescriptor, ResourceError> {
        let (user, params) = index_target(Self::NAME, filters, &["user_id"])?;
        Ok(RequestDescriptor::get(client.url(format!("{user}/permissions"))).params(with_token(client, params)))
    }

    fn read_request(_resource: &Resource<Self>, _params: &Params) -> Result<RequestDescriptor, ResourceError> {
        Err(forbidden::<Self>("read"))
    }

    /// `DELETE {user_id}/permissions/{permission}` revokes it.
    fn delete_request(resource: &Resource<Self>) -> Result<RequestDescriptor, ResourceError> {
        let user_id = resource.get("user_id");
        let permission = resource.id();
        if user_id.is_null() || permission.is_null() {
            return Err(ResourceError::Request(
                "Expected user_id and permission to revoke a permission".to_string(),
            ));
        }
        let client = resource.client();
        Ok(RequestDescriptor::delete(client.url(format!("{user_id}/permissions/{permission}")))
            .params(with_token(client, Params::new())))
    }
}
