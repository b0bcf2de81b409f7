//! Saved audiences: targeting specs stored on an ad account for reuse.

use std::sync::OnceLock;

use crate::associations;
use crate::facebook::{account::Account, copy_nested_id, index_request, read_request};
use crate::framework::{
    AssociationSpec, AttrType, Client, Hooks, Operation, Params, RequestDescriptor, Resource, ResourceError,
    ResourceKind, Schema,
};

pub const READ_FIELDS: &[&str] = &[
    "id",
    "account",
    "approximate_count",
    "approximate_count_64bit",
    "delete_time",
    "description",
    "extra_info",
    "name",
    "operation_status",
    "permission_for_actions",
    "run_status",
    "sentence_lines",
    "targeting",
    "time_created",
    "time_updated",
];

const RELATIONAL: &[&str] = &["account"];

pub const RUN_STATUSES: &[&str] = &["ACTIVE", "EXPIRING", "DELETED"];

pub struct SavedAudience;

associations! {
    SavedAudience {
        belongs_to account: Account;
    }
}

impl ResourceKind for SavedAudience {
    const NAME: &'static str = "saved_audience";

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::builder()
                .attributes(
                    &["id", "account_id", "approximate_count", "approximate_count_64bit", "delete_time"],
                    AttrType::Integer,
                )
                .attributes(&["description", "extra_info", "name", "run_status"], AttrType::String)
                .attributes(&["account", "operation_status", "permission_for_actions", "targeting"], AttrType::Json)
                .attribute("sentence_lines", AttrType::Array)
                .attributes(&["created_at", "updated_at"], AttrType::DateTime)
                .alias("time_created", "created_at")
                .alias("time_updated", "updated_at")
                .build()
        })
    }

    fn hooks() -> Hooks<Self> {
        Hooks::new().after(Operation::Find, |audience| {
            copy_nested_id(audience, "account", "/account_id", "account_id")
        })
    }

    fn associations() -> &'static [AssociationSpec] {
        Self::ASSOCIATIONS
    }

    /// `GET act_{account_id}/saved_audiences`.
    fn index_request(client: &Client, filters: &Params) -> Result<RequestDescriptor, ResourceError> {
        index_request::<Self>(client, filters, &["account_id"], "saved_audiences", READ_FIELDS, RELATIONAL)
    }

    fn read_request(resource: &Resource<Self>, params: &Params) -> Result<RequestDescriptor, ResourceError> {
        read_request(resource, params, READ_FIELDS, RELATIONAL)
    }
}
