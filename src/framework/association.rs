//! # Associations
//!
//! Kinds declare their parents and children once with [`associations!`]:
//!
//! ```ignore
//! associations! {
//!     Campaign {
//!         belongs_to account: Account;
//!         has_many ad_sets: AdSet;
//!         has_many ads: Ad;
//!     }
//! }
//! ```
//!
//! which generates `Campaign::ASSOCIATIONS` plus typed accessors on
//! `Resource<Campaign>`:
//!
//! - `campaign.account().await` looks the parent up (a fresh read every call),
//! - `campaign.account_id()` returns the foreign key,
//! - `campaign.ad_sets()` returns a `Relation<AdSet>` filtered on
//!   `campaign_id`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
    BelongsTo,
    HasMany,
}

/// One declared association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssociationSpec {
    pub kind: AssociationKind,
    pub name: &'static str,
    /// `NAME` of the associated kind.
    pub target: &'static str,
    /// For belongs-to, the key on the owner (`account_id`); for has-many, the
    /// key children are filtered on (`campaign_id`).
    pub foreign_key: &'static str,
}

impl AssociationSpec {
    pub const fn belongs_to(name: &'static str, target: &'static str, foreign_key: &'static str) -> Self {
        Self {
            kind: AssociationKind::BelongsTo,
            name,
            target,
            foreign_key,
        }
    }

    pub const fn has_many(name: &'static str, target: &'static str, foreign_key: &'static str) -> Self {
        Self {
            kind: AssociationKind::HasMany,
            name,
            target,
            foreign_key,
        }
    }
}

/// The belongs-to keys of a kind. A relation copies these from its filters
/// into every row it hydrates.
pub fn foreign_keys(specs: &[AssociationSpec]) -> impl Iterator<Item = &'static str> + '_ {
    specs
        .iter()
        .filter(|s| s.kind == AssociationKind::BelongsTo)
        .map(|s| s.foreign_key)
}

/// Declares the associations of a resource kind and generates its accessors.
///
/// Must be invoked inside this crate: the accessors are inherent methods on
/// `Resource<Kind>`.
#[macro_export]
macro_rules! associations {
    (
        $owner:ident {
            $(belongs_to $parent_name:ident : $parent:ty;)*
            $(has_many $child_name:ident : $child:ty;)*
        }
    ) => {
        $crate::paste::paste! {
            impl $owner {
                pub const ASSOCIATIONS: &'static [$crate::framework::AssociationSpec] = &[
                    $(
                        $crate::framework::AssociationSpec::belongs_to(
                            stringify!($parent_name),
                            <$parent as $crate::framework::ResourceKind>::NAME,
                            stringify!([<$parent_name _id>]),
                        ),
                    )*
                    $(
                        $crate::framework::AssociationSpec::has_many(
                            stringify!($child_name),
                            <$child as $crate::framework::ResourceKind>::NAME,
                            stringify!([<$owner:snake _id>]),
                        ),
                    )*
                ];
            }

            impl $crate::framework::Resource<$owner> {
                $(
                    pub async fn $parent_name(
                        &self,
                    ) -> ::std::result::Result<
                        ::std::option::Option<$crate::framework::Resource<$parent>>,
                        $crate::framework::ResourceError,
                    > {
                        self.belongs_to::<$parent>(stringify!([<$parent_name _id>])).await
                    }

                    pub fn [<$parent_name _id>](&self) -> &$crate::framework::Value {
                        self.get(stringify!([<$parent_name _id>]))
                    }
                )*
                $(
                    pub fn $child_name(
                        &self,
                    ) -> ::std::result::Result<
                        $crate::framework::Relation<$child>,
                        $crate::framework::ResourceError,
                    > {
                        self.has_many::<$child>()
                    }
                )*
            }
        }
    };
}
