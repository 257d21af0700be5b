//! Token emitters.
//!
//! Each artifact is a small typed model built from the lattice and rendered
//! through `ToTokens`; nothing here concatenates source text.

pub mod assembly;
pub mod builder;
pub mod interface;

pub use assembly::Factory;
pub use builder::BuilderEntity;
pub use interface::StagesModule;

use crate::{
    lattice::StageKey,
    member::{Member, MemberList},
    target::Target,
};
use quote::format_ident;
use syn::{Ident, Visibility};

/// Family trait implemented by every stage marker.
pub const STAGE_TRAIT: &str = "Stage";

/// Capability trait of stages that may call `build`.
pub const CAN_BUILD_TRAIT: &str = "CanBuild";

/// Marker for the stage where nothing has been supplied yet.
pub const ROOT_STAGE: &str = "Root";

/// Marker for the build-only terminal stage.
pub const COMPLETE_STAGE: &str = "Complete";

/// Prefix of every non-root stage marker.
pub const EXCLUDE_PREFIX: &str = "Exclude";

///
/// Naming
///
/// Identifiers shared by all emitters of one target.
///

#[derive(Clone, Debug)]
pub struct Naming {
    pub vis: Visibility,
    pub target: Ident,
    pub builder: Ident,
    pub stages: Ident,
    pub factory: Ident,
}

impl Naming {
    #[must_use]
    pub fn new(target: &Target) -> Self {
        let vis = syn::parse_str::<Visibility>(target.vis()).unwrap_or(Visibility::Inherited);

        Self {
            vis,
            target: format_ident!("{}", target.name()),
            builder: format_ident!("{}", target.builder_name()),
            stages: format_ident!("{}", target.stages_module()),
            factory: format_ident!("{}", target.config().factory),
        }
    }

    #[must_use]
    pub fn stage_trait() -> Ident {
        format_ident!("{}", STAGE_TRAIT)
    }

    #[must_use]
    pub fn can_build_trait() -> Ident {
        format_ident!("{}", CAN_BUILD_TRAIT)
    }

    /// Per-member transition trait, shared by every stage offering it.
    #[must_use]
    pub fn add_trait(member: &Member) -> Ident {
        format_ident!("Add{}", member.display_name())
    }

    #[must_use]
    pub fn add_method(member: &Member) -> Ident {
        format_ident!("add_{}", member.name())
    }

    /// Builder field holding the member's current value.
    #[must_use]
    pub fn member_field(member: &Member) -> Ident {
        format_ident!("{}", member.name())
    }

    /// Marker identifier for a stage, derived from its excluded set.
    #[must_use]
    pub fn stage_ident(key: &StageKey, members: &MemberList) -> Ident {
        match key {
            StageKey::Complete => format_ident!("{}", COMPLETE_STAGE),
            StageKey::Partial(set) if set.is_empty() => format_ident!("{}", ROOT_STAGE),
            StageKey::Partial(set) => {
                let parts = set
                    .members(members)
                    .map(Member::display_name)
                    .collect::<Vec<_>>()
                    .join("_");

                format_ident!("{}_{}", EXCLUDE_PREFIX, parts)
            }
        }
    }
}

// code_list
// backtick-quoted, comma separated names for generated docs
pub(crate) fn code_list<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names
        .into_iter()
        .map(|name| format!("`{name}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{collect::Collector, lattice::MemberSet, member::Fallback};

    fn target() -> Target {
        Collector::new("Invoice")
            .visibility("pub")
            .field("due_date", "due_date", "u64", Fallback::Required)
            .field("amount", "amount", "u64", Fallback::Required)
            .field("memo", "memo", "String", Fallback::Sentinel)
            .finish()
            .unwrap()
    }

    #[test]
    fn stage_idents_follow_index_order() {
        let target = target();
        let members = target.members();

        let set: MemberSet = [1, 0].into_iter().collect();
        let ident = Naming::stage_ident(&StageKey::Partial(set), members);
        assert_eq!(ident, "Exclude_DueDate_Amount");

        assert_eq!(Naming::stage_ident(&StageKey::root(), members), "Root");
        assert_eq!(Naming::stage_ident(&StageKey::Complete, members), "Complete");
    }

    #[test]
    fn member_idents() {
        let target = target();
        let due = target.members().by_name("due_date").unwrap();

        assert_eq!(Naming::add_trait(due), "AddDueDate");
        assert_eq!(Naming::add_method(due), "add_due_date");
        assert_eq!(Naming::member_field(due), "due_date");
    }

    #[test]
    fn naming_defaults() {
        let naming = Naming::new(&target());

        assert_eq!(naming.builder, "InvoiceBuilder");
        assert_eq!(naming.stages, "invoice_builder_stages");
        assert_eq!(naming.factory, "builder");
        assert!(matches!(naming.vis, Visibility::Public(_)));
    }
}
