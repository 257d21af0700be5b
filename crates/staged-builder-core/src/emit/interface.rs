use crate::{
    emit::{COMPLETE_STAGE, Naming, code_list},
    lattice::{Lattice, Stage},
    member::Member,
    target::Target,
};
use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};
use syn::{Ident, Visibility};

///
/// StagesModule
///
/// The interfaces artifact: a module holding the stage family trait, the
/// build capability trait, one transition trait per member and one marker
/// type per stage.
///

#[derive(Clone, Debug)]
pub struct StagesModule {
    vis: Visibility,
    ident: Ident,
    target: String,
    member_traits: Vec<MemberTrait>,
    markers: Vec<StageMarker>,
}

impl StagesModule {
    #[must_use]
    pub fn new(target: &Target, naming: &Naming, lattice: &Lattice) -> Self {
        let members = lattice.members();

        Self {
            vis: naming.vis.clone(),
            ident: naming.stages.clone(),
            target: target.name().to_string(),
            member_traits: members.iter().map(MemberTrait::new).collect(),
            markers: lattice
                .stages()
                .iter()
                .map(|stage| StageMarker::new(stage, lattice))
                .collect(),
        }
    }

    /// Marker identifiers in lattice order, excluding `Complete`.
    pub fn markers(&self) -> impl Iterator<Item = &Ident> {
        self.markers.iter().map(|m| &m.ident)
    }
}

impl ToTokens for StagesModule {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let Self {
            vis,
            ident,
            target,
            member_traits,
            markers,
        } = self;

        let stage = Naming::stage_trait();
        let can_build = Naming::can_build_trait();
        let complete = format_ident!("{}", COMPLETE_STAGE);

        let module_doc = format!("Stage types of the `{target}` builder.");
        let stage_doc = format!("Implemented by every stage of the `{target}` builder.");
        let can_build_doc = "Stages in which `build` is available.";
        let complete_doc = "Every member supplied; only `build` remains.";

        quote! {
            #[doc = #module_doc]
            #[allow(dead_code, non_camel_case_types)]
            #vis mod #ident {
                #[doc = #stage_doc]
                pub trait #stage {}

                #[doc = #can_build_doc]
                pub trait #can_build: #stage {}

                #(#member_traits)*

                #[doc = #complete_doc]
                pub enum #complete {}
                impl #stage for #complete {}
                impl #can_build for #complete {}

                #(#markers)*
            }
        }
        .to_tokens(tokens);
    }
}

///
/// MemberTrait
///

#[derive(Clone, Debug)]
struct MemberTrait {
    ident: Ident,
    member: String,
}

impl MemberTrait {
    fn new(member: &Member) -> Self {
        Self {
            ident: Naming::add_trait(member),
            member: member.name().to_string(),
        }
    }
}

impl ToTokens for MemberTrait {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let ident = &self.ident;
        let stage = Naming::stage_trait();
        let doc = format!("Stages that still accept `{}`.", self.member);

        quote! {
            #[doc = #doc]
            pub trait #ident: #stage {
                type Next: #stage;
            }
        }
        .to_tokens(tokens);
    }
}

///
/// StageMarker
///

#[derive(Clone, Debug)]
struct StageMarker {
    ident: Ident,
    supplied: Vec<String>,
    can_build: bool,
    transitions: Vec<(Ident, Ident)>,
}

impl StageMarker {
    fn new(stage: &Stage, lattice: &Lattice) -> Self {
        let members = lattice.members();
        let transitions = stage
            .edges
            .iter()
            .filter_map(|edge| {
                let member = members.get(edge.member)?;

                Some((
                    Naming::add_trait(member),
                    Naming::stage_ident(&edge.to, members),
                ))
            })
            .collect();

        Self {
            ident: Naming::stage_ident(&stage.key(), members),
            supplied: stage
                .excluded
                .members(members)
                .map(|m| m.name().to_string())
                .collect(),
            can_build: stage.can_build(),
            transitions,
        }
    }
}

impl ToTokens for StageMarker {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let ident = &self.ident;
        let stage = Naming::stage_trait();

        let doc = if self.supplied.is_empty() {
            "Nothing supplied yet.".to_string()
        } else {
            format!(
                "Supplied so far: {}.",
                code_list(self.supplied.iter().map(String::as_str))
            )
        };

        let can_build = self.can_build.then(|| {
            let can_build = Naming::can_build_trait();
            quote!(impl #can_build for #ident {})
        });

        let transitions = self.transitions.iter().map(|(add_trait, next)| {
            quote! {
                impl #add_trait for #ident {
                    type Next = #next;
                }
            }
        });

        quote! {
            #[doc = #doc]
            pub enum #ident {}
            impl #stage for #ident {}
            #can_build
            #(#transitions)*
        }
        .to_tokens(tokens);
    }
}

///
/// TESTS
///
