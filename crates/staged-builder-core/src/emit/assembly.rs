use crate::{
    emit::Naming,
    lattice::Lattice,
    member::DefaultExpr,
    target::Target,
};
use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{Ident, Visibility};

///
/// Factory
///
/// Adds the factory function to the target. It returns a root-stage builder
/// with every optional member pre-seeded with its default and every
/// mandatory slot empty.
///

#[derive(Clone, Debug)]
pub struct Factory {
    vis: Visibility,
    target: Ident,
    builder: Ident,
    stages: Ident,
    root: Ident,
    factory: Ident,
    seeds: Vec<(Ident, Seed)>,
}

#[derive(Clone, Debug)]
enum Seed {
    Empty,
    Default(DefaultExpr),
}

impl ToTokens for Seed {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        match self {
            Self::Empty => quote!(::core::option::Option::None).to_tokens(tokens),
            Self::Default(expr) => expr.to_tokens(tokens),
        }
    }
}

impl Factory {
    #[must_use]
    pub fn new(target: &Target, naming: &Naming, lattice: &Lattice) -> Self {
        Self {
            vis: naming.vis.clone(),
            target: naming.target.clone(),
            builder: naming.builder.clone(),
            stages: naming.stages.clone(),
            root: Naming::stage_ident(lattice.root(), lattice.members()),
            factory: naming.factory.clone(),
            seeds: target
                .members()
                .iter()
                .map(|m| {
                    let seed = if m.is_mandatory() {
                        Seed::Empty
                    } else {
                        Seed::Default(m.default_expr().clone())
                    };

                    (Naming::member_field(m), seed)
                })
                .collect(),
        }
    }
}

impl ToTokens for Factory {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let Self {
            vis,
            target,
            builder,
            stages,
            root,
            factory,
            seeds,
        } = self;

        let seeds = seeds.iter().map(|(ident, default)| quote!(#ident: #default));
        let doc = format!("Start building a `{target}`.");

        quote! {
            impl #target {
                #[doc = #doc]
                #[must_use]
                #vis fn #factory() -> #builder<#stages::#root> {
                    #builder {
                        #(#seeds,)*
                        __stage_marker: ::core::marker::PhantomData,
                    }
                }
            }
        }
        .to_tokens(tokens);
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{collect::Collector, member::Fallback, target::BuilderConfig};

    fn factory(target: &Target) -> syn::ItemImpl {
        let lattice = Lattice::build(target.members()).unwrap();
        let factory = Factory::new(target, &Naming::new(target), &lattice);

        syn::parse2(factory.to_token_stream()).unwrap()
    }

    #[test]
    fn seeds_optional_members_and_leaves_mandatory_empty() {
        let target = Collector::new("Rec")
            .visibility("pub")
            .field("value", "value", "i32", Fallback::Required)
            .field("quantity", "quantity", "i32", Fallback::Expr("10".into()))
            .finish()
            .unwrap();

        let imp = factory(&target);
        let syn::ImplItem::Fn(func) = &imp.items[0] else {
            panic!("expected the factory function");
        };

        assert_eq!(func.sig.ident, "builder");
        assert!(matches!(func.vis, Visibility::Public(_)));

        let output = &func.sig.output;
        assert_eq!(
            output.to_token_stream().to_string(),
            quote!(-> RecBuilder<rec_builder_stages::Root>).to_string()
        );

        let body = func.block.to_token_stream().to_string();
        let expected = quote!({
            RecBuilder {
                value: ::core::option::Option::None,
                quantity: 10,
                __stage_marker: ::core::marker::PhantomData,
            }
        });
        assert_eq!(body, expected.to_string());
    }

    #[test]
    fn factory_name_is_configurable() {
        let config = BuilderConfig {
            factory: "staged".to_string(),
            builder_name: Some("RecStages".to_string()),
            ..BuilderConfig::default()
        };
        let target = Collector::new("Rec").config(config).finish().unwrap();

        let imp = factory(&target);
        let syn::ImplItem::Fn(func) = &imp.items[0] else {
            panic!("expected the factory function");
        };

        assert_eq!(func.sig.ident, "staged");
        assert!(matches!(func.vis, Visibility::Inherited));
        assert_eq!(
            func.sig.output.to_token_stream().to_string(),
            quote!(-> RecStages<rec_builder_stages::Complete>).to_string()
        );
    }
}
