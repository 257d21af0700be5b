use crate::node::{BuilderField, BuilderInput};
use darling::FromDeriveInput;
use proc_macro2::{Span, TokenStream};
use staged_builder_core::{Error, collect::Collector, target::TargetError};
use std::collections::HashMap;
use syn::{Data, DeriveInput, spanned::Spanned};

// derive_staged_builder
pub fn derive_staged_builder(input: TokenStream) -> TokenStream {
    // Phase 1: parse inputs.
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };
    if let Err(err) = check_shape(&input) {
        return err.to_compile_error();
    }
    let node = match BuilderInput::from_derive_input(&input) {
        Ok(node) => node,
        Err(err) => return err.write_errors(),
    };
    if let Err(err) = node.validate() {
        return err.write_errors();
    }

    // Phase 2: collect members.
    let spans = member_spans(&node);
    let target = match collect(&node).finish() {
        Ok(target) => target,
        Err(err) => return diagnostic(&err, &spans, node.ident.span()),
    };

    // Phase 3: generate.
    match staged_builder_core::generate(&target) {
        Ok(generated) => generated.into_tokens(),
        Err(err) => diagnostic(&err, &spans, node.ident.span()),
    }
}

// check_shape
// only non-generic structs have a constructor the builder can call
fn check_shape(input: &DeriveInput) -> Result<(), syn::Error> {
    let reason = match &input.data {
        Data::Enum(_) => Some("enums have no single constructor"),
        Data::Union(_) => Some("unions are not supported"),
        Data::Struct(_) if !input.generics.params.is_empty() => {
            Some("generic targets are not supported")
        }
        Data::Struct(_) => None,
    };

    match reason {
        Some(reason) => Err(syn::Error::new_spanned(
            &input.ident,
            TargetError::UnresolvedConstructor {
                target: input.ident.to_string(),
                reason: reason.to_string(),
            },
        )),
        None => Ok(()),
    }
}

// fields
fn fields(node: &BuilderInput) -> impl Iterator<Item = (usize, &BuilderField)> {
    node.data
        .as_ref()
        .take_struct()
        .map(|fields| fields.fields)
        .unwrap_or_default()
        .into_iter()
        .enumerate()
}

// collect
fn collect(node: &BuilderInput) -> Collector {
    let mut collector = Collector::new(&node.ident.to_string())
        .visibility(&node.vis())
        .config(node.config());

    if let Some(path) = &node.constructor {
        collector = collector.constructor(&path.value());
    }

    for (position, field) in fields(node) {
        let field_ref = field.field_ref(position);

        collector = if field.skip {
            collector.skip(&field_ref, field.skip_default().as_deref())
        } else if field.arg {
            collector.argument(
                &field.member_name(position),
                &field.type_text(),
                field.fallback(),
            )
        } else {
            collector.field(
                &field.member_name(position),
                &field_ref,
                &field.type_text(),
                field.fallback(),
            )
        };
    }

    collector
}

// member_spans
fn member_spans(node: &BuilderInput) -> HashMap<String, Span> {
    fields(node)
        .map(|(position, field)| {
            let span = field
                .ident
                .as_ref()
                .map_or_else(|| field.ty.span(), Spanned::span);

            (field.member_name(position), span)
        })
        .collect()
}

// diagnostic
// points at the first named member when the error has one
fn diagnostic(err: &Error, spans: &HashMap<String, Span>, fallback: Span) -> TokenStream {
    let span = err
        .members()
        .into_iter()
        .find_map(|name| spans.get(name).copied())
        .unwrap_or(fallback);

    syn::Error::new(span, err).to_compile_error()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    fn expand(input: TokenStream) -> String {
        derive_staged_builder(input).to_string()
    }

    #[test]
    fn named_struct_expands_to_three_artifacts() {
        let out = derive_staged_builder(quote! {
            pub struct Rec {
                value: i32,
                name: String,
                #[builder(default = "10")]
                quantity: i32,
            }
        });
        let file = syn::parse2::<syn::File>(out).unwrap();

        assert!(matches!(file.items[0], syn::Item::Mod(_)));
        assert!(matches!(file.items[1], syn::Item::Struct(_)));
        assert!(matches!(file.items.last(), Some(syn::Item::Impl(_))));
    }

    #[test]
    fn enums_are_rejected() {
        let out = expand(quote!(enum Shape { Circle, Square }));

        assert!(out.contains("compile_error"));
        assert!(out.contains("enums have no single constructor"));
    }

    #[test]
    fn generic_structs_are_rejected() {
        let out = expand(quote!(struct Wrapper<T> { inner: T }));

        assert!(out.contains("generic targets are not supported"));
    }

    #[test]
    fn arguments_without_constructor_are_rejected() {
        let out = expand(quote! {
            struct Order {
                #[builder(arg)]
                id: u64,
            }
        });

        assert!(out.contains("designated constructor"));
    }

    #[test]
    fn keyword_member_names_need_renaming() {
        let rejected = expand(quote!(struct Token { r#type: String }));
        assert!(rejected.contains("invalid member name"));

        let renamed = expand(quote! {
            struct Token {
                #[builder(name = "kind")]
                r#type: String,
            }
        });
        assert!(!renamed.contains("compile_error"));
        assert!(renamed.contains("add_kind"));
    }

    #[test]
    fn colliding_members_are_reported() {
        let out = expand(quote! {
            struct Clash {
                foo_bar: i32,
                #[builder(name = "fooBar")]
                other: i32,
            }
        });

        assert!(out.contains("duplicate member identifier"));
    }

    #[test]
    fn skip_with_arg_is_rejected() {
        let out = expand(quote! {
            #[builder(constructor = "new")]
            struct Order {
                #[builder(arg, skip)]
                id: u64,
            }
        });

        assert!(out.contains("compile_error"));
        assert!(out.contains("`skip` and `arg` cannot be combined"));
    }

    #[test]
    fn skip_default_under_constructor_is_rejected() {
        let out = expand(quote! {
            #[builder(constructor = "new")]
            struct Order {
                #[builder(arg)]
                id: u64,
                #[builder(skip, default = "7")]
                total: u64,
            }
        });
        assert!(out.contains("remove `default`"));

        // without a constructor the default fills the struct literal
        let literal = expand(quote! {
            struct Order {
                id: u64,
                #[builder(skip, default = "7")]
                total: u64,
            }
        });
        assert!(!literal.contains("compile_error"));

        // and a bare skip under a constructor is fine
        let bare = expand(quote! {
            #[builder(constructor = "new")]
            struct Order {
                #[builder(arg)]
                id: u64,
                #[builder(skip)]
                total: u64,
            }
        });
        assert!(!bare.contains("compile_error"));
    }

    #[test]
    fn unknown_options_are_darling_errors() {
        let out = expand(quote! {
            struct Rec {
                #[builder(bogus)]
                value: i32,
            }
        });

        assert!(out.contains("compile_error"));
    }
}
