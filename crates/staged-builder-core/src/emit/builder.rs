use crate::{
    Error,
    emit::Naming,
    lattice::Lattice,
    member::{Member, MemberError, TypeRef},
    target::{Construction, Target, TargetError},
};
use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{Ident, Path, PathSegment, Visibility};

///
/// BuilderEntity
///
/// The builder struct for one target: one field per member plus the stage
/// parameter, an add method per member bounded by that member's transition
/// trait, and `build` bounded by the capability trait.
///
/// Mandatory members are held as `Option` and start out empty, so their
/// types need no `Default`. Generated generics and the marker field use
/// `__`-prefixed names, which member names may not take.
///

#[derive(Clone, Debug)]
pub struct BuilderEntity {
    vis: Visibility,
    target: Ident,
    builder: Ident,
    stages: Ident,
    root: Ident,
    fields: Vec<BuilderField>,
    body: BuildBody,
}

#[derive(Clone, Debug)]
struct BuilderField {
    ident: Ident,
    ty: TypeRef,
    method: Ident,
    add_trait: Ident,
    member: String,
    mandatory: bool,
}

impl BuilderField {
    fn new(member: &Member) -> Self {
        Self {
            ident: Naming::member_field(member),
            ty: member.ty().clone(),
            method: Naming::add_method(member),
            add_trait: Naming::add_trait(member),
            member: member.name().to_string(),
            mandatory: member.is_mandatory(),
        }
    }
}

///
/// BuildBody
///

#[derive(Clone, Debug)]
enum BuildBody {
    /// `Target { field: .., fixed: default }`
    Literal {
        assigned: Vec<(syn::Member, Ident)>,
        fixed: Vec<(syn::Member, TokenStream)>,
    },

    /// `path(args..)` followed by field assignments on the result.
    Function {
        path: Path,
        args: Vec<Ident>,
        assigned: Vec<(syn::Member, Ident)>,
    },
}

impl BuilderEntity {
    pub fn new(target: &Target, naming: &Naming, lattice: &Lattice) -> Result<Self, Error> {
        let members = target.members();

        let assigned = members
            .fields()
            .map(|(member, field)| {
                Ok((
                    field_member(member.name(), field)?,
                    Naming::member_field(member),
                ))
            })
            .collect::<Result<Vec<_>, MemberError>>()?;

        let body = match target.construction() {
            Construction::Literal => BuildBody::Literal {
                assigned,
                fixed: target
                    .fixed()
                    .iter()
                    .map(|f| {
                        Ok((
                            field_member(&f.field, &f.field)?,
                            f.default_expr.to_token_stream(),
                        ))
                    })
                    .collect::<Result<Vec<_>, MemberError>>()?,
            },
            Construction::Function(path) => BuildBody::Function {
                path: constructor_path(&naming.target, path)?,
                args: members.arguments().map(Naming::member_field).collect(),
                assigned,
            },
        };

        Ok(Self {
            vis: naming.vis.clone(),
            target: naming.target.clone(),
            builder: naming.builder.clone(),
            stages: naming.stages.clone(),
            root: Naming::stage_ident(lattice.root(), lattice.members()),
            fields: members.iter().map(BuilderField::new).collect(),
            body,
        })
    }

    // add_methods
    fn add_methods(&self) -> TokenStream {
        let Self {
            builder, stages, ..
        } = self;

        self.fields
            .iter()
            .map(|field| {
                let BuilderField {
                    ident,
                    ty,
                    method,
                    add_trait,
                    member,
                    mandatory,
                } = field;

                let kind = if *mandatory { "mandatory" } else { "optional" };
                let doc = format!("Supply the {kind} member `{member}`.");
                let stored = if *mandatory {
                    quote!(::core::option::Option::Some(value))
                } else {
                    quote!(value)
                };

                quote! {
                    impl<__Stage: #stages::#add_trait> #builder<__Stage> {
                        #[doc = #doc]
                        #[must_use]
                        pub fn #method(&self, value: #ty) -> #builder<<__Stage as #stages::#add_trait>::Next> {
                            let mut next = self.restage::<<__Stage as #stages::#add_trait>::Next>();
                            next.#ident = #stored;
                            next
                        }
                    }
                }
            })
            .collect()
    }

    // read
    // the value `build` takes for a member; a mandatory slot is always
    // filled once the stage grants `build`
    fn read(&self, ident: &Ident) -> TokenStream {
        let field = self.fields.iter().find(|f| f.ident == *ident);

        match field {
            Some(field) if field.mandatory => {
                let message = format!("`{}` is supplied before build", field.member);

                quote! {
                    match &self.#ident {
                        ::core::option::Option::Some(supplied) => ::core::clone::Clone::clone(supplied),
                        ::core::option::Option::None => ::core::unreachable!(#message),
                    }
                }
            }
            _ => quote!(::core::clone::Clone::clone(&self.#ident)),
        }
    }

    // build_body
    fn build_body(&self) -> TokenStream {
        let target = &self.target;
        let clone = |ident: &Ident| self.read(ident);

        match &self.body {
            BuildBody::Literal { assigned, fixed } => {
                let assigned = assigned.iter().map(|(field, ident)| {
                    let value = clone(ident);
                    quote!(#field: #value)
                });
                let fixed = fixed
                    .iter()
                    .map(|(field, default)| quote!(#field: #default));

                quote! {
                    #target {
                        #(#assigned,)*
                        #(#fixed,)*
                    }
                }
            }
            BuildBody::Function {
                path,
                args,
                assigned,
            } => {
                let args = args.iter().map(clone);

                if assigned.is_empty() {
                    return quote!(#path(#(#args),*));
                }

                let assigned = assigned.iter().map(|(field, ident)| {
                    let value = clone(ident);
                    quote!(value.#field = #value;)
                });

                quote! {
                    let mut value = #path(#(#args),*);
                    #(#assigned)*
                    value
                }
            }
        }
    }
}

impl ToTokens for BuilderEntity {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let Self {
            vis,
            target,
            builder,
            stages,
            root,
            fields,
            ..
        } = self;

        let stage = Naming::stage_trait();
        let can_build = Naming::can_build_trait();

        let decls = fields.iter().map(|f| {
            let BuilderField {
                ident,
                ty,
                mandatory,
                ..
            } = f;

            if *mandatory {
                quote!(#ident: ::core::option::Option<#ty>)
            } else {
                quote!(#ident: #ty)
            }
        });
        let restaged = fields.iter().map(|f| {
            let ident = &f.ident;
            quote!(#ident: ::core::clone::Clone::clone(&self.#ident))
        });

        let add_methods = self.add_methods();
        let body = self.build_body();

        let doc = format!(
            "Staged builder for `{target}`. Every method takes `&self` and returns a new value."
        );
        let build_doc = format!("Construct the `{target}`. The builder stays usable.");

        quote! {
            #[doc = #doc]
            #vis struct #builder<__Stage = #stages::#root> {
                #(#decls,)*
                __stage_marker: ::core::marker::PhantomData<fn() -> __Stage>,
            }

            impl<__Stage: #stages::#stage> #builder<__Stage> {
                fn restage<__Next: #stages::#stage>(&self) -> #builder<__Next> {
                    #builder {
                        #(#restaged,)*
                        __stage_marker: ::core::marker::PhantomData,
                    }
                }
            }

            impl<__Stage: #stages::#stage> ::core::clone::Clone for #builder<__Stage> {
                fn clone(&self) -> Self {
                    self.restage()
                }
            }

            #add_methods

            impl<__Stage: #stages::#can_build> #builder<__Stage> {
                #[doc = #build_doc]
                #[must_use]
                pub fn build(&self) -> #target {
                    #body
                }
            }
        }
        .to_tokens(tokens);
    }
}

// field_member
// a named field or tuple index as used in struct literals and assignments
fn field_member(member: &str, field: &str) -> Result<syn::Member, MemberError> {
    syn::parse_str::<syn::Member>(field).map_err(|_| MemberError::MalformedField {
        member: member.to_string(),
        field: field.to_string(),
    })
}

// constructor_path
// a bare name is an associated function of the target; a leading `Self`
// refers to the target itself
fn constructor_path(target: &Ident, text: &str) -> Result<Path, TargetError> {
    let mut path = syn::parse_str::<Path>(text).map_err(|err| TargetError::MalformedConstructor {
        path: text.to_string(),
        reason: err.to_string(),
    })?;

    if path.leading_colon.is_none() {
        if path.segments.len() == 1 {
            path.segments.insert(0, PathSegment::from(target.clone()));
        } else if let Some(first) = path.segments.first_mut()
            && first.ident == "Self"
        {
            first.ident = target.clone();
        }
    }

    Ok(path)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{collect::Collector, member::Fallback};
    use quote::format_ident;

    fn entity(target: &Target) -> BuilderEntity {
        let lattice = Lattice::build(target.members()).unwrap();

        BuilderEntity::new(target, &Naming::new(target), &lattice).unwrap()
    }

    fn impl_fns(file: &syn::File) -> Vec<String> {
        file.items
            .iter()
            .filter_map(|item| match item {
                syn::Item::Impl(imp) if imp.trait_.is_none() => Some(imp),
                _ => None,
            })
            .flat_map(|imp| imp.items.iter())
            .filter_map(|item| match item {
                syn::ImplItem::Fn(f) => Some(f.sig.ident.to_string()),
                _ => None,
            })
            .collect()
    }

    fn build_fn(entity: &BuilderEntity) -> String {
        let file = syn::parse2::<syn::File>(entity.to_token_stream()).unwrap();

        file.items
            .iter()
            .filter_map(|item| match item {
                syn::Item::Impl(imp) => Some(imp),
                _ => None,
            })
            .flat_map(|imp| imp.items.iter())
            .find_map(|item| match item {
                syn::ImplItem::Fn(f) if f.sig.ident == "build" => {
                    Some(f.block.to_token_stream().to_string())
                }
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn literal_struct_has_one_add_method_per_member() {
        let target = Collector::new("Rec")
            .visibility("pub")
            .field("value", "value", "i32", Fallback::Required)
            .field("name", "name", "String", Fallback::Required)
            .field("quantity", "quantity", "i32", Fallback::Expr("10".into()))
            .finish()
            .unwrap();
        let entity = entity(&target);
        let file = syn::parse2::<syn::File>(entity.to_token_stream()).unwrap();

        assert_eq!(
            impl_fns(&file),
            ["restage", "add_value", "add_name", "add_quantity", "build"]
        );

        let syn::Item::Struct(decl) = &file.items[0] else {
            panic!("builder struct comes first");
        };
        assert_eq!(decl.ident, "RecBuilder");
        // three members plus the stage marker
        assert_eq!(decl.fields.len(), 4);
        assert_eq!(
            decl.generics.to_token_stream().to_string(),
            quote!(<__Stage = rec_builder_stages::Root>).to_string()
        );
    }

    #[test]
    fn literal_build_fills_fixed_fields() {
        let target = Collector::new("Point")
            .field("x", "x", "i32", Fallback::Required)
            .skip("cache", Some("Vec::new()"))
            .finish()
            .unwrap();

        let body = build_fn(&entity(&target));
        let expected = quote!({
            Point {
                x: match &self.x {
                    ::core::option::Option::Some(supplied) => ::core::clone::Clone::clone(supplied),
                    ::core::option::Option::None => ::core::unreachable!("`x` is supplied before build"),
                },
                cache: Vec::new(),
            }
        });
        assert_eq!(body, expected.to_string());
    }

    #[test]
    fn tuple_struct_uses_indexes() {
        let target = Collector::new("Pair")
            .field("field_0", "0", "i32", Fallback::Required)
            .field("field_1", "1", "i32", Fallback::Sentinel)
            .finish()
            .unwrap();

        let body = build_fn(&entity(&target));
        let expected = quote!({
            Pair {
                0: match &self.field_0 {
                    ::core::option::Option::Some(supplied) => ::core::clone::Clone::clone(supplied),
                    ::core::option::Option::None => ::core::unreachable!("`field_0` is supplied before build"),
                },
                1: ::core::clone::Clone::clone(&self.field_1),
            }
        });
        assert_eq!(body, expected.to_string());
    }

    #[test]
    fn function_build_passes_arguments_in_order() {
        let target = Collector::new("Order")
            .constructor("new")
            .argument("id", "u64", Fallback::Required)
            .argument("sku", "String", Fallback::Required)
            .field("note", "note", "String", Fallback::Sentinel)
            .finish()
            .unwrap();

        let body = build_fn(&entity(&target));
        let expected = quote!({
            let mut value = Order::new(
                match &self.id {
                    ::core::option::Option::Some(supplied) => ::core::clone::Clone::clone(supplied),
                    ::core::option::Option::None => ::core::unreachable!("`id` is supplied before build"),
                },
                match &self.sku {
                    ::core::option::Option::Some(supplied) => ::core::clone::Clone::clone(supplied),
                    ::core::option::Option::None => ::core::unreachable!("`sku` is supplied before build"),
                }
            );
            value.note = ::core::clone::Clone::clone(&self.note);
            value
        });
        assert_eq!(body, expected.to_string());
    }

    #[test]
    fn function_build_without_fields_returns_directly() {
        let target = Collector::new("Order")
            .constructor("Self::open")
            .argument("id", "u64", Fallback::Required)
            .finish()
            .unwrap();

        let body = build_fn(&entity(&target));
        let expected = quote!({
            Order::open(match &self.id {
                ::core::option::Option::Some(supplied) => ::core::clone::Clone::clone(supplied),
                ::core::option::Option::None => ::core::unreachable!("`id` is supplied before build"),
            })
        });
        assert_eq!(body, expected.to_string());
    }

    #[test]
    fn mandatory_slots_are_optional_and_generics_are_reserved() {
        let target = Collector::new("Holder")
            .field("inner", "inner", "S", Fallback::Required)
            .field("extra", "extra", "N", Fallback::Sentinel)
            .finish()
            .unwrap();
        let file = syn::parse2::<syn::File>(entity(&target).to_token_stream()).unwrap();

        let syn::Item::Struct(decl) = &file.items[0] else {
            panic!("builder struct comes first");
        };
        let fields = decl
            .fields
            .iter()
            .map(|f| {
                let ident = f.ident.as_ref().unwrap();
                let ty = &f.ty;
                quote!(#ident: #ty).to_string()
            })
            .collect::<Vec<_>>();

        assert_eq!(
            fields,
            [
                quote!(inner: ::core::option::Option<S>).to_string(),
                quote!(extra: N).to_string(),
                quote!(__stage_marker: ::core::marker::PhantomData<fn() -> __Stage>).to_string(),
            ]
        );

        // the user's `S` and `N` never meet a generic of the same name
        for item in &file.items {
            if let syn::Item::Impl(imp) = item {
                for param in imp.generics.type_params() {
                    assert_eq!(param.ident, "__Stage");
                }
            }
        }
    }

    #[test]
    fn constructor_paths() {
        let target = format_ident!("Order");
        let render = |text: &str| {
            constructor_path(&target, text)
                .unwrap()
                .to_token_stream()
                .to_string()
        };

        assert_eq!(render("new"), quote!(Order::new).to_string());
        assert_eq!(render("Self::new"), quote!(Order::new).to_string());
        assert_eq!(render("orders::make"), quote!(orders::make).to_string());
        assert_eq!(render("::orders::make"), quote!(::orders::make).to_string());
    }

    #[test]
    fn zero_members_default_to_complete() {
        let target = Collector::new("Marker").finish().unwrap();
        let entity = entity(&target);
        let file = syn::parse2::<syn::File>(entity.to_token_stream()).unwrap();

        let syn::Item::Struct(decl) = &file.items[0] else {
            panic!("builder struct comes first");
        };
        assert_eq!(
            decl.generics.to_token_stream().to_string(),
            quote!(<__Stage = marker_builder_stages::Complete>).to_string()
        );
        assert_eq!(impl_fns(&file), ["restage", "build"]);
    }
}
