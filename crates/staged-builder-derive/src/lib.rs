use proc_macro::TokenStream;

mod expand;
mod node;

/// Derive a staged builder for a struct.
///
/// Container options: `#[builder(constructor = "path", factory = "name",
/// name = "Builder", stages = "module", stage_limit = N)]`.
///
/// Field options: `default`, `default = "expr"`, `arg`, `name = "member"`
/// and `skip`.
#[proc_macro_derive(StagedBuilder, attributes(builder))]
pub fn derive_staged_builder(input: TokenStream) -> TokenStream {
    expand::derive_staged_builder(input.into()).into()
}
