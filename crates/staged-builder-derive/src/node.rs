use darling::{Error as DarlingError, FromDeriveInput, FromField, ast::Data, util::Override};
use quote::ToTokens;
use staged_builder_core::{
    lattice::DEFAULT_STAGE_LIMIT,
    member::Fallback,
    target::BuilderConfig,
};
use syn::{Ident, LitStr, Type, Visibility, ext::IdentExt};

///
/// BuilderInput
///

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(builder), supports(struct_any))]
pub struct BuilderInput {
    pub ident: Ident,
    pub vis: Visibility,
    pub data: Data<(), BuilderField>,

    #[darling(default)]
    pub constructor: Option<LitStr>,

    #[darling(default)]
    pub factory: Option<Ident>,

    #[darling(default)]
    pub name: Option<Ident>,

    #[darling(default)]
    pub stages: Option<Ident>,

    #[darling(default)]
    pub stage_limit: Option<usize>,
}

impl BuilderInput {
    pub fn config(&self) -> BuilderConfig {
        let defaults = BuilderConfig::default();

        BuilderConfig {
            factory: self
                .factory
                .as_ref()
                .map_or(defaults.factory, ToString::to_string),
            builder_name: self.name.as_ref().map(ToString::to_string),
            stages_module: self.stages.as_ref().map(ToString::to_string),
            stage_limit: self.stage_limit.unwrap_or(DEFAULT_STAGE_LIMIT),
        }
    }

    pub fn vis(&self) -> String {
        self.vis.to_token_stream().to_string()
    }

    /// Reject option combinations that would otherwise be silently ignored.
    pub fn validate(&self) -> darling::Result<()> {
        let mut errors = DarlingError::accumulator();
        let fields = self.data.as_ref().take_struct().map(|f| f.fields);

        for field in fields.unwrap_or_default() {
            if field.skip && field.arg {
                errors.push(field.error("`skip` and `arg` cannot be combined"));
            }

            if field.skip && self.constructor.is_some() && field.default.is_some() {
                errors.push(field.error(
                    "a skipped field is left to the constructor; remove `default`",
                ));
            }
        }

        errors.finish()
    }
}

///
/// BuilderField
///

#[derive(Debug, FromField)]
#[darling(attributes(builder))]
pub struct BuilderField {
    pub ident: Option<Ident>,
    pub ty: Type,

    /// `default` uses `Default::default()`, `default = "expr"` an expression.
    #[darling(default)]
    pub default: Option<Override<LitStr>>,

    /// Passed to the designated constructor instead of assigned.
    #[darling(default)]
    pub arg: bool,

    #[darling(default)]
    pub name: Option<Ident>,

    #[darling(default)]
    pub skip: bool,
}

impl BuilderField {
    /// Member name; tuple fields fall back to `field_<index>`.
    pub fn member_name(&self, position: usize) -> String {
        match (&self.name, &self.ident) {
            (Some(name), _) => name.to_string(),
            (None, Some(ident)) => ident.unraw().to_string(),
            (None, None) => format!("field_{position}"),
        }
    }

    /// Field reference used in literals and assignments.
    pub fn field_ref(&self, position: usize) -> String {
        self.ident
            .as_ref()
            .map_or_else(|| position.to_string(), ToString::to_string)
    }

    pub fn type_text(&self) -> String {
        self.ty.to_token_stream().to_string()
    }

    pub fn fallback(&self) -> Fallback {
        match &self.default {
            None => Fallback::Required,
            Some(Override::Inherit) => Fallback::Sentinel,
            Some(Override::Explicit(expr)) => Fallback::Expr(expr.value()),
        }
    }

    fn error(&self, message: &str) -> DarlingError {
        let error = DarlingError::custom(message);

        match &self.ident {
            Some(ident) => error.with_span(ident),
            None => error.with_span(&self.ty),
        }
    }

    /// Default used for a skipped field under struct-literal construction.
    pub fn skip_default(&self) -> Option<String> {
        match &self.default {
            Some(Override::Explicit(expr)) => Some(expr.value()),
            _ => None,
        }
    }
}
