use convert_case::{Case, Casing};
use derive_more::{Deref, Display, IntoIterator};
use proc_macro2::TokenStream;
use quote::ToTokens;
use std::slice::Iter;
use syn::{Expr, Ident, Type};
use thiserror::Error as ThisError;

/// Text of the "no value" default used when a member declares none.
pub const SENTINEL_DEFAULT: &str = "::core::default::Default::default()";

///
/// MemberError
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum MemberError {
    #[error("invalid member name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("malformed default expression for member '{member}': '{expr}' ({reason})")]
    MalformedDefaultExpression {
        member: String,
        expr: String,
        reason: String,
    },

    #[error("malformed field reference for member '{member}': '{field}'")]
    MalformedField { member: String, field: String },

    #[error("malformed type for member '{member}': '{ty}' ({reason})")]
    MalformedType {
        member: String,
        ty: String,
        reason: String,
    },
}

impl MemberError {
    /// Name of the member the error was raised for.
    #[must_use]
    pub fn member(&self) -> &str {
        match self {
            Self::InvalidName { name, .. } => name,
            Self::MalformedDefaultExpression { member, .. }
            | Self::MalformedField { member, .. }
            | Self::MalformedType { member, .. } => member,
        }
    }
}

///
/// TypeRef
///
/// Declared type of a member, kept as normalized token text so that the
/// member model can cross threads.
///

#[derive(Clone, Debug, Display, Eq, Hash, PartialEq)]
pub struct TypeRef(String);

impl TypeRef {
    pub fn parse(member: &str, text: &str) -> Result<Self, MemberError> {
        let ty = syn::parse_str::<Type>(text).map_err(|err| MemberError::MalformedType {
            member: member.to_string(),
            ty: text.to_string(),
            reason: err.to_string(),
        })?;

        Ok(Self(ty.to_token_stream().to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ToTokens for TypeRef {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        match syn::parse_str::<Type>(&self.0) {
            Ok(ty) => ty.to_tokens(tokens),
            Err(err) => tokens.extend(err.to_compile_error()),
        }
    }
}

///
/// DefaultExpr
///

#[derive(Clone, Debug, Display, Eq, Hash, PartialEq)]
#[display("{text}")]
pub struct DefaultExpr {
    text: String,
    sentinel: bool,
}

impl DefaultExpr {
    /// The `Default::default()` fallback shared by every member without an
    /// explicit default.
    #[must_use]
    pub fn sentinel() -> Self {
        Self {
            text: SENTINEL_DEFAULT.to_string(),
            sentinel: true,
        }
    }

    /// Validate a user supplied default expression.
    pub fn parse(member: &str, text: &str) -> Result<Self, MemberError> {
        let malformed = |reason: String| MemberError::MalformedDefaultExpression {
            member: member.to_string(),
            expr: text.to_string(),
            reason,
        };

        if text.trim().is_empty() {
            return Err(malformed("expression is empty".to_string()));
        }

        let expr = syn::parse_str::<Expr>(text).map_err(|err| malformed(err.to_string()))?;

        Ok(Self {
            text: expr.to_token_stream().to_string(),
            sentinel: false,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        self.sentinel
    }
}

impl ToTokens for DefaultExpr {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        match syn::parse_str::<Expr>(&self.text) {
            Ok(expr) => expr.to_tokens(tokens),
            Err(err) => tokens.extend(err.to_compile_error()),
        }
    }
}

///
/// Fallback
///
/// What a member falls back to when the caller never supplies it.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Fallback {
    /// No default available: the member is mandatory.
    Required,
    /// Optional, defaulting to `Default::default()`.
    Sentinel,
    /// Optional, defaulting to the given expression.
    Expr(String),
}

impl Fallback {
    #[must_use]
    pub const fn is_required(&self) -> bool {
        matches!(self, Self::Required)
    }

    pub(crate) fn resolve(&self, member: &str) -> Result<DefaultExpr, MemberError> {
        match self {
            Self::Required | Self::Sentinel => Ok(DefaultExpr::sentinel()),
            Self::Expr(text) => DefaultExpr::parse(member, text),
        }
    }
}

///
/// Origin
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Origin {
    /// Passed positionally to the designated constructor function.
    Argument,
    /// Assigned by name on the constructed value. `field` is a named field
    /// identifier or a tuple index.
    Field { field: String },
}

impl Origin {
    pub fn field(member: &str, field: &str) -> Result<Self, MemberError> {
        syn::parse_str::<syn::Member>(field).map_err(|_| MemberError::MalformedField {
            member: member.to_string(),
            field: field.to_string(),
        })?;

        Ok(Self::Field {
            field: field.to_string(),
        })
    }

    #[must_use]
    pub const fn is_argument(&self) -> bool {
        matches!(self, Self::Argument)
    }
}

///
/// Member
///
/// One field of the target type as seen by the builder.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Member {
    name: String,
    display_name: String,
    ty: TypeRef,
    mandatory: bool,
    index: usize,
    default_expr: DefaultExpr,
    origin: Origin,
}

impl Member {
    pub fn new(
        name: &str,
        ty: &str,
        fallback: &Fallback,
        index: usize,
        origin: Origin,
    ) -> Result<Self, MemberError> {
        validate_name(name)?;
        let ty = TypeRef::parse(name, ty)?;
        let default_expr = fallback.resolve(name)?;

        Ok(Self {
            name: name.to_string(),
            display_name: display_name(name),
            ty,
            mandatory: fallback.is_required(),
            index,
            default_expr,
            origin,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub const fn ty(&self) -> &TypeRef {
        &self.ty
    }

    #[must_use]
    pub const fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn default_expr(&self) -> &DefaultExpr {
        &self.default_expr
    }

    #[must_use]
    pub const fn origin(&self) -> &Origin {
        &self.origin
    }
}

// display_name
// UpperCamel form used for generated trait and stage identifiers
fn display_name(name: &str) -> String {
    name.to_case(Case::Pascal)
}

// validate_name
// member names become method and field identifiers, so they must be plain
// (non-raw, non-keyword) Rust identifiers; the `__` prefix is reserved for
// generated items
fn validate_name(name: &str) -> Result<(), MemberError> {
    let invalid = |reason: &str| MemberError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.starts_with("r#") {
        return Err(invalid("raw identifiers are not allowed"));
    }

    let ident = syn::parse_str::<Ident>(name).map_err(|_| invalid("not a Rust identifier"))?;
    if ident != name {
        return Err(invalid("not a Rust identifier"));
    }

    if name.starts_with("__") {
        return Err(invalid("the `__` prefix is reserved for generated items"));
    }

    if display_name(name).is_empty() {
        return Err(invalid("name has no alphanumeric characters"));
    }

    Ok(())
}

///
/// MemberList
///
/// Members of one target type, kept sorted by `index`.
///

#[derive(Clone, Debug, Default, Deref, Eq, IntoIterator, PartialEq)]
pub struct MemberList(Vec<Member>);

impl MemberList {
    #[must_use]
    pub fn new(mut members: Vec<Member>) -> Self {
        members.sort_by_key(Member::index);

        Self(members)
    }

    /// Look up a member by its declaration index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Member> {
        self.0
            .binary_search_by_key(&index, Member::index)
            .ok()
            .map(|position| &self.0[position])
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Member> {
        self.0.iter().find(|m| m.name == name)
    }

    pub fn mandatory(&self) -> impl Iterator<Item = &Member> {
        self.0.iter().filter(|m| m.mandatory)
    }

    pub fn optional(&self) -> impl Iterator<Item = &Member> {
        self.0.iter().filter(|m| !m.mandatory)
    }

    pub fn arguments(&self) -> impl Iterator<Item = &Member> {
        self.0.iter().filter(|m| m.origin.is_argument())
    }

    /// Field-origin members paired with their field reference.
    pub fn fields(&self) -> impl Iterator<Item = (&Member, &str)> {
        self.0.iter().filter_map(|m| match &m.origin {
            Origin::Field { field } => Some((m, field.as_str())),
            Origin::Argument => None,
        })
    }
}

impl<'a> IntoIterator for &'a MemberList {
    type Item = &'a Member;
    type IntoIter = Iter<'a, Member>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Member> for MemberList {
    fn from_iter<I: IntoIterator<Item = Member>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

///
/// TESTS
///
