use crate::{
    lattice::DEFAULT_STAGE_LIMIT,
    member::{DefaultExpr, MemberList},
};
use convert_case::{Case, Casing};
use thiserror::Error as ThisError;

///
/// TargetError
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum TargetError {
    #[error("invalid {role} identifier '{name}'")]
    InvalidName { role: &'static str, name: String },

    #[error("malformed constructor path '{path}' ({reason})")]
    MalformedConstructor { path: String, reason: String },

    #[error("malformed visibility '{vis}'")]
    MalformedVisibility { vis: String },

    #[error("cannot resolve a usable constructor for '{target}': {reason}")]
    UnresolvedConstructor { target: String, reason: String },
}

///
/// Construction
///
/// How `build()` produces the target value.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Construction {
    /// A struct literal naming every field.
    Literal,

    /// A designated constructor function. Argument members are passed
    /// positionally, field members are assigned on the result.
    Function(String),
}

///
/// FixedField
///
/// A field that is not driven by the builder. Struct-literal construction
/// fills it with its default; constructor functions leave it alone.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FixedField {
    pub field: String,
    pub default_expr: DefaultExpr,
}

///
/// BuilderConfig
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuilderConfig {
    /// Name of the factory function added to the target.
    pub factory: String,

    /// Builder type name; `<Target>Builder` when unset.
    pub builder_name: Option<String>,

    /// Stages module name; `<target_snake>_builder_stages` when unset.
    pub stages_module: Option<String>,

    pub stage_limit: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            factory: "builder".to_string(),
            builder_name: None,
            stages_module: None,
            stage_limit: DEFAULT_STAGE_LIMIT,
        }
    }
}

///
/// Target
///
/// Everything the generator needs to know about one target type.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Target {
    pub(crate) name: String,
    pub(crate) vis: String,
    pub(crate) construction: Construction,
    pub(crate) members: MemberList,
    pub(crate) fixed: Vec<FixedField>,
    pub(crate) config: BuilderConfig,
}

impl Target {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn vis(&self) -> &str {
        &self.vis
    }

    #[must_use]
    pub const fn construction(&self) -> &Construction {
        &self.construction
    }

    #[must_use]
    pub const fn members(&self) -> &MemberList {
        &self.members
    }

    #[must_use]
    pub fn fixed(&self) -> &[FixedField] {
        &self.fixed
    }

    #[must_use]
    pub const fn config(&self) -> &BuilderConfig {
        &self.config
    }

    #[must_use]
    pub fn builder_name(&self) -> String {
        self.config
            .builder_name
            .clone()
            .unwrap_or_else(|| format!("{}Builder", self.name))
    }

    #[must_use]
    pub fn stages_module(&self) -> String {
        self.config
            .stages_module
            .clone()
            .unwrap_or_else(|| format!("{}_builder_stages", self.name.to_case(Case::Snake)))
    }
}
