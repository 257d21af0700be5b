//! Adapter-neutral member collection.
//!
//! Discovery adapters (the derive macro, build scripts, tests) report what
//! they found in declaration order; the collector assigns the stable indexes
//! the lattice relies on and validates everything up front.

use crate::{
    Error,
    member::{DefaultExpr, Fallback, Member, MemberError, MemberList, Origin},
    target::{BuilderConfig, Construction, FixedField, Target, TargetError},
};
use std::collections::HashSet;
use syn::{Ident, Path, Visibility};
use tracing::debug;

///
/// Pending
///

#[derive(Debug)]
struct Pending {
    name: String,
    ty: String,
    fallback: Fallback,
    field: Option<String>,
}

///
/// Collector
///

#[derive(Debug)]
pub struct Collector {
    target: String,
    vis: String,
    constructor: Option<String>,
    arguments: Vec<Pending>,
    fields: Vec<Pending>,
    fixed: Vec<(String, Option<String>)>,
    config: BuilderConfig,
}

impl Collector {
    #[must_use]
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            vis: String::new(),
            constructor: None,
            arguments: Vec::new(),
            fields: Vec::new(),
            fixed: Vec::new(),
            config: BuilderConfig::default(),
        }
    }

    #[must_use]
    pub fn visibility(mut self, vis: &str) -> Self {
        self.vis = vis.to_string();
        self
    }

    /// Designate the constructor function `build()` calls. A single segment
    /// names an associated function of the target.
    #[must_use]
    pub fn constructor(mut self, path: &str) -> Self {
        self.constructor = Some(path.to_string());
        self
    }

    #[must_use]
    pub fn config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    /// A positional constructor argument.
    #[must_use]
    pub fn argument(mut self, name: &str, ty: &str, fallback: Fallback) -> Self {
        self.arguments.push(Pending {
            name: name.to_string(),
            ty: ty.to_string(),
            fallback,
            field: None,
        });
        self
    }

    /// A field assigned by name.
    #[must_use]
    pub fn field(mut self, name: &str, field: &str, ty: &str, fallback: Fallback) -> Self {
        self.fields.push(Pending {
            name: name.to_string(),
            ty: ty.to_string(),
            fallback,
            field: Some(field.to_string()),
        });
        self
    }

    /// A field the builder never sets.
    #[must_use]
    pub fn skip(mut self, field: &str, default: Option<&str>) -> Self {
        self.fixed
            .push((field.to_string(), default.map(ToString::to_string)));
        self
    }

    pub fn finish(self) -> Result<Target, Error> {
        check_ident("target", &self.target)?;
        check_ident("factory", &self.config.factory)?;
        if let Some(name) = &self.config.builder_name {
            check_ident("builder", name)?;
        }
        if let Some(name) = &self.config.stages_module {
            check_ident("stages module", name)?;
        }

        syn::parse_str::<Visibility>(&self.vis).map_err(|_| TargetError::MalformedVisibility {
            vis: self.vis.clone(),
        })?;

        let construction = self.construction()?;

        // arguments first, then fields, each in declaration order
        let arg_names: HashSet<&str> = self.arguments.iter().map(|p| p.name.as_str()).collect();
        let mut members = Vec::with_capacity(self.arguments.len() + self.fields.len());

        for pending in &self.arguments {
            members.push(Member::new(
                &pending.name,
                &pending.ty,
                &pending.fallback,
                members.len(),
                Origin::Argument,
            )?);
        }

        for pending in &self.fields {
            if arg_names.contains(pending.name.as_str()) {
                debug!(
                    target_type = %self.target,
                    member = %pending.name,
                    "field shadowed by constructor argument"
                );
                continue;
            }

            let field = pending.field.as_deref().unwrap_or(&pending.name);
            members.push(Member::new(
                &pending.name,
                &pending.ty,
                &pending.fallback,
                members.len(),
                Origin::field(&pending.name, field)?,
            )?);
        }

        let fixed = self
            .fixed
            .iter()
            .map(|(field, default)| fixed_field(field, default.as_deref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Target {
            name: self.target,
            vis: self.vis,
            construction,
            members: MemberList::new(members),
            fixed,
            config: self.config,
        })
    }

    // construction
    // explicit designation only; arguments without a constructor are an error
    fn construction(&self) -> Result<Construction, TargetError> {
        match &self.constructor {
            Some(path) => {
                syn::parse_str::<Path>(path).map_err(|err| {
                    TargetError::MalformedConstructor {
                        path: path.clone(),
                        reason: err.to_string(),
                    }
                })?;

                Ok(Construction::Function(path.clone()))
            }
            None if !self.arguments.is_empty() => Err(TargetError::UnresolvedConstructor {
                target: self.target.clone(),
                reason: "constructor arguments declared without a designated constructor"
                    .to_string(),
            }),
            None => Ok(Construction::Literal),
        }
    }
}

fn fixed_field(field: &str, default: Option<&str>) -> Result<FixedField, MemberError> {
    // validates the field reference
    Origin::field(field, field)?;

    let default_expr = match default {
        Some(text) => DefaultExpr::parse(field, text)?,
        None => DefaultExpr::sentinel(),
    };

    Ok(FixedField {
        field: field.to_string(),
        default_expr,
    })
}

pub(crate) fn is_ident(name: &str) -> bool {
    syn::parse_str::<Ident>(name).is_ok_and(|ident| ident == name)
}

fn check_ident(role: &'static str, name: &str) -> Result<(), TargetError> {
    if is_ident(name) {
        Ok(())
    } else {
        Err(TargetError::InvalidName {
            role,
            name: name.to_string(),
        })
    }
}

///
/// TESTS
///
