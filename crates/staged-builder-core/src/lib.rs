//! ## Crate layout
//! - `member`: the member model (one entry per builder-driven field).
//! - `collect`: adapter-neutral member collection and index assignment.
//! - `target`: the per-type generation input and builder configuration.
//! - `lattice`: stage lattice construction, the heart of the generator.
//! - `emit`: token emitters for the stages module, builder and factory.
//! - `generate`: per-target and parallel multi-target generation.

pub mod artifact;
pub mod collect;
pub mod emit;
pub mod generate;
pub mod lattice;
pub mod member;
pub mod target;

use crate::{lattice::LatticeError, member::MemberError, target::TargetError};
use thiserror::Error as ThisError;

pub use generate::{
    Generated, generate, generate_all, generate_all_cancellable, generate_cancellable,
};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Error,
        artifact::{Artifact, ArtifactKind, RenderedArtifact},
        collect::Collector,
        emit::{BuilderEntity, Factory, Naming, StagesModule},
        generate::{
            Generated, generate, generate_all, generate_all_cancellable, generate_cancellable,
        },
        lattice::{CancelFlag, Edge, Lattice, LatticeBuilder, MemberSet, Stage, StageKey},
        member::{DefaultExpr, Fallback, Member, MemberList, Origin, TypeRef},
        target::{BuilderConfig, Construction, Target},
    };
}

///
/// Error
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum Error {
    #[error(transparent)]
    LatticeError(#[from] LatticeError),

    #[error(transparent)]
    MemberError(#[from] MemberError),

    #[error(transparent)]
    TargetError(#[from] TargetError),
}

impl Error {
    /// Member names the error refers to, used by adapters to point
    /// diagnostics at the right declaration.
    #[must_use]
    pub fn members(&self) -> Vec<&str> {
        match self {
            Self::LatticeError(
                LatticeError::DuplicateMember { first, second, .. }
                | LatticeError::DuplicateIndex { first, second, .. },
            ) => vec![first.as_str(), second.as_str()],
            Self::MemberError(err) => vec![err.member()],
            Self::LatticeError(_) | Self::TargetError(_) => Vec::new(),
        }
    }
}
