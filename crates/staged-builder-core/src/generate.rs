//! Generation entry points.
//!
//! One target is one independent unit of work: no state is shared between
//! targets, so `generate_all` fans them out over rayon and a failure stays
//! local to the target that raised it.

use crate::{
    Error,
    artifact::{Artifact, ArtifactKind, RenderedArtifact},
    emit::{BuilderEntity, Factory, Naming, StagesModule},
    lattice::{CancelFlag, Lattice, LatticeBuilder},
    target::Target,
};
use proc_macro2::TokenStream;
use quote::ToTokens;
use rayon::prelude::*;
use tracing::{debug, warn};

///
/// Generated
///
/// The lattice of one target and the artifacts emitted from it.
///

#[derive(Clone, Debug)]
pub struct Generated {
    lattice: Lattice,
    artifacts: Vec<Artifact>,
}

impl Generated {
    #[must_use]
    pub const fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Artifacts in emission order: interfaces, builder, factory.
    #[must_use]
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    #[must_use]
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.kind() == kind)
    }

    #[must_use]
    pub fn render(&self) -> Vec<RenderedArtifact> {
        self.artifacts.iter().map(Artifact::render).collect()
    }

    #[must_use]
    pub fn into_tokens(self) -> TokenStream {
        self.to_token_stream()
    }
}

impl ToTokens for Generated {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        for artifact in &self.artifacts {
            artifact.to_tokens(tokens);
        }
    }
}

/// Generate the artifacts of one target.
pub fn generate(target: &Target) -> Result<Generated, Error> {
    run(target, None)
}

/// Generate one target, aborting with `Cancelled` once `cancel` is set.
pub fn generate_cancellable(target: &Target, cancel: &CancelFlag) -> Result<Generated, Error> {
    run(target, Some(cancel))
}

/// Generate many targets in parallel. Results come back in input order.
#[must_use]
pub fn generate_all(targets: &[Target]) -> Vec<Result<Vec<RenderedArtifact>, Error>> {
    generate_all_cancellable(targets, &CancelFlag::new())
}

/// As [`generate_all`], with one flag shared by every target.
#[must_use]
pub fn generate_all_cancellable(
    targets: &[Target],
    cancel: &CancelFlag,
) -> Vec<Result<Vec<RenderedArtifact>, Error>> {
    targets
        .par_iter()
        .map(|target| {
            let result = run(target, Some(cancel)).map(|generated| generated.render());
            if let Err(err) = &result {
                warn!(target_type = %target.name(), error = %err, "staged builder generation failed");
            }

            result
        })
        .collect()
}

// run
fn run(target: &Target, cancel: Option<&CancelFlag>) -> Result<Generated, Error> {
    let mut builder =
        LatticeBuilder::new(target.members()).stage_limit(target.config().stage_limit);
    if let Some(flag) = cancel {
        builder = builder.cancel(flag);
    }
    let lattice = builder.build()?;

    let naming = Naming::new(target);
    let interfaces = StagesModule::new(target, &naming, &lattice);
    let entity = BuilderEntity::new(target, &naming, &lattice)?;
    let factory = Factory::new(target, &naming, &lattice);

    let name = target.name();
    let artifacts = vec![
        Artifact::new(name, ArtifactKind::Interfaces, interfaces.to_token_stream()),
        Artifact::new(name, ArtifactKind::Builder, entity.to_token_stream()),
        Artifact::new(name, ArtifactKind::Factory, factory.to_token_stream()),
    ];

    debug!(
        target_type = %name,
        stages = lattice.stages().len(),
        artifacts = artifacts.len(),
        "generated staged builder"
    );

    Ok(Generated { lattice, artifacts })
}

///
/// TESTS
///
