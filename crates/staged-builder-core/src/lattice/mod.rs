//! Stage lattice construction.
//!
//! A stage is the builder state in which a given set of members has already
//! been supplied. Stages are keyed by that *excluded* set, never by the order
//! in which it was supplied, so every arrival order of the same set collapses
//! onto one stage and the lattice stays exponential (subsets) rather than
//! factorial (permutations) in the member count.

mod cancel;


pub use cancel::CancelFlag;

use crate::member::{Member, MemberList};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error as ThisError;
use tracing::{debug, trace};

/// Default upper bound on materialized stages per target.
pub const DEFAULT_STAGE_LIMIT: usize = 1 << 12;

/// Separator used in canonical member-set identities.
pub const IDENTITY_SEPARATOR: &str = "_";

///
/// LatticeError
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum LatticeError {
    #[error("lattice construction cancelled")]
    Cancelled,

    #[error("duplicate member index {index} shared by '{first}' and '{second}'")]
    DuplicateIndex {
        index: usize,
        first: String,
        second: String,
    },

    #[error("duplicate member identifier '{name}' produced by '{first}' and '{second}'")]
    DuplicateMember {
        name: String,
        first: String,
        second: String,
    },

    #[error("stage limit of {limit} exceeded")]
    StageLimitExceeded { limit: usize },
}

///
/// MemberSet
///
/// Unordered set of members, held by declaration index.
///

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MemberSet(BTreeSet<usize>);

impl MemberSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of this set with `index` added.
    #[must_use]
    pub fn with(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.0.insert(index);

        next
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Member indexes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Resolve the set against its member list, in index order.
    pub fn members<'a>(&'a self, members: &'a MemberList) -> impl Iterator<Item = &'a Member> {
        self.iter().filter_map(|index| members.get(index))
    }

    /// Canonical, order-independent identity: member names sorted by index.
    #[must_use]
    pub fn canonical(&self, members: &MemberList) -> String {
        self.members(members)
            .map(Member::name)
            .collect::<Vec<_>>()
            .join(IDENTITY_SEPARATOR)
    }
}

impl FromIterator<usize> for MemberSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

///
/// StageKey
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum StageKey {
    /// A materialized stage, identified by the members already supplied.
    Partial(MemberSet),

    /// The universal terminal stage: every member supplied or skippable and
    /// nothing left to offer except `build`.
    Complete,
}

impl StageKey {
    #[must_use]
    pub fn root() -> Self {
        Self::Partial(MemberSet::new())
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Partial(set) if set.is_empty())
    }

    #[must_use]
    pub const fn excluded(&self) -> Option<&MemberSet> {
        match self {
            Self::Partial(set) => Some(set),
            Self::Complete => None,
        }
    }
}

///
/// Edge
///
/// Supplying `member` while in `from` moves the builder to `to`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Edge {
    pub from: StageKey,
    pub member: usize,
    pub to: StageKey,
}

///
/// Stage
///

#[derive(Clone, Debug)]
pub struct Stage {
    pub excluded: MemberSet,
    pub remaining_mandatory: Vec<usize>,
    pub remaining_optional: Vec<usize>,
    pub edges: Vec<Edge>,
}

impl Stage {
    #[must_use]
    pub fn key(&self) -> StageKey {
        StageKey::Partial(self.excluded.clone())
    }

    /// `build` is reachable once no mandatory member remains.
    #[must_use]
    pub fn can_build(&self) -> bool {
        self.remaining_mandatory.is_empty()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.excluded.is_empty()
    }

    #[must_use]
    pub fn edge(&self, member: usize) -> Option<&Edge> {
        self.edges.iter().find(|e| e.member == member)
    }
}

///
/// Lattice
///

#[derive(Clone, Debug)]
pub struct Lattice {
    members: MemberList,
    stages: Vec<Stage>,
    lookup: HashMap<MemberSet, usize>,
    root: StageKey,
}

impl Lattice {
    /// Build the lattice with default limits and no cancellation.
    pub fn build(members: &MemberList) -> Result<Self, LatticeError> {
        LatticeBuilder::new(members).build()
    }

    #[must_use]
    pub const fn members(&self) -> &MemberList {
        &self.members
    }

    #[must_use]
    pub const fn root(&self) -> &StageKey {
        &self.root
    }

    /// Materialized stages in discovery (pre-order) order.
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    #[must_use]
    pub fn stage(&self, key: &StageKey) -> Option<&Stage> {
        let excluded = key.excluded()?;

        self.lookup.get(excluded).map(|&slot| &self.stages[slot])
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.stages.iter().flat_map(|s| s.edges.iter())
    }

    #[must_use]
    pub fn can_build(&self, key: &StageKey) -> bool {
        match key {
            StageKey::Complete => true,
            StageKey::Partial(_) => self.stage(key).is_some_and(Stage::can_build),
        }
    }

    /// Follow the edge labelled `member` out of `from`.
    #[must_use]
    pub fn step(&self, from: &StageKey, member: usize) -> Option<&StageKey> {
        self.stage(from)?.edge(member).map(|e| &e.to)
    }

    /// Follow a sequence of supplied members from the root.
    #[must_use]
    pub fn walk(&self, path: &[usize]) -> Option<StageKey> {
        let mut current = self.root.clone();
        for &member in path {
            current = self.step(&current, member)?.clone();
        }

        Some(current)
    }
}

///
/// LatticeBuilder
///

pub struct LatticeBuilder<'a> {
    members: &'a MemberList,
    cancel: Option<&'a CancelFlag>,
    stage_limit: usize,
    stages: Vec<Stage>,
    memo: HashMap<MemberSet, usize>,
}

impl<'a> LatticeBuilder<'a> {
    #[must_use]
    pub fn new(members: &'a MemberList) -> Self {
        Self {
            members,
            cancel: None,
            stage_limit: DEFAULT_STAGE_LIMIT,
            stages: Vec::new(),
            memo: HashMap::new(),
        }
    }

    #[must_use]
    pub fn cancel(mut self, flag: &'a CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    #[must_use]
    pub fn stage_limit(mut self, limit: usize) -> Self {
        self.stage_limit = limit;
        self
    }

    pub fn build(mut self) -> Result<Lattice, LatticeError> {
        check_unique(self.members)?;

        let mandatory: Vec<usize> = self.members.mandatory().map(Member::index).collect();
        let optional: Vec<usize> = self.members.optional().map(Member::index).collect();
        let root = self.visit(&mandatory, &optional, MemberSet::new())?;

        let edges: usize = self.stages.iter().map(|s| s.edges.len()).sum();
        debug!(
            members = self.members.len(),
            mandatory = mandatory.len(),
            stages = self.stages.len(),
            edges,
            "stage lattice built"
        );

        Ok(Lattice {
            members: self.members.clone(),
            stages: self.stages,
            lookup: self.memo,
            root,
        })
    }

    // visit
    // materializes the stage for `excluded` (if new) and everything below it
    fn visit(
        &mut self,
        mandatory: &[usize],
        optional: &[usize],
        excluded: MemberSet,
    ) -> Result<StageKey, LatticeError> {
        if self.cancel.is_some_and(CancelFlag::is_cancelled) {
            return Err(LatticeError::Cancelled);
        }

        // optional members are only offered once every mandatory one is in
        let (active, mandatory_phase) = if !mandatory.is_empty() {
            (mandatory, true)
        } else if !optional.is_empty() {
            (optional, false)
        } else {
            return Ok(StageKey::Complete);
        };

        if self.memo.contains_key(&excluded) {
            return Ok(StageKey::Partial(excluded));
        }

        if self.stages.len() >= self.stage_limit {
            return Err(LatticeError::StageLimitExceeded {
                limit: self.stage_limit,
            });
        }

        let slot = self.stages.len();
        self.stages.push(Stage {
            excluded: excluded.clone(),
            remaining_mandatory: mandatory.to_vec(),
            remaining_optional: optional.to_vec(),
            edges: Vec::with_capacity(active.len()),
        });
        self.memo.insert(excluded.clone(), slot);

        trace!(
            stage = %excluded.canonical(self.members),
            remaining = active.len(),
            mandatory_phase,
            "materialized stage"
        );

        let from = StageKey::Partial(excluded.clone());
        let mut edges = Vec::with_capacity(active.len());

        for (position, &member) in active.iter().enumerate() {
            let rest: Vec<usize> = active
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != position)
                .map(|(_, &m)| m)
                .collect();

            let to = if mandatory_phase {
                self.visit(&rest, optional, excluded.with(member))?
            } else {
                self.visit(&[], &rest, excluded.with(member))?
            };

            edges.push(Edge {
                from: from.clone(),
                member,
                to,
            });
        }

        self.stages[slot].edges = edges;

        Ok(from)
    }
}

// check_unique
// names, display names and indexes all feed generated identifiers
fn check_unique(members: &MemberList) -> Result<(), LatticeError> {
    let mut names: HashMap<&str, &str> = HashMap::new();
    let mut display: HashMap<&str, &str> = HashMap::new();
    let mut indexes: HashMap<usize, &str> = HashMap::new();

    for member in members {
        if let Some(first) = names.insert(member.name(), member.name()) {
            return Err(LatticeError::DuplicateMember {
                name: member.name().to_string(),
                first: first.to_string(),
                second: member.name().to_string(),
            });
        }

        if let Some(first) = display.insert(member.display_name(), member.name()) {
            return Err(LatticeError::DuplicateMember {
                name: member.display_name().to_string(),
                first: first.to_string(),
                second: member.name().to_string(),
            });
        }

        if let Some(first) = indexes.insert(member.index(), member.name()) {
            return Err(LatticeError::DuplicateIndex {
                index: member.index(),
                first: first.to_string(),
                second: member.name().to_string(),
            });
        }
    }

    Ok(())
}
