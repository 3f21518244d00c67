use crate::graph::Arc;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Opaque handle of a master-problem constraint, assigned by the collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ConsId(pub u32);

/// Opaque handle of a master-problem variable, assigned by the collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct VarId(pub u32);

impl ConsId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

impl VarId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

/// One entry of the arc -> constraint index: the constraint an arc's variable
/// appeared in, and its coefficient there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstraintCoef {
    pub constraint: ConsId,
    pub coefficient: f64,
}

/// Most arcs sit in one or two constraints.
pub type ConstraintCoefs = SmallVec<[ConstraintCoef; 2]>;

/// A master constraint that originally contained pricing variables, together
/// with those variables' arcs and coefficients. Used to push the constraint's
/// dual price onto arc weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub handle: ConsId,
    pub arcs: Vec<(Arc, f64)>,
}
