//! syrinx-graph — The interpretation data model: shapes, candidates,
//! typed relations, and the per-system interpretation graph they live in.
//!
//! One graph per system. Candidates enter with an intrinsic grade, gather
//! support and exclusion edges, and are later thinned out by the reduction
//! engine (`syrinx-reduce`). All graph mutation goes through [`Sig`]
//! methods; candidates and relations never change their own membership.

pub mod attic;
pub mod graph;
pub mod id;
pub mod inter;
pub mod relation;
pub mod shape;

pub use attic::Attic;
pub use graph::Sig;
pub use id::{IdAllocator, InterId, RelId, StaffId, SystemId};
pub use inter::{Inter, Payload};
pub use relation::{
    BeamPortion, ExclusionCause, HorizontalSide, Relation, RelationData, StemPortion, Support,
    SupportKind, SupportTag,
};
pub use shape::Shape;
