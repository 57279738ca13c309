//! The per-system interpretation graph.
//!
//! A multigraph: vertices are the system's live candidates, edges its
//! relations, parallel edges allowed. Candidates are kept in an arena and
//! only ever marked deleted, so ids stay stable for serialization and
//! iteration snapshots stay cheap. All mutation goes through methods here.

use ahash::AHashMap;
use tracing::{debug, error};

use syrinx_common::config::ReduceConfig;
use syrinx_common::geom::{Point, Rect};
use syrinx_common::grades;
use syrinx_common::{Result, SyrinxError};

use crate::id::{IdAllocator, InterId, RelId, StaffId, SystemId};
use crate::inter::Inter;
use crate::relation::{ExclusionCause, Relation, RelationData, Support, SupportTag};
use crate::shape::Shape;

#[derive(Debug, Clone)]
pub struct Sig {
    system: SystemId,
    inters: Vec<Inter>,
    index: AHashMap<InterId, usize>,
    relations: Vec<Option<Relation>>,
    adjacency: AHashMap<InterId, Vec<RelId>>,
}

impl Sig {
    pub fn new(system: SystemId) -> Self {
        Self {
            system,
            inters: Vec::new(),
            index: AHashMap::new(),
            relations: Vec::new(),
            adjacency: AHashMap::new(),
        }
    }

    pub fn system(&self) -> SystemId {
        self.system
    }

    // ---------------------------------------------------------------
    // Vertices
    // ---------------------------------------------------------------

    /// Register a candidate, assigning its page-unique id.
    pub fn add_inter(&mut self, mut inter: Inter, allocator: &mut IdAllocator) -> InterId {
        assert!(!inter.is_deleted(), "cannot register a deleted candidate");
        let id = allocator.next_id();
        inter.assign_id(id);
        self.index.insert(id, self.inters.len());
        self.inters.push(inter);
        self.adjacency.insert(id, Vec::new());
        id
    }

    /// Re-insert a candidate that already carries an id (attic restore).
    pub(crate) fn readmit_inter(&mut self, inter: Inter) {
        let id = inter.id();
        assert_ne!(id, InterId(0), "readmitted candidate must carry an id");

        if let Some(&slot) = self.index.get(&id) {
            if self.inters[slot].is_deleted() {
                self.inters[slot] = inter;
                self.inters[slot].unmark_deleted();
            }
        } else {
            self.index.insert(id, self.inters.len());
            self.inters.push(inter);
        }
        self.adjacency.entry(id).or_default();
    }

    pub fn get(&self, id: InterId) -> Option<&Inter> {
        self.index
            .get(&id)
            .map(|&slot| &self.inters[slot])
            .filter(|i| !i.is_deleted())
    }

    pub fn get_mut(&mut self, id: InterId) -> Option<&mut Inter> {
        let slot = *self.index.get(&id)?;
        let inter = &mut self.inters[slot];
        if inter.is_deleted() {
            None
        } else {
            Some(inter)
        }
    }

    pub fn contains(&self, id: InterId) -> bool {
        self.get(id).is_some()
    }

    pub fn shape_of(&self, id: InterId) -> Option<Shape> {
        self.get(id).map(|i| i.shape)
    }

    pub fn bounds_of(&self, id: InterId) -> Option<Rect> {
        self.get(id).map(|i| i.bounds)
    }

    pub fn staff_of(&self, id: InterId) -> Option<StaffId> {
        self.get(id).and_then(|i| i.staff)
    }

    pub fn grade_of(&self, id: InterId) -> Option<f64> {
        self.get(id).map(|i| i.grade())
    }

    pub fn best_grade_of(&self, id: InterId) -> Option<f64> {
        self.get(id).map(|i| i.best_grade())
    }

    pub fn is_frozen(&self, id: InterId) -> bool {
        self.get(id).map(|i| i.frozen).unwrap_or(false)
    }

    /// Delete a candidate and cascade to its incident relations.
    pub fn remove_inter(&mut self, id: InterId) {
        let Some(&slot) = self.index.get(&id) else {
            return;
        };
        if self.inters[slot].is_deleted() {
            return;
        }

        for rel_id in self.relations_of(id) {
            self.remove_relation(rel_id);
        }
        self.inters[slot].mark_deleted();
        debug!(system = self.system.0, inter = id.0, "removed candidate");
    }

    pub fn remove_inters(&mut self, ids: &[InterId]) {
        for &id in ids {
            self.remove_inter(id);
        }
    }

    /// Snapshot of all live candidate ids, in id order.
    pub fn live_inters(&self) -> Vec<InterId> {
        self.inters
            .iter()
            .filter(|i| !i.is_deleted())
            .map(|i| i.id())
            .collect()
    }

    pub fn live_inter_count(&self) -> usize {
        self.inters.iter().filter(|i| !i.is_deleted()).count()
    }

    pub fn inters_of_shape(&self, shape: Shape) -> Vec<InterId> {
        self.inters_matching(|i| i.shape == shape)
    }

    pub fn inters_matching(&self, predicate: impl Fn(&Inter) -> bool) -> Vec<InterId> {
        self.inters
            .iter()
            .filter(|i| !i.is_deleted() && predicate(i))
            .map(|i| i.id())
            .collect()
    }

    /// Live ids sorted by left abscissa (id as tie-break, so the order is
    /// deterministic).
    pub fn sorted_by_abscissa(&self, ids: &[InterId]) -> Vec<InterId> {
        let mut sorted: Vec<InterId> = ids.iter().copied().filter(|&i| self.contains(i)).collect();
        sorted.sort_by(|&a, &b| {
            let xa = self.bounds_of(a).map(|r| r.x).unwrap_or(f64::MAX);
            let xb = self.bounds_of(b).map(|r| r.x).unwrap_or(f64::MAX);
            xa.partial_cmp(&xb).unwrap().then(a.cmp(&b))
        });
        sorted
    }

    // ---------------------------------------------------------------
    // Spatial queries
    // ---------------------------------------------------------------

    /// Live candidates whose bounds intersect the rectangle.
    pub fn intersected_inters(&self, rect: &Rect) -> Vec<InterId> {
        self.inters_matching(|i| i.bounds.intersects(rect))
    }

    /// Same, over an abscissa-sorted id list with early exit: the variant
    /// to use on large sorted collections.
    pub fn intersected_in_sorted(&self, sorted: &[InterId], rect: &Rect) -> Vec<InterId> {
        let mut found = Vec::new();
        for &id in sorted {
            let Some(bounds) = self.bounds_of(id) else {
                continue;
            };
            if bounds.x > rect.max_x() {
                break;
            }
            if bounds.intersects(rect) {
                found.push(id);
            }
        }
        found
    }

    /// Live candidates containing the point, area-precise when possible.
    pub fn containing_inters(&self, point: Point) -> Vec<InterId> {
        self.inters_matching(|i| {
            i.bounds.contains_point(point)
                && i.area
                    .as_ref()
                    .map(|a| a.contains_point(point))
                    .unwrap_or(true)
        })
    }

    // ---------------------------------------------------------------
    // Edges
    // ---------------------------------------------------------------

    pub fn relation(&self, id: RelId) -> Option<&Relation> {
        self.relations.get(id.0 as usize)?.as_ref()
    }

    /// Snapshot of the relation ids incident to a candidate.
    pub fn relations_of(&self, id: InterId) -> Vec<RelId> {
        self.adjacency.get(&id).cloned().unwrap_or_default()
    }

    /// Incident supports, optionally restricted to one kind.
    pub fn supports_of(&self, id: InterId, tag: Option<SupportTag>) -> Vec<RelId> {
        self.relations_of(id)
            .into_iter()
            .filter(|&rel_id| {
                self.relation(rel_id)
                    .and_then(|r| r.data.as_support())
                    .map(|s| tag.is_none() || tag == Some(s.kind.tag()))
                    .unwrap_or(false)
            })
            .collect()
    }

    pub fn exclusions_of(&self, id: InterId) -> Vec<RelId> {
        self.relations_of(id)
            .into_iter()
            .filter(|&rel_id| {
                self.relation(rel_id)
                    .map(|r| r.data.is_exclusion())
                    .unwrap_or(false)
            })
            .collect()
    }

    /// All live exclusion edges, in edge id order.
    pub fn exclusions(&self) -> Vec<RelId> {
        self.relations
            .iter()
            .flatten()
            .filter(|r| r.data.is_exclusion())
            .map(|r| r.id)
            .collect()
    }

    pub fn live_relation_count(&self) -> usize {
        self.relations.iter().flatten().count()
    }

    /// First relation between the two candidates accepted by the
    /// predicate, either direction.
    pub fn relation_between(
        &self,
        a: InterId,
        b: InterId,
        predicate: impl Fn(&RelationData) -> bool,
    ) -> Option<RelId> {
        self.relations_of(a).into_iter().find(|&rel_id| {
            self.relation(rel_id)
                .map(|r| r.touches(b) && predicate(&r.data))
                .unwrap_or(false)
        })
    }

    pub fn support_between(&self, a: InterId, b: InterId, tag: Option<SupportTag>) -> Option<RelId> {
        self.relation_between(a, b, |data| {
            data.as_support()
                .map(|s| tag.is_none() || tag == Some(s.kind.tag()))
                .unwrap_or(false)
        })
    }

    pub fn exclusion_between(&self, a: InterId, b: InterId) -> Option<RelId> {
        self.relation_between(a, b, RelationData::is_exclusion)
    }

    pub fn has_support(&self, id: InterId, tag: SupportTag) -> bool {
        !self.supports_of(id, Some(tag)).is_empty()
    }

    /// Add a relation between two live candidates of this graph.
    ///
    /// An endpoint registered in another system's graph is unknown here,
    /// so cross-system edges are rejected.
    pub fn add_relation(
        &mut self,
        source: InterId,
        target: InterId,
        data: RelationData,
    ) -> Result<RelId> {
        assert_ne!(source, target, "relation endpoints must differ");

        for id in [source, target] {
            let Some(&slot) = self.index.get(&id) else {
                return Err(SyrinxError::UnknownInter(id.0));
            };
            if self.inters[slot].is_deleted() {
                return Err(SyrinxError::DeletedInter(id.0));
            }
        }

        let rel_id = RelId(self.relations.len() as u32);
        self.relations.push(Some(Relation {
            id: rel_id,
            source,
            target,
            data,
        }));
        self.adjacency.get_mut(&source).unwrap().push(rel_id);
        self.adjacency.get_mut(&target).unwrap().push(rel_id);
        Ok(rel_id)
    }

    pub fn remove_relation(&mut self, id: RelId) {
        let Some(slot) = self.relations.get_mut(id.0 as usize) else {
            return;
        };
        let Some(rel) = slot.take() else {
            return;
        };
        for endpoint in [rel.source, rel.target] {
            if let Some(list) = self.adjacency.get_mut(&endpoint) {
                list.retain(|&r| r != id);
            }
        }
    }

    pub fn remove_relations(&mut self, ids: &[RelId]) {
        for &id in ids {
            self.remove_relation(id);
        }
    }

    pub fn set_support_grade(&mut self, id: RelId, grade: f64) {
        if let Some(Some(rel)) = self.relations.get_mut(id.0 as usize) {
            if let RelationData::Support(support) = &mut rel.data {
                support.set_grade(grade);
            }
        }
    }

    /// Insert an exclusion between two candidates, idempotently.
    ///
    /// Reuses an existing exclusion; refuses (returns `None`) when a
    /// support already links the pair. The edge is stored lower id first.
    pub fn insert_exclusion(
        &mut self,
        a: InterId,
        b: InterId,
        cause: ExclusionCause,
    ) -> Option<RelId> {
        let (source, target) = if a < b { (a, b) } else { (b, a) };

        if let Some(existing) = self.exclusion_between(source, target) {
            return Some(existing);
        }
        if self.support_between(source, target, None).is_some() {
            return None;
        }

        self.add_relation(source, target, RelationData::Exclusion { cause })
            .ok()
    }

    /// Pairwise mutual exclusion over a small set.
    pub fn insert_exclusions(&mut self, ids: &[InterId], cause: ExclusionCause) -> Vec<RelId> {
        let mut unique: Vec<InterId> = Vec::with_capacity(ids.len());
        for &id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }

        let mut inserted = Vec::new();
        for (i, &a) in unique.iter().enumerate() {
            for &b in &unique[i + 1..] {
                if let Some(rel) = self.insert_exclusion(a, b, cause) {
                    inserted.push(rel);
                }
            }
        }
        inserted
    }

    /// Insert a symmetric support, idempotently (stored lower id first);
    /// refuses when an exclusion links the pair.
    pub fn insert_support(&mut self, a: InterId, b: InterId, support: Support) -> Option<RelId> {
        let (source, target) = if a < b { (a, b) } else { (b, a) };

        if self.exclusion_between(source, target).is_some() {
            debug!(
                a = source.0,
                b = target.0,
                "no support possible between exclusive candidates"
            );
            return None;
        }
        if let Some(existing) = self.support_between(source, target, Some(support.kind.tag())) {
            return Some(existing);
        }

        self.add_relation(source, target, RelationData::Support(support))
            .ok()
    }

    // ---------------------------------------------------------------
    // Contextual grades
    // ---------------------------------------------------------------

    /// Recompute one candidate's contextual grade from its live supports.
    pub fn compute_contextual_grade(&mut self, id: InterId, config: &ReduceConfig) -> f64 {
        let Some(grade) = self.grade_of(id) else {
            return 0.0;
        };

        let mut contribution = 0.0;
        for rel_id in self.supports_of(id, None) {
            let Some(rel) = self.relation(rel_id) else {
                continue;
            };
            let Some(support) = rel.data.as_support() else {
                continue;
            };

            let (ratio, partner) = if id == rel.target {
                (support.target_ratio(&config.gaps), rel.source)
            } else {
                (support.source_ratio(&config.gaps), rel.target)
            };

            if ratio > 1.0 {
                if let Some(partner_grade) = self.grade_of(partner) {
                    contribution += partner_grade * (ratio - 1.0);
                }
            }
        }

        let cg = grades::contextual(grade, contribution);
        if let Some(inter) = self.get_mut(id) {
            inter.set_contextual_grade(cg);
        }
        cg
    }

    /// Recompute every live candidate's contextual grade.
    pub fn contextualize(&mut self, config: &ReduceConfig) {
        for id in self.live_inters() {
            self.compute_contextual_grade(id, config);
        }
    }

    /// Purge candidates whose contextual grade is below the configured
    /// minimum. Frozen candidates are never purged; ledgers are left to
    /// the ledger structural rule.
    pub fn delete_weak_inters(&mut self, config: &ReduceConfig) -> Vec<InterId> {
        let weak: Vec<InterId> = self.inters_matching(|i| {
            !i.frozen
                && i.shape != Shape::Ledger
                && i.best_grade() < config.thresholds.min_contextual_grade
        });

        self.remove_inters(&weak);
        weak
    }

    // ---------------------------------------------------------------
    // Exclusion resolution
    // ---------------------------------------------------------------

    /// Resolve every exclusion by deleting the weaker endpoint,
    /// strongest-contested edges first.
    ///
    /// After each deletion the contextual grades of the deleted
    /// candidate's former partners are refreshed, so later comparisons
    /// see up-to-date values. A frozen candidate never loses; equal
    /// grades resolve in favor of the lower id.
    pub fn reduce_exclusions(&mut self, config: &ReduceConfig) -> Vec<InterId> {
        let mut pending = self.exclusions();
        let mut removed = Vec::new();

        loop {
            // Pick the live exclusion with the highest endpoint grade
            let mut best: Option<(RelId, f64)> = None;
            pending.retain(|&rel_id| self.relation(rel_id).is_some());

            for &rel_id in &pending {
                let rel = self.relation(rel_id).unwrap();
                let (s, t) = (rel.source, rel.target);
                let cp = self
                    .best_grade_of(s)
                    .unwrap_or(0.0)
                    .max(self.best_grade_of(t).unwrap_or(0.0));
                if best.map(|(_, b)| cp > b).unwrap_or(true) {
                    best = Some((rel_id, cp));
                }
            }

            let Some((rel_id, _)) = best else {
                break;
            };

            let rel = self.relation(rel_id).unwrap();
            let (source, target) = (rel.source, rel.target);

            let weaker = match (self.is_frozen(source), self.is_frozen(target)) {
                (true, true) => {
                    error!(
                        a = source.0,
                        b = target.0,
                        "conflicting frozen candidates, dropping the edge"
                    );
                    self.remove_relation(rel_id);
                    pending.retain(|&r| r != rel_id);
                    continue;
                }
                (true, false) => target,
                (false, true) => source,
                (false, false) => {
                    let sg = self.best_grade_of(source).unwrap_or(0.0);
                    let tg = self.best_grade_of(target).unwrap_or(0.0);
                    if sg < tg {
                        source
                    } else if tg < sg {
                        target
                    } else {
                        // Deterministic tie-break: the earlier candidate wins
                        source.max(target)
                    }
                }
            };

            if self.get(weaker).map(|i| i.vip).unwrap_or(false) {
                debug!(weaker = weaker.0, "conflict resolved against flagged candidate");
            }

            // Partners supported by the loser must be re-graded
            let involved: Vec<InterId> = self
                .supports_of(weaker, None)
                .into_iter()
                .filter_map(|r| self.relation(r).map(|rel| rel.opposite(weaker)))
                .collect();

            self.remove_inter(weaker);
            removed.push(weaker);

            for partner in involved {
                self.compute_contextual_grade(partner, config);
            }

            pending.retain(|&r| r != rel_id);
        }

        removed
    }
}
