//! Page-level driver.
//!
//! Systems are independent units of work: each owns its graph and is
//! reduced on its own worker. The cross-system pass only runs after all
//! per-system reductions have joined, and its exclusions are resolved
//! right away with a targeted weaker-endpoint pass. A panicking system is
//! logged and skipped so the rest of the page still comes out.

use std::panic::{catch_unwind, AssertUnwindSafe};

use rayon::prelude::*;
use tracing::{info, warn};

use syrinx_common::config::ReduceConfig;
use syrinx_common::geom::Rect;
use syrinx_common::scale::Scale;
use syrinx_graph::{IdAllocator, Inter, InterId, Sig, SystemId};

use crate::cross::{detect_cross_overlaps, CrossExclusion};
use crate::reducer::{Mode, Reducer};

/// One region of the page, owning its interpretation graph.
#[derive(Debug)]
pub struct System {
    pub id: SystemId,
    pub bounds: Rect,
    pub scale: Scale,
    pub sig: Sig,
}

/// Outcome of a page-wide reduction.
#[derive(Debug, Default)]
pub struct PageReduction {
    /// Candidates removed per system, in system order.
    pub removed: Vec<(SystemId, Vec<InterId>)>,
    /// Systems whose reduction panicked and was skipped.
    pub failed: Vec<SystemId>,
    /// Candidates removed while resolving cross-system exclusions.
    pub cross_removed: Vec<(SystemId, InterId)>,
}

/// A page: the id allocator plus its systems, top to bottom.
#[derive(Debug)]
pub struct Page {
    config: ReduceConfig,
    allocator: IdAllocator,
    systems: Vec<System>,
}

impl Page {
    pub fn new(config: ReduceConfig) -> Self {
        Self {
            config,
            allocator: IdAllocator::new(),
            systems: Vec::new(),
        }
    }

    pub fn config(&self) -> &ReduceConfig {
        &self.config
    }

    pub fn add_system(&mut self, bounds: Rect, scale: Scale) -> SystemId {
        let id = SystemId(self.systems.len() as u32 + 1);
        self.systems.push(System {
            id,
            bounds,
            scale,
            sig: Sig::new(id),
        });
        id
    }

    pub fn system(&self, id: SystemId) -> Option<&System> {
        self.systems.iter().find(|s| s.id == id)
    }

    pub fn system_mut(&mut self, id: SystemId) -> Option<&mut System> {
        self.systems.iter_mut().find(|s| s.id == id)
    }

    pub fn systems(&self) -> &[System] {
        &self.systems
    }

    /// Register a candidate into one system's graph.
    pub fn add_inter(&mut self, system: SystemId, inter: Inter) -> Option<InterId> {
        let allocator = &mut self.allocator;
        self.systems
            .iter_mut()
            .find(|s| s.id == system)
            .map(|s| s.sig.add_inter(inter, allocator))
    }

    /// Reduce every system in parallel with the given rule set, then run
    /// the cross-system pass over the settled graphs.
    pub fn reduce(&mut self, mode: Mode, purge_weaks: bool) -> PageReduction {
        let config = &self.config;

        let results: Vec<_> = self
            .systems
            .par_iter_mut()
            .map(|system| {
                let mode = mode.clone();
                let outcome = catch_unwind(AssertUnwindSafe(|| {
                    Reducer::new(&mut system.sig, config, system.scale, purge_weaks, mode).reduce()
                }));
                (system.id, outcome)
            })
            .collect();

        let mut reduction = PageReduction::default();
        for (id, outcome) in results {
            match outcome {
                Ok(r) => reduction.removed.push((id, r.removed)),
                Err(_) => {
                    warn!(system = id.0, "system reduction failed, skipping");
                    reduction.failed.push(id);
                }
            }
        }

        reduction.cross_removed = self.reduce_gutters();

        info!(
            systems = self.systems.len(),
            failed = reduction.failed.len(),
            cross_removed = reduction.cross_removed.len(),
            "page reduction done"
        );
        reduction
    }

    /// Detect and resolve overlaps across every adjacent system pair.
    fn reduce_gutters(&mut self) -> Vec<(SystemId, InterId)> {
        let mut order: Vec<usize> = (0..self.systems.len()).collect();
        order.sort_by(|&a, &b| {
            self.systems[a]
                .bounds
                .y
                .partial_cmp(&self.systems[b].bounds.y)
                .unwrap()
        });

        let mut crossings: Vec<CrossExclusion> = Vec::new();
        for pair in order.windows(2) {
            let top = &self.systems[pair[0]];
            let bottom = &self.systems[pair[1]];
            crossings.extend(detect_cross_overlaps(
                &top.sig,
                &top.bounds,
                &bottom.sig,
                &bottom.bounds,
            ));
        }

        self.resolve_cross_exclusions(crossings)
    }

    /// Weaker-endpoint resolution for exclusions spanning two systems.
    /// Frozen candidates never lose; ties go to the lower id.
    fn resolve_cross_exclusions(
        &mut self,
        crossings: Vec<CrossExclusion>,
    ) -> Vec<(SystemId, InterId)> {
        let mut removed = Vec::new();

        for crossing in crossings {
            let (top_sys, a) = crossing.top;
            let (bottom_sys, b) = crossing.bottom;

            let (a_frozen, a_grade) = match self.system(top_sys).map(|s| &s.sig) {
                Some(sig) if sig.contains(a) => (sig.is_frozen(a), sig.best_grade_of(a).unwrap()),
                _ => continue,
            };
            let (b_frozen, b_grade) = match self.system(bottom_sys).map(|s| &s.sig) {
                Some(sig) if sig.contains(b) => (sig.is_frozen(b), sig.best_grade_of(b).unwrap()),
                _ => continue,
            };

            let loser = match (a_frozen, b_frozen) {
                (true, true) => {
                    tracing::error!(a = a.0, b = b.0, "conflicting frozen candidates across systems");
                    continue;
                }
                (true, false) => crossing.bottom,
                (false, true) => crossing.top,
                (false, false) => {
                    if a_grade < b_grade {
                        crossing.top
                    } else if b_grade < a_grade {
                        crossing.bottom
                    } else if a < b {
                        crossing.bottom
                    } else {
                        crossing.top
                    }
                }
            };

            if let Some(system) = self.system_mut(loser.0) {
                system.sig.remove_inter(loser.1);
                removed.push(loser);
            }
        }

        removed
    }
}
