//! Detachable backup of a candidate subset.
//!
//! Saving copies the named candidates plus every relation touching them,
//! including relations to candidates outside the subset, so a speculative
//! reduction can later be rolled back for just that subset. The structure
//! is serializable, which is also what reference-based persistence of the
//! graph needs.

use serde::{Deserialize, Serialize};

use crate::graph::Sig;
use crate::id::{InterId, RelId};
use crate::inter::Inter;
use crate::relation::Relation;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attic {
    inters: Vec<Inter>,
    relations: Vec<Relation>,
}

impl Attic {
    /// Copy the given candidates and all their incident relations.
    pub fn save(sig: &Sig, ids: &[InterId]) -> Self {
        let mut inters = Vec::new();
        let mut relations: Vec<Relation> = Vec::new();
        let mut seen: Vec<RelId> = Vec::new();

        for &id in ids {
            let Some(inter) = sig.get(id) else {
                continue;
            };
            inters.push(inter.clone());

            for rel_id in sig.relations_of(id) {
                if seen.contains(&rel_id) {
                    continue;
                }
                if let Some(rel) = sig.relation(rel_id) {
                    seen.push(rel_id);
                    relations.push(rel.clone());
                }
            }
        }

        Self { inters, relations }
    }

    /// Re-insert the saved candidates (keeping their ids) and whichever
    /// saved relations have both endpoints alive afterwards.
    pub fn restore(&self, sig: &mut Sig) {
        for inter in &self.inters {
            sig.readmit_inter(inter.clone());
        }

        for rel in &self.relations {
            if !sig.contains(rel.source) || !sig.contains(rel.target) {
                continue;
            }
            let duplicate = sig
                .relation_between(rel.source, rel.target, |data| *data == rel.data)
                .is_some();
            if !duplicate {
                // Both endpoints verified alive just above
                sig.add_relation(rel.source, rel.target, rel.data.clone())
                    .expect("endpoints checked alive");
            }
        }
    }

    pub fn inter_ids(&self) -> Vec<InterId> {
        self.inters.iter().map(|i| i.id()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inters.is_empty()
    }
}
