//! Overlap detection across the boundary of two vertically adjacent
//! systems.
//!
//! The "gutter" is the intersection of the two systems' extents.
//! Candidates from either side whose center falls inside it are checked
//! pairwise with the same logic as in-system overlap detection; the
//! resulting exclusions span two graphs, so they are kept as explicit
//! records owned by the caller instead of edges in either graph.

use tracing::debug;

use syrinx_common::geom::Rect;
use syrinx_graph::{InterId, Shape, Sig, SystemId};

/// A mutual exclusion whose endpoints live in different systems.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossExclusion {
    pub top: (SystemId, InterId),
    pub bottom: (SystemId, InterId),
}

/// Candidates of one side whose center lies in the gutter. Text-line
/// aggregates routinely spill over a system boundary, so they are left
/// alone.
fn gutter_candidates(sig: &Sig, gutter: &Rect) -> Vec<InterId> {
    sig.inters_matching(|i| {
        i.shape != Shape::Sentence
            && !i.shape.overlap_exempt()
            && gutter.contains_point(i.center())
    })
}

/// Detect overlapping pairs across the boundary of two adjacent systems.
pub fn detect_cross_overlaps(
    top: &Sig,
    top_bounds: &Rect,
    bottom: &Sig,
    bottom_bounds: &Rect,
) -> Vec<CrossExclusion> {
    let Some(gutter) = top_bounds.intersection(bottom_bounds) else {
        return Vec::new();
    };

    let top_ids = gutter_candidates(top, &gutter);
    if top_ids.is_empty() {
        return Vec::new();
    }
    let bottom_ids = gutter_candidates(bottom, &gutter);
    if bottom_ids.is_empty() {
        return Vec::new();
    }

    let mut crossings = Vec::new();

    for &a in &top_ids {
        let Some(ai) = top.get(a) else {
            continue;
        };
        for &b in &bottom_ids {
            let Some(bi) = bottom.get(b) else {
                continue;
            };
            if ai.overlaps(bi) && bi.overlaps(ai) {
                crossings.push(CrossExclusion {
                    top: (top.system(), a),
                    bottom: (bottom.system(), b),
                });
            }
        }
    }

    debug!(
        top = top.system().0,
        bottom = bottom.system().0,
        count = crossings.len(),
        "cross-system overlaps"
    );
    crossings
}
