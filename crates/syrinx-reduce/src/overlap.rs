//! Geometric overlap detection.
//!
//! Candidates are swept left to right on their bounding boxes; each
//! box-intersecting pair that survives the compatibility exceptions gets a
//! precise geometry test and, when it truly overlaps, a mutual exclusion.
//! Expected cost is O(n log n + k) for k overlapping pairs.

use tracing::debug;

use syrinx_common::config::ReduceConfig;
use syrinx_graph::{ExclusionCause, InterId, Shape, Sig};

/// Detect overlapping candidate pairs and insert `Overlap` exclusions.
/// Returns the number of exclusions inserted.
pub fn detect_overlaps(sig: &mut Sig, _config: &ReduceConfig) -> usize {
    let candidates = sig.inters_matching(|i| !i.shape.overlap_exempt());
    let sorted = sig.sorted_by_abscissa(&candidates);
    let mut inserted = 0;

    for (i, &left) in sorted.iter().enumerate() {
        let Some(left_bounds) = sig.bounds_of(left) else {
            continue;
        };
        let left_mirror = sig.get(left).and_then(|inter| inter.mirror);
        let x_max = left_bounds.max_x();

        for &right in &sorted[i + 1..] {
            let Some(right_bounds) = sig.bounds_of(right) else {
                continue;
            };
            // The list is sorted by abscissa: once past our right edge,
            // nothing further can intersect
            if right_bounds.x > x_max {
                break;
            }
            if !left_bounds.intersects(&right_bounds) {
                continue;
            }

            // Mirror entities never exclude one another
            let right_mirror = sig.get(right).and_then(|inter| inter.mirror);
            if left_mirror == Some(right) || right_mirror == Some(left) {
                continue;
            }

            let (Some(left_shape), Some(right_shape)) = (sig.shape_of(left), sig.shape_of(right))
            else {
                continue;
            };
            if compatible(left_shape, right_shape) {
                continue;
            }

            let precise = {
                let (Some(li), Some(ri)) = (sig.get(left), sig.get(right)) else {
                    continue;
                };
                li.overlaps(ri) && ri.overlaps(li)
            };
            if !precise {
                continue;
            }

            apply_text_penalty(sig, left, right);

            if exclude(sig, left, right) {
                inserted += 1;
            }
        }
    }

    debug!(system = sig.system().0, inserted, "overlap detection done");
    inserted
}

/// Shape pairs whose overlap is accepted (symmetric).
fn compatible(a: Shape, b: Shape) -> bool {
    for (one, other) in [(a, b), (b, a)] {
        if one.is_beam() && (other.is_beam() || other.is_core_barline()) {
            return true;
        }
        if one == Shape::Slur
            && (other.is_accidental() || other.is_core_barline() || other.is_flag())
        {
            return true;
        }
        if one == Shape::Stem && (other == Shape::Slur || other.is_wedge()) {
            return true;
        }
    }
    false
}

/// When a recognized word overlaps a fixed symbol carrying the same text
/// (a dynamics letter, typically), both may well be right about the ink.
/// Knock the word down instead of excluding, and let exclusion resolution
/// settle the rest.
fn apply_text_penalty(sig: &mut Sig, left: InterId, right: InterId) {
    for (word, symbol) in [(left, right), (right, left)] {
        let matches = {
            let (Some(w), Some(s)) = (sig.get(word), sig.get(symbol)) else {
                continue;
            };
            match (w.shape, s.shape.symbol_string(), w.text()) {
                (Shape::Word, Some(sym_text), Some(word_text)) => {
                    word_text.eq_ignore_ascii_case(sym_text)
                }
                _ => false,
            }
        };

        if matches {
            if let Some(w) = sig.get_mut(word) {
                w.decrease(0.5);
            }
            return;
        }
    }
}

/// Insert the overlap exclusion, with the special amnesty for a stem
/// crossing a standard-size head (the head simply hides part of the stem).
fn exclude(sig: &mut Sig, left: InterId, right: InterId) -> bool {
    let (Some(ls), Some(rs)) = (sig.shape_of(left), sig.shape_of(right)) else {
        return false;
    };

    let stem_vs_standard_head = (ls == Shape::Stem && rs.is_head() && !rs.is_small())
        || (rs == Shape::Stem && ls.is_head() && !ls.is_small());
    if stem_vs_standard_head {
        return false;
    }

    sig.insert_exclusion(left, right, ExclusionCause::Overlap)
        .is_some()
}
