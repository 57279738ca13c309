//! Per-shape structural validity rules.
//!
//! Each check scans a snapshot of the relevant candidates, removes or
//! disconnects the ones that fail their structural requirement, and
//! reports the number of modifications, so the engine can iterate the
//! whole batch to a fixpoint. Frozen candidates are never removed here.

use ahash::AHashMap;
use tracing::{debug, info};

use syrinx_common::config::ReduceConfig;
use syrinx_common::geom::Rect;
use syrinx_common::scale::Scale;
use syrinx_graph::{
    BeamPortion, ExclusionCause, HorizontalSide, InterId, RelId, Shape, Sig, StaffId, StemPortion,
    Support, SupportKind, SupportTag,
};

// -------------------------------------------------------------------
// Shared helpers
// -------------------------------------------------------------------

/// Remove a candidate unless it is frozen. Returns true when removed.
fn remove_unless_frozen(sig: &mut Sig, id: InterId) -> bool {
    if sig.is_frozen(id) {
        return false;
    }
    sig.remove_inter(id);
    true
}

/// Clone the (source, target, support) triple of a support relation.
fn support_parts(sig: &Sig, rel_id: RelId) -> Option<(InterId, InterId, Support)> {
    let rel = sig.relation(rel_id)?;
    let support = rel.data.as_support()?;
    Some((rel.source, rel.target, *support))
}

/// Which vertical portion of the stem an attachment anchored at
/// `extension_y` occupies. The anchor margin scales with the head height.
pub fn stem_portion(
    head_bounds: &Rect,
    stem_line: &syrinx_common::geom::Line,
    extension_y: f64,
    anchor_height_ratio: f64,
) -> StemPortion {
    let margin = head_bounds.height * anchor_height_ratio;
    let y_mid = stem_line.y_mid();

    if extension_y >= y_mid {
        if extension_y > stem_line.p2.y - margin {
            StemPortion::Bottom
        } else {
            StemPortion::Middle
        }
    } else if extension_y < stem_line.p1.y + margin {
        StemPortion::Top
    } else {
        StemPortion::Middle
    }
}

/// Portion occupied by the head of the given head-stem relation.
fn head_portion(sig: &Sig, rel_id: RelId, config: &ReduceConfig) -> Option<StemPortion> {
    let (head, stem, support) = support_parts(sig, rel_id)?;
    let SupportKind::HeadStem { extension_y, .. } = support.kind else {
        return None;
    };
    let head_bounds = sig.bounds_of(head)?;
    let stem_line = sig.get(stem)?.stem_median()?;

    Some(stem_portion(
        &head_bounds,
        &stem_line,
        extension_y,
        config.checks.anchor_height_ratio,
    ))
}

/// Stem direction from head to tail: -1 up, +1 down, 0 unknown.
///
/// Every attachment (head, beam, flag) votes; the best-graded partner
/// decides. Heads sit at the head end, beams and flags at the tail end.
pub fn stem_direction(sig: &Sig, stem: InterId, config: &ReduceConfig) -> i32 {
    let Some(stem_line) = sig.get(stem).and_then(|i| i.stem_median()) else {
        return 0;
    };
    let y_mid = stem_line.y_mid();

    // (partner best grade, partner id, direction vote)
    let mut votes: Vec<(f64, InterId, i32)> = Vec::new();

    for rel_id in sig.supports_of(stem, None) {
        let Some((source, _target, support)) = support_parts(sig, rel_id) else {
            continue;
        };
        let partner = source; // stem connections read attachment -> stem
        let Some(grade) = sig.best_grade_of(partner) else {
            continue;
        };

        let vote = match support.kind {
            SupportKind::HeadStem { .. } => match head_portion(sig, rel_id, config) {
                Some(StemPortion::Top) => 1,
                Some(StemPortion::Bottom) => -1,
                _ => 0,
            },
            SupportKind::BeamStem { .. } => {
                // Tail end is where the beam crosses
                let Some(beam_y) = sig.get(partner).map(|i| {
                    i.beam_median()
                        .map(|m| m.y_at_x(stem_line.p1.x))
                        .unwrap_or_else(|| i.center().y)
                }) else {
                    continue;
                };
                if beam_y < y_mid {
                    -1
                } else {
                    1
                }
            }
            SupportKind::FlagStem { portion } => match portion {
                StemPortion::Top => -1,
                StemPortion::Bottom => 1,
                StemPortion::Middle => 0,
            },
            _ => 0,
        };

        if vote != 0 {
            votes.push((grade, partner, vote));
        }
    }

    votes.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap().then(a.1.cmp(&b.1)));
    votes.first().map(|&(_, _, dir)| dir).unwrap_or(0)
}

/// Head attached to the stem on the given side at the given pitch.
fn lookup_head(sig: &Sig, stem: InterId, side: HorizontalSide, pitch: i32) -> Option<InterId> {
    for rel_id in sig.supports_of(stem, Some(SupportTag::HeadStem)) {
        let Some((head, _, support)) = support_parts(sig, rel_id) else {
            continue;
        };
        let SupportKind::HeadStem { head_side, .. } = support.kind else {
            continue;
        };
        if head_side == side && sig.get(head).and_then(|i| i.pitch()) == Some(pitch) {
            return Some(head);
        }
    }
    None
}

fn head_stem_count(sig: &Sig, head: InterId) -> usize {
    sig.supports_of(head, Some(SupportTag::HeadStem)).len()
}

// -------------------------------------------------------------------
// Frozen candidates
// -------------------------------------------------------------------

/// Delete every candidate excluded against a frozen one. Two conflicting
/// frozen candidates are an error, logged and left alone.
pub fn delete_conflicting_with_frozen(sig: &mut Sig) -> Vec<InterId> {
    let frozen: Vec<InterId> = sig.inters_matching(|i| i.frozen);
    let mut to_delete = Vec::new();

    for id in frozen {
        for rel_id in sig.exclusions_of(id) {
            let Some(rel) = sig.relation(rel_id) else {
                continue;
            };
            let other = rel.opposite(id);
            if sig.is_frozen(other) {
                tracing::error!(a = id.0, b = other.0, "conflicting frozen candidates");
            } else if !to_delete.contains(&other) {
                to_delete.push(other);
            }
        }
    }

    sig.remove_inters(&to_delete);
    to_delete
}

// -------------------------------------------------------------------
// Prologue analyses
// -------------------------------------------------------------------

/// A head can use at most one stem per side; competing stems on the same
/// side of one head are mutually excluded as too close.
pub fn analyze_head_stems(sig: &mut Sig) -> usize {
    let heads: Vec<InterId> = sig.inters_matching(|i| i.shape.is_stem_head());
    let mut modifs = 0;

    for head in heads {
        let mut sides: AHashMap<HorizontalSide, Vec<InterId>> = AHashMap::new();

        for rel_id in sig.supports_of(head, Some(SupportTag::HeadStem)) {
            let Some((_, stem, support)) = support_parts(sig, rel_id) else {
                continue;
            };
            if let SupportKind::HeadStem { head_side, .. } = support.kind {
                sides.entry(head_side).or_default().push(stem);
            }
        }

        for stems in sides.values() {
            if stems.len() > 1 {
                modifs += sig.insert_exclusions(stems, ExclusionCause::TooClose).len();
            }
        }
    }

    modifs
}

/// Size class of beams gathered around a stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum BeamSize {
    Standard,
    Small,
}

/// Consistency of heads and beams attached to each good stem:
/// heads of different shapes exclude one another, same-shape heads
/// support one another, beam sizes are mutually exclusive, and compatible
/// beam/head pairs get a derived support edge.
pub fn analyze_chords(sig: &mut Sig, config: &ReduceConfig) -> usize {
    let stems = sig.inters_of_shape(Shape::Stem);
    let mut modifs = 0;

    for stem in stems {
        let good = sig
            .get(stem)
            .map(|i| i.is_good(&config.thresholds))
            .unwrap_or(false);
        if !good {
            continue;
        }

        // Heads by shape, beams by size, in deterministic relation order
        let mut head_shapes: Vec<Shape> = Vec::new();
        let mut heads: AHashMap<Shape, Vec<InterId>> = AHashMap::new();
        let mut beam_sizes: Vec<BeamSize> = Vec::new();
        let mut beams: AHashMap<BeamSize, Vec<InterId>> = AHashMap::new();

        for rel_id in sig.supports_of(stem, None) {
            let Some((source, _, support)) = support_parts(sig, rel_id) else {
                continue;
            };
            match support.kind {
                SupportKind::HeadStem { .. } => {
                    if let Some(shape) = sig.shape_of(source) {
                        if !head_shapes.contains(&shape) {
                            head_shapes.push(shape);
                        }
                        heads.entry(shape).or_default().push(source);
                    }
                }
                SupportKind::BeamStem { .. } => {
                    let size = match sig.shape_of(source) {
                        Some(Shape::BeamSmall) => BeamSize::Small,
                        Some(s) if s.is_beam() => BeamSize::Standard,
                        _ => continue,
                    };
                    if !beam_sizes.contains(&size) {
                        beam_sizes.push(size);
                    }
                    beams.entry(size).or_default().push(source);
                }
                _ => {}
            }
        }

        // Heads of different shapes on one stem are incompatible, unless
        // the shared stem itself may be the culprit (head linked elsewhere)
        for (i, &s1) in head_shapes.iter().enumerate() {
            for &s2 in &head_shapes[i + 1..] {
                for &h1 in &heads[&s1] {
                    if head_stem_count(sig, h1) != 1 {
                        continue;
                    }
                    for &h2 in &heads[&s2] {
                        if head_stem_count(sig, h2) != 1 {
                            continue;
                        }
                        if sig.insert_exclusion(h1, h2, ExclusionCause::Incompatible).is_some() {
                            modifs += 1;
                        }
                    }
                }
            }
        }

        // Same-shape heads on one stem back each other up
        for shape in &head_shapes {
            let list = &heads[shape];
            for (i, &h1) in list.iter().enumerate() {
                for &h2 in &list[i + 1..] {
                    sig.insert_support(h1, h2, Support::new(SupportKind::HeadHead, 0.5));
                }
            }
        }

        // Standard and small beams cannot share a stem
        if beams.contains_key(&BeamSize::Standard) && beams.contains_key(&BeamSize::Small) {
            for &b1 in &beams[&BeamSize::Standard] {
                for &b2 in &beams[&BeamSize::Small] {
                    if sig.insert_exclusion(b1, b2, ExclusionCause::Incompatible).is_some() {
                        modifs += 1;
                    }
                }
            }
        }

        // Beam/head size consistency
        for &size in &beam_sizes {
            let beam_set = beams[&size].clone();
            let (excluded_heads, supported_head) = match size {
                BeamSize::Small => (
                    vec![Shape::NoteheadBlack, Shape::NoteheadVoid],
                    Shape::NoteheadBlackSmall,
                ),
                BeamSize::Standard => (vec![Shape::NoteheadBlackSmall], Shape::NoteheadBlack),
            };

            for shape in excluded_heads {
                if let Some(head_set) = heads.get(&shape) {
                    for &beam in &beam_set {
                        for &head in head_set {
                            if sig
                                .insert_exclusion(beam, head, ExclusionCause::Incompatible)
                                .is_some()
                            {
                                modifs += 1;
                            }
                        }
                    }
                }
            }

            if let Some(head_set) = heads.get(&supported_head) {
                for &beam in &beam_set {
                    let Some(bs_rel) = sig.support_between(beam, stem, Some(SupportTag::BeamStem))
                    else {
                        continue;
                    };
                    let Some((_, _, bs)) = support_parts(sig, bs_rel) else {
                        continue;
                    };

                    for &head in head_set {
                        if sig.support_between(beam, head, Some(SupportTag::BeamHead)).is_some() {
                            continue;
                        }
                        let Some(hs_rel) =
                            sig.support_between(head, stem, Some(SupportTag::HeadStem))
                        else {
                            continue;
                        };
                        let Some((_, _, hs)) = support_parts(sig, hs_rel) else {
                            continue;
                        };

                        // Derived support, averaging the two stem edges
                        let grade = (bs.grade() + hs.grade()) / 2.0;
                        sig.insert_support(beam, head, Support::new(SupportKind::BeamHead, grade));
                    }
                }
            }
        }
    }

    modifs
}

// -------------------------------------------------------------------
// Stems and heads
// -------------------------------------------------------------------

/// Cut links between each stem and heads anchored on the wrong side of a
/// stem end: a bottom anchor belongs on the right side, a top anchor on
/// the left.
pub fn check_stem_ending_heads(sig: &mut Sig, config: &ReduceConfig) -> usize {
    let stems = sig.inters_of_shape(Shape::Stem);
    let mut modifs = 0;

    for stem in stems {
        loop {
            let mut cut = None;

            for rel_id in sig.supports_of(stem, Some(SupportTag::HeadStem)) {
                let Some((_, _, support)) = support_parts(sig, rel_id) else {
                    continue;
                };
                let SupportKind::HeadStem { head_side, .. } = support.kind else {
                    continue;
                };
                let Some(portion) = head_portion(sig, rel_id, config) else {
                    continue;
                };

                let wrong = (portion == StemPortion::Bottom && head_side != HorizontalSide::Right)
                    || (portion == StemPortion::Top && head_side != HorizontalSide::Left);
                if wrong {
                    cut = Some(rel_id);
                    break;
                }
            }

            match cut {
                Some(rel_id) => {
                    sig.remove_relation(rel_id);
                    modifs += 1;
                }
                None => break,
            }
        }
    }

    modifs
}

/// A head on the geometrically wrong side of its stem, with no compatible
/// head within two pitch steps across, loses the link and gains an
/// incompatibility instead.
fn check_head_side(sig: &mut Sig, head: InterId, config: &ReduceConfig) -> usize {
    let mut modifs = 0;

    'rels: for rel_id in sig.supports_of(head, Some(SupportTag::HeadStem)) {
        let Some((_, stem, support)) = support_parts(sig, rel_id) else {
            continue;
        };
        let SupportKind::HeadStem { head_side, .. } = support.kind else {
            continue;
        };

        let dir = stem_direction(sig, stem, config);
        if dir == 0 {
            // Undecidable geometry: skip rather than fail
            continue;
        }

        let normal = (head_side == HorizontalSide::Left && dir > 0)
            || (head_side == HorizontalSide::Right && dir < 0);
        if normal {
            continue;
        }

        let Some(pitch) = sig.get(head).and_then(|i| i.pitch()) else {
            continue;
        };
        let range = config.checks.pitch_step_range;
        for target_pitch in (pitch - range)..=(pitch + range) {
            if lookup_head(sig, stem, head_side.opposite(), target_pitch).is_some() {
                continue 'rels;
            }
        }

        info!(head = head.0, stem = stem.0, "head on wrong stem side, cutting link");
        sig.remove_relation(rel_id);
        sig.insert_exclusion(head, stem, ExclusionCause::Incompatible);
        modifs += 1;
    }

    modifs
}

/// Note heads need a stem; heads that kept one are checked for side
/// consistency.
pub fn check_heads(sig: &mut Sig, config: &ReduceConfig) -> usize {
    let heads: Vec<InterId> = sig.inters_matching(|i| i.shape.is_stem_head());
    let mut modifs = 0;

    for head in heads {
        if !sig.has_support(head, SupportTag::HeadStem) {
            if remove_unless_frozen(sig, head) {
                debug!(head = head.0, "deleting stemless head");
                modifs += 1;
            }
            continue;
        }

        modifs += check_head_side(sig, head, config);
    }

    modifs
}

fn stem_has_head_at_end(sig: &Sig, stem: InterId, config: &ReduceConfig) -> bool {
    sig.supports_of(stem, Some(SupportTag::HeadStem))
        .into_iter()
        .any(|rel_id| head_portion(sig, rel_id, config) != Some(StemPortion::Middle))
}

/// Cut relations to heads sitting on the tail end of the stem.
/// Returns true when nothing had to be cut.
fn stem_has_single_head_end(sig: &mut Sig, stem: InterId, config: &ReduceConfig) -> bool {
    let dir = stem_direction(sig, stem, config);
    if dir == 0 {
        return true; // We cannot decide
    }

    let forbidden = if dir > 0 {
        StemPortion::Bottom
    } else {
        StemPortion::Top
    };

    let to_remove: Vec<RelId> = sig
        .supports_of(stem, Some(SupportTag::HeadStem))
        .into_iter()
        .filter(|&rel_id| head_portion(sig, rel_id, config) == Some(forbidden))
        .collect();

    if !to_remove.is_empty() {
        debug!(stem = stem.0, count = to_remove.len(), "cutting tail-end head relations");
        sig.remove_relations(&to_remove);
    }

    to_remove.is_empty()
}

/// A stem needs a head at a true end, and heads at one end only.
pub fn check_stems(sig: &mut Sig, config: &ReduceConfig) -> usize {
    let stems = sig.inters_of_shape(Shape::Stem);
    let mut modifs = 0;

    for stem in stems {
        if !stem_has_head_at_end(sig, stem, config) {
            if remove_unless_frozen(sig, stem) {
                debug!(stem = stem.0, "deleting stem lacking an end head");
                modifs += 1;
            }
            continue;
        }

        if !stem_has_single_head_end(sig, stem, config) {
            modifs += 1;
        }
    }

    modifs
}

/// A stem must extend meaningfully beyond its farthest head.
pub fn check_stem_lengths(sig: &mut Sig, config: &ReduceConfig, scale: &Scale) -> usize {
    let min_extension = scale.to_pixels(config.checks.min_stem_extension);
    let stems = sig.inters_of_shape(Shape::Stem);
    let mut modifs = 0;

    for stem in stems {
        let Some(stem_box) = sig.bounds_of(stem) else {
            continue;
        };

        let mut heads_box: Option<Rect> = None;
        for rel_id in sig.supports_of(stem, Some(SupportTag::HeadStem)) {
            let Some((head, _, _)) = support_parts(sig, rel_id) else {
                continue;
            };
            if let Some(head_box) = sig.bounds_of(head) {
                heads_box = Some(match heads_box {
                    Some(acc) => acc.union(&head_box),
                    None => head_box,
                });
            }
        }

        let delete = match heads_box {
            None => true,
            Some(hb) => {
                let above = hb.y - stem_box.y;
                let below = stem_box.max_y() - hb.max_y();
                above.max(below) < min_extension
            }
        };

        if delete && remove_unless_frozen(sig, stem) {
            debug!(stem = stem.0, "deleting under-extended stem");
            modifs += 1;
        }
    }

    modifs
}

// -------------------------------------------------------------------
// Beams
// -------------------------------------------------------------------

fn beam_has_both_stems(sig: &Sig, beam: InterId) -> bool {
    let mut has_left = false;
    let mut has_right = false;

    for rel_id in sig.supports_of(beam, Some(SupportTag::BeamStem)) {
        let Some((_, _, support)) = support_parts(sig, rel_id) else {
            continue;
        };
        if let SupportKind::BeamStem { portion } = support.kind {
            match portion {
                BeamPortion::Left => has_left = true,
                BeamPortion::Right => has_right = true,
                BeamPortion::Center => {}
            }
        }
    }

    has_left && has_right
}

/// A full beam must be held by a stem at each end.
pub fn check_beams(sig: &mut Sig) -> usize {
    let beams: Vec<InterId> = sig.inters_matching(|i| i.shape.is_full_beam());
    let mut modifs = 0;

    for beam in beams {
        if !beam_has_both_stems(sig, beam) && remove_unless_frozen(sig, beam) {
            debug!(beam = beam.0, "deleting beam lacking a stem end");
            modifs += 1;
        }
    }

    modifs
}

/// A beam hook needs some stem, any stem.
pub fn check_hooks(sig: &mut Sig) -> usize {
    let hooks = sig.inters_of_shape(Shape::BeamHook);
    let mut modifs = 0;

    for hook in hooks {
        if !sig.has_support(hook, SupportTag::BeamStem) && remove_unless_frozen(sig, hook) {
            debug!(hook = hook.0, "deleting stemless beam hook");
            modifs += 1;
        }
    }

    modifs
}

// -------------------------------------------------------------------
// Ledgers
// -------------------------------------------------------------------

/// Staff pitch position of the ledger line at the given index
/// (+1 = first ledger below a 5-line staff, -1 = first above).
fn ledger_pitch(index: i32) -> i32 {
    index.signum() * (4 + 2 * index.abs())
}

fn ledger_has_head_or_ledger(
    sig: &Sig,
    ledger: InterId,
    heads_sorted: &[InterId],
    config: &ReduceConfig,
    scale: &Scale,
) -> bool {
    let Some(bounds) = sig.bounds_of(ledger) else {
        return false;
    };
    let Some(index) = sig.get(ledger).and_then(|i| i.ledger_index()) else {
        return false;
    };
    let staff = sig.staff_of(ledger);

    // A neighbor ledger on the next line, sharing some abscissa range
    let next_index = index + index.signum();
    let neighbors = sig.inters_matching(|i| {
        i.shape == Shape::Ledger && i.ledger_index() == Some(next_index) && i.staff == staff
    });
    if neighbors.iter().any(|&n| {
        sig.bounds_of(n)
            .map(|nb| bounds.x_overlap(&nb) > 0.0)
            .unwrap_or(false)
    }) {
        return true;
    }

    // Or a head centered on the ledger line, or one step further out
    let pitch = ledger_pitch(index);
    let next_pitch = pitch + index.signum();
    let tall_box = bounds.grown(0.0, scale.to_pixels(config.checks.ledger_search_margin));

    for &head in sig.intersected_in_sorted(heads_sorted, &tall_box).iter() {
        if sig.staff_of(head) != staff {
            continue;
        }
        if let Some(head_pitch) = sig.get(head).and_then(|i| i.pitch()) {
            if head_pitch == pitch || head_pitch == next_pitch {
                return true;
            }
        }
    }

    false
}

/// An orphan ledger supports nothing; deleting one can orphan the next
/// line out, so this iterates to a fixpoint.
pub fn check_ledgers(sig: &mut Sig, config: &ReduceConfig, scale: &Scale) -> usize {
    let head_ids: Vec<InterId> = sig.inters_matching(|i| i.shape.is_head());
    let heads_sorted = sig.sorted_by_abscissa(&head_ids);
    let mut modifs = 0;

    loop {
        let mut modified = false;

        for ledger in sig.inters_of_shape(Shape::Ledger) {
            if !ledger_has_head_or_ledger(sig, ledger, &heads_sorted, config, scale)
                && remove_unless_frozen(sig, ledger)
            {
                debug!(ledger = ledger.0, "deleting orphan ledger");
                modifs += 1;
                modified = true;
            }
        }

        if !modified {
            break;
        }
    }

    modifs
}

// -------------------------------------------------------------------
// Augmentation dots
// -------------------------------------------------------------------

/// An augmentation dot needs a target: a note, a rest, or a previous dot
/// on its left.
pub fn check_augmentation_dots(sig: &mut Sig) -> usize {
    let dots = sig.inters_of_shape(Shape::AugmentationDot);
    let mut modifs = 0;

    'dots: for dot in dots {
        if sig.has_support(dot, SupportTag::Augmentation) {
            continue;
        }

        let Some(center_x) = sig.bounds_of(dot).map(|b| b.center().x) else {
            continue;
        };
        for rel_id in sig.supports_of(dot, Some(SupportTag::DoubleDot)) {
            let Some(rel) = sig.relation(rel_id) else {
                continue;
            };
            let other = rel.opposite(dot);
            if sig.bounds_of(other).map(|b| b.center().x < center_x).unwrap_or(false) {
                continue 'dots; // Second dot of a double dot
            }
        }

        if remove_unless_frozen(sig, dot) {
            debug!(dot = dot.0, "deleting augmentation dot lacking a target");
            modifs += 1;
        }
    }

    modifs
}

/// An augmentable entity takes at most one augmentation dot: keep the
/// best-graded edge, drop the rest.
pub fn check_augmented(sig: &mut Sig) -> usize {
    let entities: Vec<InterId> = sig.inters_matching(|i| i.shape.is_note_or_rest());
    let mut modifs = 0;

    for entity in entities {
        let rels = sig.supports_of(entity, Some(SupportTag::Augmentation));
        if rels.len() <= 1 {
            continue;
        }

        let best = rels
            .iter()
            .copied()
            .max_by(|&a, &b| {
                let ga = support_parts(sig, a).map(|(_, _, s)| s.grade()).unwrap_or(0.0);
                let gb = support_parts(sig, b).map(|(_, _, s)| s.grade()).unwrap_or(0.0);
                ga.partial_cmp(&gb).unwrap().then(b.cmp(&a))
            })
            .unwrap();

        for rel_id in rels {
            if rel_id != best {
                sig.remove_relation(rel_id);
                modifs += 1;
            }
        }
    }

    modifs
}

// -------------------------------------------------------------------
// Accidentals, repeat dots, time signatures
// -------------------------------------------------------------------

/// Double sharps and double flats need a connected head.
pub fn check_double_alters(sig: &mut Sig) -> usize {
    let doubles: Vec<InterId> = sig.inters_matching(|i| i.shape.is_double_alter());
    let mut modifs = 0;

    for alter in doubles {
        if !sig.has_support(alter, SupportTag::AlterHead) && remove_unless_frozen(sig, alter) {
            debug!(alter = alter.0, "deleting double alteration lacking a head");
            modifs += 1;
        }
    }

    modifs
}

/// Simple accidentals floating free of any head are dropped too.
pub fn check_isolated_alters(sig: &mut Sig) -> usize {
    let alters: Vec<InterId> = sig
        .inters_matching(|i| i.shape.is_accidental() && !i.shape.is_double_alter());
    let mut modifs = 0;

    for alter in alters {
        if !sig.has_support(alter, SupportTag::AlterHead) && remove_unless_frozen(sig, alter) {
            debug!(alter = alter.0, "deleting isolated accidental");
            modifs += 1;
        }
    }

    modifs
}

/// Repeat dots come in vertical pairs.
pub fn check_repeat_dots(sig: &mut Sig) -> usize {
    let dots = sig.inters_of_shape(Shape::RepeatDot);
    let mut modifs = 0;

    for dot in dots {
        if !sig.has_support(dot, SupportTag::RepeatDotPair) && remove_unless_frozen(sig, dot) {
            debug!(dot = dot.0, "deleting repeat dot lacking its sibling");
            modifs += 1;
        }
    }

    modifs
}

/// A time-signature number needs its vertical sibling.
pub fn check_time_numbers(sig: &mut Sig) -> usize {
    let numbers = sig.inters_of_shape(Shape::TimeNumber);
    let mut modifs = 0;

    for number in numbers {
        if !sig.has_support(number, SupportTag::TimeTopBottom) && remove_unless_frozen(sig, number)
        {
            debug!(number = number.0, "deleting time number lacking its sibling");
            modifs += 1;
        }
    }

    modifs
}

/// No note may precede a time signature inside its measure: such a note
/// and the signature are mutually incompatible (neither is deleted here).
pub fn check_time_signatures(sig: &mut Sig) -> usize {
    let notes: Vec<InterId> = sig.inters_matching(|i| i.shape.is_note_or_rest());
    if notes.is_empty() {
        return 0;
    }
    let times: Vec<InterId> = sig.inters_matching(|i| i.shape.is_time());
    let mut modifs = 0;

    let staves: Vec<Option<StaffId>> = {
        let mut seen = Vec::new();
        for &t in &times {
            let staff = sig.staff_of(t);
            if !seen.contains(&staff) {
                seen.push(staff);
            }
        }
        seen
    };

    for staff in staves {
        let staff_times: Vec<InterId> = times
            .iter()
            .copied()
            .filter(|&t| sig.staff_of(t) == staff)
            .collect();
        let staff_notes: Vec<InterId> = notes
            .iter()
            .copied()
            .filter(|&n| sig.staff_of(n) == staff)
            .collect();
        let bars: Vec<InterId> =
            sig.inters_matching(|i| i.shape.is_core_barline() && i.staff == staff);

        for time in staff_times {
            let Some(time_x) = sig.bounds_of(time).map(|b| b.center().x) else {
                continue;
            };

            // Measure start: center of the last barline left of the signature
            let x_min = bars
                .iter()
                .filter_map(|&b| sig.bounds_of(b).map(|r| r.center().x))
                .filter(|&x| x < time_x)
                .fold(0.0, f64::max);

            for &note in &staff_notes {
                let Some(note_x) = sig.bounds_of(note).map(|b| b.center().x) else {
                    continue;
                };
                if note_x >= x_min && note_x < time_x {
                    info!(note = note.0, time = time.0, "note preceding time signature");
                    if sig.insert_exclusion(note, time, ExclusionCause::Incompatible).is_some() {
                        modifs += 1;
                    }
                }
            }
        }
    }

    modifs
}

// -------------------------------------------------------------------
// Slurs
// -------------------------------------------------------------------

/// A small slur wrapped around a tuplet sign is a misreading of the
/// tuplet bracket; drop the slur.
pub fn check_slur_on_tuplet(sig: &mut Sig, config: &ReduceConfig, scale: &Scale) -> Vec<InterId> {
    let max_width = scale.to_pixels(config.checks.max_tuplet_slur_width);
    let slurs: Vec<InterId> =
        sig.inters_matching(|i| i.shape == Shape::Slur && i.bounds.width <= max_width);
    let tuplets: Vec<InterId> = sig.inters_matching(|i| {
        i.shape.is_tuplet() && i.is_contextually_good(&config.thresholds)
    });
    let mut deleted = Vec::new();

    'slurs: for slur in slurs {
        let Some(bounds) = sig.bounds_of(slur) else {
            continue;
        };

        // Probe just above and just below the arc for an embraced sign
        for dy in [-bounds.height, bounds.height] {
            let probe = Rect::new(bounds.x, bounds.y + dy, bounds.width, bounds.height);
            for &tuplet in &tuplets {
                let hit = sig.bounds_of(tuplet).map(|tb| probe.intersects(&tb)).unwrap_or(false);
                if hit && remove_unless_frozen(sig, slur) {
                    debug!(slur = slur.0, tuplet = tuplet.0, "deleting tuplet slur");
                    deleted.push(slur);
                    continue 'slurs;
                }
            }
        }
    }

    deleted
}

#[cfg(test)]
mod tests {
    use super::*;
    use syrinx_common::geom::{Line, Point};
    use syrinx_graph::{IdAllocator, Inter, Payload, RelationData, SystemId};

    fn setup() -> (Sig, IdAllocator, ReduceConfig, Scale) {
        (
            Sig::new(SystemId(1)),
            IdAllocator::new(),
            ReduceConfig::default(),
            Scale::new(20),
        )
    }

    fn stem_at(x: f64, y: f64, length: f64) -> Inter {
        Inter::new(Shape::Stem, 0.7, Rect::new(x, y, 3.0, length)).with_payload(Payload::Stem {
            median: Line::new(Point::new(x + 1.5, y), Point::new(x + 1.5, y + length)),
        })
    }

    fn head_at(x: f64, y: f64, pitch: i32) -> Inter {
        Inter::new(Shape::NoteheadBlack, 0.7, Rect::new(x, y, 12.0, 10.0))
            .with_payload(Payload::Head { pitch })
    }

    fn link_head_stem(
        sig: &mut Sig,
        head: InterId,
        stem: InterId,
        side: HorizontalSide,
        extension_y: f64,
    ) -> RelId {
        sig.add_relation(
            head,
            stem,
            RelationData::Support(Support::new(
                SupportKind::HeadStem {
                    head_side: side,
                    extension_y,
                },
                0.5,
            )),
        )
        .unwrap()
    }

    #[test]
    fn test_stem_portion_classification() {
        let head_box = Rect::new(0.0, 0.0, 12.0, 10.0);
        let line = Line::new(Point::new(0.0, 0.0), Point::new(0.0, 40.0));

        assert_eq!(stem_portion(&head_box, &line, 1.0, 0.275), StemPortion::Top);
        assert_eq!(stem_portion(&head_box, &line, 20.0, 0.275), StemPortion::Middle);
        assert_eq!(stem_portion(&head_box, &line, 39.0, 0.275), StemPortion::Bottom);
    }

    #[test]
    fn test_stemless_head_is_deleted() {
        let (mut sig, mut alloc, config, _) = setup();
        let head = sig.add_inter(head_at(0.0, 30.0, 2), &mut alloc);

        let modifs = check_heads(&mut sig, &config);

        assert_eq!(modifs, 1);
        assert!(!sig.contains(head));
    }

    #[test]
    fn test_attached_head_survives() {
        let (mut sig, mut alloc, config, _) = setup();
        let head = sig.add_inter(head_at(0.0, 30.0, 2), &mut alloc);
        let stem = sig.add_inter(stem_at(12.0, 0.0, 40.0), &mut alloc);
        link_head_stem(&mut sig, head, stem, HorizontalSide::Left, 39.0);

        check_heads(&mut sig, &config);

        assert!(sig.contains(head));
    }

    #[test]
    fn test_stem_direction_from_bottom_head() {
        let (mut sig, mut alloc, config, _) = setup();
        let head = sig.add_inter(head_at(0.0, 30.0, 2), &mut alloc);
        let stem = sig.add_inter(stem_at(12.0, 0.0, 40.0), &mut alloc);
        link_head_stem(&mut sig, head, stem, HorizontalSide::Right, 39.0);

        // Head anchored at the bottom end: stem points up
        assert_eq!(stem_direction(&sig, stem, &config), -1);
    }

    #[test]
    fn test_stem_direction_unknown_without_votes() {
        let (mut sig, mut alloc, config, _) = setup();
        let stem = sig.add_inter(stem_at(12.0, 0.0, 40.0), &mut alloc);
        assert_eq!(stem_direction(&sig, stem, &config), 0);
    }

    #[test]
    fn test_wrong_side_head_gets_exclusion_not_deletion() {
        let (mut sig, mut alloc, config, _) = setup();
        // Deciding head: bottom anchor, right side (canonical, stem up)
        let anchor = sig.add_inter(head_at(13.0, 30.0, 4), &mut alloc);
        let stem = sig.add_inter(stem_at(12.0, 0.0, 40.0), &mut alloc);
        link_head_stem(&mut sig, anchor, stem, HorizontalSide::Right, 39.0);
        // Offender: also bottom anchor but left side, no mate across
        let offender = sig.add_inter(head_at(0.0, 28.0, 2), &mut alloc);
        let rel = link_head_stem(&mut sig, offender, stem, HorizontalSide::Left, 38.0);

        // Cut by the ending-heads rule (bottom anchor must sit right)
        let modifs = check_stem_ending_heads(&mut sig, &config);
        assert_eq!(modifs, 1);
        assert!(sig.relation(rel).is_none());
        assert!(sig.contains(offender));

        // The wrong-side rule reaches the same verdict when the anchor
        // is at mid-stem: link survives but becomes an exclusion
        let offender2 = sig.add_inter(head_at(0.0, 15.0, 0), &mut alloc);
        link_head_stem(&mut sig, offender2, stem, HorizontalSide::Left, 20.0);
        let modifs = check_heads(&mut sig, &config);
        assert!(modifs >= 1);
        assert!(sig.contains(offender2));
        assert!(sig.exclusion_between(offender2, stem).is_some());
    }

    #[test]
    fn test_stem_without_end_head_is_deleted() {
        let (mut sig, mut alloc, config, _) = setup();
        let head = sig.add_inter(head_at(0.0, 15.0, 0), &mut alloc);
        let stem = sig.add_inter(stem_at(12.0, 0.0, 40.0), &mut alloc);
        // Head anchored mid-stem only
        link_head_stem(&mut sig, head, stem, HorizontalSide::Left, 20.0);

        let modifs = check_stems(&mut sig, &config);

        assert_eq!(modifs, 1);
        assert!(!sig.contains(stem));
    }

    #[test]
    fn test_double_ended_stem_loses_tail_heads() {
        let (mut sig, mut alloc, config, _) = setup();
        let stem = sig.add_inter(stem_at(12.0, 0.0, 40.0), &mut alloc);
        // Strong bottom head fixes direction to up
        let bottom = sig.add_inter(head_at(13.0, 30.0, 4), &mut alloc);
        link_head_stem(&mut sig, bottom, stem, HorizontalSide::Right, 39.0);
        // Weak head on the tail (top) end
        let top = sig.add_inter(
            Inter::new(Shape::NoteheadBlack, 0.3, Rect::new(0.0, 0.0, 12.0, 10.0))
                .with_payload(Payload::Head { pitch: -4 }),
            &mut alloc,
        );
        let tail_rel = link_head_stem(&mut sig, top, stem, HorizontalSide::Left, 1.0);

        check_stems(&mut sig, &config);

        assert!(sig.contains(stem));
        assert!(sig.relation(tail_rel).is_none());
        assert!(sig.support_between(bottom, stem, Some(SupportTag::HeadStem)).is_some());
    }

    #[test]
    fn test_beam_needs_both_portions() {
        let (mut sig, mut alloc, _, _) = setup();
        let beam = sig.add_inter(
            Inter::new(Shape::Beam, 0.7, Rect::new(0.0, 0.0, 60.0, 6.0)),
            &mut alloc,
        );
        let stem = sig.add_inter(stem_at(0.0, 0.0, 40.0), &mut alloc);
        sig.add_relation(
            beam,
            stem,
            RelationData::Support(Support::new(
                SupportKind::BeamStem { portion: BeamPortion::Left },
                0.5,
            )),
        )
        .unwrap();

        let modifs = check_beams(&mut sig);

        assert_eq!(modifs, 1);
        assert!(!sig.contains(beam));
    }

    #[test]
    fn test_hook_needs_any_stem() {
        let (mut sig, mut alloc, _, _) = setup();
        let orphan = sig.add_inter(
            Inter::new(Shape::BeamHook, 0.7, Rect::new(0.0, 0.0, 20.0, 6.0)),
            &mut alloc,
        );
        let held = sig.add_inter(
            Inter::new(Shape::BeamHook, 0.7, Rect::new(40.0, 0.0, 20.0, 6.0)),
            &mut alloc,
        );
        let stem = sig.add_inter(stem_at(40.0, 0.0, 40.0), &mut alloc);
        sig.add_relation(
            held,
            stem,
            RelationData::Support(Support::new(
                SupportKind::BeamStem { portion: BeamPortion::Left },
                0.5,
            )),
        )
        .unwrap();

        check_hooks(&mut sig);

        assert!(!sig.contains(orphan));
        assert!(sig.contains(held));
    }

    #[test]
    fn test_ledger_pitch_positions() {
        assert_eq!(ledger_pitch(1), 6);
        assert_eq!(ledger_pitch(2), 8);
        assert_eq!(ledger_pitch(-1), -6);
    }

    #[test]
    fn test_orphan_ledger_cascade() {
        let (mut sig, mut alloc, config, scale) = setup();
        let staff = StaffId(1);
        // Ledger 1 backed by the farther ledger 2, which carries a head;
        // ledger 3 far away, backed by nothing
        let l1 = sig.add_inter(
            Inter::new(Shape::Ledger, 0.7, Rect::new(0.0, 100.0, 16.0, 2.0))
                .with_payload(Payload::Ledger { index: 1 })
                .with_staff(staff),
            &mut alloc,
        );
        let l2 = sig.add_inter(
            Inter::new(Shape::Ledger, 0.7, Rect::new(2.0, 120.0, 16.0, 2.0))
                .with_payload(Payload::Ledger { index: 2 })
                .with_staff(staff),
            &mut alloc,
        );
        let l3 = sig.add_inter(
            Inter::new(Shape::Ledger, 0.7, Rect::new(300.0, 120.0, 16.0, 2.0))
                .with_payload(Payload::Ledger { index: 2 })
                .with_staff(staff),
            &mut alloc,
        );
        let head = sig.add_inter(
            Inter::new(Shape::NoteheadBlack, 0.7, Rect::new(2.0, 116.0, 12.0, 10.0))
                .with_payload(Payload::Head { pitch: 8 })
                .with_staff(staff),
            &mut alloc,
        );

        check_ledgers(&mut sig, &config, &scale);

        assert!(sig.contains(l2), "ledger with its head must stay");
        assert!(sig.contains(l1), "ledger with a farther neighbor must stay");
        assert!(!sig.contains(l3), "isolated outer ledger must go");
        assert!(sig.contains(head));
    }

    #[test]
    fn test_orphan_ledger_cascade_after_head_removal() {
        let (mut sig, mut alloc, config, scale) = setup();
        let staff = StaffId(1);
        let l1 = sig.add_inter(
            Inter::new(Shape::Ledger, 0.7, Rect::new(0.0, 100.0, 16.0, 2.0))
                .with_payload(Payload::Ledger { index: 1 })
                .with_staff(staff),
            &mut alloc,
        );
        let l2 = sig.add_inter(
            Inter::new(Shape::Ledger, 0.7, Rect::new(2.0, 120.0, 16.0, 2.0))
                .with_payload(Payload::Ledger { index: 2 })
                .with_staff(staff),
            &mut alloc,
        );

        // No head anywhere: both ledgers fall, the outer one because the
        // inner one fell first
        check_ledgers(&mut sig, &config, &scale);

        assert!(!sig.contains(l1));
        assert!(!sig.contains(l2));
    }

    #[test]
    fn test_augmentation_dot_needs_target() {
        let (mut sig, mut alloc, _, _) = setup();
        let lone = sig.add_inter(
            Inter::new(Shape::AugmentationDot, 0.7, Rect::new(0.0, 0.0, 4.0, 4.0)),
            &mut alloc,
        );
        let rest = sig.add_inter(
            Inter::new(Shape::RestQuarter, 0.7, Rect::new(20.0, 0.0, 8.0, 16.0)),
            &mut alloc,
        );
        let fed = sig.add_inter(
            Inter::new(Shape::AugmentationDot, 0.7, Rect::new(30.0, 0.0, 4.0, 4.0)),
            &mut alloc,
        );
        sig.add_relation(
            fed,
            rest,
            RelationData::Support(Support::new(SupportKind::Augmentation, 0.5)),
        )
        .unwrap();

        let modifs = check_augmentation_dots(&mut sig);

        assert_eq!(modifs, 1);
        assert!(!sig.contains(lone));
        assert!(sig.contains(fed));
    }

    #[test]
    fn test_second_dot_of_double_dot_survives() {
        let (mut sig, mut alloc, _, _) = setup();
        let rest = sig.add_inter(
            Inter::new(Shape::RestQuarter, 0.7, Rect::new(0.0, 0.0, 8.0, 16.0)),
            &mut alloc,
        );
        let first = sig.add_inter(
            Inter::new(Shape::AugmentationDot, 0.7, Rect::new(12.0, 0.0, 4.0, 4.0)),
            &mut alloc,
        );
        let second = sig.add_inter(
            Inter::new(Shape::AugmentationDot, 0.7, Rect::new(20.0, 0.0, 4.0, 4.0)),
            &mut alloc,
        );
        sig.add_relation(
            first,
            rest,
            RelationData::Support(Support::new(SupportKind::Augmentation, 0.5)),
        )
        .unwrap();
        sig.add_relation(
            second,
            first,
            RelationData::Support(Support::new(SupportKind::DoubleDot, 0.5)),
        )
        .unwrap();

        let modifs = check_augmentation_dots(&mut sig);

        assert_eq!(modifs, 0);
        assert!(sig.contains(second));
    }

    #[test]
    fn test_augmented_keeps_single_best_edge() {
        let (mut sig, mut alloc, _, _) = setup();
        let rest = sig.add_inter(
            Inter::new(Shape::RestQuarter, 0.7, Rect::new(0.0, 0.0, 8.0, 16.0)),
            &mut alloc,
        );
        let d1 = sig.add_inter(
            Inter::new(Shape::AugmentationDot, 0.7, Rect::new(12.0, 0.0, 4.0, 4.0)),
            &mut alloc,
        );
        let d2 = sig.add_inter(
            Inter::new(Shape::AugmentationDot, 0.7, Rect::new(12.0, 8.0, 4.0, 4.0)),
            &mut alloc,
        );
        sig.add_relation(
            d1,
            rest,
            RelationData::Support(Support::new(SupportKind::Augmentation, 0.3)),
        )
        .unwrap();
        let strong = sig
            .add_relation(
                d2,
                rest,
                RelationData::Support(Support::new(SupportKind::Augmentation, 0.8)),
            )
            .unwrap();

        let modifs = check_augmented(&mut sig);

        assert_eq!(modifs, 1);
        let remaining = sig.supports_of(rest, Some(SupportTag::Augmentation));
        assert_eq!(remaining, vec![strong]);
    }

    #[test]
    fn test_sibling_requirements() {
        let (mut sig, mut alloc, _, _) = setup();
        let alter = sig.add_inter(
            Inter::new(Shape::DoubleSharp, 0.7, Rect::new(0.0, 0.0, 8.0, 8.0)),
            &mut alloc,
        );
        let repeat = sig.add_inter(
            Inter::new(Shape::RepeatDot, 0.7, Rect::new(20.0, 0.0, 4.0, 4.0)),
            &mut alloc,
        );
        let number = sig.add_inter(
            Inter::new(Shape::TimeNumber, 0.7, Rect::new(40.0, 0.0, 8.0, 12.0))
                .with_payload(Payload::Time { value: 3 }),
            &mut alloc,
        );

        check_double_alters(&mut sig);
        check_repeat_dots(&mut sig);
        check_time_numbers(&mut sig);

        assert!(!sig.contains(alter));
        assert!(!sig.contains(repeat));
        assert!(!sig.contains(number));
    }

    #[test]
    fn test_time_signature_preceded_by_note_is_excluded_not_deleted() {
        let (mut sig, mut alloc, _, _) = setup();
        let staff = StaffId(1);
        let bar = sig.add_inter(
            Inter::new(Shape::ThinBarline, 0.8, Rect::new(0.0, 0.0, 2.0, 40.0))
                .with_staff(staff),
            &mut alloc,
        );
        let note = sig.add_inter(
            Inter::new(Shape::NoteheadBlack, 0.7, Rect::new(20.0, 10.0, 12.0, 10.0))
                .with_payload(Payload::Head { pitch: 0 })
                .with_staff(staff),
            &mut alloc,
        );
        let time = sig.add_inter(
            Inter::new(Shape::TimeCommon, 0.7, Rect::new(50.0, 5.0, 12.0, 20.0))
                .with_staff(staff),
            &mut alloc,
        );

        let modifs = check_time_signatures(&mut sig);

        assert_eq!(modifs, 1);
        assert!(sig.contains(note));
        assert!(sig.contains(time));
        assert!(sig.contains(bar));
        assert!(sig.exclusion_between(note, time).is_some());
    }

    #[test]
    fn test_chord_analysis_head_classes_exclude() {
        let (mut sig, mut alloc, config, _) = setup();
        let stem = sig.add_inter(stem_at(12.0, 0.0, 40.0), &mut alloc);
        let black = sig.add_inter(head_at(0.0, 30.0, 4), &mut alloc);
        let void = sig.add_inter(
            Inter::new(Shape::NoteheadVoid, 0.7, Rect::new(0.0, 10.0, 12.0, 10.0))
                .with_payload(Payload::Head { pitch: 0 }),
            &mut alloc,
        );
        link_head_stem(&mut sig, black, stem, HorizontalSide::Left, 39.0);
        link_head_stem(&mut sig, void, stem, HorizontalSide::Left, 15.0);

        analyze_chords(&mut sig, &config);

        assert!(sig.exclusion_between(black, void).is_some());
    }

    #[test]
    fn test_chord_analysis_beam_head_support_uses_average() {
        let (mut sig, mut alloc, config, _) = setup();
        let stem = sig.add_inter(stem_at(12.0, 0.0, 40.0), &mut alloc);
        let head = sig.add_inter(head_at(0.0, 30.0, 4), &mut alloc);
        let beam = sig.add_inter(
            Inter::new(Shape::Beam, 0.8, Rect::new(0.0, 0.0, 60.0, 6.0)).with_payload(
                Payload::Beam {
                    median: Line::new(Point::new(0.0, 3.0), Point::new(60.0, 3.0)),
                    height: 6.0,
                },
            ),
            &mut alloc,
        );
        let hs = link_head_stem(&mut sig, head, stem, HorizontalSide::Left, 39.0);
        sig.add_relation(
            beam,
            stem,
            RelationData::Support(Support::new(
                SupportKind::BeamStem { portion: BeamPortion::Left },
                0.8,
            )),
        )
        .unwrap();
        let hs_grade = support_parts(&sig, hs).unwrap().2.grade();

        analyze_chords(&mut sig, &config);

        let bh = sig.support_between(beam, head, Some(SupportTag::BeamHead)).unwrap();
        let grade = support_parts(&sig, bh).unwrap().2.grade();
        assert!((grade - (0.8 + hs_grade) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_frozen_candidate_resists_structural_deletion() {
        let (mut sig, mut alloc, config, _) = setup();
        let head = sig.add_inter(
            Inter::new(Shape::NoteheadBlack, 0.7, Rect::new(0.0, 0.0, 12.0, 10.0))
                .with_payload(Payload::Head { pitch: 0 })
                .frozen(),
            &mut alloc,
        );

        check_heads(&mut sig, &config);

        assert!(sig.contains(head));
    }

    #[test]
    fn test_frozen_sweep_removes_rivals() {
        let (mut sig, mut alloc, _, _) = setup();
        let pinned = sig.add_inter(
            Inter::new(Shape::NoteheadBlack, 0.4, Rect::new(0.0, 0.0, 12.0, 10.0)).frozen(),
            &mut alloc,
        );
        let rival = sig.add_inter(
            Inter::new(Shape::Sharp, 0.9, Rect::new(2.0, 2.0, 8.0, 8.0)),
            &mut alloc,
        );
        sig.insert_exclusion(pinned, rival, ExclusionCause::Overlap);

        let removed = delete_conflicting_with_frozen(&mut sig);

        assert_eq!(removed, vec![rival]);
        assert!(sig.contains(pinned));
    }
}
