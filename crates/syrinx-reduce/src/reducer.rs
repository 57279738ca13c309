//! The fixpoint reduction engine.
//!
//! One reducer works on one system's graph, in place. Each outer pass
//! purges weak candidates, iterates the structural checks to their own
//! fixpoint, then resolves exclusions; the run ends when a full pass
//! removes nothing. Every operation only removes vertices or edges, so
//! termination is bounded by the initial graph size.

use tracing::debug;

use syrinx_common::config::ReduceConfig;
use syrinx_common::scale::Scale;
use syrinx_graph::{Attic, InterId, Shape, Sig};

use crate::checks;
use crate::overlap;

/// Which rule set drives the run.
#[derive(Debug, Clone)]
pub enum Mode {
    /// Early pass over the founding material: heads, stems, beams,
    /// ledgers.
    Foundations,
    /// Late global pass: alterations, dots, time signatures, slurs.
    Links,
    /// Same rules as `Links`, but candidates of the given shapes are
    /// snapshot first so the caller can roll just them back afterwards.
    Symbols { shapes: Vec<Shape> },
}

/// Outcome of one reduction run.
#[derive(Debug, Default)]
pub struct Reduction {
    /// Everything removed by purge, slur cleanup, or exclusion
    /// resolution.
    pub removed: Vec<InterId>,
    /// Of the snapshot subset, the candidates lost to exclusion
    /// resolution (empty outside `Symbols` mode).
    pub selected_removed: Vec<InterId>,
    /// The pre-run snapshot (present in `Symbols` mode only).
    pub attic: Option<Attic>,
}

pub struct Reducer<'a> {
    sig: &'a mut Sig,
    config: &'a ReduceConfig,
    scale: Scale,
    purge_weaks: bool,
    mode: Mode,
}

impl<'a> Reducer<'a> {
    pub fn new(
        sig: &'a mut Sig,
        config: &'a ReduceConfig,
        scale: Scale,
        purge_weaks: bool,
        mode: Mode,
    ) -> Self {
        Self {
            sig,
            config,
            scale,
            purge_weaks,
            mode,
        }
    }

    /// Run the reduction to its fixpoint.
    pub fn reduce(mut self) -> Reduction {
        debug!(system = self.sig.system().0, "reducing graph");

        // General exclusions based on overlap
        overlap::detect_overlaps(self.sig, self.config);

        // Candidates conflicting with frozen ones must go first
        if !matches!(self.mode, Mode::Foundations) {
            checks::delete_conflicting_with_frozen(self.sig);
        }

        self.sig.contextualize(self.config);

        // Prologue analyses
        if matches!(self.mode, Mode::Foundations) {
            checks::analyze_head_stems(self.sig);
        }
        checks::analyze_chords(self.sig, self.config);

        // Snapshot the subset a Symbols caller may want to roll back
        let (selected, attic) = match &self.mode {
            Mode::Symbols { shapes } => {
                let shapes = shapes.clone();
                let sel = self.sig.inters_matching(|i| shapes.contains(&i.shape));
                let attic = Attic::save(self.sig, &sel);
                (sel, Some(attic))
            }
            _ => (Vec::new(), None),
        };

        let mut all_removed: Vec<InterId> = Vec::new();
        let mut removed_by_exclusion: Vec<InterId> = Vec::new();

        loop {
            // First, remove candidates with too low a contextual grade
            let mut deleted = self.update_and_purge();
            deleted.extend(self.check_slurs());
            all_removed.extend(deleted.iter().copied());

            // Structural checks, to their own fixpoint
            loop {
                let (modifs, purged) = self.check_consistencies();
                all_removed.extend(purged);
                if modifs == 0 {
                    break;
                }
                debug!(system = self.sig.system().0, modifs, "consistency pass");
            }

            // Remaining exclusions
            let reduced = self.sig.reduce_exclusions(self.config);
            all_removed.extend(reduced.iter().copied());
            removed_by_exclusion.extend(reduced.iter().copied());

            loop {
                let (modifs, purged) = self.check_late_consistencies();
                all_removed.extend(purged);
                if modifs == 0 {
                    break;
                }
                debug!(system = self.sig.system().0, modifs, "late consistency pass");
            }

            if reduced.is_empty() && deleted.is_empty() {
                break;
            }
        }

        let selected_removed = removed_by_exclusion
            .into_iter()
            .filter(|id| selected.contains(id))
            .collect();

        Reduction {
            removed: all_removed,
            selected_removed,
            attic,
        }
    }

    /// Refresh contextual grades and, when enabled, purge weak
    /// candidates.
    fn update_and_purge(&mut self) -> Vec<InterId> {
        self.sig.contextualize(self.config);

        if self.purge_weaks {
            self.sig.delete_weak_inters(self.config)
        } else {
            Vec::new()
        }
    }

    /// One round of the mode's structural checks, each followed by a
    /// grade refresh. Returns (modification count, purged candidates).
    fn check_consistencies(&mut self) -> (usize, Vec<InterId>) {
        let mut modifs = 0;
        let mut purged = Vec::new();

        match self.mode {
            Mode::Foundations => {
                modifs += checks::check_stem_ending_heads(self.sig, self.config);
                purged.extend(self.update_and_purge());

                modifs += checks::check_heads(self.sig, self.config);
                purged.extend(self.update_and_purge());

                modifs += checks::check_hooks(self.sig);
                purged.extend(self.update_and_purge());

                modifs += checks::check_beams(self.sig);
                purged.extend(self.update_and_purge());

                modifs += checks::check_ledgers(self.sig, self.config, &self.scale);
                purged.extend(self.update_and_purge());

                modifs += checks::check_stems(self.sig, self.config);
                purged.extend(self.update_and_purge());
            }
            Mode::Links | Mode::Symbols { .. } => {
                modifs += checks::check_stem_ending_heads(self.sig, self.config);
                purged.extend(self.update_and_purge());

                modifs += checks::check_heads(self.sig, self.config);
                purged.extend(self.update_and_purge());

                modifs += checks::check_double_alters(self.sig);
                purged.extend(self.update_and_purge());

                modifs += checks::check_time_numbers(self.sig);
                modifs += checks::check_time_signatures(self.sig);
                purged.extend(self.update_and_purge());

                modifs += checks::check_augmentation_dots(self.sig);
                modifs += checks::check_augmented(self.sig);
                purged.extend(self.update_and_purge());

                modifs += checks::check_isolated_alters(self.sig);
                purged.extend(self.update_and_purge());

                modifs += checks::check_repeat_dots(self.sig);
                purged.extend(self.update_and_purge());
            }
        }

        (modifs, purged)
    }

    fn check_late_consistencies(&mut self) -> (usize, Vec<InterId>) {
        let mut modifs = 0;
        let mut purged = Vec::new();

        if matches!(self.mode, Mode::Foundations) {
            modifs += checks::check_stem_lengths(self.sig, self.config, &self.scale);
            purged.extend(self.update_and_purge());
        }

        (modifs, purged)
    }

    fn check_slurs(&mut self) -> Vec<InterId> {
        match self.mode {
            Mode::Foundations => Vec::new(),
            Mode::Links | Mode::Symbols { .. } => {
                checks::check_slur_on_tuplet(self.sig, self.config, &self.scale)
            }
        }
    }
}

/// Reduce the founding material of one system.
pub fn reduce_foundations(
    sig: &mut Sig,
    config: &ReduceConfig,
    scale: Scale,
    purge_weaks: bool,
) -> Reduction {
    Reducer::new(sig, config, scale, purge_weaks, Mode::Foundations).reduce()
}

/// Final global reduction of one system.
pub fn reduce_links(
    sig: &mut Sig,
    config: &ReduceConfig,
    scale: Scale,
    purge_weaks: bool,
) -> Reduction {
    Reducer::new(sig, config, scale, purge_weaks, Mode::Links).reduce()
}

/// Speculative reduction: candidates of the given shapes are snapshot
/// before the run and the ones lost to exclusion are reported, so the
/// caller can restore just that subset from the returned attic.
pub fn reduce_symbols(
    sig: &mut Sig,
    config: &ReduceConfig,
    scale: Scale,
    purge_weaks: bool,
    shapes: Vec<Shape>,
) -> Reduction {
    Reducer::new(sig, config, scale, purge_weaks, Mode::Symbols { shapes }).reduce()
}

#[cfg(test)]
mod tests {
    use super::*;
    use syrinx_common::geom::{Line, Point, Rect};
    use syrinx_graph::{
        HorizontalSide, IdAllocator, Inter, Payload, RelationData, Support, SupportKind, SystemId,
    };

    fn setup() -> (Sig, IdAllocator, ReduceConfig, Scale) {
        (
            Sig::new(SystemId(1)),
            IdAllocator::new(),
            ReduceConfig::default(),
            Scale::new(20),
        )
    }

    fn stem_at(x: f64) -> Inter {
        Inter::new(Shape::Stem, 0.7, Rect::new(x, 0.0, 3.0, 40.0)).with_payload(Payload::Stem {
            median: Line::new(Point::new(x + 1.5, 0.0), Point::new(x + 1.5, 40.0)),
        })
    }

    fn head_at(x: f64, y: f64, grade: f64) -> Inter {
        Inter::new(Shape::NoteheadBlack, grade, Rect::new(x, y, 12.0, 10.0))
            .with_payload(Payload::Head { pitch: 4 })
    }

    fn link(sig: &mut Sig, head: syrinx_graph::InterId, stem: syrinx_graph::InterId) {
        sig.add_relation(
            head,
            stem,
            RelationData::Support(Support::new(
                SupportKind::HeadStem {
                    head_side: HorizontalSide::Right,
                    extension_y: 39.0,
                },
                0.5,
            )),
        )
        .unwrap();
    }

    #[test]
    fn test_reduce_terminates_and_shrinks_monotonically() {
        let (mut sig, mut alloc, config, scale) = setup();

        // A stemless head, an orphan hook, and a proper head+stem pair
        sig.add_inter(head_at(100.0, 0.0, 0.6), &mut alloc);
        sig.add_inter(
            Inter::new(Shape::BeamHook, 0.6, Rect::new(200.0, 0.0, 20.0, 6.0)),
            &mut alloc,
        );
        let head = sig.add_inter(head_at(4.0, 30.0, 0.7), &mut alloc);
        let stem = sig.add_inter(stem_at(2.0), &mut alloc);
        link(&mut sig, head, stem);

        let before_inters = sig.live_inter_count();
        let before_rels = sig.live_relation_count();

        reduce_foundations(&mut sig, &config, scale, true);

        assert!(sig.live_inter_count() <= before_inters);
        assert!(sig.live_relation_count() <= before_rels);
        assert!(sig.contains(head));
        assert!(sig.contains(stem));
    }

    #[test]
    fn test_stemless_head_deleted_regardless_of_grade() {
        let (mut sig, mut alloc, config, scale) = setup();
        let lonely = sig.add_inter(head_at(0.0, 0.0, 0.95), &mut alloc);

        reduce_foundations(&mut sig, &config, scale, true);

        assert!(!sig.contains(lonely));
    }

    #[test]
    fn test_no_exclusion_survives_with_both_endpoints_weaker() {
        let (mut sig, mut alloc, config, scale) = setup();

        // Two incompatible overlapping candidates
        let strong = sig.add_inter(
            Inter::new(Shape::RestQuarter, 0.8, Rect::new(0.0, 0.0, 10.0, 16.0)),
            &mut alloc,
        );
        let weak = sig.add_inter(
            Inter::new(Shape::Sharp, 0.3, Rect::new(4.0, 4.0, 8.0, 10.0)),
            &mut alloc,
        );

        reduce_links(&mut sig, &config, scale, false);

        assert!(sig.contains(strong));
        assert!(!sig.contains(weak));
        assert!(sig.exclusions().is_empty());
    }

    #[test]
    fn test_symbols_mode_reports_and_restores_selected() {
        let (mut sig, mut alloc, config, scale) = setup();

        // A rest losing an overlap contest against a stronger rest
        let strong = sig.add_inter(
            Inter::new(Shape::RestQuarter, 0.9, Rect::new(0.0, 0.0, 10.0, 16.0)),
            &mut alloc,
        );
        let weak = sig.add_inter(
            Inter::new(Shape::RestEighth, 0.4, Rect::new(4.0, 4.0, 10.0, 16.0)),
            &mut alloc,
        );

        let reduction = reduce_symbols(
            &mut sig,
            &config,
            scale,
            false,
            vec![Shape::RestEighth],
        );

        assert!(!sig.contains(weak));
        assert_eq!(reduction.selected_removed, vec![weak]);
        assert!(sig.contains(strong));

        // The caller can roll the subset back
        reduction.attic.unwrap().restore(&mut sig);
        assert!(sig.contains(weak));
    }

    #[test]
    fn test_purge_removes_weak_candidates() {
        let (mut sig, mut alloc, config, scale) = setup();
        let faint = sig.add_inter(
            Inter::new(Shape::ClefG, 0.05, Rect::new(0.0, 0.0, 10.0, 30.0)),
            &mut alloc,
        );

        reduce_links(&mut sig, &config, scale, true);

        assert!(!sig.contains(faint));
    }

    #[test]
    fn test_purge_disabled_keeps_weak_candidates() {
        let (mut sig, mut alloc, config, scale) = setup();
        let faint = sig.add_inter(
            Inter::new(Shape::ClefG, 0.05, Rect::new(0.0, 0.0, 10.0, 30.0)),
            &mut alloc,
        );

        reduce_links(&mut sig, &config, scale, false);

        assert!(sig.contains(faint));
    }
}
