//! The closed catalog of musical shapes the structural rules reason about.
//!
//! This is not a full engraving vocabulary; it contains exactly the shapes
//! that participate in some rule (attachment, exclusion exception, or
//! sibling requirement).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    // Note heads
    NoteheadBlack,
    NoteheadVoid,
    NoteheadBlackSmall,
    NoteheadVoidSmall,
    WholeNote,
    WholeNoteSmall,

    // Rests
    RestWhole,
    RestHalf,
    RestQuarter,
    RestEighth,

    // Stem and beams
    Stem,
    Beam,
    BeamSmall,
    BeamHook,

    Ledger,
    Slur,

    // Flags
    Flag1,
    Flag2,

    // Accidentals
    Sharp,
    Flat,
    Natural,
    DoubleSharp,
    DoubleFlat,

    // Barlines
    ThinBarline,
    ThickBarline,

    RepeatDot,
    AugmentationDot,

    // Time signatures
    TimeNumber,
    TimeCommon,
    TimeCut,

    // Dynamics
    Crescendo,
    Diminuendo,
    DynamicPiano,
    DynamicForte,

    // Text
    Word,
    Sentence,

    // Clefs
    ClefG,
    ClefF,
    ClefC,

    // Tuplet signs
    Tuplet3,
    Tuplet6,
}

impl Shape {
    /// Note heads that expect a stem (whole notes do not).
    pub fn is_stem_head(self) -> bool {
        matches!(
            self,
            Shape::NoteheadBlack
                | Shape::NoteheadVoid
                | Shape::NoteheadBlackSmall
                | Shape::NoteheadVoidSmall
        )
    }

    pub fn is_head(self) -> bool {
        self.is_stem_head() || matches!(self, Shape::WholeNote | Shape::WholeNoteSmall)
    }

    pub fn is_rest(self) -> bool {
        matches!(
            self,
            Shape::RestWhole | Shape::RestHalf | Shape::RestQuarter | Shape::RestEighth
        )
    }

    /// Augmentable entities: anything carrying a duration of its own.
    pub fn is_note_or_rest(self) -> bool {
        self.is_head() || self.is_rest()
    }

    pub fn is_small(self) -> bool {
        matches!(
            self,
            Shape::NoteheadBlackSmall
                | Shape::NoteheadVoidSmall
                | Shape::WholeNoteSmall
                | Shape::BeamSmall
        )
    }

    pub fn is_beam(self) -> bool {
        matches!(self, Shape::Beam | Shape::BeamSmall | Shape::BeamHook)
    }

    /// Full beams, which need a stem at both ends (hooks need just one).
    pub fn is_full_beam(self) -> bool {
        matches!(self, Shape::Beam | Shape::BeamSmall)
    }

    pub fn is_flag(self) -> bool {
        matches!(self, Shape::Flag1 | Shape::Flag2)
    }

    pub fn is_accidental(self) -> bool {
        matches!(
            self,
            Shape::Sharp | Shape::Flat | Shape::Natural | Shape::DoubleSharp | Shape::DoubleFlat
        )
    }

    pub fn is_double_alter(self) -> bool {
        matches!(self, Shape::DoubleSharp | Shape::DoubleFlat)
    }

    pub fn is_core_barline(self) -> bool {
        matches!(self, Shape::ThinBarline | Shape::ThickBarline)
    }

    pub fn is_wedge(self) -> bool {
        matches!(self, Shape::Crescendo | Shape::Diminuendo)
    }

    pub fn is_time(self) -> bool {
        matches!(self, Shape::TimeNumber | Shape::TimeCommon | Shape::TimeCut)
    }

    pub fn is_tuplet(self) -> bool {
        matches!(self, Shape::Tuplet3 | Shape::Tuplet6)
    }

    /// Textual content of a fixed symbol, for the word-vs-symbol overlap
    /// tie-break.
    pub fn symbol_string(self) -> Option<&'static str> {
        match self {
            Shape::DynamicPiano => Some("p"),
            Shape::DynamicForte => Some("f"),
            _ => None,
        }
    }

    /// Shapes never considered by overlap detection.
    pub fn overlap_exempt(self) -> bool {
        matches!(self, Shape::Ledger | Shape::Crescendo | Shape::Diminuendo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_classification() {
        assert!(Shape::NoteheadBlack.is_stem_head());
        assert!(!Shape::WholeNote.is_stem_head());
        assert!(Shape::WholeNote.is_head());
        assert!(Shape::RestQuarter.is_note_or_rest());
        assert!(!Shape::Stem.is_note_or_rest());
    }

    #[test]
    fn test_beam_classification() {
        assert!(Shape::Beam.is_full_beam());
        assert!(Shape::BeamSmall.is_full_beam());
        assert!(Shape::BeamHook.is_beam());
        assert!(!Shape::BeamHook.is_full_beam());
    }

    #[test]
    fn test_size_classes() {
        assert!(Shape::NoteheadBlackSmall.is_small());
        assert!(!Shape::NoteheadBlack.is_small());
        assert!(Shape::BeamSmall.is_small());
    }

    #[test]
    fn test_symbol_strings() {
        assert_eq!(Shape::DynamicPiano.symbol_string(), Some("p"));
        assert_eq!(Shape::Word.symbol_string(), None);
    }

    #[test]
    fn test_overlap_exemptions() {
        assert!(Shape::Ledger.overlap_exempt());
        assert!(Shape::Crescendo.overlap_exempt());
        assert!(!Shape::Stem.overlap_exempt());
    }
}
