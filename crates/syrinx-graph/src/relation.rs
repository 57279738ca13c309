//! Typed edges between interpretation candidates.
//!
//! Two families: exclusions (the two candidates cannot both be correct)
//! and supports (they reinforce one another, with a grade and often a
//! directional portion recording how the glyphs touch).

use serde::{Deserialize, Serialize};

use syrinx_common::config::{GapConfig, GapTable};
use syrinx_common::grades;

use crate::id::{InterId, RelId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionCause {
    Overlap,
    TooClose,
    Incompatible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalSide {
    Left,
    Right,
}

impl HorizontalSide {
    pub fn opposite(self) -> Self {
        match self {
            HorizontalSide::Left => HorizontalSide::Right,
            HorizontalSide::Right => HorizontalSide::Left,
        }
    }
}

/// Which horizontal portion of a beam a stem crosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeamPortion {
    Left,
    Center,
    Right,
}

/// Which vertical portion of a stem an attachment sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StemPortion {
    Top,
    Middle,
    Bottom,
}

/// Support kind, carrying the directional payload where one exists.
///
/// Directional kinds read source → target (head → stem, beam → stem,
/// dot → augmented entity, …); symmetric kinds are stored lower-id first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportKind {
    HeadStem {
        head_side: HorizontalSide,
        /// Ordinate where the head anchors on the stem line.
        extension_y: f64,
    },
    BeamStem {
        portion: BeamPortion,
    },
    FlagStem {
        portion: StemPortion,
    },
    BeamHead,
    HeadHead,
    AlterHead,
    Augmentation,
    DoubleDot,
    RepeatDotPair,
    TimeTopBottom,
    LedgerLedger,
}

/// Payload-free discriminant of [`SupportKind`], for typed queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportTag {
    HeadStem,
    BeamStem,
    FlagStem,
    BeamHead,
    HeadHead,
    AlterHead,
    Augmentation,
    DoubleDot,
    RepeatDotPair,
    TimeTopBottom,
    LedgerLedger,
}

impl SupportKind {
    pub fn tag(&self) -> SupportTag {
        match self {
            SupportKind::HeadStem { .. } => SupportTag::HeadStem,
            SupportKind::BeamStem { .. } => SupportTag::BeamStem,
            SupportKind::FlagStem { .. } => SupportTag::FlagStem,
            SupportKind::BeamHead => SupportTag::BeamHead,
            SupportKind::HeadHead => SupportTag::HeadHead,
            SupportKind::AlterHead => SupportTag::AlterHead,
            SupportKind::Augmentation => SupportTag::Augmentation,
            SupportKind::DoubleDot => SupportTag::DoubleDot,
            SupportKind::RepeatDotPair => SupportTag::RepeatDotPair,
            SupportKind::TimeTopBottom => SupportTag::TimeTopBottom,
            SupportKind::LedgerLedger => SupportTag::LedgerLedger,
        }
    }
}

impl SupportTag {
    /// Gap window and support coefficients configured for this kind.
    pub fn gap_config(self, gaps: &GapTable) -> &GapConfig {
        match self {
            SupportTag::HeadStem => &gaps.head_stem,
            SupportTag::BeamStem => &gaps.beam_stem,
            SupportTag::FlagStem => &gaps.flag_stem,
            // Derived from beam-stem and head-stem edges, reuse their scale
            SupportTag::BeamHead => &gaps.beam_stem,
            SupportTag::HeadHead => &gaps.head_head,
            SupportTag::AlterHead => &gaps.alter_head,
            SupportTag::Augmentation => &gaps.augmentation,
            SupportTag::DoubleDot => &gaps.double_dot,
            SupportTag::RepeatDotPair => &gaps.repeat_dot_pair,
            SupportTag::TimeTopBottom => &gaps.time_top_bottom,
            SupportTag::LedgerLedger => &gaps.ledger_ledger,
        }
    }
}

/// A support edge: grade plus kind payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Support {
    pub kind: SupportKind,
    grade: f64,
}

impl Support {
    pub fn new(kind: SupportKind, grade: f64) -> Self {
        Self {
            kind,
            grade: grades::clamp(grade),
        }
    }

    /// Build from a geometric gap measurement, in interline fractions.
    /// `None` when the gap exceeds the configured window.
    pub fn from_gap(kind: SupportKind, x_dist: f64, y_dist: f64, gaps: &GapTable) -> Option<Self> {
        let cfg = kind.tag().gap_config(gaps);
        let grade = cfg.grade_for_gap(x_dist, y_dist)?;
        Some(Self::new(kind, grade))
    }

    pub fn grade(&self) -> f64 {
        self.grade
    }

    /// Explicit grade setter, used when picking the best of several
    /// competing edges during relation reduction.
    pub fn set_grade(&mut self, grade: f64) {
        self.grade = grades::clamp(grade);
    }

    /// Amplification ratio seen by the relation source.
    pub fn source_ratio(&self, gaps: &GapTable) -> f64 {
        grades::support_ratio(self.grade, self.kind.tag().gap_config(gaps).source_coeff)
    }

    /// Amplification ratio seen by the relation target.
    pub fn target_ratio(&self, gaps: &GapTable) -> f64 {
        grades::support_ratio(self.grade, self.kind.tag().gap_config(gaps).target_coeff)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationData {
    Exclusion { cause: ExclusionCause },
    Support(Support),
}

impl RelationData {
    pub fn is_exclusion(&self) -> bool {
        matches!(self, RelationData::Exclusion { .. })
    }

    pub fn is_support(&self) -> bool {
        matches!(self, RelationData::Support(_))
    }

    pub fn as_support(&self) -> Option<&Support> {
        match self {
            RelationData::Support(s) => Some(s),
            RelationData::Exclusion { .. } => None,
        }
    }
}

/// An edge of the interpretation graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub id: RelId,
    pub source: InterId,
    pub target: InterId,
    pub data: RelationData,
}

impl Relation {
    /// The endpoint opposite to `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is neither endpoint.
    pub fn opposite(&self, id: InterId) -> InterId {
        if id == self.source {
            self.target
        } else if id == self.target {
            self.source
        } else {
            panic!("{id} is not an endpoint of relation {:?}", self.id)
        }
    }

    pub fn touches(&self, id: InterId) -> bool {
        self.source == id || self.target == id
    }
}
