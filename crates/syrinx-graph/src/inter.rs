//! Interpretation candidates.
//!
//! An `Inter` is one weighted hypothesis that a glyph represents a given
//! musical shape. Shared fields are flattened here; shape-specific data
//! rides in the [`Payload`] variant.

use serde::{Deserialize, Serialize};

use syrinx_common::geom::{Area, Line, Point, Rect};
use syrinx_common::grades::{self, Impacts};
use syrinx_common::Thresholds;

use crate::id::{InterId, StaffId};
use crate::shape::Shape;

/// Shape-specific candidate data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    None,
    /// Pitched symbol: integer staff pitch position (0 = middle line,
    /// positive going down).
    Head { pitch: i32 },
    /// Stem median line, top-down.
    Stem { median: Line },
    /// Beam median line plus its thickness.
    Beam { median: Line, height: f64 },
    /// Ledger line index: +1 first below the staff, -1 first above.
    Ledger { index: i32 },
    /// Recognized text content.
    Word { text: String },
    /// Value of a time-signature number.
    Time { value: u8 },
}

/// One interpretation candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inter {
    id: InterId,
    pub shape: Shape,
    grade: f64,
    contextual_grade: Option<f64>,
    pub bounds: Rect,
    pub area: Option<Area>,
    pub impacts: Option<Impacts>,
    deleted: bool,
    pub frozen: bool,
    pub vip: bool,
    /// Alternate interpretation of the same musical entity; mirrors never
    /// exclude one another.
    pub mirror: Option<InterId>,
    pub staff: Option<StaffId>,
    pub payload: Payload,
}

impl Inter {
    pub fn new(shape: Shape, grade: f64, bounds: Rect) -> Self {
        Self {
            id: InterId(0),
            shape,
            grade: grades::clamp(grade),
            contextual_grade: None,
            bounds,
            area: None,
            impacts: None,
            deleted: false,
            frozen: false,
            vip: false,
            mirror: None,
            staff: None,
            payload: Payload::None,
        }
    }

    /// Build from an impacts breakdown; the intrinsic grade is their
    /// weighted geometric mean scaled by the configured intrinsic ratio.
    pub fn from_impacts(
        shape: Shape,
        impacts: Impacts,
        bounds: Rect,
        thresholds: &Thresholds,
    ) -> Self {
        let grade = grades::clamp(impacts.grade(thresholds.intrinsic_ratio));
        let mut inter = Self::new(shape, grade, bounds);
        inter.impacts = Some(impacts);
        inter
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_area(mut self, area: Area) -> Self {
        self.area = Some(area);
        self
    }

    pub fn with_staff(mut self, staff: StaffId) -> Self {
        self.staff = Some(staff);
        self
    }

    pub fn frozen(mut self) -> Self {
        self.frozen = true;
        self
    }

    pub fn id(&self) -> InterId {
        self.id
    }

    /// Assign the page-unique id, exactly once.
    ///
    /// # Panics
    ///
    /// Panics on reassignment or on a zero id; both are caller bugs.
    pub(crate) fn assign_id(&mut self, id: InterId) {
        assert_eq!(self.id, InterId(0), "id already assigned: {}", self.id);
        assert_ne!(id, InterId(0), "id zero is reserved for unassigned");
        self.id = id;
    }

    pub fn grade(&self) -> f64 {
        self.grade
    }

    pub fn contextual_grade(&self) -> Option<f64> {
        self.contextual_grade
    }

    pub(crate) fn set_contextual_grade(&mut self, cg: f64) {
        self.contextual_grade = Some(grades::clamp(cg));
    }

    /// Contextual grade when available, intrinsic otherwise.
    pub fn best_grade(&self) -> f64 {
        self.contextual_grade.unwrap_or(self.grade)
    }

    pub fn is_good(&self, thresholds: &Thresholds) -> bool {
        self.grade >= thresholds.good_grade
    }

    pub fn is_contextually_good(&self, thresholds: &Thresholds) -> bool {
        self.best_grade() >= thresholds.good_grade
    }

    /// Knock the intrinsic grade down by the given ratio (overlap
    /// tie-break for matching text symbols).
    pub fn decrease(&mut self, ratio: f64) {
        self.grade *= 1.0 - grades::clamp(ratio);
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.deleted = true;
    }

    pub(crate) fn unmark_deleted(&mut self) {
        self.deleted = false;
        self.contextual_grade = None;
    }

    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    pub fn pitch(&self) -> Option<i32> {
        match self.payload {
            Payload::Head { pitch } => Some(pitch),
            _ => None,
        }
    }

    pub fn stem_median(&self) -> Option<Line> {
        match self.payload {
            Payload::Stem { median } => Some(median),
            _ => None,
        }
    }

    pub fn beam_median(&self) -> Option<Line> {
        match self.payload {
            Payload::Beam { median, .. } => Some(median),
            _ => None,
        }
    }

    pub fn ledger_index(&self) -> Option<i32> {
        match self.payload {
            Payload::Ledger { index } => Some(index),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Word { text } => Some(text),
            _ => None,
        }
    }

    /// Precise overlap test against another candidate, using areas when
    /// available and falling back to bounding boxes.
    pub fn overlaps(&self, other: &Inter) -> bool {
        if !self.bounds.intersects(&other.bounds) {
            return false;
        }

        match (&self.area, &other.area) {
            (Some(a), Some(b)) => a.intersects(b),
            (Some(a), None) => a.intersects_rect(&other.bounds),
            (None, Some(b)) => b.intersects_rect(&self.bounds),
            (None, None) => true,
        }
    }
}
