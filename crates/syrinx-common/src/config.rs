//! Tunable parameters for relation building and reduction.
//!
//! Every distance is an interline fraction (see [`crate::scale::Scale`]).
//! Defaults encode the priors that work on common engravings; a TOML file
//! can override any subset.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grades;

/// Grade thresholds and combination constants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Below this intrinsic grade a candidate is not even considered.
    pub min_grade: f64,
    /// At or above this grade a candidate counts as "good".
    pub good_grade: f64,
    /// Candidates whose contextual grade falls below this are purged.
    pub min_contextual_grade: f64,
    /// Scaling applied to the weighted geometric mean of impacts.
    pub intrinsic_ratio: f64,
    /// Default support amplification coefficient.
    pub support_coeff: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_grade: 0.1,
            good_grade: 0.5,
            min_contextual_grade: 0.1,
            intrinsic_ratio: 0.8,
            support_coeff: 10.0,
        }
    }
}

impl Thresholds {
    pub fn is_good(&self, grade: f64) -> bool {
        grade >= self.good_grade
    }
}

/// Gap acceptance window and per-axis weights for one connection kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GapConfig {
    /// Maximum acceptable horizontal gap.
    pub x_gap_max: f64,
    /// Maximum acceptable vertical gap.
    pub y_gap_max: f64,
    /// Horizontal weight in the gap-to-grade formula.
    pub x_weight: f64,
    /// Vertical weight in the gap-to-grade formula.
    pub y_weight: f64,
    /// Support coefficient seen by the relation source.
    pub source_coeff: f64,
    /// Support coefficient seen by the relation target.
    pub target_coeff: f64,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            x_gap_max: 0.5,
            y_gap_max: 0.5,
            x_weight: 1.0,
            y_weight: 1.0,
            source_coeff: 10.0,
            target_coeff: 10.0,
        }
    }
}

impl GapConfig {
    /// Grade for a measured gap, or `None` when the gap exceeds the window.
    pub fn grade_for_gap(&self, x_dist: f64, y_dist: f64) -> Option<f64> {
        if x_dist > self.x_gap_max || y_dist > self.y_gap_max {
            return None;
        }

        Some(grades::gap_grade(
            x_dist.max(0.0),
            y_dist.max(0.0),
            self.x_weight,
            self.y_weight,
        ))
    }
}

/// Gap windows for every connection kind that is built from a geometric
/// measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GapTable {
    pub head_stem: GapConfig,
    pub beam_stem: GapConfig,
    pub flag_stem: GapConfig,
    pub alter_head: GapConfig,
    pub augmentation: GapConfig,
    pub double_dot: GapConfig,
    pub head_head: GapConfig,
    pub ledger_ledger: GapConfig,
    pub repeat_dot_pair: GapConfig,
    pub time_top_bottom: GapConfig,
}

impl Default for GapTable {
    fn default() -> Self {
        Self {
            // Stem attachments: tight horizontally, lenient vertically.
            // The head coefficient stays low so a stem cannot resurrect a
            // terrible head on its own.
            head_stem: GapConfig {
                x_gap_max: 0.3,
                y_gap_max: 0.8,
                x_weight: 2.0,
                y_weight: 1.0,
                source_coeff: 4.0,
                target_coeff: 10.0,
            },
            beam_stem: GapConfig {
                x_gap_max: 0.1,
                y_gap_max: 0.7,
                x_weight: 4.0,
                y_weight: 1.0,
                source_coeff: 2.0,
                target_coeff: 10.0,
            },
            flag_stem: GapConfig {
                x_gap_max: 0.3,
                y_gap_max: 0.5,
                x_weight: 2.0,
                y_weight: 1.0,
                source_coeff: 2.0,
                target_coeff: 5.0,
            },
            alter_head: GapConfig {
                x_gap_max: 1.0,
                y_gap_max: 0.5,
                x_weight: 1.0,
                y_weight: 2.0,
                source_coeff: 3.0,
                target_coeff: 3.0,
            },
            augmentation: GapConfig {
                x_gap_max: 1.5,
                y_gap_max: 0.75,
                x_weight: 1.0,
                y_weight: 2.0,
                source_coeff: 3.0,
                target_coeff: 2.0,
            },
            double_dot: GapConfig {
                x_gap_max: 0.75,
                y_gap_max: 0.2,
                x_weight: 1.0,
                y_weight: 3.0,
                source_coeff: 3.0,
                target_coeff: 2.0,
            },
            head_head: GapConfig {
                x_gap_max: 0.2,
                y_gap_max: 0.2,
                x_weight: 2.0,
                y_weight: 2.0,
                source_coeff: 2.0,
                target_coeff: 2.0,
            },
            ledger_ledger: GapConfig {
                x_gap_max: 2.0,
                y_gap_max: 0.3,
                x_weight: 0.5,
                y_weight: 3.0,
                source_coeff: 3.0,
                target_coeff: 3.0,
            },
            repeat_dot_pair: GapConfig {
                x_gap_max: 0.5,
                y_gap_max: 2.5,
                x_weight: 3.0,
                y_weight: 0.5,
                source_coeff: 5.0,
                target_coeff: 5.0,
            },
            time_top_bottom: GapConfig {
                x_gap_max: 1.0,
                y_gap_max: 3.0,
                x_weight: 2.0,
                y_weight: 0.5,
                source_coeff: 5.0,
                target_coeff: 5.0,
            },
        }
    }
}

/// Parameters consumed by the structural checks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckParams {
    /// Minimum stem extension beyond the farthest attached head.
    pub min_stem_extension: f64,
    /// Maximum width for a slur suspected to wrap a tuplet sign.
    pub max_tuplet_slur_width: f64,
    /// Stem anchor margin, as a ratio of the head height.
    pub anchor_height_ratio: f64,
    /// Vertical search margin around a ledger when looking for its head.
    pub ledger_search_margin: f64,
    /// How many pitch steps away a mate head may sit across the stem.
    pub pitch_step_range: i32,
}

impl Default for CheckParams {
    fn default() -> Self {
        Self {
            min_stem_extension: 1.5,
            max_tuplet_slur_width: 3.0,
            anchor_height_ratio: 0.275,
            ledger_search_margin: 1.0,
            pitch_step_range: 1,
        }
    }
}

/// Complete configuration for relation building and reduction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReduceConfig {
    pub thresholds: Thresholds,
    pub gaps: GapTable,
    pub checks: CheckParams,
}

impl ReduceConfig {
    /// Parse a TOML override file; unspecified fields keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &std::path::Path) -> Result<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }
}
