//! Grade arithmetic for interpretation candidates.
//!
//! All grades are confidence values in [0, 1]. A candidate starts with an
//! *intrinsic* grade (from classification alone, possibly combined out of
//! several weighted impacts) and may later receive a *contextual* grade once
//! its supporting partners are known.

use serde::{Deserialize, Serialize};

/// Saturate a raw value into [0, 1].
pub fn clamp(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Amplification ratio a support relation of the given grade contributes
/// to its partner: `1 + coeff * grade`.
pub fn support_ratio(grade: f64, coeff: f64) -> f64 {
    1.0 + (coeff * grade)
}

/// Combine an intrinsic grade with the total contribution of supporting
/// partners: `((1 + c) * g) / (1 + c * g)`.
///
/// For `g` in [0,1] and `c >= 0` the result stays in [0,1] and is never
/// below `g`.
pub fn contextual(intrinsic: f64, contribution: f64) -> f64 {
    ((1.0 + contribution) * intrinsic) / (1.0 + (contribution * intrinsic))
}

/// Convert a 2D geometric gap into a connection grade.
///
/// The gap decays linearly with the weighted normalized distance and
/// bottoms out at zero. Distances are expressed in interline fractions.
pub fn gap_grade(x_dist: f64, y_dist: f64, x_weight: f64, y_weight: f64) -> f64 {
    let norm = x_weight.hypot(y_weight);
    let wx = x_weight * x_dist;
    let wy = y_weight * y_dist;
    let dist = wx.hypot(wy) / norm;

    (1.0 - (norm * dist)).max(0.0)
}

/// One named, weighted raw measurement contributing to an intrinsic grade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Impact {
    pub name: String,
    pub weight: f64,
    pub value: f64,
}

/// The breakdown of weighted impacts behind an intrinsic grade.
///
/// Kept on the candidate for inspection; the combined grade is a weighted
/// geometric mean scaled by the intrinsic ratio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Impacts {
    items: Vec<Impact>,
}

impl Impacts {
    /// Build the breakdown from parallel name/weight slices.
    ///
    /// # Panics
    ///
    /// Panics if the two slices differ in length. That is a caller bug,
    /// never a data condition.
    pub fn new(names: &[&str], weights: &[f64]) -> Self {
        assert_eq!(
            names.len(),
            weights.len(),
            "impact names and weights must be parallel"
        );

        Self {
            items: names
                .iter()
                .zip(weights)
                .map(|(n, w)| Impact {
                    name: (*n).to_string(),
                    weight: *w,
                    value: 0.0,
                })
                .collect(),
        }
    }

    pub fn set_value(&mut self, index: usize, value: f64) {
        self.items[index].value = clamp(value);
    }

    pub fn items(&self) -> &[Impact] {
        &self.items
    }

    /// Combined grade: `ratio * (prod v_i^w_i)^(1/sum w_i)`.
    ///
    /// Zero-weight impacts are informational only and excluded from the
    /// product.
    ///
    /// # Panics
    ///
    /// Panics if every weight is zero (division by zero in the exponent).
    pub fn grade(&self, intrinsic_ratio: f64) -> f64 {
        let total: f64 = self.items.iter().map(|i| i.weight).sum();
        assert!(total > 0.0, "impacts must carry a non-zero total weight");

        let product: f64 = self
            .items
            .iter()
            .filter(|i| i.weight > 0.0)
            .map(|i| i.value.powf(i.weight))
            .product();

        intrinsic_ratio * product.powf(1.0 / total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_saturates_and_is_idempotent() {
        assert_eq!(clamp(-0.3), 0.0);
        assert_eq!(clamp(1.5), 1.0);
        assert_eq!(clamp(0.42), 0.42);
        for v in [-2.0, -0.3, 0.0, 0.42, 1.0, 1.5] {
            assert_eq!(clamp(clamp(v)), clamp(v));
        }
    }

    #[test]
    fn test_support_ratio_default_coeff() {
        // Relation grade 0.1 with coeff 10 doubles the partner weight
        assert!((support_ratio(0.1, 10.0) - 2.0).abs() < 1e-9);
        assert_eq!(support_ratio(0.0, 10.0), 1.0);
    }

    #[test]
    fn test_contextual_reference_value() {
        // intrinsic 0.5, one partner at 0.8 with ratio 2.0:
        // contribution = 0.8, contextual = 0.9 / 1.4
        let cg = contextual(0.5, 0.8);
        assert!((cg - (0.9 / 1.4)).abs() < 1e-9);
        assert!((cg - 0.642857).abs() < 1e-6);
    }

    #[test]
    fn test_contextual_no_contribution_is_identity() {
        assert_eq!(contextual(0.5, 0.0), 0.5);
        assert_eq!(contextual(0.0, 3.0), 0.0);
    }

    #[test]
    fn test_contextual_stays_in_unit_range() {
        for g in [0.0, 0.2, 0.5, 0.9, 1.0] {
            for c in [0.0, 0.5, 1.0, 5.0, 100.0] {
                let cg = contextual(g, c);
                assert!((0.0..=1.0).contains(&cg), "cg={cg} for g={g} c={c}");
                assert!(cg >= g);
            }
        }
    }

    #[test]
    fn test_gap_grade_zero_gap_is_perfect() {
        assert!((gap_grade(0.0, 0.0, 2.0, 1.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_gap_grade_decays_and_floors_at_zero() {
        let near = gap_grade(0.05, 0.1, 2.0, 1.0);
        let far = gap_grade(0.2, 0.4, 2.0, 1.0);
        assert!(near > far);
        assert_eq!(gap_grade(10.0, 10.0, 2.0, 1.0), 0.0);
    }

    #[test]
    fn test_impacts_weighted_geometric_mean() {
        let mut impacts = Impacts::new(&["core", "gap"], &[2.0, 1.0]);
        impacts.set_value(0, 0.9);
        impacts.set_value(1, 0.6);

        // (0.9^2 * 0.6)^(1/3), scaled by ratio 1.0
        let expected = (0.9f64.powi(2) * 0.6).powf(1.0 / 3.0);
        assert!((impacts.grade(1.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_impacts_zero_weight_excluded() {
        let mut with = Impacts::new(&["core", "info"], &[1.0, 0.0]);
        with.set_value(0, 0.8);
        with.set_value(1, 0.1); // Must not drag the grade down

        assert!((with.grade(1.0) - 0.8).abs() < 1e-9);
    }

    #[test]
    #[should_panic(expected = "parallel")]
    fn test_impacts_mismatched_arrays_panic() {
        let _ = Impacts::new(&["a", "b"], &[1.0]);
    }

    #[test]
    #[should_panic(expected = "non-zero total weight")]
    fn test_impacts_all_zero_weights_panic() {
        let impacts = Impacts::new(&["a"], &[0.0]);
        let _ = impacts.grade(1.0);
    }
}
