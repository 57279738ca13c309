//! Sheet scale: the staff interline is the unit every distance threshold
//! is expressed in, so thresholds transfer across scan resolutions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Scale {
    /// Vertical distance between two staff lines, in pixels.
    pub interline: u32,
}

impl Scale {
    pub fn new(interline: u32) -> Self {
        Self { interline }
    }

    /// Convert an interline fraction to pixels.
    pub fn to_pixels(&self, fraction: f64) -> f64 {
        fraction * f64::from(self.interline)
    }

    /// Convert a pixel distance to an interline fraction.
    pub fn pixels_to_frac(&self, pixels: f64) -> f64 {
        pixels / f64::from(self.interline)
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self { interline: 20 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let scale = Scale::new(16);
        assert_eq!(scale.to_pixels(1.5), 24.0);
        assert!((scale.pixels_to_frac(24.0) - 1.5).abs() < 1e-9);
    }
}
