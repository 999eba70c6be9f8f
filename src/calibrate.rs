use serde::{Deserialize, Serialize};

use crate::error::MatchError;

/// Logistic calibration of raw cosine similarity.
///
/// `confidence = 1 / (1 + exp(-steepness * (raw - midpoint)))`, clamped to
/// [0, 1]. Near-duplicate phrasing clusters similarities around 0.6–0.9, so the
/// curve spreads that band out and flattens the extremes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Similarity treated as 50% confidence.
    #[serde(default = "Calibration::default_midpoint")]
    pub midpoint: f32,
    /// How sharply confidence saturates away from the midpoint.
    #[serde(default = "Calibration::default_steepness")]
    pub steepness: f32,
}

impl Calibration {
    pub(crate) fn default_midpoint() -> f32 {
        0.5
    }

    pub(crate) fn default_steepness() -> f32 {
        10.0
    }

    pub fn new(midpoint: f32, steepness: f32) -> Self {
        Self {
            midpoint,
            steepness,
        }
    }

    /// Reject parameters that would break the [0, 1] bound or monotonicity.
    pub fn validate(&self) -> Result<(), String> {
        if !self.midpoint.is_finite() {
            return Err("calibration.midpoint must be finite".into());
        }
        if !(self.steepness.is_finite() && self.steepness > 0.0) {
            return Err("calibration.steepness must be finite and > 0".into());
        }
        Ok(())
    }

    /// Map a raw similarity to a confidence in [0, 1].
    pub fn calibrate(&self, raw_similarity: f32) -> Result<f32, MatchError> {
        if !raw_similarity.is_finite() {
            return Err(MatchError::InvalidScore(raw_similarity));
        }
        // exp overflow saturates to inf, which still lands on 0.0
        let confidence = 1.0 / (1.0 + (-self.steepness * (raw_similarity - self.midpoint)).exp());
        Ok(confidence.clamp(0.0, 1.0))
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            midpoint: Self::default_midpoint(),
            steepness: Self::default_steepness(),
        }
    }
}
