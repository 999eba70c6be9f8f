use serde::{Deserialize, Serialize};

use crate::types::MatchResult;

/// Minimum calibrated confidence required to surface a solution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    #[serde(default = "Gate::default_threshold")]
    pub threshold: f32,
}

impl Gate {
    pub(crate) fn default_threshold() -> f32 {
        0.5
    }

    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err("gate.threshold must be between 0.0 and 1.0".into());
        }
        Ok(())
    }

    pub fn decide(&self, result: &MatchResult<'_>) -> bool {
        decide(result, self.threshold)
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self {
            threshold: Self::default_threshold(),
        }
    }
}

/// Accept iff a candidate exists and `confidence >= threshold`.
pub fn decide(result: &MatchResult<'_>, threshold: f32) -> bool {
    result.record.is_some() && result.confidence >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KnowledgeBase, LoadOptions, NewRecord, Solution};

    fn kb() -> KnowledgeBase {
        let payload = Solution {
            title: "t".into(),
            solution: "s".into(),
            code_example: "c".into(),
            source: "src".into(),
            ..Default::default()
        };
        KnowledgeBase::load(vec![NewRecord::new(vec![1.0], payload)], LoadOptions::default())
            .unwrap()
    }

    fn result(kb: &KnowledgeBase, confidence: f32) -> MatchResult<'_> {
        MatchResult {
            record: kb.all_records().first(),
            raw_similarity: Some(0.5),
            confidence,
            accepted: false,
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let kb = kb();
        assert!(decide(&result(&kb, 0.5), 0.5));
        assert!(!decide(&result(&kb, 0.499_999), 0.5));
        assert!(decide(&result(&kb, 0.75), 0.75));
    }

    #[test]
    fn accepts_iff_at_or_above_threshold() {
        let kb = kb();
        for i in 0..=20 {
            let c = i as f32 / 20.0;
            assert_eq!(decide(&result(&kb, c), 0.35), c >= 0.35);
        }
    }

    #[test]
    fn no_candidate_never_accepted() {
        assert!(!decide(&MatchResult::no_candidate(), 0.0));
    }

    #[test]
    fn gate_decide_uses_threshold() {
        let kb = kb();
        assert!(Gate::new(0.2).decide(&result(&kb, 0.3)));
        assert!(!Gate::new(0.9).decide(&result(&kb, 0.3)));
    }

    #[test]
    fn validate_bounds() {
        assert!(Gate::default().validate().is_ok());
        assert!(Gate::new(0.0).validate().is_ok());
        assert!(Gate::new(1.0).validate().is_ok());
        assert!(Gate::new(1.5).validate().is_err());
        assert!(Gate::new(-0.1).validate().is_err());
        assert!(Gate::new(f32::NAN).validate().is_err());
    }
}
