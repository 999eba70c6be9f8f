use serde::{Deserialize, Serialize};

use crate::calibrate::Calibration;
use crate::gate::Gate;
use crate::store::{KnowledgeRecord, RecordId, Solution};

/// Runtime matching policy: calibration curve plus acceptance threshold.
///
/// Cheap to copy, so the engine hands a snapshot to each request and can swap
/// the policy without touching the knowledge base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchPolicy {
    #[serde(default)]
    pub calibration: Calibration,
    #[serde(default)]
    pub gate: Gate,
}

impl MatchPolicy {
    pub fn validate(&self) -> Result<(), String> {
        self.calibration.validate()?;
        self.gate.validate()
    }
}

/// Outcome of one rank → calibrate → decide pass.
///
/// A rejected result still names the candidate so it can be logged, but
/// callers should go through [`MatchResult::verdict`] before showing anything
/// to a user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult<'kb> {
    pub record: Option<&'kb KnowledgeRecord>,
    pub raw_similarity: Option<f32>,
    pub confidence: f32,
    pub accepted: bool,
}

impl<'kb> MatchResult<'kb> {
    /// Result for a store with nothing to match against.
    pub fn no_candidate() -> Self {
        Self {
            record: None,
            raw_similarity: None,
            confidence: 0.0,
            accepted: false,
        }
    }

    pub fn candidate_id(&self) -> Option<RecordId> {
        self.record.map(KnowledgeRecord::id)
    }

    /// Caller-facing view. Only accepted results expose the payload.
    pub fn verdict(&self) -> Verdict<'kb> {
        match self.record {
            Some(record) if self.accepted => Verdict::Solution(SolutionMatch {
                id: record.id(),
                solution: record.payload(),
                confidence: self.confidence,
                similarity: self.raw_similarity.unwrap_or_default(),
            }),
            Some(record) => Verdict::NoSolution {
                reason: NoMatchReason::BelowThreshold,
                best_candidate: Some(record.id()),
                confidence: Some(self.confidence),
            },
            None => Verdict::NoSolution {
                reason: NoMatchReason::EmptyKnowledgeBase,
                best_candidate: None,
                confidence: None,
            },
        }
    }
}

/// An accepted match as surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolutionMatch<'kb> {
    pub id: RecordId,
    pub solution: &'kb Solution,
    pub confidence: f32,
    pub similarity: f32,
}

/// Why no solution was surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoMatchReason {
    EmptyKnowledgeBase,
    BelowThreshold,
    DimensionMismatch,
    InvalidScore,
    EmbeddingFailed,
}

/// Caller-facing answer. `NoSolution` never carries a payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict<'kb> {
    Solution(SolutionMatch<'kb>),
    NoSolution {
        reason: NoMatchReason,
        /// Best candidate for diagnostics only.
        best_candidate: Option<RecordId>,
        confidence: Option<f32>,
    },
}

impl<'kb> Verdict<'kb> {
    pub(crate) fn degraded(reason: NoMatchReason) -> Self {
        Verdict::NoSolution {
            reason,
            best_candidate: None,
            confidence: None,
        }
    }

    pub fn solution(&self) -> Option<&SolutionMatch<'kb>> {
        match self {
            Verdict::Solution(hit) => Some(hit),
            Verdict::NoSolution { .. } => None,
        }
    }

    pub fn is_solution(&self) -> bool {
        matches!(self, Verdict::Solution(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KnowledgeBase, LoadOptions, NewRecord};

    fn kb() -> KnowledgeBase {
        KnowledgeBase::load(
            vec![NewRecord::new(
                vec![1.0, 0.0],
                Solution {
                    title: "Fix it".into(),
                    solution: "s".into(),
                    code_example: "c".into(),
                    source: "docs".into(),
                    ..Default::default()
                },
            )],
            LoadOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn accepted_result_exposes_payload() {
        let kb = kb();
        let result = MatchResult {
            record: kb.all_records().first(),
            raw_similarity: Some(0.95),
            confidence: 0.99,
            accepted: true,
        };
        let verdict = result.verdict();
        let hit = verdict.solution().expect("solution");
        assert_eq!(hit.solution.title, "Fix it");
        assert_eq!(hit.id, RecordId(0));
    }

    #[test]
    fn rejected_result_hides_payload() {
        let kb = kb();
        let result = MatchResult {
            record: kb.all_records().first(),
            raw_similarity: Some(0.2),
            confidence: 0.05,
            accepted: false,
        };
        assert_eq!(result.candidate_id(), Some(RecordId(0)));
        assert_eq!(
            result.verdict(),
            Verdict::NoSolution {
                reason: NoMatchReason::BelowThreshold,
                best_candidate: Some(RecordId(0)),
                confidence: Some(0.05),
            }
        );
        let json = serde_json::to_value(result.verdict()).unwrap();
        assert_eq!(json["status"], "no_solution");
        assert!(json.get("solution").is_none());
    }

    #[test]
    fn no_candidate_verdict() {
        assert_eq!(
            MatchResult::no_candidate().verdict(),
            Verdict::NoSolution {
                reason: NoMatchReason::EmptyKnowledgeBase,
                best_candidate: None,
                confidence: None,
            }
        );
    }

    #[test]
    fn default_policy_is_valid() {
        let policy = MatchPolicy::default();
        assert!(policy.validate().is_ok());
        assert_eq!(policy.gate.threshold, 0.5);
        assert_eq!(policy.calibration.midpoint, 0.5);
        assert_eq!(policy.calibration.steepness, 10.0);
    }
}
