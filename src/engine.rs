use std::sync::{Arc, RwLock};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, warn};

use crate::embed::Embedder;
use crate::error::{MatchError, PolicyError};
use crate::metrics::{MetricsAggregator, MetricsSnapshot};
use crate::ranker::rank;
use crate::store::KnowledgeBase;
use crate::types::{MatchPolicy, MatchResult, NoMatchReason, Verdict};


/// Run rank → calibrate → decide for one query. Pure: no logging, no metrics.
pub fn score_query<'kb>(
    query: &[f32],
    store: &'kb KnowledgeBase,
    policy: &MatchPolicy,
) -> Result<MatchResult<'kb>, MatchError> {
    let Some(candidate) = rank(query, store)? else {
        return Ok(MatchResult::no_candidate());
    };
    let confidence = policy.calibration.calibrate(candidate.similarity)?;
    let mut result = MatchResult {
        record: Some(candidate.record),
        raw_similarity: Some(candidate.similarity),
        confidence,
        accepted: false,
    };
    result.accepted = policy.gate.decide(&result);
    Ok(result)
}

/// Summary of what the engine is serving.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EngineStatus {
    pub records: usize,
    pub dimensionality: Option<usize>,
    pub ready: bool,
    pub policy: MatchPolicy,
}

/// Retrieval engine: a loaded knowledge base, a swappable policy and the
/// request metrics.
///
/// `Engine` is `Send + Sync`; share it behind an `Arc` across request handlers.
#[derive(Debug)]
pub struct Engine {
    knowledge: Arc<KnowledgeBase>,
    policy: RwLock<MatchPolicy>,
    metrics: MetricsAggregator,
}

impl Engine {
    /// Construct an engine over a loaded knowledge base.
    pub fn new(knowledge: KnowledgeBase, policy: MatchPolicy) -> Result<Self, PolicyError> {
        Self::with_knowledge_arc(Arc::new(knowledge), policy)
    }

    /// Construct an engine over a shared knowledge base handle.
    pub fn with_knowledge_arc(
        knowledge: Arc<KnowledgeBase>,
        policy: MatchPolicy,
    ) -> Result<Self, PolicyError> {
        policy.validate().map_err(PolicyError)?;
        Ok(Self {
            knowledge,
            policy: RwLock::new(policy),
            metrics: MetricsAggregator::new(),
        })
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn policy(&self) -> MatchPolicy {
        *self
            .policy
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Swap calibration and threshold. The knowledge base is untouched.
    pub fn set_policy(&self, policy: MatchPolicy) -> Result<(), PolicyError> {
        policy.validate().map_err(PolicyError)?;
        let mut guard = self
            .policy
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = policy;
        Ok(())
    }

    /// Match a query vector and record the outcome.
    ///
    /// Per-request failures are returned to the caller and counted as
    /// degraded requests.
    pub fn evaluate(&self, query: &[f32]) -> Result<MatchResult<'_>, MatchError> {
        self.evaluate_since(query, Instant::now())
    }

    fn evaluate_since(&self, query: &[f32], start: Instant) -> Result<MatchResult<'_>, MatchError> {
        let policy = self.policy();
        match score_query(query, &self.knowledge, &policy) {
            Ok(result) => {
                let elapsed = start.elapsed();
                self.metrics.record(&result, elapsed);
                debug!(
                    candidate = ?result.candidate_id(),
                    similarity = ?result.raw_similarity,
                    confidence = result.confidence,
                    accepted = result.accepted,
                    elapsed_micros = elapsed.as_micros(),
                    "match_evaluated"
                );
                Ok(result)
            }
            Err(err) => {
                let elapsed = start.elapsed();
                self.metrics.record_degraded(elapsed);
                warn!(error = %err, elapsed_micros = elapsed.as_micros(), "match_degraded");
                Err(err)
            }
        }
    }

    /// Caller-facing lookup. Never fails: errors become
    /// [`Verdict::NoSolution`] with the matching [`NoMatchReason`].
    pub fn find_solution(&self, query: &[f32]) -> Verdict<'_> {
        self.verdict_since(query, Instant::now())
    }

    fn verdict_since(&self, query: &[f32], start: Instant) -> Verdict<'_> {
        match self.evaluate_since(query, start) {
            Ok(result) => result.verdict(),
            Err(err) => Verdict::degraded(reason_for(&err)),
        }
    }

    /// Embed a free-text report and look it up.
    pub fn analyze(&self, text: &str, embedder: &dyn Embedder) -> Verdict<'_> {
        let start = Instant::now();
        match embedder.embed(text) {
            Ok(query) => self.verdict_since(&query, start),
            Err(err) => {
                let elapsed = start.elapsed();
                self.metrics.record_degraded(elapsed);
                warn!(error = %err, elapsed_micros = elapsed.as_micros(), "embedding_failed");
                Verdict::degraded(NoMatchReason::EmbeddingFailed)
            }
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            records: self.knowledge.len(),
            dimensionality: self.knowledge.dimensionality(),
            ready: !self.knowledge.is_empty(),
            policy: self.policy(),
        }
    }
}

fn reason_for(err: &MatchError) -> NoMatchReason {
    match err {
        MatchError::DimensionMismatch { .. } => NoMatchReason::DimensionMismatch,
        MatchError::InvalidScore(_) => NoMatchReason::InvalidScore,
        MatchError::Embedding(_) => NoMatchReason::EmbeddingFailed,
    }
}
