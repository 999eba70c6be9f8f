//! Linear-scan cosine ranking over the knowledge base.
//!
//! The curated store holds tens to low hundreds of records; every query is
//! an exact scan over all of them.

use crate::error::MatchError;
use crate::store::{KnowledgeBase, KnowledgeRecord};

/// Chunk size for auto-vectorized dot products.
const SIMD_CHUNK_SIZE: usize = 32;

/// Best record for a query together with its raw cosine similarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'kb> {
    pub record: &'kb KnowledgeRecord,
    /// Cosine similarity in [-1, 1], or non-finite if the query was.
    pub similarity: f32,
}

/// Find the most similar record to `query`.
///
/// Returns `Ok(None)` for an empty store. Ties go to the lowest record id.
pub fn rank<'kb>(
    query: &[f32],
    store: &'kb KnowledgeBase,
) -> Result<Option<Candidate<'kb>>, MatchError> {
    let Some(expected) = store.dimensionality() else {
        return Ok(None);
    };
    if query.len() != expected {
        return Err(MatchError::DimensionMismatch {
            expected,
            actual: query.len(),
        });
    }

    let query_norm = l2_norm(query);
    let mut best: Option<Candidate<'kb>> = None;

    // Records are stored in ascending id order; only a strictly greater score
    // displaces the current best, which keeps the lowest id on ties.
    for record in store.all_records() {
        let similarity = cosine_with_norms(query, query_norm, record.embedding(), record.norm());
        let replace = match best {
            None => true,
            Some(current) => {
                similarity > current.similarity
                    || (!current.similarity.is_finite() && similarity.is_finite())
            }
        };
        if replace {
            best = Some(Candidate { record, similarity });
        }
    }

    Ok(best)
}

/// Cosine similarity between two equal-length vectors, clamped to [-1, 1].
///
/// A zero-norm operand yields 0.0 rather than a division by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    cosine_with_norms(a, l2_norm(a), b, l2_norm(b))
}

/// Euclidean norm accumulated in f64. Squares of any finite f32 stay finite
/// and non-zero in f64, so the norm is zero only for the zero vector.
#[inline]
pub(crate) fn l2_norm(v: &[f32]) -> f64 {
    dot(v, v).sqrt()
}

#[inline]
fn cosine_with_norms(
    query: &[f32],
    query_norm: f64,
    candidate: &[f32],
    candidate_norm: f64,
) -> f32 {
    // A non-finite query scores NaN against every record, zero vectors included.
    if !query_norm.is_finite() {
        return f32::NAN;
    }
    if query_norm == 0.0 || candidate_norm == 0.0 {
        return 0.0;
    }
    // clamp keeps NaN as NaN so calibration can reject it
    (dot(query, candidate) / (query_norm * candidate_norm)).clamp(-1.0, 1.0) as f32
}

#[inline]
fn dot(a: &[f32], b: &[f32]) -> f64 {
    let mut chunks_a = a.chunks_exact(SIMD_CHUNK_SIZE);
    let mut chunks_b = b.chunks_exact(SIMD_CHUNK_SIZE);
    let mut sum = 0.0f64;
    for (ca, cb) in chunks_a.by_ref().zip(chunks_b.by_ref()) {
        sum += dot_chunk(ca, cb);
    }
    sum + dot_chunk(chunks_a.remainder(), chunks_b.remainder())
}

#[inline(always)]
fn dot_chunk(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum()
}
