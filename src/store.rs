//! In-memory knowledge base of curated issue/solution pairs.
//!
//! The store is built once at start-up and never mutated afterwards, so it can
//! be shared behind an `Arc` and read from any number of threads without
//! synchronization.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::embed::Embedder;
use crate::error::SchemaError;
use crate::ranker::l2_norm;

/// Stable identifier assigned to a record at load time.
///
/// Identifiers follow input order, so the lowest id is also the earliest
/// record. The ranker relies on this for its tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kb-{}", self.0)
    }
}

/// Solution payload returned to callers on an accepted match.
///
/// Field layout mirrors the JSON documents the knowledge base is authored in.
/// String fields default to empty so a missing field surfaces as a
/// [`SchemaError::MissingField`] instead of an opaque parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    #[serde(default)]
    pub title: String,
    /// Canonical issue description; this is the text that gets embedded.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub solution: String,
    #[serde(default)]
    pub code_example: String,
    /// Provenance of the solution (docs page, article, ...).
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Solution {
    fn missing_field(&self) -> Option<&'static str> {
        [
            ("title", &self.title),
            ("solution", &self.solution),
            ("code_example", &self.code_example),
            ("source", &self.source),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

/// A record handed to [`KnowledgeBase::load`] before it has an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub embedding: Vec<f32>,
    pub payload: Solution,
}

impl NewRecord {
    pub fn new(embedding: Vec<f32>, payload: Solution) -> Self {
        Self { embedding, payload }
    }
}

/// A loaded, immutable knowledge base entry.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeRecord {
    id: RecordId,
    embedding: Vec<f32>,
    norm: f64,
    payload: Solution,
}

impl KnowledgeRecord {
    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    /// L2 norm of the embedding, computed once at load.
    pub fn norm(&self) -> f64 {
        self.norm
    }

    pub fn payload(&self) -> &Solution {
        &self.payload
    }
}

/// Options controlling how strict [`KnowledgeBase::load`] is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Accept an empty record set. The resulting store answers every query
    /// with "no candidate".
    #[serde(default)]
    pub allow_empty: bool,
}

impl LoadOptions {
    pub fn allow_empty() -> Self {
        Self { allow_empty: true }
    }
}

/// Immutable collection of [`KnowledgeRecord`]s sharing one dimensionality.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    records: Vec<KnowledgeRecord>,
    dimensionality: Option<usize>,
}

impl KnowledgeBase {
    /// Validate and load records, assigning ids in input order.
    pub fn load(records: Vec<NewRecord>, options: LoadOptions) -> Result<Self, SchemaError> {
        let start = Instant::now();
        if records.is_empty() {
            if options.allow_empty {
                info!("knowledge base loaded empty; all queries will report no candidate");
                return Ok(Self::default());
            }
            return Err(SchemaError::Empty);
        }

        let expected = records[0].embedding.len();
        if expected == 0 {
            return Err(SchemaError::ZeroDimension { index: 0 });
        }

        let mut loaded = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let actual = record.embedding.len();
            if actual != expected {
                return Err(SchemaError::DimensionMismatch {
                    index,
                    expected,
                    actual,
                });
            }
            if let Some(position) = record.embedding.iter().position(|v| !v.is_finite()) {
                return Err(SchemaError::NonFiniteEmbedding { index, position });
            }
            if let Some(field) = record.payload.missing_field() {
                return Err(SchemaError::MissingField { index, field });
            }
            loaded.push(KnowledgeRecord {
                id: RecordId(index as u64),
                norm: l2_norm(&record.embedding),
                embedding: record.embedding,
                payload: record.payload,
            });
        }

        info!(
            records = loaded.len(),
            dimensionality = expected,
            elapsed_micros = start.elapsed().as_micros(),
            "knowledge_base_loaded"
        );

        Ok(Self {
            records: loaded,
            dimensionality: Some(expected),
        })
    }

    /// Embed each document's description and load the result.
    ///
    /// Every document must carry a non-blank description; the embedder's
    /// dimensionality becomes the store's.
    pub fn build(
        docs: Vec<Solution>,
        embedder: &dyn Embedder,
        options: LoadOptions,
    ) -> Result<Self, SchemaError> {
        let mut records = Vec::with_capacity(docs.len());
        for (index, doc) in docs.into_iter().enumerate() {
            if doc.description.trim().is_empty() {
                return Err(SchemaError::MissingField {
                    index,
                    field: "description",
                });
            }
            let embedding = embedder
                .embed(&doc.description)
                .map_err(|source| SchemaError::Embedding { index, source })?;
            records.push(NewRecord::new(embedding, doc));
        }
        Self::load(records, options)
    }

    /// Records in id order.
    pub fn all_records(&self) -> &[KnowledgeRecord] {
        &self.records
    }

    /// Embedding length shared by every record; `None` for an empty store.
    pub fn dimensionality(&self) -> Option<usize> {
        self.dimensionality
    }

    pub fn get(&self, id: RecordId) -> Option<&KnowledgeRecord> {
        // Ids are dense indices into `records`.
        usize::try_from(id.0)
            .ok()
            .and_then(|idx| self.records.get(idx))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
