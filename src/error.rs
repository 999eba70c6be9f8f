use thiserror::Error;

/// Failures while building the knowledge base. Any of these is fatal: the
/// engine never serves from a partially loaded store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// No records were supplied and the caller did not opt into an empty store.
    #[error("knowledge base is empty")]
    Empty,
    /// The first record established a zero-length embedding.
    #[error("record {index} has an empty embedding")]
    ZeroDimension { index: usize },
    /// A record disagrees with the dimensionality set by the first record.
    #[error("record {index} has dimensionality {actual}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
    /// Embeddings must be finite so that similarity stays well defined.
    #[error("record {index} has a non-finite embedding component at position {position}")]
    NonFiniteEmbedding { index: usize, position: usize },
    /// A required payload field is missing or blank.
    #[error("record {index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },
    /// The embedding collaborator failed while the store was being built.
    #[error("failed to embed record {index}: {source}")]
    Embedding {
        index: usize,
        #[source]
        source: EmbedError,
    },
}

/// Per-request failures. None of these affect engine state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    /// Query vector length disagrees with the store.
    #[error("query has dimensionality {actual}, store expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// A non-finite similarity reached calibration.
    #[error("similarity score {0} is not a finite number")]
    InvalidScore(f32),
    /// The embedding collaborator failed on the query text.
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbedError),
}

/// Rejected matching policy (calibration or gate parameters).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid match policy: {0}")]
pub struct PolicyError(pub String);

/// Errors surfaced by an [`Embedder`](crate::Embedder).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmbedError {
    /// Nothing to embed.
    #[error("input text is empty")]
    EmptyInput,
    /// Backend-specific failure.
    #[error("embedding backend failure: {0}")]
    Backend(String),
}
