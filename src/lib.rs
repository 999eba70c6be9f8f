//! # CodeFix (`codefix`)
//!
//! ## Purpose
//!
//! `codefix` matches a free-text problem report against a small curated
//! knowledge base of known issue/solution pairs. It ranks the report's
//! embedding against every stored embedding by cosine similarity, calibrates
//! the best score into a confidence, and only surfaces the solution when that
//! confidence clears a threshold. Otherwise the caller gets an explicit
//! "no solution" verdict.
//!
//! Each stage is a plain function and can be used on its own:
//! - [`KnowledgeBase::load`] validates records once at start-up.
//! - [`rank`] performs the linear cosine scan.
//! - [`Calibration::calibrate`] applies the logistic confidence curve.
//! - [`decide`] applies the acceptance threshold.
//! - [`MetricsAggregator`] keeps request counters and running averages.
//!
//! ## Core Types
//!
//! - [`Engine`]: wires the stages together, owns the metrics and a swappable
//!   [`MatchPolicy`].
//! - [`MatchResult`]: candidate, raw similarity, confidence, accepted flag.
//! - [`Verdict`]: caller-facing answer; rejected matches never expose their
//!   payload.
//! - [`Embedder`]: text-to-vector collaborator. [`HashingEmbedder`] is a
//!   deterministic stand-in for demos and tests.
//! - [`CodefixConfig`]: YAML configuration.
//!
//! ## Example Usage
//!
//! ```no_run
//! use codefix::{
//!     default_solutions, Engine, HashingEmbedder, KnowledgeBase, LoadOptions, MatchPolicy,
//! };
//!
//! let embedder = HashingEmbedder::default();
//! let kb = KnowledgeBase::build(default_solutions(), &embedder, LoadOptions::default())
//!     .expect("knowledge base");
//! let engine = Engine::new(kb, MatchPolicy::default()).expect("engine");
//!
//! let verdict = engine.analyze("useEffect keeps running in an infinite loop", &embedder);
//! match verdict.solution() {
//!     Some(hit) => println!("{} ({:.2})", hit.solution.title, hit.confidence),
//!     None => println!("no confident solution"),
//! }
//! println!("{:?}", engine.metrics());
//! ```
//!
//! ## Observability
//!
//! [`Engine::metrics`] returns a [`MetricsSnapshot`] suitable for rendering
//! verbatim on a status endpoint. The same counters are emitted through the
//! `metrics` facade, so installing any `metrics` recorder exports them.
//! Structured `tracing` events are emitted on load (`knowledge_base_loaded`),
//! per match (`match_evaluated`, debug level) and on degraded requests
//! (`match_degraded`, `embedding_failed`).

pub mod calibrate;
pub mod config;
pub mod defaults;
pub mod embed;
pub mod engine;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod ranker;
pub mod store;
pub mod types;

pub use crate::calibrate::Calibration;
pub use crate::config::{CodefixConfig, ConfigLoadError};
pub use crate::defaults::default_solutions;
pub use crate::embed::{Embedder, HashingEmbedder};
pub use crate::engine::{Engine, EngineStatus, score_query};
pub use crate::error::{EmbedError, MatchError, PolicyError, SchemaError};
pub use crate::gate::{Gate, decide};
pub use crate::metrics::{MetricsAggregator, MetricsSnapshot};
pub use crate::ranker::{Candidate, cosine_similarity, rank};
pub use crate::store::{KnowledgeBase, KnowledgeRecord, LoadOptions, NewRecord, RecordId, Solution};
pub use crate::types::{MatchPolicy, MatchResult, NoMatchReason, SolutionMatch, Verdict};
