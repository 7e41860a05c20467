//! serp-sift turns raw web-search result records into a deduplicated,
//! clustered, term-summarized dataset.
//!
//! The pipeline core is synchronous and in-memory: URL canonicalization
//! ([`canonicalize`]), exact- and near-duplicate merging ([`dedupe`]),
//! host filtering ([`filters`]), keyword clustering ([`cluster`]), and
//! corpus-wide term aggregation ([`terms`]). Collectors ([`fetch`]) and the
//! CLI binary sit outside the core and own all I/O, HTTP, and timestamps.

pub mod canonicalize;
pub mod cluster;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod fetch;
pub mod filters;
pub mod models;
pub mod terms;
pub mod text;

pub use error::PipelineError;
pub use models::{CanonicalRecord, ClusterSummary, MergedItem, RawRecord, TermsSummary};
