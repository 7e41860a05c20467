use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One observation of a URL returned by one engine for one query. Immutable
/// once produced by a collector. `raw_metadata` is an opaque bag of
/// collector-specific fields the pipeline passes through without inspecting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub query: String,
    pub engine: String,
    pub rank: u32,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    pub timestamp: String, // ISO-8601 UTC, stamped by the caller
    #[serde(default)]
    pub raw_metadata: Map<String, Value>,
}

/// A raw record plus its derived canonical URL, one-to-one with the input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub query: String,
    pub engine: String,
    pub rank: u32,
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub timestamp: String,
    pub canonical_url: String,
    #[serde(default)]
    pub raw_metadata: Map<String, Value>,
}

/// The unit of deduplicated output. `best_rank` only decreases over the
/// item's lifetime and `engines` only grows; `cluster_ids` stays empty until
/// the clustering pass fills it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedItem {
    pub id: String,
    pub canonical_url: String,
    pub title: String,
    pub snippet: String,
    pub engines: Vec<String>,
    pub best_rank: u32,
    pub cluster_ids: Vec<String>,
    pub timestamp: String, // of the observation providing best_rank
}

/// Per-keyword cluster with aggregated term statistics. Membership is
/// many-to-many: one item may appear in several clusters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster_id: String,
    pub label: String,
    pub member_ids: Vec<String>,
    pub count: usize,
    pub top_terms: Vec<String>,
    pub top_bigrams: Vec<String>,
    pub intent_counts: BTreeMap<String, u64>,
}

/// Corpus-wide term and bigram frequencies, one per pipeline run.
/// Serializes entries as `["term", count]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermsSummary {
    pub global_top_terms: Vec<(String, u64)>,
    pub global_top_bigrams: Vec<(String, u64)>,
}
