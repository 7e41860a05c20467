//! Keyword clustering: multi-label assignment by case-insensitive substring
//! match, with per-cluster term, bigram, and intent statistics.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{ClusterSummary, MergedItem};
use crate::text::{bigrams, tokenize, top_terms};

/// Fixed vocabulary counted per cluster as a coarse content-type signal.
pub const INTENT_TAGS: &[&str] = &[
    "worksheet", "prompts", "pdf", "undated", "bundle", "printable",
];

/// Cluster id for a keyword: internal spaces become underscores. The label
/// is the inverse mapping.
pub fn keyword_id(keyword: &str) -> String {
    keyword.replace(' ', "_")
}

/// Cluster ids for every keyword appearing as a case-insensitive substring
/// of `text`. Multi-label: an item may match any number of keywords, or none.
pub fn assign_clusters(text: &str, keywords: &[String]) -> Vec<String> {
    let lowered = text.to_lowercase();
    keywords
        .iter()
        .filter(|keyword| lowered.contains(keyword.as_str()))
        .map(|keyword| keyword_id(keyword))
        .collect()
}

#[derive(Default)]
struct ClusterBuilder {
    label: String,
    member_ids: Vec<String>,
    tokens: Vec<String>,
    bigrams: Vec<String>,
    intent_counts: BTreeMap<String, u64>,
}

impl ClusterBuilder {
    fn finish(self, cluster_id: String) -> ClusterSummary {
        ClusterSummary {
            cluster_id,
            label: self.label,
            count: self.member_ids.len(),
            member_ids: self.member_ids,
            top_terms: top_terms(self.tokens.iter().map(String::as_str), 10),
            top_bigrams: top_terms(self.bigrams.iter().map(String::as_str), 10),
            intent_counts: self.intent_counts,
        }
    }
}

/// Assigns every item to its keyword clusters (writing `cluster_ids` in
/// place) and accumulates per-cluster statistics. Items matching no keyword
/// stay in the dataset with empty membership. Clusters are emitted sorted by
/// `cluster_id`; member order follows item processing order.
pub fn build_clusters(items: &mut [MergedItem], keywords: &[String]) -> Vec<ClusterSummary> {
    let mut builders: BTreeMap<String, ClusterBuilder> = BTreeMap::new();

    for item in items.iter_mut() {
        let text = format!("{} {}", item.title, item.snippet);
        let cluster_ids = assign_clusters(&text, keywords);
        item.cluster_ids = cluster_ids.clone();

        let tokens = tokenize(&text);
        let pairs = bigrams(&tokens);
        let lowered = text.to_lowercase();
        // a tag counts once per member containing it
        let intents: Vec<&str> = INTENT_TAGS
            .iter()
            .copied()
            .filter(|tag| lowered.contains(tag))
            .collect();

        for cluster_id in cluster_ids {
            let builder = builders.entry(cluster_id.clone()).or_default();
            builder.label = cluster_id.replace('_', " ");
            builder.member_ids.push(item.id.clone());
            builder.tokens.extend(tokens.iter().cloned());
            builder.bigrams.extend(pairs.iter().cloned());
            for tag in &intents {
                *builder.intent_counts.entry((*tag).to_string()).or_default() += 1;
            }
        }
    }

    let clusters: Vec<ClusterSummary> = builders
        .into_iter()
        .map(|(cluster_id, builder)| builder.finish(cluster_id))
        .collect();
    debug!(
        "Clustering completed - items={}, keywords={}, clusters={}",
        items.len(),
        keywords.len(),
        clusters.len()
    );
    clusters
}
