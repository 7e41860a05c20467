//! Two-phase record deduplication: exact canonical-URL merge, then a greedy
//! near-duplicate merge by token-set similarity.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

use crate::canonicalize::canonicalize_url;
use crate::error::PipelineError;
use crate::models::{CanonicalRecord, MergedItem, RawRecord};
use crate::text::tokenize;

/// Validates a raw record and attaches its canonical URL. Rejection is
/// per-record: a bad observation never poisons the rest of the batch.
pub fn normalize_record(record: RawRecord) -> Result<CanonicalRecord, PipelineError> {
    if record.url.trim().is_empty() {
        return Err(PipelineError::malformed("record has no url"));
    }
    if record.timestamp.trim().is_empty() {
        return Err(PipelineError::malformed("record has no timestamp"));
    }
    if record.rank == 0 {
        return Err(PipelineError::malformed("rank is 1-based; got 0"));
    }
    let canonical_url = canonicalize_url(&record.url)?;
    Ok(CanonicalRecord {
        query: record.query,
        engine: record.engine,
        rank: record.rank,
        url: record.url,
        title: record.title,
        snippet: record.snippet,
        timestamp: record.timestamp,
        canonical_url,
        raw_metadata: record.raw_metadata,
    })
}

fn item_id(canonical_url: &str) -> String {
    format!("{:016x}", xxh3_64(canonical_url.as_bytes()))
}

fn text_signature(title: &str, snippet: &str) -> BTreeSet<String> {
    tokenize(&format!("{} {}", title, snippet))
        .into_iter()
        .collect()
}

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let inter = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    if union == 0.0 {
        0.0
    } else {
        inter / union
    }
}

/// Collapses canonicalized records into merged items.
///
/// Phase 1 groups by canonical URL in first-seen order; within a group the
/// lowest rank wins, non-empty title/snippet from the winning observation
/// overwrite, and every distinct engine accumulates. Phase 2 walks the
/// phase-1 survivors in group-emission order and merges each into the first
/// already-accepted survivor whose text token-set similarity meets
/// `threshold`; first match wins, deliberately with no tie-break among
/// multiple qualifying survivors. Output is sorted by
/// `(best_rank, canonical_url)` for deterministic presentation.
pub fn dedupe_records(
    records: Vec<CanonicalRecord>,
    threshold: f64,
) -> Result<Vec<MergedItem>, PipelineError> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(PipelineError::invalid_config(format!(
            "similarity threshold must be within [0, 1]; got {threshold}"
        )));
    }
    let total = records.len();

    // phase 1: exact canonical merge, insertion-ordered grouping
    let mut groups: Vec<MergedItem> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for record in records {
        if let Some(&i) = index.get(&record.canonical_url) {
            let existing = &mut groups[i];
            if record.rank < existing.best_rank {
                existing.best_rank = record.rank;
                if !record.title.is_empty() {
                    existing.title = record.title;
                }
                if !record.snippet.is_empty() {
                    existing.snippet = record.snippet;
                }
                existing.timestamp = record.timestamp;
            }
            if !existing.engines.contains(&record.engine) {
                existing.engines.push(record.engine);
            }
        } else {
            index.insert(record.canonical_url.clone(), groups.len());
            groups.push(MergedItem {
                id: item_id(&record.canonical_url),
                canonical_url: record.canonical_url,
                title: record.title,
                snippet: record.snippet,
                engines: vec![record.engine],
                best_rank: record.rank,
                cluster_ids: Vec::new(),
                timestamp: record.timestamp,
            });
        }
    }
    let exact_groups = groups.len();

    // phase 2: greedy near-duplicate merge against accepted survivors
    let mut survivors: Vec<MergedItem> = Vec::new();
    let mut signatures: Vec<BTreeSet<String>> = Vec::new();
    for item in groups {
        let sig = text_signature(&item.title, &item.snippet);
        let mut merged = false;
        for (existing, existing_sig) in survivors.iter_mut().zip(signatures.iter_mut()) {
            if jaccard(&sig, existing_sig) < threshold {
                continue;
            }
            if item.best_rank < existing.best_rank {
                existing.best_rank = item.best_rank;
                if !item.title.is_empty() {
                    existing.title = item.title.clone();
                }
                if !item.snippet.is_empty() {
                    existing.snippet = item.snippet.clone();
                }
                existing.canonical_url = item.canonical_url.clone();
                existing.id = item.id.clone();
                existing.timestamp = item.timestamp.clone();
                // the survivor's text changed; later comparisons see it
                *existing_sig = text_signature(&existing.title, &existing.snippet);
            }
            for engine in &item.engines {
                if !existing.engines.contains(engine) {
                    existing.engines.push(engine.clone());
                }
            }
            merged = true;
            break;
        }
        if !merged {
            survivors.push(item);
            signatures.push(sig);
        }
    }

    survivors.sort_by(|a, b| {
        a.best_rank
            .cmp(&b.best_rank)
            .then_with(|| a.canonical_url.cmp(&b.canonical_url))
    });

    debug!(
        "Dedupe completed - records={}, exact_groups={}, survivors={}, threshold={}",
        total,
        exact_groups,
        survivors.len(),
        threshold
    );
    Ok(survivors)
}
