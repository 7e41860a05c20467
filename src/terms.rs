//! Corpus-wide term and bigram aggregation over the filtered item set.

use std::collections::HashMap;

use tracing::debug;

use crate::error::PipelineError;
use crate::models::{MergedItem, TermsSummary};
use crate::text::{bigrams, ranked_counts, tokenize};

pub const DEFAULT_TERM_LIMIT: usize = 20;

/// Top `limit` terms and bigrams across every item's `title + " " + snippet`,
/// ranked by frequency descending with lexicographic tie-breaking.
pub fn aggregate_terms(
    items: &[MergedItem],
    limit: usize,
) -> Result<TermsSummary, PipelineError> {
    if limit == 0 {
        return Err(PipelineError::invalid_config(
            "term limit must be positive",
        ));
    }

    let mut term_counter: HashMap<String, u64> = HashMap::new();
    let mut bigram_counter: HashMap<String, u64> = HashMap::new();
    for item in items {
        let text = format!("{} {}", item.title, item.snippet);
        let tokens = tokenize(&text);
        for pair in bigrams(&tokens) {
            *bigram_counter.entry(pair).or_default() += 1;
        }
        for token in tokens {
            *term_counter.entry(token).or_default() += 1;
        }
    }

    debug!(
        "Term aggregation completed - items={}, distinct_terms={}, distinct_bigrams={}",
        items.len(),
        term_counter.len(),
        bigram_counter.len()
    );
    Ok(TermsSummary {
        global_top_terms: ranked_counts(&term_counter)
            .into_iter()
            .take(limit)
            .collect(),
        global_top_bigrams: ranked_counts(&bigram_counter)
            .into_iter()
            .take(limit)
            .collect(),
    })
}
