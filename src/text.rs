//! Tokenization and term-frequency primitives shared by deduplication,
//! clustering, and aggregation.

use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;

/// Fixed stop-word set removed from every token stream.
pub const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "best", "by", "for", "from",
    "guide", "in", "is", "it", "new", "of", "on", "or", "that", "the",
    "this", "to", "with", "you", "your",
];

/// Lowercased alphanumeric tokens in original order, stop words removed.
/// Token boundaries fall at every non-alphanumeric character.
pub fn tokenize(text: &str) -> Vec<String> {
    let folded = text.nfc().collect::<String>().to_lowercase();
    folded
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty() && !STOPWORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// `"t_i t_i+1"` for each adjacent token pair. Empty or single-token input
/// yields an empty sequence.
pub fn bigrams(tokens: &[String]) -> Vec<String> {
    tokens
        .windows(2)
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .collect()
}

/// Counter entries ranked by frequency descending, ties broken
/// lexicographically ascending. The single ranking rule used everywhere.
pub fn ranked_counts(counter: &HashMap<String, u64>) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = counter
        .iter()
        .map(|(term, count)| (term.clone(), *count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

/// The `limit` most frequent terms of a token stream.
pub fn top_terms<'a, I>(tokens: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counter: HashMap<String, u64> = HashMap::new();
    for token in tokens {
        *counter.entry(token.to_string()).or_default() += 1;
    }
    ranked_counts(&counter)
        .into_iter()
        .take(limit)
        .map(|(term, _)| term)
        .collect()
}

/// Candidate follow-up phrases for query expansion: 2-4 token n-grams that
/// contain an anchor term as a substring, ranked by occurrence count.
pub fn extract_phrases(
    texts: &[String],
    anchor_terms: &[String],
    max_followups: usize,
) -> Vec<String> {
    let mut counter: HashMap<String, u64> = HashMap::new();
    for text in texts {
        let tokens = tokenize(text);
        for size in 2..=4usize {
            if tokens.len() < size {
                continue;
            }
            for window in tokens.windows(size) {
                let phrase = window.join(" ");
                if anchor_terms.iter().any(|a| phrase.contains(a.as_str())) {
                    *counter.entry(phrase).or_default() += 1;
                }
            }
        }
    }
    ranked_counts(&counter)
        .into_iter()
        .take(max_followups)
        .map(|(phrase, _)| phrase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_splits_on_punctuation() {
        let tokens = tokenize("Shadow-Work: Prompt Journal!");
        assert_eq!(tokens, vec!["shadow", "work", "prompt", "journal"]);
    }

    #[test]
    fn tokenize_drops_stopwords_and_preserves_order() {
        let tokens = tokenize("The guide to a printable journal");
        assert_eq!(tokens, vec!["printable", "journal"]);
    }

    #[test]
    fn bigrams_of_short_input_are_empty() {
        assert!(bigrams(&[]).is_empty());
        assert!(bigrams(&["alone".to_string()]).is_empty());
    }

    #[test]
    fn bigrams_join_adjacent_tokens() {
        let tokens = tokenize("anxiety journal pdf");
        assert_eq!(bigrams(&tokens), vec!["anxiety journal", "journal pdf"]);
    }

    #[test]
    fn ranking_breaks_ties_lexicographically() {
        let tokens = vec!["b", "a", "c", "c"];
        let top = top_terms(tokens, 2);
        assert_eq!(top, vec!["c", "a"]);
    }

    #[test]
    fn extract_phrases_requires_anchor_substring() {
        let texts = vec![
            "gratitude journal prompts daily".to_string(),
            "gratitude journal prompts weekly".to_string(),
        ];
        let anchors = vec!["journal".to_string()];
        let phrases = extract_phrases(&texts, &anchors, 3);
        assert_eq!(phrases[0], "gratitude journal");
        assert!(phrases.iter().all(|p| p.contains("journal")));
    }
}
