//! End-to-end pipeline runs over an in-memory record set: determinism and
//! cross-stage consistency.

use serp_sift::cluster::build_clusters;
use serp_sift::dedupe::{dedupe_records, normalize_record};
use serp_sift::filters::{apply_domain_filters, DomainFilters, DomainRuleGroup};
use serp_sift::models::RawRecord;
use serp_sift::terms::aggregate_terms;

fn record(engine: &str, rank: u32, url: &str, title: &str, snippet: &str) -> RawRecord {
    RawRecord {
        query: "anxiety journal".to_string(),
        engine: engine.to_string(),
        rank,
        url: url.to_string(),
        title: title.to_string(),
        snippet: snippet.to_string(),
        timestamp: "2026-02-06T10:30:00Z".to_string(),
        raw_metadata: Default::default(),
    }
}

fn corpus() -> Vec<RawRecord> {
    vec![
        record(
            "searxng",
            2,
            "https://www.example.com/page?utm_source=x",
            "Anxiety Journal PDF",
            "Printable anxiety prompts",
        ),
        record(
            "brave",
            1,
            "https://example.com/page",
            "Anxiety Journal PDF",
            "Printable anxiety prompts",
        ),
        record(
            "searxng",
            3,
            "https://example.com/shadow",
            "Shadow work prompt journal",
            "Gratitude worksheet bundle",
        ),
        record(
            "brave",
            4,
            "https://pinterest.com/pin/123",
            "Anxiety journal board",
            "pins about printable journals",
        ),
        record(
            "searxng",
            5,
            "https://blog.example.org/post//deep/",
            "Mindfulness journal guide",
            "Undated pdf worksheet",
        ),
    ]
}

fn run_pipeline(records: Vec<RawRecord>) -> (String, String, String) {
    let normalized: Vec<_> = records
        .into_iter()
        .map(|r| normalize_record(r).unwrap())
        .collect();
    let deduped = dedupe_records(normalized, 0.85).unwrap();

    let mut exclude = std::collections::BTreeMap::new();
    exclude.insert(
        "social".to_string(),
        DomainRuleGroup {
            enabled: true,
            domains: vec!["pinterest.com".to_string()],
        },
    );
    let filters = DomainFilters {
        include: Vec::new(),
        exclude,
    };
    let mut filtered = apply_domain_filters(deduped, &filters);

    let keywords = vec![
        "anxiety".to_string(),
        "shadow work".to_string(),
        "gratitude".to_string(),
        "mindfulness".to_string(),
    ];
    let clusters = build_clusters(&mut filtered, &keywords);
    let terms = aggregate_terms(&filtered, 20).unwrap();

    (
        serde_json::to_string_pretty(&filtered).unwrap(),
        serde_json::to_string_pretty(&clusters).unwrap(),
        serde_json::to_string_pretty(&terms).unwrap(),
    )
}

#[test]
fn rerun_is_byte_identical() {
    let first = run_pipeline(corpus());
    let second = run_pipeline(corpus());
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
    assert_eq!(first.2, second.2);
}

#[test]
fn pipeline_end_to_end() {
    let (items_json, clusters_json, terms_json) = run_pipeline(corpus());
    let items: Vec<serp_sift::MergedItem> = serde_json::from_str(&items_json).unwrap();
    let clusters: Vec<serp_sift::ClusterSummary> = serde_json::from_str(&clusters_json).unwrap();
    let terms: serp_sift::TermsSummary = serde_json::from_str(&terms_json).unwrap();

    // pinterest host filtered out; the two example.com/page variants collapse
    assert_eq!(items.len(), 3);
    let first = &items[0];
    assert_eq!(first.canonical_url, "https://example.com/page");
    assert_eq!(first.best_rank, 1);
    assert!(first.engines.contains(&"searxng".to_string()));
    assert!(first.engines.contains(&"brave".to_string()));

    // multi-label membership: the shadow item carries both keyword clusters
    let shadow = items
        .iter()
        .find(|i| i.canonical_url == "https://example.com/shadow")
        .unwrap();
    assert!(shadow.cluster_ids.contains(&"shadow_work".to_string()));
    assert!(shadow.cluster_ids.contains(&"gratitude".to_string()));

    // clusters sorted by id, memberships consistent with item labels
    let ids: Vec<&str> = clusters.iter().map(|c| c.cluster_id.as_str()).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
    for cluster in &clusters {
        assert_eq!(cluster.count, cluster.member_ids.len());
        for member in &cluster.member_ids {
            let item = items.iter().find(|i| &i.id == member).unwrap();
            assert!(item.cluster_ids.contains(&cluster.cluster_id));
        }
    }

    // intent tags show up where expected
    let shadow_cluster = clusters
        .iter()
        .find(|c| c.cluster_id == "shadow_work")
        .unwrap();
    assert_eq!(shadow_cluster.intent_counts["worksheet"], 1);
    assert_eq!(shadow_cluster.intent_counts["bundle"], 1);

    // stop words never reach the global summary
    assert!(terms
        .global_top_terms
        .iter()
        .all(|(t, _)| !serp_sift::text::STOPWORDS.contains(&t.as_str())));
}
