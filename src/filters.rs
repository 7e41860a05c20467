//! Host-based allow/deny filtering between deduplication and clustering.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::models::MergedItem;

/// A named, individually enable-able group of excluded hosts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainRuleGroup {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub domains: Vec<String>,
}

/// Include allow-list (empty = allow all) plus named exclude groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainFilters {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: BTreeMap<String, DomainRuleGroup>,
}

/// Drops items whose canonical-URL host is not allowed or is denied. Only
/// groups with `enabled: true` contribute to the deny set.
pub fn apply_domain_filters(items: Vec<MergedItem>, filters: &DomainFilters) -> Vec<MergedItem> {
    let include: BTreeSet<&str> = filters.include.iter().map(String::as_str).collect();
    let exclude: BTreeSet<&str> = filters
        .exclude
        .values()
        .filter(|group| group.enabled)
        .flat_map(|group| group.domains.iter().map(String::as_str))
        .collect();

    let before = items.len();
    let kept: Vec<MergedItem> = items
        .into_iter()
        .filter(|item| {
            let host = item_host(&item.canonical_url);
            if !include.is_empty() && !include.contains(host.as_str()) {
                return false;
            }
            !exclude.contains(host.as_str())
        })
        .collect();
    debug!("Domain filter applied - before={}, after={}", before, kept.len());
    kept
}

fn item_host(canonical_url: &str) -> String {
    match Url::parse(canonical_url) {
        Ok(url) => {
            let mut host = url.host_str().unwrap_or("").to_string();
            if let Some(port) = url.port() {
                host.push(':');
                host.push_str(&port.to_string());
            }
            host
        }
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(url: &str) -> MergedItem {
        MergedItem {
            id: "x".to_string(),
            canonical_url: url.to_string(),
            title: String::new(),
            snippet: String::new(),
            engines: vec!["searxng".to_string()],
            best_rank: 1,
            cluster_ids: Vec::new(),
            timestamp: "2026-02-06T10:30:00Z".to_string(),
        }
    }

    fn group(enabled: bool, domains: &[&str]) -> DomainRuleGroup {
        DomainRuleGroup {
            enabled,
            domains: domains.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn empty_include_allows_all() {
        let filters = DomainFilters::default();
        let kept = apply_domain_filters(vec![item("https://a.com/x"), item("https://b.com/y")], &filters);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn include_list_restricts_hosts() {
        let filters = DomainFilters {
            include: vec!["a.com".to_string()],
            exclude: BTreeMap::new(),
        };
        let kept = apply_domain_filters(vec![item("https://a.com/x"), item("https://b.com/y")], &filters);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].canonical_url, "https://a.com/x");
    }

    #[test]
    fn only_enabled_groups_deny() {
        let mut exclude = BTreeMap::new();
        exclude.insert("social".to_string(), group(true, &["pinterest.com"]));
        exclude.insert("shops".to_string(), group(false, &["etsy.com"]));
        let filters = DomainFilters {
            include: Vec::new(),
            exclude,
        };
        let kept = apply_domain_filters(
            vec![
                item("https://pinterest.com/pin"),
                item("https://etsy.com/listing"),
                item("https://blog.example.com/post"),
            ],
            &filters,
        );
        let urls: Vec<&str> = kept.iter().map(|i| i.canonical_url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://etsy.com/listing", "https://blog.example.com/post"]
        );
    }
}
