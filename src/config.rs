//! YAML configuration and word-list loading for the CLI layer. Parameter
//! validation (threshold ranges, term limits) stays with the core functions
//! that consume the values.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::filters::DomainFilters;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.yaml";
pub const DEFAULT_DOMAINS_PATH: &str = "config/domains.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub searx_url: String,
    pub timeout_s: u64,
    pub max_retries: u32,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DedupeConfig {
    pub similarity_threshold: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpansionConfig {
    pub max_followups: usize,
    pub max_queue_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
    pub dedupe: DedupeConfig,
    pub expansion: ExpansionConfig,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

pub fn load_domains(path: &Path) -> Result<DomainFilters> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Non-blank lines of a keyword file, trimmed and lowercased.
pub fn load_keywords(path: &Path) -> Result<Vec<String>> {
    Ok(read_lines(path)?
        .into_iter()
        .map(|line| line.to_lowercase())
        .collect())
}

/// Non-blank lines of a plain word-list file, trimmed.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
