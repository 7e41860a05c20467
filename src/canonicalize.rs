//! URL canonicalization: the normalized form used as the dedupe key.

use url::{form_urlencoded, Url};

use crate::error::PipelineError;

const TRACKING_PARAM_PREFIXES: &[&str] = &["utm_"];
const TRACKING_PARAMS_EXACT: &[&str] = &[
    "_hsenc", "_hsmi", "fbclid", "gclid", "igshid", "mc_eid", "ref", "spm",
];

/// Maps a raw URL to its canonical form: scheme forced to https, host
/// lowercased with a leading `www.` stripped, slash runs collapsed, trailing
/// slash removed (except root), tracking parameters dropped, remaining query
/// pairs sorted by (key, value), fragment dropped. Re-running on the output
/// returns it unchanged.
pub fn canonicalize_url(raw: &str) -> Result<String, PipelineError> {
    let parsed = Url::parse(raw.trim())
        .map_err(|e| PipelineError::malformed(format!("unparseable url {raw:?}: {e}")))?;

    let host = parsed.host_str().unwrap_or("").to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    let mut canonical = String::from("https://");
    canonical.push_str(host);
    if let Some(port) = parsed.port() {
        canonical.push(':');
        canonical.push_str(&port.to_string());
    }
    canonical.push_str(&normalize_path(parsed.path()));

    let mut pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    pairs.sort();
    if !pairs.is_empty() {
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        canonical.push('?');
        canonical.push_str(&query);
    }

    Ok(canonical)
}

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_lowercase();
    TRACKING_PARAM_PREFIXES.iter().any(|p| key.starts_with(p))
        || TRACKING_PARAMS_EXACT.contains(&key.as_str())
}

fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for ch in path.chars() {
        // collapse runs of slashes to one
        if ch == '/' && out.ends_with('/') {
            continue;
        }
        out.push(ch);
    }
    if out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}
