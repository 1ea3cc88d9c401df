//! Per-domain contribution counts.

use url::Url;

use crate::model::{RawSourceRecord, SourceCount};

/// Hostname without a leading `www.`; the raw string when it does not parse
/// as an absolute URL with a host.
pub fn extract_domain(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(u) => match u.host_str() {
            Some(host) => host.strip_prefix("www.").unwrap_or(host).to_string(),
            None => raw.to_string(),
        },
        Err(_) => raw.to_string(),
    }
}

/// Total articles + posts across the batch.
pub fn calculate_volume(records: &[RawSourceRecord]) -> u32 {
    records
        .iter()
        .map(|r| r.item_count() as u32)
        .fold(0, u32::saturating_add)
}

/// Domains ranked by item count, ties in first-seen order.
pub fn top_sources(records: &[RawSourceRecord], limit: usize) -> Vec<SourceCount> {
    let mut counts: Vec<SourceCount> = Vec::new();
    for r in records {
        let domain = extract_domain(&r.source_url);
        let n = r.item_count() as u32;
        match counts.iter_mut().find(|c| c.source == domain) {
            Some(c) => c.count = c.count.saturating_add(n),
            None => counts.push(SourceCount {
                source: domain,
                count: n,
            }),
        }
    }
    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}
