// src/config/sources.rs
//! Scrape targets per category. TOML or JSON, shaped as
//! `{ news = ["https://..."], crypto = [...] }` (optionally under `[sources]`).
use anyhow::{anyhow, Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "SOURCES_CONFIG_PATH";

/// Category name → source URLs, in configured order.
pub type SourceMap = BTreeMap<String, Vec<String>>;

/// Built-in targets used when no config file exists.
pub fn default_sources() -> SourceMap {
    let mut m = SourceMap::new();
    for (cat, urls) in [
        (
            "news",
            &[
                "https://www.rappler.com",
                "https://www.philstar.com",
                "https://www.gmanews.tv",
                "https://www.abs-cbn.com/news",
                "https://www.inquirer.net",
            ][..],
        ),
        (
            "social",
            &[
                "https://twitter.com/search?q=philippines&src=typed_query&f=live",
                "https://www.reddit.com/r/Philippines/",
                "https://www.facebook.com/search/top/?q=philippines",
            ][..],
        ),
        (
            "crypto",
            &[
                "https://cointelegraph.com/tags/philippines",
                "https://coindesk.com/tag/philippines/",
                "https://www.bitcoin.com/news/tag/philippines/",
            ][..],
        ),
        (
            "gaming",
            &[
                "https://www.gamespot.com/news/",
                "https://www.ign.com/news/",
                "https://www.polygon.com/news",
            ][..],
        ),
        (
            "stocks",
            &[
                "https://www.investing.com/equities/philippines",
                "https://www.marketwatch.com/investing/index/psei",
                "https://www.bloomberg.com/markets/stocks/philippines",
            ][..],
        ),
    ] {
        m.insert(cat.to_string(), urls.iter().map(|u| u.to_string()).collect());
    }
    m
}

/// Load sources from an explicit path. Supports TOML or JSON formats.
pub fn load_sources_from(path: &Path) -> Result<SourceMap> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_sources(&content, ext.as_str())
}

/// Load sources using env var + fallbacks:
/// 1) $SOURCES_CONFIG_PATH
/// 2) config/sources.toml
/// 3) config/sources.json
/// 4) built-in defaults
pub fn load_sources_default() -> Result<SourceMap> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        } else {
            return Err(anyhow!("SOURCES_CONFIG_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/sources.toml");
    if toml_p.exists() {
        return load_sources_from(&toml_p);
    }
    let json_p = PathBuf::from("config/sources.json");
    if json_p.exists() {
        return load_sources_from(&json_p);
    }
    Ok(default_sources())
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<SourceMap> {
    if hint_ext == "json" {
        return parse_json(s);
    }
    if let Ok(v) = parse_toml(s) {
        return Ok(v);
    }
    parse_json(s).map_err(|_| anyhow!("unsupported sources format"))
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum SourcesFile {
    Wrapped { sources: SourceMap },
    Flat(SourceMap),
}

impl SourcesFile {
    fn into_map(self) -> SourceMap {
        match self {
            SourcesFile::Wrapped { sources } => sources,
            SourcesFile::Flat(m) => m,
        }
    }
}

fn parse_toml(s: &str) -> Result<SourceMap> {
    let v: SourcesFile = toml::from_str(s)?;
    Ok(clean_map(v.into_map()))
}

fn parse_json(s: &str) -> Result<SourceMap> {
    let v: SourcesFile = serde_json::from_str(s)?;
    Ok(clean_map(v.into_map()))
}

/// Trim, drop empties, de-duplicate per category keeping first occurrence.
pub fn clean_map(map: SourceMap) -> SourceMap {
    map.into_iter()
        .map(|(cat, urls)| {
            let mut seen = BTreeSet::new();
            let urls = urls
                .into_iter()
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty() && seen.insert(u.clone()))
                .collect();
            (cat.trim().to_string(), urls)
        })
        .filter(|(cat, _)| !cat.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_and_wrapped_toml() {
        let flat = r#"news = [" https://www.rappler.com ", "", "https://www.rappler.com"]"#;
        let out = parse_toml(flat).unwrap();
        assert_eq!(out["news"], vec!["https://www.rappler.com".to_string()]);

        let wrapped = r#"
[sources]
crypto = ["https://coindesk.com/tag/philippines/"]
"#;
        let out = parse_toml(wrapped).unwrap();
        assert_eq!(out["crypto"].len(), 1);
    }

    #[test]
    fn json_map() {
        let out = parse_sources(r#"{"gaming": ["https://www.ign.com/news/"]}"#, "json").unwrap();
        assert_eq!(out["gaming"], vec!["https://www.ign.com/news/".to_string()]);
    }

    #[test]
    fn defaults_cover_five_groups() {
        let d = default_sources();
        assert_eq!(d.len(), 5);
        assert_eq!(d["news"].len(), 5);
        assert!(d.contains_key("social"));
    }
}
