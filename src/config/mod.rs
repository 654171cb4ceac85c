use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::render::Backend;

/// Raw CRAF parameters for one request, as decoded from the query string.
///
/// Blank values are treated as absent, so `?limit=` falls back to the default
/// just like a missing `limit`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RawParams(HashMap<String, String>);

impl RawParams {
    pub const FILTER: &'static str = "filter";
    pub const SORT: &'static str = "sort";
    pub const SKIP: &'static str = "skip";
    pub const LIMIT: &'static str = "limit";
    pub const FIELDS: &'static str = "fields";
    pub const DEFAULT_OPERATOR: &'static str = "defaultOperator";

    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `key`, or `None` when it is missing or blank.
    ///
    /// Falls back to an ASCII case-insensitive key match, since some config
    /// sources lower-case keys (`defaultOperator`). Among several such keys
    /// the lexicographically smallest wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .or_else(|| {
                self.0
                    .iter()
                    .filter(|(k, _)| k.eq_ignore_ascii_case(key))
                    .min_by(|(a, _), (b, _)| a.cmp(b))
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Value of `key` with surrounding whitespace removed, or `""`.
    pub fn get_trimmed(&self, key: &str) -> &str {
        self.get(key).map(str::trim).unwrap_or("")
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Overlay `other` on top of `self`; keys in `other` win.
    pub fn merge(mut self, other: RawParams) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RawParams(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A translation request read from a file.
///
/// ```yaml
/// backend: document
/// params:
///   filter: "(status:active OR age:>=18)"
///   sort: "name:asc"
///   limit: "10"
/// ```
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RequestConfig {
    #[serde(default)]
    pub backend: Option<Backend>,
    #[serde(default)]
    pub params: RawParams,
}

impl RequestConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn blank_values_count_as_absent() {
        let params = RawParams::new().with("limit", "  ").with("skip", " 5 ");
        assert_eq!(params.get("limit"), None);
        assert_eq!(params.get("filter"), None);
        assert_eq!(params.get("skip"), Some(" 5 "));
        assert_eq!(params.get_trimmed("skip"), "5");
        assert_eq!(params.get_trimmed("sort"), "");
    }

    #[test]
    fn case_insensitive_lookup_is_deterministic() {
        let params: RawParams = [("Limit", "1"), ("LIMIT", "2"), ("limiT", "3")]
            .into_iter()
            .collect();
        for _ in 0..16 {
            assert_eq!(params.get("limit"), Some("2"));
        }
        assert_eq!(params.get("Limit"), Some("1"));
        assert_eq!(params.clone().with("limit", "4").get("limit"), Some("4"));
    }

    #[test]
    fn lowercased_keys_still_resolve() {
        let params = RawParams::new().with("defaultoperator", "OR");
        assert_eq!(params.get(RawParams::DEFAULT_OPERATOR), Some("OR"));
        assert!(!params.is_empty());
        assert!(RawParams::new().is_empty());
    }

    #[test]
    fn merge_prefers_overlay() {
        let base: RawParams = [("limit", "10"), ("skip", "2")].into_iter().collect();
        let merged = base.merge(RawParams::new().with("limit", "20"));
        assert_eq!(merged.get("limit"), Some("20"));
        assert_eq!(merged.get("skip"), Some("2"));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn loads_request_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "backend: search\nparams:\n  filter: \"name:boo\"\n  sort: \"name:asc\""
        )
        .unwrap();

        let request = RequestConfig::load(file.path()).unwrap();
        assert_eq!(request.backend, Some(Backend::Search));
        assert_eq!(request.params.get("filter"), Some("name:boo"));
        assert_eq!(request.params.get("sort"), Some("name:asc"));
    }
}
