//! Backend query rendering.

mod document;
mod search;
mod value;

use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config::RawParams;
use crate::error::Result;

pub use document::{DocumentQuery, DocumentRenderer, query_operator, render_filter, render_sort};
pub use search::{
    SearchUriQuery, SearchUriRenderer, encode_uri, render_flat_filter, render_flat_term,
};
pub use value::{Document, NativeValue, single};

/// Turns raw CRAF parameters into one backend's native query.
pub trait QueryRenderer {
    type Output;

    /// Validate and translate. Fails atomically on the first bad parameter.
    fn render(&self, raw: &RawParams) -> Result<Self::Output>;
}

/// Target backend dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Elasticsearch URI search (flat dialect)
    #[serde(alias = "elasticsearch")]
    #[value(alias = "elasticsearch")]
    Search,
    /// MongoDB driver query (tree dialect)
    #[default]
    #[serde(alias = "mongodb")]
    #[value(alias = "mongodb")]
    Document,
}

impl Backend {
    pub fn label(&self) -> &'static str {
        match self {
            Backend::Search => "search",
            Backend::Document => "document",
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "search" | "elasticsearch" => Ok(Backend::Search),
            "document" | "mongodb" => Ok(Backend::Document),
            _ => Err(format!("invalid backend: {value}")),
        }
    }
}

/// Output of whichever renderer the backend selected.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslatedQuery {
    Search(SearchUriQuery),
    Document(DocumentQuery),
}

/// Translate raw parameters for the given backend.
pub fn translate(backend: Backend, raw: &RawParams) -> Result<TranslatedQuery> {
    tracing::debug!(
        "Translating {} parameter(s) for {} backend",
        raw.len(),
        backend.label()
    );
    match backend {
        Backend::Search => SearchUriRenderer.render(raw).map(TranslatedQuery::Search),
        Backend::Document => DocumentRenderer.render(raw).map(TranslatedQuery::Document),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("search".parse::<Backend>(), Ok(Backend::Search));
        assert_eq!("ElasticSearch".parse::<Backend>(), Ok(Backend::Search));
        assert_eq!("MONGODB".parse::<Backend>(), Ok(Backend::Document));
        assert!("sql".parse::<Backend>().is_err());
    }

    #[test]
    fn test_translate_selects_renderer() {
        let raw = RawParams::new().with("filter", "number:!=4");

        let TranslatedQuery::Search(search) = translate(Backend::Search, &raw).unwrap() else {
            panic!("expected search query");
        };
        assert_eq!(search.q, "!(number:4)");

        let TranslatedQuery::Document(doc) = translate(Backend::Document, &raw).unwrap() else {
            panic!("expected document query");
        };
        assert_eq!(
            doc.filter,
            single("number", single("$ne", NativeValue::Double(4.0)))
        );
    }

    #[test]
    fn test_dialects_disagree_on_connectors() {
        let raw = RawParams::new().with("filter", "(a:1 OR b:2)");
        assert!(translate(Backend::Search, &raw).is_err());
        assert!(translate(Backend::Document, &raw).is_ok());

        let raw = RawParams::new().with("filter", "name email");
        assert!(translate(Backend::Search, &raw).is_ok());
        assert!(translate(Backend::Document, &raw).is_err());
    }
}
