//! Elasticsearch URI search rendering.
//!
//! The filter is validated token by token with the flat grammar and rewritten
//! into the engine's own query-string syntax. Boolean structure is left to the
//! engine through `default_operator`.

use std::fmt;

use super::QueryRenderer;
use crate::config::RawParams;
use crate::dsl::{Comparator, Connector, FlatTerm, parse_flat_filter};
use crate::error::Result;
use crate::params::{BaseParams, SortSpec};

/// Characters `encode_uri` leaves untouched besides ASCII alphanumerics.
const URI_SAFE: &str = "-_.!~*'();,/?:@&=+$#";

/// A rendered URI search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchUriQuery {
    pub from: u64,
    pub size: u64,
    pub sort: SortSpec,
    pub source: Vec<String>,
    pub default_operator: Connector,
    /// Rendered filter, empty when no filter was given
    pub q: String,
}

impl SearchUriQuery {
    /// The query string before percent-encoding.
    ///
    /// `default_operator` is only valid alongside `q`, so both are omitted
    /// for an empty filter.
    pub fn raw_query_string(&self) -> String {
        let mut query = format!(
            "?&from={}&size={}&sort={}&_source={}",
            self.from,
            self.size,
            self.sort,
            self.source.join(" ")
        );
        if !self.q.is_empty() {
            query.push_str(&format!(
                "&default_operator={}&q={}",
                self.default_operator, self.q
            ));
        }
        query
    }

    /// The percent-encoded query string, ready to append to a search URL.
    pub fn to_query_string(&self) -> String {
        encode_uri(&self.raw_query_string())
    }
}

impl fmt::Display for SearchUriQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

/// Rewrite one flat term into the engine's syntax.
pub fn render_flat_term(term: &FlatTerm) -> String {
    match term {
        FlatTerm::Text { .. } => term.to_string(),
        FlatTerm::Comparison { field, op, value } => match op {
            Comparator::Match | Comparator::Eq => format!("{field}:{value}"),
            Comparator::Neq => format!("!({field}:{value})"),
            Comparator::Gt => format!("{field}:>{value}"),
            Comparator::Gte => format!("{field}:>={value}"),
            Comparator::Lt => format!("{field}:<{value}"),
            Comparator::Lte => format!("{field}:<={value}"),
        },
    }
}

/// Rewrite every term, keeping order, joined by single spaces.
pub fn render_flat_filter(terms: &[FlatTerm]) -> String {
    terms
        .iter()
        .map(render_flat_term)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Percent-encode a whole URI, leaving its structural characters in place.
pub fn encode_uri(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut buf = [0u8; 4];
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || URI_SAFE.contains(c) {
            out.push(c);
        } else {
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    out
}

/// Renders CRAF parameters into an Elasticsearch URI search query.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchUriRenderer;

impl QueryRenderer for SearchUriRenderer {
    type Output = SearchUriQuery;

    fn render(&self, raw: &RawParams) -> Result<SearchUriQuery> {
        let base = BaseParams::extract(raw)?;
        let terms = parse_flat_filter(raw.get(RawParams::FILTER).unwrap_or(""))?;

        let query = SearchUriQuery {
            from: base.skip,
            size: base.limit,
            sort: base.sort,
            source: base.fields,
            default_operator: base.default_operator,
            q: render_flat_filter(&terms),
        };
        tracing::debug!("Rendered search query: {}", query.raw_query_string());
        Ok(query)
    }
}
