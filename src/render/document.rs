//! MongoDB driver query rendering.
//!
//! The full filter AST becomes a nested query document built from the native
//! boolean and comparison operators, with literal values in their native
//! types.

use serde::Serialize;

use super::QueryRenderer;
use super::value::{Document, NativeValue, single};
use crate::config::RawParams;
use crate::dsl::{Comparator, Connector, FilterAst, parse_filter};
use crate::error::Result;
use crate::params::{BaseParams, SortDirection, SortSpec};

/// A rendered driver query: the filter plus the find options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentQuery {
    pub skip: u64,
    pub limit: u64,
    pub sort: Document,
    /// `None` means no projection
    pub projection: Option<Vec<String>>,
    pub filter: Document,
}

/// Query operator for a comparator; `Match` has none.
pub fn query_operator(op: Comparator) -> Option<&'static str> {
    match op {
        Comparator::Match => None,
        Comparator::Eq => Some("$eq"),
        Comparator::Neq => Some("$ne"),
        Comparator::Gt => Some("$gt"),
        Comparator::Gte => Some("$gte"),
        Comparator::Lt => Some("$lt"),
        Comparator::Lte => Some("$lte"),
    }
}

fn connector_operator(connector: Connector) -> &'static str {
    match connector {
        Connector::And => "$and",
        Connector::Or => "$or",
    }
}

fn text_search(words: &str) -> Document {
    single("$text", single("$search", NativeValue::String(words.to_string())))
}

/// Sort document mapping each field to `1` or `-1`, in order.
pub fn render_sort(sort: &SortSpec) -> Document {
    sort.iter()
        .map(|s| {
            let direction = match s.direction {
                SortDirection::Ascending => 1,
                SortDirection::Descending => -1,
            };
            (s.field.clone(), NativeValue::Int(direction))
        })
        .collect()
}

/// Render a parsed filter. No filter renders as the empty document.
pub fn render_filter(ast: Option<&FilterAst>) -> Document {
    ast.map(render_node).unwrap_or_default()
}

fn render_node(ast: &FilterAst) -> Document {
    match ast {
        FilterAst::Comparison { field, op, value } => match query_operator(*op) {
            None => single(field.clone(), NativeValue::from(value)),
            Some(operator) => single(field.clone(), single(operator, NativeValue::from(value))),
        },
        FilterAst::TextTerm(word) => text_search(word),
        FilterAst::Boolean { op, operands } => render_chain(*op, operands),
    }
}

/// Render a same-connector node as one clause array. Text terms among the
/// operands share a single `$text` clause at the position of the first one.
fn render_chain(connector: Connector, operands: &[FilterAst]) -> Document {
    let mut clauses = Vec::with_capacity(operands.len());
    let mut words = Vec::new();
    let mut text_slot = None;

    for operand in operands {
        match operand {
            FilterAst::TextTerm(word) => {
                if text_slot.is_none() {
                    text_slot = Some(clauses.len());
                    clauses.push(Document::new());
                }
                words.push(word.as_str());
            }
            other => clauses.push(render_node(other)),
        }
    }
    if let Some(slot) = text_slot {
        clauses[slot] = text_search(&words.join(" "));
    }

    if clauses.len() == 1 {
        if let Some(only) = clauses.pop() {
            return only;
        }
    }
    single(
        connector_operator(connector),
        NativeValue::Array(clauses.into_iter().map(NativeValue::Document).collect()),
    )
}

/// Renders CRAF parameters into a MongoDB driver query.
///
/// `defaultOperator` is validated but not consulted: the tree grammar
/// requires explicit connectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentRenderer;

impl QueryRenderer for DocumentRenderer {
    type Output = DocumentQuery;

    fn render(&self, raw: &RawParams) -> Result<DocumentQuery> {
        let base = BaseParams::extract(raw)?;
        let ast = parse_filter(raw.get(RawParams::FILTER).unwrap_or(""))?;

        let query = DocumentQuery {
            skip: base.skip,
            limit: base.limit,
            sort: render_sort(&base.sort),
            projection: (!base.fields.is_empty()).then_some(base.fields),
            filter: render_filter(ast.as_ref()),
        };
        tracing::debug!("Rendered document query: {:?}", query);
        Ok(query)
    }
}
