//! Flat filter grammar for the search-engine dialect.
//!
//! The filter is a whitespace-separated list of independent tokens:
//!
//!   token   = [+|-]KEY | KEY OPERATOR VALUE
//!
//! There are no parentheses, quotes or `AND`/`OR` literals here; the target
//! engine combines the tokens with its own default operator.

use std::fmt;

use winnow::combinator::{alt, opt};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;

use super::ast::Comparator;
use super::lexer::{lex_bare_value, lex_key, lex_operator};
use crate::error::FilterError;

type PResult<T> = Result<T, ErrMode<ContextError>>;

/// Required/prohibited marker on a bare term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermPrefix {
    Required,   // +
    Prohibited, // -
}

/// One token of a flat filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatTerm {
    Text {
        prefix: Option<TermPrefix>,
        word: String,
    },
    Comparison {
        field: String,
        op: Comparator,
        value: String,
    },
}

impl fmt::Display for FlatTerm {
    /// Surface form, as it would appear in a CRAF filter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlatTerm::Text { prefix, word } => {
                match prefix {
                    Some(TermPrefix::Required) => f.write_str("+")?,
                    Some(TermPrefix::Prohibited) => f.write_str("-")?,
                    None => {}
                }
                f.write_str(word)
            }
            FlatTerm::Comparison { field, op, value } => write!(f, "{field}{op}{value}"),
        }
    }
}

fn flat_comparison(input: &mut &str) -> PResult<FlatTerm> {
    let field = lex_key(input)?;
    let op = lex_operator(input)?;
    let value = lex_bare_value(input)?;
    Ok(FlatTerm::Comparison {
        field: field.to_string(),
        op,
        value: value.to_string(),
    })
}

fn flat_text(input: &mut &str) -> PResult<FlatTerm> {
    let prefix = opt(alt((
        '+'.value(TermPrefix::Required),
        '-'.value(TermPrefix::Prohibited),
    )))
    .parse_next(input)?;
    let word = lex_key(input)?;
    Ok(FlatTerm::Text {
        prefix,
        word: word.to_string(),
    })
}

/// Parse a single whitespace-free token.
pub fn parse_flat_term(token: &str) -> Result<FlatTerm, String> {
    if token == "AND" || token == "OR" {
        return Err(format!("Connector '{}' is not allowed in a flat filter", token));
    }

    let mut input = token;
    let term = alt((flat_comparison, flat_text))
        .parse_next(&mut input)
        .map_err(|e| format!("Invalid token '{}': {:?}", token, e))?;

    if !input.is_empty() {
        return Err(format!("Unexpected '{}' in token '{}'", input, token));
    }
    Ok(term)
}

/// Parse a filter string with the flat grammar.
///
/// A blank filter yields an empty list. Any bad token rejects the whole input.
pub fn parse_flat_filter(input: &str) -> Result<Vec<FlatTerm>, FilterError> {
    let terms = input
        .split_whitespace()
        .map(parse_flat_term)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|reason| FilterError::new(input, reason))?;

    tracing::debug!("Parsed flat filter '{}' into {} term(s)", input, terms.len());
    Ok(terms)
}
