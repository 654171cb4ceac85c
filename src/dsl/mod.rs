//! Filter DSL for CRAF `filter` parameters.
//!
//! Syntax:
//!   key                     - free-text term
//!   key:value               - match (pattern or equality, by value type)
//!   key:==value             - equal
//!   key:!=value             - not equal
//!   key:>n, key:>=n, etc.   - ordered comparison
//!   expr1 AND expr2         - AND
//!   expr1 OR expr2          - OR (same precedence as AND, left to right)
//!   (expr)                  - grouping
//!
//! Values are typed by `literal::infer_literal`. The search dialect uses the
//! restricted grammar in `flat` instead of the full tree grammar.

mod ast;
mod flat;
mod lexer;
mod literal;
mod parser;

pub use ast::*;
pub use flat::{FlatTerm, TermPrefix, parse_flat_filter, parse_flat_term};
pub use lexer::is_key_char;
pub use literal::infer_literal;
pub use parser::parse_filter;
