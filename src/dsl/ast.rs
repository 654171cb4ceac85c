//! AST types for the filter DSL.

use std::fmt;
use std::str::FromStr;

use time::OffsetDateTime;

/// Root filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterAst {
    /// Field comparison: `name:boo`, `age:>=18`
    Comparison {
        field: String,
        op: Comparator,
        value: Literal,
    },

    /// Bare key with no operator, a free-text search term: `coffee`
    TextTerm(String),

    /// Boolean combination of two or more operands joined by one
    /// connector: `a AND b AND c`. Operands never repeat the parent's
    /// connector at their own top level.
    Boolean {
        op: Connector,
        operands: Vec<FilterAst>,
    },
}

impl FilterAst {
    pub fn comparison(field: impl Into<String>, op: Comparator, value: Literal) -> Self {
        FilterAst::Comparison {
            field: field.into(),
            op,
            value,
        }
    }

    /// Join operands with `op`, lifting the operands of any child that uses
    /// the same connector. A single operand is returned as is.
    pub fn boolean(op: Connector, operands: impl IntoIterator<Item = FilterAst>) -> Self {
        let mut flat = Vec::new();
        for operand in operands {
            match operand {
                FilterAst::Boolean {
                    op: inner,
                    operands,
                } if inner == op => flat.extend(operands),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            if let Some(only) = flat.pop() {
                return only;
            }
        }
        FilterAst::Boolean { op, operands: flat }
    }

    /// Number of nested boolean levels; leaves are 0.
    pub fn depth(&self) -> usize {
        match self {
            FilterAst::Boolean { operands, .. } => {
                1 + operands.iter().map(FilterAst::depth).max().unwrap_or(0)
            }
            _ => 0,
        }
    }
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Match, // :
    Eq,    // :==
    Neq,   // :!=
    Gt,    // :>
    Gte,   // :>=
    Lt,    // :<
    Lte,   // :<=
}

impl Comparator {
    pub const ALL: [Comparator; 7] = [
        Comparator::Match,
        Comparator::Eq,
        Comparator::Neq,
        Comparator::Gt,
        Comparator::Gte,
        Comparator::Lt,
        Comparator::Lte,
    ];

    /// Surface syntax of the operator, including the leading colon.
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Match => ":",
            Comparator::Eq => ":==",
            Comparator::Neq => ":!=",
            Comparator::Gt => ":>",
            Comparator::Gte => ":>=",
            Comparator::Lt => ":<",
            Comparator::Lte => ":<=",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Boolean connector. Also used for the `defaultOperator` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl Connector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Connector {
    type Err = String;

    /// Case-insensitive. The filter grammar itself only accepts the
    /// upper-case literals and does not go through this.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "AND" => Ok(Connector::And),
            "OR" => Ok(Connector::Or),
            _ => Err(format!("invalid connector: {value}")),
        }
    }
}

/// A typed value inferred from a raw token.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Date(OffsetDateTime),
    Number(f64),
    Boolean(bool),
    /// Case-insensitive pattern match on the contained source.
    Pattern(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(t: &str) -> FilterAst {
        FilterAst::TextTerm(t.into())
    }

    #[test]
    fn test_symbols_are_distinct() {
        let mut symbols: Vec<_> = Comparator::ALL.iter().map(|op| op.symbol()).collect();
        symbols.sort();
        symbols.dedup();
        assert_eq!(symbols.len(), Comparator::ALL.len());
    }

    #[test]
    fn test_connector_from_str_is_case_insensitive() {
        assert_eq!("and".parse::<Connector>(), Ok(Connector::And));
        assert_eq!("Or".parse::<Connector>(), Ok(Connector::Or));
        assert!("xor".parse::<Connector>().is_err());
        assert_eq!(Connector::default(), Connector::And);
    }

    #[test]
    fn test_boolean_lifts_same_connector_only() {
        let ast = FilterAst::boolean(
            Connector::And,
            [
                FilterAst::boolean(Connector::And, [text("a"), text("b")]),
                FilterAst::boolean(Connector::Or, [text("c"), text("d")]),
            ],
        );
        let FilterAst::Boolean { op, operands } = &ast else {
            panic!("expected boolean");
        };
        assert_eq!(*op, Connector::And);
        assert_eq!(operands.len(), 3);
        assert_eq!(operands[0], text("a"));
        assert!(matches!(operands[2], FilterAst::Boolean { op: Connector::Or, .. }));
        assert_eq!(ast.depth(), 2);
    }

    #[test]
    fn test_boolean_of_one_operand_is_the_operand() {
        assert_eq!(FilterAst::boolean(Connector::Or, [text("a")]), text("a"));
        assert_eq!(text("a").depth(), 0);
    }
}
