//! Parser for the tree filter grammar.
//!
//! Grammar (in rough EBNF):
//!
//! expr       = term (WS connector WS term)*
//! term       = "(" WS? expr WS? ")" | comparison | bare_term
//! comparison = KEY OPERATOR VALUE
//! bare_term  = KEY
//! connector  = "AND" | "OR"
//!
//! Connectors share one precedence level and associate to the left; only
//! parentheses regroup. Terms must be joined by an explicit connector.

use super::ast::{Connector, FilterAst};
use super::lexer::{Token, tokenize};
use super::literal::infer_literal;
use crate::error::FilterError;

/// Deepest nesting accepted, both of parentheses and of boolean levels in
/// the resulting tree.
pub const MAX_DEPTH: usize = 64;

/// Parser state.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        tok
    }

    fn expect(&mut self, expected: Token) -> Result<(), String> {
        let tok = self.advance();
        if tok == expected {
            Ok(())
        } else {
            Err(format!("Expected {:?}, got {:?}", expected, tok))
        }
    }

    fn skip_space(&mut self) {
        if matches!(self.peek(), Token::Space) {
            self.advance();
        }
    }

    /// A connector is only recognized as `Space KEY(AND|OR) Space`.
    fn peek_connector(&self) -> Option<Connector> {
        if !matches!(self.peek(), Token::Space) || !matches!(self.peek_at(2), Token::Space) {
            return None;
        }
        match self.peek_at(1) {
            Token::Key(word) if word == "AND" => Some(Connector::And),
            Token::Key(word) if word == "OR" => Some(Connector::Or),
            _ => None,
        }
    }

    /// Parse expression: term (WS connector WS term)*
    ///
    /// A run of one connector is collected into a single node. When the
    /// connector changes, everything so far becomes the first operand of
    /// the next run, which keeps the grouping left to right.
    fn parse_expr(&mut self) -> Result<FilterAst, String> {
        let first = self.parse_term()?;
        let Some(mut connector) = self.peek_connector() else {
            return Ok(first);
        };
        let mut operands = vec![first];

        while let Some(next) = self.peek_connector() {
            self.pos += 3; // space, connector, space
            if next != connector {
                let group = nest(connector, std::mem::take(&mut operands))?;
                operands.push(group);
                connector = next;
            }
            operands.push(self.parse_term()?);
        }

        nest(connector, operands)
    }

    /// Parse term: "(" WS? expr WS? ")" | comparison | bare_term
    fn parse_term(&mut self) -> Result<FilterAst, String> {
        match self.advance() {
            Token::LParen => {
                self.depth += 1;
                if self.depth > MAX_DEPTH {
                    return Err(format!("Parentheses nested deeper than {}", MAX_DEPTH));
                }
                self.skip_space();
                let inner = self.parse_expr()?;
                self.skip_space();
                self.expect(Token::RParen)?;
                self.depth -= 1;
                Ok(inner)
            }
            Token::Key(key) => self.parse_key_term(key),
            other => Err(format!("Unexpected token: {:?}", other)),
        }
    }

    /// Parse what follows a key: an operator and value, or nothing.
    fn parse_key_term(&mut self, field: String) -> Result<FilterAst, String> {
        let Token::Op(op) = self.peek().clone() else {
            return Ok(FilterAst::TextTerm(field));
        };
        self.advance(); // consume operator

        match self.advance() {
            Token::Value(raw) => Ok(FilterAst::comparison(field, op, infer_literal(&raw))),
            other => Err(format!("Expected value after {}, got {:?}", op, other)),
        }
    }
}

fn nest(connector: Connector, operands: Vec<FilterAst>) -> Result<FilterAst, String> {
    let node = FilterAst::boolean(connector, operands);
    if node.depth() > MAX_DEPTH {
        return Err(format!("Connectors nested deeper than {}", MAX_DEPTH));
    }
    Ok(node)
}

/// Parse a filter string with the tree grammar.
///
/// A blank filter yields `Ok(None)`. Any failure rejects the whole input.
pub fn parse_filter(input: &str) -> Result<Option<FilterAst>, FilterError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let tokens = tokenize(trimmed).map_err(|reason| FilterError::new(input, reason))?;
    let mut parser = Parser::new(tokens);
    let ast = parser
        .parse_expr()
        .map_err(|reason| FilterError::new(input, reason))?;

    // Ensure we consumed all tokens
    if !matches!(parser.peek(), Token::Eof) {
        return Err(FilterError::new(
            input,
            format!("Unexpected token after expression: {:?}", parser.peek()),
        ));
    }

    tracing::debug!("Parsed filter '{}' into {:?}", input, ast);
    Ok(Some(ast))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::ast::{Comparator, Literal};

    fn parse(input: &str) -> FilterAst {
        parse_filter(input).unwrap().unwrap()
    }

    fn cmp(field: &str, op: Comparator, value: Literal) -> FilterAst {
        FilterAst::comparison(field, op, value)
    }

    #[test]
    fn test_match_comparison() {
        assert_eq!(
            parse("name:boo"),
            cmp("name", Comparator::Match, Literal::Pattern("boo".into()))
        );
    }

    #[test]
    fn test_operator_mapping() {
        let cases = [
            ("n:4", Comparator::Match),
            ("n:==4", Comparator::Eq),
            ("n:!=4", Comparator::Neq),
            ("n:>4", Comparator::Gt),
            ("n:>=4", Comparator::Gte),
            ("n:<4", Comparator::Lt),
            ("n:<=4", Comparator::Lte),
        ];
        for (input, op) in cases {
            assert_eq!(parse(input), cmp("n", op, Literal::Number(4.0)), "{input}");
        }
    }

    #[test]
    fn test_bare_key_is_text_term() {
        assert_eq!(parse("coffee"), FilterAst::TextTerm("coffee".into()));
    }

    #[test]
    fn test_nested_field_names() {
        assert_eq!(
            parse("name.bar:boo"),
            cmp("name.bar", Comparator::Match, Literal::Pattern("boo".into()))
        );
        assert!(matches!(parse("$meta_x-1:1"), FilterAst::Comparison { .. }));
    }

    #[test]
    fn test_parenthesised_or() {
        assert_eq!(
            parse("(a:1 OR b:2)"),
            FilterAst::boolean(
                Connector::Or,
                [
                    cmp("a", Comparator::Match, Literal::Number(1.0)),
                    cmp("b", Comparator::Match, Literal::Number(2.0)),
                ],
            )
        );
    }

    #[test]
    fn test_spaces_inside_parentheses() {
        assert_eq!(parse("( a:1 OR b:2 )"), parse("(a:1 OR b:2)"));
    }

    #[test]
    fn test_connectors_are_left_associative() {
        let ast = parse("a OR b AND c");
        assert_eq!(
            ast,
            FilterAst::boolean(
                Connector::And,
                [
                    FilterAst::boolean(
                        Connector::Or,
                        [FilterAst::TextTerm("a".into()), FilterAst::TextTerm("b".into())],
                    ),
                    FilterAst::TextTerm("c".into()),
                ],
            )
        );
    }

    #[test]
    fn test_parentheses_override_grouping() {
        let ast = parse("a OR (b AND c)");
        let FilterAst::Boolean { op, operands } = ast else {
            panic!("expected boolean");
        };
        assert_eq!(op, Connector::Or);
        assert!(matches!(operands[1], FilterAst::Boolean { op: Connector::And, .. }));
    }

    #[test]
    fn test_connectors_are_case_sensitive() {
        assert!(parse_filter("a:1 and b:2").is_err());
    }

    #[test]
    fn test_connector_word_as_text_term() {
        assert_eq!(parse("AND"), FilterAst::TextTerm("AND".into()));
        assert!(matches!(parse("OR:1"), FilterAst::Comparison { .. }));
    }

    #[test]
    fn test_quoted_value() {
        assert_eq!(
            parse("title:\"war and peace\""),
            cmp("title", Comparator::Match, Literal::Pattern("war and peace".into()))
        );
        assert_eq!(
            parse("code:'42'"),
            cmp("code", Comparator::Match, Literal::Pattern("42".into()))
        );
    }

    #[test]
    fn test_empty_filter() {
        assert_eq!(parse_filter("").unwrap(), None);
        assert_eq!(parse_filter("   ").unwrap(), None);
    }

    #[test]
    fn test_juxtaposed_terms_need_a_connector() {
        assert!(parse_filter("a:1 b:2").is_err());
        assert!(parse_filter("name email").is_err());
    }

    #[test]
    fn test_rejects_malformed_input() {
        for input in [
            "(a:1",
            "a:1)",
            "()",
            "a:1 OR",
            "OR a:1",
            "a:1 AND(b:2)",
            "a:=1",
            "a: 1",
            "a:(1)",
            "number: 4 for:bar:so",
        ] {
            let err = parse_filter(input).unwrap_err();
            assert_eq!(err.filter, input);
        }
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}a{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert!(parse_filter(&deep).is_ok());

        let too_deep = format!("{}a{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert!(parse_filter(&too_deep).is_err());
    }

    #[test]
    fn test_same_connector_run_is_one_node() {
        let FilterAst::Boolean { op, operands } = parse("a AND b AND (c AND d)") else {
            panic!("expected boolean");
        };
        assert_eq!(op, Connector::And);
        assert_eq!(operands.len(), 4);
    }

    #[test]
    fn test_long_connector_run_stays_flat() {
        let filter = vec!["a:1"; 100_000].join(" OR ");
        let ast = parse(&filter);
        assert_eq!(ast.depth(), 1);
        let FilterAst::Boolean { operands, .. } = ast else {
            panic!("expected boolean");
        };
        assert_eq!(operands.len(), 100_000);
    }

    #[test]
    fn test_connector_switch_limit() {
        let alternating = |connectors: usize| {
            let mut filter = String::from("t");
            for i in 0..connectors {
                filter.push_str(if i % 2 == 0 { " AND t" } else { " OR t" });
            }
            filter
        };
        assert_eq!(parse(&alternating(MAX_DEPTH)).depth(), MAX_DEPTH);
        assert!(parse_filter(&alternating(MAX_DEPTH + 1)).is_err());
        assert!(parse_filter(&alternating(100_000)).is_err());
    }
}
