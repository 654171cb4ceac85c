//! Lexer/tokenizer for the tree filter grammar.

use winnow::combinator::{alt, delimited};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

use super::ast::Comparator;

/// Token types for the DSL.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Field name, bare text term, or `AND`/`OR` depending on position
    Key(String),
    /// Comparison operator, always directly after a key
    Op(Comparator),
    /// Raw value text, quotes included when quoted
    Value(String),

    LParen, // (
    RParen, // )
    Space,  // one or more whitespace characters

    // End of input
    Eof,
}

type PResult<T> = Result<T, ErrMode<ContextError>>;

pub fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.' | '-')
}

pub fn is_value_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '-' | ':' | '_')
}

/// Lex a key: `[A-Za-z0-9_$.-]+`
pub fn lex_key<'i>(input: &mut &'i str) -> PResult<&'i str> {
    take_while(1.., is_key_char).parse_next(input)
}

/// Lex a comparison operator, longest match first.
pub fn lex_operator(input: &mut &str) -> PResult<Comparator> {
    alt((
        ":==".value(Comparator::Eq),
        ":!=".value(Comparator::Neq),
        ":>=".value(Comparator::Gte),
        ":<=".value(Comparator::Lte),
        ":>".value(Comparator::Gt),
        ":<".value(Comparator::Lt),
        ":".value(Comparator::Match),
    ))
    .parse_next(input)
}

/// Lex an unquoted value: `[A-Za-z0-9@.\-:_]+`
pub fn lex_bare_value<'i>(input: &mut &'i str) -> PResult<&'i str> {
    take_while(1.., is_value_char).parse_next(input)
}

/// Lex a quoted value, keeping the quotes.
fn lex_quoted_value<'i>(input: &mut &'i str) -> PResult<&'i str> {
    alt((
        delimited('\'', take_while(1.., |c: char| c != '\''), '\''),
        delimited('"', take_while(1.., |c: char| c != '"'), '"'),
    ))
    .take()
    .parse_next(input)
}

fn lex_value<'i>(input: &mut &'i str) -> PResult<&'i str> {
    alt((lex_quoted_value, lex_bare_value)).parse_next(input)
}

fn lex_space(input: &mut &str) -> PResult<Token> {
    take_while(1.., char::is_whitespace)
        .value(Token::Space)
        .parse_next(input)
}

/// Lex a key and, when an operator follows, the operator and its value.
fn lex_term(input: &mut &str, tokens: &mut Vec<Token>) -> PResult<()> {
    let key = lex_key(input)?;
    tokens.push(Token::Key(key.to_string()));

    if input.starts_with(':') {
        let op = lex_operator(input)?;
        let value = lex_value(input)?;
        tokens.push(Token::Op(op));
        tokens.push(Token::Value(value.to_string()));
    }
    Ok(())
}

/// Tokenize the entire input.
pub fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut remaining = input;
    let mut tokens = Vec::new();

    while !remaining.is_empty() {
        let before = remaining;
        let lexed = match remaining.chars().next() {
            Some('(') => {
                remaining = &remaining[1..];
                tokens.push(Token::LParen);
                Ok(())
            }
            Some(')') => {
                remaining = &remaining[1..];
                tokens.push(Token::RParen);
                Ok(())
            }
            Some(c) if c.is_whitespace() => lex_space(&mut remaining).map(|tok| tokens.push(tok)),
            _ => lex_term(&mut remaining, &mut tokens),
        };

        if let Err(e) = lexed {
            return Err(format!("Lexer error at '{}': {:?}", before, e));
        }
    }

    tokens.push(Token::Eof);
    Ok(tokens)
}
