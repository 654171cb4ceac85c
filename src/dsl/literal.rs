//! Literal type inference for filter values.
//!
//! Precedence, highest first:
//!   1. calendar date/time   `YYYY-MM-DD[THH:MM:SS[.fff]][Z]`
//!   2. decimal number       `-?[0-9]+(.[0-9]+)?`
//!   3. boolean              `true` | `false`
//!   4. anything else        case-insensitive pattern
//!
//! A quoted token (`'...'` or `"..."`) skips rules 2 and 3: its content is a
//! date if it matches the date grammar, otherwise a pattern.

use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};
use winnow::combinator::{opt, preceded};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

use super::ast::Literal;

type PResult<T> = Result<T, ErrMode<ContextError>>;

fn backtrack() -> ErrMode<ContextError> {
    ErrMode::Backtrack(ContextError::default())
}

/// Infer the literal type of a raw value token.
pub fn infer_literal(token: &str) -> Literal {
    if let Some(inner) = unquote(token) {
        return match parse_date(inner) {
            Some(date) => Literal::Date(date),
            None => Literal::Pattern(inner.to_string()),
        };
    }

    // Date is checked before number: both grammars accept leading digits.
    if let Some(date) = parse_date(token) {
        return Literal::Date(date);
    }
    if let Some(number) = parse_number(token) {
        return Literal::Number(number);
    }
    match token {
        "true" => Literal::Boolean(true),
        "false" => Literal::Boolean(false),
        _ => Literal::Pattern(token.to_string()),
    }
}

/// Strip matching single or double quotes.
pub fn unquote(token: &str) -> Option<&str> {
    ['\'', '"'].into_iter().find_map(|quote| {
        (token.len() >= 2 && token.starts_with(quote) && token.ends_with(quote))
            .then(|| &token[1..token.len() - 1])
    })
}

/// Parse a token that is entirely a calendar date or date-time (UTC).
pub fn parse_date(token: &str) -> Option<OffsetDateTime> {
    complete(token, date_time)
}

/// Parse a token that is entirely a decimal number representable as a
/// finite `f64`.
pub fn parse_number(token: &str) -> Option<f64> {
    let n: f64 = complete(token, decimal)?.parse().ok()?;
    n.is_finite().then_some(n)
}

/// Run a parser and require it to consume the whole token.
fn complete<'i, O>(token: &'i str, parser: fn(&mut &'i str) -> PResult<O>) -> Option<O> {
    let mut input = token;
    let out = parser(&mut input).ok()?;
    input.is_empty().then_some(out)
}

fn decimal<'i>(input: &mut &'i str) -> PResult<&'i str> {
    (
        opt('-'),
        take_while(1.., |c: char| c.is_ascii_digit()),
        opt(('.', take_while(1.., |c: char| c.is_ascii_digit()))),
    )
        .take()
        .parse_next(input)
}

/// Exactly `width` digits whose value lies in `min..=max`.
fn bounded(input: &mut &str, width: usize, min: u32, max: u32) -> PResult<u32> {
    let digits = take_while(width, |c: char| c.is_ascii_digit()).parse_next(input)?;
    let value: u32 = digits.parse().map_err(|_| backtrack())?;
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(backtrack())
    }
}

fn date_time(input: &mut &str) -> PResult<OffsetDateTime> {
    let year = bounded(input, 4, 0, 9999)?;
    '-'.parse_next(input)?;
    let month = bounded(input, 2, 1, 12)?;
    '-'.parse_next(input)?;
    let day = bounded(input, 2, 1, 31)?;
    let time = opt(time_of_day).parse_next(input)?;
    opt('Z').parse_next(input)?;

    // Grammar-valid but not a real day (2021-02-30) is rejected here.
    let month = Month::try_from(month as u8).map_err(|_| backtrack())?;
    let date = Date::from_calendar_date(year as i32, month, day as u8).map_err(|_| backtrack())?;
    Ok(PrimitiveDateTime::new(date, time.unwrap_or(Time::MIDNIGHT)).assume_utc())
}

fn time_of_day(input: &mut &str) -> PResult<Time> {
    'T'.parse_next(input)?;
    let hour = bounded(input, 2, 0, 23)?;
    ':'.parse_next(input)?;
    let minute = bounded(input, 2, 0, 59)?;
    ':'.parse_next(input)?;
    let second = bounded(input, 2, 0, 59)?;
    let fraction = opt(preceded(
        '.',
        take_while(1..=3, |c: char| c.is_ascii_digit()),
    ))
    .parse_next(input)?;

    let millis = match fraction {
        Some(digits) => format!("{digits:0<3}").parse().map_err(|_| backtrack())?,
        None => 0,
    };
    Time::from_hms_milli(hour as u8, minute as u8, second as u8, millis).map_err(|_| backtrack())
}
