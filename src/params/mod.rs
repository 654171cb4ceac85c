//! Validation of the non-filter CRAF parameters shared by every backend.

use std::fmt;
use std::str::FromStr;

use crate::config::RawParams;
use crate::dsl::{Connector, is_key_char};
use crate::error::{Error, Result};

pub const DEFAULT_SKIP: u64 = 0;
pub const DEFAULT_LIMIT: u64 = 50;

/// Build the error for a rejected parameter, logging it on the way out.
pub(crate) fn reject(name: &'static str, value: &str) -> Error {
    tracing::warn!("Rejected parameter '{}': '{}'", name, value);
    Error::invalid(name, value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "asc" => Ok(SortDirection::Ascending),
            "desc" => Ok(SortDirection::Descending),
            _ => Err(format!("invalid sort direction: {value}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub direction: SortDirection,
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.direction.as_str())
    }
}

impl FromStr for SortField {
    type Err = String;

    /// `field:asc` or `field:desc`
    fn from_str(token: &str) -> std::result::Result<Self, Self::Err> {
        let (field, direction) = token
            .split_once(':')
            .ok_or_else(|| format!("missing direction in '{token}'"))?;
        if field.is_empty() || !field.chars().all(is_key_char) {
            return Err(format!("invalid sort field in '{token}'"));
        }
        Ok(SortField {
            field: field.to_string(),
            direction: direction.parse()?,
        })
    }
}

/// Ordered sort fields. Order is significant and preserved in every output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec(Vec<SortField>);

impl SortSpec {
    pub fn iter(&self) -> impl Iterator<Item = &SortField> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SortSpec {
    /// Space-joined `field:direction` tokens.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}

/// The validated non-filter parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseParams {
    pub skip: u64,
    pub limit: u64,
    pub sort: SortSpec,
    pub fields: Vec<String>,
    pub default_operator: Connector,
}

impl BaseParams {
    /// Validate every base parameter, failing on the first bad one.
    pub fn extract(raw: &RawParams) -> Result<Self> {
        Ok(BaseParams {
            skip: parse_skip(raw)?,
            limit: parse_limit(raw)?,
            sort: parse_sort(raw)?,
            fields: parse_fields(raw),
            default_operator: parse_default_operator(raw)?,
        })
    }
}

fn parse_count(raw: &RawParams, name: &'static str, default: u64) -> Result<u64> {
    let Some(value) = raw.get(name) else {
        return Ok(default);
    };
    let digits = value.trim();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(reject(name, value));
    }
    digits.parse().map_err(|_| reject(name, value))
}

/// `skip`: non-negative integer, default 0.
pub fn parse_skip(raw: &RawParams) -> Result<u64> {
    parse_count(raw, RawParams::SKIP, DEFAULT_SKIP)
}

/// `limit`: non-negative integer, default 50.
pub fn parse_limit(raw: &RawParams) -> Result<u64> {
    parse_count(raw, RawParams::LIMIT, DEFAULT_LIMIT)
}

/// `fields`: whitespace-separated field names, default empty.
pub fn parse_fields(raw: &RawParams) -> Vec<String> {
    raw.get_trimmed(RawParams::FIELDS)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// `sort`: whitespace-separated `field:asc|desc` tokens, default empty.
pub fn parse_sort(raw: &RawParams) -> Result<SortSpec> {
    let Some(value) = raw.get(RawParams::SORT) else {
        return Ok(SortSpec::default());
    };
    value
        .split_whitespace()
        .map(|token| token.parse::<SortField>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(SortSpec)
        .map_err(|_| reject(RawParams::SORT, value))
}

/// `defaultOperator`: `AND` or `OR` in any case, default `AND`.
pub fn parse_default_operator(raw: &RawParams) -> Result<Connector> {
    let Some(value) = raw.get(RawParams::DEFAULT_OPERATOR) else {
        return Ok(Connector::default());
    };
    value
        .trim()
        .parse()
        .map_err(|_| reject(RawParams::DEFAULT_OPERATOR, value))
}
