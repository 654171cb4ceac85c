//! Error types for CRAF parameter translation.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Translation errors.
///
/// Every failure names the offending parameter and carries its raw value so
/// callers can build a precise client-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid value for parameter '{name}': '{value}'")]
    InvalidParameter { name: &'static str, value: String },
}

impl Error {
    pub fn invalid(name: &'static str, value: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            value: value.into(),
        }
    }

    /// Name of the rejected parameter.
    pub fn parameter(&self) -> &'static str {
        match self {
            Error::InvalidParameter { name, .. } => name,
        }
    }

    /// Raw value of the rejected parameter.
    pub fn value(&self) -> &str {
        match self {
            Error::InvalidParameter { value, .. } => value,
        }
    }
}

/// A filter string that failed grammar validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid filter '{filter}': {reason}")]
pub struct FilterError {
    pub filter: String,
    pub reason: String,
}

impl FilterError {
    pub fn new(filter: &str, reason: impl Into<String>) -> Self {
        Self {
            filter: filter.to_string(),
            reason: reason.into(),
        }
    }
}

/// The grammar reason stays in the log; callers only see the raw filter.
impl From<FilterError> for Error {
    fn from(err: FilterError) -> Self {
        tracing::warn!("Rejected parameter 'filter': '{}': {}", err.filter, err.reason);
        Error::InvalidParameter {
            name: "filter",
            value: err.filter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_names_parameter_and_value() {
        let err = Error::invalid("sort", "name:middle");
        assert_eq!(
            err.to_string(),
            "invalid value for parameter 'sort': 'name:middle'"
        );
        assert_eq!(err.parameter(), "sort");
        assert_eq!(err.value(), "name:middle");
    }

    #[test]
    fn test_filter_error_keeps_raw_filter() {
        let err: Error = FilterError::new("(a:1", "expected ')'").into();
        assert_eq!(err, Error::invalid("filter", "(a:1"));
    }
}
