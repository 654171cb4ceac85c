//! Translate CRAF query parameters (`filter`, `sort`, `skip`, `limit`,
//! `fields`, `defaultOperator`) into native backend queries.
//!
//! ```
//! use craf::{Backend, RawParams, TranslatedQuery, translate};
//!
//! let raw = RawParams::new().with("filter", "number:!=4").with("limit", "10");
//! let TranslatedQuery::Search(query) = translate(Backend::Search, &raw).unwrap() else {
//!     unreachable!()
//! };
//! assert_eq!(query.to_query_string(), "?&from=0&size=10&sort=&_source=&default_operator=AND&q=!(number:4)");
//! ```

pub mod config;
pub mod dsl;
pub mod error;
pub mod params;
pub mod render;

pub use config::{RawParams, RequestConfig};
pub use error::{Error, FilterError, Result};
pub use render::{Backend, QueryRenderer, TranslatedQuery, translate};
