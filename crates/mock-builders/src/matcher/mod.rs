//! Matcher system for mock request handlers.
//!
//! A matcher describes the expected shape of one request dimension (headers,
//! search parameters, body or GraphQL variables), either as a literal JSON
//! value or as a predicate function.
//!
//! # Module Structure
//!
//! - `evaluate` - `Matcher`, comparison modes and dimensions
//! - `deep_equals` - Deep equality, containment and key normalization
//! - `set` - `MatcherSet`, the matchers declared for one handler

mod deep_equals;
mod evaluate;
mod set;

pub use deep_equals::{is_equal, is_match, lowercase_keys, parse_query_string};
pub(crate) use deep_equals::parse_form_pairs;
pub use evaluate::{evaluate, Dimension, MatchMode, Matcher, MatcherFn};
pub use set::MatcherSet;
