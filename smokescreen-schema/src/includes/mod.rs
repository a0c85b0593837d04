//! Include selectors: the grammar parser and the resulting include set.

mod parser;
mod set;

pub use parser::{IncludeParse, IncludeParser};
pub use set::{IncludeSet, ParamMap, ParamValue};

/// Parse an include string with the default parser.
///
/// ```rust
/// use smokescreen_schema::parse_includes;
///
/// let includes = parse_includes("cast{actor,movies:limit(3)}:offset(5)");
/// assert!(includes.has("cast.movies"));
/// assert_eq!(includes.param("cast", "offset").and_then(|v| v.as_i64()), Some(5));
/// ```
pub fn parse_includes(input: &str) -> IncludeSet {
    IncludeParser::new().parse(input)
}
