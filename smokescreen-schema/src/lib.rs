//! # smokescreen-schema
//!
//! The textual inputs of Smokescreen.
//!
//! This crate provides:
//! - The include selector grammar (`user{posts:limit(5)},comments`) and the
//!   [`IncludeSet`] it parses into
//! - The definition mini-language (`relation:users|default`) used by include
//!   declarations and prop formatting
//! - Configuration parser for `smokescreen.toml` files
//!
//! ## Example
//!
//! ```rust
//! use smokescreen_schema::{IncludeDeclarations, IncludeMap, parse_includes};
//!
//! let includes = parse_includes("owner,comments{author}");
//! assert_eq!(includes.base_keys(), vec!["owner", "comments"]);
//!
//! let map = IncludeMap::compute(
//!     &IncludeDeclarations::new()
//!         .with("owner", "relation:users|default")
//!         .with("comments", "relation|collection"),
//! )?;
//! assert_eq!(map.defaults(), vec!["owner"]);
//! # Ok::<(), smokescreen_schema::ParseError>(())
//! ```

pub mod case;
pub mod config;
pub mod definition;
pub mod error;
pub mod includes;

pub use config::SmokescreenConfig;
pub use definition::{
    Definition, DefinitionParser, IncludeDeclarations, IncludeMap, IncludeMapEntry,
    PropDefinition, ResourceType,
};
pub use error::{ParseError, ParseResult};
pub use includes::{IncludeParse, IncludeParser, IncludeSet, ParamMap, ParamValue, parse_includes};
