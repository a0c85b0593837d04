//! # Smokescreen
//!
//! Transform and serialize domain data into client-facing API responses.
//!
//! Smokescreen provides:
//! - A compact include grammar (`posts{comments:limit(5)},owner`) clients use
//!   to request nested resources
//! - Transformers that pick, rename and format fields and declare includes
//! - Sparse fieldsets, relation loading hooks and pagination blocks
//! - Pluggable serializers and compositors for the output envelope
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::{Map, Value, json};
//! use smokescreen::prelude::*;
//!
//! struct UserTransformer;
//!
//! impl Transformer for UserTransformer {
//!     fn transform(&self, user: &Value) -> TransformResult<Map<String, Value>> {
//!         let mut data = Map::new();
//!         data.insert("id".into(), user["id"].clone());
//!         data.insert("name".into(), user["name"].clone());
//!         Ok(data)
//!     }
//!
//!     fn includes(&self) -> IncludeDeclarations {
//!         IncludeDeclarations::new().with("posts", "collection|relation")
//!     }
//! }
//!
//! let user = json!({
//!     "id": 1,
//!     "name": "Ada",
//!     "password": "hunter2",
//!     "posts": [{"id": 10, "title": "Notes"}],
//! });
//!
//! let mut smokescreen = Smokescreen::new().item(Item::new(user).with_transformer(UserTransformer));
//! smokescreen.parse_includes("posts");
//!
//! assert_eq!(
//!     smokescreen.to_array()?,
//!     json!({
//!         "id": 1,
//!         "name": "Ada",
//!         "posts": {"data": [{"id": 10, "title": "Notes"}]},
//!     })
//! );
//! # Ok::<(), smokescreen::TransformError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Include grammar, definition parsing and configuration.
pub mod schema {
    pub use smokescreen_schema::*;
}

/// Resources, transformers, the pipeline and output strategies.
pub mod transform {
    pub use smokescreen_transform::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use smokescreen_transform::prelude::*;
}

// Re-export key types at the crate root
pub use schema::{IncludeSet, ParseError, SmokescreenConfig, parse_includes};
pub use transform::{
    Collection, Item, Pipeline, Resource, Smokescreen, TransformError, TransformResult,
    Transformer, TransformerKind,
};
