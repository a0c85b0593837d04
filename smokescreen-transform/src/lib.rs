//! # smokescreen-transform
//!
//! The transformation pipeline for Smokescreen.
//!
//! This crate provides:
//! - Resources ([`Item`], [`Collection`]) wrapping raw records
//! - The [`Transformer`] contract, with declarative [`Prop`]s
//! - The recursive include [`Pipeline`]
//! - Pluggable [`Serializer`]s and [`Compositor`]s
//! - Relation loading and transformer resolution hooks
//! - The [`Smokescreen`] façade
//!
//! ## Transforming with includes
//!
//! ```rust
//! use serde_json::json;
//! use smokescreen_transform::{Collection, IncludeDeclarations, Prop, Smokescreen, Transformer};
//!
//! struct BookTransformer;
//!
//! impl Transformer for BookTransformer {
//!     fn props(&self) -> Vec<Prop> {
//!         vec![Prop::defined("id", "int"), Prop::new("title")]
//!     }
//!
//!     fn includes(&self) -> IncludeDeclarations {
//!         IncludeDeclarations::new().with("authors", "collection")
//!     }
//! }
//!
//! let books = Collection::new(vec![json!({
//!     "id": "1",
//!     "title": "Dune",
//!     "isbn": "0441013597",
//!     "authors": [{"name": "Frank Herbert"}],
//! })])
//! .with_transformer(BookTransformer);
//!
//! let mut smokescreen = Smokescreen::new().collection(books);
//! smokescreen.parse_includes("authors");
//!
//! assert_eq!(
//!     smokescreen.to_array()?,
//!     json!({"data": [{
//!         "id": 1,
//!         "title": "Dune",
//!         "authors": {"data": [{"name": "Frank Herbert"}]},
//!     }]})
//! );
//! # Ok::<(), smokescreen_transform::TransformError>(())
//! ```
//!
//! ## Serializers
//!
//! ```rust
//! use serde_json::json;
//! use smokescreen_transform::{Collection, SimpleCollectionSerializer, Smokescreen};
//!
//! let mut smokescreen = Smokescreen::new().collection(Collection::new(vec![json!({"id": 1})]));
//! smokescreen.set_serializer(SimpleCollectionSerializer);
//! assert_eq!(smokescreen.to_array()?, json!([{"id": 1}]));
//! # Ok::<(), smokescreen_transform::TransformError>(())
//! ```

pub mod compositor;
pub mod error;
pub mod logging;
pub mod pagination;
pub mod pipeline;
pub mod record;
pub mod relations;
pub mod resource;
pub mod serializer;
pub mod smokescreen;
pub mod transformer;

mod scope;

pub use compositor::{ComposeFn, Compositor, CompositorKind, DefaultCompositor};
pub use error::{BoxError, TransformError, TransformResult};
pub use pagination::{Cursor, CursorPosition, Page, PaginationKind, Paginator};
pub use pipeline::Pipeline;
pub use record::{RecordAccess, into_object, passthrough, set_path};
pub use relations::RelationLoader;
pub use resource::{Collection, Item, Resource};
pub use serializer::{
    DefaultSerializer, SerializeFn, Serializer, SerializerKind, SimpleCollectionSerializer,
};
pub use smokescreen::Smokescreen;
pub use transformer::{
    IncludeContext, KeyedTransformerResolver, Prop, PropFn, TransformFn, Transformer,
    TransformerKind, TransformerRef, TransformerResolver, format_prop_value, with_props,
};

// Re-export the schema types transformers are written against
pub use smokescreen_schema::{
    IncludeDeclarations, IncludeMap, IncludeMapEntry, IncludeParse, IncludeParser, IncludeSet,
    ParamMap, ParamValue, ParseError, PropDefinition, ResourceType, SmokescreenConfig,
    parse_includes,
};

// Re-export logging utilities
pub use logging::{
    get_log_format, get_log_level, init as init_logging, init_debug, init_from_config,
    init_with_level, is_debug_enabled,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::compositor::{Compositor, CompositorKind, DefaultCompositor};
    pub use crate::error::{TransformError, TransformResult};
    pub use crate::pagination::{Cursor, CursorPosition, Page, Paginator};
    pub use crate::relations::RelationLoader;
    pub use crate::resource::{Collection, Item, Resource};
    pub use crate::serializer::{
        DefaultSerializer, Serializer, SerializerKind, SimpleCollectionSerializer,
    };
    pub use crate::smokescreen::Smokescreen;
    pub use crate::transformer::{
        IncludeContext, KeyedTransformerResolver, Prop, Transformer, TransformerKind,
        TransformerResolver,
    };
    pub use smokescreen_schema::{IncludeDeclarations, IncludeSet, parse_includes};
}
