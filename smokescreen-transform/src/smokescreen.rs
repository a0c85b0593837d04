//! The [`Smokescreen`] façade: set a resource, request includes, get output.
//!
//! ```rust
//! use serde_json::json;
//! use smokescreen_transform::{Item, Smokescreen, TransformerKind};
//!
//! let mut smokescreen = Smokescreen::new().item(
//!     Item::new(json!({"id": 1, "secret": "x"}))
//!         .with_transformer(TransformerKind::callable(|user| json!({"id": user["id"]}))),
//! );
//! smokescreen.parse_includes("posts");
//!
//! assert_eq!(smokescreen.to_json().unwrap(), r#"{"id":1}"#);
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use smokescreen_schema::{IncludeParse, IncludeParser, IncludeSet, SmokescreenConfig};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::compositor::CompositorKind;
use crate::error::{TransformError, TransformResult};
use crate::pipeline::Pipeline;
use crate::relations::RelationLoader;
use crate::resource::{Collection, Item, Resource};
use crate::serializer::SerializerKind;
use crate::smokescreen_debug;
use crate::transformer::{TransformerKind, TransformerResolver};

/// Entry point for transforming a resource.
///
/// Configure once, then set a resource and includes per request. Clones share
/// the configured collaborators.
#[derive(Clone, Default)]
pub struct Smokescreen {
    resource: Option<Resource>,
    includes: IncludeSet,
    include_parser: Option<Arc<dyn IncludeParse>>,
    serializer: Option<SerializerKind>,
    compositor: Option<CompositorKind>,
    relation_loader: Option<Arc<dyn RelationLoader>>,
    transformer_resolver: Option<Arc<dyn TransformerResolver>>,
    pretty_json: bool,
}

impl Smokescreen {
    /// An empty façade with the default serializer and compositor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configuration: serializer and compositor by name, JSON
    /// formatting.
    pub fn from_config(config: &SmokescreenConfig) -> TransformResult<Self> {
        debug!(
            serializer = %config.output.serializer,
            compositor = %config.output.compositor,
            "configuring smokescreen"
        );
        Ok(Self {
            serializer: Some(SerializerKind::from_name(&config.output.serializer)?),
            compositor: Some(CompositorKind::from_name(&config.output.compositor)?),
            pretty_json: config.output.pretty_json,
            ..Self::default()
        })
    }

    /// Set an item as the resource.
    pub fn item(mut self, item: impl Into<Item>) -> Self {
        self.resource = Some(Resource::Item(item.into()));
        self
    }

    /// Set a collection as the resource.
    pub fn collection(mut self, collection: impl Into<Collection>) -> Self {
        self.resource = Some(Resource::Collection(collection.into()));
        self
    }

    /// Set a collection as the resource and configure it in place, eg. to
    /// attach a paginator.
    pub fn collection_with<F>(mut self, collection: impl Into<Collection>, configure: F) -> Self
    where
        F: FnOnce(&mut Collection),
    {
        let mut collection = collection.into();
        configure(&mut collection);
        self.resource = Some(Resource::Collection(collection));
        self
    }

    /// The resource, if set.
    pub fn resource(&self) -> Option<&Resource> {
        self.resource.as_ref()
    }

    /// Set or replace the resource.
    pub fn set_resource(&mut self, resource: impl Into<Resource>) -> &mut Self {
        self.resource = Some(resource.into());
        self
    }

    /// Set any serializable value as the resource, emitted without
    /// transformation. Only objects, lists and null are accepted.
    pub fn set_serializable<T: Serialize + ?Sized>(&mut self, data: &T) -> TransformResult<&mut Self> {
        let value = serde_json::to_value(data)?;
        match value {
            Value::Object(_) | Value::Array(_) | Value::Null => {
                self.resource = Some(Resource::Raw(value));
                Ok(self)
            }
            other => Err(TransformError::unhandled_resource(format!(
                "cannot use `{other}` as a resource"
            ))),
        }
    }

    /// The resource's transformer.
    pub fn transformer(&self) -> TransformResult<Option<&TransformerKind>> {
        let resource = self.resource.as_ref().ok_or_else(TransformError::missing_resource)?;
        Ok(resource.transformer())
    }

    /// Attach a transformer to the resource.
    pub fn set_transformer(&mut self, transformer: impl Into<TransformerKind>) -> TransformResult<&mut Self> {
        let resource = self.resource.as_mut().ok_or_else(TransformError::missing_resource)?;
        resource.set_transformer(transformer)?;
        Ok(self)
    }

    /// Parse an include string, replacing any previous includes.
    pub fn parse_includes(&mut self, input: &str) -> &mut Self {
        self.includes = match &self.include_parser {
            Some(parser) => parser.parse(input),
            None => IncludeParser::new().parse(input),
        };
        self
    }

    /// The requested includes.
    pub fn includes(&self) -> &IncludeSet {
        &self.includes
    }

    /// Replace the requested includes.
    pub fn set_includes(&mut self, includes: IncludeSet) -> &mut Self {
        self.includes = includes;
        self
    }

    /// Use a custom include parser for [`parse_includes`](Self::parse_includes).
    pub fn set_include_parser(&mut self, parser: impl IncludeParse + 'static) -> &mut Self {
        self.include_parser = Some(Arc::new(parser));
        self
    }

    /// The default serializer. [`DefaultSerializer`](crate::DefaultSerializer)
    /// unless one was set.
    pub fn serializer(&self) -> SerializerKind {
        self.serializer.clone().unwrap_or_default()
    }

    /// Set the default serializer.
    pub fn set_serializer(&mut self, serializer: impl Into<SerializerKind>) -> &mut Self {
        self.serializer = Some(serializer.into());
        self
    }

    /// The default compositor. [`DefaultCompositor`](crate::DefaultCompositor)
    /// unless one was set.
    pub fn compositor(&self) -> CompositorKind {
        self.compositor.clone().unwrap_or_default()
    }

    /// Set the default compositor.
    pub fn set_compositor(&mut self, compositor: impl Into<CompositorKind>) -> &mut Self {
        self.compositor = Some(compositor.into());
        self
    }

    /// The relation loader, if any.
    pub fn relation_loader(&self) -> Option<&Arc<dyn RelationLoader>> {
        self.relation_loader.as_ref()
    }

    /// Set the relation loader.
    pub fn set_relation_loader(&mut self, loader: impl RelationLoader + 'static) -> &mut Self {
        self.relation_loader = Some(Arc::new(loader));
        self
    }

    /// The transformer resolver, if any.
    pub fn transformer_resolver(&self) -> Option<&Arc<dyn TransformerResolver>> {
        self.transformer_resolver.as_ref()
    }

    /// Set the transformer resolver.
    pub fn set_transformer_resolver(&mut self, resolver: impl TransformerResolver + 'static) -> &mut Self {
        self.transformer_resolver = Some(Arc::new(resolver));
        self
    }

    /// Indent [`to_json`](Self::to_json) output.
    pub fn set_pretty_json(&mut self, pretty: bool) -> &mut Self {
        self.pretty_json = pretty;
        self
    }

    /// Transform the resource. Null output becomes an empty object.
    pub fn to_array(&self) -> TransformResult<Value> {
        let resource = self.resource.clone().ok_or_else(TransformError::missing_resource)?;
        smokescreen_debug!(
            includes = ?self.includes.base_keys(),
            key = ?resource.resource_key(),
            "transforming resource"
        );

        let mut pipeline = Pipeline::new()
            .with_serializer(self.serializer())
            .with_compositor(self.compositor());
        if let Some(loader) = &self.relation_loader {
            pipeline = pipeline.with_relation_loader(Arc::clone(loader));
        }
        if let Some(resolver) = &self.transformer_resolver {
            pipeline = pipeline.with_transformer_resolver(Arc::clone(resolver));
        }

        match pipeline.run(resource, self.includes.clone())? {
            Value::Null => Ok(Value::Object(Map::new())),
            output => Ok(output),
        }
    }

    /// Transform the resource and encode it as JSON.
    pub fn to_json(&self) -> TransformResult<String> {
        if self.pretty_json {
            return self.to_json_pretty();
        }
        Ok(serde_json::to_string(&self.to_array()?)?)
    }

    /// Transform the resource and encode it as indented JSON.
    pub fn to_json_pretty(&self) -> TransformResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_array()?)?)
    }

    /// Transform the resource and deserialize the output into `T`.
    pub fn to_object<T: DeserializeOwned>(&self) -> TransformResult<T> {
        Ok(serde_json::from_value(self.to_array()?)?)
    }
}

impl fmt::Debug for Smokescreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Smokescreen")
            .field("resource", &self.resource)
            .field("includes", &self.includes)
            .field("serializer", &self.serializer)
            .field("compositor", &self.compositor)
            .field("relation_loader", &self.relation_loader.is_some())
            .field("transformer_resolver", &self.transformer_resolver.is_some())
            .field("pretty_json", &self.pretty_json)
            .finish_non_exhaustive()
    }
}
