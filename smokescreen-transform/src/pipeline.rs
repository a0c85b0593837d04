//! The transformation pipeline.
//!
//! A run goes through three passes over the include tree:
//!
//! 1. **Build**: starting at the root, resolve each scope's transformer, load
//!    its relations, split its data into nodes and create one child scope per
//!    resolved include of every node, recursively.
//! 2. **Transform**: every node, pre-order.
//! 3. **Serialize and compose**: every scope post-order, so a child is
//!    serialized and grafted onto its parent record before the parent scope
//!    is itself serialized.
//!
//! ```rust
//! use serde_json::json;
//! use smokescreen_schema::parse_includes;
//! use smokescreen_transform::{Collection, Pipeline};
//!
//! let resource = Collection::new(vec![json!({"id": 1}), json!({"id": 2})]);
//! let output = Pipeline::new().run(resource.into(), parse_includes("")).unwrap();
//! assert_eq!(output, json!({"data": [{"id": 1}, {"id": 2}]}));
//! ```

use serde_json::{Map, Value};
use smokescreen_schema::{IncludeMapEntry, IncludeSet, ResourceType};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::compositor::CompositorKind;
use crate::error::{TransformError, TransformResult};
use crate::record::{RecordAccess, into_object, passthrough};
use crate::relations::RelationLoader;
use crate::resource::{Collection, Item, Resource};
use crate::scope::{NodeId, Scope, ScopeId, ScopeTree};
use crate::serializer::SerializerKind;
use crate::smokescreen_trace;
use crate::transformer::{IncludeContext, TransformerKind, TransformerResolver};

/// Runs resources through transformation, serialization and composition.
///
/// Resource-level serializer and compositor overrides take precedence over
/// the pipeline's.
#[derive(Clone, Default)]
pub struct Pipeline {
    serializer: SerializerKind,
    compositor: CompositorKind,
    relation_loader: Option<Arc<dyn RelationLoader>>,
    transformer_resolver: Option<Arc<dyn TransformerResolver>>,
}

impl Pipeline {
    /// A pipeline with the default serializer and compositor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default serializer.
    pub fn with_serializer(mut self, serializer: impl Into<SerializerKind>) -> Self {
        self.serializer = serializer.into();
        self
    }

    /// Set the default compositor.
    pub fn with_compositor(mut self, compositor: impl Into<CompositorKind>) -> Self {
        self.compositor = compositor.into();
        self
    }

    /// Set the relation loader.
    pub fn with_relation_loader(mut self, loader: Arc<dyn RelationLoader>) -> Self {
        self.relation_loader = Some(loader);
        self
    }

    /// Set the transformer resolver.
    pub fn with_transformer_resolver(mut self, resolver: Arc<dyn TransformerResolver>) -> Self {
        self.transformer_resolver = Some(resolver);
        self
    }

    /// The default serializer.
    pub fn serializer(&self) -> &SerializerKind {
        &self.serializer
    }

    /// The default compositor.
    pub fn compositor(&self) -> &CompositorKind {
        &self.compositor
    }

    /// Transform, serialize and compose `resource` with the requested includes.
    pub fn run(&self, resource: Resource, includes: IncludeSet) -> TransformResult<Value> {
        debug!(
            collection = resource.is_collection(),
            includes = includes.len(),
            "running pipeline"
        );

        let mut tree = ScopeTree::new();
        let root = tree.add_scope(Scope::new(resource, includes, None, None));
        self.create_includes_tree(&mut tree, root)?;

        for node in tree.node_traversal(root) {
            self.transform_node(&mut tree, node)?;
        }

        let mut root_data = Map::new();
        for scope in tree.scope_traversal(root) {
            self.serialize_scope(&mut tree, scope);
            self.compose_scope(&mut tree, &mut root_data, scope);
        }

        let output = std::mem::take(&mut tree.scope_mut(root).serialized);
        Ok(merge_root(output, root_data))
    }

    fn create_includes_tree(&self, tree: &mut ScopeTree, id: ScopeId) -> TransformResult<()> {
        self.prepare_scope(tree.scope_mut(id))?;

        let nodes = create_nodes(tree, id);
        tree.scope_mut(id).nodes = nodes;

        let resolved = tree.scope(id).resolved_include_keys()?;
        if !resolved.is_empty() {
            let include_map = tree.scope(id).include_map()?;
            for node in tree.scope_nodes(id).to_vec() {
                let mut included = Vec::with_capacity(resolved.len());
                for key in &resolved {
                    if let Some(entry) = include_map.get(key) {
                        included.push(self.create_included_scope(tree, id, node, key, entry)?);
                    }
                }
                tree.node_mut(node).included = included;
            }
        }

        for child in tree.included_scopes(id) {
            self.create_includes_tree(tree, child)?;
        }
        Ok(())
    }

    /// Resolve a missing transformer, then hand the relations of the resolved
    /// includes to the relation loader.
    fn prepare_scope(&self, scope: &mut Scope) -> TransformResult<()> {
        if matches!(scope.resource, Resource::Raw(_)) {
            return Ok(());
        }

        if !scope.resource.has_transformer() {
            if let Some(resolver) = &self.transformer_resolver {
                if let Some(transformer) = resolver.resolve(&scope.resource) {
                    debug!(key = ?scope.resource.resource_key(), "resolved transformer");
                    scope.resource.set_transformer(transformer)?;
                }
            }
        }

        let Some(loader) = &self.relation_loader else {
            return Ok(());
        };
        let relations = scope.resolved_relationship_keys()?;
        if relations.is_empty() {
            return Ok(());
        }

        debug!(relations = ?relations, "loading relations");
        loader
            .load(&mut scope.resource, &relations)
            .map_err(|source| TransformError::RelationLoad { relations, source })
    }

    fn create_included_scope(
        &self,
        tree: &mut ScopeTree,
        id: ScopeId,
        node: NodeId,
        key: &str,
        entry: &IncludeMapEntry,
    ) -> TransformResult<ScopeId> {
        let scope = tree.scope(id);
        let record = &tree.node(node).data;
        let context = IncludeContext::new(key, &scope.includes);

        let hooked = scope
            .strategy()
            .and_then(|transformer| transformer.get().include(&entry.method, record, &context));
        let resource = match hooked {
            Some(resource) => {
                trace!(include = key, method = %entry.method, "include from transformer hook");
                resource?
            }
            None => auto_wire(key, entry, record)?,
        };

        let includes = scope.includes.splice(key);
        let child_key = resource
            .resource_key()
            .map_or_else(|| key.to_string(), str::to_string);

        Ok(tree.add_scope(Scope::new(resource, includes, Some(node), Some(child_key))))
    }

    fn transform_node(&self, tree: &mut ScopeTree, id: NodeId) -> TransformResult<()> {
        let node = tree.node(id);
        let transformed = transform(tree.scope(node.scope), &node.data)?;
        tree.node_mut(id).transformed = transformed;
        Ok(())
    }

    fn serialize_scope(&self, tree: &mut ScopeTree, id: ScopeId) {
        let records = tree.take_transformed(id);
        let scope = tree.scope(id);
        let key = scope.key.as_deref().or(scope.resource.resource_key());
        let serializer = scope.resource.serializer().unwrap_or(&self.serializer);

        let serialized = match &scope.resource {
            Resource::Raw(_) => single(records),
            Resource::Item(_) => serializer.serialize_item(key, single(records)),
            Resource::Collection(collection) => serializer.serialize_collection(
                key,
                records,
                collection.paginator(),
                collection.cursor(),
            ),
        };

        smokescreen_trace!(key = ?key, "serialized scope");
        tree.scope_mut(id).serialized = serialized;
    }

    /// Graft a serialized child onto its parent record.
    fn compose_scope(&self, tree: &mut ScopeTree, root_data: &mut Map<String, Value>, id: ScopeId) {
        let scope = tree.scope(id);
        let (Some(parent), Some(key)) = (scope.parent, scope.key.clone()) else {
            return;
        };

        let compositor = scope
            .resource
            .compositor()
            .unwrap_or(&self.compositor)
            .clone();
        if compositor.is_disabled() {
            trace!(include = %key, "compositor disabled, dropping include");
            return;
        }

        let is_collection = scope.is_collection();
        let data = std::mem::take(&mut tree.scope_mut(id).serialized);
        let node = tree.node_mut(parent);
        let mut parent_data = into_object(std::mem::take(&mut node.transformed));
        compositor.compose(root_data, &mut parent_data, &key, data, is_collection);
        node.transformed = Value::Object(parent_data);
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("serializer", &self.serializer)
            .field("compositor", &self.compositor)
            .field("relation_loader", &self.relation_loader.is_some())
            .field("transformer_resolver", &self.transformer_resolver.is_some())
            .finish()
    }
}

/// Split a scope's data into records: one for items and raw data, one per
/// entry for collections, none for a null collection.
fn create_nodes(tree: &mut ScopeTree, id: ScopeId) -> Option<Vec<NodeId>> {
    let records = match &mut tree.scope_mut(id).resource {
        Resource::Item(item) => Some(vec![std::mem::take(&mut item.data)]),
        Resource::Collection(collection) => collection.data.take(),
        Resource::Raw(value) => Some(vec![std::mem::take(value)]),
    }?;

    Some(
        records
            .into_iter()
            .map(|record| tree.add_node(id, record))
            .collect(),
    )
}

/// Read an include off the record when the transformer has no hook for it.
fn auto_wire(key: &str, entry: &IncludeMapEntry, record: &Value) -> TransformResult<Resource> {
    let data = if record.is_null() {
        Value::Null
    } else if record.is_keyed() {
        record.field(key).cloned().unwrap_or(Value::Null)
    } else {
        return Err(TransformError::include(
            key,
            format!("Cannot auto-wire include for {key}: Cannot get include data"),
        ));
    };

    trace!(include = key, "auto-wiring include");
    match entry.resource_type {
        Some(ResourceType::Collection) => Ok(Collection::from_value(data)?.into()),
        _ => Ok(Item::new(data).into()),
    }
}

fn transform(scope: &Scope, record: &Value) -> TransformResult<Value> {
    if record.is_null() {
        return Ok(Value::Null);
    }

    match scope.transformer() {
        None => Ok(passthrough(record.clone())),
        Some(TransformerKind::Callable(f)) => Ok(passthrough(f(record))),
        Some(TransformerKind::Strategy(transformer)) => {
            let data = transformer.get().transform(record)?;
            Ok(Value::Object(scope.filter_data(data)?))
        }
    }
}

fn single(records: Option<Vec<Value>>) -> Value {
    records
        .and_then(|mut records| records.pop())
        .unwrap_or(Value::Null)
}

/// Entries a compositor wrote to the root accumulator override the root
/// output's own keys.
fn merge_root(output: Value, root_data: Map<String, Value>) -> Value {
    match output {
        Value::Object(mut output) => {
            output.extend(root_data);
            Value::Object(output)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::CompositorKind;
    use crate::error::BoxError;
    use crate::pagination::Page;
    use crate::serializer::SerializerKind;
    use crate::transformer::Transformer;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use smokescreen_schema::{IncludeDeclarations, parse_includes};

    struct PostTransformer;

    impl Transformer for PostTransformer {
        fn transform(&self, record: &Value) -> TransformResult<Map<String, Value>> {
            let mut data = Map::new();
            data.insert("id".into(), record["id"].clone());
            data.insert("title".into(), record["title"].clone());
            Ok(data)
        }

        fn includes(&self) -> IncludeDeclarations {
            IncludeDeclarations::new()
                .with("author", "relation:users|default")
                .with("comments", "collection|relation")
        }

        fn include(
            &self,
            method: &str,
            record: &Value,
            context: &IncludeContext<'_>,
        ) -> Option<TransformResult<Resource>> {
            match method {
                "includeAuthor" => Some(Ok(Item::new(json!({"name": record["author"]}))
                    .with_transformer(TransformerKind::callable(|author| author.clone()))
                    .into())),
                "includeComments" => {
                    let limit = context
                        .param("limit")
                        .and_then(|limit| limit.as_i64())
                        .unwrap_or(10) as usize;
                    let comments = record["comments"].as_array().cloned().unwrap_or_default();
                    Some(Ok(Collection::new(comments.into_iter().take(limit)).into()))
                }
                _ => None,
            }
        }
    }

    fn post() -> Resource {
        Item::new(json!({
            "id": 1,
            "title": "Hello",
            "author": "ada",
            "comments": [{"body": "first"}, {"body": "second"}]
        }))
        .with_transformer(PostTransformer)
        .into()
    }

    #[test]
    fn test_default_includes() {
        let output = Pipeline::new().run(post(), IncludeSet::new()).unwrap();
        assert_eq!(
            output,
            json!({"id": 1, "title": "Hello", "author": {"name": "ada"}})
        );
    }

    #[test]
    fn test_requested_include_with_params() {
        let output = Pipeline::new()
            .run(post(), parse_includes("comments:limit(1)"))
            .unwrap();
        assert_eq!(
            output,
            json!({"id": 1, "title": "Hello", "comments": {"data": [{"body": "first"}]}})
        );
    }

    #[test]
    fn test_relation_loader_receives_resolved_relations() {
        let calls: Arc<Mutex<Vec<Vec<String>>>> = Arc::default();
        let recorded = Arc::clone(&calls);
        let loader = move |_: &mut Resource, relations: &[String]| -> Result<(), BoxError> {
            recorded.lock().push(relations.to_vec());
            Ok(())
        };

        Pipeline::new()
            .with_relation_loader(Arc::new(loader))
            .run(post(), parse_includes("author,comments"))
            .unwrap();
        assert_eq!(*calls.lock(), vec![vec!["users".to_string(), "comments".to_string()]]);
    }

    #[test]
    fn test_relation_loader_failure_propagates() {
        let loader = |_: &mut Resource, _: &[String]| -> Result<(), BoxError> {
            Err("database is down".into())
        };
        let err = Pipeline::new()
            .with_relation_loader(Arc::new(loader))
            .run(post(), IncludeSet::new())
            .unwrap_err();
        assert!(matches!(err, TransformError::RelationLoad { ref relations, .. } if relations == &["users"]));
    }

    #[test]
    fn test_collection_with_pagination() {
        let resource = Collection::new(vec![json!({"id": 1, "title": "a"})])
            .with_transformer(PostTransformer)
            .with_paginator(Page::new(1, 1, 2));
        let output = Pipeline::new()
            .run(resource.into(), parse_includes("author"))
            .unwrap();

        assert_eq!(output["data"][0]["author"], json!({"name": null}));
        assert_eq!(output["pagination"]["total_pages"], json!(2));
        assert_eq!(output["pagination"]["links"]["next"], json!("?page=2"));
        assert!(output["pagination"]["links"].get("previous").is_none());
    }

    #[test]
    fn test_null_collection_and_item() {
        let output = Pipeline::new()
            .run(Collection::null().with_transformer(PostTransformer).into(), IncludeSet::new())
            .unwrap();
        assert_eq!(output, Value::Null);

        let output = Pipeline::new()
            .run(Item::default().into(), IncludeSet::new())
            .unwrap();
        assert_eq!(output, Value::Null);
    }

    #[test]
    fn test_raw_include_is_not_serialized() {
        struct Gallery;

        impl Transformer for Gallery {
            fn transform(&self, record: &Value) -> TransformResult<Map<String, Value>> {
                Ok(into_object(record.clone()))
            }

            fn includes(&self) -> IncludeDeclarations {
                IncludeDeclarations::new().key("images")
            }

            fn include(
                &self,
                _method: &str,
                _record: &Value,
                _context: &IncludeContext<'_>,
            ) -> Option<TransformResult<Resource>> {
                Some(Ok(Resource::raw(json!([{"url": "a.png"}]))))
            }
        }

        let output = Pipeline::new()
            .with_serializer(SerializerKind::callable(|_, data| json!({"wrapped": data})))
            .run(Item::new(json!({"id": 1})).with_transformer(Gallery).into(), parse_includes("images"))
            .unwrap();
        assert_eq!(
            output,
            json!({"wrapped": {"id": 1, "images": [{"url": "a.png"}]}})
        );
    }

    #[test]
    fn test_auto_wire_requires_keyed_record() {
        struct Tagged;

        impl Transformer for Tagged {
            fn transform(&self, _record: &Value) -> TransformResult<Map<String, Value>> {
                Ok(Map::new())
            }

            fn includes(&self) -> IncludeDeclarations {
                IncludeDeclarations::new().key("tags")
            }
        }

        let err = Pipeline::new()
            .run(
                Collection::new(vec![json!("not a record")]).with_transformer(Tagged).into(),
                parse_includes("tags"),
            )
            .unwrap_err();
        assert!(matches!(err, TransformError::Include { ref key, .. } if key == "tags"));
    }

    #[test]
    fn test_root_compositor_writes() {
        let compositor = CompositorKind::callable(|root, _parent, key, data| {
            root.insert(format!("included_{key}"), data);
        });
        let output = Pipeline::new()
            .with_compositor(compositor)
            .run(post(), IncludeSet::new())
            .unwrap();
        assert_eq!(
            output,
            json!({"id": 1, "title": "Hello", "included_author": {"name": "ada"}})
        );
    }

    #[test]
    fn test_disabled_compositor_drops_include() {
        let output = Pipeline::new()
            .with_compositor(CompositorKind::Disabled)
            .run(post(), IncludeSet::new())
            .unwrap();
        assert_eq!(output, json!({"id": 1, "title": "Hello"}));
    }
}
