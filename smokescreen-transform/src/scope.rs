//! The include tree built for one pipeline run.
//!
//! Scopes (one per resource) and nodes (one per record) live in a flat arena
//! and refer to each other by index. A scope's parent is the node of the
//! record it was included from, so each record of a collection carries its
//! own included scopes.

use serde_json::{Map, Value};
use smokescreen_schema::{IncludeMap, IncludeSet};
use std::fmt;
use std::sync::Arc;

use crate::error::TransformResult;
use crate::resource::Resource;
use crate::transformer::{TransformerKind, TransformerRef};

/// Index of a scope in a [`ScopeTree`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ScopeId(usize);

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({})", self.0)
    }
}

/// Index of a node in a [`ScopeTree`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// One resource being processed, with the include set for its depth.
#[derive(Debug)]
pub(crate) struct Scope {
    pub(crate) resource: Resource,
    pub(crate) includes: IncludeSet,
    /// The record this scope was included from. `None` at the root.
    pub(crate) parent: Option<NodeId>,
    /// Key used for serialization and composition: the child resource's
    /// own key, else the include key. `None` at the root.
    pub(crate) key: Option<String>,
    /// `None` for a null collection.
    pub(crate) nodes: Option<Vec<NodeId>>,
    pub(crate) serialized: Value,
}

impl Scope {
    pub(crate) fn new(
        resource: Resource,
        includes: IncludeSet,
        parent: Option<NodeId>,
        key: Option<String>,
    ) -> Self {
        Self {
            resource,
            includes,
            parent,
            key,
            nodes: None,
            serialized: Value::Null,
        }
    }

    pub(crate) fn transformer(&self) -> Option<&TransformerKind> {
        self.resource.transformer()
    }

    /// The contract transformer, when one is attached. Callables have no
    /// includes or props.
    pub(crate) fn strategy(&self) -> Option<&TransformerRef> {
        self.transformer().and_then(TransformerKind::as_strategy)
    }

    pub(crate) fn is_collection(&self) -> bool {
        self.resource.is_collection()
    }

    pub(crate) fn include_map(&self) -> TransformResult<Arc<IncludeMap>> {
        match self.strategy() {
            Some(transformer) => transformer.include_map(),
            None => Ok(Arc::default()),
        }
    }

    /// Requested base keys, else the transformer's default includes.
    pub(crate) fn include_keys(&self) -> TransformResult<Vec<String>> {
        let requested = self.includes.base_keys();
        if !requested.is_empty() {
            return Ok(requested);
        }
        Ok(self.include_map()?.defaults())
    }

    /// Include keys that were requested (or defaulted) and are declared.
    pub(crate) fn resolved_include_keys(&self) -> TransformResult<Vec<String>> {
        let map = self.include_map()?;
        Ok(self
            .include_keys()?
            .into_iter()
            .filter(|key| map.contains(key))
            .collect())
    }

    /// Relation keys of the resolved includes, de-duplicated.
    pub(crate) fn resolved_relationship_keys(&self) -> TransformResult<Vec<String>> {
        let resolved = self.resolved_include_keys()?;
        Ok(self.include_map()?.relations_for(&resolved))
    }

    /// The sparse fieldset: requested keys that are not includes, else the
    /// transformer's default props.
    pub(crate) fn filter_props(&self) -> TransformResult<Vec<String>> {
        let resolved = self.resolved_include_keys()?;
        let props: Vec<String> = self
            .include_keys()?
            .into_iter()
            .filter(|key| !resolved.contains(key))
            .collect();
        if !props.is_empty() {
            return Ok(props);
        }
        Ok(self
            .strategy()
            .map(TransformerRef::default_props)
            .unwrap_or_default())
    }

    /// Apply the sparse fieldset. A filter that would leave nothing is ignored.
    pub(crate) fn filter_data(&self, data: Map<String, Value>) -> TransformResult<Map<String, Value>> {
        let props = self.filter_props()?;
        if props.is_empty() {
            return Ok(data);
        }

        let filtered: Map<String, Value> = data
            .iter()
            .filter(|(key, _)| props.contains(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if filtered.is_empty() {
            return Ok(data);
        }
        Ok(filtered)
    }
}

/// One record of a scope.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) scope: ScopeId,
    pub(crate) data: Value,
    pub(crate) transformed: Value,
    pub(crate) included: Vec<ScopeId>,
}

/// Arena holding every scope and node of a run.
#[derive(Debug, Default)]
pub(crate) struct ScopeTree {
    scopes: Vec<Scope>,
    nodes: Vec<Node>,
}

impl ScopeTree {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_scope(&mut self, scope: Scope) -> ScopeId {
        self.scopes.push(scope);
        ScopeId(self.scopes.len() - 1)
    }

    pub(crate) fn add_node(&mut self, scope: ScopeId, data: Value) -> NodeId {
        self.nodes.push(Node {
            scope,
            data,
            transformed: Value::Null,
            included: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub(crate) fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0]
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Nodes of a scope; empty for a null collection.
    pub(crate) fn scope_nodes(&self, id: ScopeId) -> &[NodeId] {
        self.scope(id).nodes.as_deref().unwrap_or_default()
    }

    /// Scopes included from any node of `id`, in node order.
    pub(crate) fn included_scopes(&self, id: ScopeId) -> Vec<ScopeId> {
        self.scope_nodes(id)
            .iter()
            .flat_map(|node| self.node(*node).included.iter().copied())
            .collect()
    }

    /// Pre-order: each node before the nodes of the scopes it includes.
    pub(crate) fn node_traversal(&self, root: ScopeId) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        self.collect_nodes(root, &mut order);
        order
    }

    fn collect_nodes(&self, scope: ScopeId, order: &mut Vec<NodeId>) {
        for node in self.scope_nodes(scope) {
            order.push(*node);
            for child in &self.node(*node).included {
                self.collect_nodes(*child, order);
            }
        }
    }

    /// Post-order: every included scope before the scope that includes it.
    pub(crate) fn scope_traversal(&self, root: ScopeId) -> Vec<ScopeId> {
        let mut order = Vec::with_capacity(self.scopes.len());
        self.collect_scopes(root, &mut order);
        order
    }

    fn collect_scopes(&self, scope: ScopeId, order: &mut Vec<ScopeId>) {
        for node in self.scope_nodes(scope) {
            for child in &self.node(*node).included {
                self.collect_scopes(*child, order);
            }
        }
        order.push(scope);
    }

    /// Move the transformed data out of a scope's nodes, in node order.
    /// `None` for a null collection.
    pub(crate) fn take_transformed(&mut self, id: ScopeId) -> Option<Vec<Value>> {
        let nodes = self.scope(id).nodes.clone()?;
        Some(
            nodes
                .iter()
                .map(|node| std::mem::take(&mut self.node_mut(*node).transformed))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Collection, Item};
    use crate::transformer::Transformer;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use smokescreen_schema::{IncludeDeclarations, parse_includes};

    struct PostTransformer;

    impl Transformer for PostTransformer {
        fn includes(&self) -> IncludeDeclarations {
            IncludeDeclarations::new()
                .with("owner", "relation:users|default")
                .with("comments", "relation:comments,users")
                .key("tags")
        }

        fn default_props(&self) -> Vec<String> {
            vec!["id".into(), "title".into()]
        }
    }

    fn scope(includes: &str) -> Scope {
        let resource = Item::new(json!({"id": 1})).with_transformer(PostTransformer);
        Scope::new(resource.into(), parse_includes(includes), None, None)
    }

    #[test]
    fn test_defaults_when_nothing_requested() {
        let scope = scope("");
        assert_eq!(scope.include_keys().unwrap(), vec!["owner"]);
        assert_eq!(scope.resolved_include_keys().unwrap(), vec!["owner"]);
        assert_eq!(scope.resolved_relationship_keys().unwrap(), vec!["users"]);
    }

    #[test]
    fn test_requested_keys_in_request_order() {
        let scope = scope("tags,unknown,comments{author}");
        assert_eq!(
            scope.resolved_include_keys().unwrap(),
            vec!["tags", "comments"]
        );
        assert_eq!(
            scope.resolved_relationship_keys().unwrap(),
            vec!["comments", "users"]
        );
    }

    #[test]
    fn test_filter_props() {
        let scope = scope("comments,title,body");
        assert_eq!(scope.filter_props().unwrap(), vec!["title", "body"]);

        let filtered = scope
            .filter_data(
                json!({"id": 1, "title": "Hi", "body": "..", "secret": true})
                    .as_object()
                    .cloned()
                    .unwrap(),
            )
            .unwrap();
        assert_eq!(Value::Object(filtered), json!({"title": "Hi", "body": ".."}));
    }

    #[test]
    fn test_default_props_apply_without_requested_fields() {
        let scope = scope("comments");
        assert_eq!(scope.filter_props().unwrap(), vec!["id", "title"]);
    }

    #[test]
    fn test_filter_never_empties_data() {
        let scope = scope("nickname");
        let data = json!({"id": 1, "title": "Hi"}).as_object().cloned().unwrap();
        let filtered = scope.filter_data(data.clone()).unwrap();
        assert_eq!(filtered, data);
    }

    #[test]
    fn test_traversal_orders() {
        //        A
        //      /   \
        //     B     C
        //    / \     \
        //   D   E     F
        let mut tree = ScopeTree::new();
        let leaf = || Scope::new(Item::default().into(), IncludeSet::new(), None, None);

        let a = tree.add_scope(leaf());
        let a_node = tree.add_node(a, Value::Null);
        tree.scope_mut(a).nodes = Some(vec![a_node]);

        let b = tree.add_scope(Scope::new(
            Collection::null().into(),
            IncludeSet::new(),
            Some(a_node),
            Some("b".into()),
        ));
        let b1 = tree.add_node(b, Value::Null);
        let b2 = tree.add_node(b, Value::Null);
        tree.scope_mut(b).nodes = Some(vec![b1, b2]);

        let c = tree.add_scope(leaf());
        let c_node = tree.add_node(c, Value::Null);
        tree.scope_mut(c).nodes = Some(vec![c_node]);
        tree.node_mut(a_node).included = vec![b, c];

        let d = tree.add_scope(leaf());
        let e = tree.add_scope(leaf());
        let f = tree.add_scope(leaf());
        tree.node_mut(b1).included = vec![d];
        tree.node_mut(b2).included = vec![e];
        tree.node_mut(c_node).included = vec![f];

        assert_eq!(tree.scope_traversal(a), vec![d, e, b, f, c, a]);
        assert_eq!(tree.node_traversal(a), vec![a_node, b1, b2, c_node]);
        assert_eq!(tree.included_scopes(b), vec![d, e]);
    }

    #[test]
    fn test_take_transformed() {
        let mut tree = ScopeTree::new();
        let collection = tree.add_scope(Scope::new(
            Collection::new(vec![json!(1), json!(2)]).into(),
            IncludeSet::new(),
            None,
            None,
        ));
        let first = tree.add_node(collection, json!(1));
        let second = tree.add_node(collection, json!(2));
        tree.scope_mut(collection).nodes = Some(vec![first, second]);
        tree.node_mut(first).transformed = json!({"n": 1});
        tree.node_mut(second).transformed = json!({"n": 2});

        assert_eq!(
            tree.take_transformed(collection),
            Some(vec![json!({"n": 1}), json!({"n": 2})])
        );
        assert_eq!(tree.node(first).transformed, Value::Null);

        let null = tree.add_scope(Scope::new(Collection::null().into(), IncludeSet::new(), None, None));
        assert_eq!(tree.take_transformed(null), None);
    }
}
