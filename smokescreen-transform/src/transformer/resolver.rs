use indexmap::IndexMap;

use super::TransformerKind;
use crate::error::{TransformError, TransformResult};
use crate::resource::Resource;

/// Supplies a transformer for resources that do not carry one.
///
/// Called for every resource in the tree before it is transformed.
pub trait TransformerResolver: Send + Sync {
    /// The transformer for `resource`, or `None` to leave it untransformed.
    fn resolve(&self, resource: &Resource) -> Option<TransformerKind>;
}

impl<F> TransformerResolver for F
where
    F: Fn(&Resource) -> Option<TransformerKind> + Send + Sync,
{
    fn resolve(&self, resource: &Resource) -> Option<TransformerKind> {
        self(resource)
    }
}

/// Resolves transformers by resource key.
#[derive(Debug, Clone, Default)]
pub struct KeyedTransformerResolver {
    transformers: IndexMap<String, TransformerKind>,
}

impl KeyedTransformerResolver {
    /// An empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transformer for a resource key.
    pub fn with(mut self, key: impl Into<String>, transformer: impl Into<TransformerKind>) -> Self {
        self.register(key, transformer);
        self
    }

    /// Register a transformer for a resource key, replacing any previous one.
    pub fn register(&mut self, key: impl Into<String>, transformer: impl Into<TransformerKind>) {
        self.transformers.insert(key.into(), transformer.into());
    }

    /// Look up the transformer registered for `key`.
    pub fn transformer_for(&self, key: &str) -> TransformResult<&TransformerKind> {
        self.transformers.get(key).ok_or_else(|| {
            TransformError::invalid_transformer(format!(
                "no transformer registered for `{key}`"
            ))
        })
    }
}

impl TransformerResolver for KeyedTransformerResolver {
    fn resolve(&self, resource: &Resource) -> Option<TransformerKind> {
        resource
            .resource_key()
            .and_then(|key| self.transformers.get(key))
            .cloned()
    }
}
