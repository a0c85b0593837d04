//! Compositors attach a serialized child include to its parent's output.
//!
//! ```rust
//! use serde_json::{Map, json};
//! use smokescreen_transform::compositor::{Compositor, DefaultCompositor};
//!
//! let mut root = Map::new();
//! let mut parent = Map::new();
//! DefaultCompositor.compose_included_item(&mut root, &mut parent, "author", json!({"id": 1}));
//! assert_eq!(parent["author"], json!({"id": 1}));
//! ```

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::error::{TransformError, TransformResult};
use crate::record::set_path;

/// Places serialized include output.
///
/// `root` is the root resource's output and `parent` the transformed record
/// the include belongs to. For a root-level include they are distinct maps;
/// writes to `root` are merged into the final output.
pub trait Compositor: Send + Sync {
    /// Attach a serialized item include.
    fn compose_included_item(
        &self,
        root: &mut Map<String, Value>,
        parent: &mut Map<String, Value>,
        key: &str,
        data: Value,
    );

    /// Attach a serialized collection include.
    fn compose_included_collection(
        &self,
        root: &mut Map<String, Value>,
        parent: &mut Map<String, Value>,
        key: &str,
        data: Value,
    );
}

/// Writes the include under its key in the parent, following dots in the key
/// into nested objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCompositor;

impl Compositor for DefaultCompositor {
    fn compose_included_item(
        &self,
        _root: &mut Map<String, Value>,
        parent: &mut Map<String, Value>,
        key: &str,
        data: Value,
    ) {
        set_path(parent, key, data);
    }

    fn compose_included_collection(
        &self,
        _root: &mut Map<String, Value>,
        parent: &mut Map<String, Value>,
        key: &str,
        data: Value,
    ) {
        set_path(parent, key, data);
    }
}

/// A compositor closure: `(root, parent, key, data)`, used for items and
/// collections alike.
pub type ComposeFn =
    Arc<dyn Fn(&mut Map<String, Value>, &mut Map<String, Value>, &str, Value) + Send + Sync>;

/// The compositor in effect for an include.
#[derive(Clone)]
pub enum CompositorKind {
    /// Drop included data.
    Disabled,
    /// A closure used for items and collections alike.
    Callable(ComposeFn),
    /// A [`Compositor`] implementation.
    Strategy(Arc<dyn Compositor>),
}

impl CompositorKind {
    /// Wrap a closure.
    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(&mut Map<String, Value>, &mut Map<String, Value>, &str, Value) + Send + Sync + 'static,
    {
        Self::Callable(Arc::new(f))
    }

    /// Look up a built-in compositor: `default` or `none`.
    pub fn from_name(name: &str) -> TransformResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(DefaultCompositor.into()),
            "none" | "disabled" => Ok(Self::Disabled),
            other => Err(TransformError::invalid_compositor(format!(
                "unknown compositor `{other}`"
            ))),
        }
    }

    /// Returns true for [`CompositorKind::Disabled`].
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }

    pub(crate) fn compose(
        &self,
        root: &mut Map<String, Value>,
        parent: &mut Map<String, Value>,
        key: &str,
        data: Value,
        is_collection: bool,
    ) {
        match self {
            Self::Disabled => {}
            Self::Callable(f) => f(root, parent, key, data),
            Self::Strategy(compositor) if is_collection => {
                compositor.compose_included_collection(root, parent, key, data)
            }
            Self::Strategy(compositor) => compositor.compose_included_item(root, parent, key, data),
        }
    }
}

impl<C: Compositor + 'static> From<C> for CompositorKind {
    fn from(compositor: C) -> Self {
        Self::Strategy(Arc::new(compositor))
    }
}

impl From<Arc<dyn Compositor>> for CompositorKind {
    fn from(compositor: Arc<dyn Compositor>) -> Self {
        Self::Strategy(compositor)
    }
}

impl Default for CompositorKind {
    fn default() -> Self {
        DefaultCompositor.into()
    }
}

impl fmt::Debug for CompositorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::Callable(_) => f.write_str("Callable(..)"),
            Self::Strategy(_) => f.write_str("Strategy(..)"),
        }
    }
}
