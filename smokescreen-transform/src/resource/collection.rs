use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::ResourceOptions;
use crate::error::{TransformError, TransformResult};
use crate::pagination::{Cursor, PaginationKind, Paginator};

/// A list of records, optionally with a paginator or a cursor.
///
/// `None` data is a null collection, which serializers treat differently
/// from an empty one.
#[derive(Clone, Debug, Default)]
pub struct Collection {
    pub(crate) data: Option<Vec<Value>>,
    pub(crate) pagination: Option<PaginationKind>,
    pub(crate) options: ResourceOptions,
}

impl Collection {
    /// Wrap a list of records.
    pub fn new<I, V>(records: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            data: Some(records.into_iter().map(Into::into).collect()),
            pagination: None,
            options: ResourceOptions::default(),
        }
    }

    /// A collection with no data.
    pub fn null() -> Self {
        Self::default()
    }

    /// Build from a JSON value: a list, or null for a null collection.
    pub fn from_value(value: Value) -> TransformResult<Self> {
        match value {
            Value::Array(records) => Ok(Self::new(records)),
            Value::Null => Ok(Self::null()),
            other => Err(TransformError::unhandled_resource(format!(
                "a collection needs a list of records, got {}",
                json_type(&other)
            ))),
        }
    }

    /// Build from any serializable value that serializes to a list.
    pub fn from_serialize<T: Serialize + ?Sized>(data: &T) -> TransformResult<Self> {
        Self::from_value(serde_json::to_value(data)?)
    }

    /// The records, or `None` for a null collection.
    pub fn data(&self) -> Option<&[Value]> {
        self.data.as_deref()
    }

    /// Mutable access to the records, eg. for relation loaders.
    pub fn data_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.data.as_mut()
    }

    /// Replace the records.
    pub fn set_data(&mut self, data: Option<Vec<Value>>) {
        self.data = data;
    }

    /// Iterate over the records.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.data.iter().flatten()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, Vec::len)
    }

    /// Returns true when there are no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true for a null collection.
    pub fn is_null(&self) -> bool {
        self.data.is_none()
    }

    /// Attach a paginator, clearing any cursor.
    pub fn with_paginator(mut self, paginator: impl Paginator + 'static) -> Self {
        self.set_paginator(paginator);
        self
    }

    /// Attach a cursor, clearing any paginator.
    pub fn with_cursor(mut self, cursor: impl Cursor + 'static) -> Self {
        self.set_cursor(cursor);
        self
    }

    /// Attach a paginator, clearing any cursor.
    pub fn set_paginator(&mut self, paginator: impl Paginator + 'static) {
        self.pagination = Some(PaginationKind::Paginator(Arc::new(paginator)));
    }

    /// Attach a cursor, clearing any paginator.
    pub fn set_cursor(&mut self, cursor: impl Cursor + 'static) {
        self.pagination = Some(PaginationKind::Cursor(Arc::new(cursor)));
    }

    /// The paginator, if one is attached.
    pub fn paginator(&self) -> Option<&dyn Paginator> {
        match &self.pagination {
            Some(PaginationKind::Paginator(paginator)) => Some(paginator.as_ref()),
            _ => None,
        }
    }

    /// The cursor, if one is attached.
    pub fn cursor(&self) -> Option<&dyn Cursor> {
        match &self.pagination {
            Some(PaginationKind::Cursor(cursor)) => Some(cursor.as_ref()),
            _ => None,
        }
    }

    /// Returns true if a paginator is attached.
    pub fn has_paginator(&self) -> bool {
        self.paginator().is_some()
    }

    /// Returns true if a cursor is attached.
    pub fn has_cursor(&self) -> bool {
        self.cursor().is_some()
    }

    /// Remove any pagination.
    pub fn clear_pagination(&mut self) {
        self.pagination = None;
    }
}

super::resource_options!(Collection);

impl From<Vec<Value>> for Collection {
    fn from(records: Vec<Value>) -> Self {
        Self::new(records)
    }
}

impl From<Option<Vec<Value>>> for Collection {
    fn from(records: Option<Vec<Value>>) -> Self {
        Self {
            data: records,
            ..Self::default()
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
