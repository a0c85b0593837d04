use serde::Serialize;
use serde_json::Value;

use super::ResourceOptions;
use crate::error::TransformResult;

/// A single record. Null data is a valid, empty item.
#[derive(Clone, Debug, Default)]
pub struct Item {
    pub(crate) data: Value,
    pub(crate) options: ResourceOptions,
}

impl Item {
    /// Wrap a record.
    pub fn new(data: impl Into<Value>) -> Self {
        Self {
            data: data.into(),
            options: ResourceOptions::default(),
        }
    }

    /// Wrap any serializable value as the record.
    pub fn from_serialize<T: Serialize + ?Sized>(data: &T) -> TransformResult<Self> {
        Ok(Self::new(serde_json::to_value(data)?))
    }

    /// The record.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Mutable access to the record, eg. for relation loaders.
    pub fn data_mut(&mut self) -> &mut Value {
        &mut self.data
    }

    /// Replace the record.
    pub fn set_data(&mut self, data: impl Into<Value>) {
        self.data = data.into();
    }

    /// Returns true when the record is null.
    pub fn is_null(&self) -> bool {
        self.data.is_null()
    }
}

super::resource_options!(Item);

impl From<Value> for Item {
    fn from(data: Value) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Person {
        id: u32,
        name: &'static str,
    }

    #[test]
    fn test_from_serialize() {
        let item = Item::from_serialize(&Person { id: 7, name: "Ada" }).unwrap();
        assert_eq!(item.data(), &json!({"id": 7, "name": "Ada"}));
    }

    #[test]
    fn test_builders() {
        let item = Item::new(json!({"id": 1}))
            .with_key("user")
            .with_transformer(crate::TransformerKind::callable(|r| r.clone()));
        assert_eq!(item.resource_key(), Some("user"));
        assert!(item.has_transformer());
        assert!(item.serializer().is_none());
        assert!(!item.is_null());
        assert!(Item::default().is_null());
    }

    #[test]
    fn test_meta() {
        let mut item = Item::new(json!(null));
        item.set_meta_value("version", 2);
        assert_eq!(item.meta_value("version"), Some(&json!(2)));
        assert_eq!(item.meta().len(), 1);
    }
}
