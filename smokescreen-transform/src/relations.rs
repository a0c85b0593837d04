//! Relation loading hook.
//!
//! Before a resource is transformed, the pipeline collects the relation keys
//! of the includes that will be resolved and hands them to the loader in one
//! call, so an application can eager-load them in bulk.

use crate::error::BoxError;
use crate::resource::Resource;

/// Eager-loads relations on a resource's data.
pub trait RelationLoader: Send + Sync {
    /// Load `relations` onto the resource. Only called with a non-empty list.
    fn load(&self, resource: &mut Resource, relations: &[String]) -> Result<(), BoxError>;
}

impl<F> RelationLoader for F
where
    F: Fn(&mut Resource, &[String]) -> Result<(), BoxError> + Send + Sync,
{
    fn load(&self, resource: &mut Resource, relations: &[String]) -> Result<(), BoxError> {
        self(resource, relations)
    }
}
