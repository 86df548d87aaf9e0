//! Attribute readers for model-layer element types.

use strata_storage::AttributeRegistry;

use crate::component::ComponentVertex;
use crate::relationships::RelationKind;

/// Creates a registry knowing every storage and model element type.
#[must_use]
pub fn model_registry() -> AttributeRegistry {
    let mut registry = AttributeRegistry::with_defaults();
    registry.register_value::<RelationKind>();
    registry.register_value::<ComponentVertex>();
    registry.register_value::<Vec<ComponentVertex>>();
    registry
}
