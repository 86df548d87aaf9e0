//! Integration tests for identifiers
//!
//! Tests the no-entity sentinel and component identifiers.

use strata_foundation::{ComponentId, ComponentType, Index, NO_ID, is_valid, new_uuid, to_index};

#[test]
fn sentinel_is_not_a_valid_index() {
    assert!(!is_valid(NO_ID));
    assert!(is_valid(0));
    assert_eq!(NO_ID, Index::MAX);
    assert_eq!(to_index(12), 12);
}

#[test]
fn uuids_never_collide() {
    let ids: std::collections::HashSet<_> = (0..1000).map(|_| new_uuid()).collect();
    assert_eq!(ids.len(), 1000);
}

#[test]
fn component_ids_compare_type_and_uuid() {
    let uuid = new_uuid();
    let line = ComponentId::new(ComponentType::LINE, uuid);
    assert_eq!(line, ComponentId::new(ComponentType::LINE, uuid));
    assert_ne!(line, ComponentId::new(ComponentType::SURFACE, uuid));
    assert_eq!(line.id(), &uuid);
    assert_eq!(line.component_type().as_str(), "Line");
}

#[test]
fn custom_component_types() {
    let fault = ComponentType::new("Fault");
    assert_eq!(fault.to_string(), "Fault");
    assert_ne!(fault, ComponentType::SURFACE);
    let id = ComponentId::generate(fault.clone());
    assert_eq!(id.component_type(), &fault);
}
