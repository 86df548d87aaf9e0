//! Integration tests for attribute stores
//!
//! Tests lazy column creation, shared handles, and whole-store resizing.

use strata_foundation::{ErrorKind, Index, NO_ID};
use strata_storage::{AttributeStore, SparseAttribute, VariableAttribute, VertexSet};

// =============================================================================
// Column Lifecycle
// =============================================================================

#[test]
fn columns_follow_the_collection() {
    let mut vertices = VertexSet::new();
    vertices.create_vertices(2);
    let points = vertices
        .vertex_attributes_mut()
        .find_or_create::<VariableAttribute<[f64; 3]>>("points", [0.0; 3])
        .unwrap();
    points.set_value(1, [1.0, 2.0, 3.0]).unwrap();

    vertices.create_vertices(3);
    assert_eq!(points.len(), 5);
    assert_eq!(points.value(4).unwrap(), [0.0; 3]);

    let old_to_new = vertices.delete_vertices(&[true, false, true, true, true]).unwrap();
    assert_eq!(old_to_new, vec![NO_ID, 0, NO_ID, NO_ID, NO_ID]);
    assert_eq!(points.values(), vec![[1.0, 2.0, 3.0]]);
}

#[test]
fn same_name_other_type_is_rejected() {
    let mut store = AttributeStore::new();
    store.resize(1);
    store
        .find_or_create::<VariableAttribute<Index>>("ids", NO_ID)
        .unwrap();
    let err = store
        .find_or_create::<SparseAttribute<Index>>("ids", NO_ID)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    assert_eq!(store.type_tag("ids").as_deref(), Some("variable<u32>"));
}

#[test]
fn names_are_sorted() {
    let mut store = AttributeStore::new();
    store.find_or_create::<VariableAttribute<u8>>("b", 0).unwrap();
    store.find_or_create::<VariableAttribute<u8>>("a", 0).unwrap();
    assert_eq!(store.names().collect::<Vec<_>>(), vec!["a", "b"]);
    assert!(store.exists("a"));
    assert!(!store.exists("c"));
}

// =============================================================================
// Shared Access
// =============================================================================

#[test]
fn all_holders_see_mutations() {
    let mut store = AttributeStore::new();
    store.resize(3);
    let first = store
        .find_or_create::<VariableAttribute<Vec<Index>>>("lists", Vec::new())
        .unwrap();
    let second = store
        .find::<VariableAttribute<Vec<Index>>>("lists")
        .unwrap()
        .unwrap();

    first.modify_value(2, |list| list.push(7)).unwrap();
    second.set_values([vec![1], vec![]]).unwrap();

    assert_eq!(second.value(2).unwrap(), vec![7]);
    assert_eq!(first.value(0).unwrap(), vec![1]);
    assert_eq!(first.with_value(2, Vec::len).unwrap(), 1);
}

#[test]
fn sparse_and_variable_columns_compact_together() {
    let mut store = AttributeStore::new();
    store.resize(4);
    let dense = store
        .find_or_create::<VariableAttribute<i32>>("dense", -1)
        .unwrap();
    let sparse = store
        .find_or_create::<SparseAttribute<i32>>("sparse", -1)
        .unwrap();
    dense.set_values([0, 1, 2, 3]).unwrap();
    sparse.set_value(3, 30).unwrap();

    store.compact(&[false, true, false, true]).unwrap();

    assert_eq!(dense.values(), vec![1, 3]);
    assert_eq!(sparse.values(), vec![-1, 30]);
}
