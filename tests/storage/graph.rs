//! Integration tests for graphs
//!
//! Tests edge incidence and cascading vertex deletion.

use strata_foundation::NO_ID;
use strata_storage::{EdgeVertex, Graph, VariableAttribute};

#[test]
fn edge_attributes_follow_edge_deletion() {
    let mut graph = Graph::new();
    graph.create_vertices(4);
    for v in 1..4 {
        graph.create_edge(0, v).unwrap();
    }
    let weights = graph
        .edge_attributes_mut()
        .find_or_create::<VariableAttribute<f64>>("weight", 0.0)
        .unwrap();
    weights.set_values([1.0, 2.0, 3.0]).unwrap();

    let old_to_new = graph.delete_vertices(&[false, false, true, false]).unwrap();

    assert_eq!(old_to_new, vec![0, 1, NO_ID, 2]);
    assert_eq!(weights.values(), vec![1.0, 3.0]);
    assert_eq!(graph.edge_vertices(1).unwrap(), [0, 2]);
    assert_eq!(
        graph.edges_around_vertex(0).unwrap(),
        vec![EdgeVertex::new(0, 0), EdgeVertex::new(1, 0)]
    );
}

#[test]
fn parallel_edges_are_kept() {
    let mut graph = Graph::new();
    graph.create_vertices(2);
    graph.create_edge(0, 1).unwrap();
    graph.create_edge(0, 1).unwrap();
    assert_eq!(graph.nb_edges(), 2);
    assert_eq!(graph.nb_edges_around_vertex(1).unwrap(), 2);
    let slot = graph.edges_around_vertex(1).unwrap()[1];
    assert_eq!(graph.edge_vertex(slot.opposite()).unwrap(), 0);
}
