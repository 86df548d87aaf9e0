//! Integration tests for file persistence
//!
//! Tests saving and loading aggregates with registered column types.

use serde::{Deserialize, Serialize};
use strata_foundation::{ErrorKind, PersistConfig};
use strata_storage::{
    AttributeRegistry, AttributeValue, Graph, VariableAttribute, load_from_file, save_to_file,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Color {
    rgb: [u8; 3],
}

impl AttributeValue for Color {
    fn type_name() -> String {
        "color".to_string()
    }
}

fn colored_graph() -> Graph {
    let mut graph = Graph::new();
    graph.create_vertices(3);
    graph.create_edge(0, 1).unwrap();
    graph.create_edge(1, 2).unwrap();
    let colors = graph
        .vertex_attributes_mut()
        .find_or_create::<VariableAttribute<Color>>("color", Color { rgb: [0; 3] })
        .unwrap();
    colors.set_value(2, Color { rgb: [255, 0, 0] }).unwrap();
    graph
}

#[test]
fn custom_column_needs_registration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph");
    save_to_file(&colored_graph(), &path, &PersistConfig::default()).unwrap();

    let err = load_from_file(&mut Graph::new(), &path, &AttributeRegistry::with_defaults())
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownAttributeType(ref tag) if tag == "variable<color>"));
    assert!(err.to_string().contains("graph"));

    let mut registry = AttributeRegistry::with_defaults();
    registry.register::<VariableAttribute<Color>>();
    let mut loaded = Graph::new();
    load_from_file(&mut loaded, &path, &registry).unwrap();

    assert_eq!(loaded.nb_edges(), 2);
    let colors = loaded
        .vertex_attributes()
        .find::<VariableAttribute<Color>>("color")
        .unwrap()
        .unwrap();
    assert_eq!(colors.value(2).unwrap(), Color { rgb: [255, 0, 0] });
}

#[test]
fn saving_twice_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph");
    let config = PersistConfig::default().with_buffer_capacity(16);
    save_to_file(&colored_graph(), &path, &config).unwrap();
    save_to_file(&Graph::new(), &path, &config).unwrap();

    let mut loaded = colored_graph();
    load_from_file(&mut loaded, &path, &AttributeRegistry::with_defaults()).unwrap();
    assert_eq!(loaded.nb_vertices(), 0);
    assert!(!loaded.vertex_attributes().exists("color"));
}
