//! Integration tests for saving and loading a whole model
//!
//! Both aggregates are written into the same model directory and read back
//! into fresh instances.

use strata_foundation::{ComponentType, PersistConfig};
use strata_model::{Component, ComponentVertex, MeshComponent, Relationships, VertexIdentifier};

use crate::init_logging;

#[test]
fn model_directory_round_trip() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let model_dir = dir.path().join("model");

    let mut corner = Component::new(ComponentType::CORNER);
    let mut line = Component::new(ComponentType::LINE);
    corner.mesh_mut().create_vertex();
    line.mesh_mut().create_vertices(2);

    let mut relationships = Relationships::new();
    relationships.add_component(*corner.component_id().id()).unwrap();
    relationships.add_component(*line.component_id().id()).unwrap();
    relationships
        .add_boundary_relation(corner.component_id().id(), line.component_id().id())
        .unwrap();

    let mut identifier = VertexIdentifier::new();
    identifier.register_component(&mut corner).unwrap();
    identifier.register_component(&mut line).unwrap();
    let g = identifier.create_unique_vertex();
    identifier
        .set_unique_vertex(ComponentVertex::new(corner.component_id().clone(), 0), g)
        .unwrap();
    identifier
        .set_unique_vertex(ComponentVertex::new(line.component_id().clone(), 1), g)
        .unwrap();

    relationships.save(&model_dir).unwrap();
    identifier.save_unique_vertices(&model_dir).unwrap();
    assert!(model_dir.join("relationships").is_file());
    assert!(model_dir.join("vertices").is_file());

    let mut loaded_relationships = Relationships::new();
    loaded_relationships.load(&model_dir).unwrap();
    assert_eq!(
        loaded_relationships
            .incidences(corner.component_id().id())
            .unwrap()
            .collect::<Vec<_>>(),
        vec![*line.component_id().id()]
    );

    let mut loaded_identifier = VertexIdentifier::new();
    loaded_identifier.load_unique_vertices(&model_dir).unwrap();
    assert_eq!(loaded_identifier.nb_unique_vertices(), 1);
    assert!(
        loaded_identifier
            .has_mesh_component_vertices_by_type(g, &ComponentType::LINE)
            .unwrap()
    );
    assert_eq!(
        loaded_identifier
            .unique_vertex(&ComponentVertex::new(line.component_id().clone(), 1))
            .unwrap(),
        g
    );
}

#[test]
fn custom_file_names() {
    let dir = tempfile::tempdir().unwrap();
    let config = PersistConfig::default()
        .with_relationships_file("relations.strata")
        .with_vertices_file("identity.strata");

    let relationships = Relationships::new();
    let identifier = VertexIdentifier::new();
    let relations_path = relationships.save_with_config(dir.path(), &config).unwrap();
    let vertices_path = identifier
        .save_unique_vertices_with_config(dir.path(), &config)
        .unwrap();
    assert!(relations_path.ends_with("relations.strata"));
    assert!(vertices_path.ends_with("identity.strata"));

    let mut loaded = Relationships::new();
    loaded.load_with_config(dir.path(), &config).unwrap();
    assert_eq!(loaded.nb_components(), 0);
    assert!(loaded.load(dir.path()).is_err());

    let mut loaded_identifier = VertexIdentifier::new();
    loaded_identifier
        .load_unique_vertices_with_config(dir.path(), &config)
        .unwrap();
    assert_eq!(loaded_identifier.nb_unique_vertices(), 0);
}

#[test]
fn loading_a_relationships_file_as_vertices_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut relationships = Relationships::new();
    relationships.add_component(strata_foundation::new_uuid()).unwrap();
    let path = relationships.save(dir.path()).unwrap();
    std::fs::rename(&path, dir.path().join("vertices")).unwrap();

    let err = VertexIdentifier::new()
        .load_unique_vertices(dir.path())
        .unwrap_err();
    assert!(matches!(
        err.kind,
        strata_foundation::ErrorKind::UnsupportedVersion { found: 2, latest: 1 }
    ));
    assert!(err.to_string().contains("vertices"));
}
