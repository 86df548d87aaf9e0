//! Integration tests for persistence configuration

use std::path::Path;

use strata_foundation::PersistConfig;

#[test]
fn default_file_layout() {
    let config = PersistConfig::default();
    let dir = Path::new("model");
    assert_eq!(config.relationships_path(dir), dir.join("relationships"));
    assert_eq!(config.vertices_path(dir), dir.join("vertices"));
    assert!(config.create_directories);
}

#[test]
fn builder_overrides() {
    let config = PersistConfig::default()
        .with_relationships_file("relations.bin")
        .with_vertices_file("identity.bin")
        .with_create_directories(false)
        .with_buffer_capacity(0);
    let dir = Path::new("out");
    assert_eq!(config.relationships_path(dir), dir.join("relations.bin"));
    assert_eq!(config.vertices_path(dir), dir.join("identity.bin"));
    assert!(!config.create_directories);
    assert_eq!(config.buffer_capacity, 1);
}
