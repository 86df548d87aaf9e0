//! Configuration for persisted aggregates.

use std::path::{Path, PathBuf};

/// Configuration for saving and loading model aggregates.
///
/// Each aggregate is written to its own file inside a model directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistConfig {
    /// File name of the relation graph.
    pub relationships_file: String,

    /// File name of the vertex identity map.
    pub vertices_file: String,

    /// Create the model directory (and parents) on save if missing.
    pub create_directories: bool,

    /// Capacity of the buffered writer used on save.
    pub buffer_capacity: usize,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            relationships_file: "relationships".to_string(),
            vertices_file: "vertices".to_string(),
            create_directories: true,
            buffer_capacity: 64 * 1024,
        }
    }
}

impl PersistConfig {
    /// Builder method to set the relation graph file name.
    #[must_use]
    pub fn with_relationships_file(mut self, name: impl Into<String>) -> Self {
        self.relationships_file = name.into();
        self
    }

    /// Builder method to set the vertex identity file name.
    #[must_use]
    pub fn with_vertices_file(mut self, name: impl Into<String>) -> Self {
        self.vertices_file = name.into();
        self
    }

    /// Builder method to enable/disable directory creation on save.
    #[must_use]
    pub fn with_create_directories(mut self, create: bool) -> Self {
        self.create_directories = create;
        self
    }

    /// Builder method to set the write buffer capacity.
    #[must_use]
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(1);
        self
    }

    /// Path of the relation graph file inside `directory`.
    #[must_use]
    pub fn relationships_path(&self, directory: &Path) -> PathBuf {
        directory.join(&self.relationships_file)
    }

    /// Path of the vertex identity file inside `directory`.
    #[must_use]
    pub fn vertices_path(&self, directory: &Path) -> PathBuf {
        directory.join(&self.vertices_file)
    }
}
