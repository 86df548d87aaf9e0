//! Mesh components and their vertices.

use serde::{Deserialize, Serialize};
use strata_foundation::{ComponentId, ComponentType, Index};
use strata_storage::{AttributeStore, AttributeValue, VertexSet};

/// One vertex of one mesh component.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentVertex {
    /// The component owning the vertex.
    pub component_id: ComponentId,
    /// The vertex index inside the component mesh.
    pub vertex: Index,
}

impl ComponentVertex {
    /// Creates a component vertex.
    #[must_use]
    pub fn new(component_id: ComponentId, vertex: Index) -> Self {
        Self {
            component_id,
            vertex,
        }
    }
}

impl AttributeValue for ComponentVertex {
    fn type_name() -> String {
        "component_vertex".to_string()
    }
}

/// A model component carrying a mesh with per-vertex attributes.
pub trait MeshComponent {
    /// Returns the identifier of the component.
    fn component_id(&self) -> &ComponentId;

    /// Returns the number of mesh vertices.
    fn nb_vertices(&self) -> usize;

    /// Returns the vertex attributes of the mesh.
    fn vertex_attributes(&self) -> &AttributeStore;

    /// Returns the vertex attributes of the mesh for mutation.
    fn vertex_attributes_mut(&mut self) -> &mut AttributeStore;
}

/// A component whose mesh is a bare vertex set.
#[derive(Debug)]
pub struct Component {
    id: ComponentId,
    mesh: VertexSet,
}

impl Component {
    /// Creates a component with a fresh identifier and an empty mesh.
    #[must_use]
    pub fn new(component_type: ComponentType) -> Self {
        Self::with_id(ComponentId::generate(component_type))
    }

    /// Creates a component with the given identifier and an empty mesh.
    #[must_use]
    pub fn with_id(id: ComponentId) -> Self {
        Self {
            id,
            mesh: VertexSet::new(),
        }
    }

    /// Returns the mesh.
    #[must_use]
    pub fn mesh(&self) -> &VertexSet {
        &self.mesh
    }

    /// Returns the mesh for mutation.
    pub fn mesh_mut(&mut self) -> &mut VertexSet {
        &mut self.mesh
    }
}

impl MeshComponent for Component {
    fn component_id(&self) -> &ComponentId {
        &self.id
    }

    fn nb_vertices(&self) -> usize {
        self.mesh.nb_vertices()
    }

    fn vertex_attributes(&self) -> &AttributeStore {
        self.mesh.vertex_attributes()
    }

    fn vertex_attributes_mut(&mut self) -> &mut AttributeStore {
        self.mesh.vertex_attributes_mut()
    }
}
