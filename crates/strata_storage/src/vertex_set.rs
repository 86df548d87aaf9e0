//! A bare collection of vertices.

use strata_foundation::{Index, Result, to_index};

use crate::codec::{Decoder, DefaultGrowable, Encoder, Persist};
use crate::store::AttributeStore;

/// Vertices with attributes and nothing else.
#[derive(Debug, Default)]
pub struct VertexSet {
    vertex_attributes: AttributeStore,
}

impl VertexSet {
    /// Creates an empty vertex set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of vertices.
    #[must_use]
    pub fn nb_vertices(&self) -> usize {
        self.vertex_attributes.nb_elements()
    }

    /// Returns the vertex attributes.
    #[must_use]
    pub fn vertex_attributes(&self) -> &AttributeStore {
        &self.vertex_attributes
    }

    /// Returns the vertex attributes for mutation.
    pub fn vertex_attributes_mut(&mut self) -> &mut AttributeStore {
        &mut self.vertex_attributes
    }

    /// Appends one vertex and returns its index.
    pub fn create_vertex(&mut self) -> Index {
        self.create_vertices(1)
    }

    /// Appends `nb` vertices and returns the index of the first one.
    pub fn create_vertices(&mut self, nb: usize) -> Index {
        let first = self.nb_vertices();
        self.vertex_attributes.resize(first + nb);
        to_index(first)
    }

    /// Removes the flagged vertices.
    ///
    /// Returns the old-to-new vertex map.
    ///
    /// # Errors
    ///
    /// Returns an error if `to_delete` does not have one flag per vertex.
    pub fn delete_vertices(&mut self, to_delete: &[bool]) -> Result<Vec<Index>> {
        self.vertex_attributes.delete_elements(to_delete)
    }

    /// Renumbers the vertices, moving vertex `i` to `old_to_new[i]` and
    /// removing vertices mapped to [`NO_ID`](strata_foundation::NO_ID).
    ///
    /// # Errors
    ///
    /// Returns an error if the map is not a permutation of the surviving
    /// vertices. Nothing is changed in that case.
    pub fn permute_vertices(&mut self, old_to_new: &[Index]) -> Result<()> {
        self.vertex_attributes.permute(old_to_new)
    }
}

impl Persist for VertexSet {
    fn write_to(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        DefaultGrowable::write(encoder, self, |encoder, set| {
            set.vertex_attributes.write_to(encoder)
        })
    }

    fn read_from(&mut self, decoder: &mut Decoder<'_>) -> Result<()> {
        DefaultGrowable::read(decoder, self, |decoder, set| {
            set.vertex_attributes.read_from(decoder)
        })
    }
}
