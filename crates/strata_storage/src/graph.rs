//! Undirected multigraph stored in attribute columns.
//!
//! Each edge keeps its two endpoints in slot order, so an edge still knows
//! which endpoint was given first. Each vertex keeps the list of
//! [`EdgeVertex`] slots it occupies.

use serde::{Deserialize, Serialize};
use strata_foundation::{Error, Index, NO_ID, Result, is_valid, to_index};

use crate::attribute::{AttributeHandle, AttributeValue, VariableAttribute};
use crate::codec::{Decoder, DefaultGrowable, Encoder, Persist};
use crate::store::AttributeStore;
use crate::vertex_set::VertexSet;

const EDGES_ATTRIBUTE: &str = "edges";
const EDGES_AROUND_VERTEX_ATTRIBUTE: &str = "edges_around_vertex";

/// One endpoint slot of an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeVertex {
    /// The edge.
    pub edge_id: Index,
    /// The slot on the edge, 0 or 1.
    pub vertex_id: Index,
}

impl EdgeVertex {
    /// Creates an edge slot.
    #[must_use]
    pub const fn new(edge_id: Index, vertex_id: Index) -> Self {
        Self { edge_id, vertex_id }
    }

    /// Returns the other slot of the same edge.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self {
            edge_id: self.edge_id,
            vertex_id: (self.vertex_id + 1) % 2,
        }
    }
}

impl AttributeValue for EdgeVertex {
    fn type_name() -> String {
        "edge_vertex".to_string()
    }
}

/// Graph of vertices and two-ended edges.
#[derive(Debug)]
pub struct Graph {
    vertices: VertexSet,
    edge_attributes: AttributeStore,
    edges: AttributeHandle<VariableAttribute<[Index; 2]>>,
    edges_around_vertex: AttributeHandle<VariableAttribute<Vec<EdgeVertex>>>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        let mut vertices = VertexSet::new();
        let mut edge_attributes = AttributeStore::new();
        let edges = edge_attributes.create(EDGES_ATTRIBUTE, [NO_ID; 2]);
        let edges_around_vertex = vertices
            .vertex_attributes_mut()
            .create(EDGES_AROUND_VERTEX_ATTRIBUTE, Vec::new());
        Self {
            vertices,
            edge_attributes,
            edges,
            edges_around_vertex,
        }
    }

    /// Returns the number of vertices.
    #[must_use]
    pub fn nb_vertices(&self) -> usize {
        self.vertices.nb_vertices()
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn nb_edges(&self) -> usize {
        self.edge_attributes.nb_elements()
    }

    /// Returns the vertex attributes.
    #[must_use]
    pub fn vertex_attributes(&self) -> &AttributeStore {
        self.vertices.vertex_attributes()
    }

    /// Returns the vertex attributes for mutation.
    pub fn vertex_attributes_mut(&mut self) -> &mut AttributeStore {
        self.vertices.vertex_attributes_mut()
    }

    /// Returns the edge attributes.
    #[must_use]
    pub fn edge_attributes(&self) -> &AttributeStore {
        &self.edge_attributes
    }

    /// Returns the edge attributes for mutation.
    pub fn edge_attributes_mut(&mut self) -> &mut AttributeStore {
        &mut self.edge_attributes
    }

    /// Appends one vertex and returns its index.
    pub fn create_vertex(&mut self) -> Index {
        self.vertices.create_vertex()
    }

    /// Appends `nb` vertices and returns the index of the first one.
    pub fn create_vertices(&mut self, nb: usize) -> Index {
        self.vertices.create_vertices(nb)
    }

    /// Creates an edge from `from` (slot 0) to `to` (slot 1).
    ///
    /// # Errors
    ///
    /// Returns an error if either endpoint does not exist.
    pub fn create_edge(&mut self, from: Index, to: Index) -> Result<Index> {
        for vertex in [from, to] {
            if vertex as usize >= self.nb_vertices() {
                return Err(Error::index_out_of_bounds(vertex, self.nb_vertices()));
            }
        }
        let edge = to_index(self.nb_edges());
        self.edge_attributes.resize(self.nb_edges() + 1);
        self.edges.set_value(edge, [from, to])?;
        self.edges_around_vertex
            .modify_value(from, |around| around.push(EdgeVertex::new(edge, 0)))?;
        self.edges_around_vertex
            .modify_value(to, |around| around.push(EdgeVertex::new(edge, 1)))?;
        Ok(edge)
    }

    /// Returns both endpoints of an edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge does not exist.
    pub fn edge_vertices(&self, edge: Index) -> Result<[Index; 2]> {
        self.edges.value(edge)
    }

    /// Returns the vertex at an edge slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge does not exist.
    pub fn edge_vertex(&self, edge_vertex: EdgeVertex) -> Result<Index> {
        let vertices = self.edges.value(edge_vertex.edge_id)?;
        vertices
            .get(edge_vertex.vertex_id as usize)
            .copied()
            .ok_or_else(|| Error::index_out_of_bounds(edge_vertex.vertex_id, 2))
    }

    /// Returns the edge slots occupied by a vertex, in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex does not exist.
    pub fn edges_around_vertex(&self, vertex: Index) -> Result<Vec<EdgeVertex>> {
        self.edges_around_vertex.value(vertex)
    }

    /// Returns the number of edge slots occupied by a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex does not exist.
    pub fn nb_edges_around_vertex(&self, vertex: Index) -> Result<usize> {
        self.edges_around_vertex.with_value(vertex, Vec::len)
    }

    /// Removes the flagged edges.
    ///
    /// Returns the old-to-new edge map.
    ///
    /// # Errors
    ///
    /// Returns an error if `to_delete` does not have one flag per edge.
    pub fn delete_edges(&mut self, to_delete: &[bool]) -> Result<Vec<Index>> {
        let old_to_new = self.edge_attributes.delete_elements(to_delete)?;
        for vertex in 0..self.nb_vertices() {
            self.edges_around_vertex
                .modify_value(to_index(vertex), |around| {
                    around.retain_mut(|edge_vertex| {
                        let new = old_to_new[edge_vertex.edge_id as usize];
                        edge_vertex.edge_id = new;
                        is_valid(new)
                    });
                })?;
        }
        Ok(old_to_new)
    }

    /// Removes the flagged vertices and every edge incident to them.
    ///
    /// Returns the old-to-new vertex map.
    ///
    /// # Errors
    ///
    /// Returns an error if `to_delete` does not have one flag per vertex.
    pub fn delete_vertices(&mut self, to_delete: &[bool]) -> Result<Vec<Index>> {
        if to_delete.len() != self.nb_vertices() {
            return Err(Error::index_out_of_bounds(
                to_index(to_delete.len()),
                self.nb_vertices(),
            ));
        }
        let mut edges_to_delete = vec![false; self.nb_edges()];
        for (vertex, _) in to_delete.iter().enumerate().filter(|(_, deleted)| **deleted) {
            self.edges_around_vertex.with_value(to_index(vertex), |around| {
                for edge_vertex in around {
                    edges_to_delete[edge_vertex.edge_id as usize] = true;
                }
            })?;
        }
        self.delete_edges(&edges_to_delete)?;

        let old_to_new = self.vertices.delete_vertices(to_delete)?;
        for edge in 0..self.nb_edges() {
            self.edges.modify_value(to_index(edge), |vertices| {
                for vertex in vertices.iter_mut() {
                    *vertex = old_to_new[*vertex as usize];
                }
            })?;
        }
        Ok(old_to_new)
    }

    fn attach_columns(&mut self) -> Result<()> {
        self.edges = self
            .edge_attributes
            .find(EDGES_ATTRIBUTE)?
            .ok_or_else(|| missing_column(EDGES_ATTRIBUTE))?;
        self.edges_around_vertex = self
            .vertices
            .vertex_attributes()
            .find(EDGES_AROUND_VERTEX_ATTRIBUTE)?
            .ok_or_else(|| missing_column(EDGES_AROUND_VERTEX_ATTRIBUTE))?;
        self.check_incidence()
    }

    /// Checks that edge endpoints and vertex edge lists describe each other.
    fn check_incidence(&self) -> Result<()> {
        let nb_vertices = self.nb_vertices();
        for edge in (0..self.nb_edges()).map(to_index) {
            for (slot, vertex) in (0..).zip(self.edges.value(edge)?) {
                if vertex as usize >= nb_vertices {
                    return Err(Error::serialization(format!(
                        "edge {edge} ends at vertex {vertex}, graph has {nb_vertices} vertices"
                    )));
                }
                let edge_vertex = EdgeVertex::new(edge, slot);
                if !self.edges_around_vertex.with_value(vertex, |around| around.contains(&edge_vertex))? {
                    return Err(Error::serialization(format!(
                        "vertex {vertex} does not list slot {slot} of edge {edge}"
                    )));
                }
            }
        }
        for vertex in (0..nb_vertices).map(to_index) {
            for edge_vertex in self.edges_around_vertex(vertex)? {
                if self.edge_vertex(edge_vertex).ok() != Some(vertex) {
                    return Err(Error::serialization(format!(
                        "vertex {vertex} lists slot {} of edge {} it does not occupy",
                        edge_vertex.vertex_id, edge_vertex.edge_id
                    )));
                }
            }
        }
        Ok(())
    }
}

fn missing_column(name: &str) -> Error {
    Error::serialization(format!("graph attribute '{name}' is missing"))
}

impl Persist for Graph {
    fn write_to(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        DefaultGrowable::write(encoder, self, |encoder, graph| {
            graph.vertices.write_to(encoder)?;
            graph.edge_attributes.write_to(encoder)
        })
    }

    fn read_from(&mut self, decoder: &mut Decoder<'_>) -> Result<()> {
        DefaultGrowable::read(decoder, self, |decoder, graph| {
            graph.vertices.read_from(decoder)?;
            graph.edge_attributes.read_from(decoder)?;
            graph.attach_columns()
        })
    }
}
