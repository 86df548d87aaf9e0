//! Relations between model components.
//!
//! Components are vertices of a [`Graph`]; each relation is one edge tagged
//! with a [`RelationKind`]. Edges are directed by slot position:
//!
//! | kind       | slot 0   | slot 1     |
//! |------------|----------|------------|
//! | `Boundary` | boundary | incidence  |
//! | `Item`     | item     | collection |
//!
//! Removing a component deletes its graph vertex and every relation touching
//! it. Surviving components keep their identifiers; their internal indices
//! shift down to follow the compacted graph.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strata_foundation::{Error, ErrorKind, Index, PersistConfig, Result, Uuid};
use strata_storage::{
    AttributeHandle, AttributeValue, Decoder, EdgeVertex, Encoder, Graph, Growable, MigrateFn,
    Persist, ReadFn, VariableAttribute, load_from_file, save_to_file,
};

use crate::registry::model_registry;
use crate::uuid_to_index::UuidToIndex;

const RELATION_TYPE_ATTRIBUTE: &str = "relation_type";
const UUID_ATTRIBUTE: &str = "uuid";

/// Slot of the boundary (or item) side of an edge.
const SOURCE_SLOT: Index = 0;
/// Slot of the incidence (or collection) side of an edge.
const TARGET_SLOT: Index = 1;

/// Kind of a relation between two components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// The source bounds the target.
    #[default]
    Boundary,
    /// The source is an item of the target collection.
    Item,
}

impl AttributeValue for RelationKind {
    fn type_name() -> String {
        "relation_kind".to_string()
    }
}

/// One stored relation, oriented from slot 0 to slot 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Relation {
    /// The relation kind.
    pub kind: RelationKind,
    /// The boundary or item side.
    pub from: Uuid,
    /// The incidence or collection side.
    pub to: Uuid,
}

/// Relation graph between model components.
#[derive(Debug)]
pub struct Relationships {
    graph: Graph,
    uuid_to_index: UuidToIndex,
    relation_type: AttributeHandle<VariableAttribute<RelationKind>>,
    uuids: AttributeHandle<VariableAttribute<Uuid>>,
}

impl Default for Relationships {
    fn default() -> Self {
        Self::new()
    }
}

impl Relationships {
    /// Creates an empty relation graph.
    #[must_use]
    pub fn new() -> Self {
        let mut graph = Graph::new();
        let relation_type = graph
            .edge_attributes_mut()
            .create(RELATION_TYPE_ATTRIBUTE, RelationKind::Boundary);
        let uuids = graph
            .vertex_attributes_mut()
            .create(UUID_ATTRIBUTE, Uuid::nil());
        Self {
            graph,
            uuid_to_index: UuidToIndex::new(),
            relation_type,
            uuids,
        }
    }

    /// Returns the number of registered components.
    #[must_use]
    pub fn nb_components(&self) -> usize {
        self.uuid_to_index.len()
    }

    /// Returns the number of stored relations.
    #[must_use]
    pub fn nb_relations(&self) -> usize {
        self.graph.nb_edges()
    }

    /// Returns true if `id` is registered.
    #[must_use]
    pub fn has_component(&self, id: &Uuid) -> bool {
        self.uuid_to_index.contains(id)
    }

    /// Registers a component with no relation.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is already registered.
    pub fn add_component(&mut self, id: Uuid) -> Result<()> {
        if self.has_component(&id) {
            return Err(Error::new(ErrorKind::ComponentAlreadyRegistered(id)));
        }
        let index = self.graph.create_vertex();
        self.uuids.set_value(index, id)?;
        self.uuid_to_index.set_new_mapping(id, index)
    }

    /// Unregisters a component and deletes every relation touching it.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not registered.
    pub fn remove_component(&mut self, id: &Uuid) -> Result<()> {
        let index = self.vertex_id(id)?;
        let mut to_delete = vec![false; self.graph.nb_vertices()];
        to_delete[index as usize] = true;
        self.graph.delete_vertices(&to_delete)?;
        self.uuid_to_index.erase(id);
        self.uuid_to_index.decrement_indices_larger_than(index);
        Ok(())
    }

    /// Records that `boundary` bounds `incidence`.
    ///
    /// Adding an existing relation again logs a warning and changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if either component is not registered.
    pub fn add_boundary_relation(&mut self, boundary: &Uuid, incidence: &Uuid) -> Result<()> {
        self.add_relation(boundary, incidence, RelationKind::Boundary)
    }

    /// Records that `item` belongs to `collection`.
    ///
    /// Adding an existing relation again logs a warning and changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if either component is not registered.
    pub fn add_item_in_collection(&mut self, item: &Uuid, collection: &Uuid) -> Result<()> {
        self.add_relation(item, collection, RelationKind::Item)
    }

    /// Returns true if `boundary` bounds `incidence`.
    ///
    /// # Errors
    ///
    /// Returns an error if either component is not registered.
    pub fn is_boundary(&self, boundary: &Uuid, incidence: &Uuid) -> Result<bool> {
        self.relation_exists(boundary, incidence, RelationKind::Boundary)
    }

    /// Returns true if `item` belongs to `collection`.
    ///
    /// # Errors
    ///
    /// Returns an error if either component is not registered.
    pub fn is_item(&self, item: &Uuid, collection: &Uuid) -> Result<bool> {
        self.relation_exists(item, collection, RelationKind::Item)
    }

    /// Iterates the boundaries of `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not registered.
    pub fn boundaries(&self, id: &Uuid) -> Result<RelationRange<'_>> {
        self.range(id, RelationKind::Boundary, TARGET_SLOT)
    }

    /// Iterates the components bounded by `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not registered.
    pub fn incidences(&self, id: &Uuid) -> Result<RelationRange<'_>> {
        self.range(id, RelationKind::Boundary, SOURCE_SLOT)
    }

    /// Iterates the items of the collection `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not registered.
    pub fn items(&self, id: &Uuid) -> Result<RelationRange<'_>> {
        self.range(id, RelationKind::Item, TARGET_SLOT)
    }

    /// Iterates the collections containing `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not registered.
    pub fn collections(&self, id: &Uuid) -> Result<RelationRange<'_>> {
        self.range(id, RelationKind::Item, SOURCE_SLOT)
    }

    /// Returns the number of boundaries of `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not registered.
    pub fn nb_boundaries(&self, id: &Uuid) -> Result<usize> {
        Ok(self.boundaries(id)?.count())
    }

    /// Returns the number of components bounded by `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not registered.
    pub fn nb_incidences(&self, id: &Uuid) -> Result<usize> {
        Ok(self.incidences(id)?.count())
    }

    /// Returns the number of items of the collection `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not registered.
    pub fn nb_items(&self, id: &Uuid) -> Result<usize> {
        Ok(self.items(id)?.count())
    }

    /// Returns the number of collections containing `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not registered.
    pub fn nb_collections(&self, id: &Uuid) -> Result<usize> {
        Ok(self.collections(id)?.count())
    }

    /// Returns every relation touching `id`, in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not registered.
    pub fn relations(&self, id: &Uuid) -> Result<Vec<Relation>> {
        let vertex = self.vertex_id(id)?;
        self.graph
            .edges_around_vertex(vertex)?
            .into_iter()
            .filter(|edge_vertex| {
                // A self relation appears in both slots; report it once.
                edge_vertex.vertex_id == SOURCE_SLOT
                    || self.graph.edge_vertices(edge_vertex.edge_id).map_or(true, |[from, to]| from != to)
            })
            .map(|edge_vertex| {
                let [from, to] = self.graph.edge_vertices(edge_vertex.edge_id)?;
                Ok(Relation {
                    kind: self.relation_type.value(edge_vertex.edge_id)?,
                    from: self.uuids.value(from)?,
                    to: self.uuids.value(to)?,
                })
            })
            .collect()
    }

    /// Saves the relation graph into `directory`.
    ///
    /// Returns the path of the written file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, directory: &Path) -> Result<PathBuf> {
        self.save_with_config(directory, &PersistConfig::default())
    }

    /// Saves the relation graph into `directory` using `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_with_config(&self, directory: &Path, config: &PersistConfig) -> Result<PathBuf> {
        let path = config.relationships_path(directory);
        save_to_file(self, &path, config)?;
        Ok(path)
    }

    /// Replaces this relation graph with the one saved in `directory`.
    ///
    /// On error, `self` is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed.
    pub fn load(&mut self, directory: &Path) -> Result<()> {
        self.load_with_config(directory, &PersistConfig::default())
    }

    /// Replaces this relation graph with the one saved in `directory`
    /// using `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed.
    pub fn load_with_config(&mut self, directory: &Path, config: &PersistConfig) -> Result<()> {
        let mut loaded = Self::new();
        load_from_file(&mut loaded, &config.relationships_path(directory), &model_registry())?;
        *self = loaded;
        Ok(())
    }

    fn vertex_id(&self, id: &Uuid) -> Result<Index> {
        self.uuid_to_index.index(id)
    }

    fn range(&self, id: &Uuid, kind: RelationKind, slot: Index) -> Result<RelationRange<'_>> {
        let vertex = self.vertex_id(id)?;
        Ok(RelationRange {
            relationships: self,
            edges: self.graph.edges_around_vertex(vertex)?.into_iter(),
            kind,
            slot,
        })
    }

    fn relation_exists(&self, from: &Uuid, to: &Uuid, kind: RelationKind) -> Result<bool> {
        let from_vertex = self.vertex_id(from)?;
        let to_vertex = self.vertex_id(to)?;
        let (scanned, slot, other) = if self.graph.nb_edges_around_vertex(to_vertex)?
            < self.graph.nb_edges_around_vertex(from_vertex)?
        {
            (to_vertex, TARGET_SLOT, from_vertex)
        } else {
            (from_vertex, SOURCE_SLOT, to_vertex)
        };
        for edge_vertex in self.graph.edges_around_vertex(scanned)? {
            if edge_vertex.vertex_id == slot
                && self.graph.edge_vertex(edge_vertex.opposite())? == other
                && self.relation_type.value(edge_vertex.edge_id)? == kind
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn add_relation(&mut self, from: &Uuid, to: &Uuid, kind: RelationKind) -> Result<()> {
        if self.relation_exists(from, to, kind)? {
            log::warn!("{kind:?} relation from {from} to {to} already exists");
            return Ok(());
        }
        let edge = self
            .graph
            .create_edge(self.vertex_id(from)?, self.vertex_id(to)?)?;
        self.relation_type.set_value(edge, kind)
    }

    fn write_current(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        self.graph.write_to(encoder)?;
        self.uuid_to_index.write_to(encoder)
    }

    fn read_graph(&mut self, decoder: &mut Decoder<'_>) -> Result<()> {
        self.graph.read_from(decoder)?;
        self.uuid_to_index.read_from(decoder)?;
        self.uuids = self
            .graph
            .vertex_attributes()
            .find(UUID_ATTRIBUTE)?
            .ok_or_else(|| missing_column(UUID_ATTRIBUTE))?;
        if self.uuid_to_index.len() != self.graph.nb_vertices() {
            return Err(Error::serialization(format!(
                "{} mapped components for {} graph vertices",
                self.uuid_to_index.len(),
                self.graph.nb_vertices()
            )));
        }
        for (id, index) in self.uuid_to_index.iter() {
            if self.uuids.value(index).ok().as_ref() != Some(id) {
                return Err(Error::serialization(format!(
                    "component {id} is mapped to graph vertex {index}, which holds another component"
                )));
            }
        }
        Ok(())
    }

    /// Version 1 files carry no relation kinds.
    fn read_without_kinds(&mut self, decoder: &mut Decoder<'_>) -> Result<()> {
        self.read_graph(decoder)
    }

    fn read_with_kinds(&mut self, decoder: &mut Decoder<'_>) -> Result<()> {
        self.read_graph(decoder)?;
        self.relation_type = self
            .graph
            .edge_attributes()
            .find(RELATION_TYPE_ATTRIBUTE)?
            .ok_or_else(|| missing_column(RELATION_TYPE_ATTRIBUTE))?;
        Ok(())
    }

    fn add_relation_kinds(&mut self) -> Result<()> {
        self.relation_type = self
            .graph
            .edge_attributes_mut()
            .find_or_create(RELATION_TYPE_ATTRIBUTE, RelationKind::Boundary)?;
        Ok(())
    }

    fn codec() -> Result<Growable<Self>> {
        Growable::with_migrations(
            Self::write_current,
            vec![
                Self::read_without_kinds as ReadFn<Self>,
                Self::read_with_kinds,
            ],
            vec![Self::add_relation_kinds as MigrateFn<Self>],
        )
    }
}

fn missing_column(name: &str) -> Error {
    Error::serialization(format!("relation attribute '{name}' is missing"))
}

impl Persist for Relationships {
    fn write_to(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        Self::codec()?.write(encoder, self)
    }

    fn read_from(&mut self, decoder: &mut Decoder<'_>) -> Result<()> {
        Self::codec()?.read(decoder, self)
    }
}

/// Lazy iterator over the components related to one component.
///
/// Yields the identifier at the other end of every edge of the requested
/// kind on which the queried component sits in the matching slot.
#[derive(Debug)]
pub struct RelationRange<'a> {
    relationships: &'a Relationships,
    edges: std::vec::IntoIter<EdgeVertex>,
    kind: RelationKind,
    slot: Index,
}

impl Iterator for RelationRange<'_> {
    type Item = Uuid;

    fn next(&mut self) -> Option<Uuid> {
        let relationships = self.relationships;
        self.edges.by_ref().find_map(|edge_vertex| {
            if edge_vertex.vertex_id != self.slot {
                return None;
            }
            let kind = relationships.relation_type.value(edge_vertex.edge_id).ok()?;
            if kind != self.kind {
                return None;
            }
            let other = relationships.graph.edge_vertex(edge_vertex.opposite()).ok()?;
            relationships.uuids.value(other).ok()
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.edges.size_hint().1)
    }
}
