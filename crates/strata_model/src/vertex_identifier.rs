//! Global identity of vertices shared between mesh components.
//!
//! A unique vertex groups the component vertices that stand for the same
//! point of the model. Two structures are kept in sync:
//! - on each registered component, a `unique vertices` attribute giving the
//!   unique vertex of every local vertex (or [`NO_ID`]);
//! - on the unique vertices, a `component vertices` attribute listing their
//!   members.
//!
//! A component vertex belongs to at most one unique vertex at a time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use strata_foundation::{
    ComponentId, ComponentType, Error, ErrorKind, Index, NO_ID, PersistConfig, Result, Uuid,
    is_valid, to_index,
};
use strata_storage::{
    AttributeHandle, Decoder, DefaultGrowable, Encoder, Persist, VariableAttribute, VertexSet,
    load_from_file, save_to_file,
};

use crate::component::{ComponentVertex, MeshComponent};
use crate::registry::model_registry;

/// Name of the identity attribute stored on each registered component.
pub const UNIQUE_VERTICES_ATTRIBUTE: &str = "unique vertices";
const COMPONENT_VERTICES_ATTRIBUTE: &str = "component vertices";

type IdentityAttribute = AttributeHandle<VariableAttribute<Index>>;

/// Links component vertices to model-wide unique vertices.
#[derive(Debug)]
pub struct VertexIdentifier {
    unique_vertices: VertexSet,
    component_vertices: AttributeHandle<VariableAttribute<Vec<ComponentVertex>>>,
    vertex2unique_vertex: HashMap<Uuid, IdentityAttribute>,
}

impl Default for VertexIdentifier {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexIdentifier {
    /// Creates an identifier with no unique vertex and no component.
    #[must_use]
    pub fn new() -> Self {
        let mut unique_vertices = VertexSet::new();
        let component_vertices = unique_vertices
            .vertex_attributes_mut()
            .create(COMPONENT_VERTICES_ATTRIBUTE, Vec::new());
        Self {
            unique_vertices,
            component_vertices,
            vertex2unique_vertex: HashMap::new(),
        }
    }

    /// Returns the number of unique vertices.
    #[must_use]
    pub fn nb_unique_vertices(&self) -> usize {
        self.unique_vertices.nb_vertices()
    }

    /// Returns true if the component is registered.
    #[must_use]
    pub fn is_registered(&self, component_id: &Uuid) -> bool {
        self.vertex2unique_vertex.contains_key(component_id)
    }

    /// Returns the number of registered components.
    #[must_use]
    pub fn nb_registered_components(&self) -> usize {
        self.vertex2unique_vertex.len()
    }

    /// Starts tracking the vertices of a component.
    ///
    /// On first registration, the component must not carry an identity
    /// attribute yet. Registering a known component again (after its mesh
    /// was replaced, or after loading) copies the known identities onto the
    /// component's attribute, stopping with a warning at the first vertex
    /// out of range.
    ///
    /// # Errors
    ///
    /// Returns an error if a first registration finds an identity attribute
    /// on the component.
    pub fn register_component<C: MeshComponent + ?Sized>(&mut self, component: &mut C) -> Result<()> {
        let id = *component.component_id().id();
        let Some(previous) = self.vertex2unique_vertex.get(&id).cloned() else {
            if component.vertex_attributes().exists(UNIQUE_VERTICES_ATTRIBUTE) {
                return Err(Error::new(ErrorKind::AttributeAlreadyExists {
                    name: UNIQUE_VERTICES_ATTRIBUTE.to_string(),
                }));
            }
            let attribute = component
                .vertex_attributes_mut()
                .find_or_create(UNIQUE_VERTICES_ATTRIBUTE, NO_ID)?;
            self.vertex2unique_vertex.insert(id, attribute);
            return Ok(());
        };

        let attribute: IdentityAttribute = component
            .vertex_attributes_mut()
            .find_or_create(UNIQUE_VERTICES_ATTRIBUTE, NO_ID)?;
        if !attribute.ptr_eq(&previous) {
            for vertex in (0..component.nb_vertices()).map(to_index) {
                let copied = previous
                    .value(vertex)
                    .and_then(|unique_vertex| attribute.set_value(vertex, unique_vertex));
                if copied.is_err() {
                    log::warn!(
                        "registering component {id}: wrong number of vertices, \
                         identities kept for the first {vertex} only"
                    );
                    break;
                }
            }
        }
        self.vertex2unique_vertex.insert(id, attribute);
        Ok(())
    }

    /// Stops tracking a component.
    ///
    /// Deletes the identity attribute of the component and removes its
    /// vertices from every unique vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the component is not registered.
    pub fn unregister_component<C: MeshComponent + ?Sized>(&mut self, component: &mut C) -> Result<()> {
        let id = *component.component_id().id();
        if self.vertex2unique_vertex.remove(&id).is_none() {
            return Err(Error::component_not_found(id));
        }
        component.vertex_attributes_mut().delete(UNIQUE_VERTICES_ATTRIBUTE);
        self.filter_component_vertices(&id)
    }

    /// Creates one unique vertex with no member.
    pub fn create_unique_vertex(&mut self) -> Index {
        self.unique_vertices.create_vertex()
    }

    /// Creates `nb` unique vertices and returns the first new index.
    pub fn create_unique_vertices(&mut self, nb: usize) -> Index {
        self.unique_vertices.create_vertices(nb)
    }

    /// Returns the unique vertex of a component vertex, or [`NO_ID`].
    ///
    /// # Errors
    ///
    /// Returns an error if the component is not registered or the vertex is
    /// out of range.
    pub fn unique_vertex(&self, component_vertex: &ComponentVertex) -> Result<Index> {
        self.identity_attribute(component_vertex.component_id.id())?
            .value(component_vertex.vertex)
    }

    /// Makes `component_vertex` a member of `unique_vertex`.
    ///
    /// A previous membership of the component vertex is removed first.
    ///
    /// # Errors
    ///
    /// Returns an error if the component is not registered or either index
    /// is out of range.
    pub fn set_unique_vertex(
        &mut self,
        component_vertex: ComponentVertex,
        unique_vertex: Index,
    ) -> Result<()> {
        self.check_unique_vertex(unique_vertex)?;
        let attribute = self.identity_attribute(component_vertex.component_id.id())?.clone();
        let previous = attribute.value(component_vertex.vertex)?;
        if previous == unique_vertex {
            return Ok(());
        }
        if is_valid(previous) {
            self.unlink(&component_vertex, previous)?;
        }
        attribute.set_value(component_vertex.vertex, unique_vertex)?;
        self.component_vertices.modify_value(unique_vertex, |members| {
            if !members.contains(&component_vertex) {
                members.push(component_vertex);
            }
        })
    }

    /// Removes `component_vertex` from the members of `unique_vertex`.
    ///
    /// If the component vertex pointed to `unique_vertex`, it now points to
    /// [`NO_ID`].
    ///
    /// # Errors
    ///
    /// Returns an error if the component vertex is not a member of
    /// `unique_vertex`.
    pub fn unset_unique_vertex(
        &mut self,
        component_vertex: &ComponentVertex,
        unique_vertex: Index,
    ) -> Result<()> {
        self.unlink(component_vertex, unique_vertex)?;
        if let Some(attribute) = self.vertex2unique_vertex.get(component_vertex.component_id.id()) {
            if attribute
                .value(component_vertex.vertex)
                .is_ok_and(|current| current == unique_vertex)
            {
                attribute.set_value(component_vertex.vertex, NO_ID)?;
            }
        }
        Ok(())
    }

    /// Follows a renumbering of the vertices of a component.
    ///
    /// `old_to_new` maps every old local index to its new index, or to
    /// [`NO_ID`] for removed vertices. Memberships of removed vertices are
    /// dropped; the others are rewritten. The identity attribute itself is
    /// renumbered by the component's own store, through
    /// [`VertexSet::delete_vertices`] or [`VertexSet::permute_vertices`] with
    /// the same map.
    ///
    /// # Errors
    ///
    /// Returns an error if a member vertex has no entry in `old_to_new`.
    /// Nothing is changed in that case.
    pub fn update_unique_vertices(
        &mut self,
        component_id: &ComponentId,
        old_to_new: &[Index],
    ) -> Result<()> {
        let id = component_id.id();
        let unique_vertices = self.component_unique_vertices(id);
        for &unique_vertex in &unique_vertices {
            for vertex in self.mesh_component_vertices_by_id(unique_vertex, id)? {
                if vertex as usize >= old_to_new.len() {
                    return Err(Error::index_out_of_bounds(vertex, old_to_new.len()));
                }
            }
        }
        for unique_vertex in unique_vertices {
            self.component_vertices.modify_value(unique_vertex, |members| {
                members.retain_mut(|member| {
                    if member.component_id.id() != id {
                        return true;
                    }
                    member.vertex = old_to_new[member.vertex as usize];
                    is_valid(member.vertex)
                });
            })?;
        }
        Ok(())
    }

    /// Returns the members of a unique vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if `unique_vertex` is out of range.
    pub fn mesh_component_vertices(&self, unique_vertex: Index) -> Result<Vec<ComponentVertex>> {
        self.component_vertices.value(unique_vertex)
    }

    /// Returns the members of a unique vertex belonging to components of
    /// the given type.
    ///
    /// # Errors
    ///
    /// Returns an error if `unique_vertex` is out of range.
    pub fn mesh_component_vertices_by_type(
        &self,
        unique_vertex: Index,
        component_type: &ComponentType,
    ) -> Result<Vec<ComponentVertex>> {
        self.component_vertices.with_value(unique_vertex, |members| {
            members
                .iter()
                .filter(|member| member.component_id.component_type() == component_type)
                .cloned()
                .collect()
        })
    }

    /// Returns the local vertices of one component that are members of a
    /// unique vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if `unique_vertex` is out of range.
    pub fn mesh_component_vertices_by_id(
        &self,
        unique_vertex: Index,
        component_id: &Uuid,
    ) -> Result<Vec<Index>> {
        self.component_vertices.with_value(unique_vertex, |members| {
            members
                .iter()
                .filter(|member| member.component_id.id() == component_id)
                .map(|member| member.vertex)
                .collect()
        })
    }

    /// Returns true if a unique vertex has a member of the given type.
    ///
    /// # Errors
    ///
    /// Returns an error if `unique_vertex` is out of range.
    pub fn has_mesh_component_vertices_by_type(
        &self,
        unique_vertex: Index,
        component_type: &ComponentType,
    ) -> Result<bool> {
        self.component_vertices.with_value(unique_vertex, |members| {
            members
                .iter()
                .any(|member| member.component_id.component_type() == component_type)
        })
    }

    /// Returns true if a unique vertex has a member from the component.
    ///
    /// # Errors
    ///
    /// Returns an error if `unique_vertex` is out of range.
    pub fn has_mesh_component_vertices_by_id(
        &self,
        unique_vertex: Index,
        component_id: &Uuid,
    ) -> Result<bool> {
        self.component_vertices.with_value(unique_vertex, |members| {
            members.iter().any(|member| member.component_id.id() == component_id)
        })
    }

    /// Returns the unique vertices having at least one member from the
    /// component, in increasing order.
    #[must_use]
    pub fn component_unique_vertices(&self, component_id: &Uuid) -> Vec<Index> {
        (0..self.nb_unique_vertices())
            .map(to_index)
            .filter(|&unique_vertex| {
                self.has_mesh_component_vertices_by_id(unique_vertex, component_id)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Saves the identifier into `directory`.
    ///
    /// Returns the path of the written file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_unique_vertices(&self, directory: &Path) -> Result<PathBuf> {
        self.save_unique_vertices_with_config(directory, &PersistConfig::default())
    }

    /// Saves the identifier into `directory` using `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_unique_vertices_with_config(
        &self,
        directory: &Path,
        config: &PersistConfig,
    ) -> Result<PathBuf> {
        let path = config.vertices_path(directory);
        save_to_file(self, &path, config)?;
        Ok(path)
    }

    /// Replaces the identifier with the one saved in `directory`.
    ///
    /// Loaded identity attributes are detached from any component until
    /// the component is registered again. On error, `self` is unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed.
    pub fn load_unique_vertices(&mut self, directory: &Path) -> Result<()> {
        self.load_unique_vertices_with_config(directory, &PersistConfig::default())
    }

    /// Replaces the identifier with the one saved in `directory` using
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed.
    pub fn load_unique_vertices_with_config(
        &mut self,
        directory: &Path,
        config: &PersistConfig,
    ) -> Result<()> {
        let mut loaded = Self::new();
        load_from_file(&mut loaded, &config.vertices_path(directory), &model_registry())?;
        *self = loaded;
        Ok(())
    }

    fn identity_attribute(&self, component_id: &Uuid) -> Result<&IdentityAttribute> {
        self.vertex2unique_vertex
            .get(component_id)
            .ok_or_else(|| Error::component_not_found(*component_id))
    }

    fn check_unique_vertex(&self, unique_vertex: Index) -> Result<()> {
        if (unique_vertex as usize) < self.nb_unique_vertices() {
            Ok(())
        } else {
            Err(Error::index_out_of_bounds(unique_vertex, self.nb_unique_vertices()))
        }
    }

    /// Removes a membership without touching the identity attribute.
    fn unlink(&self, component_vertex: &ComponentVertex, unique_vertex: Index) -> Result<()> {
        let removed = self.component_vertices.modify_value(unique_vertex, |members| {
            members
                .iter()
                .position(|member| member == component_vertex)
                .map(|position| members.remove(position))
                .is_some()
        })?;
        if removed {
            Ok(())
        } else {
            Err(Error::new(ErrorKind::MembershipNotFound {
                component: *component_vertex.component_id.id(),
                vertex: component_vertex.vertex,
                unique_vertex,
            }))
        }
    }

    fn filter_component_vertices(&self, component_id: &Uuid) -> Result<()> {
        for unique_vertex in (0..self.nb_unique_vertices()).map(to_index) {
            self.component_vertices.modify_value(unique_vertex, |members| {
                members.retain(|member| member.component_id.id() != component_id);
            })?;
        }
        Ok(())
    }
}

impl Persist for VertexIdentifier {
    fn write_to(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        DefaultGrowable::write(encoder, self, |encoder, identifier| {
            identifier.unique_vertices.write_to(encoder)?;
            let mut entries: Vec<_> = identifier.vertex2unique_vertex.iter().collect();
            entries.sort_unstable_by_key(|(id, _)| **id);
            encoder.write_len(entries.len())?;
            for (id, attribute) in entries {
                encoder.write(id)?;
                attribute.encode(encoder)?;
            }
            Ok(())
        })
    }

    fn read_from(&mut self, decoder: &mut Decoder<'_>) -> Result<()> {
        DefaultGrowable::read(decoder, self, |decoder, identifier| {
            identifier.unique_vertices.read_from(decoder)?;
            identifier.component_vertices = identifier
                .unique_vertices
                .vertex_attributes()
                .find(COMPONENT_VERTICES_ATTRIBUTE)?
                .ok_or_else(|| {
                    Error::serialization(format!(
                        "unique vertex attribute '{COMPONENT_VERTICES_ATTRIBUTE}' is missing"
                    ))
                })?;
            let nb_components = decoder.read_len()?;
            let mut vertex2unique_vertex = HashMap::with_capacity(nb_components);
            for _ in 0..nb_components {
                let id: Uuid = decoder.read()?;
                vertex2unique_vertex.insert(id, IdentityAttribute::decode(decoder)?);
            }
            identifier.vertex2unique_vertex = vertex2unique_vertex;
            Ok(())
        })
    }
}
