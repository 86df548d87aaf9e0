//! Component relations and vertex identity for Strata models.
//!
//! This crate provides:
//! - [`Relationships`] - Boundary and collection relations between components
//! - [`VertexIdentifier`] - Model-wide identity of component vertices
//! - [`MeshComponent`] - The view of a component these structures need

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod component;
pub mod registry;
pub mod relationships;
pub mod uuid_to_index;
pub mod vertex_identifier;

pub use component::{Component, ComponentVertex, MeshComponent};
pub use registry::model_registry;
pub use relationships::{Relation, RelationKind, RelationRange, Relationships};
pub use uuid_to_index::UuidToIndex;
pub use vertex_identifier::{UNIQUE_VERTICES_ATTRIBUTE, VertexIdentifier};
