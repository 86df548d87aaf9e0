//! Attribute storage, entity collections, and versioned persistence for Strata.
//!
//! This crate provides:
//! - [`AttributeStore`] - Name-keyed typed columns aligned with a collection
//! - [`VertexSet`] and [`Graph`] - Entity collections built on attribute stores
//! - [`Growable`] and [`DefaultGrowable`] - Versioned binary envelopes
//! - [`save_to_file`] and [`load_from_file`] - File persistence of aggregates

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod attribute;
pub mod codec;
pub mod graph;
pub mod io;
pub mod registry;
pub mod store;
pub mod vertex_set;

pub use attribute::{Attribute, AttributeHandle, AttributeValue, SparseAttribute, VariableAttribute};
pub use codec::{
    Decoder, DefaultGrowable, Encoder, FIRST_VERSION, Growable, MigrateFn, Persist, ReadFn, WriteFn,
};
pub use graph::{EdgeVertex, Graph};
pub use io::{load_from_file, save_to_file};
pub use registry::AttributeRegistry;
pub use store::AttributeStore;
pub use vertex_set::VertexSet;
