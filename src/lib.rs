//! Strata - Persistence and identity layer for geometric models
//!
//! This crate re-exports all layers of the Strata system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: strata_model      - Component relations, vertex identity
//! Layer 1: strata_storage    - Attribute stores, entity collections, versioned codec
//! Layer 0: strata_foundation - Core types (Index, Uuid, ComponentId, Error)
//! ```

pub use strata_foundation as foundation;
pub use strata_model as model;
pub use strata_storage as storage;
