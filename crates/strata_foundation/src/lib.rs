//! Core identifiers, errors, and configuration for Strata.
//!
//! This crate provides:
//! - [`Index`] and [`NO_ID`] - Dense element indices and the "no entity" sentinel
//! - [`ComponentType`] and [`ComponentId`] - Typed model component identifiers
//! - [`Error`] - Rich error types with context
//! - [`PersistConfig`] - File layout settings for saved aggregates

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod component;
pub mod config;
pub mod error;
pub mod index;

pub use component::{ComponentId, ComponentType, Uuid, new_uuid};
pub use config::PersistConfig;
pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use index::{Index, NO_ID, is_valid, to_index};
