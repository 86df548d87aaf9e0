//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Index, ComponentId, Error, and PersistConfig.

mod config;
mod errors;
mod identifiers;
