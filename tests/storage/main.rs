//! Integration tests for Layer 1: Storage
//!
//! Tests for attribute stores, entity collections, and versioned persistence.

mod attributes;
mod codec;
mod graph;
mod persistence;
