//! Integration tests for Layer 2: Model
//!
//! Tests for component relations, vertex identity, and saving a model.

mod relationships;
mod scenario;

/// Shows `log` output of the library when tests run with `RUST_LOG` set.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
