//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use strata_foundation::{Error, ErrorContext, ErrorKind, new_uuid};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_type_mismatch() {
    let err = Error::type_mismatch("weight", "variable<f64>", "variable<u32>");
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    let msg = format!("{err}");
    assert!(msg.contains("weight"));
    assert!(msg.contains("variable<f64>"));
}

#[test]
fn error_component_not_found() {
    let id = new_uuid();
    let err = Error::component_not_found(id);
    assert!(matches!(err.kind, ErrorKind::ComponentNotFound(found) if found == id));
    assert!(format!("{err}").contains(&id.to_string()));
}

#[test]
fn error_unsupported_version() {
    let err = Error::unsupported_version(4, 2);
    let msg = format!("{err}");
    assert!(msg.contains('4'));
    assert!(msg.contains('2'));
}

// =============================================================================
// Error Classification
// =============================================================================

#[test]
fn contract_violations_are_classified() {
    assert!(Error::index_out_of_bounds(3, 1).is_contract_violation());
    assert!(Error::component_not_found(new_uuid()).is_contract_violation());
    assert!(!Error::io("disk full").is_contract_violation());
    assert!(!Error::serialization("truncated").is_contract_violation());
    assert!(!Error::unsupported_version(9, 1).is_contract_violation());
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn error_with_source_names_the_file() {
    let err = Error::serialization("unexpected end of input").with_source("/models/a/vertices");
    let msg = format!("{err}");
    assert!(msg.contains("unexpected end of input"));
    assert!(msg.contains("/models/a/vertices"));
}

#[test]
fn error_context_keeps_frames() {
    let err = Error::io("denied")
        .with_context(ErrorContext::new().with_frame("attribute 'uuid'"))
        .with_source("relationships");
    let msg = format!("{err}");
    assert!(msg.contains("attribute 'uuid'"));
    assert!(msg.contains("relationships"));
}
