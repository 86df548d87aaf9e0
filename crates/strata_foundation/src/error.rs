//! Error types for the Strata system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//!
//! Three families of failures exist:
//! - contract violations (unknown component, mismatched attribute type,
//!   missing membership entry) that callers are not expected to recover from;
//! - format and I/O errors, fatal for the save or load call that raised them;
//! - recoverable conditions, which are logged and never surface as errors.

use std::fmt;

use thiserror::Error;

use crate::component::Uuid;
use crate::index::Index;

/// The main error type for Strata operations.
#[derive(Debug, Error)]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(context) = &self.context {
            write!(f, " {context}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Records the file the error relates to, keeping any existing frames.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_source(source));
        self
    }

    /// Creates an attribute type mismatch error.
    #[must_use]
    pub fn type_mismatch(
        name: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            name: name.into(),
            expected: expected.into(),
            actual: actual.into(),
        })
    }

    /// Creates an unknown component error.
    #[must_use]
    pub fn component_not_found(id: Uuid) -> Self {
        Self::new(ErrorKind::ComponentNotFound(id))
    }

    /// Creates an index out of bounds error.
    #[must_use]
    pub fn index_out_of_bounds(index: Index, length: usize) -> Self {
        Self::new(ErrorKind::IndexOutOfBounds { index, length })
    }

    /// Creates an unsupported version error.
    #[must_use]
    pub fn unsupported_version(found: u32, latest: u32) -> Self {
        Self::new(ErrorKind::UnsupportedVersion { found, latest })
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization(message.into()))
    }

    /// Creates an I/O error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io(message.into()))
    }

    /// Returns true for contract violations (programming errors).
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::TypeMismatch { .. }
                | ErrorKind::ComponentNotFound(_)
                | ErrorKind::ComponentAlreadyRegistered(_)
                | ErrorKind::AttributeAlreadyExists { .. }
                | ErrorKind::MembershipNotFound { .. }
                | ErrorKind::IndexOutOfBounds { .. }
                | ErrorKind::InvalidPermutation(_)
                | ErrorKind::InvalidCodec(_)
        )
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// An attribute exists under the requested name with another type.
    #[error("attribute type mismatch for '{name}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// The attribute name.
        name: String,
        /// The requested column type.
        expected: String,
        /// The stored column type.
        actual: String,
    },

    /// Component was never registered.
    #[error("component not found: {0}")]
    ComponentNotFound(Uuid),

    /// Component is already registered.
    #[error("component already registered: {0}")]
    ComponentAlreadyRegistered(Uuid),

    /// An attribute that must not exist yet was found.
    #[error("attribute already exists: {name}")]
    AttributeAlreadyExists {
        /// The attribute name.
        name: String,
    },

    /// A component vertex is not a member of the given unique vertex.
    #[error("vertex {vertex} of component {component} is not linked to unique vertex {unique_vertex}")]
    MembershipNotFound {
        /// The component owning the vertex.
        component: Uuid,
        /// The component-local vertex.
        vertex: Index,
        /// The unique vertex queried.
        unique_vertex: Index,
    },

    /// Index out of bounds.
    #[error("index out of bounds: {index} (length {length})")]
    IndexOutOfBounds {
        /// The index that was accessed.
        index: Index,
        /// The actual length of the collection.
        length: usize,
    },

    /// A renumbering map is not a permutation of the surviving rows.
    #[error("invalid permutation: {0}")]
    InvalidPermutation(String),

    /// A versioned codec was declared with an invalid reader table.
    #[error("invalid codec: {0}")]
    InvalidCodec(String),

    /// A persisted version tag is outside the known range.
    #[error("unsupported version {found} (latest known is {latest})")]
    UnsupportedVersion {
        /// The version tag read from the stream.
        found: u32,
        /// The latest version this build can read.
        latest: u32,
    },

    /// A persisted attribute has a type no reader is registered for.
    #[error("unknown attribute type: {0}")]
    UnknownAttributeType(String),

    /// Encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// File system access failed.
    #[error("I/O error: {0}")]
    Io(String),

}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// File the failing operation was reading or writing.
    pub source: Option<String>,
    /// Nested aggregates being processed, outermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source file.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "in file {source}")?;
        }
        for frame in &self.stack {
            write!(f, "\n  in {frame}")?;
        }
        Ok(())
    }
}

/// Result type alias for Strata operations.
pub type Result<T> = std::result::Result<T, Error>;
