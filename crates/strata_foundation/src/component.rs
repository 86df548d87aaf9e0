//! Model component identifiers.
//!
//! A [`Uuid`] names one model component (a corner, a line, a surface, ...)
//! across save/load cycles. [`ComponentId`] pairs it with the
//! [`ComponentType`] so that queries can filter by kind.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use uuid::Uuid;

/// Creates a fresh random component identifier.
#[must_use]
pub fn new_uuid() -> Uuid {
    Uuid::new_v4()
}

/// The kind of a model component.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentType(Cow<'static, str>);

impl ComponentType {
    /// Point-like component bounding lines.
    pub const CORNER: Self = Self(Cow::Borrowed("Corner"));
    /// Curve component bounded by corners.
    pub const LINE: Self = Self(Cow::Borrowed("Line"));
    /// Surface component bounded by lines.
    pub const SURFACE: Self = Self(Cow::Borrowed("Surface"));
    /// Volume component bounded by surfaces.
    pub const BLOCK: Self = Self(Cow::Borrowed("Block"));
    /// Collection of components forming a model boundary.
    pub const MODEL_BOUNDARY: Self = Self(Cow::Borrowed("ModelBoundary"));

    /// Creates a component type with a custom name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Returns the type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentType({})", self.0)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Typed identifier of a model component.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentId {
    /// Kind of the component.
    pub component_type: ComponentType,
    /// Unique identifier of the component.
    pub id: Uuid,
}

impl ComponentId {
    /// Creates a component identifier from its parts.
    #[must_use]
    pub const fn new(component_type: ComponentType, id: Uuid) -> Self {
        Self { component_type, id }
    }

    /// Creates an identifier with a fresh [`Uuid`].
    #[must_use]
    pub fn generate(component_type: ComponentType) -> Self {
        Self::new(component_type, new_uuid())
    }

    /// Returns the kind of the component.
    #[must_use]
    pub fn component_type(&self) -> &ComponentType {
        &self.component_type
    }

    /// Returns the unique identifier of the component.
    #[must_use]
    pub const fn id(&self) -> &Uuid {
        &self.id
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({} {})", self.component_type, self.id)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.component_type, self.id)
    }
}
