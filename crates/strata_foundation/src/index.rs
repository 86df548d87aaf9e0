//! Dense element indices.
//!
//! Every entity collection (vertices, edges, unique vertices, ...) addresses
//! its rows with a dense [`Index`]. Indices are not stable: any deletion may
//! renumber the surviving rows, and holders must re-resolve them through the
//! old-to-new map returned by the deleting operation.

// Element counts never exceed `u32::MAX` rows.
#![allow(clippy::cast_possible_truncation)]

/// Index of one element in an entity collection.
pub type Index = u32;

/// Sentinel value meaning "no entity".
///
/// Never allocated as a real index. Old-to-new maps use it to mark
/// deleted rows.
pub const NO_ID: Index = Index::MAX;

/// Returns true if `index` is not the [`NO_ID`] sentinel.
#[must_use]
pub const fn is_valid(index: Index) -> bool {
    index != NO_ID
}

/// Converts an element count or position into an [`Index`].
#[must_use]
pub const fn to_index(value: usize) -> Index {
    value as Index
}
