//! Mapping from component identifiers to dense graph indices.

use std::collections::HashMap;

use strata_foundation::{Error, ErrorKind, Index, Result, Uuid};
use strata_storage::{Decoder, DefaultGrowable, Encoder, Persist};

/// Maps each registered component to its vertex in the relation graph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UuidToIndex {
    indices: HashMap<Uuid, Index>,
}

impl UuidToIndex {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of mapped components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if no component is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns true if `id` is mapped.
    #[must_use]
    pub fn contains(&self, id: &Uuid) -> bool {
        self.indices.contains_key(id)
    }

    /// Returns the index mapped to `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not mapped.
    pub fn index(&self, id: &Uuid) -> Result<Index> {
        self.indices
            .get(id)
            .copied()
            .ok_or_else(|| Error::component_not_found(*id))
    }

    /// Maps a new component.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is already mapped.
    pub fn set_new_mapping(&mut self, id: Uuid, index: Index) -> Result<()> {
        if self.indices.contains_key(&id) {
            return Err(Error::new(ErrorKind::ComponentAlreadyRegistered(id)));
        }
        self.indices.insert(id, index);
        Ok(())
    }

    /// Removes the mapping of `id`, returning its index.
    pub fn erase(&mut self, id: &Uuid) -> Option<Index> {
        self.indices.remove(id)
    }

    /// Iterates the mapped components and their indices, in no order.
    pub fn iter(&self) -> impl Iterator<Item = (&Uuid, Index)> {
        self.indices.iter().map(|(id, index)| (id, *index))
    }

    /// Shifts down every index above `removed`.
    pub fn decrement_indices_larger_than(&mut self, removed: Index) {
        for index in self.indices.values_mut() {
            if *index > removed {
                *index -= 1;
            }
        }
    }
}

impl Persist for UuidToIndex {
    fn write_to(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        DefaultGrowable::write(encoder, self, |encoder, map| {
            let mut entries: Vec<_> = map.indices.iter().map(|(id, index)| (*id, *index)).collect();
            entries.sort_unstable_by_key(|(_, index)| *index);
            encoder.write(&entries)
        })
    }

    fn read_from(&mut self, decoder: &mut Decoder<'_>) -> Result<()> {
        DefaultGrowable::read(decoder, self, |decoder, map| {
            let entries: Vec<(Uuid, Index)> = decoder.read()?;
            map.indices = entries.into_iter().collect();
            Ok(())
        })
    }
}
