//! Name-keyed attribute storage for one entity collection.
//!
//! The `AttributeStore` owns a directory of columns, all aligned with the
//! collection's row count. Resizing and compaction are applied to every
//! column at once, so clients never observe columns of different lengths.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use strata_foundation::{Error, ErrorContext, ErrorKind, Index, NO_ID, Result, is_valid, to_index};

use crate::attribute::{Attribute, AttributeHandle, ErasedColumn};
use crate::codec::{Decoder, DefaultGrowable, Encoder, Persist};

/// Stores the attribute columns of one entity collection.
#[derive(Default)]
pub struct AttributeStore {
    /// Current number of rows.
    nb_elements: usize,
    /// Columns by name, ordered for deterministic persistence.
    attributes: BTreeMap<String, Rc<dyn ErasedColumn>>,
}

impl AttributeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn nb_elements(&self) -> usize {
        self.nb_elements
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn nb_attributes(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true if a column exists under `name`.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Iterates the column names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    /// Returns the persisted type tag of a column.
    #[must_use]
    pub fn type_tag(&self, name: &str) -> Option<String> {
        self.attributes.get(name).map(|column| column.type_tag())
    }

    /// Returns the column stored under `name`, creating it if missing.
    ///
    /// A new column has one row per element, each set to `default`.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` exists with another column type.
    pub fn find_or_create<A: Attribute>(
        &mut self,
        name: &str,
        default: A::Value,
    ) -> Result<AttributeHandle<A>> {
        if let Some(handle) = self.find::<A>(name)? {
            return Ok(handle);
        }
        Ok(self.create(name, default))
    }

    /// Returns the column stored under `name`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` exists with another column type.
    pub fn find<A: Attribute>(&self, name: &str) -> Result<Option<AttributeHandle<A>>> {
        let Some(column) = self.attributes.get(name) else {
            return Ok(None);
        };
        Rc::clone(column)
            .into_any()
            .downcast()
            .map(|column| Some(AttributeHandle::from_rc(column)))
            .map_err(|_| Error::type_mismatch(name, A::type_tag(), column.type_tag()))
    }

    /// Creates a new column under `name`, replacing any previous one.
    ///
    /// Handles to a replaced column stay valid but detached from the store.
    pub fn create<A: Attribute>(&mut self, name: &str, default: A::Value) -> AttributeHandle<A> {
        let handle = AttributeHandle::new(A::with_default(default, self.nb_elements));
        self.attributes.insert(name.to_string(), handle.erased());
        handle
    }

    /// Removes the column stored under `name`.
    ///
    /// Returns true if a column was removed. Outstanding handles keep the
    /// column alive.
    pub fn delete(&mut self, name: &str) -> bool {
        self.attributes.remove(name).is_some()
    }

    /// Resizes every column to `nb_elements` rows.
    ///
    /// New rows take each column's default value.
    pub fn resize(&mut self, nb_elements: usize) {
        for column in self.attributes.values() {
            column.resize(nb_elements);
        }
        self.nb_elements = nb_elements;
    }

    /// Keeps only the rows flagged in `keep`, preserving their order.
    ///
    /// Returns the old-to-new index map; removed rows map to [`NO_ID`].
    ///
    /// # Errors
    ///
    /// Returns an error if `keep` does not have one flag per row.
    pub fn compact(&mut self, keep: &[bool]) -> Result<Vec<Index>> {
        if keep.len() != self.nb_elements {
            return Err(Error::new(ErrorKind::IndexOutOfBounds {
                index: to_index(keep.len()),
                length: self.nb_elements,
            })
            .with_context(ErrorContext::new().with_frame("AttributeStore::compact")));
        }
        let mut nb_kept = 0;
        let old_to_new: Vec<Index> = keep
            .iter()
            .map(|&kept| {
                if kept {
                    nb_kept += 1;
                    to_index(nb_kept - 1)
                } else {
                    NO_ID
                }
            })
            .collect();
        self.apply_permutation(&old_to_new, nb_kept);
        Ok(old_to_new)
    }

    /// Removes the rows flagged in `to_delete`.
    ///
    /// # Errors
    ///
    /// Returns an error if `to_delete` does not have one flag per row.
    pub fn delete_elements(&mut self, to_delete: &[bool]) -> Result<Vec<Index>> {
        let keep: Vec<bool> = to_delete.iter().map(|&deleted| !deleted).collect();
        self.compact(&keep)
    }

    /// Moves every row `i` to `old_to_new[i]`, dropping rows mapped to
    /// [`NO_ID`].
    ///
    /// Unlike [`AttributeStore::compact`], surviving rows may change order.
    /// The valid entries of the map must cover `0..k` exactly once, where `k`
    /// becomes the new row count.
    ///
    /// # Errors
    ///
    /// Returns an error if the map does not have one entry per row or its
    /// valid entries are not a permutation of `0..k`. Nothing is changed in
    /// that case.
    pub fn permute(&mut self, old_to_new: &[Index]) -> Result<()> {
        if old_to_new.len() != self.nb_elements {
            return Err(Error::new(ErrorKind::IndexOutOfBounds {
                index: to_index(old_to_new.len()),
                length: self.nb_elements,
            })
            .with_context(ErrorContext::new().with_frame("AttributeStore::permute")));
        }
        let new_len = old_to_new.iter().filter(|&&new| is_valid(new)).count();
        let mut taken = vec![false; new_len];
        for &new in old_to_new.iter().filter(|&&new| is_valid(new)) {
            match taken.get_mut(new as usize) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(Error::new(ErrorKind::InvalidPermutation(format!(
                        "target row {new} is out of 0..{new_len} or used twice"
                    ))));
                }
            }
        }
        self.apply_permutation(old_to_new, new_len);
        Ok(())
    }

    fn apply_permutation(&mut self, old_to_new: &[Index], new_len: usize) {
        for column in self.attributes.values() {
            column.compact(old_to_new, new_len);
        }
        self.nb_elements = new_len;
    }

    /// Replaces this store with a deep copy of `other`.
    ///
    /// Copied columns are independent of the originals.
    pub fn copy_from(&mut self, other: &Self) {
        self.nb_elements = other.nb_elements;
        self.attributes = other
            .attributes
            .iter()
            .map(|(name, column)| (name.clone(), column.duplicate()))
            .collect();
    }

    /// Removes every column and row.
    pub fn clear(&mut self) {
        self.attributes.clear();
        self.nb_elements = 0;
    }
}

impl Persist for AttributeStore {
    fn write_to(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        DefaultGrowable::write(encoder, self, |encoder, store| {
            encoder.write_len(store.nb_elements)?;
            encoder.write_len(store.attributes.len())?;
            for (name, column) in &store.attributes {
                encoder.write(name)?;
                encoder.write(&column.type_tag())?;
                column.encode(encoder)?;
            }
            Ok(())
        })
    }

    fn read_from(&mut self, decoder: &mut Decoder<'_>) -> Result<()> {
        DefaultGrowable::read(decoder, self, |decoder, store| {
            let nb_elements = decoder.read_len()?;
            let nb_attributes = decoder.read_len()?;
            let mut attributes = BTreeMap::new();
            for _ in 0..nb_attributes {
                let name: String = decoder.read()?;
                let type_tag: String = decoder.read()?;
                let column = decoder
                    .registry()
                    .read_column(&type_tag, decoder)
                    .map_err(|e| {
                        e.with_context(ErrorContext::new().with_frame(format!("attribute '{name}'")))
                    })?;
                if column.len() != nb_elements {
                    return Err(Error::serialization(format!(
                        "attribute '{name}' has {} rows, expected {nb_elements}",
                        column.len()
                    )));
                }
                attributes.insert(name, column);
            }
            store.nb_elements = nb_elements;
            store.attributes = attributes;
            Ok(())
        })
    }
}

impl fmt::Debug for AttributeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: BTreeMap<_, _> = self
            .attributes
            .iter()
            .map(|(name, column)| (name.as_str(), column.type_tag()))
            .collect();
        f.debug_struct("AttributeStore")
            .field("nb_elements", &self.nb_elements)
            .field("attributes", &columns)
            .finish()
    }
}
