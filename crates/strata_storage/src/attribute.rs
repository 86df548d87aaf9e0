//! Typed attribute columns.
//!
//! An attribute is one typed array aligned with the rows of an entity
//! collection. Column variants are generic over their element type:
//! - [`VariableAttribute`] stores one value per row;
//! - [`SparseAttribute`] stores only the rows that differ from the default.
//!
//! Columns are shared through [`AttributeHandle`], a reference-counted cell.
//! Every holder of a handle sees the mutations made through any other.

use std::any::Any;
use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use strata_foundation::{Error, Index, Result, Uuid, is_valid, to_index};

use crate::codec::{Decoder, DefaultGrowable, Encoder};

/// An element type that can be stored in an attribute column.
///
/// The type name is persisted next to every column so that loading can
/// rebuild the right concrete column.
pub trait AttributeValue: Clone + Serialize + DeserializeOwned + 'static {
    /// Stable name of the element type.
    fn type_name() -> String;
}

macro_rules! impl_attribute_value {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl AttributeValue for $ty {
                fn type_name() -> String {
                    $name.to_string()
                }
            }
        )*
    };
}

impl_attribute_value! {
    bool => "bool",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    f32 => "f32",
    f64 => "f64",
    String => "string",
    Uuid => "uuid",
}

impl<T: AttributeValue, const N: usize> AttributeValue for [T; N]
where
    [T; N]: Serialize + DeserializeOwned,
{
    fn type_name() -> String {
        format!("[{};{N}]", T::type_name())
    }
}

impl<T: AttributeValue> AttributeValue for Vec<T> {
    fn type_name() -> String {
        format!("vec<{}>", T::type_name())
    }
}

/// A column of values, one per row of its collection.
pub trait Attribute: Clone + 'static {
    /// The element type.
    type Value: AttributeValue;

    /// Name of the column variant, part of the persisted type tag.
    const KIND: &'static str;

    /// Creates a column of `len` rows set to `default`.
    fn with_default(default: Self::Value, len: usize) -> Self;

    /// Returns the value used for new rows.
    fn default_value(&self) -> &Self::Value;

    /// Returns the number of rows.
    fn len(&self) -> usize;

    /// Returns true if the column has no rows.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the value of a row.
    fn get(&self, index: Index) -> Option<&Self::Value>;

    /// Replaces the value of a row.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    fn set(&mut self, index: Index, value: Self::Value) -> Result<()>;

    /// Mutates the value of a row in place.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    fn modify<R>(&mut self, index: Index, f: impl FnOnce(&mut Self::Value) -> R) -> Result<R>;

    /// Grows (with the default value) or truncates the column.
    fn resize(&mut self, len: usize);

    /// Moves each row `i` to `old_to_new[i]`, dropping rows mapped to `NO_ID`.
    fn compact(&mut self, old_to_new: &[Index], new_len: usize);

    /// Writes the column in its envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()>;

    /// Reads a column written by [`Attribute::encode`].
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is truncated or corrupted.
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self>;

    /// Persisted type tag, e.g. `variable<u32>`.
    fn type_tag() -> String {
        format!("{}<{}>", Self::KIND, Self::Value::type_name())
    }
}

/// Dense column: one stored value per row.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableAttribute<T> {
    default: T,
    values: Vec<T>,
}

impl<T: AttributeValue> Attribute for VariableAttribute<T> {
    type Value = T;
    const KIND: &'static str = "variable";

    fn with_default(default: T, len: usize) -> Self {
        Self {
            values: vec![default.clone(); len],
            default,
        }
    }

    fn default_value(&self) -> &T {
        &self.default
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn get(&self, index: Index) -> Option<&T> {
        self.values.get(index as usize)
    }

    fn set(&mut self, index: Index, value: T) -> Result<()> {
        let length = self.values.len();
        let slot = self
            .values
            .get_mut(index as usize)
            .ok_or_else(|| Error::index_out_of_bounds(index, length))?;
        *slot = value;
        Ok(())
    }

    fn modify<R>(&mut self, index: Index, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let length = self.values.len();
        let slot = self
            .values
            .get_mut(index as usize)
            .ok_or_else(|| Error::index_out_of_bounds(index, length))?;
        Ok(f(slot))
    }

    fn resize(&mut self, len: usize) {
        self.values.resize(len, self.default.clone());
    }

    fn compact(&mut self, old_to_new: &[Index], new_len: usize) {
        let mut values = vec![self.default.clone(); new_len];
        for (value, &new) in std::mem::take(&mut self.values).into_iter().zip(old_to_new) {
            if is_valid(new) {
                values[new as usize] = value;
            }
        }
        self.values = values;
    }

    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        DefaultGrowable::write(encoder, self, |encoder, attribute| {
            encoder.write(&attribute.default)?;
            encoder.write(&attribute.values)
        })
    }

    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        DefaultGrowable::decode(decoder, |decoder| {
            Ok(Self {
                default: decoder.read()?,
                values: decoder.read()?,
            })
        })
    }
}

/// Sparse column: only rows holding a non-default value are stored.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseAttribute<T> {
    default: T,
    len: usize,
    values: HashMap<Index, T>,
}

impl<T: AttributeValue> SparseAttribute<T> {
    /// Returns the number of rows holding an explicit value.
    #[must_use]
    pub fn nb_stored(&self) -> usize {
        self.values.len()
    }
}

impl<T: AttributeValue> Attribute for SparseAttribute<T> {
    type Value = T;
    const KIND: &'static str = "sparse";

    fn with_default(default: T, len: usize) -> Self {
        Self {
            default,
            len,
            values: HashMap::new(),
        }
    }

    fn default_value(&self) -> &T {
        &self.default
    }

    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, index: Index) -> Option<&T> {
        if (index as usize) < self.len {
            Some(self.values.get(&index).unwrap_or(&self.default))
        } else {
            None
        }
    }

    fn set(&mut self, index: Index, value: T) -> Result<()> {
        if index as usize >= self.len {
            return Err(Error::index_out_of_bounds(index, self.len));
        }
        self.values.insert(index, value);
        Ok(())
    }

    fn modify<R>(&mut self, index: Index, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        if index as usize >= self.len {
            return Err(Error::index_out_of_bounds(index, self.len));
        }
        let value = self
            .values
            .entry(index)
            .or_insert_with(|| self.default.clone());
        Ok(f(value))
    }

    fn resize(&mut self, len: usize) {
        if len < self.len {
            self.values.retain(|&index, _| (index as usize) < len);
        }
        self.len = len;
    }

    fn compact(&mut self, old_to_new: &[Index], new_len: usize) {
        self.values = std::mem::take(&mut self.values)
            .into_iter()
            .filter_map(|(old, value)| {
                let new = *old_to_new.get(old as usize)?;
                is_valid(new).then_some((new, value))
            })
            .collect();
        self.len = new_len;
    }

    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        DefaultGrowable::write(encoder, self, |encoder, attribute| {
            let mut entries: Vec<_> = attribute.values.iter().collect();
            entries.sort_by_key(|(index, _)| **index);
            encoder.write(&attribute.default)?;
            encoder.write_len(attribute.len)?;
            encoder.write(&entries)
        })
    }

    fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        DefaultGrowable::decode(decoder, |decoder| {
            let default = decoder.read()?;
            let len = decoder.read_len()?;
            let entries: Vec<(Index, T)> = decoder.read()?;
            Ok(Self {
                default,
                len,
                values: entries.into_iter().collect(),
            })
        })
    }
}

/// Shared handle to one attribute column.
///
/// Cloning the handle shares the column. A handle stays usable after its
/// attribute was deleted from the store; it then no longer follows the
/// store's resizes.
///
/// Closures given to [`AttributeHandle::with_value`] and
/// [`AttributeHandle::modify_value`] must not access the same handle.
#[derive(Debug)]
pub struct AttributeHandle<A> {
    inner: Rc<RefCell<A>>,
}

impl<A> Clone for AttributeHandle<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A: Attribute> AttributeHandle<A> {
    /// Wraps a standalone column.
    #[must_use]
    pub fn new(attribute: A) -> Self {
        Self {
            inner: Rc::new(RefCell::new(attribute)),
        }
    }

    pub(crate) fn from_rc(inner: Rc<RefCell<A>>) -> Self {
        Self { inner }
    }

    pub(crate) fn erased(&self) -> Rc<dyn ErasedColumn> {
        Rc::clone(&self.inner) as Rc<dyn ErasedColumn>
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Returns true if the column has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of the value of a row.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn value(&self, index: Index) -> Result<A::Value> {
        self.with_value(index, Clone::clone)
    }

    /// Reads the value of a row without copying it.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn with_value<R>(&self, index: Index, f: impl FnOnce(&A::Value) -> R) -> Result<R> {
        let attribute = self.inner.borrow();
        attribute
            .get(index)
            .map(f)
            .ok_or_else(|| Error::index_out_of_bounds(index, attribute.len()))
    }

    /// Replaces the value of a row.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn set_value(&self, index: Index, value: A::Value) -> Result<()> {
        self.inner.borrow_mut().set(index, value)
    }

    /// Mutates the value of a row in place.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn modify_value<R>(&self, index: Index, f: impl FnOnce(&mut A::Value) -> R) -> Result<R> {
        self.inner.borrow_mut().modify(index, f)
    }

    /// Sets rows `0..n` from the `n` given values.
    ///
    /// # Errors
    ///
    /// Returns an error if more values than rows are given. Nothing is
    /// changed in that case.
    pub fn set_values(&self, values: impl IntoIterator<Item = A::Value>) -> Result<()> {
        let values: Vec<A::Value> = values.into_iter().collect();
        let mut attribute = self.inner.borrow_mut();
        if values.len() > attribute.len() {
            return Err(Error::index_out_of_bounds(
                to_index(values.len() - 1),
                attribute.len(),
            ));
        }
        for (index, value) in (0..).zip(values) {
            attribute.set(index, value)?;
        }
        Ok(())
    }

    /// Sets every row to `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the column changes size while being filled.
    pub fn fill(&self, value: &A::Value) -> Result<()> {
        let mut attribute = self.inner.borrow_mut();
        for index in 0..attribute.len() {
            attribute.set(to_index(index), value.clone())?;
        }
        Ok(())
    }

    /// Returns a copy of all row values.
    #[must_use]
    pub fn values(&self) -> Vec<A::Value> {
        let attribute = self.inner.borrow();
        (0..attribute.len())
            .filter_map(|index| attribute.get(to_index(index)).cloned())
            .collect()
    }

    /// Returns a copy of the default value.
    #[must_use]
    pub fn default_value(&self) -> A::Value {
        self.inner.borrow().default_value().clone()
    }

    /// Borrows the column itself.
    ///
    /// # Panics
    ///
    /// Panics if the column is currently borrowed mutably.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, A> {
        self.inner.borrow()
    }

    /// Returns true if both handles share the same column.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Writes the column.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        self.inner.borrow().encode(encoder)
    }

    /// Reads a standalone column.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is truncated or corrupted.
    pub fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        A::decode(decoder).map(Self::new)
    }
}

/// Column operations that do not depend on the element type.
pub(crate) trait ErasedColumn {
    fn type_tag(&self) -> String;
    fn len(&self) -> usize;
    fn resize(&self, len: usize);
    fn compact(&self, old_to_new: &[Index], new_len: usize);
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()>;
    fn duplicate(&self) -> Rc<dyn ErasedColumn>;
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<A: Attribute> ErasedColumn for RefCell<A> {
    fn type_tag(&self) -> String {
        A::type_tag()
    }

    fn len(&self) -> usize {
        self.borrow().len()
    }

    fn resize(&self, len: usize) {
        self.borrow_mut().resize(len);
    }

    fn compact(&self, old_to_new: &[Index], new_len: usize) {
        self.borrow_mut().compact(old_to_new, new_len);
    }

    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        self.borrow().encode(encoder)
    }

    fn duplicate(&self) -> Rc<dyn ErasedColumn> {
        Rc::new(RefCell::new(self.borrow().clone()))
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}
