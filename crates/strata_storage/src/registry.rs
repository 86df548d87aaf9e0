//! Readers for persisted attribute columns.
//!
//! Columns are stored type-erased. On load, the persisted type tag selects
//! the reader registered for that concrete column type. Each layer registers
//! the element types it introduces.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use strata_foundation::{Error, ErrorKind, Index, Result, Uuid};

use crate::attribute::{Attribute, AttributeValue, ErasedColumn, SparseAttribute, VariableAttribute};
use crate::codec::Decoder;
use crate::graph::EdgeVertex;

pub(crate) type ColumnReader = fn(&mut Decoder<'_>) -> Result<Rc<dyn ErasedColumn>>;

fn read_column<A: Attribute>(decoder: &mut Decoder<'_>) -> Result<Rc<dyn ErasedColumn>> {
    let attribute = A::decode(decoder)?;
    Ok(Rc::new(RefCell::new(attribute)))
}

/// Maps persisted type tags to column readers.
#[derive(Clone, Default)]
pub struct AttributeRegistry {
    readers: HashMap<String, ColumnReader>,
}

impl AttributeRegistry {
    /// Creates a registry knowing every storage-layer element type.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry.register_value::<bool>();
        registry.register_value::<u8>();
        registry.register_value::<u16>();
        registry.register_value::<u32>();
        registry.register_value::<u64>();
        registry.register_value::<i8>();
        registry.register_value::<i16>();
        registry.register_value::<i32>();
        registry.register_value::<i64>();
        registry.register_value::<f32>();
        registry.register_value::<f64>();
        registry.register_value::<String>();
        registry.register_value::<Uuid>();
        registry.register_value::<[f64; 2]>();
        registry.register_value::<[f64; 3]>();
        registry.register_value::<[Index; 2]>();
        registry.register_value::<Vec<Index>>();
        registry.register_value::<EdgeVertex>();
        registry.register_value::<Vec<EdgeVertex>>();
        registry
    }

    /// Registers one concrete column type.
    pub fn register<A: Attribute>(&mut self) {
        self.readers.insert(A::type_tag(), read_column::<A>);
    }

    /// Registers both column variants for an element type.
    pub fn register_value<T: AttributeValue>(&mut self) {
        self.register::<VariableAttribute<T>>();
        self.register::<SparseAttribute<T>>();
    }

    /// Returns true if a reader exists for the type tag.
    #[must_use]
    pub fn contains(&self, type_tag: &str) -> bool {
        self.readers.contains_key(type_tag)
    }

    /// Returns the number of known column types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.readers.len()
    }

    /// Returns true if no column type is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }

    pub(crate) fn read_column(
        &self,
        type_tag: &str,
        decoder: &mut Decoder<'_>,
    ) -> Result<Rc<dyn ErasedColumn>> {
        let reader = self
            .readers
            .get(type_tag)
            .ok_or_else(|| Error::new(ErrorKind::UnknownAttributeType(type_tag.to_string())))?;
        reader(decoder)
    }
}

impl std::fmt::Debug for AttributeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<_> = self.readers.keys().collect();
        tags.sort();
        f.debug_struct("AttributeRegistry").field("types", &tags).finish()
    }
}
