use std::collections::HashMap;
use std::fmt;

use crate::error::{DataAccessError, Result};

/// The fixed set of column types a dataset property can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Char,
    UChar,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Boolean,
    Float,
    Double,
    /// Arbitrary precision decimal kept as text.
    Numeric,
    String,
    ByteArray,
    Geometry,
    Raster,
    DateTime,
}

impl DataType {
    pub const ALL: [DataType; 17] = [
        DataType::Char,
        DataType::UChar,
        DataType::Int16,
        DataType::UInt16,
        DataType::Int32,
        DataType::UInt32,
        DataType::Int64,
        DataType::UInt64,
        DataType::Boolean,
        DataType::Float,
        DataType::Double,
        DataType::Numeric,
        DataType::String,
        DataType::ByteArray,
        DataType::Geometry,
        DataType::Raster,
        DataType::DateTime,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DataType::Char => "char",
            DataType::UChar => "uchar",
            DataType::Int16 => "int16",
            DataType::UInt16 => "uint16",
            DataType::Int32 => "int32",
            DataType::UInt32 => "uint32",
            DataType::Int64 => "int64",
            DataType::UInt64 => "uint64",
            DataType::Boolean => "boolean",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::Numeric => "numeric",
            DataType::String => "string",
            DataType::ByteArray => "byte_array",
            DataType::Geometry => "geometry",
            DataType::Raster => "raster",
            DataType::DateTime => "datetime",
        }
    }

    /// Case-insensitive inverse of [`DataType::name`].
    pub fn from_name(name: &str) -> Option<DataType> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.name().eq_ignore_ascii_case(name))
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            DataType::Char
                | DataType::UChar
                | DataType::Int16
                | DataType::UInt16
                | DataType::Int32
                | DataType::UInt32
                | DataType::Int64
                | DataType::UInt64
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, DataType::Float | DataType::Double)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_floating() || self == DataType::Numeric
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Character encoding of string properties.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CharEncoding {
    #[default]
    Utf8,
    Latin1,
    Cp1252,
    Unknown,
}

/// How a dataset can be traversed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraverseType {
    ForwardOnly,
    Bidirectional,
    Random,
    FastForwardOnly,
}

/// What a dataset allows callers to do with its items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessPolicy {
    NoAccess,
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub data_type: DataType,
    pub char_encoding: CharEncoding,
    /// Name of the dataset the property comes from, when known.
    pub dataset_name: Option<String>,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            char_encoding: CharEncoding::default(),
            dataset_name: None,
        }
    }

    pub fn with_char_encoding(mut self, char_encoding: CharEncoding) -> Self {
        self.char_encoding = char_encoding;
        self
    }

    pub fn with_dataset_name(mut self, dataset_name: impl Into<String>) -> Self {
        self.dataset_name = Some(dataset_name.into());
        self
    }
}

/// Ordered property descriptions of a dataset.
///
/// Datasets hand their schema out behind an `Arc` so items can reference it
/// instead of copying it.
#[derive(Clone, Debug, PartialEq)]
pub struct DataSetSchema {
    name: String,
    columns: Vec<ColumnSpec>,
    index_by_name: HashMap<String, usize>,
}

impl DataSetSchema {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSpec>) -> Self {
        let index_by_name = build_index_by_name(&columns);
        Self {
            name: name.into(),
            columns,
            index_by_name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, index: usize) -> Result<&ColumnSpec> {
        self.columns
            .get(index)
            .ok_or(DataAccessError::PropertyIndexOutOfRange {
                index,
                count: self.columns.len(),
            })
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index_by_name.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub(crate) fn push(&mut self, column: ColumnSpec) -> Result<()> {
        if self.index_by_name.contains_key(&column.name) {
            return Err(DataAccessError::DuplicateProperty { name: column.name });
        }
        self.index_by_name
            .insert(column.name.clone(), self.columns.len());
        self.columns.push(column);
        Ok(())
    }

    pub(crate) fn remove(&mut self, index: usize) -> Result<ColumnSpec> {
        self.column(index)?;
        let removed = self.columns.remove(index);
        self.index_by_name = build_index_by_name(&self.columns);
        Ok(removed)
    }

    pub(crate) fn replace(&mut self, index: usize, column: ColumnSpec) -> Result<()> {
        if let Some(existing) = self.position(&column.name)
            && existing != index
        {
            return Err(DataAccessError::DuplicateProperty { name: column.name });
        }
        self.column(index)?;
        self.columns[index] = column;
        self.index_by_name = build_index_by_name(&self.columns);
        Ok(())
    }

    /// Keeps only the given properties, in the given order.
    pub fn select(&self, positions: &[usize]) -> Result<DataSetSchema> {
        let columns = positions
            .iter()
            .map(|&i| self.column(i).cloned())
            .collect::<Result<Vec<_>>>()?;
        Ok(DataSetSchema::new(self.name.clone(), columns))
    }
}

// The first occurrence of a name wins, so lookups stay stable if a caller
// builds a schema with repeated names.
fn build_index_by_name(columns: &[ColumnSpec]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(columns.len());
    for (i, column) in columns.iter().enumerate() {
        index.entry(column.name.clone()).or_insert(i);
    }
    index
}
