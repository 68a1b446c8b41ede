//! Datasets whose properties are computed from another dataset.
//!
//! A [`DataSetAdapter`] owns a source dataset and a list of destination
//! properties. Each destination property names the source properties it is
//! computed from and an [`AttributeConverter`] that computes it. Conversion
//! is lazy: the converter runs against the source's current item every time
//! the destination value is read, and nothing is cached.
//!
//! ```
//! use terra_dataaccess::adapter::{DataSetAdapter, converters};
//! use terra_dataaccess::{ColumnSpec, DataSet, DataSetSchema, DataType, MemoryDataSet, RecordExt, Value};
//!
//! let schema = DataSetSchema::new(
//!     "stations",
//!     vec![
//!         ColumnSpec::new("x", DataType::Double),
//!         ColumnSpec::new("y", DataType::Double),
//!     ],
//! );
//! let mut stations = MemoryDataSet::new(schema);
//! stations.add_values(vec![Value::Double(139.7), Value::Double(35.6)])?;
//!
//! let mut adapter = DataSetAdapter::new(stations);
//! adapter.add(
//!     ColumnSpec::new("location", DataType::Geometry),
//!     vec![0, 1],
//!     converters::xy_to_point(Some(4326)),
//! )?;
//!
//! adapter.move_first();
//! let location = adapter.get_geometry("location")?;
//! assert_eq!(location.point_xy()?, Some((139.7, 35.6)));
//! # Ok::<(), terra_dataaccess::DataAccessError>(())
//! ```

pub mod converters;
mod type_converter;

use std::fmt;

use crate::dataset::{DataSet, Record};
use crate::error::{DataAccessError, Result};
use crate::types::{AccessPolicy, ColumnSpec, DataSetSchema, TraverseType};
use crate::value::Value;

pub use converters::AttributeConverter;
pub use type_converter::DataSetTypeConverter;

struct PropertyMapping {
    source_indexes: Vec<usize>,
    converter: AttributeConverter,
}

/// A read-only dataset computing its properties from a source dataset.
pub struct DataSetAdapter<D> {
    source: D,
    schema: DataSetSchema,
    mappings: Vec<PropertyMapping>,
}

impl<D: DataSet> fmt::Debug for DataSetAdapter<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSetAdapter")
            .field("source", &self.source.schema().name())
            .field("schema", &self.schema)
            .finish()
    }
}

impl<D: DataSet> DataSetAdapter<D> {
    /// An adapter with no properties yet.
    pub fn new(source: D) -> Self {
        let schema = DataSetSchema::new(source.schema().name(), Vec::new());
        Self {
            source,
            schema,
            mappings: Vec::new(),
        }
    }

    /// Applies a validated conversion plan to `source`.
    pub fn from_type_converter(source: D, plan: &DataSetTypeConverter) -> Result<Self> {
        plan.validate()?;
        if plan.input_schema().len() != source.num_properties() {
            return Err(DataAccessError::InvalidPropertyCount {
                expected: plan.input_schema().len(),
                got: source.num_properties(),
            });
        }
        let mut adapter = Self::new(source);
        for property in plan.planned() {
            let Some(converter) = &property.converter else {
                continue;
            };
            adapter.add(
                property.spec.clone(),
                property.source_indexes.clone(),
                converter.clone(),
            )?;
        }
        Ok(adapter)
    }

    /// Passes source property `src_index` through under its own name.
    pub fn adapt(&mut self, src_index: usize) -> Result<()> {
        let name = self.source.property_name(src_index)?.to_string();
        self.adapt_as(src_index, name)
    }

    /// Passes source property `src_index` through under a new name.
    pub fn adapt_as(&mut self, src_index: usize, name: impl Into<String>) -> Result<()> {
        let mut spec = self.source.schema().column(src_index)?.clone();
        spec.name = name.into();
        if spec.dataset_name.is_none() {
            spec.dataset_name = Some(self.source.schema().name().to_string());
        }
        self.add(spec, vec![src_index], converters::identity())
    }

    /// Adds a destination property computed by `converter`.
    pub fn add(
        &mut self,
        spec: ColumnSpec,
        source_indexes: Vec<usize>,
        converter: AttributeConverter,
    ) -> Result<()> {
        let count = self.source.num_properties();
        if let Some(&index) = source_indexes.iter().find(|&&i| i >= count) {
            return Err(DataAccessError::PropertyIndexOutOfRange { index, count });
        }
        self.schema.push(spec)?;
        self.mappings.push(PropertyMapping {
            source_indexes,
            converter,
        });
        Ok(())
    }

    /// Source property indexes feeding destination property `i`.
    pub fn source_indexes(&self, i: usize) -> Result<&[usize]> {
        self.mappings
            .get(i)
            .map(|m| m.source_indexes.as_slice())
            .ok_or(DataAccessError::PropertyIndexOutOfRange {
                index: i,
                count: self.mappings.len(),
            })
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut D {
        &mut self.source
    }

    pub fn into_source(self) -> D {
        self.source
    }
}

impl<D: DataSet> Record for DataSetAdapter<D> {
    fn schema(&self) -> &DataSetSchema {
        &self.schema
    }

    fn value(&self, i: usize) -> Result<Value> {
        let data_type = self.schema.column(i)?.data_type;
        let mapping = &self.mappings[i];
        let source: &dyn DataSet = &self.source;
        let value = (mapping.converter)(source, &mapping.source_indexes, data_type)?;
        value.check_type(data_type)?;
        Ok(value)
    }
}

impl<D: DataSet> DataSet for DataSetAdapter<D> {
    fn traverse_type(&self) -> TraverseType {
        self.source.traverse_type()
    }

    fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::ReadOnly
    }

    fn size(&self) -> Option<usize> {
        self.source.size()
    }

    fn is_connected(&self) -> bool {
        self.source.is_connected()
    }

    fn move_next(&mut self) -> bool {
        self.source.move_next()
    }

    fn move_previous(&mut self) -> bool {
        self.source.move_previous()
    }

    fn move_before_first(&mut self) -> bool {
        self.source.move_before_first()
    }

    fn move_first(&mut self) -> bool {
        self.source.move_first()
    }

    fn move_last(&mut self) -> bool {
        self.source.move_last()
    }

    fn move_to(&mut self, i: usize) -> bool {
        self.source.move_to(i)
    }

    fn is_at_begin(&self) -> bool {
        self.source.is_at_begin()
    }

    fn is_before_begin(&self) -> bool {
        self.source.is_before_begin()
    }

    fn is_at_end(&self) -> bool {
        self.source.is_at_end()
    }

    fn is_after_end(&self) -> bool {
        self.source.is_after_end()
    }
}
