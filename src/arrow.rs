//! Conversion of datasets into Arrow `RecordBatch`es.
//!
//! Available behind the `arrow` feature.
//!
//! ```
//! use terra_dataaccess::{ColumnSpec, DataSetSchema, DataType, MemoryDataSet, Value};
//! use terra_dataaccess::arrow::record_batch_from_dataset;
//!
//! let schema = DataSetSchema::new("t", vec![ColumnSpec::new("n", DataType::Int32)]);
//! let mut ds = MemoryDataSet::new(schema);
//! ds.add_values(vec![Value::Int32(1)])?;
//! ds.add_values(vec![Value::Null])?;
//!
//! let batch = record_batch_from_dataset(&mut ds)?;
//! assert_eq!(batch.num_rows(), 2);
//! # Ok::<(), terra_dataaccess::DataAccessError>(())
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use arrow_array::builder::{
    ArrayBuilder, BinaryBuilder, BooleanBuilder, Float32Builder, Float64Builder, Int8Builder,
    Int16Builder, Int32Builder, Int64Builder, StringBuilder, UInt8Builder, UInt16Builder,
    UInt32Builder, UInt64Builder,
};
use arrow_array::{ArrayRef, RecordBatch};
use arrow_schema::{Field, Schema};
use tracing::debug;

use crate::dataset::{DataSet, Record, visit_remaining};
use crate::error::{DataAccessError, Result};
use crate::types::{ColumnSpec, DataType};
use crate::value::Value;

pub const EXTENSION_NAME_KEY: &str = "ARROW:extension:name";
pub const EXTENSION_METADATA_KEY: &str = "ARROW:extension:metadata";
pub const GEOARROW_WKB: &str = "geoarrow.wkb";

fn arrow_type(column: &ColumnSpec) -> Result<arrow_schema::DataType> {
    let ty = match column.data_type {
        DataType::Char => arrow_schema::DataType::Int8,
        DataType::UChar => arrow_schema::DataType::UInt8,
        DataType::Int16 => arrow_schema::DataType::Int16,
        DataType::UInt16 => arrow_schema::DataType::UInt16,
        DataType::Int32 => arrow_schema::DataType::Int32,
        DataType::UInt32 => arrow_schema::DataType::UInt32,
        DataType::Int64 => arrow_schema::DataType::Int64,
        DataType::UInt64 => arrow_schema::DataType::UInt64,
        DataType::Boolean => arrow_schema::DataType::Boolean,
        DataType::Float => arrow_schema::DataType::Float32,
        DataType::Double => arrow_schema::DataType::Float64,
        DataType::Numeric | DataType::String | DataType::DateTime => arrow_schema::DataType::Utf8,
        DataType::ByteArray | DataType::Geometry => arrow_schema::DataType::Binary,
        DataType::Raster => {
            return Err(DataAccessError::UnsupportedDataType {
                data_type: DataType::Raster,
                context: "arrow column",
            });
        }
    };
    Ok(ty)
}

fn arrow_field(column: &ColumnSpec) -> Result<Field> {
    let field = Field::new(&column.name, arrow_type(column)?, true);
    if column.data_type != DataType::Geometry {
        return Ok(field);
    }
    let metadata = HashMap::from([
        (EXTENSION_NAME_KEY.to_string(), GEOARROW_WKB.to_string()),
        (EXTENSION_METADATA_KEY.to_string(), "{}".to_string()),
    ]);
    Ok(field.with_metadata(metadata))
}

enum ColumnBuilder {
    Int8(Int8Builder),
    UInt8(UInt8Builder),
    Int16(Int16Builder),
    UInt16(UInt16Builder),
    Int32(Int32Builder),
    UInt32(UInt32Builder),
    Int64(Int64Builder),
    UInt64(UInt64Builder),
    Boolean(BooleanBuilder),
    Float32(Float32Builder),
    Float64(Float64Builder),
    Utf8(StringBuilder),
    Binary(BinaryBuilder),
}

impl ColumnBuilder {
    fn new(data_type: DataType) -> Self {
        match data_type {
            DataType::Char => ColumnBuilder::Int8(Int8Builder::new()),
            DataType::UChar => ColumnBuilder::UInt8(UInt8Builder::new()),
            DataType::Int16 => ColumnBuilder::Int16(Int16Builder::new()),
            DataType::UInt16 => ColumnBuilder::UInt16(UInt16Builder::new()),
            DataType::Int32 => ColumnBuilder::Int32(Int32Builder::new()),
            DataType::UInt32 => ColumnBuilder::UInt32(UInt32Builder::new()),
            DataType::Int64 => ColumnBuilder::Int64(Int64Builder::new()),
            DataType::UInt64 => ColumnBuilder::UInt64(UInt64Builder::new()),
            DataType::Boolean => ColumnBuilder::Boolean(BooleanBuilder::new()),
            DataType::Float => ColumnBuilder::Float32(Float32Builder::new()),
            DataType::Double => ColumnBuilder::Float64(Float64Builder::new()),
            DataType::Numeric | DataType::String | DataType::DateTime => {
                ColumnBuilder::Utf8(StringBuilder::new())
            }
            // Raster is rejected while building the schema.
            DataType::ByteArray | DataType::Geometry | DataType::Raster => {
                ColumnBuilder::Binary(BinaryBuilder::new())
            }
        }
    }

    fn push(&mut self, value: Value) -> Result<()> {
        match (self, value) {
            (ColumnBuilder::Int8(b), Value::Null) => b.append_null(),
            (ColumnBuilder::UInt8(b), Value::Null) => b.append_null(),
            (ColumnBuilder::Int16(b), Value::Null) => b.append_null(),
            (ColumnBuilder::UInt16(b), Value::Null) => b.append_null(),
            (ColumnBuilder::Int32(b), Value::Null) => b.append_null(),
            (ColumnBuilder::UInt32(b), Value::Null) => b.append_null(),
            (ColumnBuilder::Int64(b), Value::Null) => b.append_null(),
            (ColumnBuilder::UInt64(b), Value::Null) => b.append_null(),
            (ColumnBuilder::Boolean(b), Value::Null) => b.append_null(),
            (ColumnBuilder::Float32(b), Value::Null) => b.append_null(),
            (ColumnBuilder::Float64(b), Value::Null) => b.append_null(),
            (ColumnBuilder::Utf8(b), Value::Null) => b.append_null(),
            (ColumnBuilder::Binary(b), Value::Null) => b.append_null(),

            (ColumnBuilder::Int8(b), Value::Char(v)) => b.append_value(v),
            (ColumnBuilder::UInt8(b), Value::UChar(v)) => b.append_value(v),
            (ColumnBuilder::Int16(b), Value::Int16(v)) => b.append_value(v),
            (ColumnBuilder::UInt16(b), Value::UInt16(v)) => b.append_value(v),
            (ColumnBuilder::Int32(b), Value::Int32(v)) => b.append_value(v),
            (ColumnBuilder::UInt32(b), Value::UInt32(v)) => b.append_value(v),
            (ColumnBuilder::Int64(b), Value::Int64(v)) => b.append_value(v),
            (ColumnBuilder::UInt64(b), Value::UInt64(v)) => b.append_value(v),
            (ColumnBuilder::Boolean(b), Value::Boolean(v)) => b.append_value(v),
            (ColumnBuilder::Float32(b), Value::Float(v)) => b.append_value(v),
            (ColumnBuilder::Float64(b), Value::Double(v)) => b.append_value(v),
            (ColumnBuilder::Utf8(b), Value::Numeric(v) | Value::String(v)) => b.append_value(v),
            (ColumnBuilder::Utf8(b), Value::DateTime(v)) => b.append_value(v.to_string()),
            (ColumnBuilder::Binary(b), Value::ByteArray(v)) => b.append_value(v),
            (ColumnBuilder::Binary(b), Value::Geometry(g)) => b.append_value(g.as_wkb_bytes()),

            (builder, other) => {
                return Err(DataAccessError::ValueTypeMismatch {
                    expected: builder.type_name(),
                    actual: other.type_name(),
                });
            }
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        match self {
            ColumnBuilder::Int8(_) => "int8",
            ColumnBuilder::UInt8(_) => "uint8",
            ColumnBuilder::Int16(_) => "int16",
            ColumnBuilder::UInt16(_) => "uint16",
            ColumnBuilder::Int32(_) => "int32",
            ColumnBuilder::UInt32(_) => "uint32",
            ColumnBuilder::Int64(_) => "int64",
            ColumnBuilder::UInt64(_) => "uint64",
            ColumnBuilder::Boolean(_) => "boolean",
            ColumnBuilder::Float32(_) => "float32",
            ColumnBuilder::Float64(_) => "float64",
            ColumnBuilder::Utf8(_) => "utf8",
            ColumnBuilder::Binary(_) => "binary",
        }
    }

    fn finish(self) -> ArrayRef {
        match self {
            ColumnBuilder::Int8(mut b) => ArrayBuilder::finish(&mut b),
            ColumnBuilder::UInt8(mut b) => ArrayBuilder::finish(&mut b),
            ColumnBuilder::Int16(mut b) => ArrayBuilder::finish(&mut b),
            ColumnBuilder::UInt16(mut b) => ArrayBuilder::finish(&mut b),
            ColumnBuilder::Int32(mut b) => ArrayBuilder::finish(&mut b),
            ColumnBuilder::UInt32(mut b) => ArrayBuilder::finish(&mut b),
            ColumnBuilder::Int64(mut b) => ArrayBuilder::finish(&mut b),
            ColumnBuilder::UInt64(mut b) => ArrayBuilder::finish(&mut b),
            ColumnBuilder::Boolean(mut b) => ArrayBuilder::finish(&mut b),
            ColumnBuilder::Float32(mut b) => ArrayBuilder::finish(&mut b),
            ColumnBuilder::Float64(mut b) => ArrayBuilder::finish(&mut b),
            ColumnBuilder::Utf8(mut b) => ArrayBuilder::finish(&mut b),
            ColumnBuilder::Binary(mut b) => ArrayBuilder::finish(&mut b),
        }
    }
}

/// Arrow schema for a dataset schema. Geometry fields carry the
/// `geoarrow.wkb` extension name.
pub fn to_arrow_schema(schema: &crate::types::DataSetSchema) -> Result<Schema> {
    let fields = schema
        .columns()
        .iter()
        .map(arrow_field)
        .collect::<Result<Vec<_>>>()?;
    Ok(Schema::new(fields))
}

/// Drains `src` from its current position into a single `RecordBatch`.
pub fn record_batch_from_dataset(src: &mut dyn DataSet) -> Result<RecordBatch> {
    let schema = Arc::new(to_arrow_schema(src.schema())?);
    let mut builders: Vec<ColumnBuilder> = src
        .schema()
        .columns()
        .iter()
        .map(|c| ColumnBuilder::new(c.data_type))
        .collect();

    let rows = visit_remaining(src, 0, |item| {
        for (i, builder) in builders.iter_mut().enumerate() {
            builder.push(item.value(i)?)?;
        }
        Ok(())
    })?;
    debug!(rows, columns = builders.len(), "built record batch");

    let columns = builders.into_iter().map(ColumnBuilder::finish).collect();
    Ok(RecordBatch::try_new(schema, columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::memory::MemoryDataSet;
    use crate::raster::Raster;
    use crate::types::DataSetSchema;
    use arrow_array::{Array, BinaryArray, Int16Array, StringArray};

    #[test]
    fn converts_columns_and_nulls() -> Result<()> {
        let schema = DataSetSchema::new(
            "t",
            vec![
                ColumnSpec::new("code", DataType::Int16),
                ColumnSpec::new("name", DataType::String),
                ColumnSpec::new("geom", DataType::Geometry),
            ],
        );
        let mut ds = MemoryDataSet::new(schema);
        let point = Geometry::point(1.0, 2.0, None)?;
        ds.add_values(vec![Value::Int16(7), "a".into(), point.clone().into()])?;
        ds.add_values(vec![Value::Null, Value::Null, Value::Null])?;

        let batch = record_batch_from_dataset(&mut ds)?;
        assert_eq!(batch.num_rows(), 2);
        assert!(ds.is_after_end());

        let codes = batch
            .column(0)
            .as_any()
            .downcast_ref::<Int16Array>()
            .expect("int16");
        assert_eq!(codes.value(0), 7);
        assert!(codes.is_null(1));

        let names = batch
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .expect("utf8");
        assert_eq!(names.value(0), "a");

        let geoms = batch
            .column(2)
            .as_any()
            .downcast_ref::<BinaryArray>()
            .expect("binary");
        assert_eq!(geoms.value(0), point.as_wkb_bytes());

        let field = batch.schema().field(2).clone();
        assert_eq!(
            field.metadata().get(EXTENSION_NAME_KEY).map(String::as_str),
            Some(GEOARROW_WKB)
        );
        Ok(())
    }

    #[test]
    fn raster_columns_are_unsupported() -> Result<()> {
        let schema = DataSetSchema::new("t", vec![ColumnSpec::new("r", DataType::Raster)]);
        let mut ds = MemoryDataSet::new(schema);
        ds.add_values(vec![Raster::new(1, 1, 1, 0.0).into()])?;
        assert!(matches!(
            record_batch_from_dataset(&mut ds),
            Err(DataAccessError::UnsupportedDataType { data_type: DataType::Raster, .. })
        ));
        Ok(())
    }
}
