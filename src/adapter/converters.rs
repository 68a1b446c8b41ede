//! Built-in attribute converters.
//!
//! An [`AttributeConverter`] computes one destination value from the source
//! dataset's current item. It receives the source, the source property
//! indexes registered for the destination property, and the destination type.

use std::sync::Arc;

use crate::convert::DataConverterRegistry;
use crate::dataset::DataSet;
use crate::error::{DataAccessError, Result};
use crate::geometry::Geometry;
use crate::types::DataType;
use crate::value::Value;

pub type AttributeConverter =
    Arc<dyn Fn(&dyn DataSet, &[usize], DataType) -> Result<Value> + Send + Sync>;

fn first_index(indexes: &[usize]) -> Result<usize> {
    indexes
        .first()
        .copied()
        .ok_or(DataAccessError::InvalidPropertyCount {
            expected: 1,
            got: 0,
        })
}

/// Passes the first source value through unchanged.
pub fn identity() -> AttributeConverter {
    Arc::new(|src: &dyn DataSet, indexes: &[usize], _: DataType| {
        src.value(first_index(indexes)?)
    })
}

/// Casts the first source value to the destination type through `registry`.
pub fn generic(registry: Arc<DataConverterRegistry>) -> AttributeConverter {
    Arc::new(move |src: &dyn DataSet, indexes: &[usize], to: DataType| {
        let value = src.value(first_index(indexes)?)?;
        registry.convert(&value, to)
    })
}

fn coordinate(value: &Value) -> Result<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        Value::Numeric(text) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| DataAccessError::ValueParse {
                value: text.clone(),
                target: DataType::Double.name(),
            }),
        other => other
            .as_f64()
            .map(Some)
            .ok_or(DataAccessError::ValueTypeMismatch {
                expected: "number",
                actual: other.type_name(),
            }),
    }
}

/// Builds a point from two numeric source properties, x first.
/// A null coordinate gives a null point.
pub fn xy_to_point(srid: Option<i32>) -> AttributeConverter {
    Arc::new(move |src: &dyn DataSet, indexes: &[usize], _: DataType| {
        let [x, y] = indexes else {
            return Err(DataAccessError::InvalidPropertyCount {
                expected: 2,
                got: indexes.len(),
            });
        };
        let x = coordinate(&src.value(*x)?)?;
        let y = coordinate(&src.value(*y)?)?;
        match (x, y) {
            (Some(x), Some(y)) => Ok(Value::Geometry(Geometry::point(x, y, srid)?)),
            _ => Ok(Value::Null),
        }
    })
}

fn point_component(pick: fn((f64, f64)) -> f64) -> AttributeConverter {
    Arc::new(move |src: &dyn DataSet, indexes: &[usize], _: DataType| {
        match src.value(first_index(indexes)?)? {
            Value::Null => Ok(Value::Null),
            Value::Geometry(geom) => Ok(geom.point_xy()?.map(pick).into()),
            other => Err(DataAccessError::ValueTypeMismatch {
                expected: DataType::Geometry.name(),
                actual: other.type_name(),
            }),
        }
    })
}

/// X coordinate of a point geometry as a double.
pub fn point_to_x() -> AttributeConverter {
    point_component(|(x, _)| x)
}

/// Y coordinate of a point geometry as a double.
pub fn point_to_y() -> AttributeConverter {
    point_component(|(_, y)| y)
}

/// Joins the text rendering of several source properties.
pub fn tuple_to_string(separator: impl Into<String>) -> AttributeConverter {
    let separator = separator.into();
    Arc::new(move |src: &dyn DataSet, indexes: &[usize], _: DataType| {
        let parts = indexes
            .iter()
            .map(|&i| Ok(src.value(i)?.to_string()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::String(parts.join(&separator)))
    })
}
