//! The cursor-based dataset abstraction.
//!
//! A [`Record`] is anything exposing typed property values through a schema:
//! a dataset positioned on an item, or a standalone [`DataSetItem`].
//! [`DataSet`] adds cursor movement and dataset-level metadata.
//! [`RecordExt`] layers the typed getters and setters on top of both, addressed
//! by property index or by name.
//!
//! [`DataSetItem`]: crate::DataSetItem

use crate::datetime::DateTime;
use crate::error::{DataAccessError, Result};
use crate::geometry::{Envelope, Geometry, merge_envelope};
use crate::raster::Raster;
use crate::types::{AccessPolicy, CharEncoding, DataSetSchema, DataType, TraverseType};
use crate::value::Value;

/// Positional access to the property values of one record.
pub trait Record {
    fn schema(&self) -> &DataSetSchema;

    /// Returns the value of property `i` as an owned value.
    fn value(&self, i: usize) -> Result<Value>;

    /// Replaces the value of property `i`. Read-only records refuse.
    fn set_value(&mut self, i: usize, value: Value) -> Result<()> {
        let _ = (i, value);
        Err(DataAccessError::ReadOnly)
    }

    fn num_properties(&self) -> usize {
        self.schema().len()
    }

    fn property_name(&self, i: usize) -> Result<&str> {
        Ok(self.schema().column(i)?.name.as_str())
    }

    fn property_data_type(&self, i: usize) -> Result<DataType> {
        Ok(self.schema().column(i)?.data_type)
    }

    fn property_char_encoding(&self, i: usize) -> Result<CharEncoding> {
        Ok(self.schema().column(i)?.char_encoding)
    }

    fn property_position(&self, name: &str) -> Option<usize> {
        self.schema().position(name)
    }

    fn is_null(&self, i: usize) -> Result<bool> {
        Ok(self.value(i)?.is_null())
    }
}

/// A table-like collection of typed records traversed through one cursor.
///
/// Property access through [`Record`] reads the item under the cursor and
/// fails with [`DataAccessError::InvalidCursorPosition`] when the cursor is
/// before the first or after the last item.
pub trait DataSet: Record {
    fn traverse_type(&self) -> TraverseType;

    fn access_policy(&self) -> AccessPolicy;

    fn dataset_name_of_property(&self, i: usize) -> Result<String> {
        let column = self.schema().column(i)?;
        Ok(column
            .dataset_name
            .clone()
            .unwrap_or_else(|| self.schema().name().to_string()))
    }

    /// Number of items, or `None` when the dataset cannot tell without a scan.
    fn size(&self) -> Option<usize>;

    fn is_empty(&self) -> bool {
        self.size() == Some(0)
    }

    /// Whether the dataset keeps a live connection to its data source.
    fn is_connected(&self) -> bool {
        false
    }

    /// Union of the envelopes of every non-null geometry in property `i`.
    ///
    /// The default implementation scans with the cursor and leaves it before
    /// the first item.
    fn extent(&mut self, i: usize) -> Result<Option<Envelope>> {
        ensure_geometry_property(self.schema(), i)?;
        self.move_before_first();
        let mut envelope = None;
        while self.move_next() {
            if let Value::Geometry(geom) = self.value(i)?
                && let Some(e) = geom.envelope()?
            {
                merge_envelope(&mut envelope, e);
            }
        }
        self.move_before_first();
        Ok(envelope)
    }

    fn move_next(&mut self) -> bool;

    fn move_previous(&mut self) -> bool;

    fn move_before_first(&mut self) -> bool;

    fn move_first(&mut self) -> bool;

    fn move_last(&mut self) -> bool;

    /// Moves the cursor to the item at index `i`.
    fn move_to(&mut self, i: usize) -> bool;

    fn is_at_begin(&self) -> bool;

    fn is_before_begin(&self) -> bool;

    fn is_at_end(&self) -> bool;

    fn is_after_end(&self) -> bool;
}

/// Visits the item under the cursor and every item after it.
///
/// A cursor before the first item starts at the first one. A non-zero `limit`
/// caps the number of visited items. On return the cursor rests on the first
/// item that was not visited, or after the last item, so consecutive calls
/// pick up where the previous one stopped.
pub(crate) fn visit_remaining<D, F>(src: &mut D, limit: usize, mut visit: F) -> Result<usize>
where
    D: DataSet + ?Sized,
    F: FnMut(&D) -> Result<()>,
{
    if src.is_before_begin() && !src.move_next() {
        return Ok(0);
    }
    if src.is_after_end() {
        return Ok(0);
    }
    let mut visited = 0;
    loop {
        visit(src)?;
        visited += 1;
        if !src.move_next() || visited == limit {
            break;
        }
    }
    Ok(visited)
}

pub(crate) fn ensure_geometry_property(schema: &DataSetSchema, i: usize) -> Result<()> {
    let column = schema.column(i)?;
    if column.data_type != DataType::Geometry {
        return Err(DataAccessError::ValueTypeMismatch {
            expected: DataType::Geometry.name(),
            actual: column.data_type.name(),
        });
    }
    Ok(())
}

/// Addresses a property either by index or by name.
pub trait PropertyKey {
    fn resolve(&self, schema: &DataSetSchema) -> Result<usize>;
}

impl PropertyKey for usize {
    fn resolve(&self, schema: &DataSetSchema) -> Result<usize> {
        if *self < schema.len() {
            Ok(*self)
        } else {
            Err(DataAccessError::PropertyIndexOutOfRange {
                index: *self,
                count: schema.len(),
            })
        }
    }
}

impl PropertyKey for &str {
    fn resolve(&self, schema: &DataSetSchema) -> Result<usize> {
        schema
            .position(self)
            .ok_or_else(|| DataAccessError::UnknownProperty {
                name: self.to_string(),
            })
    }
}

impl PropertyKey for String {
    fn resolve(&self, schema: &DataSetSchema) -> Result<usize> {
        self.as_str().resolve(schema)
    }
}

impl PropertyKey for &String {
    fn resolve(&self, schema: &DataSetSchema) -> Result<usize> {
        self.as_str().resolve(schema)
    }
}

macro_rules! typed_accessors {
    ($($get:ident, $set:ident => $ty:ty;)*) => {
        $(
            fn $get<K: PropertyKey>(&self, key: K) -> Result<$ty> {
                self.get(key)
            }

            fn $set<K: PropertyKey>(&mut self, key: K, value: $ty) -> Result<()> {
                self.set(key, value)
            }
        )*
    };
}

/// Typed getters and setters for every [`Record`], including `dyn DataSet`.
///
/// Typed getters fail with [`DataAccessError::NullValue`] on nulls and with
/// [`DataAccessError::ValueTypeMismatch`] when the stored variant differs.
/// Setters accept a value only if it matches the declared property type.
pub trait RecordExt: Record {
    fn get_value<K: PropertyKey>(&self, key: K) -> Result<Value> {
        let i = key.resolve(self.schema())?;
        self.value(i)
    }

    fn get<T, K>(&self, key: K) -> Result<T>
    where
        T: TryFrom<Value, Error = DataAccessError>,
        K: PropertyKey,
    {
        let i = key.resolve(self.schema())?;
        match self.value(i)? {
            Value::Null => Err(DataAccessError::NullValue {
                property: self.property_name(i)?.to_string(),
            }),
            value => T::try_from(value),
        }
    }

    /// Text rendering of any property value. Nulls render as an empty string.
    fn get_as_string<K: PropertyKey>(&self, key: K) -> Result<String> {
        Ok(self.get_value(key)?.to_string())
    }

    fn get_numeric<K: PropertyKey>(&self, key: K) -> Result<String> {
        let i = key.resolve(self.schema())?;
        match self.value(i)? {
            Value::Numeric(v) => Ok(v),
            Value::Null => Err(DataAccessError::NullValue {
                property: self.property_name(i)?.to_string(),
            }),
            other => Err(DataAccessError::ValueTypeMismatch {
                expected: DataType::Numeric.name(),
                actual: other.type_name(),
            }),
        }
    }

    fn set_numeric<K: PropertyKey>(&mut self, key: K, value: impl Into<String>) -> Result<()> {
        self.set_value_at(key, Value::Numeric(value.into()))
    }

    fn is_null_at<K: PropertyKey>(&self, key: K) -> Result<bool> {
        let i = key.resolve(self.schema())?;
        self.is_null(i)
    }

    fn set_value_at<K: PropertyKey>(&mut self, key: K, value: Value) -> Result<()> {
        let i = key.resolve(self.schema())?;
        value.check_type(self.schema().column(i)?.data_type)?;
        self.set_value(i, value)
    }

    fn set<T, K>(&mut self, key: K, value: T) -> Result<()>
    where
        T: Into<Value>,
        K: PropertyKey,
    {
        self.set_value_at(key, value.into())
    }

    fn set_null<K: PropertyKey>(&mut self, key: K) -> Result<()> {
        self.set_value_at(key, Value::Null)
    }

    typed_accessors! {
        get_char, set_char => i8;
        get_uchar, set_uchar => u8;
        get_int16, set_int16 => i16;
        get_uint16, set_uint16 => u16;
        get_int32, set_int32 => i32;
        get_uint32, set_uint32 => u32;
        get_int64, set_int64 => i64;
        get_uint64, set_uint64 => u64;
        get_bool, set_bool => bool;
        get_float, set_float => f32;
        get_double, set_double => f64;
        get_string, set_string => String;
        get_byte_array, set_byte_array => Vec<u8>;
        get_geometry, set_geometry => Geometry;
        get_raster, set_raster => Raster;
        get_date_time, set_date_time => DateTime;
    }
}

impl<R: Record + ?Sized> RecordExt for R {}
