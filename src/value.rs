use std::fmt;

use crate::datetime::DateTime;
use crate::error::{DataAccessError, Result};
use crate::geometry::Geometry;
use crate::raster::Raster;
use crate::types::DataType;

/// A single property value. `Null` plus one variant per [`DataType`].
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Char(i8),
    UChar(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Boolean(bool),
    Float(f32),
    Double(f64),
    Numeric(String),
    String(String),
    ByteArray(Vec<u8>),
    Geometry(Geometry),
    Raster(Box<Raster>),
    DateTime(DateTime),
}

impl Value {
    /// The type of the value, or `None` for `Null`.
    pub fn data_type(&self) -> Option<DataType> {
        let ty = match self {
            Value::Null => return None,
            Value::Char(_) => DataType::Char,
            Value::UChar(_) => DataType::UChar,
            Value::Int16(_) => DataType::Int16,
            Value::UInt16(_) => DataType::UInt16,
            Value::Int32(_) => DataType::Int32,
            Value::UInt32(_) => DataType::UInt32,
            Value::Int64(_) => DataType::Int64,
            Value::UInt64(_) => DataType::UInt64,
            Value::Boolean(_) => DataType::Boolean,
            Value::Float(_) => DataType::Float,
            Value::Double(_) => DataType::Double,
            Value::Numeric(_) => DataType::Numeric,
            Value::String(_) => DataType::String,
            Value::ByteArray(_) => DataType::ByteArray,
            Value::Geometry(_) => DataType::Geometry,
            Value::Raster(_) => DataType::Raster,
            Value::DateTime(_) => DataType::DateTime,
        };
        Some(ty)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub(crate) fn type_name(&self) -> &'static str {
        self.data_type().map_or("null", DataType::name)
    }

    /// Checks that the value can be stored in a property of type `expected`.
    pub(crate) fn check_type(&self, expected: DataType) -> Result<()> {
        match self.data_type() {
            None => Ok(()),
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => Err(DataAccessError::ValueTypeMismatch {
                expected: expected.name(),
                actual: actual.name(),
            }),
        }
    }

    /// Widens any integer variant to `i128` for range-checked casts.
    pub(crate) fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Char(v) => Some(*v as i128),
            Value::UChar(v) => Some(*v as i128),
            Value::Int16(v) => Some(*v as i128),
            Value::UInt16(v) => Some(*v as i128),
            Value::Int32(v) => Some(*v as i128),
            Value::UInt32(v) => Some(*v as i128),
            Value::Int64(v) => Some(*v as i128),
            Value::UInt64(v) => Some(*v as i128),
            _ => None,
        }
    }

    pub(crate) fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            other => other.as_i128().map(|v| v as f64),
        }
    }
}

/// The "get as string" rendering. `Null` renders as an empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Char(v) => write!(f, "{v}"),
            Value::UChar(v) => write!(f, "{v}"),
            Value::Int16(v) => write!(f, "{v}"),
            Value::UInt16(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::UInt32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::UInt64(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{}", if *v { "TRUE" } else { "FALSE" }),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Numeric(v) | Value::String(v) => f.write_str(v),
            Value::ByteArray(bytes) => {
                for byte in bytes {
                    write!(f, "{byte:02X}")?;
                }
                Ok(())
            }
            Value::Geometry(g) => write!(f, "{g}"),
            Value::Raster(r) => write!(f, "{r}"),
            Value::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

macro_rules! value_conversions {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }

            impl TryFrom<Value> for $ty {
                type Error = DataAccessError;

                fn try_from(value: Value) -> Result<Self> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(DataAccessError::ValueTypeMismatch {
                            expected: DataType::$variant.name(),
                            actual: other.type_name(),
                        }),
                    }
                }
            }
        )*
    };
}

value_conversions! {
    Char => i8,
    UChar => u8,
    Int16 => i16,
    UInt16 => u16,
    Int32 => i32,
    UInt32 => u32,
    Int64 => i64,
    UInt64 => u64,
    Boolean => bool,
    Float => f32,
    Double => f64,
    String => String,
    ByteArray => Vec<u8>,
    Geometry => Geometry,
    DateTime => DateTime,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Raster> for Value {
    fn from(value: Raster) -> Self {
        Value::Raster(Box::new(value))
    }
}

impl TryFrom<Value> for Raster {
    type Error = DataAccessError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Raster(r) => Ok(*r),
            other => Err(DataAccessError::ValueTypeMismatch {
                expected: DataType::Raster.name(),
                actual: other.type_name(),
            }),
        }
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_of_each_variant() -> Result<()> {
        assert_eq!(Value::Null.data_type(), None);
        assert_eq!(Value::from(1i8).data_type(), Some(DataType::Char));
        assert_eq!(Value::from(1u64).data_type(), Some(DataType::UInt64));
        assert_eq!(Value::from("a").data_type(), Some(DataType::String));
        assert_eq!(
            Value::Numeric("1.50".into()).data_type(),
            Some(DataType::Numeric)
        );
        assert_eq!(
            Value::from(Geometry::point(0.0, 0.0, None)?).data_type(),
            Some(DataType::Geometry)
        );
        assert_eq!(
            Value::from(Raster::new(1, 1, 1, 0.0)).data_type(),
            Some(DataType::Raster)
        );
        Ok(())
    }

    #[test]
    fn try_from_is_strict() {
        assert_eq!(i32::try_from(Value::Int32(7)).ok(), Some(7));
        let err = i32::try_from(Value::Int64(7)).expect_err("int64 is not int32");
        assert!(matches!(
            err,
            DataAccessError::ValueTypeMismatch {
                expected: "int32",
                actual: "int64"
            }
        ));
        let err = String::try_from(Value::Null).expect_err("null is not a string");
        assert!(matches!(
            err,
            DataAccessError::ValueTypeMismatch { actual: "null", .. }
        ));
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(2.5f64)), Value::Double(2.5));
    }

    #[test]
    fn display_renders_text() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Boolean(true).to_string(), "TRUE");
        assert_eq!(Value::Double(1.25).to_string(), "1.25");
        assert_eq!(Value::ByteArray(vec![0xde, 0xad]).to_string(), "DEAD");
        assert_eq!(Value::Numeric("10.000".into()).to_string(), "10.000");
    }

    #[test]
    fn check_type_accepts_null() {
        assert!(Value::Null.check_type(DataType::Geometry).is_ok());
        assert!(Value::Int16(1).check_type(DataType::Int16).is_ok());
        assert!(matches!(
            Value::Int16(1).check_type(DataType::Int32),
            Err(DataAccessError::ValueTypeMismatch { .. })
        ));
    }
}
