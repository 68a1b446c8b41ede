//! Value conversions between data types.
//!
//! [`DataConverterRegistry`] maps a `(from, to)` pair of [`DataType`]s to a
//! conversion function. It is an ordinary value: build one, optionally
//! [`register`](DataConverterRegistry::register) extra conversions, and pass it
//! to whatever needs to convert values.

use std::collections::HashMap;
use std::fmt;

use crate::error::{DataAccessError, Result};
use crate::types::DataType;
use crate::value::Value;

/// Converts a non-null value into the target type passed as second argument.
pub type DataConverter = fn(&Value, DataType) -> Result<Value>;

#[derive(Clone, Default)]
pub struct DataConverterRegistry {
    converters: HashMap<(DataType, DataType), DataConverter>,
}

impl fmt::Debug for DataConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataConverterRegistry")
            .field("converters", &self.converters.len())
            .finish()
    }
}

const INTEGER_TYPES: [DataType; 8] = [
    DataType::Char,
    DataType::UChar,
    DataType::Int16,
    DataType::UInt16,
    DataType::Int32,
    DataType::UInt32,
    DataType::Int64,
    DataType::UInt64,
];

const FLOAT_TYPES: [DataType; 2] = [DataType::Float, DataType::Double];

impl DataConverterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in conversions between primitive types.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        for int in INTEGER_TYPES {
            for to in INTEGER_TYPES {
                if int != to {
                    registry.register(int, to, number_to_integer);
                }
            }
            registry.register(int, DataType::Boolean, integer_to_boolean);
            for float in FLOAT_TYPES {
                registry.register(int, float, number_to_float);
                registry.register(float, int, number_to_integer);
            }
            registry.register(int, DataType::Numeric, to_numeric);
            registry.register(int, DataType::String, to_string);
            registry.register(DataType::Boolean, int, number_to_integer);
            registry.register(DataType::String, int, parse_text);
            registry.register(DataType::Numeric, int, parse_text);
        }

        registry.register(DataType::Float, DataType::Double, number_to_float);
        registry.register(DataType::Double, DataType::Float, number_to_float);
        for float in FLOAT_TYPES {
            registry.register(float, DataType::Numeric, to_numeric);
            registry.register(float, DataType::String, to_string);
            registry.register(DataType::String, float, parse_text);
            registry.register(DataType::Numeric, float, parse_text);
        }

        registry.register(DataType::Boolean, DataType::String, to_string);
        registry.register(DataType::String, DataType::Boolean, parse_text);
        registry.register(DataType::Numeric, DataType::Boolean, parse_text);
        registry.register(DataType::String, DataType::Numeric, to_numeric);
        registry.register(DataType::Numeric, DataType::String, to_string);
        registry.register(DataType::DateTime, DataType::String, to_string);

        registry
    }

    /// Adds a conversion, replacing any previous one for the same pair.
    pub fn register(&mut self, from: DataType, to: DataType, converter: DataConverter) {
        self.converters.insert((from, to), converter);
    }

    pub fn can_convert(&self, from: DataType, to: DataType) -> bool {
        from == to || self.converters.contains_key(&(from, to))
    }

    /// Converts `value` to `to`. `Null` stays `Null` and same-type
    /// conversions are clones.
    pub fn convert(&self, value: &Value, to: DataType) -> Result<Value> {
        let Some(from) = value.data_type() else {
            return Ok(Value::Null);
        };
        if from == to {
            return Ok(value.clone());
        }
        let converter = self
            .converters
            .get(&(from, to))
            .ok_or(DataAccessError::NoConverter { from, to })?;
        converter(value, to)
    }
}

fn integer_from_i128(value: i128, to: DataType) -> Result<Value> {
    let out_of_range = |_| DataAccessError::ValueOutOfRange { target: to.name() };
    let converted = match to {
        DataType::Char => Value::Char(i8::try_from(value).map_err(out_of_range)?),
        DataType::UChar => Value::UChar(u8::try_from(value).map_err(out_of_range)?),
        DataType::Int16 => Value::Int16(i16::try_from(value).map_err(out_of_range)?),
        DataType::UInt16 => Value::UInt16(u16::try_from(value).map_err(out_of_range)?),
        DataType::Int32 => Value::Int32(i32::try_from(value).map_err(out_of_range)?),
        DataType::UInt32 => Value::UInt32(u32::try_from(value).map_err(out_of_range)?),
        DataType::Int64 => Value::Int64(i64::try_from(value).map_err(out_of_range)?),
        DataType::UInt64 => Value::UInt64(u64::try_from(value).map_err(out_of_range)?),
        other => return Err(unsupported_target(other)),
    };
    Ok(converted)
}

fn unsupported_target(to: DataType) -> DataAccessError {
    DataAccessError::UnsupportedDataType {
        data_type: to,
        context: "value conversion",
    }
}

fn number_to_integer(value: &Value, to: DataType) -> Result<Value> {
    let wide = match value {
        Value::Boolean(b) => i128::from(*b),
        Value::Float(_) | Value::Double(_) => {
            let v = value.as_f64().unwrap_or(f64::NAN);
            if !v.is_finite() {
                return Err(DataAccessError::ValueOutOfRange { target: to.name() });
            }
            // Truncates toward zero; huge values saturate and are then rejected below.
            v.trunc() as i128
        }
        other => other
            .as_i128()
            .ok_or(DataAccessError::ValueTypeMismatch {
                expected: "integer",
                actual: other.type_name(),
            })?,
    };
    integer_from_i128(wide, to)
}

fn integer_to_boolean(value: &Value, _to: DataType) -> Result<Value> {
    let v = value.as_i128().ok_or(DataAccessError::ValueTypeMismatch {
        expected: "integer",
        actual: value.type_name(),
    })?;
    Ok(Value::Boolean(v != 0))
}

fn number_to_float(value: &Value, to: DataType) -> Result<Value> {
    let v = value.as_f64().ok_or(DataAccessError::ValueTypeMismatch {
        expected: "number",
        actual: value.type_name(),
    })?;
    match to {
        DataType::Float => Ok(Value::Float(v as f32)),
        DataType::Double => Ok(Value::Double(v)),
        other => Err(unsupported_target(other)),
    }
}

fn parse_text(value: &Value, to: DataType) -> Result<Value> {
    let text = match value {
        Value::String(text) | Value::Numeric(text) => text.trim(),
        other => {
            return Err(DataAccessError::ValueTypeMismatch {
                expected: "string",
                actual: other.type_name(),
            });
        }
    };
    let parse_error = || DataAccessError::ValueParse {
        value: text.to_string(),
        target: to.name(),
    };

    match to {
        DataType::Boolean => {
            if text.eq_ignore_ascii_case("true") || text == "1" {
                Ok(Value::Boolean(true))
            } else if text.eq_ignore_ascii_case("false") || text == "0" {
                Ok(Value::Boolean(false))
            } else {
                Err(parse_error())
            }
        }
        DataType::Float | DataType::Double => {
            let v: f64 = text.parse().map_err(|_| parse_error())?;
            number_to_float(&Value::Double(v), to)
        }
        int if int.is_integer() => match text.parse::<i128>() {
            Ok(v) => integer_from_i128(v, int),
            // Numeric text such as "12.0" still converts, truncating like a float would.
            Err(_) => {
                let v: f64 = text.parse().map_err(|_| parse_error())?;
                number_to_integer(&Value::Double(v), int)
            }
        },
        other => Err(unsupported_target(other)),
    }
}

fn to_numeric(value: &Value, _to: DataType) -> Result<Value> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            trimmed
                .parse::<f64>()
                .map_err(|_| DataAccessError::ValueParse {
                    value: text.clone(),
                    target: DataType::Numeric.name(),
                })?;
            Ok(Value::Numeric(trimmed.to_string()))
        }
        other => Ok(Value::Numeric(other.to_string())),
    }
}

fn to_string(value: &Value, _to: DataType) -> Result<Value> {
    Ok(Value::String(value.to_string()))
}
