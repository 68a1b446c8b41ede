use std::sync::Arc;

use crate::dataset::Record;
use crate::error::{DataAccessError, Result};
use crate::types::DataSetSchema;
use crate::value::Value;

/// A single record detached from any cursor.
///
/// Items handed out by a dataset share its schema by reference. Call
/// [`DataSetItem::detach`] to give an item its own copy.
#[derive(Clone, Debug, PartialEq)]
pub struct DataSetItem {
    schema: Arc<DataSetSchema>,
    values: Vec<Value>,
}

impl DataSetItem {
    /// Creates an item with every property set to null.
    pub fn new(schema: Arc<DataSetSchema>) -> Self {
        let values = vec![Value::Null; schema.len()];
        Self { schema, values }
    }

    pub fn from_values(schema: Arc<DataSetSchema>, values: Vec<Value>) -> Result<Self> {
        validate_values(&schema, &values)?;
        Ok(Self { schema, values })
    }

    pub fn schema_ref(&self) -> &Arc<DataSetSchema> {
        &self.schema
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Replaces the shared schema with an independent copy.
    pub fn detach(&mut self) {
        self.schema = Arc::new(DataSetSchema::clone(&self.schema));
    }

    pub fn detached(mut self) -> Self {
        self.detach();
        self
    }

    pub fn shares_schema_with(&self, schema: &Arc<DataSetSchema>) -> bool {
        Arc::ptr_eq(&self.schema, schema)
    }
}

impl Record for DataSetItem {
    fn schema(&self) -> &DataSetSchema {
        &self.schema
    }

    fn value(&self, i: usize) -> Result<Value> {
        self.values
            .get(i)
            .cloned()
            .ok_or(DataAccessError::PropertyIndexOutOfRange {
                index: i,
                count: self.values.len(),
            })
    }

    fn set_value(&mut self, i: usize, value: Value) -> Result<()> {
        value.check_type(self.schema.column(i)?.data_type)?;
        self.values[i] = value;
        Ok(())
    }
}

pub(crate) fn validate_values(schema: &DataSetSchema, values: &[Value]) -> Result<()> {
    if values.len() != schema.len() {
        return Err(DataAccessError::InvalidPropertyCount {
            expected: schema.len(),
            got: values.len(),
        });
    }
    for (value, column) in values.iter().zip(schema.columns()) {
        value.check_type(column.data_type)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RecordExt;
    use crate::types::{ColumnSpec, DataType};

    fn schema() -> Arc<DataSetSchema> {
        Arc::new(DataSetSchema::new(
            "people",
            vec![
                ColumnSpec::new("name", DataType::String),
                ColumnSpec::new("age", DataType::Int16),
            ],
        ))
    }

    #[test]
    fn new_item_is_all_null() -> Result<()> {
        let item = DataSetItem::new(schema());
        assert!(item.is_null_at("name")?);
        assert!(item.is_null_at(1)?);
        assert!(matches!(
            item.get_int16("age"),
            Err(DataAccessError::NullValue { .. })
        ));
        Ok(())
    }

    #[test]
    fn typed_set_and_get_by_name_and_index() -> Result<()> {
        let mut item = DataSetItem::new(schema());
        item.set_string("name", "Ada".to_string())?;
        item.set_int16(1, 36)?;
        assert_eq!(item.get_string(0)?, "Ada");
        assert_eq!(item.get_int16("age")?, 36);
        assert_eq!(item.get_as_string("age")?, "36");

        let err = item.set_int32("age", 36).expect_err("wrong width");
        assert!(matches!(err, DataAccessError::ValueTypeMismatch { .. }));
        let err = item.get_int32("age").expect_err("wrong width");
        assert!(matches!(err, DataAccessError::ValueTypeMismatch { .. }));
        let err = item.get_value("height").expect_err("unknown");
        assert!(matches!(err, DataAccessError::UnknownProperty { .. }));
        let err = item.get_value(5).expect_err("out of range");
        assert!(matches!(
            err,
            DataAccessError::PropertyIndexOutOfRange { index: 5, count: 2 }
        ));
        Ok(())
    }

    #[test]
    fn from_values_validates_arity_and_types() {
        let err = DataSetItem::from_values(schema(), vec![Value::from("x")]).expect_err("arity");
        assert!(matches!(
            err,
            DataAccessError::InvalidPropertyCount {
                expected: 2,
                got: 1
            }
        ));
        let err = DataSetItem::from_values(schema(), vec![Value::from("x"), Value::Int64(1)])
            .expect_err("type");
        assert!(matches!(err, DataAccessError::ValueTypeMismatch { .. }));
    }

    #[test]
    fn detach_gives_an_independent_schema() {
        let schema = schema();
        let item = DataSetItem::new(Arc::clone(&schema));
        assert!(item.shares_schema_with(&schema));

        let detached = item.clone().detached();
        assert!(!detached.shares_schema_with(&schema));
        assert_eq!(detached.schema(), schema.as_ref());
        assert!(item.shares_schema_with(&schema));
    }
}
