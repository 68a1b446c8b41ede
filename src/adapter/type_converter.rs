use std::sync::Arc;

use crate::convert::DataConverterRegistry;
use crate::error::{DataAccessError, Result};
use crate::types::{ColumnSpec, DataSetSchema, DataType};

use super::converters::{self, AttributeConverter};

pub(crate) struct PlannedProperty {
    pub(crate) spec: ColumnSpec,
    pub(crate) source_indexes: Vec<usize>,
    pub(crate) converter: Option<AttributeConverter>,
}

/// Plans how the properties of an input schema turn into an output schema.
///
/// Every input property starts out passed through unchanged. The plan is
/// then edited property by property and finally applied with
/// [`DataSetAdapter::from_type_converter`](super::DataSetAdapter::from_type_converter).
pub struct DataSetTypeConverter {
    input: DataSetSchema,
    registry: Arc<DataConverterRegistry>,
    planned: Vec<PlannedProperty>,
}

impl std::fmt::Debug for DataSetTypeConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSetTypeConverter")
            .field("input", &self.input.name())
            .field("result", &self.result_schema())
            .finish()
    }
}

impl DataSetTypeConverter {
    pub fn new(input: DataSetSchema, registry: Arc<DataConverterRegistry>) -> Self {
        let planned = input
            .columns()
            .iter()
            .enumerate()
            .map(|(i, spec)| PlannedProperty {
                spec: spec.clone(),
                source_indexes: vec![i],
                converter: Some(converters::identity()),
            })
            .collect();
        Self {
            input,
            registry,
            planned,
        }
    }

    pub fn input_schema(&self) -> &DataSetSchema {
        &self.input
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.planned
            .iter()
            .position(|p| p.spec.name == name)
            .ok_or_else(|| DataAccessError::UnknownProperty {
                name: name.to_string(),
            })
    }

    fn ensure_unique(&self, name: &str) -> Result<()> {
        if self.planned.iter().any(|p| p.spec.name == name) {
            return Err(DataAccessError::DuplicateProperty {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<()> {
        let pos = self.position(name)?;
        self.planned.remove(pos);
        Ok(())
    }

    pub fn rename(&mut self, name: &str, new_name: &str) -> Result<()> {
        let pos = self.position(name)?;
        if name != new_name {
            self.ensure_unique(new_name)?;
        }
        self.planned[pos].spec.name = new_name.to_string();
        Ok(())
    }

    /// Casts property `name` to `to` through the registry.
    ///
    /// Fails right away with [`DataAccessError::NoConverter`] when the
    /// registry has no conversion from the input property's type.
    pub fn convert(&mut self, name: &str, to: DataType) -> Result<()> {
        let pos = self.position(name)?;
        let source = match self.planned[pos].source_indexes.as_slice() {
            [source] => *source,
            other => {
                return Err(DataAccessError::InvalidPropertyCount {
                    expected: 1,
                    got: other.len(),
                });
            }
        };
        let from = self.input.column(source)?.data_type;
        if !self.registry.can_convert(from, to) {
            return Err(DataAccessError::NoConverter { from, to });
        }

        let property = &mut self.planned[pos];
        property.spec.data_type = to;
        property.converter = Some(converters::generic(Arc::clone(&self.registry)));
        Ok(())
    }

    /// Adds a property computed by `converter` from the given input properties.
    pub fn add(
        &mut self,
        spec: ColumnSpec,
        source_indexes: Vec<usize>,
        converter: AttributeConverter,
    ) -> Result<()> {
        self.ensure_unique(&spec.name)?;
        for &i in &source_indexes {
            self.input.column(i)?;
        }
        self.planned.push(PlannedProperty {
            spec,
            source_indexes,
            converter: Some(converter),
        });
        Ok(())
    }

    /// Adds a property without a converter. The plan stays invalid until the
    /// property is removed.
    pub fn add_unconverted(&mut self, spec: ColumnSpec) -> Result<()> {
        self.ensure_unique(&spec.name)?;
        self.planned.push(PlannedProperty {
            spec,
            source_indexes: Vec::new(),
            converter: None,
        });
        Ok(())
    }

    pub fn result_schema(&self) -> DataSetSchema {
        let columns = self.planned.iter().map(|p| p.spec.clone()).collect();
        DataSetSchema::new(self.input.name(), columns)
    }

    pub fn validate(&self) -> Result<()> {
        match self.planned.iter().find(|p| p.converter.is_none()) {
            Some(p) => Err(DataAccessError::MissingConverter {
                property: p.spec.name.clone(),
            }),
            None => Ok(()),
        }
    }

    pub(crate) fn planned(&self) -> &[PlannedProperty] {
        &self.planned
    }
}
