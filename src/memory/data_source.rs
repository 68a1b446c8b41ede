use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::dataset::{DataSet, Record};
use crate::error::{DataAccessError, Result};
use crate::types::{ColumnSpec, DataSetSchema};
use crate::value::Value;

use super::MemoryDataSet;

/// Connection-info key for the maximum number of datasets.
pub const MAX_DATASETS: &str = "MAX_DATASETS";
/// Connection-info key for the retrieval mode, `SHARED` or `NON-SHARED`.
pub const OPERATION_MODE: &str = "OPERATION_MODE";

/// How [`MemoryDataSource::dataset`] hands datasets out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OperationMode {
    /// Callers get a copy-on-write clone sharing storage with the source.
    /// Writes through the clone detach it and never reach the stored dataset.
    #[default]
    Shared,
    /// Callers get a deep copy.
    NonShared,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryDataSourceConfig {
    /// `None` means unlimited.
    pub max_datasets: Option<usize>,
    pub operation_mode: OperationMode,
}

impl MemoryDataSourceConfig {
    /// Parses the `MAX_DATASETS` and `OPERATION_MODE` connection parameters.
    /// Unknown keys are ignored.
    pub fn from_connection_info(info: &HashMap<String, String>) -> Result<Self> {
        let max_datasets = match info.get(MAX_DATASETS) {
            Some(value) => Some(value.trim().parse::<usize>().map_err(|_| {
                DataAccessError::InvalidConnectionInfo {
                    key: MAX_DATASETS.to_string(),
                    value: value.clone(),
                }
            })?),
            None => None,
        };
        let operation_mode = match info.get(OPERATION_MODE) {
            Some(mode) if mode.eq_ignore_ascii_case("NON-SHARED") => OperationMode::NonShared,
            _ => OperationMode::Shared,
        };
        Ok(Self {
            max_datasets,
            operation_mode,
        })
    }

    pub fn to_connection_info(&self) -> HashMap<String, String> {
        let mut info = HashMap::new();
        if let Some(max) = self.max_datasets {
            info.insert(MAX_DATASETS.to_string(), max.to_string());
        }
        let mode = match self.operation_mode {
            OperationMode::Shared => "SHARED",
            OperationMode::NonShared => "NON-SHARED",
        };
        info.insert(OPERATION_MODE.to_string(), mode.to_string());
        info
    }
}

/// A named collection of in-memory datasets.
#[derive(Debug, Default)]
pub struct MemoryDataSource {
    config: MemoryDataSourceConfig,
    datasets: BTreeMap<String, MemoryDataSet>,
    opened: bool,
}

impl MemoryDataSource {
    pub fn new(config: MemoryDataSourceConfig) -> Self {
        Self {
            config,
            datasets: BTreeMap::new(),
            opened: false,
        }
    }

    pub fn from_connection_info(info: &HashMap<String, String>) -> Result<Self> {
        Ok(Self::new(MemoryDataSourceConfig::from_connection_info(
            info,
        )?))
    }

    pub fn config(&self) -> &MemoryDataSourceConfig {
        &self.config
    }

    pub fn open(&mut self) {
        debug!(max_datasets = ?self.config.max_datasets, "opening memory data source");
        self.opened = true;
    }

    /// Closes the source and drops every dataset it holds.
    pub fn close(&mut self) {
        debug!(datasets = self.datasets.len(), "closing memory data source");
        self.datasets.clear();
        self.opened = false;
    }

    pub fn is_opened(&self) -> bool {
        self.opened
    }

    pub fn is_valid(&self) -> bool {
        self.opened
    }

    fn ensure_opened(&self) -> Result<()> {
        if self.opened {
            Ok(())
        } else {
            Err(DataAccessError::DataSourceClosed)
        }
    }

    /// Letter or underscore first, then letters, digits and underscores.
    pub fn is_dataset_name_valid(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_alphanumeric() || c == '_')
    }

    pub fn dataset_names(&self) -> Result<Vec<String>> {
        self.ensure_opened()?;
        Ok(self.datasets.keys().cloned().collect())
    }

    pub fn number_of_datasets(&self) -> Result<usize> {
        self.ensure_opened()?;
        Ok(self.datasets.len())
    }

    pub fn has_datasets(&self) -> Result<bool> {
        Ok(self.number_of_datasets()? > 0)
    }

    pub fn dataset_exists(&self, name: &str) -> Result<bool> {
        self.ensure_opened()?;
        Ok(self.datasets.contains_key(name))
    }

    fn get(&self, name: &str) -> Result<&MemoryDataSet> {
        self.ensure_opened()?;
        self.datasets
            .get(name)
            .ok_or_else(|| DataAccessError::NoSuchDataSet {
                name: name.to_string(),
            })
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut MemoryDataSet> {
        self.ensure_opened()?;
        self.datasets
            .get_mut(name)
            .ok_or_else(|| DataAccessError::NoSuchDataSet {
                name: name.to_string(),
            })
    }

    /// Retrieves a dataset according to the configured [`OperationMode`].
    pub fn dataset(&self, name: &str) -> Result<MemoryDataSet> {
        let dataset = self.get(name)?;
        let mut copy = match self.config.operation_mode {
            OperationMode::Shared => dataset.clone(),
            OperationMode::NonShared => dataset.deep_copy(),
        };
        copy.move_before_first();
        Ok(copy)
    }

    pub fn dataset_mut(&mut self, name: &str) -> Result<&mut MemoryDataSet> {
        self.get_mut(name)
    }

    pub fn dataset_schema(&self, name: &str) -> Result<DataSetSchema> {
        Ok(self.get(name)?.schema().clone())
    }

    pub fn property_names(&self, name: &str) -> Result<Vec<String>> {
        Ok(self.get(name)?.schema().names().map(str::to_string).collect())
    }

    pub fn number_of_properties(&self, name: &str) -> Result<usize> {
        Ok(self.get(name)?.num_properties())
    }

    pub fn property_exists(&self, name: &str, property: &str) -> Result<bool> {
        Ok(self.get(name)?.property_position(property).is_some())
    }

    pub fn number_of_items(&self, name: &str) -> Result<usize> {
        Ok(self.get(name)?.len())
    }

    /// Creates an empty dataset named after `schema`.
    pub fn create_dataset(&mut self, schema: DataSetSchema) -> Result<()> {
        self.insert_dataset(MemoryDataSet::new(schema))
    }

    fn insert_dataset(&mut self, dataset: MemoryDataSet) -> Result<()> {
        self.ensure_opened()?;
        let name = dataset.name().to_string();
        if !Self::is_dataset_name_valid(&name) {
            return Err(DataAccessError::InvalidDataSetName { name });
        }
        if self.datasets.contains_key(&name) {
            return Err(DataAccessError::DataSetAlreadyExists { name });
        }
        if let Some(max) = self.config.max_datasets
            && self.datasets.len() >= max
        {
            return Err(DataAccessError::MaxDataSetsExceeded { max });
        }
        debug!(dataset = %name, "creating dataset");
        self.datasets.insert(name, dataset);
        Ok(())
    }

    /// Adds a deep copy of dataset `name` under `clone_name`.
    pub fn clone_dataset(&mut self, name: &str, clone_name: &str) -> Result<()> {
        let mut clone = self.get(name)?.deep_copy();
        clone.set_name(clone_name);
        clone.move_before_first();
        self.insert_dataset(clone)
    }

    pub fn drop_dataset(&mut self, name: &str) -> Result<()> {
        self.ensure_opened()?;
        self.datasets
            .remove(name)
            .ok_or_else(|| DataAccessError::NoSuchDataSet {
                name: name.to_string(),
            })?;
        debug!(dataset = name, "dropped dataset");
        Ok(())
    }

    pub fn rename_dataset(&mut self, name: &str, new_name: &str) -> Result<()> {
        self.ensure_opened()?;
        if !Self::is_dataset_name_valid(new_name) {
            return Err(DataAccessError::InvalidDataSetName {
                name: new_name.to_string(),
            });
        }
        if self.datasets.contains_key(new_name) {
            return Err(DataAccessError::DataSetAlreadyExists {
                name: new_name.to_string(),
            });
        }
        let mut dataset =
            self.datasets
                .remove(name)
                .ok_or_else(|| DataAccessError::NoSuchDataSet {
                    name: name.to_string(),
                })?;
        dataset.set_name(new_name);
        debug!(from = name, to = new_name, "renamed dataset");
        self.datasets.insert(new_name.to_string(), dataset);
        Ok(())
    }

    pub fn add_property(&mut self, name: &str, spec: ColumnSpec, default: Value) -> Result<()> {
        self.get_mut(name)?.add_property(spec, default)
    }

    pub fn drop_property(&mut self, name: &str, property: &str) -> Result<()> {
        let dataset = self.get_mut(name)?;
        let pos = dataset
            .property_position(property)
            .ok_or_else(|| DataAccessError::UnknownProperty {
                name: property.to_string(),
            })?;
        dataset.drop_property(pos)?;
        Ok(())
    }

    pub fn rename_property(&mut self, name: &str, property: &str, new_name: &str) -> Result<()> {
        let dataset = self.get_mut(name)?;
        let pos = dataset
            .property_position(property)
            .ok_or_else(|| DataAccessError::UnknownProperty {
                name: property.to_string(),
            })?;
        dataset.set_property_name(pos, new_name)
    }

    /// Appends every remaining item of `src` to dataset `name`.
    pub fn add(&mut self, name: &str, src: &mut dyn DataSet) -> Result<usize> {
        let dataset = self.get_mut(name)?;
        if src.num_properties() != dataset.num_properties() {
            return Err(DataAccessError::InvalidPropertyCount {
                expected: dataset.num_properties(),
                got: src.num_properties(),
            });
        }
        dataset.copy(src, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RecordExt;
    use crate::types::DataType;

    fn schema(name: &str) -> DataSetSchema {
        DataSetSchema::new(
            name,
            vec![
                ColumnSpec::new("id", DataType::Int64),
                ColumnSpec::new("name", DataType::String),
            ],
        )
    }

    fn opened(config: MemoryDataSourceConfig) -> MemoryDataSource {
        let mut ds = MemoryDataSource::new(config);
        ds.open();
        ds
    }

    #[test]
    fn config_from_connection_info() -> Result<()> {
        let mut info = HashMap::new();
        info.insert(MAX_DATASETS.to_string(), "3".to_string());
        info.insert(OPERATION_MODE.to_string(), "NON-SHARED".to_string());
        let config = MemoryDataSourceConfig::from_connection_info(&info)?;
        assert_eq!(config.max_datasets, Some(3));
        assert_eq!(config.operation_mode, OperationMode::NonShared);
        assert_eq!(
            MemoryDataSourceConfig::from_connection_info(&config.to_connection_info())?,
            config
        );

        let config = MemoryDataSourceConfig::from_connection_info(&HashMap::new())?;
        assert_eq!(config, MemoryDataSourceConfig::default());

        info.insert(MAX_DATASETS.to_string(), "many".to_string());
        let err = MemoryDataSourceConfig::from_connection_info(&info).expect_err("not a number");
        assert!(matches!(err, DataAccessError::InvalidConnectionInfo { .. }));
        Ok(())
    }

    #[test]
    fn closed_source_refuses_operations() {
        let mut source = MemoryDataSource::default();
        assert!(!source.is_opened());
        assert!(matches!(
            source.create_dataset(schema("a")),
            Err(DataAccessError::DataSourceClosed)
        ));
        assert!(matches!(
            source.dataset_names(),
            Err(DataAccessError::DataSourceClosed)
        ));
    }

    #[test]
    fn create_validates_names_duplicates_and_limit() -> Result<()> {
        let mut source = opened(MemoryDataSourceConfig {
            max_datasets: Some(2),
            ..Default::default()
        });
        source.create_dataset(schema("b"))?;
        source.create_dataset(schema("a"))?;
        assert_eq!(source.dataset_names()?, vec!["a", "b"]);

        assert!(matches!(
            source.create_dataset(schema("a")),
            Err(DataAccessError::DataSetAlreadyExists { .. })
        ));
        assert!(matches!(
            source.create_dataset(schema("c")),
            Err(DataAccessError::MaxDataSetsExceeded { max: 2 })
        ));

        source.drop_dataset("b")?;
        assert!(matches!(
            source.create_dataset(schema("1bad")),
            Err(DataAccessError::InvalidDataSetName { .. })
        ));
        assert!(matches!(
            source.drop_dataset("b"),
            Err(DataAccessError::NoSuchDataSet { .. })
        ));
        Ok(())
    }

    #[test]
    fn dataset_names_validity() {
        assert!(MemoryDataSource::is_dataset_name_valid("_roads2"));
        assert!(!MemoryDataSource::is_dataset_name_valid(""));
        assert!(!MemoryDataSource::is_dataset_name_valid("2roads"));
        assert!(!MemoryDataSource::is_dataset_name_valid("road-s"));
    }

    #[test]
    fn shared_and_non_shared_retrieval() -> Result<()> {
        for (mode, shared) in [
            (OperationMode::Shared, true),
            (OperationMode::NonShared, false),
        ] {
            let mut source = opened(MemoryDataSourceConfig {
                operation_mode: mode,
                ..Default::default()
            });
            source.create_dataset(schema("t"))?;
            source
                .dataset_mut("t")?
                .add_values(vec![Value::Int64(1), Value::from("one")])?;

            let stored = source.dataset("t")?;
            let again = source.dataset("t")?;
            assert_eq!(stored.shares_storage_with(&again), shared);
            assert_eq!(source.number_of_items("t")?, 1);
        }
        Ok(())
    }

    #[test]
    fn writes_through_a_shared_retrieval_stay_local() -> Result<()> {
        let mut source = opened(MemoryDataSourceConfig::default());
        source.create_dataset(schema("t"))?;
        source
            .dataset_mut("t")?
            .add_values(vec![Value::Int64(1), Value::from("one")])?;

        let mut retrieved = source.dataset("t")?;
        assert!(retrieved.move_first());
        retrieved.set_int64("id", 9)?;
        assert_eq!(retrieved.get_int64("id")?, 9);

        let mut stored = source.dataset("t")?;
        assert!(!stored.shares_storage_with(&retrieved));
        assert!(stored.move_first());
        assert_eq!(stored.get_int64("id")?, 1);
        Ok(())
    }

    #[test]
    fn clone_rename_and_property_maintenance() -> Result<()> {
        let mut source = opened(MemoryDataSourceConfig::default());
        source.create_dataset(schema("roads"))?;
        source
            .dataset_mut("roads")?
            .add_values(vec![Value::Int64(1), Value::from("main")])?;

        source.clone_dataset("roads", "roads_copy")?;
        source.rename_dataset("roads", "streets")?;
        assert_eq!(source.dataset_names()?, vec!["roads_copy", "streets"]);
        assert_eq!(source.dataset("streets")?.name(), "streets");
        assert!(matches!(
            source.rename_dataset("streets", "roads_copy"),
            Err(DataAccessError::DataSetAlreadyExists { .. })
        ));

        source.add_property("streets", ColumnSpec::new("lanes", DataType::Int16), Value::Int16(2))?;
        source.rename_property("streets", "name", "label")?;
        source.drop_property("streets", "id")?;
        assert_eq!(source.property_names("streets")?, vec!["label", "lanes"]);
        assert!(source.property_exists("streets", "lanes")?);
        assert_eq!(source.number_of_properties("roads_copy")?, 2);
        assert!(matches!(
            source.drop_property("streets", "id"),
            Err(DataAccessError::UnknownProperty { .. })
        ));

        let mut streets = source.dataset("streets")?;
        streets.move_first();
        assert_eq!(streets.get_string("label")?, "main");
        Ok(())
    }

    #[test]
    fn add_appends_items_from_another_dataset() -> Result<()> {
        let mut source = opened(MemoryDataSourceConfig::default());
        source.create_dataset(schema("t"))?;

        let mut other = MemoryDataSet::new(schema("other"));
        other.add_values(vec![Value::Int64(1), Value::from("a")])?;
        other.add_values(vec![Value::Int64(2), Value::Null])?;

        assert_eq!(source.add("t", &mut other)?, 2);
        assert_eq!(source.number_of_items("t")?, 2);

        source.close();
        assert!(!source.is_opened());
        source.open();
        assert!(!source.has_datasets()?);
        Ok(())
    }
}
