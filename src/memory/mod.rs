//! In-memory datasets and the data source that holds them.

mod data_source;
mod dataset;

pub use data_source::{
    MAX_DATASETS, MemoryDataSource, MemoryDataSourceConfig, OPERATION_MODE, OperationMode,
};
pub use dataset::MemoryDataSet;
