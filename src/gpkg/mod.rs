//! GeoPackage driver backed by rusqlite.
//!
//! Feature tables are loaded into [`MemoryDataSet`](crate::MemoryDataSet)s
//! and written from any [`DataSet`](crate::DataSet).

mod blob;
mod columns;
mod data_source;
mod sql;

pub use data_source::{GpkgDataSource, GpkgLayerInfo};

// Re-exported because they appear in `GpkgLayerInfo` and `create_dataset`.
pub use wkb::reader::{Dimension, GeometryType};
