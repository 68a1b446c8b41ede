//! Uniform access to tabular, geometry-bearing datasets.
//!
//! ## Overview
//!
//! - `DataSet` is a cursor over a sequence of items. Every item has the same
//!   ordered list of typed properties, described by a `DataSetSchema`.
//! - `Value` is a single property value. `DataType` names its type.
//! - `MemoryDataSet` keeps its items in memory and is the exchange format
//!   between drivers.
//! - `MemoryDataSource` is a named collection of in-memory datasets.
//! - `GpkgDataSource` reads and writes GeoPackage feature tables through
//!   rusqlite.
//! - `adapter::DataSetAdapter` presents another dataset through a different
//!   schema, converting each property on the fly.
//! - `xsd` reads XML Schema documents into a typed object model.
//!
//! Typed access goes through `RecordExt`, implemented for every `Record`.
//! Properties are addressed by position or by name:
//!
//! ```
//! use terra_dataaccess::{
//!     ColumnSpec, DataSet, DataSetSchema, DataType, Geometry, MemoryDataSet, RecordExt, Value,
//! };
//!
//! let schema = DataSetSchema::new(
//!     "cities",
//!     vec![
//!         ColumnSpec::new("name", DataType::String),
//!         ColumnSpec::new("population", DataType::Int32),
//!         ColumnSpec::new("location", DataType::Geometry),
//!     ],
//! );
//! let mut cities = MemoryDataSet::new(schema);
//! cities.add_values(vec![
//!     "Lisbon".into(),
//!     Value::Int32(545_000),
//!     Geometry::point(-9.14, 38.72, Some(4326))?.into(),
//! ])?;
//!
//! assert!(cities.move_first());
//! assert_eq!(cities.get_string("name")?, "Lisbon");
//! assert_eq!(cities.get_int32(1)?, 545_000);
//! # Ok::<(), terra_dataaccess::DataAccessError>(())
//! ```
//!
//! ## GeoPackage
//!
//! ```no_run
//! use terra_dataaccess::{DataSet, GpkgDataSource, RecordExt};
//!
//! let source = GpkgDataSource::open_read_only("data/example.gpkg")?;
//! for name in source.list_datasets()? {
//!     let mut layer = source.get_dataset(&name)?;
//!     while layer.move_next() {
//!         let geometry = layer.get_geometry("geom")?;
//!         println!("{name}: {geometry}");
//!     }
//! }
//! # Ok::<(), terra_dataaccess::DataAccessError>(())
//! ```
//!
//! ## Features
//!
//! - `wkt`: `Geometry::to_wkt`.
//! - `arrow`: conversion of datasets into Arrow `RecordBatch`es.
//! - `cli`: the `dump_dataset` and `read_xsd` binaries and their logger.

mod convert;
mod cursor;
mod dataset;
mod datetime;
mod error;
mod geometry;
mod item;
mod memory;
mod raster;
mod types;
mod value;

pub mod adapter;
pub mod gpkg;
pub mod xsd;

#[cfg(feature = "arrow")]
pub mod arrow;

#[cfg(feature = "cli")]
pub mod logging;

pub use convert::{DataConverter, DataConverterRegistry};
pub use cursor::{Cursor, CursorPosition};
pub use dataset::{DataSet, PropertyKey, Record, RecordExt};
pub use datetime::DateTime;
pub use error::{DataAccessError, Result};
pub use geometry::{Envelope, Geometry};
pub use gpkg::{GpkgDataSource, GpkgLayerInfo};
pub use item::DataSetItem;
pub use memory::{
    MAX_DATASETS, MemoryDataSet, MemoryDataSource, MemoryDataSourceConfig, OPERATION_MODE,
    OperationMode,
};
pub use raster::Raster;
pub use types::{AccessPolicy, CharEncoding, ColumnSpec, DataSetSchema, DataType, TraverseType};
pub use value::Value;
