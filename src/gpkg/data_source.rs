use std::path::Path;

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{OpenFlags, OptionalExtension, params_from_iter};
use tracing::{debug, warn};
use wkb::reader::{Dimension, GeometryType};

use crate::convert::DataConverterRegistry;
use crate::dataset::{DataSet, Record, visit_remaining};
use crate::datetime::DateTime;
use crate::error::{DataAccessError, Result};
use crate::geometry::{Envelope, merge_envelope};
use crate::memory::MemoryDataSet;
use crate::types::{ColumnSpec, DataSetSchema, DataType};
use crate::value::Value;

use super::blob::{geometry_to_gpkg_blob, gpkg_blob_to_geometry};
use super::columns::{
    data_type_from_declared, declared_type, dimension_from_zm, dimension_to_zm,
    geometry_type_from_str,
};
use super::sql::{
    SQL_DELETE_CONTENTS, SQL_DELETE_GEOMETRY_COLUMNS, SQL_INSERT_GPKG_CONTENTS,
    SQL_INSERT_GPKG_GEOMETRY_COLUMNS, SQL_INSERT_SRS, SQL_LIST_FEATURE_TABLES,
    SQL_SELECT_CONTENTS_EXTENT, SQL_SELECT_GEOMETRY_COLUMN_META, SQL_SRS_EXISTS, SQL_TABLE_EXISTS,
    SQL_UPDATE_CONTENTS_EXTENT, initialize_gpkg, sql_column_def, sql_create_table,
    sql_drop_table, sql_insert, sql_primary_key_def, sql_select_all, sql_table_columns,
};

const DEFAULT_PRIMARY_KEY: &str = "fid";

/// Metadata of one feature table.
#[derive(Clone, Debug, PartialEq)]
pub struct GpkgLayerInfo {
    pub name: String,
    pub geometry_column: String,
    /// `None` for the generic `GEOMETRY` type.
    pub geometry_type: Option<GeometryType>,
    pub dimension: Dimension,
    pub srs_id: i32,
    pub primary_key: String,
    /// Every table column, primary key and geometry included, in table order.
    pub schema: DataSetSchema,
}

/// A GeoPackage file exposed as a data source of feature tables.
///
/// Layers are read into [`MemoryDataSet`]s and written from any [`DataSet`].
#[derive(Debug)]
pub struct GpkgDataSource {
    conn: rusqlite::Connection,
    read_only: bool,
    registry: DataConverterRegistry,
}

impl GpkgDataSource {
    fn from_connection(conn: rusqlite::Connection, read_only: bool) -> Self {
        Self {
            conn,
            read_only,
            registry: DataConverterRegistry::with_defaults(),
        }
    }

    /// Open an existing GeoPackage without write access.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn =
            rusqlite::Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self::from_connection(conn, true))
    }

    /// Open an existing GeoPackage for reading and writing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataAccessError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("GeoPackage file does not exist: {}", path.display()),
            )));
        }
        let conn = rusqlite::Connection::open(path)?;
        Ok(Self::from_connection(conn, false))
    }

    /// Create a new GeoPackage file with the core tables.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Err(DataAccessError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("GeoPackage file already exists: {}", path.display()),
            )));
        }
        let conn = rusqlite::Connection::open(path)?;
        initialize_gpkg(&conn)?;
        debug!(path = %path.display(), "created geopackage");
        Ok(Self::from_connection(conn, false))
    }

    /// Create a transient GeoPackage in memory.
    pub fn new_in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory()?;
        initialize_gpkg(&conn)?;
        Ok(Self::from_connection(conn, false))
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Conversions used when a stored value does not match its declared type.
    pub fn registry_mut(&mut self) -> &mut DataConverterRegistry {
        &mut self.registry
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &rusqlite::Connection {
        &self.conn
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(DataAccessError::ReadOnly);
        }
        Ok(())
    }

    /// Register a spatial reference system in `gpkg_spatial_ref_sys`.
    ///
    /// No validation of the WKT definition or the authority is done.
    ///
    /// ```
    /// # use terra_dataaccess::GpkgDataSource;
    /// let gpkg = GpkgDataSource::new_in_memory()?;
    /// gpkg.register_srs(
    ///     "WGS 84 / Pseudo-Mercator",
    ///     3857,
    ///     "EPSG",
    ///     3857,
    ///     r#"PROJCS["WGS 84 / Pseudo-Mercator",AUTHORITY["EPSG","3857"]]"#,
    ///     "Web Mercator",
    /// )?;
    /// assert!(gpkg.srs_exists(3857)?);
    /// # Ok::<(), terra_dataaccess::DataAccessError>(())
    /// ```
    pub fn register_srs(
        &self,
        srs_name: &str,
        srs_id: i32,
        organization: &str,
        organization_coordsys_id: i32,
        definition: &str,
        description: &str,
    ) -> Result<()> {
        self.ensure_writable()?;
        self.conn.execute(
            SQL_INSERT_SRS,
            rusqlite::params![
                srs_name,
                srs_id,
                organization,
                organization_coordsys_id,
                definition,
                description
            ],
        )?;
        Ok(())
    }

    pub fn srs_exists(&self, srs_id: i32) -> Result<bool> {
        let exists: bool = self
            .conn
            .query_row(SQL_SRS_EXISTS, [srs_id], |row| row.get(0))?;
        Ok(exists)
    }

    /// Names of the feature tables, sorted.
    pub fn list_datasets(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(SQL_LIST_FEATURE_TABLES)?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    pub fn dataset_exists(&self, name: &str) -> Result<bool> {
        let exists: bool = self
            .conn
            .query_row(SQL_TABLE_EXISTS, [name], |row| row.get(0))?;
        Ok(exists)
    }

    /// Geometry metadata and column layout of a feature table.
    pub fn layer_info(&self, name: &str) -> Result<GpkgLayerInfo> {
        let meta = self
            .conn
            .query_row(SQL_SELECT_GEOMETRY_COLUMN_META, [name], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i8>(2)?,
                    row.get::<_, i8>(3)?,
                    row.get::<_, i32>(4)?,
                ))
            })
            .optional()?;
        let Some((geometry_column, geometry_type_name, z, m, srs_id)) = meta else {
            return Err(DataAccessError::NoSuchDataSet {
                name: name.to_string(),
            });
        };

        let geometry_type = geometry_type_from_str(&geometry_type_name)?;
        let dimension = dimension_from_zm(z, m)?;

        let mut stmt = self.conn.prepare(&sql_table_columns(name))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i32>(2)? != 0,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut primary_key: Option<String> = None;
        let mut columns = Vec::with_capacity(rows.len());
        for (column, declared, is_primary_key) in rows {
            if is_primary_key {
                if primary_key.is_some() {
                    return Err(DataAccessError::CompositePrimaryKeyUnsupported {
                        layer_name: name.to_string(),
                    });
                }
                primary_key = Some(column.clone());
            }
            let data_type = if column == geometry_column {
                DataType::Geometry
            } else {
                data_type_from_declared(&declared).ok_or_else(|| {
                    DataAccessError::UnsupportedColumnType {
                        column: column.clone(),
                        declared_type: declared.clone(),
                    }
                })?
            };
            columns.push(ColumnSpec::new(column, data_type));
        }

        let primary_key = primary_key.ok_or_else(|| DataAccessError::MissingPrimaryKeyColumn {
            layer_name: name.to_string(),
        })?;

        Ok(GpkgLayerInfo {
            name: name.to_string(),
            geometry_column,
            geometry_type,
            dimension,
            srs_id,
            primary_key,
            schema: DataSetSchema::new(name, columns),
        })
    }

    /// Loads a whole feature table into memory, ordered by primary key.
    pub fn get_dataset(&self, name: &str) -> Result<MemoryDataSet> {
        let info = self.layer_info(name)?;
        let columns = info.schema.columns();
        let sql = sql_select_all(
            name,
            columns.iter().map(|c| c.name.as_str()),
            &info.primary_key,
        );

        let mut dataset = MemoryDataSet::new(info.schema.clone());
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let values = columns
                .iter()
                .enumerate()
                .map(|(i, column)| self.value_from_sql(row.get_ref(i)?, column))
                .collect::<Result<Vec<_>>>()?;
            dataset.add_values(values)?;
        }
        debug!(layer = name, items = dataset.len(), "loaded geopackage layer");
        Ok(dataset)
    }

    fn value_from_sql(&self, value: ValueRef<'_>, column: &ColumnSpec) -> Result<Value> {
        let target = column.data_type;
        let raw = match value {
            ValueRef::Null => return Ok(Value::Null),
            ValueRef::Integer(i) => Value::Int64(i),
            ValueRef::Real(f) => Value::Double(f),
            ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
            ValueRef::Blob(blob) if target == DataType::Geometry => {
                return Ok(Value::Geometry(gpkg_blob_to_geometry(blob)?));
            }
            ValueRef::Blob(blob) => Value::ByteArray(blob.to_vec()),
        };

        match (target, raw) {
            (DataType::DateTime, Value::String(text)) => Ok(Value::DateTime(DateTime::parse(&text)?)),
            (_, raw) if raw.data_type() == Some(target) => Ok(raw),
            (_, raw) => self.registry.convert(&raw, target),
        }
    }

    /// Creates an empty feature table shaped after `schema`.
    ///
    /// The schema needs exactly one geometry column. An integer column named
    /// `fid` becomes the primary key; otherwise one is added.
    pub fn create_dataset(
        &self,
        name: &str,
        schema: &DataSetSchema,
        srs_id: i32,
        dimension: Dimension,
    ) -> Result<GpkgLayerInfo> {
        self.ensure_writable()?;
        if name.trim().is_empty() {
            return Err(DataAccessError::InvalidDataSetName {
                name: name.to_string(),
            });
        }
        if self.dataset_exists(name)? {
            return Err(DataAccessError::DataSetAlreadyExists {
                name: name.to_string(),
            });
        }

        let geometry_columns: Vec<&ColumnSpec> = schema
            .columns()
            .iter()
            .filter(|c| c.data_type == DataType::Geometry)
            .collect();
        let [geometry_column] = geometry_columns.as_slice() else {
            return Err(DataAccessError::InvalidGeometryColumnCount {
                layer_name: name.to_string(),
                count: geometry_columns.len(),
            });
        };

        if !self.srs_exists(srs_id)? {
            return Err(DataAccessError::MissingSpatialRefSysId { srs_id });
        }

        let mut column_defs = Vec::with_capacity(schema.len() + 1);
        if schema.position(DEFAULT_PRIMARY_KEY).is_none() {
            column_defs.push(sql_primary_key_def(DEFAULT_PRIMARY_KEY));
        }
        for column in schema.columns() {
            if column.name == DEFAULT_PRIMARY_KEY {
                if !column.data_type.is_integer() {
                    return Err(DataAccessError::ValueTypeMismatch {
                        expected: DataType::Int64.name(),
                        actual: column.data_type.name(),
                    });
                }
                column_defs.push(sql_primary_key_def(&column.name));
            } else {
                column_defs.push(sql_column_def(&column.name, declared_type(column.data_type)?));
            }
        }

        let (z, m) = dimension_to_zm(dimension);
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(&sql_create_table(name, &column_defs))?;
        tx.execute(SQL_INSERT_GPKG_CONTENTS, rusqlite::params![name, srs_id])?;
        tx.execute(
            SQL_INSERT_GPKG_GEOMETRY_COLUMNS,
            rusqlite::params![name, geometry_column.name, "GEOMETRY", srs_id, z, m],
        )?;
        tx.commit()?;
        debug!(layer = name, srs_id, "created geopackage layer");

        self.layer_info(name)
    }

    /// Inserts every remaining item of `src` into the table `name` in one
    /// transaction and returns the number of rows written.
    ///
    /// Source properties are matched to table columns by name; properties
    /// without a matching column are skipped. Geometries without an SRID are
    /// stored with the layer's srs id. The layer extent in `gpkg_contents` is
    /// widened to cover the new rows.
    pub fn add(&self, name: &str, src: &mut dyn DataSet) -> Result<usize> {
        self.ensure_writable()?;
        let info = self.layer_info(name)?;

        let mut targets = Vec::new();
        for (i, column) in src.schema().columns().iter().enumerate() {
            if info.schema.position(&column.name).is_some() {
                targets.push((i, column.name.clone()));
            } else {
                warn!(layer = name, property = %column.name, "no such column, property skipped");
            }
        }

        let sql = sql_insert(name, targets.iter().map(|(_, n)| n.as_str()));
        let srs_id = info.srs_id;
        let geometry_column = info.geometry_column.as_str();

        let tx = self.conn.unchecked_transaction()?;
        let mut extent: Option<Envelope> = self.layer_extent(name)?;
        let written = {
            let mut stmt = tx.prepare(&sql)?;
            visit_remaining(src, 0, |item| {
                let mut params = Vec::with_capacity(targets.len());
                for (i, column) in &targets {
                    let value = item.value(*i)?;
                    if column == geometry_column
                        && let Value::Geometry(geom) = &value
                        && let Some(envelope) = geom.envelope()?
                    {
                        merge_envelope(&mut extent, envelope);
                    }
                    params.push(value_to_sql(&value, srs_id)?);
                }
                stmt.execute(params_from_iter(params))?;
                Ok(())
            })?
        };
        if let Some(e) = extent {
            tx.execute(
                SQL_UPDATE_CONTENTS_EXTENT,
                rusqlite::params![name, e.minx, e.miny, e.maxx, e.maxy],
            )?;
        }
        tx.commit()?;

        debug!(layer = name, written, "added items to geopackage layer");
        Ok(written)
    }

    /// Extent recorded in `gpkg_contents`, if any.
    pub fn layer_extent(&self, name: &str) -> Result<Option<Envelope>> {
        let extent = self
            .conn
            .query_row(
                SQL_SELECT_CONTENTS_EXTENT,
                [name],
                |row| {
                    Ok((
                        row.get::<_, Option<f64>>(0)?,
                        row.get::<_, Option<f64>>(1)?,
                        row.get::<_, Option<f64>>(2)?,
                        row.get::<_, Option<f64>>(3)?,
                    ))
                },
            )
            .optional()?;
        Ok(match extent {
            Some((Some(minx), Some(miny), Some(maxx), Some(maxy))) => {
                Some(Envelope::new(minx, miny, maxx, maxy))
            }
            _ => None,
        })
    }

    /// Drops the table and its metadata rows.
    pub fn drop_dataset(&self, name: &str) -> Result<()> {
        self.ensure_writable()?;
        if !self.dataset_exists(name)? {
            return Err(DataAccessError::NoSuchDataSet {
                name: name.to_string(),
            });
        }
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(SQL_DELETE_GEOMETRY_COLUMNS, [name])?;
        tx.execute(SQL_DELETE_CONTENTS, [name])?;
        tx.execute_batch(&sql_drop_table(name))?;
        tx.commit()?;
        debug!(layer = name, "dropped geopackage layer");
        Ok(())
    }
}

fn value_to_sql(value: &Value, srs_id: i32) -> Result<SqlValue> {
    let sql = match value {
        Value::Null => SqlValue::Null,
        Value::Char(v) => SqlValue::Integer(i64::from(*v)),
        Value::UChar(v) => SqlValue::Integer(i64::from(*v)),
        Value::Int16(v) => SqlValue::Integer(i64::from(*v)),
        Value::UInt16(v) => SqlValue::Integer(i64::from(*v)),
        Value::Int32(v) => SqlValue::Integer(i64::from(*v)),
        Value::UInt32(v) => SqlValue::Integer(i64::from(*v)),
        Value::Int64(v) => SqlValue::Integer(*v),
        Value::UInt64(v) => SqlValue::Integer(
            i64::try_from(*v).map_err(|_| DataAccessError::ValueOutOfRange {
                target: DataType::Int64.name(),
            })?,
        ),
        Value::Boolean(v) => SqlValue::Integer(i64::from(*v)),
        Value::Float(v) => SqlValue::Real(f64::from(*v)),
        Value::Double(v) => SqlValue::Real(*v),
        Value::Numeric(v) | Value::String(v) => SqlValue::Text(v.clone()),
        Value::ByteArray(v) => SqlValue::Blob(v.clone()),
        Value::DateTime(v) => SqlValue::Text(v.to_string()),
        Value::Geometry(geom) => {
            SqlValue::Blob(geometry_to_gpkg_blob(geom, geom.srid().unwrap_or(srs_id))?)
        }
        Value::Raster(_) => {
            return Err(DataAccessError::UnsupportedDataType {
                data_type: DataType::Raster,
                context: "geopackage column",
            });
        }
    };
    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RecordExt;
    use crate::geometry::Geometry;
    use crate::raster::Raster;
    use geo_types::{LineString, Point};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(tag: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        std::env::temp_dir().join(format!("terra_dataaccess_{tag}_{nanos}.gpkg"))
    }

    fn cities_schema() -> DataSetSchema {
        DataSetSchema::new(
            "cities",
            vec![
                ColumnSpec::new("geom", DataType::Geometry),
                ColumnSpec::new("name", DataType::String),
                ColumnSpec::new("population", DataType::Int32),
                ColumnSpec::new("capital", DataType::Boolean),
                ColumnSpec::new("area", DataType::Double),
            ],
        )
    }

    fn cities() -> Result<MemoryDataSet> {
        let mut ds = MemoryDataSet::new(cities_schema());
        ds.add_values(vec![
            Geometry::point(-47.9, -15.8, None)?.into(),
            "Brasilia".into(),
            Value::Int32(4_800_000),
            Value::Boolean(true),
            Value::Double(5802.0),
        ])?;
        ds.add_values(vec![
            Geometry::point(-46.6, -23.5, None)?.into(),
            "Sao Paulo".into(),
            Value::Int32(12_300_000),
            Value::Boolean(false),
            Value::Null,
        ])?;
        Ok(ds)
    }

    #[test]
    fn new_in_memory_has_core_tables() -> Result<()> {
        let gpkg = GpkgDataSource::new_in_memory()?;
        assert!(gpkg.srs_exists(4326)?);
        assert!(gpkg.srs_exists(0)?);
        assert!(gpkg.srs_exists(-1)?);
        assert!(!gpkg.srs_exists(3857)?);
        assert!(gpkg.list_datasets()?.is_empty());
        Ok(())
    }

    #[test]
    fn create_add_and_read_back() -> Result<()> {
        let gpkg = GpkgDataSource::new_in_memory()?;
        let info = gpkg.create_dataset("cities", &cities_schema(), 4326, Dimension::Xy)?;
        assert_eq!(info.primary_key, "fid");
        assert_eq!(info.geometry_column, "geom");
        assert_eq!(info.geometry_type, None);
        assert_eq!(info.srs_id, 4326);
        assert_eq!(
            info.schema.names().collect::<Vec<_>>(),
            vec!["fid", "geom", "name", "population", "capital", "area"]
        );
        assert_eq!(gpkg.list_datasets()?, vec!["cities".to_string()]);

        let mut src = cities()?;
        assert_eq!(gpkg.add("cities", &mut src)?, 2);
        assert!(src.is_after_end());

        let mut ds = gpkg.get_dataset("cities")?;
        assert_eq!(ds.len(), 2);
        assert!(ds.move_first());
        assert_eq!(ds.get_int64("fid")?, 1);
        assert_eq!(ds.get_string("name")?, "Brasilia");
        assert_eq!(ds.get_int32("population")?, 4_800_000);
        assert!(ds.get_bool("capital")?);
        let geom = ds.get_geometry("geom")?;
        assert_eq!(geom.point_xy()?, Some((-47.9, -15.8)));
        assert_eq!(geom.srid(), Some(4326));

        assert!(ds.move_next());
        assert!(!ds.get_bool("capital")?);
        assert!(ds.is_null_at("area")?);

        assert_eq!(
            gpkg.layer_extent("cities")?,
            Some(Envelope::new(-47.9, -23.5, -46.6, -15.8))
        );
        Ok(())
    }

    #[test]
    fn add_skips_unknown_properties_and_keeps_remaining_cursor() -> Result<()> {
        let gpkg = GpkgDataSource::new_in_memory()?;
        gpkg.create_dataset("cities", &cities_schema(), 4326, Dimension::Xy)?;

        let schema = DataSetSchema::new(
            "other",
            vec![
                ColumnSpec::new("name", DataType::String),
                ColumnSpec::new("unrelated", DataType::Int16),
                ColumnSpec::new("geom", DataType::Geometry),
            ],
        );
        let mut src = MemoryDataSet::new(schema);
        for name in ["a", "b", "c"] {
            src.add_values(vec![
                name.into(),
                Value::Int16(1),
                Geometry::from_geometry(&LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]), None)?
                    .into(),
            ])?;
        }
        src.move_first();
        src.move_next();
        assert_eq!(gpkg.add("cities", &mut src)?, 2);

        let mut ds = gpkg.get_dataset("cities")?;
        ds.move_first();
        assert_eq!(ds.get_string("name")?, "b");
        assert!(ds.is_null_at("population")?);
        Ok(())
    }

    #[test]
    fn fid_column_becomes_primary_key() -> Result<()> {
        let gpkg = GpkgDataSource::new_in_memory()?;
        gpkg.create_dataset("cities", &cities_schema(), 4326, Dimension::Xy)?;
        gpkg.add("cities", &mut cities()?)?;

        let mut copy = gpkg.get_dataset("cities")?;
        let info = gpkg.create_dataset("copy", copy.schema(), 4326, Dimension::Xy)?;
        assert_eq!(info.schema.len(), copy.schema().len());
        assert_eq!(gpkg.add("copy", &mut copy)?, 2);

        let mut ds = gpkg.get_dataset("copy")?;
        ds.move_last();
        assert_eq!(ds.get_int64("fid")?, 2);
        assert_eq!(ds.get_string("name")?, "Sao Paulo");
        Ok(())
    }

    #[test]
    fn geometry_srid_wins_over_layer_srs() -> Result<()> {
        let gpkg = GpkgDataSource::new_in_memory()?;
        gpkg.create_dataset("cities", &cities_schema(), 4326, Dimension::Xy)?;
        let mut src = MemoryDataSet::new(cities_schema());
        src.add_values(vec![
            Geometry::from_geometry(&Point::new(1.0, 2.0), Some(0))?.into(),
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Null,
        ])?;
        gpkg.add("cities", &mut src)?;

        let mut ds = gpkg.get_dataset("cities")?;
        ds.move_first();
        assert_eq!(ds.get_geometry("geom")?.srid(), Some(0));
        Ok(())
    }

    #[test]
    fn create_dataset_validations() -> Result<()> {
        let gpkg = GpkgDataSource::new_in_memory()?;

        let err = gpkg
            .create_dataset("cities", &cities_schema(), 9999, Dimension::Xy)
            .unwrap_err();
        assert!(matches!(err, DataAccessError::MissingSpatialRefSysId { srs_id: 9999 }));

        let no_geometry = DataSetSchema::new("t", vec![ColumnSpec::new("a", DataType::String)]);
        let err = gpkg
            .create_dataset("t", &no_geometry, 4326, Dimension::Xy)
            .unwrap_err();
        assert!(matches!(
            err,
            DataAccessError::InvalidGeometryColumnCount { count: 0, .. }
        ));

        let with_raster = DataSetSchema::new(
            "r",
            vec![
                ColumnSpec::new("geom", DataType::Geometry),
                ColumnSpec::new("image", DataType::Raster),
            ],
        );
        let err = gpkg
            .create_dataset("r", &with_raster, 4326, Dimension::Xy)
            .unwrap_err();
        assert!(matches!(err, DataAccessError::UnsupportedDataType { .. }));
        assert!(!gpkg.dataset_exists("r")?);

        gpkg.create_dataset("cities", &cities_schema(), 4326, Dimension::Xyz)?;
        let err = gpkg
            .create_dataset("cities", &cities_schema(), 4326, Dimension::Xy)
            .unwrap_err();
        assert!(matches!(err, DataAccessError::DataSetAlreadyExists { .. }));
        assert_eq!(gpkg.layer_info("cities")?.dimension, Dimension::Xyz);
        Ok(())
    }

    #[test]
    fn raster_values_are_rejected_and_rolled_back() -> Result<()> {
        let gpkg = GpkgDataSource::new_in_memory()?;
        gpkg.create_dataset(
            "blobs",
            &DataSetSchema::new(
                "blobs",
                vec![
                    ColumnSpec::new("geom", DataType::Geometry),
                    ColumnSpec::new("data", DataType::ByteArray),
                ],
            ),
            4326,
            Dimension::Xy,
        )?;

        let schema = DataSetSchema::new(
            "src",
            vec![
                ColumnSpec::new("geom", DataType::Geometry),
                ColumnSpec::new("data", DataType::Raster),
            ],
        );
        let mut src = MemoryDataSet::new(schema);
        src.add_values(vec![Value::Null, Value::Null])?;
        src.add_values(vec![Value::Null, Raster::new(1, 1, 1, 0.0).into()])?;

        let err = gpkg.add("blobs", &mut src).unwrap_err();
        assert!(matches!(
            err,
            DataAccessError::UnsupportedDataType { data_type: DataType::Raster, .. }
        ));
        assert_eq!(gpkg.get_dataset("blobs")?.len(), 0);
        Ok(())
    }

    #[test]
    fn drop_dataset_removes_metadata() -> Result<()> {
        let gpkg = GpkgDataSource::new_in_memory()?;
        gpkg.create_dataset("cities", &cities_schema(), 4326, Dimension::Xy)?;
        gpkg.drop_dataset("cities")?;
        assert!(gpkg.list_datasets()?.is_empty());
        assert!(matches!(
            gpkg.layer_info("cities"),
            Err(DataAccessError::NoSuchDataSet { .. })
        ));
        assert!(matches!(
            gpkg.drop_dataset("cities"),
            Err(DataAccessError::NoSuchDataSet { .. })
        ));
        Ok(())
    }

    #[test]
    fn declared_types_drive_conversions() -> Result<()> {
        let gpkg = GpkgDataSource::new_in_memory()?;
        gpkg.connection().execute_batch(
            r#"
            CREATE TABLE mixed (
              id INTEGER PRIMARY KEY, shape POINT, tiny TINYINT, small SMALLINT,
              ratio FLOAT, label TEXT(10), seen DATE, raw BLOB
            );
            INSERT INTO gpkg_contents (table_name, data_type, identifier, srs_id)
              VALUES ('mixed', 'features', 'mixed', 4326);
            INSERT INTO gpkg_geometry_columns VALUES ('mixed', 'shape', 'POINT', 4326, 0, 0);
            INSERT INTO mixed VALUES (7, NULL, 12, 300, 0.5, 42, '2024-02-29', x'0102');
            "#,
        )?;

        let info = gpkg.layer_info("mixed")?;
        assert_eq!(info.geometry_type, Some(GeometryType::Point));
        assert_eq!(info.primary_key, "id");

        let mut ds = gpkg.get_dataset("mixed")?;
        ds.move_first();
        assert!(ds.is_null_at("shape")?);
        assert_eq!(ds.get_char("tiny")?, 12);
        assert_eq!(ds.get_int16("small")?, 300);
        assert_eq!(ds.get_float("ratio")?, 0.5);
        assert_eq!(ds.get_string("label")?, "42");
        assert_eq!(ds.get_date_time("seen")?.to_string(), "2024-02-29");
        assert_eq!(ds.get_byte_array("raw")?, vec![1, 2]);
        Ok(())
    }

    #[test]
    fn composite_primary_key_is_rejected() -> Result<()> {
        let gpkg = GpkgDataSource::new_in_memory()?;
        gpkg.connection().execute_batch(
            r#"
            CREATE TABLE pairs (a INTEGER, b INTEGER, geom GEOMETRY, PRIMARY KEY (a, b));
            INSERT INTO gpkg_contents (table_name, data_type, identifier, srs_id)
              VALUES ('pairs', 'features', 'pairs', 4326);
            INSERT INTO gpkg_geometry_columns VALUES ('pairs', 'geom', 'GEOMETRY', 4326, 0, 0);
            "#,
        )?;
        assert!(matches!(
            gpkg.layer_info("pairs"),
            Err(DataAccessError::CompositePrimaryKeyUnsupported { .. })
        ));
        Ok(())
    }

    #[test]
    fn file_lifecycle_and_read_only() -> Result<()> {
        let path = temp_path("lifecycle");
        assert!(matches!(
            GpkgDataSource::open(&path),
            Err(DataAccessError::Io(_))
        ));

        {
            let gpkg = GpkgDataSource::new(&path)?;
            gpkg.create_dataset("cities", &cities_schema(), 4326, Dimension::Xy)?;
            gpkg.add("cities", &mut cities()?)?;
        }
        assert!(matches!(GpkgDataSource::new(&path), Err(DataAccessError::Io(_))));

        let gpkg = GpkgDataSource::open_read_only(&path)?;
        assert!(gpkg.is_read_only());
        assert_eq!(gpkg.get_dataset("cities")?.len(), 2);
        assert!(matches!(
            gpkg.drop_dataset("cities"),
            Err(DataAccessError::ReadOnly)
        ));
        assert!(matches!(
            gpkg.add("cities", &mut cities()?),
            Err(DataAccessError::ReadOnly)
        ));
        assert!(matches!(
            gpkg.register_srs("x", 1, "X", 1, "x", "x"),
            Err(DataAccessError::ReadOnly)
        ));
        drop(gpkg);

        let gpkg = GpkgDataSource::open(&path)?;
        gpkg.drop_dataset("cities")?;
        drop(gpkg);
        let _ = std::fs::remove_file(&path);
        Ok(())
    }
}
