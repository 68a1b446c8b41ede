//! SQL for the GeoPackage core tables and the statements the driver runs.
//!
//! Table definitions follow
//! <https://www.geopackage.org/spec140/index.html#table_definition_sql>.

const SQL_GPKG_SPATIAL_REF_SYS: &str = "
CREATE TABLE gpkg_spatial_ref_sys (
  srs_name TEXT NOT NULL,
  srs_id INTEGER PRIMARY KEY,
  organization TEXT NOT NULL,
  organization_coordsys_id INTEGER NOT NULL,
  definition  TEXT NOT NULL,
  description TEXT
);
";

const SQL_GPKG_CONTENTS: &str = "
CREATE TABLE gpkg_contents (
  table_name TEXT NOT NULL PRIMARY KEY,
  data_type TEXT NOT NULL,
  identifier TEXT UNIQUE,
  description TEXT DEFAULT '',
  last_change DATETIME NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
  min_x DOUBLE,
  min_y DOUBLE,
  max_x DOUBLE,
  max_y DOUBLE,
  srs_id INTEGER,
  CONSTRAINT fk_gc_r_srs_id FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
);
";

const SQL_GPKG_GEOMETRY_COLUMNS: &str = "
CREATE TABLE gpkg_geometry_columns (
  table_name TEXT NOT NULL,
  column_name TEXT NOT NULL,
  geometry_type_name TEXT NOT NULL,
  srs_id INTEGER NOT NULL,
  z TINYINT NOT NULL,
  m TINYINT NOT NULL,
  CONSTRAINT pk_geom_cols PRIMARY KEY (table_name, column_name),
  CONSTRAINT uk_gc_table_name UNIQUE (table_name),
  CONSTRAINT fk_gc_tn FOREIGN KEY (table_name) REFERENCES gpkg_contents(table_name),
  CONSTRAINT fk_gc_srs FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys (srs_id)
);
";

pub(crate) const SQL_INSERT_SRS: &str = "
INSERT INTO gpkg_spatial_ref_sys
  (srs_name, srs_id, organization, organization_coordsys_id, definition, description)
VALUES
  (?1, ?2, ?3, ?4, ?5, ?6)
";

pub(crate) const SQL_SRS_EXISTS: &str =
    "SELECT EXISTS(SELECT 1 FROM gpkg_spatial_ref_sys WHERE srs_id = ?1)";

pub(crate) const SQL_LIST_FEATURE_TABLES: &str =
    "SELECT table_name FROM gpkg_contents WHERE data_type = 'features' ORDER BY table_name";

pub(crate) const SQL_TABLE_EXISTS: &str =
    "SELECT EXISTS(SELECT 1 FROM gpkg_contents WHERE table_name = ?1)";

pub(crate) const SQL_INSERT_GPKG_CONTENTS: &str = "
INSERT INTO gpkg_contents
  (table_name, data_type, identifier, description, srs_id)
VALUES
  (?1, 'features', ?1, '', ?2)
";

pub(crate) const SQL_INSERT_GPKG_GEOMETRY_COLUMNS: &str = "
INSERT INTO gpkg_geometry_columns
  (table_name, column_name, geometry_type_name, srs_id, z, m)
VALUES
  (?1, ?2, ?3, ?4, ?5, ?6)
";

pub(crate) const SQL_SELECT_GEOMETRY_COLUMN_META: &str = "
SELECT column_name, geometry_type_name, z, m, srs_id
FROM gpkg_geometry_columns
WHERE table_name = ?1
";

pub(crate) const SQL_DELETE_GEOMETRY_COLUMNS: &str =
    "DELETE FROM gpkg_geometry_columns WHERE table_name = ?1";

pub(crate) const SQL_DELETE_CONTENTS: &str = "DELETE FROM gpkg_contents WHERE table_name = ?1";

pub(crate) const SQL_SELECT_CONTENTS_EXTENT: &str =
    "SELECT min_x, min_y, max_x, max_y FROM gpkg_contents WHERE table_name = ?1";

pub(crate) const SQL_UPDATE_CONTENTS_EXTENT: &str = "
UPDATE gpkg_contents
SET min_x = ?2, min_y = ?3, max_x = ?4, max_y = ?5,
    last_change = strftime('%Y-%m-%dT%H:%M:%fZ','now')
WHERE table_name = ?1
";

fn quote(identifier: &str) -> String {
    format!(r#""{}""#, identifier.replace('"', r#""""#))
}

pub(crate) fn sql_create_table(table: &str, column_defs: &[String]) -> String {
    format!("CREATE TABLE {} ({})", quote(table), column_defs.join(", "))
}

pub(crate) fn sql_column_def(name: &str, declared_type: &str) -> String {
    format!("{} {declared_type}", quote(name))
}

pub(crate) fn sql_primary_key_def(name: &str) -> String {
    format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", quote(name))
}

pub(crate) fn sql_drop_table(table: &str) -> String {
    format!("DROP TABLE {}", quote(table))
}

pub(crate) fn sql_table_columns(table: &str) -> String {
    format!(
        "SELECT name, type, pk FROM pragma_table_info('{}')",
        table.replace('\'', "''")
    )
}

pub(crate) fn sql_select_all<'a, I>(table: &str, columns: I, order_by: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let columns = columns.into_iter().map(quote).collect::<Vec<_>>().join(", ");
    format!(
        "SELECT {columns} FROM {} ORDER BY {}",
        quote(table),
        quote(order_by)
    )
}

pub(crate) fn sql_insert<'a, I>(table: &str, columns: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let columns: Vec<String> = columns.into_iter().map(quote).collect();
    if columns.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES", quote(table));
    }
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({placeholders})",
        quote(table),
        columns.join(", ")
    )
}

pub(crate) fn initialize_gpkg(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SQL_GPKG_SPATIAL_REF_SYS)?;
    register_default_srs_ids(conn)?;
    conn.execute_batch(SQL_GPKG_CONTENTS)?;
    conn.execute_batch(SQL_GPKG_GEOMETRY_COLUMNS)?;
    Ok(())
}

const EPSG_4326_DEFINITION: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AXIS["Latitude",NORTH],AXIS["Longitude",EAST],AUTHORITY["EPSG","4326"]]"#;

/// Rows every GeoPackage carries in `gpkg_spatial_ref_sys`:
/// `(srs_name, srs_id, organization, definition, description)`.
const DEFAULT_SRS: [(&str, i32, &str, &str, &str); 3] = [
    ("WGS 84", 4326, "EPSG", EPSG_4326_DEFINITION, "WGS 84"),
    (
        "Undefined Cartesian SRS",
        -1,
        "NONE",
        "undefined",
        "undefined Cartesian coordinate reference system",
    ),
    (
        "Undefined geographic SRS",
        0,
        "NONE",
        "undefined",
        "undefined geographic coordinate reference system",
    ),
];

fn register_default_srs_ids(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare(SQL_INSERT_SRS)?;
    for (name, srs_id, organization, definition, description) in DEFAULT_SRS {
        stmt.execute(rusqlite::params![
            name,
            srs_id,
            organization,
            srs_id,
            definition,
            description
        ])?;
    }
    Ok(())
}
