//! Mapping between SQLite declared types, GeoPackage metadata and [`DataType`].

use wkb::reader::{Dimension, GeometryType};

use crate::error::{DataAccessError, Result};
use crate::types::DataType;

pub(crate) const GEOMETRY_TYPE_NAMES: [&str; 8] = [
    "GEOMETRY",
    "POINT",
    "LINESTRING",
    "POLYGON",
    "MULTIPOINT",
    "MULTILINESTRING",
    "MULTIPOLYGON",
    "GEOMETRYCOLLECTION",
];

/// `None` stands for the generic `GEOMETRY` type.
pub(crate) fn geometry_type_from_str(s: &str) -> Result<Option<GeometryType>> {
    let geometry_type = if s.eq_ignore_ascii_case("GEOMETRY") {
        None
    } else if s.eq_ignore_ascii_case("POINT") {
        Some(GeometryType::Point)
    } else if s.eq_ignore_ascii_case("LINESTRING") {
        Some(GeometryType::LineString)
    } else if s.eq_ignore_ascii_case("POLYGON") {
        Some(GeometryType::Polygon)
    } else if s.eq_ignore_ascii_case("MULTIPOINT") {
        Some(GeometryType::MultiPoint)
    } else if s.eq_ignore_ascii_case("MULTILINESTRING") {
        Some(GeometryType::MultiLineString)
    } else if s.eq_ignore_ascii_case("MULTIPOLYGON") {
        Some(GeometryType::MultiPolygon)
    } else if s.eq_ignore_ascii_case("GEOMETRYCOLLECTION") {
        Some(GeometryType::GeometryCollection)
    } else {
        return Err(DataAccessError::UnsupportedGeometryType(s.to_string()));
    };
    Ok(geometry_type)
}

pub(crate) fn dimension_to_zm(dimension: Dimension) -> (i8, i8) {
    match dimension {
        Dimension::Xy => (0, 0),
        Dimension::Xyz => (1, 0),
        Dimension::Xym => (0, 1),
        Dimension::Xyzm => (1, 1),
    }
}

/// `z` and `m` are 0 (prohibited), 1 (mandatory) or 2 (optional). Optional
/// ordinates count as present.
pub(crate) fn dimension_from_zm(z: i8, m: i8) -> Result<Dimension> {
    match (z, m) {
        (0, 0) => Ok(Dimension::Xy),
        (1 | 2, 0) => Ok(Dimension::Xyz),
        (0, 1 | 2) => Ok(Dimension::Xym),
        (1 | 2, 1 | 2) => Ok(Dimension::Xyzm),
        _ => Err(DataAccessError::InvalidDimension { z, m }),
    }
}

/// Maps a declared column type. A length suffix such as `TEXT(20)` is ignored.
// cf. https://www.geopackage.org/spec140/index.html#_sqlite_container
pub(crate) fn data_type_from_declared(declared: &str) -> Option<DataType> {
    let s = declared.split('(').next().unwrap_or_default().trim();
    let data_type = if s.eq_ignore_ascii_case("TINYINT") {
        DataType::Char
    } else if s.eq_ignore_ascii_case("SMALLINT") {
        DataType::Int16
    } else if s.eq_ignore_ascii_case("MEDIUMINT") {
        DataType::Int32
    } else if s.eq_ignore_ascii_case("INT") || s.eq_ignore_ascii_case("INTEGER") {
        DataType::Int64
    } else if s.eq_ignore_ascii_case("FLOAT") {
        DataType::Float
    } else if s.eq_ignore_ascii_case("DOUBLE") || s.eq_ignore_ascii_case("REAL") {
        DataType::Double
    } else if s.eq_ignore_ascii_case("TEXT") {
        DataType::String
    } else if s.eq_ignore_ascii_case("BLOB") {
        DataType::ByteArray
    } else if s.eq_ignore_ascii_case("BOOLEAN") {
        DataType::Boolean
    } else if s.eq_ignore_ascii_case("DATE") || s.eq_ignore_ascii_case("DATETIME") {
        DataType::DateTime
    } else if GEOMETRY_TYPE_NAMES.iter().any(|g| s.eq_ignore_ascii_case(g)) {
        DataType::Geometry
    } else {
        return None;
    };
    Some(data_type)
}

/// Declared type used when creating a column of the given type.
pub(crate) fn declared_type(data_type: DataType) -> Result<&'static str> {
    let declared = match data_type {
        DataType::Char => "TINYINT",
        DataType::UChar | DataType::Int16 => "SMALLINT",
        DataType::UInt16 | DataType::Int32 => "MEDIUMINT",
        DataType::UInt32 | DataType::Int64 | DataType::UInt64 => "INTEGER",
        DataType::Boolean => "BOOLEAN",
        DataType::Float => "FLOAT",
        DataType::Double => "DOUBLE",
        DataType::Numeric | DataType::String => "TEXT",
        DataType::ByteArray => "BLOB",
        DataType::DateTime => "DATETIME",
        DataType::Geometry => "GEOMETRY",
        DataType::Raster => {
            return Err(DataAccessError::UnsupportedDataType {
                data_type,
                context: "geopackage column",
            });
        }
    };
    Ok(declared)
}
