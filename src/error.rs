use std::error::Error;
use std::fmt;

use crate::types::DataType;

/// Crate error type for dataset access, drivers and schema reading.
#[derive(Debug)]
pub enum DataAccessError {
    /// Wraps errors returned by `rusqlite`.
    Sql(rusqlite::Error),
    /// Wraps errors returned by the `wkb` crate.
    Wkb(wkb::error::WkbError),
    /// Wraps errors returned by `quick-xml`.
    Xml(quick_xml::Error),
    /// Wraps I/O errors, e.g. while reading a schema file.
    Io(std::io::Error),
    /// Wraps errors returned by Arrow APIs.
    #[cfg(feature = "arrow")]
    Arrow(arrow_schema::ArrowError),
    /// WKT rendering failed.
    Wkt(String),
    /// Property index is past the number of properties.
    PropertyIndexOutOfRange { index: usize, count: usize },
    /// No property with the given name exists.
    UnknownProperty { name: String },
    /// A property with the given name already exists.
    DuplicateProperty { name: String },
    /// The cursor is not positioned on an item.
    InvalidCursorPosition,
    /// Item index is past the number of items.
    ItemIndexOutOfRange { index: usize, size: usize },
    /// Value count did not match the schema.
    InvalidPropertyCount { expected: usize, got: usize },
    /// Dynamic `Value` type did not match the expected type.
    ValueTypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
    /// Numeric conversion failed because the value is out of range.
    ValueOutOfRange { target: &'static str },
    /// Text could not be parsed as the target type.
    ValueParse { value: String, target: &'static str },
    /// A typed getter hit a null value.
    NullValue { property: String },
    /// The registry has no conversion between the two types.
    NoConverter { from: DataType, to: DataType },
    /// A planned property has no converter attached.
    MissingConverter { property: String },
    /// Source ran out before the requested number of items was copied.
    CopyLimitNotReached { requested: usize, copied: usize },
    /// Raster cell access is out of the raster bounds.
    RasterIndexOutOfRange { band: usize, row: usize, col: usize },
    /// The data type cannot be handled in this context.
    UnsupportedDataType {
        data_type: DataType,
        context: &'static str,
    },
    /// The data source has not been opened.
    DataSourceClosed,
    /// A dataset with the same name already exists.
    DataSetAlreadyExists { name: String },
    /// No dataset with the given name exists.
    NoSuchDataSet { name: String },
    /// The data source already holds the configured maximum of datasets.
    MaxDataSetsExceeded { max: usize },
    /// The dataset name is not a valid identifier.
    InvalidDataSetName { name: String },
    /// A connection-info entry could not be parsed.
    InvalidConnectionInfo { key: String, value: String },
    /// The operation needs write access.
    ReadOnly,
    /// A geometry type in metadata could not be mapped to a supported WKB geometry type.
    UnsupportedGeometryType(String),
    /// A column type declared in SQLite metadata is not supported.
    UnsupportedColumnType {
        column: String,
        declared_type: String,
    },
    /// Invalid or mixed `z` / `m` dimension flags in GeoPackage metadata.
    InvalidDimension { z: i8, m: i8 },
    /// Invalid GeoPackage geometry flags byte.
    InvalidGpkgGeometryFlags(u8),
    /// GeoPackage geometry blob does not start with the `GP` magic.
    InvalidGpkgGeometryMagic([u8; 2]),
    /// GeoPackage geometry blob is too short for the fixed header.
    InvalidGpkgGeometryLength { len: usize, minimum: usize },
    /// GeoPackage geometry blob is too short for the declared envelope payload.
    InvalidGpkgGeometryEnvelope { len: usize, required: usize },
    /// Referenced `srs_id` does not exist in `gpkg_spatial_ref_sys`.
    MissingSpatialRefSysId { srs_id: i32 },
    /// Layer schema has multiple primary key columns.
    CompositePrimaryKeyUnsupported { layer_name: String },
    /// Layer schema has no primary key column.
    MissingPrimaryKeyColumn { layer_name: String },
    /// A layer needs exactly one geometry column.
    InvalidGeometryColumnCount { layer_name: String, count: usize },
    /// The XML stream had a node the schema grammar does not allow here.
    XsdUnexpectedNode { expected: String, found: String },
    /// A required XSD attribute is missing.
    XsdMissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    /// An XSD attribute has a value outside its allowed set.
    XsdInvalidAttribute { attribute: String, value: String },
    /// An XSD element lacks its mandatory child content.
    XsdMissingContent {
        element: &'static str,
        expected: &'static str,
    },
}

impl fmt::Display for DataAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sql(err) => write!(f, "{err}"),
            Self::Wkb(err) => write!(f, "{err}"),
            Self::Xml(err) => write!(f, "xml error: {err}"),
            Self::Io(err) => write!(f, "{err}"),
            #[cfg(feature = "arrow")]
            Self::Arrow(err) => write!(f, "{err}"),
            Self::Wkt(err) => write!(f, "wkt error: {err}"),
            Self::PropertyIndexOutOfRange { index, count } => write!(
                f,
                "property index {index} out of range (dataset has {count} properties)"
            ),
            Self::UnknownProperty { name } => write!(f, "unknown property: {name}"),
            Self::DuplicateProperty { name } => write!(f, "property already exists: {name}"),
            Self::InvalidCursorPosition => write!(f, "cursor is not positioned on an item"),
            Self::ItemIndexOutOfRange { index, size } => {
                write!(f, "item index {index} out of range (dataset has {size} items)")
            }
            Self::InvalidPropertyCount { expected, got } => {
                write!(f, "invalid property count: expected {expected}, got {got}")
            }
            Self::ValueTypeMismatch { expected, actual } => {
                write!(f, "expected {expected}, got {actual}")
            }
            Self::ValueOutOfRange { target } => {
                write!(f, "value out of range for {target}")
            }
            Self::ValueParse { value, target } => {
                write!(f, "cannot parse '{value}' as {target}")
            }
            Self::NullValue { property } => write!(f, "property '{property}' is null"),
            Self::NoConverter { from, to } => {
                write!(f, "no converter registered from {from} to {to}")
            }
            Self::MissingConverter { property } => {
                write!(f, "no converter attached to property: {property}")
            }
            Self::CopyLimitNotReached { requested, copied } => write!(
                f,
                "source dataset ran out after {copied} items, {requested} were requested"
            ),
            Self::RasterIndexOutOfRange { band, row, col } => {
                write!(f, "raster cell out of range (band {band}, row {row}, col {col})")
            }
            Self::UnsupportedDataType { data_type, context } => {
                write!(f, "data type {data_type} is not supported in {context}")
            }
            Self::DataSourceClosed => write!(f, "data source is not opened"),
            Self::DataSetAlreadyExists { name } => write!(f, "dataset already exists: {name}"),
            Self::NoSuchDataSet { name } => write!(f, "dataset not found: {name}"),
            Self::MaxDataSetsExceeded { max } => {
                write!(f, "data source already holds the maximum of {max} datasets")
            }
            Self::InvalidDataSetName { name } => write!(f, "invalid dataset name: '{name}'"),
            Self::InvalidConnectionInfo { key, value } => {
                write!(f, "invalid value for connection parameter {key}: '{value}'")
            }
            Self::ReadOnly => write!(f, "operation not allowed on read-only data"),
            Self::UnsupportedGeometryType(ty) => write!(f, "unsupported geometry type: {ty}"),
            Self::UnsupportedColumnType {
                column,
                declared_type,
            } => write!(
                f,
                "unsupported column type for column '{column}': {declared_type}"
            ),
            Self::InvalidDimension { z, m } => {
                write!(f, "invalid or mixed geometry dimension (z={z}, m={m})")
            }
            Self::InvalidGpkgGeometryFlags(flags) => {
                write!(f, "invalid gpkg geometry flags: {flags:#04x}")
            }
            Self::InvalidGpkgGeometryMagic(magic) => {
                write!(f, "invalid gpkg geometry magic: {:#04x} {:#04x}", magic[0], magic[1])
            }
            Self::InvalidGpkgGeometryLength { len, minimum } => write!(
                f,
                "invalid gpkg geometry length: got {len} bytes, expected at least {minimum}"
            ),
            Self::InvalidGpkgGeometryEnvelope { len, required } => write!(
                f,
                "invalid gpkg geometry envelope length: got {len} bytes, required {required}"
            ),
            Self::MissingSpatialRefSysId { srs_id } => {
                write!(f, "srs_id {srs_id} not found in gpkg_spatial_ref_sys")
            }
            Self::CompositePrimaryKeyUnsupported { layer_name } => write!(
                f,
                "composite primary keys are not supported for layer: {layer_name}"
            ),
            Self::MissingPrimaryKeyColumn { layer_name } => {
                write!(f, "no primary key column found for layer: {layer_name}")
            }
            Self::InvalidGeometryColumnCount { layer_name, count } => write!(
                f,
                "layer {layer_name} needs exactly one geometry column, found {count}"
            ),
            Self::XsdUnexpectedNode { expected, found } => {
                write!(f, "unexpected xml node: expected {expected}, found {found}")
            }
            Self::XsdMissingAttribute { element, attribute } => {
                write!(f, "<{element}> is missing the required attribute '{attribute}'")
            }
            Self::XsdInvalidAttribute { attribute, value } => {
                write!(f, "invalid value for attribute '{attribute}': '{value}'")
            }
            Self::XsdMissingContent { element, expected } => {
                write!(f, "<{element}> must contain {expected}")
            }
        }
    }
}

impl Error for DataAccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sql(err) => Some(err),
            Self::Wkb(err) => Some(err),
            Self::Xml(err) => Some(err),
            Self::Io(err) => Some(err),
            #[cfg(feature = "arrow")]
            Self::Arrow(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DataAccessError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sql(err)
    }
}

impl From<wkb::error::WkbError> for DataAccessError {
    fn from(err: wkb::error::WkbError) -> Self {
        Self::Wkb(err)
    }
}

impl From<quick_xml::Error> for DataAccessError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err)
    }
}

impl From<quick_xml::events::attributes::AttrError> for DataAccessError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(err.into())
    }
}

impl From<std::io::Error> for DataAccessError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, DataAccessError>;

#[cfg(feature = "arrow")]
impl From<arrow_schema::ArrowError> for DataAccessError {
    fn from(value: arrow_schema::ArrowError) -> Self {
        DataAccessError::Arrow(value)
    }
}
