//! XML Schema (XSD) object model and reader.
//!
//! ```
//! use terra_dataaccess::xsd::{self, MaxOccurs};
//!
//! let schema = xsd::read_schema_str(
//!     r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
//!          <xs:element name="city" type="xs:string" maxOccurs="unbounded"/>
//!        </xs:schema>"#,
//! )?;
//! let city = schema.element("city").unwrap();
//! assert_eq!(city.occurs.max, MaxOccurs::Unbounded);
//! # Ok::<(), terra_dataaccess::DataAccessError>(())
//! ```

mod model;
mod reader;
mod xml;

use std::path::Path;

use crate::error::Result;

pub use model::*;
pub use reader::read_schema_str;

/// Reads the schema document at `path`.
pub fn read_schema(path: impl AsRef<Path>) -> Result<Schema> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "reading xml schema");
    let text = std::fs::read_to_string(path)?;
    read_schema_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataAccessError;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(tag: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        std::env::temp_dir().join(format!("terra_dataaccess_{tag}_{nanos}.xsd"))
    }

    #[test]
    fn reads_schema_file() -> Result<()> {
        let path = temp_path("read_schema");
        std::fs::write(
            &path,
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:t">
                 <xs:element name="road" type="xs:string"/>
               </xs:schema>"#,
        )?;
        let schema = read_schema(&path);
        let _ = std::fs::remove_file(&path);

        let schema = schema?;
        assert_eq!(schema.target_namespace.as_deref(), Some("urn:t"));
        assert_eq!(schema.elements.len(), 1);
        assert!(schema.element("road").is_some());
        Ok(())
    }

    #[test]
    fn missing_schema_file_is_an_io_error() {
        let path = temp_path("missing");
        assert!(matches!(
            read_schema(&path),
            Err(DataAccessError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound
        ));
    }
}
