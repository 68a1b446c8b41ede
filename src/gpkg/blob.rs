//! GeoPackage binary geometry header.
// cf. https://www.geopackage.org/spec140/index.html#gpb_format

use crate::error::{DataAccessError, Result};
use crate::geometry::{Envelope, Geometry};

const MAGIC: [u8; 2] = [0x47, 0x50];
const HEADER_LEN: usize = 8;

const FLAG_LITTLE_ENDIAN: u8 = 0b0000_0001;
const FLAG_ENVELOPE_XY: u8 = 0b0000_0010;
const FLAG_EMPTY: u8 = 0b0001_0000;

/// A parsed geometry blob. `wkb` borrows from the blob.
#[derive(Debug)]
pub(crate) struct GpkgBlob<'a> {
    pub(crate) srs_id: i32,
    pub(crate) envelope: Option<Envelope>,
    pub(crate) is_empty: bool,
    pub(crate) wkb: &'a [u8],
}

fn read_f64(bytes: &[u8], little_endian: bool) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    if little_endian {
        f64::from_le_bytes(buf)
    } else {
        f64::from_be_bytes(buf)
    }
}

pub(crate) fn parse_gpkg_blob(b: &[u8]) -> Result<GpkgBlob<'_>> {
    if b.len() < HEADER_LEN {
        return Err(DataAccessError::InvalidGpkgGeometryLength {
            len: b.len(),
            minimum: HEADER_LEN,
        });
    }
    if b[..2] != MAGIC {
        return Err(DataAccessError::InvalidGpkgGeometryMagic([b[0], b[1]]));
    }

    let flags = b[3];
    let little_endian = flags & FLAG_LITTLE_ENDIAN != 0;
    let envelope_size: usize = match flags & 0b0000_1110 {
        0b0000_0000 => 0,  // no envelope
        0b0000_0010 => 32, // [minx, maxx, miny, maxy]
        0b0000_0100 => 48, // [minx, maxx, miny, maxy, minz, maxz]
        0b0000_0110 => 48, // [minx, maxx, miny, maxy, minm, maxm]
        0b0000_1000 => 64, // [minx, maxx, miny, maxy, minz, maxz, minm, maxm]
        _ => return Err(DataAccessError::InvalidGpkgGeometryFlags(flags)),
    };
    let required = HEADER_LEN + envelope_size;
    if b.len() < required {
        return Err(DataAccessError::InvalidGpkgGeometryEnvelope {
            len: b.len(),
            required,
        });
    }

    let srs_bytes = [b[4], b[5], b[6], b[7]];
    let srs_id = if little_endian {
        i32::from_le_bytes(srs_bytes)
    } else {
        i32::from_be_bytes(srs_bytes)
    };

    let envelope = (envelope_size > 0).then(|| {
        let e = &b[HEADER_LEN..];
        Envelope {
            minx: read_f64(&e[0..], little_endian),
            maxx: read_f64(&e[8..], little_endian),
            miny: read_f64(&e[16..], little_endian),
            maxy: read_f64(&e[24..], little_endian),
        }
    });

    Ok(GpkgBlob {
        srs_id,
        envelope,
        is_empty: flags & FLAG_EMPTY != 0,
        wkb: &b[required..],
    })
}

/// Decodes a blob into a geometry tagged with the blob's srs id.
pub(crate) fn gpkg_blob_to_geometry(b: &[u8]) -> Result<Geometry> {
    let blob = parse_gpkg_blob(b)?;
    Geometry::from_wkb(blob.wkb.to_vec(), Some(blob.srs_id))
}

/// Wraps the geometry's WKB in a little-endian header with an XY envelope.
/// Geometries without coordinates get the empty flag instead.
pub(crate) fn geometry_to_gpkg_blob(geometry: &Geometry, srs_id: i32) -> Result<Vec<u8>> {
    let wkb = geometry.as_wkb_bytes();
    let envelope = geometry.envelope()?;

    let mut flags = FLAG_LITTLE_ENDIAN;
    flags |= match envelope {
        Some(_) => FLAG_ENVELOPE_XY,
        None => FLAG_EMPTY,
    };

    let mut blob = Vec::with_capacity(HEADER_LEN + 32 + wkb.len());
    blob.extend_from_slice(&MAGIC);
    blob.push(0x00); // version
    blob.push(flags);
    blob.extend_from_slice(&srs_id.to_le_bytes());
    if let Some(e) = envelope {
        for v in [e.minx, e.maxx, e.miny, e.maxy] {
            blob.extend_from_slice(&v.to_le_bytes());
        }
    }
    blob.extend_from_slice(wkb);
    Ok(blob)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{LineString, Point};

    #[test]
    fn blob_roundtrip_keeps_wkb_and_srs() -> Result<()> {
        let geom = Geometry::from_geometry(&Point::new(3.0, -1.0), None)?;
        let blob = geometry_to_gpkg_blob(&geom, 4326)?;
        assert_eq!(&blob[..4], &[0x47, 0x50, 0x00, 0x03]);

        let parsed = parse_gpkg_blob(&blob)?;
        assert_eq!(parsed.srs_id, 4326);
        assert_eq!(parsed.envelope, Some(Envelope::new(3.0, -1.0, 3.0, -1.0)));
        assert!(!parsed.is_empty);
        assert_eq!(parsed.wkb, geom.as_wkb_bytes());

        let decoded = gpkg_blob_to_geometry(&blob)?;
        assert_eq!(decoded.as_wkb_bytes(), geom.as_wkb_bytes());
        assert_eq!(decoded.srid(), Some(4326));
        Ok(())
    }

    #[test]
    fn empty_geometry_sets_empty_flag() -> Result<()> {
        let geom = Geometry::from_geometry(&LineString::<f64>::new(vec![]), None)?;
        let blob = geometry_to_gpkg_blob(&geom, 0)?;
        let parsed = parse_gpkg_blob(&blob)?;
        assert!(parsed.is_empty);
        assert_eq!(parsed.envelope, None);
        Ok(())
    }

    #[test]
    fn big_endian_header_without_envelope() -> Result<()> {
        let geom = Geometry::point(1.0, 2.0, None)?;
        let mut blob = vec![0x47, 0x50, 0x00, 0x00];
        blob.extend_from_slice(&3857i32.to_be_bytes());
        blob.extend_from_slice(geom.as_wkb_bytes());
        let parsed = parse_gpkg_blob(&blob)?;
        assert_eq!(parsed.srs_id, 3857);
        assert_eq!(parsed.envelope, None);
        assert_eq!(parsed.wkb, geom.as_wkb_bytes());
        Ok(())
    }

    #[test]
    fn rejects_invalid_flags() {
        let mut blob = vec![0x47, 0x50, 0x00, 0x0A, 0, 0, 0, 0];
        blob.extend_from_slice(&[0; 16]);
        assert!(matches!(
            parse_gpkg_blob(&blob),
            Err(DataAccessError::InvalidGpkgGeometryFlags(0x0A))
        ));
    }

    #[test]
    fn rejects_short_and_foreign_blobs() {
        assert!(matches!(
            parse_gpkg_blob(&[0x47, 0x50]),
            Err(DataAccessError::InvalidGpkgGeometryLength { len: 2, minimum: 8 })
        ));
        assert!(matches!(
            parse_gpkg_blob(&[0x01, 0x01, 0, 1, 0, 0, 0, 0]),
            Err(DataAccessError::InvalidGpkgGeometryMagic([0x01, 0x01]))
        ));
        assert!(matches!(
            parse_gpkg_blob(&[0x47, 0x50, 0, 0x03, 0, 0, 0, 0, 1, 2]),
            Err(DataAccessError::InvalidGpkgGeometryEnvelope { len: 10, required: 40 })
        ));
    }
}
