use std::fmt;

use geo_traits::{
    CoordTrait, GeometryCollectionTrait, GeometryTrait, LineStringTrait, LineTrait,
    MultiLineStringTrait, MultiPointTrait, MultiPolygonTrait, PointTrait, PolygonTrait, RectTrait,
    TriangleTrait,
};
use wkb::reader::Wkb;

use crate::error::Result;

/// Axis-aligned minimum bounding rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl Envelope {
    pub fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Self {
        Self {
            minx,
            miny,
            maxx,
            maxy,
        }
    }

    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }

    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }

    pub fn union(&self, other: &Envelope) -> Envelope {
        Envelope {
            minx: self.minx.min(other.minx),
            miny: self.miny.min(other.miny),
            maxx: self.maxx.max(other.maxx),
            maxy: self.maxy.max(other.maxy),
        }
    }

    pub fn contains(&self, other: &Envelope) -> bool {
        self.minx <= other.minx
            && self.miny <= other.miny
            && self.maxx >= other.maxx
            && self.maxy >= other.maxy
    }

    /// Computes the envelope of any geometry. Returns `None` for empty geometries.
    pub fn of<G: GeometryTrait<T = f64>>(geom: &G) -> Option<Envelope> {
        envelope_from_geometry(geom)
    }
}

/// Merges an optional running envelope with another one.
pub(crate) fn merge_envelope(envelope: &mut Option<Envelope>, other: Envelope) {
    match envelope {
        Some(existing) => *existing = existing.union(&other),
        None => *envelope = Some(other),
    }
}

fn envelope_from_geometry<G: GeometryTrait<T = f64>>(geom: &G) -> Option<Envelope> {
    use geo_traits::GeometryType as GeoType;

    let mut envelope: Option<Envelope> = None;
    match geom.as_type() {
        GeoType::Point(point) => {
            if let Some(coord) = point.coord() {
                add_coord(&mut envelope, &coord);
            }
        }
        GeoType::LineString(line) => add_line_string(&mut envelope, line),
        GeoType::Polygon(poly) => add_polygon(&mut envelope, poly),
        GeoType::MultiPoint(multi) => {
            for point in multi.points() {
                if let Some(coord) = point.coord() {
                    add_coord(&mut envelope, &coord);
                }
            }
        }
        GeoType::MultiLineString(multi) => {
            for line in multi.line_strings() {
                add_line_string(&mut envelope, &line);
            }
        }
        GeoType::MultiPolygon(multi) => {
            for poly in multi.polygons() {
                add_polygon(&mut envelope, &poly);
            }
        }
        GeoType::GeometryCollection(collection) => {
            for sub_geom in collection.geometries() {
                if let Some(sub) = envelope_from_geometry(&sub_geom) {
                    merge_envelope(&mut envelope, sub);
                }
            }
        }
        GeoType::Rect(rect) => {
            add_coord(&mut envelope, &rect.min());
            add_coord(&mut envelope, &rect.max());
        }
        GeoType::Triangle(triangle) => {
            add_coord(&mut envelope, &triangle.first());
            add_coord(&mut envelope, &triangle.second());
            add_coord(&mut envelope, &triangle.third());
        }
        GeoType::Line(line) => {
            add_coord(&mut envelope, &line.start());
            add_coord(&mut envelope, &line.end());
        }
    }

    envelope
}

fn add_polygon<P: PolygonTrait<T = f64>>(envelope: &mut Option<Envelope>, poly: &P) {
    if let Some(ring) = poly.exterior() {
        add_line_string(envelope, &ring);
    }
    for ring in poly.interiors() {
        add_line_string(envelope, &ring);
    }
}

fn add_line_string<L: LineStringTrait<T = f64>>(envelope: &mut Option<Envelope>, line: &L) {
    for coord in line.coords() {
        add_coord(envelope, &coord);
    }
}

fn add_coord<C: CoordTrait<T = f64>>(envelope: &mut Option<Envelope>, coord: &C) {
    let (x, y) = coord.x_y();
    merge_envelope(envelope, Envelope::new(x, y, x, y));
}

/// An owned geometry value: a validated WKB buffer plus an optional SRID.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    wkb: Vec<u8>,
    srid: Option<i32>,
}

impl Geometry {
    /// Wraps WKB bytes after checking that they parse.
    pub fn from_wkb(wkb: Vec<u8>, srid: Option<i32>) -> Result<Self> {
        Wkb::try_new(&wkb)?;
        Ok(Self { wkb, srid })
    }

    /// Encodes any `geo-traits` geometry as WKB.
    pub fn from_geometry<G: GeometryTrait<T = f64>>(geometry: &G, srid: Option<i32>) -> Result<Self> {
        let mut wkb = Vec::new();
        wkb::writer::write_geometry(&mut wkb, geometry, &Default::default())?;
        Ok(Self { wkb, srid })
    }

    pub fn point(x: f64, y: f64, srid: Option<i32>) -> Result<Self> {
        Self::from_geometry(&geo_types::Point::new(x, y), srid)
    }

    pub fn wkb(&self) -> Result<Wkb<'_>> {
        Ok(Wkb::try_new(&self.wkb)?)
    }

    pub fn as_wkb_bytes(&self) -> &[u8] {
        &self.wkb
    }

    pub fn into_wkb_bytes(self) -> Vec<u8> {
        self.wkb
    }

    pub fn srid(&self) -> Option<i32> {
        self.srid
    }

    pub fn with_srid(mut self, srid: Option<i32>) -> Self {
        self.srid = srid;
        self
    }

    pub fn geometry_type(&self) -> Result<wkb::reader::GeometryType> {
        Ok(self.wkb()?.geometry_type())
    }

    pub fn dimension(&self) -> Result<wkb::reader::Dimension> {
        Ok(self.wkb()?.dimension())
    }

    pub fn envelope(&self) -> Result<Option<Envelope>> {
        Ok(Envelope::of(&self.wkb()?))
    }

    /// Coordinates of a non-empty point, `None` for anything else.
    pub fn point_xy(&self) -> Result<Option<(f64, f64)>> {
        let wkb = self.wkb()?;
        let xy = match wkb.as_type() {
            geo_traits::GeometryType::Point(point) => point.coord().map(|c| c.x_y()),
            _ => None,
        };
        Ok(xy)
    }

    #[cfg(feature = "wkt")]
    pub fn to_wkt(&self) -> Result<String> {
        let mut wkt = String::new();
        wkt::to_wkt::write_geometry(&mut wkt, &self.wkb()?)
            .map_err(|err| crate::error::DataAccessError::Wkt(err.to_string()))?;
        Ok(wkt)
    }
}

/// Renders the WKB as upper-case hex, prefixed with `SRID=n;` when set.
impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(srid) = self.srid {
            write!(f, "SRID={srid};")?;
        }
        for byte in &self.wkb {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}
