use std::fmt;

use crate::error::{DataAccessError, Result};
use crate::geometry::Envelope;

/// In-memory raster grid. Cells are stored band by band, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    bands: Vec<Vec<f64>>,
    envelope: Option<Envelope>,
    srid: Option<i32>,
}

impl Raster {
    /// Creates a raster with every cell of every band set to `fill`.
    pub fn new(width: usize, height: usize, num_bands: usize, fill: f64) -> Self {
        Self {
            width,
            height,
            bands: vec![vec![fill; width * height]; num_bands],
            envelope: None,
            srid: None,
        }
    }

    pub fn with_georeference(mut self, envelope: Envelope, srid: Option<i32>) -> Self {
        self.envelope = Some(envelope);
        self.srid = srid;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_bands(&self) -> usize {
        self.bands.len()
    }

    pub fn envelope(&self) -> Option<Envelope> {
        self.envelope
    }

    pub fn srid(&self) -> Option<i32> {
        self.srid
    }

    pub fn value(&self, band: usize, row: usize, col: usize) -> Result<f64> {
        let offset = self.offset(band, row, col)?;
        Ok(self.bands[band][offset])
    }

    pub fn set_value(&mut self, band: usize, row: usize, col: usize, value: f64) -> Result<()> {
        let offset = self.offset(band, row, col)?;
        self.bands[band][offset] = value;
        Ok(())
    }

    fn offset(&self, band: usize, row: usize, col: usize) -> Result<usize> {
        if band >= self.bands.len() || row >= self.height || col >= self.width {
            return Err(DataAccessError::RasterIndexOutOfRange { band, row, col });
        }
        Ok(row * self.width + col)
    }
}

impl fmt::Display for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RASTER({}x{}, {} band(s))",
            self.width,
            self.height,
            self.bands.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_addressed_per_band() -> Result<()> {
        let mut raster = Raster::new(3, 2, 2, 0.0);
        raster.set_value(1, 1, 2, 7.5)?;
        assert_eq!(raster.value(1, 1, 2)?, 7.5);
        assert_eq!(raster.value(0, 1, 2)?, 0.0);
        assert_eq!(raster.to_string(), "RASTER(3x2, 2 band(s))");
        Ok(())
    }

    #[test]
    fn out_of_range_cell_is_an_error() {
        let raster = Raster::new(3, 2, 1, 0.0);
        assert!(matches!(
            raster.value(0, 2, 0),
            Err(DataAccessError::RasterIndexOutOfRange { row: 2, .. })
        ));
        assert!(matches!(
            raster.value(1, 0, 0),
            Err(DataAccessError::RasterIndexOutOfRange { band: 1, .. })
        ));
    }
}
