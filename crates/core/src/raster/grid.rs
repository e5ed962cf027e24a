//! Main Raster type

use crate::error::{Error, Result};
use crate::raster::{Extent, GeoTransform, RasterElement, ResamplingMethod};
use ndarray::{Array2, ArrayView2};

/// A georeferenced 2D raster grid.
///
/// `Raster<T>` stores values of type `T` in a 2D grid with an associated
/// geotransform and an optional no-data value. For float rasters NaN is
/// always treated as no-data.
///
/// # Example
///
/// ```ignore
/// use gridlevels_core::{Raster, ResamplingMethod};
///
/// let mut raster: Raster<f64> = Raster::new(100, 100);
/// raster.set(10, 20, 42.0)?;
///
/// let (x, y) = raster.pixel_to_geo(20, 10);
/// let value = raster.sample(x, y, ResamplingMethod::Bilinear);
/// ```
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    /// Raster data stored in row-major order (row, col)
    data: Array2<T>,
    /// Affine transformation
    transform: GeoTransform,
    /// No-data value
    nodata: Option<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::from_array(Array2::zeros((rows, cols)))
    }

    /// Create a new raster filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self::from_array(Array2::from_elem((rows, cols), value))
    }

    /// Create a raster from existing row-major data
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self::from_array(array))
    }

    /// Create a raster from an ndarray
    pub fn from_array(data: Array2<T>) -> Self {
        Self {
            data,
            transform: GeoTransform::default(),
            nodata: None,
        }
    }

    /// Create a zero-filled raster of another element type sharing this
    /// raster's dimensions and geotransform
    pub fn with_same_meta<U: RasterElement>(&self) -> Raster<U> {
        Raster {
            data: Array2::zeros(self.data.dim()),
            transform: self.transform,
            nodata: None,
        }
    }

    /// Create a raster with the same dimensions and metadata, filled with a value
    pub fn like(&self, fill_value: T) -> Self {
        Self {
            data: Array2::from_elem(self.data.dim(), fill_value),
            transform: self.transform,
            nodata: self.nodata,
        }
    }

    // Dimensions

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        match self.data.get_mut((row, col)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            }),
        }
    }

    /// Value at signed (row, col) as f64, `None` when outside the grid or no-data
    pub fn valid_value(&self, row: isize, col: isize) -> Option<f64> {
        if row < 0 || col < 0 {
            return None;
        }
        let value = *self.data.get((row as usize, col as usize))?;
        if self.is_nodata(value) {
            None
        } else {
            value.as_f64()
        }
    }

    /// Get a view of the underlying data
    pub fn view(&self) -> ArrayView2<'_, T> {
        self.data.view()
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Get a mutable reference to the underlying array
    pub fn data_mut(&mut self) -> &mut Array2<T> {
        &mut self.data
    }

    /// Consume the raster and return the underlying array
    pub fn into_array(self) -> Array2<T> {
        self.data
    }

    // Metadata

    /// Get the geotransform
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Set the geotransform
    pub fn set_transform(&mut self, transform: GeoTransform) {
        self.transform = transform;
    }

    /// Get the no-data value
    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    /// Set the no-data value
    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    /// Cell size (assumes square cells)
    pub fn cell_size(&self) -> f64 {
        self.transform.cell_size()
    }

    /// Geographic extent covered by the cells, borders included
    pub fn extent(&self) -> Extent {
        self.transform.extent(self.cols(), self.rows())
    }

    /// Whether both rasters share dimensions and georeferencing
    pub fn same_geometry<U: RasterElement>(&self, other: &Raster<U>) -> bool {
        self.shape() == other.shape() && self.transform.same_lattice(other.transform())
    }

    // Coordinate conversion

    /// Convert pixel coordinates to geographic coordinates (cell center)
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        self.transform.pixel_to_geo(col, row)
    }

    /// Convert geographic coordinates to fractional pixel coordinates
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        self.transform.geo_to_pixel(x, y)
    }

    // Value checks

    /// Check if a value is no-data
    pub fn is_nodata(&self, value: T) -> bool {
        value.is_nodata(self.nodata)
    }

    /// Check if cell at (row, col) contains no-data
    pub fn is_nodata_at(&self, row: usize, col: usize) -> Result<bool> {
        let value = self.get(row, col)?;
        Ok(self.is_nodata(value))
    }

    /// Number of cells holding data
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|&&v| !self.is_nodata(v)).count()
    }

    // Resampling

    /// Sample the raster at geographic position (x, y).
    ///
    /// Returns `None` when the position lies outside the raster or when the
    /// interpolation kernel cannot be filled with valid cells.
    pub fn sample(&self, x: f64, y: f64, method: ResamplingMethod) -> Option<f64> {
        method.sample(self, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_creation() {
        let raster: Raster<f32> = Raster::new(100, 200);
        assert_eq!(raster.rows(), 100);
        assert_eq!(raster.cols(), 200);
        assert_eq!(raster.shape(), (100, 200));
    }

    #[test]
    fn test_raster_access() {
        let mut raster: Raster<f32> = Raster::new(10, 10);
        raster.set(5, 5, 42.0).unwrap();
        assert_eq!(raster.get(5, 5).unwrap(), 42.0);
        assert!(raster.set(10, 0, 1.0).is_err());
        assert!(raster.get(0, 10).is_err());
    }

    #[test]
    fn test_from_vec_dimensions() {
        assert!(Raster::<f64>::from_vec(vec![1.0; 6], 2, 3).is_ok());
        assert!(Raster::<f64>::from_vec(vec![1.0; 5], 2, 3).is_err());
    }

    #[test]
    fn test_valid_value() {
        let mut raster: Raster<f64> = Raster::filled(3, 3, 1.0);
        raster.set(1, 1, f64::NAN).unwrap();
        raster.set(2, 2, -9999.0).unwrap();
        raster.set_nodata(Some(-9999.0));

        assert_eq!(raster.valid_value(0, 0), Some(1.0));
        assert_eq!(raster.valid_value(1, 1), None);
        assert_eq!(raster.valid_value(2, 2), None);
        assert_eq!(raster.valid_value(-1, 0), None);
        assert_eq!(raster.valid_value(0, 3), None);
        assert_eq!(raster.valid_count(), 7);
    }

    #[test]
    fn test_same_geometry() {
        let mut a: Raster<f64> = Raster::new(4, 5);
        a.set_transform(GeoTransform::new(0.0, 4.0, 1.0, -1.0));
        let b: Raster<u8> = a.with_same_meta();
        assert!(a.same_geometry(&b));

        let c: Raster<f64> = Raster::new(5, 4);
        assert!(!a.same_geometry(&c));

        let mut d = a.like(0.0);
        d.set_transform(GeoTransform::new(0.5, 4.0, 1.0, -1.0));
        assert!(!a.same_geometry(&d));
    }
}
