//! Affine geotransformation for rasters

use serde::{Deserialize, Serialize};

use super::Extent;

/// Affine transformation coefficients for georeferencing rasters.
///
/// Converts between pixel coordinates (col, row) and geographic coordinates (x, y):
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// For north-up grids the rotations are 0 and `pixel_height` is negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Pixel width (cell size in X direction)
    pub pixel_width: f64,
    /// Pixel height (cell size in Y direction, usually negative)
    pub pixel_height: f64,
    /// Rotation about X axis (usually 0)
    pub row_rotation: f64,
    /// Rotation about Y axis (usually 0)
    pub col_rotation: f64,
}

impl GeoTransform {
    /// Create a new GeoTransform with no rotation (north-up grid)
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    /// North-up transform for a grid whose lower-left corner is at
    /// `(x_min, y_min)` with square cells and `rows` rows.
    pub fn from_lower_left(x_min: f64, y_min: f64, cell_size: f64, rows: usize) -> Self {
        Self::new(x_min, y_min + rows as f64 * cell_size, cell_size, -cell_size)
    }

    /// Convert pixel coordinates to geographic coordinates
    ///
    /// Returns the coordinates of the pixel center
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        self.fractional_to_geo(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Convert pixel coordinates to geographic coordinates (top-left corner)
    pub fn pixel_to_geo_corner(&self, col: usize, row: usize) -> (f64, f64) {
        self.fractional_to_geo(col as f64, row as f64)
    }

    fn fractional_to_geo(&self, col: f64, row: f64) -> (f64, f64) {
        let x = self.origin_x + col * self.pixel_width + row * self.row_rotation;
        let y = self.origin_y + col * self.col_rotation + row * self.pixel_height;
        (x, y)
    }

    /// Convert geographic coordinates to pixel coordinates
    ///
    /// Returns fractional pixel coordinates; cell centers sit at `index + 0.5`.
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let det = self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation;

        if det.abs() < 1e-10 {
            // Degenerate transformation
            return (f64::NAN, f64::NAN);
        }

        let dx = x - self.origin_x;
        let dy = y - self.origin_y;

        let col = (self.pixel_height * dx - self.row_rotation * dy) / det;
        let row = (-self.col_rotation * dx + self.pixel_width * dy) / det;

        (col, row)
    }

    /// Get the cell size (assumes square pixels and no rotation)
    pub fn cell_size(&self) -> f64 {
        self.pixel_width.abs()
    }

    /// Whether both transforms describe the same grid lattice.
    ///
    /// Coefficients are compared with a tolerance relative to the cell size,
    /// so grids derived from the same system through floating point
    /// arithmetic still match.
    pub fn same_lattice(&self, other: &GeoTransform) -> bool {
        let tol = 1e-9 * self.cell_size().max(other.cell_size()).max(f64::MIN_POSITIVE);
        let close = |a: f64, b: f64| (a - b).abs() <= tol;

        close(self.origin_x, other.origin_x)
            && close(self.origin_y, other.origin_y)
            && close(self.pixel_width, other.pixel_width)
            && close(self.pixel_height, other.pixel_height)
            && close(self.row_rotation, other.row_rotation)
            && close(self.col_rotation, other.col_rotation)
    }

    /// Calculate the bounding box for a raster of given dimensions
    pub fn extent(&self, width: usize, height: usize) -> Extent {
        let corners = [
            self.pixel_to_geo_corner(0, 0),
            self.pixel_to_geo_corner(width, 0),
            self.pixel_to_geo_corner(0, height),
            self.pixel_to_geo_corner(width, height),
        ];

        // Four corners always exist
        Extent::from_points(corners).unwrap_or_else(|| Extent::from_point(self.origin_x, self.origin_y))
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pixel_to_geo_roundtrip() {
        let gt = GeoTransform::new(100.0, 200.0, 10.0, -10.0);

        let (x, y) = gt.pixel_to_geo(5, 10);
        let (col, row) = gt.geo_to_pixel(x, y);

        assert_relative_eq!(col, 5.5, epsilon = 1e-10);
        assert_relative_eq!(row, 10.5, epsilon = 1e-10);
    }

    #[test]
    fn test_extent() {
        let gt = GeoTransform::new(0.0, 100.0, 1.0, -1.0);
        let e = gt.extent(100, 50);

        assert_relative_eq!(e.x_min, 0.0, epsilon = 1e-10);
        assert_relative_eq!(e.y_min, 50.0, epsilon = 1e-10);
        assert_relative_eq!(e.x_max, 100.0, epsilon = 1e-10);
        assert_relative_eq!(e.y_max, 100.0, epsilon = 1e-10);
    }

    #[test]
    fn test_from_lower_left() {
        let gt = GeoTransform::from_lower_left(10.0, 20.0, 2.0, 5);
        assert_eq!(gt.origin_y, 30.0);
        let (x, y) = gt.pixel_to_geo(0, 4);
        assert_relative_eq!(x, 11.0);
        assert_relative_eq!(y, 21.0);
    }

    #[test]
    fn test_same_lattice() {
        let a = GeoTransform::new(0.0, 100.0, 30.0, -30.0);
        let b = GeoTransform::new(0.0 + 1e-12, 100.0, 30.0, -30.0);
        let c = GeoTransform::new(15.0, 100.0, 30.0, -30.0);
        assert!(a.same_lattice(&b));
        assert!(!a.same_lattice(&c));
    }
}
