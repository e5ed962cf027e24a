//! Raster data structures and horizontal resampling

mod element;
mod extent;
mod geotransform;
mod grid;
mod resample;

pub use element::RasterElement;
pub use extent::Extent;
pub use geotransform::GeoTransform;
pub use grid::Raster;
pub use resample::ResamplingMethod;
