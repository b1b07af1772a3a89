//! Color reduction for images held as `H x W x 3` float grids.
//!
//! Two strategies are provided: [`MedianCutQuantizer`], which recursively
//! splits the pixels along their widest channel, and [`ClusterQuantizer`],
//! which hands palette selection to a [`Clusterer`] such as [`KMeans`].
//! [`ColorReducer`] picks one of them by name.

mod cluster;
mod error;
mod kmeans;
mod median_cut;
mod pixel_buffer;
mod reducer;
mod stack;

pub use cluster::{ClusterQuantizer, Clusterer, Clustering, DEFAULT_SEED};
pub use error::{Error, Result};
pub use kmeans::KMeans;
pub use median_cut::{depth_for, MedianCutQuantizer};
pub use pixel_buffer::{ColorArray, PaletteEntry, PixelBuffer};
pub use reducer::{ColorReducer, Method, ReduceOptions};

/// A strategy that maps a [`PixelBuffer`] to a new buffer of the same shape
/// with fewer distinct colors.
pub trait Quantizer {
    fn quantize(&self, buffer: &PixelBuffer, n_colors: usize) -> Result<PixelBuffer>;
}
