use crate::error::{Error, Result};
use crate::kmeans::KMeans;
use crate::pixel_buffer::PixelBuffer;
use crate::Quantizer;
use log::debug;

/// The seed used when none is given.
pub const DEFAULT_SEED: u64 = 42;

/// The result of grouping colors: `labels[i]` is the index into `centroids`
/// that `colors[i]` was assigned to.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    pub labels: Vec<usize>,
    pub centroids: Vec<[f32; 3]>,
}

/// A centroid clustering capability.
///
/// Implementations must be deterministic for a fixed `seed`, return one label
/// per color, and return `k` centroids for any `k` they accept.
pub trait Clusterer {
    fn cluster(&self, colors: &[[f32; 3]], k: usize, seed: u64) -> Result<Clustering>;
}

/// Replaces every pixel with the centroid of the cluster it falls in.
#[derive(Debug, Clone, Copy)]
pub struct ClusterQuantizer<C = KMeans> {
    clusterer: C,
    seed: u64,
}

impl ClusterQuantizer<KMeans> {
    pub fn kmeans() -> Self {
        Self::new(KMeans::new())
    }
}

impl Default for ClusterQuantizer<KMeans> {
    fn default() -> Self {
        Self::kmeans()
    }
}

impl<C: Clusterer> ClusterQuantizer<C> {
    pub fn new(clusterer: C) -> Self {
        Self {
            clusterer,
            seed: DEFAULT_SEED,
        }
    }

    pub fn seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }

    pub fn get_seed(&self) -> u64 {
        self.seed
    }
}

impl<C: Clusterer> Quantizer for ClusterQuantizer<C> {
    /// `k` must be in `1..=buffer.len()`.
    fn quantize(&self, buffer: &PixelBuffer, k: usize) -> Result<PixelBuffer> {
        let pixels = buffer.len();
        if k < 1 || k > pixels {
            return Err(Error::InvalidArgument {
                name: "cluster count",
                value: k,
                expected: format!("a value in 1..={pixels}"),
            });
        }
        let Clustering { labels, centroids } =
            self.clusterer.cluster(&buffer.colors(), k, self.seed)?;
        debug!("cluster: {pixels} pixels, {} centroids", centroids.len());
        Ok(buffer.map_pixels(|i, _| centroids[labels[i]]))
    }
}
