//! Color clustering by k-means, backed by the `kmeans_colors` crate.
//!
//! Colors are clustered as [`Srgb`] values with k-means++ initialisation. The
//! random number generator is seeded explicitly, so a given seed always gives
//! the same clustering.

use crate::cluster::{Clusterer, Clustering};
use crate::error::{Error, Result};
use kmeans_colors::get_kmeans;
use log::debug;
use palette::Srgb;
use std::collections::HashMap;

/// Cluster labels are stored as `u8`.
pub const MAX_CLUSTERS: usize = 256;

/// The options for k-means clustering.
///
/// # Examples
///
/// ```
/// # use colorcut::KMeans;
/// let _ = KMeans::new().max_iterations(50).tolerance(1e-6);
/// ```
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeans {
    /// The maximum number of iterations.
    max_iterations: usize,
    /// Stop once the centroids move less than this in total.
    tolerance: f32,
}

impl KMeans {
    #[inline]
    pub const fn new() -> Self {
        Self {
            max_iterations: 300,
            tolerance: 1e-4,
        }
    }

    /// Sets the maximum number of iterations. The default is `300`.
    #[inline]
    pub const fn max_iterations(self, max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }

    /// Sets the convergence threshold on the summed centroid movement between
    /// two iterations. The default is `1e-4`.
    #[inline]
    pub const fn tolerance(self, tolerance: f32) -> Self {
        Self { tolerance, ..self }
    }

    #[inline]
    pub const fn get_max_iterations(&self) -> usize {
        self.max_iterations
    }

    #[inline]
    pub const fn get_tolerance(&self) -> f32 {
        self.tolerance
    }
}

impl Default for KMeans {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Clusterer for KMeans {
    fn cluster(&self, colors: &[[f32; 3]], k: usize, seed: u64) -> Result<Clustering> {
        let max = colors.len().min(MAX_CLUSTERS);
        if k < 1 || k > max {
            return Err(Error::InvalidArgument {
                name: "cluster count",
                value: k,
                expected: format!("a value in 1..={max}"),
            });
        }

        // with no more distinct colors than clusters every color is its own centroid
        let (distinct, labels) = distinct_colors(colors);
        if distinct.len() <= k {
            let mut centroids = distinct;
            centroids.resize(k, centroids[0]);
            return Ok(Clustering { labels, centroids });
        }

        let buf: Vec<Srgb> = colors.iter().map(|&[r, g, b]| Srgb::new(r, g, b)).collect();
        let result = get_kmeans(k, self.max_iterations, self.tolerance, false, &buf, seed);
        debug!("kmeans: k = {k}, score {}", result.score);

        Ok(Clustering {
            labels: result.indices.iter().map(|&i| usize::from(i)).collect(),
            centroids: result
                .centroids
                .iter()
                .map(|c| [c.red, c.green, c.blue])
                .collect(),
        })
    }
}

/// Distinct colors in order of first appearance, and the index of each input
/// color among them.
fn distinct_colors(colors: &[[f32; 3]]) -> (Vec<[f32; 3]>, Vec<usize>) {
    let mut index = HashMap::new();
    let mut distinct = Vec::new();
    let labels = colors
        .iter()
        .map(|&color| {
            *index.entry(color.map(f32::to_bits)).or_insert_with(|| {
                distinct.push(color);
                distinct.len() - 1
            })
        })
        .collect();
    (distinct, labels)
}
