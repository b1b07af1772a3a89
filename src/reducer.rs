use crate::cluster::{ClusterQuantizer, DEFAULT_SEED};
use crate::error::{Error, Result};
use crate::median_cut::MedianCutQuantizer;
use crate::pixel_buffer::{ColorArray, PixelBuffer};
use crate::Quantizer;
use image::ImageReader;
use log::debug;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A quantization strategy.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    MedianCut,
    #[default]
    Cluster,
}

impl Method {
    pub const fn name(self) -> &'static str {
        match self {
            Method::MedianCut => "median_cut",
            Method::Cluster => "cluster",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "median_cut" => Ok(Method::MedianCut),
            "cluster" | "kmeans" => Ok(Method::Cluster),
            _ => Err(Error::Configuration(s.to_string())),
        }
    }
}

/// Everything [`ColorReducer::reduce`] needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReduceOptions {
    pub method: Method,
    /// Exact cluster count, or `2^floor(log2(n_colors))` colors for median cut.
    pub n_colors: usize,
    /// Only used by [`Method::Cluster`].
    pub seed: u64,
    /// Only used by [`Method::MedianCut`].
    pub parallel: bool,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        Self {
            method: Method::default(),
            n_colors: 8,
            seed: DEFAULT_SEED,
            parallel: false,
        }
    }
}

/// Reduces the colors of one image with a strategy chosen by name.
///
/// ```
/// # use colorcut::{ColorArray, ColorReducer};
/// let array = ColorArray::new([1, 2, 3], vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
/// let reducer = ColorReducer::from_array(array).unwrap();
/// let reduced = reducer.aggregate("median_cut", 1).unwrap();
/// assert_eq!(reduced.get(0, 0), [0.5, 0.5, 0.5]);
/// ```
#[derive(Debug, Clone)]
pub struct ColorReducer {
    buffer: PixelBuffer,
    seed: u64,
    parallel: bool,
}

impl ColorReducer {
    pub fn new(buffer: PixelBuffer) -> Self {
        Self {
            buffer,
            seed: DEFAULT_SEED,
            parallel: false,
        }
    }

    pub fn from_array(array: ColorArray) -> Result<Self> {
        Ok(Self::new(PixelBuffer::from_source(array)?))
    }

    /// Decodes the image at `path`. Channel values end up in `0.0..=1.0`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        Ok(Self::new(PixelBuffer::from_image(&img)))
    }

    pub fn seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }

    pub fn parallel(self, parallel: bool) -> Self {
        Self { parallel, ..self }
    }

    #[inline]
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Reduces the image with the method named `method`, either `"median_cut"`
    /// or `"cluster"`.
    pub fn aggregate(&self, method: &str, n_colors: usize) -> Result<PixelBuffer> {
        self.aggregate_with(method.parse()?, n_colors)
    }

    pub fn aggregate_with(&self, method: Method, n_colors: usize) -> Result<PixelBuffer> {
        debug!(
            "reduce: {method}, {n_colors} colors, {}x{} image",
            self.buffer.width(),
            self.buffer.height()
        );
        match method {
            Method::MedianCut => MedianCutQuantizer::new()
                .parallel(self.parallel)
                .quantize(&self.buffer, n_colors),
            Method::Cluster => ClusterQuantizer::kmeans()
                .seed(self.seed)
                .quantize(&self.buffer, n_colors),
        }
    }

    /// Like [`aggregate`](Self::aggregate), returning the plain array form.
    pub fn aggregate_array(&self, method: &str, n_colors: usize) -> Result<ColorArray> {
        Ok(self.aggregate(method, n_colors)?.to_array())
    }

    /// Reduces the image with every setting taken from `options`.
    pub fn reduce(&self, options: &ReduceOptions) -> Result<PixelBuffer> {
        self.clone()
            .seed(options.seed)
            .parallel(options.parallel)
            .aggregate_with(options.method, options.n_colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reducer() -> ColorReducer {
        let data = (0..16 * 3).map(|v| (v * 5 % 97) as f32).collect();
        ColorReducer::from_array(ColorArray::new([4, 4, 3], data)).unwrap()
    }

    #[test]
    fn parses_method_names() {
        assert_eq!("median_cut".parse::<Method>().unwrap(), Method::MedianCut);
        assert_eq!("cluster".parse::<Method>().unwrap(), Method::Cluster);
        assert_eq!("kmeans".parse::<Method>().unwrap(), Method::Cluster);
        assert_eq!(Method::MedianCut.to_string(), "median_cut");
    }

    #[test]
    fn unknown_method_lists_valid_ones() {
        let err = reducer().aggregate("octree", 4).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref name) if name == "octree"));
        let message = err.to_string();
        assert!(message.contains("median_cut"));
        assert!(message.contains("cluster"));
    }

    #[test]
    fn dispatches_to_median_cut() {
        let reducer = reducer();
        let expected = MedianCutQuantizer::new()
            .quantize(reducer.buffer(), 4)
            .unwrap();
        assert_eq!(reducer.aggregate("median_cut", 4).unwrap(), expected);
        assert_eq!(
            reducer.aggregate_array("median_cut", 4).unwrap(),
            expected.to_array()
        );
    }

    #[test]
    fn dispatches_to_cluster_with_seed() {
        let reducer = reducer().seed(5);
        let expected = ClusterQuantizer::kmeans()
            .seed(5)
            .quantize(reducer.buffer(), 3)
            .unwrap();
        assert_eq!(reducer.aggregate("cluster", 3).unwrap(), expected);
    }

    #[test]
    fn reduce_uses_options() {
        let reducer = reducer();
        let options = ReduceOptions {
            method: Method::MedianCut,
            n_colors: 2,
            parallel: true,
            ..ReduceOptions::default()
        };
        let out = reducer.reduce(&options).unwrap();
        assert_eq!(out, reducer.aggregate("median_cut", 2).unwrap());
        assert!(out.palette().len() <= 2);
    }

    #[test]
    fn open_missing_file_fails() {
        assert!(matches!(
            ColorReducer::open("does/not/exist.png"),
            Err(Error::Io(_))
        ));
    }
}
