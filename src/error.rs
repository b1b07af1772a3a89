use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("expected an HxWx3 color array, got shape {shape:?} holding {len} values")]
    Shape { shape: Vec<usize>, len: usize },

    #[error("invalid {name} {value}, expected {expected}")]
    InvalidArgument {
        name: &'static str,
        value: usize,
        expected: String,
    },

    #[error("unknown quantization method `{0}`, valid methods are: median_cut, cluster")]
    Configuration(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
