use std::path::PathBuf;

/// Errors raised while reading the cached MNIST files.
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad IDX magic number in {path:?}: expected {expected:#010x}, found {found:#010x}")]
    BadMagic {
        path: PathBuf,
        expected: u32,
        found: u32,
    },

    #[error("IDX file {path:?} ended before its declared content")]
    Truncated { path: PathBuf },

    #[error("unexpected image size {rows}x{cols}, only 28x28 is supported")]
    UnexpectedImageSize { rows: usize, cols: usize },

    #[error("{images} image values do not match {labels} labels")]
    ShapeMismatch { images: usize, labels: usize },

    #[error("label {label} at index {index} is not a valid class")]
    InvalidLabel { index: usize, label: u8 },
}
