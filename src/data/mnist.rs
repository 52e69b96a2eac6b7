use crate::data::batch::MnistItem;
use crate::error::DatasetError;
use burn_common::network::downloader::download_file_as_bytes;
use burn_dataset::Dataset;
use flate2::read::GzDecoder;
use num_traits::AsPrimitive;
use std::fs::{self, File, create_dir_all};
use std::io::Read;
use std::path::{Path, PathBuf};

// CVDF mirror of http://yann.lecun.com/exdb/mnist/
const URL: &str = "https://storage.googleapis.com/cvdf-datasets/mnist/";
const TRAIN_IMAGES: &str = "train-images-idx3-ubyte.gz";
const TRAIN_LABELS: &str = "train-labels-idx1-ubyte.gz";
const TEST_IMAGES: &str = "t10k-images-idx3-ubyte.gz";
const TEST_LABELS: &str = "t10k-labels-idx1-ubyte.gz";

const IMAGES_MAGIC: u32 = 0x0000_0803;
const LABELS_MAGIC: u32 = 0x0000_0801;

pub const WIDTH: usize = 28;
pub const HEIGHT: usize = 28;
/// Length of a flattened image.
pub const NUM_FEATURES: usize = WIDTH * HEIGHT;
pub const NUM_CLASSES: usize = 10;

/// Default cache location, `~/.cache/mnist-burn`.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".cache").join("mnist-burn"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// One split of the dataset, held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct MnistSplit {
    /// Flattened images, row-major.
    /// Each value is a brightness, in between 0.0 and 1.0.
    ///
    /// # Shape
    /// [len * WIDTH * HEIGHT]
    images: Vec<f32>,
    /// Each value is in between 0 and 9.
    ///
    /// # Shape
    /// [len]
    labels: Vec<u8>,
}

impl MnistSplit {
    pub fn new(images: Vec<f32>, labels: Vec<u8>) -> Result<Self, DatasetError> {
        if images.len() != labels.len() * NUM_FEATURES {
            return Err(DatasetError::ShapeMismatch {
                images: images.len(),
                labels: labels.len(),
            });
        }
        if let Some((index, &label)) = labels
            .iter()
            .enumerate()
            .find(|(_, label)| **label as usize >= NUM_CLASSES)
        {
            return Err(DatasetError::InvalidLabel { index, label });
        }
        Ok(Self { images, labels })
    }
}

impl Dataset<MnistItem> for MnistSplit {
    fn get(&self, index: usize) -> Option<MnistItem> {
        let label = *self.labels.get(index)?;
        let image = self.images[index * NUM_FEATURES..(index + 1) * NUM_FEATURES].to_vec();
        Some(MnistItem { image, label })
    }

    fn len(&self) -> usize {
        self.labels.len()
    }
}

/// The MNIST dataset consists of 70,000 28x28 black-and-white images in 10 classes (one for each digits).
/// There are 60,000 training images and 10,000 test images.
///
/// The data is downloaded from the [CVDF mirror](https://github.com/cvdfoundation/mnist)
/// and kept gzip-compressed in the cache directory.
#[derive(Debug, Clone)]
pub struct MnistDataset {
    pub train: MnistSplit,
    pub test: MnistSplit,
}

impl MnistDataset {
    /// Downloads the missing files into `<data_dir>/mnist` and decodes both splits.
    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self, DatasetError> {
        let dir = MnistDataset::download(data_dir.as_ref())?;
        MnistDataset::from_dir(&dir)
    }

    /// Decodes both splits from a directory already holding the four compressed files.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, DatasetError> {
        let dir = dir.as_ref();
        let train = read_split(&dir.join(TRAIN_IMAGES), &dir.join(TRAIN_LABELS))?;
        let test = read_split(&dir.join(TEST_IMAGES), &dir.join(TEST_LABELS))?;
        log::info!(
            "loaded mnist from {dir:?}: {} train, {} test examples",
            train.len(),
            test.len()
        );
        Ok(Self { train, test })
    }

    fn download(data_dir: &Path) -> Result<PathBuf, DatasetError> {
        let dir = data_dir.join("mnist");
        if !dir.exists() {
            create_dir_all(&dir)?;
        }

        for name in [TRAIN_IMAGES, TRAIN_LABELS, TEST_IMAGES, TEST_LABELS] {
            MnistDataset::download_file(name, &dir)?;
        }

        Ok(dir)
    }

    /// Download a file from the MNIST dataset URL to the destination directory, unless already cached.
    /// Panics if the download cannot be completed.
    fn download_file(name: &str, dest_dir: &Path) -> Result<PathBuf, DatasetError> {
        let file_name = dest_dir.join(name);

        if file_name.exists() {
            log::debug!("using cached {file_name:?}");
        } else {
            log::info!("downloading {URL}{name}");
            let bytes = download_file_as_bytes(&format!("{URL}{name}"), name);
            // only complete downloads reach the disk
            fs::write(&file_name, bytes)?;
        }

        Ok(file_name)
    }
}

fn read_split(images_path: &Path, labels_path: &Path) -> Result<MnistSplit, DatasetError> {
    let images = read_images(images_path)?;
    let labels = read_labels(labels_path)?;
    MnistSplit::new(images, labels)
}

fn read_gz(path: &Path) -> Result<Vec<u8>, DatasetError> {
    let mut bytes = Vec::new();
    GzDecoder::new(File::open(path)?).read_to_end(&mut bytes)?;
    Ok(bytes)
}

fn read_u32(bytes: &[u8], offset: usize, path: &Path) -> Result<u32, DatasetError> {
    bytes
        .get(offset..offset + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_be_bytes)
        .ok_or_else(|| DatasetError::Truncated { path: path.into() })
}

fn check_magic(bytes: &[u8], expected: u32, path: &Path) -> Result<(), DatasetError> {
    let found = read_u32(bytes, 0, path)?;
    if found != expected {
        return Err(DatasetError::BadMagic {
            path: path.into(),
            expected,
            found,
        });
    }
    Ok(())
}

/// Reads a gzip-compressed IDX image file, scaling brightness into [0, 1].
fn read_images(path: &Path) -> Result<Vec<f32>, DatasetError> {
    let bytes = read_gz(path)?;
    check_magic(&bytes, IMAGES_MAGIC, path)?;

    // 16-byte header: magic, count, rows, cols
    let size = read_u32(&bytes, 4, path)? as usize;
    let rows = read_u32(&bytes, 8, path)? as usize;
    let cols = read_u32(&bytes, 12, path)? as usize;
    if rows != HEIGHT || cols != WIDTH {
        return Err(DatasetError::UnexpectedImageSize { rows, cols });
    }

    let pixels = bytes
        .get(16..16 + size * NUM_FEATURES)
        .ok_or_else(|| DatasetError::Truncated { path: path.into() })?;

    Ok(pixels
        .iter()
        .map(|brightness| {
            let value: f32 = (*brightness).as_();
            value / 255.0
        })
        .collect())
}

/// Reads a gzip-compressed IDX label file.
fn read_labels(path: &Path) -> Result<Vec<u8>, DatasetError> {
    let bytes = read_gz(path)?;
    check_magic(&bytes, LABELS_MAGIC, path)?;

    // 8-byte header: magic, count
    let size = read_u32(&bytes, 4, path)? as usize;
    let labels = bytes
        .get(8..8 + size)
        .ok_or_else(|| DatasetError::Truncated { path: path.into() })?;

    Ok(labels.to_vec())
}
