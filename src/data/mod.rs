pub mod batch;
pub mod loader;
pub mod mnist;

pub use batch::{MnistBatch, MnistBatcher, MnistItem};
pub use loader::{BatchIter, DataLoader, IndexedItems};
pub use mnist::{HEIGHT, MnistDataset, MnistSplit, NUM_CLASSES, NUM_FEATURES, WIDTH};
