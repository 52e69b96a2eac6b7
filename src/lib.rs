pub mod backend;
pub mod data;
pub mod error;
pub mod model;
pub mod training;

pub mod prelude {
    pub use crate::data::{
        DataLoader, MnistBatch, MnistBatcher, MnistDataset, MnistItem, MnistSplit,
    };
    pub use crate::error::DatasetError;
    pub use crate::model::{
        Architecture, Classifier, ConvNet, ConvNetConfig, ParamSummary, TinyMlp, TinyMlpConfig,
    };
    pub use crate::training::{TrainingConfig, TrainingReport, train, train_step};
}
