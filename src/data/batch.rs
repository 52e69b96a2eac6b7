use crate::data::mnist::NUM_FEATURES;
use burn::data::dataloader::batcher::Batcher;
use burn::prelude::*;
use serde::{Deserialize, Serialize};

/// MNIST item.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MnistItem {
    /// Image as a flat array of floats.
    /// Each value is a brightness, in between 0.0 and 1.0.
    ///
    /// # Shape
    /// [WIDTH * HEIGHT]
    pub image: Vec<f32>,

    /// Label of the image.
    /// Each value is in between 0 and 9.
    pub label: u8,
}

#[derive(Clone, Default)]
pub struct MnistBatcher {}

#[derive(Clone, Debug)]
pub struct MnistBatch<B: Backend> {
    /// Brightness in [0, 1].
    ///
    /// # Shape
    /// [batch_size, WIDTH * HEIGHT]
    pub images: Tensor<B, 2>,
    /// # Shape
    /// [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

impl<B: Backend> Batcher<B, MnistItem, MnistBatch<B>> for MnistBatcher {
    fn batch(&self, items: Vec<MnistItem>, device: &B::Device) -> MnistBatch<B> {
        let batch_size = items.len();

        let (items_image, items_label): (Vec<_>, Vec<_>) = items
            .into_iter()
            .map(|item| (item.image, i64::from(item.label)))
            .unzip();

        let images = TensorData::new(items_image.concat(), [batch_size, NUM_FEATURES])
            .convert::<B::FloatElem>();
        let images = Tensor::<B, 2>::from_data(images, device);

        let targets = TensorData::new(items_label, [batch_size]).convert::<B::IntElem>();
        let targets = Tensor::<B, 1, Int>::from_data(targets, device);

        MnistBatch { images, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn batch_has_expected_shapes() {
        let device = Default::default();
        let items = vec![
            MnistItem {
                image: vec![0.5; NUM_FEATURES],
                label: 7,
            },
            MnistItem {
                image: vec![0.25; NUM_FEATURES],
                label: 2,
            },
        ];

        let batch: MnistBatch<TestBackend> = MnistBatcher::default().batch(items, &device);
        assert_eq!(batch.images.dims(), [2, NUM_FEATURES]);
        assert_eq!(batch.targets.dims(), [2]);

        let targets = batch.targets.into_data().convert::<i64>().to_vec::<i64>().unwrap();
        assert_eq!(targets, vec![7, 2]);
        let images = batch.images.into_data().to_vec::<f32>().unwrap();
        assert_eq!(images[0], 0.5);
        assert_eq!(images[NUM_FEATURES], 0.25);
    }
}
