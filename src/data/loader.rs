use burn_dataset::Dataset;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Mini-batch iterator over a [`Dataset`].
///
/// Each call to [`DataLoader::iter`] is a single pass covering every item exactly once.
/// When shuffling, every pass draws a fresh permutation.
pub struct DataLoader<'a, I> {
    dataset: &'a dyn Dataset<I>,
    batch_size: usize,
    shuffle: bool,
    rng: StdRng,
}

impl<'a, I> DataLoader<'a, I> {
    /// # Panics
    /// If `batch_size` is zero.
    pub fn new<D>(dataset: &'a D, batch_size: usize, shuffle: bool, seed: u64) -> Self
    where
        D: Dataset<I>,
    {
        assert!(batch_size > 0, "batch_size must be positive");
        Self {
            dataset,
            batch_size,
            shuffle,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn num_items(&self) -> usize {
        self.dataset.len()
    }

    /// `ceil(num_items / batch_size)`, the last batch may be shorter.
    pub fn num_batches(&self) -> usize {
        self.num_items().div_ceil(self.batch_size)
    }

    pub fn iter(&mut self) -> BatchIter<'a, I> {
        let mut indices: Vec<usize> = (0..self.num_items()).collect();
        if self.shuffle {
            indices.shuffle(&mut self.rng);
        }
        BatchIter {
            dataset: self.dataset,
            indices,
            batch_size: self.batch_size,
            position: 0,
        }
    }
}

/// Items of one batch, with their position in the dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexedItems<I> {
    pub indices: Vec<usize>,
    pub items: Vec<I>,
}

/// A single pass produced by [`DataLoader::iter`].
pub struct BatchIter<'a, I> {
    dataset: &'a dyn Dataset<I>,
    indices: Vec<usize>,
    batch_size: usize,
    position: usize,
}

impl<I> Iterator for BatchIter<'_, I> {
    type Item = IndexedItems<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.indices.len() {
            return None;
        }
        let end = (self.position + self.batch_size).min(self.indices.len());
        let indices = self.indices[self.position..end].to_vec();
        // indices come from 0..len, every lookup hits
        let items = indices
            .iter()
            .filter_map(|&index| self.dataset.get(index))
            .collect();
        self.position = end;
        Some(IndexedItems { indices, items })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.indices.len() - self.position).div_ceil(self.batch_size);
        (remaining, Some(remaining))
    }
}

impl<I> ExactSizeIterator for BatchIter<'_, I> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::mnist::{MnistSplit, NUM_FEATURES};
    use crate::data::{MnistBatch, MnistBatcher, MnistItem};
    use burn::backend::NdArray;
    use burn::data::dataloader::batcher::Batcher;

    fn split(len: usize) -> MnistSplit {
        let images = (0..len)
            .flat_map(|i| std::iter::repeat_n(i as f32, NUM_FEATURES))
            .collect();
        let labels = (0..len).map(|i| (i % 10) as u8).collect();
        MnistSplit::new(images, labels).unwrap()
    }

    #[test]
    fn batch_count_and_lengths() {
        for len in [0, 1, 7, 10, 64, 65] {
            let split = split(len);
            for batch_size in [1, 3, 10, 64, 100] {
                let mut loader = DataLoader::<MnistItem>::new(&split, batch_size, true, 0);
                assert_eq!(loader.batch_size(), batch_size);
                assert_eq!(loader.num_items(), len);

                let lengths: Vec<usize> = loader.iter().map(|batch| batch.items.len()).collect();

                assert_eq!(lengths.len(), len.div_ceil(batch_size));
                assert_eq!(lengths.len(), loader.num_batches());
                assert_eq!(lengths.iter().sum::<usize>(), len);
                if let Some(&last) = lengths.last() {
                    let expected = match len % batch_size {
                        0 => batch_size,
                        rest => rest,
                    };
                    assert_eq!(last, expected);
                }
            }
        }
    }

    #[test]
    fn sequential_without_shuffle() {
        let split = split(23);
        let mut loader = DataLoader::<MnistItem>::new(&split, 5, false, 0);

        let indices: Vec<usize> = loader.iter().flat_map(|batch| batch.indices).collect();
        assert_eq!(indices, (0..23).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_is_a_permutation_per_pass() {
        let split = split(50);
        let mut loader = DataLoader::<MnistItem>::new(&split, 8, true, 7);

        let mut passes = Vec::new();
        for _pass in 0..3 {
            let indices: Vec<usize> = loader.iter().flat_map(|batch| batch.indices).collect();
            let mut sorted = indices.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..50).collect::<Vec<_>>());
            passes.push(indices);
        }
        assert_ne!(passes[0], passes[1]);
        assert_ne!(passes[1], passes[2]);
    }

    #[test]
    fn images_and_labels_stay_paired() {
        let split = split(12);
        let mut loader = DataLoader::<MnistItem>::new(&split, 4, true, 3);

        for batch in loader.iter() {
            assert_eq!(batch.items.len(), batch.indices.len());
            for (item, &index) in batch.items.iter().zip(&batch.indices) {
                assert_eq!(item.label, (index % 10) as u8);
                assert_eq!(item.image, vec![index as f32; NUM_FEATURES]);
            }
        }
    }

    #[test]
    fn batches_feed_the_batcher() {
        let device = Default::default();
        let split = split(10);
        let mut loader = DataLoader::<MnistItem>::new(&split, 4, false, 0);
        let batcher = MnistBatcher::default();

        let rows: Vec<usize> = loader
            .iter()
            .map(|batch| {
                let batch: MnistBatch<NdArray> = batcher.batch(batch.items, &device);
                batch.images.dims()[0]
            })
            .collect();
        assert_eq!(rows, [4, 4, 2]);
    }

    #[test]
    fn size_hint_counts_remaining_batches() {
        let split = split(10);
        let mut loader = DataLoader::<MnistItem>::new(&split, 4, false, 0);
        let mut iter = loader.iter();

        assert_eq!(iter.len(), 3);
        iter.next();
        assert_eq!(iter.len(), 2);
    }

    #[test]
    #[should_panic(expected = "batch_size must be positive")]
    fn zero_batch_size_panics() {
        let split = split(3);
        DataLoader::<MnistItem>::new(&split, 0, false, 0);
    }
}
