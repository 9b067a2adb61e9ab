use burn::data::dataset::Dataset;

use crate::data::vectorizer::Vectorized;
use crate::domain::sample::VectorizedSample;

/// Vectorized samples behind Burn's Dataset trait, so an external
/// training loop can wrap them in a DataLoader.
pub struct SampleDataset {
    samples: Vec<VectorizedSample>,
}

impl SampleDataset {
    pub fn new(samples: Vec<VectorizedSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    pub fn samples(&self) -> &[VectorizedSample] { &self.samples }
}

impl From<Vectorized> for SampleDataset {
    fn from(v: Vectorized) -> Self {
        Self::new(v.samples)
    }
}

impl Dataset<VectorizedSample> for SampleDataset {
    fn get(&self, index: usize) -> Option<VectorizedSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
