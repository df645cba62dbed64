//! Feature catalog: the input-side facts a model configuration depends on.
use ndarray::Array2;
use std::fmt;

/// Supplies the number of input feature slots and, per slot, the width of an
/// optional pretrained embedding table.
///
/// The catalog must be fully populated before a [`crate::ModelConfig`] is loaded
/// against it. If it changes afterwards, call [`crate::ModelConfig::resolve`] again.
pub trait FeatureCatalog {
    /// Number of input feature slots (N).
    fn feature_count(&self) -> usize;

    /// Native dimensionality of the pretrained embedding matrix for `slot`, if any.
    fn embedding_dim(&self, slot: usize) -> Option<usize>;
}

/// Catalog backed by embedding tables held in memory.
///
/// Each table is `[vocab_size, dim]`, so its dimensionality is the column count.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    embeddings: Vec<Option<Array2<f32>>>,
}

impl InMemoryCatalog {
    /// A catalog with `feature_count` slots and no pretrained tables.
    pub fn new(feature_count: usize) -> Self {
        Self {
            embeddings: vec![None; feature_count],
        }
    }

    /// Attach a pretrained table to `slot`, growing the slot count if needed.
    pub fn with_embeddings(mut self, slot: usize, matrix: Array2<f32>) -> Self {
        if slot >= self.embeddings.len() {
            self.embeddings.resize(slot + 1, None);
        }
        self.embeddings[slot] = Some(matrix);
        self
    }

    /// The pretrained table attached to `slot`, if any.
    pub fn embeddings(&self, slot: usize) -> Option<&Array2<f32>> {
        self.embeddings.get(slot).and_then(Option::as_ref)
    }
}

impl FeatureCatalog for InMemoryCatalog {
    fn feature_count(&self) -> usize {
        self.embeddings.len()
    }

    fn embedding_dim(&self, slot: usize) -> Option<usize> {
        self.embeddings(slot).map(|m| m.ncols())
    }
}

impl fmt::Debug for InMemoryCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shapes: Vec<Option<(usize, usize)>> = self
            .embeddings
            .iter()
            .map(|m| m.as_ref().map(|m| m.dim()))
            .collect();
        f.debug_struct("InMemoryCatalog")
            .field("embeddings", &shapes)
            .finish()
    }
}
