//! Append-only nearest-neighbour index and the slot to candidate mapping

use crate::error::{Result, SkillMatchError};

/// One search hit. `slot` is `None` when the index had nothing to return
/// for this rank (FAISS reports these as `-1`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub similarity: f32,
    pub slot: Option<usize>,
}

/// Append-only vector store.
///
/// `add` hands out slots in call order starting at zero and never reuses
/// them; there is no delete or update path.
pub trait VectorIndex: Send + Sync {
    fn add(&mut self, vector: Vec<f32>) -> Result<usize>;

    /// Up to `k` hits ordered by descending similarity.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exact cosine-similarity index held in memory.
#[derive(Debug, Default)]
pub struct FlatIndex {
    dimension: Option<usize>,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: Some(dimension),
            vectors: Vec::new(),
        }
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    fn check_dimension(&self, actual: usize) -> Result<()> {
        match self.dimension {
            Some(expected) if expected != actual => Err(SkillMatchError::DimensionMismatch { expected, actual }),
            _ => Ok(()),
        }
    }
}

impl VectorIndex for FlatIndex {
    fn add(&mut self, vector: Vec<f32>) -> Result<usize> {
        if vector.is_empty() {
            return Err(SkillMatchError::InvalidInput("Cannot index an empty vector".to_string()));
        }
        self.check_dimension(vector.len())?;
        self.dimension.get_or_insert(vector.len());

        self.vectors.push(vector);
        Ok(self.vectors.len() - 1)
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.check_dimension(query.len())?;

        let mut hits: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(slot, vector)| Neighbor {
                similarity: cosine_similarity(query, vector),
                slot: Some(slot),
            })
            .collect();

        // stable: equal similarities keep insertion order
        hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        hits.truncate(k);
        while hits.len() < k {
            hits.push(Neighbor {
                similarity: f32::NEG_INFINITY,
                slot: None,
            });
        }

        Ok(hits)
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }
}

/// Cosine similarity; 0.0 for mismatched, empty or zero-norm vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// Arena mapping index slots to candidate ids. Slot `n` is the `n`-th
/// recorded candidate; entries are never removed.
#[derive(Debug, Default, Clone)]
pub struct SlotMap {
    candidate_ids: Vec<String>,
}

impl SlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_slot(&self) -> usize {
        self.candidate_ids.len()
    }

    pub fn record(&mut self, slot: usize, candidate_id: impl Into<String>) -> Result<()> {
        let expected = self.next_slot();
        if slot != expected {
            return Err(SkillMatchError::IndexInconsistent { expected, actual: slot });
        }
        self.candidate_ids.push(candidate_id.into());
        Ok(())
    }

    pub fn candidate_id(&self, slot: usize) -> Option<&str> {
        self.candidate_ids.get(slot).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.candidate_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidate_ids.is_empty()
    }
}
