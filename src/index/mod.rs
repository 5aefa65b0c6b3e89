// Vector index module
// Exact nearest-neighbour search over chunk embeddings


use std::cmp::Ordering;

use tracing::debug;

use crate::{QaError, Result};

/// A search hit: the insertion position of a stored vector and its squared L2 distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// Nearest-neighbour store addressed by insertion position
pub trait VectorIndex: Send + Sync {
    /// Dimension every stored and queried vector must have
    fn dimension(&self) -> usize;

    /// Number of stored vectors
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append vectors; the first gets position `len()` before the call
    fn add(&mut self, vectors: &[Vec<f32>]) -> Result<()>;

    /// Up to `k` nearest stored vectors, closest first
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;
}

/// Brute-force index using squared Euclidean distance
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    #[inline]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    /// Build an index sized from the first vector and fill it
    #[inline]
    pub fn from_vectors(vectors: &[Vec<f32>]) -> Result<Self> {
        let dimension = vectors
            .first()
            .map(Vec::len)
            .ok_or_else(|| QaError::Index("cannot build an index from no vectors".to_string()))?;
        if dimension == 0 {
            return Err(QaError::Index("vectors must not be empty".to_string()));
        }

        let mut index = Self::new(dimension);
        index.add(vectors)?;
        Ok(index)
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() == self.dimension {
            Ok(())
        } else {
            Err(QaError::Index(format!(
                "dimension mismatch: expected {}, got {}",
                self.dimension,
                vector.len()
            )))
        }
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl VectorIndex for FlatL2Index {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    fn add(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        // Validate the whole batch first so a bad vector leaves the index untouched
        for vector in vectors {
            self.check_dimension(vector)?;
        }

        self.data.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            self.data.extend_from_slice(vector);
        }

        debug!("Index now holds {} vectors", self.len());
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.check_dimension(query)?;

        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut neighbors: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, stored)| Neighbor {
                position,
                distance: squared_l2(stored, query),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then(a.position.cmp(&b.position))
        });
        neighbors.truncate(k);

        Ok(neighbors)
    }
}
