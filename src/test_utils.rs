//! Shared helpers for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::embeddings::Embedder;
use crate::{QaError, Result};

pub const TEST_DIMENSION: usize = 128;

/// Bag-of-words embedder with a growing vocabulary.
///
/// Every distinct lowercase word gets its own axis, so texts sharing words
/// end up closer in L2 distance than texts that share none.
#[derive(Default)]
pub struct VocabularyEmbedder {
    vocabulary: Mutex<HashMap<String, usize>>,
}

impl VocabularyEmbedder {
    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vocabulary = self
            .vocabulary
            .lock()
            .map_err(|_| QaError::Embedding("vocabulary lock poisoned".to_string()))?;
        let mut vector = vec![0.0_f32; TEST_DIMENSION];

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let next = vocabulary.len();
            let axis = *vocabulary.entry(word.to_lowercase()).or_insert(next);
            if axis >= TEST_DIMENSION {
                return Err(QaError::Embedding("vocabulary exhausted".to_string()));
            }
            vector[axis] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }
}

impl Embedder for VocabularyEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_one(t)).collect()
    }

    fn model_name(&self) -> &str {
        "vocabulary"
    }
}

/// Embedder that always fails, for exercising error paths.
pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(QaError::Embedding("model unavailable".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}
