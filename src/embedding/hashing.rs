//! Deterministic feature-hashing embedder.
//!
//! Each lower-cased alphanumeric token is hashed with 64-bit FNV-1a. The low
//! bits pick a bucket, the top bit picks a sign, and the accumulated vector is
//! L2-normalized. No model or vocabulary is needed, so the same text always
//! maps to the same vector. Useful offline and in tests.

use crate::embedding::text_embedder::TextEmbedder;
use crate::error::{Result, ShotpickError};
use crate::vector::similarity;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Bag-of-words embedder using the hashing trick.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(ShotpickError::invalid_config(
                "Embedding dimension must be > 0",
            ));
        }
        Ok(Self { dimension })
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimension];
        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
        {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        similarity::normalized(&vector)
    }
}

impl TextEmbedder for HashingEmbedder {
    fn embed_text(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed(text)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "hashing"
    }
}
