//! BM25 term weighting.
//!
//! ```text
//! IDF(t)  = ln(1 + (N - df + 0.5) / (df + 0.5))
//! score_t = IDF(t) * tf * (k1 + 1) / (tf + k1 * (1 - b + b * |d| / avgdl))
//! ```
//!
//! `N`, `df`, `|d|` and `avgdl` are all taken from the field being scored.

use serde::{Deserialize, Serialize};

use crate::error::{Result, XiphosError};

/// BM25 parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    /// Term frequency saturation.
    pub k1: f64,
    /// Length normalization strength, 0 (none) to 1 (full).
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Bm25Params { k1: 1.2, b: 0.75 }
    }
}

impl Bm25Params {
    pub fn new(k1: f64, b: f64) -> Result<Self> {
        let params = Bm25Params { k1, b };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(XiphosError::invalid_config(format!(
                "BM25 k1 must be a non-negative number, got {}",
                self.k1
            )));
        }
        if !self.b.is_finite() || !(0.0..=1.0).contains(&self.b) {
            return Err(XiphosError::invalid_config(format!(
                "BM25 b must be within [0, 1], got {}",
                self.b
            )));
        }
        Ok(())
    }

    /// Contribution of one term occurring `tf` times in a field of
    /// `doc_length` tokens.
    pub fn term_score(&self, idf: f64, tf: u32, doc_length: u32, avg_length: f64) -> f64 {
        if tf == 0 {
            return 0.0;
        }
        let tf = f64::from(tf);
        let relative_length = if avg_length > 0.0 {
            f64::from(doc_length) / avg_length
        } else {
            1.0
        };
        let norm = 1.0 - self.b + self.b * relative_length;
        idf * tf * (self.k1 + 1.0) / (tf + self.k1 * norm)
    }
}

/// Inverse document frequency with the `1 +` smoothing that keeps it
/// positive for terms in more than half of the documents.
pub fn idf(doc_count: u64, doc_freq: u64) -> f64 {
    let n = doc_count as f64;
    let df = doc_freq as f64;
    (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
}
