use kbqa_text::Normalizer;

use crate::tfidf::TfIdfIndex;

/// A corpus row whose cosine similarity cleared the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub row: usize,
    pub similarity: f32,
}

/// Keep rows scoring strictly above `threshold`, best first, at most `top_k`.
///
/// The sort is stable, so equal scores keep corpus order.
pub fn select_candidates(similarities: &[f32], threshold: f32, top_k: usize) -> Vec<Candidate> {
    let mut out: Vec<Candidate> = similarities
        .iter()
        .enumerate()
        .filter(|(_, s)| **s > threshold)
        .map(|(row, s)| Candidate { row, similarity: *s })
        .collect();
    out.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    out.truncate(top_k);
    out
}

#[derive(Debug, Clone)]
pub struct SimilarityRanker {
    normalizer: Normalizer,
    top_k: usize,
    threshold: f32,
}

impl SimilarityRanker {
    pub fn new(normalizer: Normalizer, top_k: usize, threshold: f32) -> Self {
        Self { normalizer, top_k, threshold }
    }

    pub fn top_k(&self) -> usize { self.top_k }
    pub fn threshold(&self) -> f32 { self.threshold }

    /// Normalizes `query` and ranks it against `index`. No index means no results.
    pub fn search(&self, query: &str, index: Option<&TfIdfIndex>) -> Vec<Candidate> {
        self.search_normalized(&self.normalizer.normalize(query), index)
    }

    pub fn search_normalized(&self, normalized: &str, index: Option<&TfIdfIndex>) -> Vec<Candidate> {
        let Some(index) = index else { return Vec::new() };
        let query = index.transform(normalized);
        if query.is_zero() {
            return Vec::new();
        }
        select_candidates(&index.similarities(&query), self.threshold, self.top_k)
    }
}
