//! TF-IDF term weighting over word n-grams.
//!
//! - term frequency is the raw count of a term in a document
//! - `idf(t) = ln((1 + n) / (1 + df(t))) + 1` (smoothed, never zero)
//! - the vocabulary keeps the `max_features` terms with the highest corpus-wide
//!   count, ties broken alphabetically, and is then numbered alphabetically
//! - every document row is L2-normalized, so cosine similarity is a dot product
use std::collections::{BTreeMap, HashMap};

use kbqa_core::config::IndexSettings;
use kbqa_text::{ngrams, Tokenizer};
use tracing::debug;

/// Non-zero weights sorted by term id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(u32, f32)>,
}

impl SparseVector {
    fn from_weights(mut weights: Vec<(u32, f64)>) -> Self {
        weights.sort_by_key(|(id, _)| *id);
        let norm = weights.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Self::default();
        }
        Self { entries: weights.into_iter().map(|(id, w)| (id, (w / norm) as f32)).collect() }
    }

    pub fn entries(&self) -> &[(u32, f32)] { &self.entries }
    pub fn is_zero(&self) -> bool { self.entries.is_empty() }

    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j, mut sum) = (0usize, 0usize, 0f32);
        while i < self.entries.len() && j < other.entries.len() {
            let (a, wa) = self.entries[i];
            let (b, wb) = other.entries[j];
            match a.cmp(&b) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += wa * wb;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Immutable term-weight matrix. Queries are projected onto the fitted vocabulary
/// and can never extend it.
#[derive(Clone)]
pub struct TfIdfIndex {
    vocabulary: Vec<String>,
    term_ids: HashMap<String, u32>,
    idf: Vec<f64>,
    rows: Vec<SparseVector>,
    ngram_range: (usize, usize),
    tokenizer: Tokenizer,
}

impl std::fmt::Debug for TfIdfIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfIndex")
            .field("terms", &self.vocabulary.len())
            .field("rows", &self.rows.len())
            .field("ngram_range", &self.ngram_range)
            .finish()
    }
}

impl TfIdfIndex {
    /// Returns `None` for an empty corpus or one without a single indexable term.
    pub fn build(documents: &[String], settings: &IndexSettings) -> Option<Self> {
        if documents.is_empty() {
            return None;
        }
        let tokenizer = Tokenizer::new();
        let ngram_range = (settings.ngram_min, settings.ngram_max);
        let doc_terms: Vec<Vec<String>> = documents
            .iter()
            .map(|d| ngrams(&tokenizer.tokens(d), ngram_range.0, ngram_range.1))
            .collect();

        // term -> (corpus-wide count, document frequency); BTreeMap keeps alphabetical order
        let mut stats: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
        for terms in &doc_terms {
            let mut seen: HashMap<&str, ()> = HashMap::new();
            for t in terms {
                let entry = stats.entry(t.as_str()).or_insert((0, 0));
                entry.0 += 1;
                if seen.insert(t.as_str(), ()).is_none() {
                    entry.1 += 1;
                }
            }
        }
        if stats.is_empty() {
            return None;
        }

        let mut ranked: Vec<(&str, u64, u64)> = stats.into_iter().map(|(t, (c, df))| (t, c, df)).collect();
        if ranked.len() > settings.max_features {
            // stable: equal counts stay in alphabetical order
            ranked.sort_by(|a, b| b.1.cmp(&a.1));
            ranked.truncate(settings.max_features);
            ranked.sort_by(|a, b| a.0.cmp(b.0));
        }

        let n = documents.len() as f64;
        let mut vocabulary = Vec::with_capacity(ranked.len());
        let mut term_ids = HashMap::with_capacity(ranked.len());
        let mut idf = Vec::with_capacity(ranked.len());
        for (id, (term, _, df)) in ranked.into_iter().enumerate() {
            vocabulary.push(term.to_string());
            term_ids.insert(term.to_string(), id as u32);
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
        }

        let mut index = Self { vocabulary, term_ids, idf, rows: Vec::new(), ngram_range, tokenizer };
        index.rows = doc_terms.iter().map(|terms| index.weigh(terms)).collect();
        debug!(terms = index.vocabulary.len(), rows = index.rows.len(), "tf-idf index built");
        Some(index)
    }

    pub fn vocabulary(&self) -> &[String] { &self.vocabulary }
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
    pub fn row(&self, i: usize) -> Option<&SparseVector> { self.rows.get(i) }

    /// Project already-normalized text onto the vocabulary. Unknown terms are dropped.
    pub fn transform(&self, text: &str) -> SparseVector {
        let terms = ngrams(&self.tokenizer.tokens(text), self.ngram_range.0, self.ngram_range.1);
        self.weigh(&terms)
    }

    /// Cosine similarity of `query` against every row, in row order.
    pub fn similarities(&self, query: &SparseVector) -> Vec<f32> {
        self.rows.iter().map(|row| row.dot(query)).collect()
    }

    fn weigh(&self, terms: &[String]) -> SparseVector {
        let mut counts: HashMap<u32, u32> = HashMap::new();
        for t in terms {
            if let Some(&id) = self.term_ids.get(t) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        SparseVector::from_weights(counts.into_iter().map(|(id, c)| (id, c as f64 * self.idf[id as usize])).collect())
    }
}
