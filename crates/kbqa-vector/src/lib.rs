//! kbqa-vector
//!
//! Sparse TF-IDF index over a normalized corpus, cosine ranking against it, and
//! the snapshot holder that republishes a fresh index whenever records change.
pub mod cache;
pub mod corpus;
pub mod ranker;
pub mod snapshot;
pub mod tfidf;

pub use cache::QueryCache;
pub use corpus::Corpus;
pub use ranker::{select_candidates, Candidate, SimilarityRanker};
pub use snapshot::{RebuildableIndex, Snapshot};
pub use tfidf::{SparseVector, TfIdfIndex};
