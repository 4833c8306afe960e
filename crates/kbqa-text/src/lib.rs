//! kbqa-text
//!
//! Lexical side of the engine: tokenization, ordered synonym folding and
//! rule-based entity extraction. Domain word lists live in `lexicon` and can
//! be replaced by TOML files at runtime.
pub mod entities;
pub mod lexicon;
pub mod normalize;
pub mod tokenize;

pub use entities::EntityExtractor;
pub use lexicon::{KeywordGroup, Lexicon};
pub use normalize::{Normalizer, SynonymRule};
pub use tokenize::{ngrams, Tokenizer};
