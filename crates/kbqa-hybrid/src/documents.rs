//! Legal documents that traffic violations cite.
//!
//! Documents are kept in their own store and index, separate from the
//! violations the engine ranks, and resolved through `Violation::document_id`.
use kbqa_core::config::Settings;
use kbqa_core::error::Result;
use kbqa_core::records::{LegalDocument, Violation};
use kbqa_core::types::RecordId;
use kbqa_text::Normalizer;
use kbqa_vector::{RebuildableIndex, SimilarityRanker};

use crate::store::RecordStore;

pub struct LegalLibrary {
    store: RecordStore<LegalDocument>,
    ranker: SimilarityRanker,
}

impl LegalLibrary {
    pub fn new(normalizer: Normalizer, settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let index = RebuildableIndex::new(normalizer.clone(), settings.index);
        Ok(Self {
            store: RecordStore::new(index),
            ranker: SimilarityRanker::new(normalizer, settings.search.candidate_pool, settings.search.threshold),
        })
    }

    pub fn store(&self) -> &RecordStore<LegalDocument> { &self.store }
    pub fn list(&self) -> Vec<LegalDocument> { self.store.list() }
    pub fn len(&self) -> usize { self.store.len() }
    pub fn is_empty(&self) -> bool { self.store.is_empty() }

    pub fn replace_all(&self, documents: Vec<LegalDocument>) -> Result<()> {
        self.store.replace_all(documents).map(|_| ())
    }

    pub fn get(&self, id: RecordId) -> Option<LegalDocument> {
        self.store.get(LegalDocument::SOURCE, id)
    }

    pub fn add(&self, document: LegalDocument) -> Result<RecordId> {
        self.store.add(document)
    }

    pub fn update(&self, id: RecordId, document: LegalDocument) -> Result<()> {
        self.store.update(id, document)
    }

    pub fn delete(&self, id: RecordId) -> Result<()> {
        self.store.delete(LegalDocument::SOURCE, id)
    }

    /// The document a violation cites, if it names one that still exists.
    pub fn cited_by(&self, violation: &Violation) -> Option<LegalDocument> {
        violation.document_id.and_then(|id| self.get(id))
    }

    /// Documents by cosine similarity to `query`, best first.
    pub fn search(&self, query: &str) -> Vec<(LegalDocument, f32)> {
        let snapshot = self.store.snapshot();
        self.ranker
            .search(query, snapshot.index())
            .into_iter()
            .filter_map(|c| snapshot.record(c.row).map(|(doc, _)| (doc.clone(), c.similarity)))
            .collect()
    }
}
