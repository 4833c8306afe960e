use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error};

use kbqa_core::config::Settings;
use kbqa_core::error::{Error, Result, INTERNAL_ERROR_CODE};
use kbqa_core::records::EmergencyCondition;
use kbqa_core::traits::Record;
use kbqa_core::types::{Entities, RankedResult, RecordId};
use kbqa_text::EntityExtractor;
use kbqa_vector::{QueryCache, RebuildableIndex, SimilarityRanker, Snapshot};

use crate::adjust::ConfidenceAdjuster;
use crate::emergency::EmergencyDirectory;
use crate::store::RecordStore;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchOutcome<R> {
    /// The query was blank; nothing was searched.
    EmptyQuery,
    /// An emergency condition matched and ranked search was skipped.
    Emergency { condition: EmergencyCondition, entities: Entities },
    Ranked { results: Vec<RankedResult<R>>, entities: Entities },
}

impl<R> SearchOutcome<R> {
    pub fn results(&self) -> &[RankedResult<R>] {
        match self {
            SearchOutcome::Ranked { results, .. } => results,
            _ => &[],
        }
    }

    pub fn entities(&self) -> Option<&Entities> {
        match self {
            SearchOutcome::EmptyQuery => None,
            SearchOutcome::Emergency { entities, .. } | SearchOutcome::Ranked { entities, .. } => Some(entities),
        }
    }
}

/// What callers outside the engine receive. Faults never cross this boundary as errors.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<R> {
    Answer { outcome: SearchOutcome<R> },
    Failure { code: String },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EngineStats {
    pub domain: String,
    pub generation: u64,
    pub records_by_source: BTreeMap<String, usize>,
    pub vocabulary_size: usize,
    pub emergency_conditions: usize,
    pub cached_queries: usize,
}

/// Query pipeline for one domain: normalize, extract, rank, adjust.
pub struct KnowledgeEngine<R> {
    domain: String,
    extractor: EntityExtractor,
    store: RecordStore<R>,
    ranker: SimilarityRanker,
    adjuster: ConfidenceAdjuster,
    cache: QueryCache<SearchOutcome<R>>,
    emergencies: EmergencyDirectory,
}

impl<R: Record> KnowledgeEngine<R> {
    pub fn new(domain: impl Into<String>, extractor: EntityExtractor, settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let normalizer = extractor.normalizer().clone();
        let index = RebuildableIndex::new(normalizer.clone(), settings.index);
        Ok(Self {
            domain: domain.into(),
            ranker: SimilarityRanker::new(normalizer, settings.search.candidate_pool, settings.search.threshold),
            adjuster: ConfidenceAdjuster::new(settings.bonus.clone(), settings.search.final_count),
            cache: QueryCache::new(settings.search.cache_capacity),
            store: RecordStore::new(index),
            emergencies: EmergencyDirectory::default(),
            extractor,
        })
    }

    pub fn with_emergencies(mut self, directory: EmergencyDirectory) -> Self {
        self.emergencies = directory;
        self
    }

    /// Register an emergency condition; it applies to the next query.
    pub fn add_emergency(&self, condition: EmergencyCondition) -> Result<RecordId> {
        self.emergencies.add(condition)
    }

    pub fn domain(&self) -> &str { &self.domain }
    pub fn store(&self) -> &RecordStore<R> { &self.store }
    pub fn emergencies(&self) -> &EmergencyDirectory { &self.emergencies }
    pub fn snapshot(&self) -> Arc<Snapshot<R>> { self.store.snapshot() }

    /// Replace the whole record set. On error the previous index keeps serving.
    pub fn rebuild(&self, records: Vec<R>) -> Result<()> {
        self.store.replace_all(records).map(|_| ())
    }

    pub fn extract_entities(&self, query: &str) -> Entities {
        self.extractor.extract(query)
    }

    pub fn search(&self, query: &str) -> Result<SearchOutcome<R>> {
        if query.trim().is_empty() {
            return Ok(SearchOutcome::EmptyQuery);
        }
        let normalized = self.extractor.normalizer().normalize(query);
        let entities = self.extractor.extract_normalized(&normalized);

        if entities.is_emergency() {
            if let Some(condition) = self.emergencies.lookup(&normalized) {
                debug!(domain = %self.domain, condition = %condition.condition_name, "emergency match");
                return Ok(SearchOutcome::Emergency { condition, entities });
            }
        }

        let snapshot = self.store.snapshot();
        if let Some(hit) = self.cache.get(&normalized, snapshot.generation()) {
            debug!(domain = %self.domain, query = %normalized, "cache hit");
            return Ok(hit);
        }

        let candidates = self.ranker.search_normalized(&normalized, snapshot.index());
        let mut scored = Vec::with_capacity(candidates.len());
        for c in &candidates {
            let (record, origin) = snapshot
                .record(c.row)
                .ok_or_else(|| Error::Operation(format!("row {} outside snapshot {}", c.row, snapshot.generation())))?;
            scored.push((record.clone(), origin.clone(), c.similarity));
        }
        let results = self.adjuster.adjust(scored, &entities);
        debug!(
            domain = %self.domain,
            query = %normalized,
            candidates = candidates.len(),
            results = results.len(),
            "ranked search"
        );

        let outcome = SearchOutcome::Ranked { results, entities };
        self.cache.put(normalized, snapshot.generation(), outcome.clone());
        Ok(outcome)
    }

    /// Search, reporting errors and panics as a failure code instead of propagating them.
    pub fn respond(&self, query: &str) -> Response<R> {
        match catch_unwind(AssertUnwindSafe(|| self.search(query))) {
            Ok(Ok(outcome)) => Response::Answer { outcome },
            Ok(Err(e)) => {
                error!(domain = %self.domain, error = %e, code = e.code(), "query failed");
                Response::Failure { code: e.code().to_string() }
            }
            Err(_) => {
                error!(domain = %self.domain, "query panicked");
                Response::Failure { code: INTERNAL_ERROR_CODE.to_string() }
            }
        }
    }

    pub fn stats(&self) -> EngineStats {
        let snapshot = self.store.snapshot();
        let mut records_by_source = BTreeMap::new();
        for r in snapshot.records() {
            *records_by_source.entry(r.source().to_string()).or_insert(0) += 1;
        }
        EngineStats {
            domain: self.domain.clone(),
            generation: snapshot.generation(),
            records_by_source,
            vocabulary_size: snapshot.vocabulary_size(),
            emergency_conditions: self.emergencies.len(),
            cached_queries: self.cache.len(),
        }
    }
}
