use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use kbqa_core::config::IndexSettings;
use kbqa_core::error::Result;
use kbqa_core::traits::Record;
use kbqa_core::types::RecordRef;
use kbqa_text::Normalizer;

use crate::corpus::Corpus;
use crate::tfidf::TfIdfIndex;

/// Records, their normalized corpus and the index fitted on it, published as one unit.
#[derive(Debug)]
pub struct Snapshot<R> {
    generation: u64,
    records: Vec<R>,
    corpus: Corpus,
    index: Option<TfIdfIndex>,
    fingerprint: u64,
}

impl<R: Record> Snapshot<R> {
    pub fn empty() -> Self {
        let corpus = Corpus::default();
        let fingerprint = corpus.fingerprint();
        Self { generation: 0, records: Vec::new(), corpus, index: None, fingerprint }
    }

    pub fn build(generation: u64, records: Vec<R>, normalizer: &Normalizer, settings: &IndexSettings) -> Result<Self> {
        let corpus = Corpus::build(&records, normalizer)?;
        let index = TfIdfIndex::build(corpus.documents(), settings);
        let fingerprint = corpus.fingerprint();
        Ok(Self { generation, records, corpus, index, fingerprint })
    }

    pub fn generation(&self) -> u64 { self.generation }
    pub fn records(&self) -> &[R] { &self.records }
    pub fn corpus(&self) -> &Corpus { &self.corpus }
    pub fn index(&self) -> Option<&TfIdfIndex> { self.index.as_ref() }
    pub fn fingerprint(&self) -> u64 { self.fingerprint }

    pub fn record(&self, row: usize) -> Option<(&R, &RecordRef)> {
        Some((self.records.get(row)?, self.corpus.refs().get(row)?))
    }

    pub fn vocabulary_size(&self) -> usize {
        self.index.as_ref().map_or(0, |i| i.vocabulary().len())
    }
}

/// Holds the current [`Snapshot`] and swaps in a new one after each successful rebuild.
///
/// Readers clone the `Arc` and never observe a half-built index. A rebuild that
/// fails leaves the previous snapshot in place.
pub struct RebuildableIndex<R> {
    current: RwLock<Arc<Snapshot<R>>>,
    rebuild_lock: Mutex<()>,
    generation: AtomicU64,
    normalizer: Normalizer,
    settings: IndexSettings,
}

impl<R: Record> RebuildableIndex<R> {
    pub fn new(normalizer: Normalizer, settings: IndexSettings) -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::empty())),
            rebuild_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
            normalizer,
            settings,
        }
    }

    pub fn current(&self) -> Arc<Snapshot<R>> {
        self.current.read().clone()
    }

    pub fn normalizer(&self) -> &Normalizer { &self.normalizer }
    pub fn settings(&self) -> &IndexSettings { &self.settings }

    pub fn rebuild(&self, records: Vec<R>) -> Result<Arc<Snapshot<R>>> {
        let _guard = self.rebuild_lock.lock();
        let started = Instant::now();
        let next_gen = self.generation.load(Ordering::Acquire) + 1;
        let snapshot = match Snapshot::build(next_gen, records, &self.normalizer, &self.settings) {
            Ok(s) => Arc::new(s),
            Err(e) => {
                warn!(error = %e, generation = next_gen - 1, "rebuild rejected; keeping previous index");
                return Err(e);
            }
        };
        self.generation.store(next_gen, Ordering::Release);
        *self.current.write() = snapshot.clone();
        info!(
            generation = next_gen,
            records = snapshot.records().len(),
            terms = snapshot.vocabulary_size(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "index rebuilt"
        );
        Ok(snapshot)
    }
}
