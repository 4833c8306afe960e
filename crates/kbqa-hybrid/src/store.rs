//! In-memory record collection that republishes the index after every change.
//!
//! The published snapshot is the source of truth: a mutation builds a new record
//! list, rebuilds from it, and only a successful rebuild makes the change visible.
//! A rejected record therefore leaves both the records and the index untouched.
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use kbqa_core::error::{Error, Result};
use kbqa_core::traits::Record;
use kbqa_core::types::RecordId;
use kbqa_vector::{RebuildableIndex, Snapshot};

pub struct RecordStore<R> {
    index: RebuildableIndex<R>,
    // highest id ever handed out per source, so deleted ids are not reused
    issued: Mutex<HashMap<&'static str, RecordId>>,
}

impl<R: Record> RecordStore<R> {
    pub fn new(index: RebuildableIndex<R>) -> Self {
        Self { index, issued: Mutex::new(HashMap::new()) }
    }

    pub fn index(&self) -> &RebuildableIndex<R> { &self.index }
    pub fn snapshot(&self) -> Arc<Snapshot<R>> { self.index.current() }

    pub fn list(&self) -> Vec<R> { self.snapshot().records().to_vec() }
    pub fn len(&self) -> usize { self.snapshot().records().len() }
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn get(&self, source: &str, id: RecordId) -> Option<R> {
        self.snapshot().records().iter().find(|r| r.source() == source && r.id() == id).cloned()
    }

    /// Replace every record. Records without a positive id get one.
    ///
    /// Fails with `Error::DuplicateId` when two records share a source and a positive id.
    pub fn replace_all(&self, mut records: Vec<R>) -> Result<Arc<Snapshot<R>>> {
        let mut issued = self.issued.lock();
        let mut seen = HashSet::new();
        for r in records.iter().filter(|r| r.id() > 0) {
            if !seen.insert((r.source(), r.id())) {
                return Err(Error::DuplicateId { origin: r.source(), id: r.id() });
            }
        }
        let mut next = issued.clone();
        for r in records.iter().filter(|r| r.id() > 0) {
            let hw = next.entry(r.source()).or_insert(0);
            *hw = (*hw).max(r.id());
        }
        for r in records.iter_mut().filter(|r| r.id() <= 0) {
            let hw = next.entry(r.source()).or_insert(0);
            *hw += 1;
            r.set_id(*hw);
        }
        let snapshot = self.index.rebuild(records)?;
        *issued = next;
        Ok(snapshot)
    }

    pub fn add(&self, record: R) -> Result<RecordId> {
        let ids = self.add_batch(vec![record])?;
        ids.into_iter().next().ok_or_else(|| Error::Operation("no id assigned".into()))
    }

    /// All or nothing: one malformed record rejects the whole batch.
    pub fn add_batch(&self, batch: Vec<R>) -> Result<Vec<RecordId>> {
        let mut issued = self.issued.lock();
        let mut records = self.list();
        let mut next = issued.clone();
        for r in &records {
            let hw = next.entry(r.source()).or_insert(0);
            *hw = (*hw).max(r.id());
        }
        let mut ids = Vec::with_capacity(batch.len());
        for mut r in batch {
            let hw = next.entry(r.source()).or_insert(0);
            *hw += 1;
            r.set_id(*hw);
            ids.push(*hw);
            records.push(r);
        }
        self.index.rebuild(records)?;
        *issued = next;
        info!(added = ids.len(), "records added");
        Ok(ids)
    }

    /// Replace the record with `id` in `record.source()`; the stored id is kept.
    pub fn update(&self, id: RecordId, mut record: R) -> Result<()> {
        let _issued = self.issued.lock();
        let mut records = self.list();
        let source = record.source();
        let slot = records
            .iter_mut()
            .find(|r| r.source() == source && r.id() == id)
            .ok_or_else(|| Error::NotFound(format!("{source}#{id}")))?;
        record.set_id(id);
        *slot = record;
        self.index.rebuild(records)?;
        info!(source, id, "record updated");
        Ok(())
    }

    pub fn delete(&self, source: &str, id: RecordId) -> Result<()> {
        let _issued = self.issued.lock();
        let mut records = self.list();
        let before = records.len();
        records.retain(|r| !(r.source() == source && r.id() == id));
        if records.len() == before {
            return Err(Error::NotFound(format!("{source}#{id}")));
        }
        self.index.rebuild(records)?;
        info!(source, id, "record deleted");
        Ok(())
    }
}
