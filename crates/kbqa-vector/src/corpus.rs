use std::collections::HashMap;
use std::hash::Hasher;

use twox_hash::XxHash64;

use kbqa_core::error::Result;
use kbqa_core::traits::Record;
use kbqa_core::types::RecordRef;
use kbqa_text::Normalizer;

/// Normalized documents aligned with the records they were built from.
///
/// `documents[i]` and `refs[i]` describe `records[i]` of the slice passed to
/// [`Corpus::build`]; the two vectors are only ever pushed together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    documents: Vec<String>,
    refs: Vec<RecordRef>,
}

impl Corpus {
    /// Fails on the first record with a blank required field; nothing is built in that case.
    pub fn build<R: Record>(records: &[R], normalizer: &Normalizer) -> Result<Self> {
        let mut documents = Vec::with_capacity(records.len());
        let mut refs = Vec::with_capacity(records.len());
        let mut per_source: HashMap<&'static str, usize> = HashMap::new();
        for record in records {
            let text = record.searchable_text()?;
            let local = per_source.entry(record.source()).or_insert(0);
            documents.push(normalizer.normalize(&text));
            refs.push(RecordRef { source: record.source().to_string(), local_index: *local, id: record.id() });
            *local += 1;
        }
        Ok(Self { documents, refs })
    }

    pub fn len(&self) -> usize { self.documents.len() }
    pub fn is_empty(&self) -> bool { self.documents.is_empty() }
    pub fn documents(&self) -> &[String] { &self.documents }
    pub fn refs(&self) -> &[RecordRef] { &self.refs }

    /// Content hash of the normalized documents in order.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = XxHash64::with_seed(0);
        for doc in &self.documents {
            hasher.write(doc.as_bytes());
            hasher.write_u8(0xff);
        }
        hasher.finish()
    }
}
