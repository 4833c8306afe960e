//! Domain types shared by the text, vector and hybrid engines.

use serde::{Deserialize, Serialize};

pub type RecordId = i64;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    Normal,
    Emergency,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Normal => "normal",
            Urgency::Emergency => "emergency",
        }
    }
}

/// Structured hints extracted from a query.
///
/// - `category`: single-valued category (e.g. vehicle type), first matching group wins
/// - `tags`: type tags in detection order; duplicates are kept
/// - `topics`: secondary hints (body parts, health topics) with the same semantics as `tags`
/// - `number`: first numeric capture (e.g. speed in km/h)
/// - `urgency`: `Emergency` when any emergency keyword is present
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entities {
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub topics: Vec<String>,
    pub number: Option<u32>,
    pub urgency: Urgency,
}

impl Entities {
    pub fn is_emergency(&self) -> bool {
        self.urgency == Urgency::Emergency
    }
}

/// Where a corpus row came from.
///
/// `source` names the record collection, `local_index` is the position inside
/// that collection and `id` is the store-assigned identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RecordRef {
    pub source: String,
    pub local_index: usize,
    pub id: RecordId,
}

/// The fields of a record that domain bonuses look at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankFields<'a> {
    pub category: Option<&'a str>,
    pub kind: Option<&'a str>,
}

/// A record with its raw cosine similarity and the bonus-adjusted confidence.
///
/// `confidence` has no upper bound unless clamping is configured.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedResult<R> {
    pub record: R,
    pub origin: RecordRef,
    pub similarity: f32,
    pub confidence: f32,
}
