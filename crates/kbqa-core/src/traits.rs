use crate::error::Result;
use crate::types::{RankFields, RecordId};

/// A knowledge-base item that can be indexed and ranked.
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> RecordId;
    fn set_id(&mut self, id: RecordId);

    /// Name of the collection this record belongs to (e.g. `"violations"`).
    fn source(&self) -> &'static str;

    /// Concatenation of the searchable fields, before normalization.
    ///
    /// Fails with `Error::MissingField` when a required text field is blank.
    fn searchable_text(&self) -> Result<String>;

    fn rank_fields(&self) -> RankFields<'_>;
}
