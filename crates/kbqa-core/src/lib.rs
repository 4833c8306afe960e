pub mod config;
pub mod dataset;
pub mod error;
pub mod records;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::Record;
pub use types::{Entities, RankFields, RankedResult, RecordId, RecordRef, Urgency};
