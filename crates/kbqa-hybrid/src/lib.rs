pub mod adjust;
pub mod documents;
pub mod emergency;
pub mod engine;
pub mod feedback;
pub mod profiles;
pub mod store;

pub use adjust::ConfidenceAdjuster;
pub use documents::LegalLibrary;
pub use emergency::EmergencyDirectory;
pub use engine::{EngineStats, KnowledgeEngine, Response, SearchOutcome};
pub use feedback::{FeedbackEntry, FeedbackLog};
pub use profiles::{health_engine, legal_library, load_health, load_legal_library, load_traffic, traffic_engine, Domain};
pub use store::RecordStore;
