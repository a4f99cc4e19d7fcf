pub mod idmap;
pub mod orchestrator;
pub mod serial_date;

pub use idmap::LegacyIdMap;
pub use orchestrator::MigrationOrchestrator;
