pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{FileStateStore, FileWorkbookReader, RestEntityStore};
pub use config::{Cli, Command, MigrateConfig};
pub use core::{LegacyIdMap, MigrationOrchestrator};
pub use utils::error::{MigrateError, Result};
