pub mod rest_store;
pub mod state_file;
pub mod workbook;

pub use rest_store::RestEntityStore;
pub use state_file::{FileStateStore, MemoryStateStore};
pub use workbook::FileWorkbookReader;
