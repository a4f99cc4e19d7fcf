use crate::domain::model::{NewCustomer, NewPayment, NewTransaction, Record};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Batch-insert collaborator. Each call submits one atomic batch; on success
/// the returned ids correspond one-to-one, in order, with the submitted rows.
/// That ordering is a contract with the store, not something verified here.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn insert_customers(&self, rows: &[NewCustomer]) -> Result<Vec<String>>;
    async fn insert_transactions(&self, rows: &[NewTransaction]) -> Result<Vec<String>>;
    async fn insert_payments(&self, rows: &[NewPayment]) -> Result<()>;
}

/// Session-scoped key-value persistence for the legacy-id maps. Injected so
/// the orchestrator never touches a hidden global.
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// Decodes the first sheet of a workbook into header-keyed rows.
#[async_trait]
pub trait WorkbookReader: Send + Sync {
    async fn read_rows(&self, path: &Path) -> Result<Vec<Record>>;
}

pub trait ConfigProvider: Send + Sync {
    fn store_url(&self) -> &str;
    fn api_key(&self) -> &str;
    fn state_file(&self) -> &str;
}
