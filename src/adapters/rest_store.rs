use crate::domain::model::{NewCustomer, NewPayment, NewTransaction};
use crate::domain::ports::{ConfigProvider, EntityStore};
use crate::utils::error::{MigrateError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

/// Batch-insert client for a PostgREST-style data store. One POST per phase;
/// `Prefer: return=representation` makes the store echo the inserted rows,
/// with their assigned ids, in request order.
pub struct RestEntityStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestEntityStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self::new(config.store_url(), config.api_key())
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    async fn insert_returning<T: Serialize + Sync>(
        &self,
        table: &str,
        rows: &[T],
        id_column: &str,
    ) -> Result<Vec<String>> {
        tracing::debug!("POST {} ({} rows)", self.endpoint(table), rows.len());
        let response = self
            .client
            .post(self.endpoint(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(&rows)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MigrateError::Store {
                status: status.as_u16(),
                message,
            });
        }

        let inserted: Vec<serde_json::Value> = response.json().await?;
        inserted
            .iter()
            .map(|row| {
                row.get(id_column)
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| MigrateError::Store {
                        status: status.as_u16(),
                        message: format!("{} insert response row is missing '{}'", table, id_column),
                    })
            })
            .collect()
    }

    async fn insert_minimal<T: Serialize + Sync>(&self, table: &str, rows: &[T]) -> Result<()> {
        tracing::debug!("POST {} ({} rows)", self.endpoint(table), rows.len());
        let response = self
            .client
            .post(self.endpoint(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(&rows)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MigrateError::Store {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore for RestEntityStore {
    async fn insert_customers(&self, rows: &[NewCustomer]) -> Result<Vec<String>> {
        self.insert_returning("customers", rows, "customer_id").await
    }

    async fn insert_transactions(&self, rows: &[NewTransaction]) -> Result<Vec<String>> {
        self.insert_returning("transactions", rows, "transaction_id")
            .await
    }

    async fn insert_payments(&self, rows: &[NewPayment]) -> Result<()> {
        self.insert_minimal("payments", rows).await
    }
}
