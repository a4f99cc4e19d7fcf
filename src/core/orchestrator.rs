use crate::core::idmap::LegacyIdMap;
use crate::core::serial_date::serial_to_iso_date;
use crate::domain::model::{
    columns, MigrationPhase, NewCustomer, NewPayment, NewTransaction, PhaseReport,
};
use crate::domain::ports::{EntityStore, StateStore, WorkbookReader};
use crate::utils::error::{MigrateError, Result};
use std::path::Path;

/// State-store keys for the persisted legacy-id maps.
pub const CUSTOMER_MAP_KEY: &str = "migration.customer_id_map";
pub const TRANSACTION_MAP_KEY: &str = "migration.transaction_id_map";

/// Drives the three sequential import phases (customers, transactions,
/// payments) against an injected entity store, persisting the legacy-id map
/// each phase produces so the next phase can resolve its foreign keys, even
/// across separate sessions.
///
/// Phase methods take `&mut self`, so no two imports can ever run
/// concurrently against the same id maps.
pub struct MigrationOrchestrator<E, S, W> {
    store: E,
    state: S,
    reader: W,
    customer_map: Option<LegacyIdMap>,
    transaction_map: Option<LegacyIdMap>,
    payments_done: bool,
}

impl<E: EntityStore, S: StateStore, W: WorkbookReader> MigrationOrchestrator<E, S, W> {
    pub fn new(store: E, state: S, reader: W) -> Self {
        Self {
            store,
            state,
            reader,
            customer_map: None,
            transaction_map: None,
            payments_done: false,
        }
    }

    /// Phase 1: decode the customers workbook, submit one batch insert and
    /// build the customer legacy-id map from the response. The phase is
    /// atomic: any malformed row aborts it before the network call.
    pub async fn import_customers(&mut self, path: &Path) -> Result<PhaseReport> {
        let rows = self.reader.read_rows(path).await?;
        if rows.is_empty() {
            return Err(MigrateError::validation("customers file has no data rows"));
        }

        let mut legacy_codes = Vec::with_capacity(rows.len());
        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            // Row numbers in messages are 1-based and account for the header.
            let legacy = row.integer(columns::customers::LEGACY_CODE).ok_or_else(|| {
                MigrateError::validation(format!(
                    "customers row {}: missing or non-numeric legacy code",
                    index + 2
                ))
            })?;
            let full_name = row.text(columns::customers::FULL_NAME).ok_or_else(|| {
                MigrateError::validation(format!("customers row {}: missing name", index + 2))
            })?;
            legacy_codes.push(legacy);
            records.push(NewCustomer {
                full_name,
                phone_1: row.text(columns::customers::PHONE_1),
                phone_2: row.text(columns::customers::PHONE_2),
            });
        }

        tracing::info!("Submitting {} customers", records.len());
        let new_ids = self.store.insert_customers(&records).await?;
        let map = LegacyIdMap::correlate("customer", &legacy_codes, new_ids)?;
        self.state.set(CUSTOMER_MAP_KEY, &map.to_json()?)?;
        tracing::info!("Imported {} customers", map.len());
        self.customer_map = Some(map);

        Ok(PhaseReport {
            inserted: records.len(),
            skipped: 0,
        })
    }

    /// Phase 2: requires the customer map from phase 1. Rows with a missing
    /// or non-numeric required field are skipped and counted; a row whose
    /// customer code resolves to nothing aborts the whole phase before any
    /// network call.
    pub async fn import_transactions(&mut self, path: &Path) -> Result<PhaseReport> {
        if self.customer_map.is_none() {
            self.customer_map = self.load_map(CUSTOMER_MAP_KEY)?;
        }
        let customer_map = self.customer_map.as_ref().ok_or_else(|| {
            MigrateError::precondition(
                "customer id map missing; run the customers phase before transactions",
            )
        })?;

        let rows = self.reader.read_rows(path).await?;
        if rows.is_empty() {
            return Err(MigrateError::validation(
                "transactions file has no data rows",
            ));
        }

        use crate::domain::model::columns::transactions as col;
        let mut skipped = 0usize;
        let mut legacy_codes = Vec::new();
        let mut records = Vec::new();
        for row in &rows {
            let required = (
                row.integer(col::LEGACY_CODE),
                row.integer(col::CUSTOMER_LEGACY_CODE),
                row.number(col::GOODS_PRICE),
                row.integer(col::INSTALLMENTS_COUNT),
                row.number(col::MONTHLY_INSTALLMENT),
            );
            let (Some(legacy), Some(customer_legacy), Some(goods_price), Some(count), Some(monthly)) =
                required
            else {
                skipped += 1;
                continue;
            };

            let customer_id = customer_map.get(customer_legacy).ok_or(
                MigrateError::UnresolvedReference {
                    entity: "customer",
                    legacy_code: customer_legacy,
                },
            )?;

            legacy_codes.push(legacy);
            records.push(NewTransaction {
                customer_id: customer_id.to_string(),
                goods_price,
                monthly_installment: monthly,
                installments_count: count,
                first_payment_date: row
                    .number(col::FIRST_PAYMENT_DATE)
                    .and_then(serial_to_iso_date),
            });
        }

        if records.is_empty() {
            return Err(MigrateError::validation(
                "transactions file has no importable rows",
            ));
        }
        if skipped > 0 {
            tracing::warn!(
                "Skipped {} transaction rows with missing or non-numeric required fields",
                skipped
            );
        }

        tracing::info!("Submitting {} transactions", records.len());
        let new_ids = self.store.insert_transactions(&records).await?;
        let map = LegacyIdMap::correlate("transaction", &legacy_codes, new_ids)?;
        self.state.set(TRANSACTION_MAP_KEY, &map.to_json()?)?;
        tracing::info!("Imported {} transactions ({} skipped)", map.len(), skipped);
        self.transaction_map = Some(map);

        Ok(PhaseReport {
            inserted: records.len(),
            skipped,
        })
    }

    /// Phase 3 (terminal): requires the transaction map from phase 2. Any
    /// unresolvable transaction code aborts the phase; the amount prefers
    /// the primary column, falls back to the secondary one, and defaults
    /// to zero when neither is present.
    pub async fn import_payments(&mut self, path: &Path) -> Result<PhaseReport> {
        if self.transaction_map.is_none() {
            self.transaction_map = self.load_map(TRANSACTION_MAP_KEY)?;
        }
        let transaction_map = self.transaction_map.as_ref().ok_or_else(|| {
            MigrateError::precondition(
                "transaction id map missing; run the transactions phase before payments",
            )
        })?;

        let rows = self.reader.read_rows(path).await?;
        if rows.is_empty() {
            return Err(MigrateError::validation("payments file has no data rows"));
        }

        use crate::domain::model::columns::payments as col;
        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let legacy = row.integer(col::TRANSACTION_LEGACY_CODE).ok_or_else(|| {
                MigrateError::validation(format!(
                    "payments row {}: missing or non-numeric transaction code",
                    index + 2
                ))
            })?;
            let transaction_id =
                transaction_map
                    .get(legacy)
                    .ok_or(MigrateError::UnresolvedReference {
                        entity: "transaction",
                        legacy_code: legacy,
                    })?;

            let payment_amount = row
                .number(col::AMOUNT_PRIMARY)
                .or_else(|| row.number(col::AMOUNT_FALLBACK))
                .unwrap_or(0.0);

            records.push(NewPayment {
                transaction_id: transaction_id.to_string(),
                payment_amount,
                payment_date: row.number(col::PAYMENT_DATE).and_then(serial_to_iso_date),
            });
        }

        tracing::info!("Submitting {} payments", records.len());
        self.store.insert_payments(&records).await?;
        tracing::info!("Imported {} payments; migration complete", records.len());
        self.payments_done = true;

        Ok(PhaseReport {
            inserted: records.len(),
            skipped: 0,
        })
    }

    /// Discards both persisted legacy-id maps so a fresh run can start.
    /// Idempotent.
    pub fn clear_state(&mut self) -> Result<()> {
        self.state.delete(CUSTOMER_MAP_KEY)?;
        self.state.delete(TRANSACTION_MAP_KEY)?;
        self.customer_map = None;
        self.transaction_map = None;
        self.payments_done = false;
        tracing::info!("Cleared persisted legacy-id maps");
        Ok(())
    }

    /// Current phase, derived from which maps exist in memory or in the
    /// state store. `PaymentsComplete` is session-scoped: nothing is
    /// persisted for the terminal phase.
    pub fn phase(&self) -> Result<MigrationPhase> {
        if self.payments_done {
            return Ok(MigrationPhase::PaymentsComplete);
        }
        if self.transaction_map.is_some() || self.state.get(TRANSACTION_MAP_KEY)?.is_some() {
            return Ok(MigrationPhase::TransactionsImported);
        }
        if self.customer_map.is_some() || self.state.get(CUSTOMER_MAP_KEY)?.is_some() {
            return Ok(MigrationPhase::CustomersImported);
        }
        Ok(MigrationPhase::Idle)
    }

    /// Customer legacy-id map, reloaded from the state store if a previous
    /// session produced it.
    pub fn customer_id_map(&mut self) -> Result<Option<&LegacyIdMap>> {
        if self.customer_map.is_none() {
            self.customer_map = self.load_map(CUSTOMER_MAP_KEY)?;
        }
        Ok(self.customer_map.as_ref())
    }

    pub fn transaction_id_map(&mut self) -> Result<Option<&LegacyIdMap>> {
        if self.transaction_map.is_none() {
            self.transaction_map = self.load_map(TRANSACTION_MAP_KEY)?;
        }
        Ok(self.transaction_map.as_ref())
    }

    fn load_map(&self, key: &str) -> Result<Option<LegacyIdMap>> {
        match self.state.get(key)? {
            Some(json) => Ok(Some(LegacyIdMap::from_json(&json)?)),
            None => Ok(None),
        }
    }
}
