use aqsat_migrate::core::orchestrator::{CUSTOMER_MAP_KEY, TRANSACTION_MAP_KEY};
use aqsat_migrate::domain::model::MigrationPhase;
use aqsat_migrate::domain::ports::StateStore;
use aqsat_migrate::{
    FileStateStore, FileWorkbookReader, MigrateError, MigrationOrchestrator, RestEntityStore,
};
use httpmock::prelude::*;
use serde_json::json;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn customers_csv(dir: &TempDir) -> PathBuf {
    write_fixture(
        dir,
        "customers.csv",
        "كود,أسماء العملاء,Mobile,Mobile2\n\
         1,عميل أول,1012345678,\n\
         2,عميل ثاني,,1098765432\n",
    )
}

fn transactions_csv(dir: &TempDir) -> PathBuf {
    // row 3 is malformed (non-numeric goods price) and must be skipped
    write_fixture(
        dir,
        "transactions.csv",
        "رقم العميل,رقم البيع,سعر السلعة,عدد الدفعات,القسط الشهرى,تاريخ بدء القرض\n\
         1,100,1500,10,150,45000\n\
         2,101,2400,12,200,45031\n\
         1,102,غير معروف,6,50,45000\n",
    )
}

fn payments_csv(dir: &TempDir) -> PathBuf {
    // second row has only the fallback amount column, third has neither
    write_fixture(
        dir,
        "payments.csv",
        "كود,رقم البيع,تاريخ الدفعة,قيمة الدفعة,التحصيل\n\
         1,100,45030,150,\n\
         2,101,45061,,200\n\
         3,100,45061,,\n",
    )
}

fn orchestrator(
    server: &MockServer,
    state_path: &PathBuf,
) -> MigrationOrchestrator<RestEntityStore, FileStateStore, FileWorkbookReader> {
    MigrationOrchestrator::new(
        RestEntityStore::new(server.base_url(), "service-key"),
        FileStateStore::new(state_path),
        FileWorkbookReader::new(),
    )
}

#[tokio::test]
async fn test_full_migration_run_against_mock_store() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("state.json");
    let server = MockServer::start();

    let customers_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/rest/v1/customers")
            .header("apikey", "service-key")
            .header("prefer", "return=representation")
            .json_body(json!([
                {"full_name": "عميل أول", "phone_1": "1012345678", "phone_2": null},
                {"full_name": "عميل ثاني", "phone_1": null, "phone_2": "1098765432"}
            ]));
        then.status(201)
            .header("Content-Type", "application/json")
            .json_body(json!([
                {"customer_id": "c-uuid-1"},
                {"customer_id": "c-uuid-2"}
            ]));
    });

    // serial 45000 = 2023-03-15, 45031 = 2023-04-15
    let transactions_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/rest/v1/transactions")
            .json_body(json!([
                {
                    "customer_id": "c-uuid-1",
                    "goods_price": 1500.0,
                    "monthly_installment": 150.0,
                    "installments_count": 10,
                    "first_payment_date": "2023-03-15"
                },
                {
                    "customer_id": "c-uuid-2",
                    "goods_price": 2400.0,
                    "monthly_installment": 200.0,
                    "installments_count": 12,
                    "first_payment_date": "2023-04-15"
                }
            ]));
        then.status(201)
            .header("Content-Type", "application/json")
            .json_body(json!([
                {"transaction_id": "t-uuid-1"},
                {"transaction_id": "t-uuid-2"}
            ]));
    });

    let payments_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/rest/v1/payments")
            .header("prefer", "return=minimal")
            .json_body(json!([
                {"transaction_id": "t-uuid-1", "payment_amount": 150.0, "payment_date": "2023-04-14"},
                {"transaction_id": "t-uuid-2", "payment_amount": 200.0, "payment_date": "2023-05-15"},
                {"transaction_id": "t-uuid-1", "payment_amount": 0.0, "payment_date": "2023-05-15"}
            ]));
        then.status(201);
    });

    let mut orch = orchestrator(&server, &state_path);
    assert_eq!(orch.phase().unwrap(), MigrationPhase::Idle);

    let report = orch
        .import_customers(&customers_csv(&dir))
        .await
        .unwrap();
    assert_eq!(report.inserted, 2);
    assert_eq!(orch.phase().unwrap(), MigrationPhase::CustomersImported);

    let report = orch
        .import_transactions(&transactions_csv(&dir))
        .await
        .unwrap();
    assert_eq!(report.inserted, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(orch.phase().unwrap(), MigrationPhase::TransactionsImported);

    let report = orch.import_payments(&payments_csv(&dir)).await.unwrap();
    assert_eq!(report.inserted, 3);
    assert_eq!(report.skipped, 0);
    assert_eq!(orch.phase().unwrap(), MigrationPhase::PaymentsComplete);

    customers_mock.assert();
    transactions_mock.assert();
    payments_mock.assert();

    // both maps are persisted on disk for later sessions
    let state = FileStateStore::new(&state_path);
    assert!(state.get(CUSTOMER_MAP_KEY).unwrap().is_some());
    assert!(state.get(TRANSACTION_MAP_KEY).unwrap().is_some());
}

#[tokio::test]
async fn test_phases_resume_from_persisted_state_in_new_session() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("state.json");
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/rest/v1/customers");
        then.status(201)
            .header("Content-Type", "application/json")
            .json_body(json!([
                {"customer_id": "c-uuid-1"},
                {"customer_id": "c-uuid-2"}
            ]));
    });
    let transactions_mock = server.mock(|when, then| {
        when.method(POST).path("/rest/v1/transactions");
        then.status(201)
            .header("Content-Type", "application/json")
            .json_body(json!([
                {"transaction_id": "t-uuid-1"},
                {"transaction_id": "t-uuid-2"}
            ]));
    });

    {
        let mut first_session = orchestrator(&server, &state_path);
        first_session
            .import_customers(&customers_csv(&dir))
            .await
            .unwrap();
    }

    // a brand-new orchestrator reloads the customer map from disk
    let mut second_session = orchestrator(&server, &state_path);
    assert_eq!(
        second_session.phase().unwrap(),
        MigrationPhase::CustomersImported
    );
    let report = second_session
        .import_transactions(&transactions_csv(&dir))
        .await
        .unwrap();
    assert_eq!(report.inserted, 2);
    transactions_mock.assert();
}

#[tokio::test]
async fn test_out_of_order_phase_makes_no_request() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("state.json");
    let server = MockServer::start();

    let any_post = server.mock(|when, then| {
        when.method(POST);
        then.status(201).json_body(json!([]));
    });

    let mut orch = orchestrator(&server, &state_path);
    let err = orch
        .import_transactions(&transactions_csv(&dir))
        .await
        .unwrap_err();

    assert!(matches!(err, MigrateError::Precondition { .. }));
    any_post.assert_hits(0);
}

#[tokio::test]
async fn test_store_rejection_leaves_phase_unchanged() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("state.json");
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/rest/v1/customers");
        then.status(409)
            .body(r#"{"message":"violates unique constraint"}"#);
    });

    let mut orch = orchestrator(&server, &state_path);
    let err = orch
        .import_customers(&customers_csv(&dir))
        .await
        .unwrap_err();

    assert!(matches!(err, MigrateError::Store { status: 409, .. }));
    assert_eq!(orch.phase().unwrap(), MigrationPhase::Idle);
    assert!(FileStateStore::new(&state_path)
        .get(CUSTOMER_MAP_KEY)
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_clear_state_allows_fresh_run() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("state.json");
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/rest/v1/customers");
        then.status(201)
            .header("Content-Type", "application/json")
            .json_body(json!([
                {"customer_id": "c-uuid-1"},
                {"customer_id": "c-uuid-2"}
            ]));
    });

    let mut orch = orchestrator(&server, &state_path);
    orch.import_customers(&customers_csv(&dir)).await.unwrap();
    assert_eq!(orch.phase().unwrap(), MigrationPhase::CustomersImported);

    orch.clear_state().unwrap();
    assert_eq!(orch.phase().unwrap(), MigrationPhase::Idle);

    let err = orch
        .import_transactions(&transactions_csv(&dir))
        .await
        .unwrap_err();
    assert!(matches!(err, MigrateError::Precondition { .. }));
}
