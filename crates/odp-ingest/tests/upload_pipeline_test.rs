//! End-to-end pipeline tests over the in-memory store
//!
//! These exercise the full sheet-level pipeline (header resolution through
//! alert reconciliation) on grids shaped like the real export template:
//! five preamble rows, headers in the 6th row, data from the 7th.

use odp_ingest::pipeline::{ingest_sheet, UploadError};
use odp_ingest::sheet::Cell;
use odp_ingest::store::MemoryStore;

const AGREEMENT: &str = "EXT-CE-2024-11 Catálogo Electrónico de Cómputo";
const CODE: &str = "EXT-CE-2024-11";

fn text(s: &str) -> Cell {
    Cell::Text(s.to_string())
}

fn header_row() -> Vec<Cell> {
    [
        "Orden Electrónica",
        "Razón Social Entidad",
        "Ruc Entidad",
        "Razón Social Proveedor",
        "Ruc Proveedor",
        "Marca Ficha Producto",
        "Fecha Publicación",
        "Monto Total Entrega",
    ]
    .iter()
    .map(|t| text(t))
    .collect()
}

fn data_row(order: &str, brand: &str) -> Vec<Cell> {
    vec![
        text(order),
        text("Hospital Nacional Dos de Mayo"),
        text("20131257750"),
        text("ACME S.A.C."),
        text("20481234567"),
        text(brand),
        text("15/01/2024"),
        text("2500.50"),
    ]
}

/// Template-shaped grid: preamble rows, header in row 6, data from row 7
fn grid_with(rows: Vec<Vec<Cell>>) -> Vec<Vec<Cell>> {
    let mut grid: Vec<Vec<Cell>> = (0..5).map(|_| vec![Cell::Empty; 8]).collect();
    grid.push(header_row());
    grid.extend(rows);
    grid
}

#[tokio::test]
async fn test_clean_sheet_round_trip() {
    let store = MemoryStore::new();
    let rows: Vec<_> = (1..=10).map(|i| data_row(&format!("E-2024-{:06}-1", i), "ACME")).collect();

    let outcome = ingest_sheet(&store, &grid_with(rows), AGREEMENT).await.unwrap();

    assert_eq!(outcome.agreement_code, CODE);
    assert_eq!(outcome.total_rows, 10);
    assert_eq!(outcome.accepted_rows, 10);
    assert_eq!(outcome.filtered_rows, 0);
    assert_eq!(outcome.inserted_rows, 10);
    assert_eq!(outcome.alert_count, 0);
    assert!(outcome.errors.is_empty());
    assert_eq!(store.entries_for(CODE).await.len(), 10);
}

#[tokio::test]
async fn test_row_with_missing_ruc_is_reported_with_sheet_row_number() {
    // Scenario: 10 rows, one missing the buyer tax id.
    let store = MemoryStore::new();
    let mut rows: Vec<_> = (1..=10).map(|i| data_row(&format!("E-2024-{:06}-1", i), "ACME")).collect();
    rows[3][2] = Cell::Empty; // 4th data row -> sheet row 10

    let outcome = ingest_sheet(&store, &grid_with(rows), AGREEMENT).await.unwrap();

    assert_eq!(outcome.total_rows, 10);
    assert_eq!(outcome.accepted_rows, 9);
    assert_eq!(outcome.inserted_rows, 9);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("Row 10"), "got: {}", outcome.errors[0]);
    assert!(outcome.errors[0].contains("ruc_entidad"));
}

#[tokio::test]
async fn test_voided_orders_are_filtered_not_errored() {
    let store = MemoryStore::new();
    let rows = vec![
        data_row("E-2024-000123-0", "ACME"),
        data_row("E-2024-000124-1", "ACME"),
    ];

    let outcome = ingest_sheet(&store, &grid_with(rows), AGREEMENT).await.unwrap();

    assert_eq!(outcome.filtered_rows, 1);
    assert_eq!(outcome.accepted_rows, 1);
    assert!(outcome.errors.is_empty());

    let stored = store.entries_for(CODE).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].order_id(), Some("E-2024-000124-1"));
}

#[tokio::test]
async fn test_blank_rows_are_skipped_silently() {
    let store = MemoryStore::new();
    let rows = vec![
        data_row("E-2024-000123-1", "ACME"),
        vec![Cell::Empty; 8],
        vec![text(""), text("-"), text("N/A"), Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty],
        data_row("E-2024-000124-1", "ACME"),
    ];

    let outcome = ingest_sheet(&store, &grid_with(rows), AGREEMENT).await.unwrap();

    assert_eq!(outcome.total_rows, 4);
    assert_eq!(outcome.accepted_rows, 2);
    assert_eq!(outcome.filtered_rows, 0);
    assert!(outcome.errors.is_empty());
}

#[tokio::test]
async fn test_watched_brands_produce_alerts() {
    // Scenario: two ZEUS rows and one unwatched brand -> exactly 2 alerts.
    let store = MemoryStore::new();
    let rows = vec![
        data_row("E-2024-000001-1", "ZEUS"),
        data_row("E-2024-000002-1", "ZEUS"),
        data_row("E-2024-000003-1", "ACME"),
    ];

    let outcome = ingest_sheet(&store, &grid_with(rows), AGREEMENT).await.unwrap();

    assert_eq!(outcome.alert_count, 2);
    let alerts = store.alerts().await;
    assert_eq!(alerts.len(), 2);
    assert!(alerts.iter().all(|a| a.brand_name == "ZEUS"));
    assert!(alerts.iter().all(|a| a.acuerdo_marco == AGREEMENT));
    let orders: Vec<_> = alerts.iter().map(|a| a.orden_electronica.as_str()).collect();
    assert!(orders.contains(&"E-2024-000001-1"));
    assert!(orders.contains(&"E-2024-000002-1"));
}

#[tokio::test]
async fn test_reupload_replaces_the_agreement_set() {
    // Scenario: re-uploading with fewer rows leaves exactly the new count.
    let store = MemoryStore::new();

    let first: Vec<_> = (1..=80).map(|i| data_row(&format!("E-2024-{:06}-1", i), "ACME")).collect();
    ingest_sheet(&store, &grid_with(first), AGREEMENT).await.unwrap();
    assert_eq!(store.entries_for(CODE).await.len(), 80);

    let second: Vec<_> = (1..=30).map(|i| data_row(&format!("E-2024-{:06}-1", i), "ACME")).collect();
    let outcome = ingest_sheet(&store, &grid_with(second), AGREEMENT).await.unwrap();

    assert_eq!(outcome.inserted_rows, 30);
    assert_eq!(store.entries_for(CODE).await.len(), 30);
}

#[tokio::test]
async fn test_upload_is_idempotent_per_agreement() {
    let store = MemoryStore::new();
    let rows: Vec<_> = (1..=5).map(|i| data_row(&format!("E-2024-{:06}-1", i), "ZEUS")).collect();

    ingest_sheet(&store, &grid_with(rows.clone()), AGREEMENT).await.unwrap();
    ingest_sheet(&store, &grid_with(rows), AGREEMENT).await.unwrap();

    // Entries are replaced, alerts are upserted, so neither set duplicates.
    assert_eq!(store.entries_for(CODE).await.len(), 5);
    assert_eq!(store.alerts().await.len(), 5);
}

#[tokio::test]
async fn test_alert_status_survives_reupload() {
    let store = MemoryStore::new();
    let rows = vec![data_row("E-2024-000001-1", "VALHALLA")];

    ingest_sheet(&store, &grid_with(rows.clone()), AGREEMENT).await.unwrap();
    store.set_alert_status("E-2024-000001-1", AGREEMENT, "attended").await;

    ingest_sheet(&store, &grid_with(rows), AGREEMENT).await.unwrap();

    let alerts = store.alerts().await;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].status, "attended");
}

#[tokio::test]
async fn test_missing_required_column_rejects_before_any_write() {
    // Scenario: header without the buyer-name column.
    let store = MemoryStore::new();

    // Seed the agreement so we can prove the delete never ran.
    let seed = vec![data_row("E-2024-000001-1", "ACME")];
    ingest_sheet(&store, &grid_with(seed), AGREEMENT).await.unwrap();

    let mut broken_header = header_row();
    broken_header.remove(1); // drop "Razón Social Entidad"
    let mut grid: Vec<Vec<Cell>> = (0..5).map(|_| vec![Cell::Empty; 7]).collect();
    grid.push(broken_header);
    grid.push(data_row("E-2024-000002-1", "ACME"));

    let result = ingest_sheet(&store, &grid, AGREEMENT).await;
    match result {
        Err(UploadError::Header(err)) => {
            assert!(err.to_string().contains("razon_social_entidad"));
        },
        other => panic!("expected header rejection, got {:?}", other.map(|o| o.accepted_rows)),
    }

    // Store untouched.
    assert_eq!(store.entries_for(CODE).await.len(), 1);
}

#[tokio::test]
async fn test_error_ceiling_aborts_with_no_writes() {
    let store = MemoryStore::new();

    // Seed data that must survive the aborted upload.
    let seed = vec![data_row("E-2024-000001-1", "ACME")];
    ingest_sheet(&store, &grid_with(seed), AGREEMENT).await.unwrap();

    // 150 rows all missing the supplier RUC.
    let mut rows = Vec::new();
    for i in 1..=150 {
        let mut row = data_row(&format!("E-2024-{:06}-1", i), "ACME");
        row[4] = Cell::Empty;
        rows.push(row);
    }

    let result = ingest_sheet(&store, &grid_with(rows), AGREEMENT).await;
    match result {
        Err(UploadError::TooManyRowErrors { count, errors }) => {
            assert!(count > 100);
            assert_eq!(errors.len(), 20);
        },
        other => panic!("expected abort, got {:?}", other.map(|o| o.accepted_rows)),
    }

    assert_eq!(store.entries_for(CODE).await.len(), 1);
}

#[tokio::test]
async fn test_batch_failure_degrades_to_per_record_inserts() {
    let store = MemoryStore::new();
    store.fail_entry_batches().await;
    store.reject_order("E-2024-000002-1").await;

    let rows = vec![
        data_row("E-2024-000001-1", "ACME"),
        data_row("E-2024-000002-1", "ACME"),
        data_row("E-2024-000003-1", "ACME"),
    ];

    let outcome = ingest_sheet(&store, &grid_with(rows), AGREEMENT).await.unwrap();

    // The two good rows survive the fallback; the bad one is diagnosed.
    assert_eq!(outcome.inserted_rows, 2);
    assert!(outcome
        .errors
        .iter()
        .any(|e| e.contains("E-2024-000002-1")));
    assert_eq!(store.entries_for(CODE).await.len(), 2);
}

#[tokio::test]
async fn test_alert_reconciliation_runs_despite_insert_failures() {
    let store = MemoryStore::new();
    store.fail_entry_batches().await;
    store.reject_order("E-2024-000001-1").await;

    let rows = vec![data_row("E-2024-000001-1", "ZEUS")];

    let outcome = ingest_sheet(&store, &grid_with(rows), AGREEMENT).await.unwrap();

    assert_eq!(outcome.inserted_rows, 0);
    // The validated row still produces its alert.
    assert_eq!(outcome.alert_count, 1);
    assert_eq!(store.alerts().await.len(), 1);
}

#[tokio::test]
async fn test_different_agreements_do_not_interfere() {
    let store = MemoryStore::new();

    let rows_a = vec![data_row("E-2024-000001-1", "ACME")];
    ingest_sheet(&store, &grid_with(rows_a), AGREEMENT).await.unwrap();

    let rows_b = vec![data_row("E-2023-000900-1", "ACME"), data_row("E-2023-000901-1", "ACME")];
    ingest_sheet(&store, &grid_with(rows_b), "IM-CE-2023-5 Mobiliario").await.unwrap();

    assert_eq!(store.entries_for(CODE).await.len(), 1);
    assert_eq!(store.entries_for("IM-CE-2023-5").await.len(), 2);
}
