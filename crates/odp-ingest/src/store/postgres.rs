//! Postgres-backed store
//!
//! Entries and alerts live in the `open_data_entries` and `brand_alerts`
//! tables (see `migrations/`). Batch writes use a single multi-row
//! statement; the per-record fallback re-enters through the same builders
//! with a one-element slice.

use super::{EntryStore, StoreError};
use crate::brands::AlertRecord;
use crate::normalize::NormalizedRecord;
use crate::schema::{FieldKind, FIELDS};
use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};

/// Production store over a Postgres connection pool
#[derive(Clone)]
pub struct PgEntryStore {
    pool: PgPool,
}

impl PgEntryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_entries(entries: &[NormalizedRecord]) -> QueryBuilder<'static, sqlx::Postgres> {
        let mut builder = QueryBuilder::new("INSERT INTO open_data_entries (");
        {
            let mut columns = builder.separated(", ");
            for field in FIELDS {
                columns.push(field.name);
            }
            columns.push("codigo_acuerdo_marco");
        }
        builder.push(") ");

        builder.push_values(entries, |mut row, record| {
            for field in FIELDS {
                match field.kind {
                    FieldKind::Text | FieldKind::Date => {
                        // Unmapped columns stay NULL; mapped columns always
                        // carry a defined value after normalization.
                        row.push_bind(record.text(field.name).map(str::to_string));
                    },
                    FieldKind::Numeric => {
                        row.push_bind(record.number(field.name));
                    },
                }
            }
            row.push_bind(record.codigo_acuerdo_marco.clone());
        });

        builder
    }

    fn push_alerts(alerts: &[AlertRecord]) -> QueryBuilder<'static, sqlx::Postgres> {
        let mut builder = QueryBuilder::new(
            "INSERT INTO brand_alerts (orden_electronica, acuerdo_marco, brand_name, status, notes) ",
        );

        builder.push_values(alerts, |mut row, alert| {
            row.push_bind(alert.orden_electronica.clone())
                .push_bind(alert.acuerdo_marco.clone())
                .push_bind(alert.brand_name.clone())
                .push_bind(alert.status.clone())
                .push_bind(alert.notes.clone());
        });

        // Re-uploads refresh what was detected but never touch the
        // follow-up workflow state.
        builder.push(
            " ON CONFLICT (orden_electronica, acuerdo_marco) DO UPDATE SET \
             brand_name = EXCLUDED.brand_name, notes = EXCLUDED.notes, updated_at = now()",
        );

        builder
    }
}

#[async_trait]
impl EntryStore for PgEntryStore {
    #[tracing::instrument(skip(self))]
    async fn delete_agreement(&self, code: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM open_data_entries WHERE codigo_acuerdo_marco = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_entries(&self, entries: &[NormalizedRecord]) -> Result<(), StoreError> {
        if entries.is_empty() {
            return Ok(());
        }
        Self::push_entries(entries)
            .build()
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_entry(&self, entry: &NormalizedRecord) -> Result<(), StoreError> {
        self.insert_entries(std::slice::from_ref(entry)).await
    }

    async fn upsert_alerts(&self, alerts: &[AlertRecord]) -> Result<(), StoreError> {
        if alerts.is_empty() {
            return Ok(());
        }
        Self::push_alerts(alerts)
            .build()
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert_alert(&self, alert: &AlertRecord) -> Result<(), StoreError> {
        self.upsert_alerts(std::slice::from_ref(alert)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brands::ALERT_STATUS_PENDING;
    use crate::header::resolve_columns;
    use crate::normalize::normalize_row;
    use crate::sheet::Cell;

    fn sample_record() -> NormalizedRecord {
        let header: Vec<Cell> = [
            "Orden Electrónica",
            "Razón Social Entidad",
            "Ruc Entidad",
            "Razón Social Proveedor",
            "Ruc Proveedor",
            "Monto Total Entrega",
        ]
        .iter()
        .map(|t| Cell::Text(t.to_string()))
        .collect();
        let columns = resolve_columns(&header).unwrap();
        let row: Vec<Cell> = ["E-2024-1-1", "Entidad", "20131257750", "Prov", "20481234567", "150"]
            .iter()
            .map(|c| Cell::Text(c.to_string()))
            .collect();
        normalize_row(&row, &columns, "EXT-CE-2024-11 Cómputo", "EXT-CE-2024-11")
    }

    #[test]
    fn test_entry_insert_sql_shape() {
        let records = vec![sample_record(), sample_record()];
        let builder = PgEntryStore::push_entries(&records);
        let sql = builder.sql();

        assert!(sql.starts_with("INSERT INTO open_data_entries ("));
        assert!(sql.contains("orden_electronica"));
        assert!(sql.contains("codigo_acuerdo_marco"));
        // One placeholder per vocabulary field plus the agreement code,
        // for each of the two records.
        let placeholders = sql.matches('$').count();
        assert_eq!(placeholders, (FIELDS.len() + 1) * 2);
    }

    #[test]
    fn test_alert_upsert_sql_preserves_status() {
        let alerts = vec![AlertRecord {
            orden_electronica: "E-2024-1-1".to_string(),
            acuerdo_marco: "EXT-CE-2024-11 Cómputo".to_string(),
            brand_name: "ZEUS".to_string(),
            status: ALERT_STATUS_PENDING.to_string(),
            notes: "detected".to_string(),
        }];
        let builder = PgEntryStore::push_alerts(&alerts);
        let sql = builder.sql();

        assert!(sql.contains("ON CONFLICT (orden_electronica, acuerdo_marco)"));
        assert!(sql.contains("brand_name = EXCLUDED.brand_name"));
        // The workflow state is advanced elsewhere; the upsert must not
        // reset it.
        assert!(!sql.contains("status = EXCLUDED.status"));
    }
}
