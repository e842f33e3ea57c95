//! In-memory store
//!
//! Backs `--dry-run` ingestion and the test suite. Mirrors the Postgres
//! store's observable behavior: delete by agreement code, batch inserts,
//! and alert upserts that preserve the workflow `status` on update. Tests
//! can script failures to exercise the per-record fallback path.

use super::{EntryStore, StoreError};
use crate::brands::AlertRecord;
use crate::normalize::NormalizedRecord;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    entries: Vec<NormalizedRecord>,
    alerts: BTreeMap<(String, String), AlertRecord>,
    fail_entry_batches: bool,
    fail_alert_batches: bool,
    reject_orders: HashSet<String>,
}

/// Store keeping everything in process memory
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every multi-record entry insert fail, forcing the fallback
    pub async fn fail_entry_batches(&self) {
        self.inner.lock().await.fail_entry_batches = true;
    }

    /// Make every multi-record alert upsert fail, forcing the fallback
    pub async fn fail_alert_batches(&self) {
        self.inner.lock().await.fail_alert_batches = true;
    }

    /// Reject individual writes for a specific order identifier
    pub async fn reject_order(&self, order_id: &str) {
        self.inner.lock().await.reject_orders.insert(order_id.to_string());
    }

    /// Stored entries for an agreement code
    pub async fn entries_for(&self, code: &str) -> Vec<NormalizedRecord> {
        self.inner
            .lock()
            .await
            .entries
            .iter()
            .filter(|e| e.codigo_acuerdo_marco == code)
            .cloned()
            .collect()
    }

    /// All stored alerts, in key order
    pub async fn alerts(&self) -> Vec<AlertRecord> {
        self.inner.lock().await.alerts.values().cloned().collect()
    }

    /// Overwrite an alert's workflow status, as the follow-up UI would
    pub async fn set_alert_status(&self, order_id: &str, agreement: &str, status: &str) {
        let mut inner = self.inner.lock().await;
        let key = (order_id.to_string(), agreement.to_string());
        if let Some(alert) = inner.alerts.get_mut(&key) {
            alert.status = status.to_string();
        }
    }

    fn order_rejected(inner: &Inner, entry: &NormalizedRecord) -> bool {
        entry
            .order_id()
            .is_some_and(|id| inner.reject_orders.contains(id))
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn delete_agreement(&self, code: &str) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        let before = inner.entries.len();
        inner.entries.retain(|e| e.codigo_acuerdo_marco != code);
        Ok((before - inner.entries.len()) as u64)
    }

    async fn insert_entries(&self, entries: &[NormalizedRecord]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.fail_entry_batches && entries.len() > 1 {
            return Err(StoreError::Database("scripted batch failure".to_string()));
        }
        if let Some(entry) = entries.iter().find(|e| Self::order_rejected(&inner, e)) {
            return Err(StoreError::Database(format!(
                "scripted rejection of {}",
                entry.order_id().unwrap_or("<no order>")
            )));
        }
        inner.entries.extend_from_slice(entries);
        Ok(())
    }

    async fn insert_entry(&self, entry: &NormalizedRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if Self::order_rejected(&inner, entry) {
            return Err(StoreError::Database(format!(
                "scripted rejection of {}",
                entry.order_id().unwrap_or("<no order>")
            )));
        }
        inner.entries.push(entry.clone());
        Ok(())
    }

    async fn upsert_alerts(&self, alerts: &[AlertRecord]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.fail_alert_batches && alerts.len() > 1 {
            return Err(StoreError::Database("scripted batch failure".to_string()));
        }
        for alert in alerts {
            upsert_one(&mut inner, alert);
        }
        Ok(())
    }

    async fn upsert_alert(&self, alert: &AlertRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        upsert_one(&mut inner, alert);
        Ok(())
    }
}

fn upsert_one(inner: &mut Inner, alert: &AlertRecord) {
    let key = (alert.orden_electronica.clone(), alert.acuerdo_marco.clone());
    match inner.alerts.get_mut(&key) {
        Some(existing) => {
            // Same contract as the SQL upsert: refresh detection fields,
            // keep the workflow status.
            existing.brand_name = alert.brand_name.clone();
            existing.notes = alert.notes.clone();
        },
        None => {
            inner.alerts.insert(key, alert.clone());
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brands::ALERT_STATUS_PENDING;

    fn alert(order: &str, brand: &str) -> AlertRecord {
        AlertRecord {
            orden_electronica: order.to_string(),
            acuerdo_marco: "EXT-CE-2024-11 Cómputo".to_string(),
            brand_name: brand.to_string(),
            status: ALERT_STATUS_PENDING.to_string(),
            notes: format!("detected {}", brand),
        }
    }

    #[tokio::test]
    async fn test_upsert_preserves_status_on_update() {
        let store = MemoryStore::new();
        store.upsert_alert(&alert("E-1", "ZEUS")).await.unwrap();
        store
            .set_alert_status("E-1", "EXT-CE-2024-11 Cómputo", "attended")
            .await;

        // A re-upload detects the same order again.
        store.upsert_alert(&alert("E-1", "ZEUS")).await.unwrap();

        let alerts = store.alerts().await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].status, "attended");
    }

    #[tokio::test]
    async fn test_scripted_batch_failure_only_hits_batches() {
        let store = MemoryStore::new();
        store.fail_alert_batches().await;

        let batch = vec![alert("E-1", "ZEUS"), alert("E-2", "ZEUS")];
        assert!(store.upsert_alerts(&batch).await.is_err());
        assert!(store.upsert_alert(&batch[0]).await.is_ok());
    }
}
