//! Batch writes with per-record fallback
//!
//! Both the primary writer and the alert reconciler write in fixed-size
//! batches and degrade to one-at-a-time writes when a batch fails, so a
//! single bad record cannot sink the records around it. The helper is
//! generic over the item type and the two write operations; callers pass
//! the store methods as closures.

use crate::store::StoreError;
use std::future::Future;

/// Outcome of a batched write pass
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Items written, whether via a batch or an individual retry
    pub written: usize,
    /// Diagnostics for failed batches and failed individual retries
    pub errors: Vec<String>,
}

/// Write `items` in batches of `batch_size`, falling back per record
///
/// A failed batch is retried record by record; each individual failure is
/// recorded with `describe(item)` for context and does not stop later
/// records or later batches.
pub async fn write_with_fallback<'a, T, BatchFut, OneFut>(
    items: &'a [T],
    batch_size: usize,
    mut write_batch: impl FnMut(&'a [T]) -> BatchFut,
    mut write_one: impl FnMut(&'a T) -> OneFut,
    describe: impl Fn(&T) -> String,
) -> BatchReport
where
    BatchFut: Future<Output = Result<(), StoreError>>,
    OneFut: Future<Output = Result<(), StoreError>>,
{
    let mut report = BatchReport::default();

    for batch in items.chunks(batch_size.max(1)) {
        match write_batch(batch).await {
            Ok(()) => report.written += batch.len(),
            Err(batch_error) => {
                tracing::warn!(
                    batch_len = batch.len(),
                    error = %batch_error,
                    "Batch write failed, retrying records individually"
                );
                report
                    .errors
                    .push(format!("Batch of {} failed: {}", batch.len(), batch_error));

                for item in batch {
                    match write_one(item).await {
                        Ok(()) => report.written += 1,
                        Err(error) => {
                            report
                                .errors
                                .push(format!("{}: {}", describe(item), error));
                        },
                    }
                }
            },
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn batch_ok(_: &[i32]) -> Result<(), StoreError> {
        Ok(())
    }

    async fn batch_fail(_: &[i32]) -> Result<(), StoreError> {
        Err(StoreError::Database("batch rejected".to_string()))
    }

    async fn one_reject_13(item: &i32) -> Result<(), StoreError> {
        if *item == 13 {
            Err(StoreError::Database("unlucky".to_string()))
        } else {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_all_batches_succeed() {
        let items: Vec<i32> = (0..250).collect();
        let report =
            write_with_fallback(&items, 100, batch_ok, one_reject_13, |i| i.to_string()).await;
        assert_eq!(report.written, 250);
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn test_failed_batch_degrades_to_singles() {
        let items = vec![1, 13, 2];
        let report =
            write_with_fallback(&items, 10, batch_fail, one_reject_13, |i| format!("item {}", i))
                .await;
        // 1 and 2 survive the fallback; 13 is reported.
        assert_eq!(report.written, 2);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].contains("Batch of 3 failed"));
        assert!(report.errors[1].contains("item 13"));
    }

    #[tokio::test]
    async fn test_later_batches_run_after_a_failure() {
        let items: Vec<i32> = vec![13; 4];
        let report = write_with_fallback(
            &items,
            2,
            batch_fail,
            one_reject_13,
            |i| i.to_string(),
        )
        .await;
        assert_eq!(report.written, 0);
        // Two batch diagnostics plus four per-record diagnostics.
        assert_eq!(report.errors.len(), 6);
    }

    #[tokio::test]
    async fn test_empty_input_is_a_noop() {
        let items: Vec<i32> = Vec::new();
        let report =
            write_with_fallback(&items, 100, batch_fail, one_reject_13, |i| i.to_string()).await;
        assert_eq!(report.written, 0);
        assert!(report.errors.is_empty());
    }
}
