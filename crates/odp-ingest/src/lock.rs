//! Per-agreement upload serialization
//!
//! Two concurrent uploads for the same agreement code would interleave
//! their delete/insert/upsert steps and leave the stored set undefined.
//! In-process callers take the agreement's lock for the whole upload (or
//! reset) to rule that out; uploads for different agreements proceed
//! concurrently. Cross-process exclusion is out of scope and documented
//! as a deployment constraint.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of one async lock per agreement code
#[derive(Clone, Default)]
pub struct AgreementLocks {
    inner: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl AgreementLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for an agreement code, waiting if another upload
    /// for the same code is in flight
    pub async fn acquire(&self, code: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self
                .inner
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            Arc::clone(
                map.entry(code.to_string())
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_same_code_serializes() {
        let locks = AgreementLocks::new();
        let guard = locks.acquire("EXT-CE-2024-11").await;

        let second = timeout(Duration::from_millis(20), locks.acquire("EXT-CE-2024-11")).await;
        assert!(second.is_err(), "second acquire should wait");

        drop(guard);
        let third = timeout(Duration::from_millis(20), locks.acquire("EXT-CE-2024-11")).await;
        assert!(third.is_ok(), "lock should be free again");
    }

    #[tokio::test]
    async fn test_different_codes_run_concurrently() {
        let locks = AgreementLocks::new();
        let _a = locks.acquire("EXT-CE-2024-11").await;
        let b = timeout(Duration::from_millis(20), locks.acquire("IM-CE-2023-5")).await;
        assert!(b.is_ok());
    }
}
