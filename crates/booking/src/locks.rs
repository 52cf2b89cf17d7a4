//! Per-boat serialization of the booking critical section.

use std::collections::HashMap;
use std::sync::Arc;

use common::BoatId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Hands out one async mutex per boat.
///
/// Holding the guard serializes the validate-charge-persist sequence
/// against concurrent bookings of the same boat within this process.
/// The database exclusion constraint remains the cross-process
/// backstop.
#[derive(Clone, Default)]
pub struct BoatLocks {
    locks: Arc<Mutex<HashMap<BoatId, Arc<Mutex<()>>>>>,
}

impl BoatLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for a boat, waiting if another booking for
    /// the same boat is in flight.
    pub async fn acquire(&self, boat: BoatId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(boat).or_default())
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_boat_serializes() {
        let locks = BoatLocks::new();
        let boat = BoatId::new();

        let guard = locks.acquire(boat).await;

        let locks2 = locks.clone();
        let contender = tokio::spawn(async move { locks2.acquire(boat).await });

        // Contender cannot finish while the guard is held
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_boats_do_not_contend() {
        let locks = BoatLocks::new();

        let _guard = locks.acquire(BoatId::new()).await;
        // A different boat's lock is immediately available
        let _other = locks.acquire(BoatId::new()).await;
    }
}
