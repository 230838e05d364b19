//! Per-wallet serialization. client-cli keeps wallet and mempool state in
//! plain files with no locking of its own, so at most one invocation chain
//! may touch a given walletID at a time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Default)]
pub struct WalletLocks {
    inner: Mutex<HashMap<u64, Arc<AsyncMutex<()>>>>,
}

impl WalletLocks {
    pub fn new() -> Self { Self::default() }

    /// Wait for exclusive use of `wallet_id`. Released when the guard drops.
    pub async fn acquire(&self, wallet_id: u64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
            // Entries nobody holds or waits on.
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
            map.entry(wallet_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}
