//! Ledger engine settings, `[ledger]` section of the config file

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Max wait for the in-process account locks of one operation
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    /// Show received transfers (as CREDIT) in the recipient's history
    #[serde(default)]
    pub include_received_transfers: bool,
}

fn default_lock_timeout_ms() -> u64 {
    5_000
}

impl LedgerConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
            include_received_transfers: false,
        }
    }
}
