//! Per-account mutual exclusion inside the process.
//!
//! Locks for one operation are always taken in ascending account id order,
//! so two transfers between the same pair of accounts in opposite directions
//! can never wait on each other in a cycle.
//!
//! An entry lives only while someone holds or waits for it; the last holder
//! removes it on release.

use crate::error::{LedgerError, LedgerResult};
use dashmap::DashMap;
use paybank_core::AccountId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = DashMap<AccountId, Arc<Mutex<()>>>;

/// Table of account mutexes, created on first use
#[derive(Debug, Default)]
pub struct AccountLocks {
    table: Arc<LockTable>,
}

/// Held locks; released on drop
#[derive(Debug)]
pub struct AccountLockSet {
    ids: Vec<AccountId>,
    guards: Vec<OwnedMutexGuard<()>>,
    table: Arc<LockTable>,
}

impl Drop for AccountLockSet {
    fn drop(&mut self) {
        self.guards.clear();
        // strong_count == 1: only the table still refers to the mutex
        for id in &self.ids {
            self.table
                .remove_if(id, |_, mutex| Arc::strong_count(mutex) == 1);
        }
    }
}

impl AccountLockSet {
    /// Locked ids, in acquisition order
    pub fn ids(&self) -> &[AccountId] {
        &self.ids
    }
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock every id in `ids` (deduplicated, ascending)
    pub async fn acquire(
        &self,
        ids: &[AccountId],
        timeout: Duration,
    ) -> LedgerResult<AccountLockSet> {
        let mut ordered = ids.to_vec();
        ordered.sort();
        ordered.dedup();

        let mut set = AccountLockSet {
            guards: Vec::with_capacity(ordered.len()),
            ids: ordered,
            table: Arc::clone(&self.table),
        };
        for i in 0..set.ids.len() {
            let id = set.ids[i];
            let mutex = self.table.entry(id).or_default().clone();
            match tokio::time::timeout(timeout, mutex.lock_owned()).await {
                Ok(guard) => set.guards.push(guard),
                // dropping `set` releases what was taken so far
                Err(_) => {
                    return Err(LedgerError::aborted(format!(
                        "timed out after {timeout:?} waiting for lock on account {id}"
                    )))
                }
            }
        }

        Ok(set)
    }

    /// Number of accounts currently locked or awaited
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
