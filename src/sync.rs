// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-key critical sections.
//!
//! Provisioning and quota admission both need check-then-act sequences
//! serialized per (username, target) pair while leaving unrelated pairs free
//! to interleave. [`KeyedLocks`] hands out one async mutex per key; guards
//! are held across ledger awaits, which a sync mutex must never be.
//!
//! Entries are never evicted: the key population matches the account cache,
//! which also lives for the process lifetime.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::models::Username;

/// Canonical lock/cache key for a (username, target) pair.
pub fn scope_key(username: &Username, target: Address) -> String {
    format!("{username}@{target}")
}

/// Map of named async mutexes, created on first use.
#[derive(Default)]
pub struct KeyedLocks {
    entries: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `key`, creating it on first use.
    pub async fn acquire(&self, key: String) -> OwnedMutexGuard<()> {
        let entry = {
            let mut entries = self.entries.lock().await;
            entries.entry(key).or_default().clone()
        };
        entry.lock_owned().await
    }
}
