// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Quota Manager: per-(username, target) transaction counters.
//!
//! Counters are authoritative only on the ledger and are never cached here:
//! payments land on the registry from outside this process, so every read
//! goes through. What the manager adds is the admission discipline: the
//! check-then-decrement in [`QuotaManager::admit`] runs under a per-key lock
//! so two concurrent requests cannot both spend the last transaction.

use std::sync::Arc;

use alloy::primitives::Address;

use crate::error::GatewayError;
use crate::ledger::Ledger;
use crate::models::Username;
use crate::sync::{scope_key, KeyedLocks};

pub struct QuotaManager {
    ledger: Arc<dyn Ledger>,
    locks: KeyedLocks,
}

impl QuotaManager {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self {
            ledger,
            locks: KeyedLocks::new(),
        }
    }

    /// Remaining transactions for (username, target). An absent record is 0.
    pub async fn remaining(
        &self,
        username: &Username,
        target: Address,
    ) -> Result<u64, GatewayError> {
        Ok(self.ledger.remaining_txs(username.as_str(), target).await?)
    }

    /// Admit one transaction if the counter allows it.
    ///
    /// Returns whether admission succeeded; `false` is the quota-exhausted
    /// outcome, not an error. The counter read and the consuming write are
    /// serialized per key.
    pub async fn admit(&self, username: &Username, target: Address) -> Result<bool, GatewayError> {
        let _guard = self.locks.acquire(scope_key(username, target)).await;

        let remaining = self.ledger.remaining_txs(username.as_str(), target).await?;
        if remaining == 0 {
            tracing::debug!(user = %username, %target, "admission denied, quota exhausted");
            return Ok(false);
        }

        self.ledger.consume_tx(username.as_str(), target).await?;
        Ok(true)
    }

    /// Credit `count` transactions after a payment; returns the new count.
    pub async fn credit(
        &self,
        username: &Username,
        target: Address,
        count: u64,
    ) -> Result<u64, GatewayError> {
        if count == 0 {
            return Err(GatewayError::Validation(
                "numTx must be positive".to_string(),
            ));
        }

        let _guard = self.locks.acquire(scope_key(username, target)).await;

        let remaining = self.ledger.remaining_txs(username.as_str(), target).await?;
        if remaining.checked_add(count).is_none() {
            return Err(GatewayError::Validation(
                "numTx overflows the remaining transaction counter".to_string(),
            ));
        }

        let new_remaining = self
            .ledger
            .add_txs(username.as_str(), target, count)
            .await?;
        tracing::info!(user = %username, %target, count, new_remaining, "quota credited");
        Ok(new_remaining)
    }
}
