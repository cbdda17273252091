// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relay Engine: the orchestration core.
//!
//! A relay request resolves the user's proxy account, consumes one quota
//! transaction, and executes the payload through the proxy. Provisioning is
//! deliberately not part of this path; an unprovisioned user is a rejection,
//! and creating the account is the caller's separate, explicit step.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes};

use crate::directory::AccountDirectory;
use crate::error::GatewayError;
use crate::ledger::{Ledger, RelayReceipt};
use crate::models::Username;
use crate::quota::QuotaManager;

pub struct RelayEngine {
    directory: Arc<AccountDirectory>,
    quota: Arc<QuotaManager>,
    ledger: Arc<dyn Ledger>,
}

impl RelayEngine {
    pub fn new(
        directory: Arc<AccountDirectory>,
        quota: Arc<QuotaManager>,
        ledger: Arc<dyn Ledger>,
    ) -> Self {
        Self {
            directory,
            quota,
            ledger,
        }
    }

    /// Relay `payload` to `target` through the user's proxy account.
    ///
    /// Quota is consumed at admission, before execution. A ledger failure
    /// after that point does not refund the transaction and is not retried;
    /// the caller sees the `LedgerError` and the counter stays decremented.
    pub async fn relay(
        &self,
        username: &Username,
        target: Address,
        payload: Bytes,
    ) -> Result<RelayReceipt, GatewayError> {
        let account = self
            .directory
            .resolve(username, target)
            .await?
            .ok_or(GatewayError::AccountNotProvisioned)?;

        if !self.quota.admit(username, target).await? {
            return Err(GatewayError::QuotaExhausted);
        }

        let receipt = self.ledger.execute(account, target, payload).await?;
        tracing::info!(
            user = %username,
            %target,
            %account,
            tx = %receipt.tx_hash,
            "call relayed"
        );
        Ok(receipt)
    }
}
