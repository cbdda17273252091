// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Quota Registry and Proxy Account contract interactions.

use alloy::{
    primitives::{Address, Bytes, U256},
    providers::Provider,
    sol,
};

use super::types::{LedgerError, RelayReceipt};

// On-chain interfaces for the two contract types the gateway drives. The
// registry keys all state by (lowercase username, target contract address).
sol! {
    #[sol(rpc)]
    interface IQuotaRegistry {
        function getUserAccount(string username, address target) external view returns (address);
        function addUser(string username, address target, address account) external;
        function getRemainingTxs(string username, address target) external view returns (uint256);
        function useTx(string username, address target) external;
        function addTxs(string username, address target, uint256 count) external;
    }

    #[sol(rpc)]
    interface IProxyAccount {
        function call(address target, bytes data) external returns (bytes);
    }
}

/// Quota Registry contract wrapper.
pub struct QuotaRegistry<P> {
    contract: IQuotaRegistry::IQuotaRegistryInstance<P>,
}

impl<P: Provider + Clone> QuotaRegistry<P> {
    pub fn new(provider: &P, registry_address: Address) -> Self {
        Self {
            contract: IQuotaRegistry::new(registry_address, provider.clone()),
        }
    }

    /// Read the recorded proxy account for (username, target).
    ///
    /// The registry stores the zero address for unknown users; that sentinel
    /// is mapped to `None` here and must never escape as a usable address.
    pub async fn user_account(
        &self,
        username: &str,
        target: Address,
    ) -> Result<Option<Address>, LedgerError> {
        let account = self
            .contract
            .getUserAccount(username.to_string(), target)
            .call()
            .await
            .map_err(|e| LedgerError::Contract(e.to_string()))?;

        if account == Address::ZERO {
            Ok(None)
        } else {
            Ok(Some(account))
        }
    }

    /// Record (username, target) -> account. Waits for inclusion.
    pub async fn add_user(
        &self,
        username: &str,
        target: Address,
        account: Address,
    ) -> Result<(), LedgerError> {
        let pending = self
            .contract
            .addUser(username.to_string(), target, account)
            .send()
            .await
            .map_err(|e| LedgerError::TransactionFailed(e.to_string()))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| LedgerError::TransactionFailed(e.to_string()))?;

        if receipt.status() {
            Ok(())
        } else {
            Err(LedgerError::Reverted(format!(
                "addUser({username}, {target})"
            )))
        }
    }

    /// Read the remaining transaction count for (username, target).
    ///
    /// An absent record reads as zero; the registry mapping's default is the
    /// valid "no quota" state, not an error.
    pub async fn remaining_txs(&self, username: &str, target: Address) -> Result<u64, LedgerError> {
        let remaining: U256 = self
            .contract
            .getRemainingTxs(username.to_string(), target)
            .call()
            .await
            .map_err(|e| LedgerError::Contract(e.to_string()))?;

        remaining.try_into().map_err(|_| {
            LedgerError::Contract(format!(
                "remaining transaction count {remaining} exceeds supported range"
            ))
        })
    }

    /// Consume one transaction from the (username, target) counter.
    pub async fn use_tx(&self, username: &str, target: Address) -> Result<(), LedgerError> {
        let pending = self
            .contract
            .useTx(username.to_string(), target)
            .send()
            .await
            .map_err(|e| LedgerError::TransactionFailed(e.to_string()))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| LedgerError::TransactionFailed(e.to_string()))?;

        if receipt.status() {
            Ok(())
        } else {
            Err(LedgerError::Reverted(format!("useTx({username}, {target})")))
        }
    }

    /// Add `count` transactions to the (username, target) counter.
    pub async fn add_txs(
        &self,
        username: &str,
        target: Address,
        count: u64,
    ) -> Result<(), LedgerError> {
        let pending = self
            .contract
            .addTxs(username.to_string(), target, U256::from(count))
            .send()
            .await
            .map_err(|e| LedgerError::TransactionFailed(e.to_string()))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| LedgerError::TransactionFailed(e.to_string()))?;

        if receipt.status() {
            Ok(())
        } else {
            Err(LedgerError::Reverted(format!(
                "addTxs({username}, {target}, {count})"
            )))
        }
    }
}

/// Proxy Account contract wrapper.
pub struct ProxyAccount<P> {
    contract: IProxyAccount::IProxyAccountInstance<P>,
}

impl<P: Provider + Clone> ProxyAccount<P> {
    pub fn new(provider: &P, account_address: Address) -> Self {
        Self {
            contract: IProxyAccount::new(account_address, provider.clone()),
        }
    }

    /// Execute `payload` against `target` through this proxy account.
    /// Waits for inclusion and checks the revert status.
    pub async fn execute(
        &self,
        target: Address,
        payload: Bytes,
    ) -> Result<RelayReceipt, LedgerError> {
        let pending = self
            .contract
            .call(target, payload)
            .send()
            .await
            .map_err(|e| LedgerError::TransactionFailed(e.to_string()))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| LedgerError::TransactionFailed(e.to_string()))?;

        if !receipt.status() {
            return Err(LedgerError::Reverted(format!(
                "proxy call to {target} reverted in tx {:?}",
                receipt.transaction_hash
            )));
        }

        Ok(RelayReceipt {
            tx_hash: format!("{:?}", receipt.transaction_hash),
            block_number: receipt.block_number.unwrap_or(0),
            gas_used: receipt.gas_used,
        })
    }
}
