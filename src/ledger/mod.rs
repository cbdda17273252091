// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger integration module.
//!
//! This module provides functionality for:
//! - Reading and writing the Quota Registry (account records, tx counters)
//! - Deploying per-user Proxy Account contracts
//! - Executing relayed calls through a Proxy Account
//!
//! The [`Ledger`] trait is the narrow seam the rest of the gateway depends
//! on; [`EvmLedger`] is the production implementation.

use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;

pub mod client;
pub mod contracts;
pub mod types;

#[cfg(test)]
pub mod mock;

pub use client::EvmLedger;
pub use types::*;

/// Read/write access to on-chain gateway state.
///
/// Usernames crossing this boundary are already normalized; implementations
/// treat them as opaque keys. All writes are confirmed (receipt checked)
/// before returning.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Current chain height. Used as a reachability probe.
    async fn chain_height(&self) -> Result<u64, LedgerError>;

    /// Recorded proxy account for (username, target), if provisioned.
    async fn user_account(
        &self,
        username: &str,
        target: Address,
    ) -> Result<Option<Address>, LedgerError>;

    /// Record (username, target) -> account in the Quota Registry.
    async fn register_account(
        &self,
        username: &str,
        target: Address,
        account: Address,
    ) -> Result<(), LedgerError>;

    /// Deploy a fresh proxy account and wait until it is live.
    async fn deploy_account(&self) -> Result<Address, LedgerError>;

    /// Remaining transaction count for (username, target); absent records
    /// read as zero.
    async fn remaining_txs(&self, username: &str, target: Address) -> Result<u64, LedgerError>;

    /// Consume one transaction from the (username, target) counter.
    async fn consume_tx(&self, username: &str, target: Address) -> Result<(), LedgerError>;

    /// Add `count` transactions to the counter; returns the new remaining
    /// count.
    async fn add_txs(&self, username: &str, target: Address, count: u64)
        -> Result<u64, LedgerError>;

    /// Execute `payload` against `target` through `account`.
    async fn execute(
        &self,
        account: Address,
        target: Address,
        payload: Bytes,
    ) -> Result<RelayReceipt, LedgerError>;
}
