// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger types and errors.

use std::time::Duration;

/// Target chain configuration.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Chain name for display
    pub name: String,
    /// Chain ID expected at the RPC endpoint (checked at startup when set)
    pub chain_id: Option<u64>,
    /// RPC endpoint URL
    pub rpc_url: String,
}

/// Receipt for a relayed call, confirmed on the ledger.
#[derive(Debug, Clone)]
pub struct RelayReceipt {
    /// Transaction hash
    pub tx_hash: String,
    /// Block number where the transaction was included
    pub block_number: u64,
    /// Gas actually used
    pub gas_used: u64,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Ledger call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid signing key: {0}")]
    InvalidSigningKey(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Contract error: {0}")]
    Contract(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Transaction reverted: {0}")]
    Reverted(String),
}
