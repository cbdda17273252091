// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Deterministic in-memory [`Ledger`] for component tests.
//!
//! Every method yields once before touching state so that concurrent callers
//! actually interleave; the race-protection tests depend on that suspension
//! point.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Ledger, LedgerError, RelayReceipt};

type Key = (String, Address);

#[derive(Default)]
struct MockState {
    accounts: HashMap<Key, Address>,
    quotas: HashMap<Key, u64>,
    executed: Vec<(Address, Address, Bytes)>,
    deployed: u64,
}

/// In-memory ledger double with call counters for cache assertions.
#[derive(Default)]
pub struct MockLedger {
    state: Mutex<MockState>,
    account_reads: AtomicUsize,
    register_calls: AtomicUsize,
    fail_register: AtomicBool,
    fail_execute: AtomicBool,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-record an account without going through provisioning.
    pub async fn seed_account(&self, username: &str, target: Address, account: Address) {
        self.state
            .lock()
            .await
            .accounts
            .insert((username.to_string(), target), account);
    }

    /// Pre-seed a quota counter.
    pub async fn seed_quota(&self, username: &str, target: Address, remaining: u64) {
        self.state
            .lock()
            .await
            .quotas
            .insert((username.to_string(), target), remaining);
    }

    /// Make the next `register_account` calls fail.
    pub fn fail_register(&self, fail: bool) {
        self.fail_register.store(fail, Ordering::SeqCst);
    }

    /// Make the next `execute` calls revert.
    pub fn fail_execute(&self, fail: bool) {
        self.fail_execute.store(fail, Ordering::SeqCst);
    }

    /// Number of `user_account` registry reads observed.
    pub fn account_reads(&self) -> usize {
        self.account_reads.load(Ordering::SeqCst)
    }

    /// Number of `register_account` writes observed.
    pub fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    /// Calls executed through proxy accounts, in order.
    pub async fn executed(&self) -> Vec<(Address, Address, Bytes)> {
        self.state.lock().await.executed.clone()
    }

    fn nth_account(n: u64) -> Address {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&n.to_be_bytes());
        Address::from(bytes)
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn chain_height(&self) -> Result<u64, LedgerError> {
        tokio::task::yield_now().await;
        Ok(1)
    }

    async fn user_account(
        &self,
        username: &str,
        target: Address,
    ) -> Result<Option<Address>, LedgerError> {
        tokio::task::yield_now().await;
        self.account_reads.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().await;
        Ok(state.accounts.get(&(username.to_string(), target)).copied())
    }

    async fn register_account(
        &self,
        username: &str,
        target: Address,
        account: Address,
    ) -> Result<(), LedgerError> {
        tokio::task::yield_now().await;
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_register.load(Ordering::SeqCst) {
            return Err(LedgerError::TransactionFailed(
                "registry write rejected".to_string(),
            ));
        }
        let mut state = self.state.lock().await;
        state
            .accounts
            .insert((username.to_string(), target), account);
        Ok(())
    }

    async fn deploy_account(&self) -> Result<Address, LedgerError> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().await;
        state.deployed += 1;
        Ok(Self::nth_account(state.deployed))
    }

    async fn remaining_txs(&self, username: &str, target: Address) -> Result<u64, LedgerError> {
        tokio::task::yield_now().await;
        let state = self.state.lock().await;
        Ok(state
            .quotas
            .get(&(username.to_string(), target))
            .copied()
            .unwrap_or(0))
    }

    async fn consume_tx(&self, username: &str, target: Address) -> Result<(), LedgerError> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().await;
        let remaining = state
            .quotas
            .entry((username.to_string(), target))
            .or_insert(0);
        // The on-chain registry reverts rather than wrapping below zero.
        *remaining = remaining
            .checked_sub(1)
            .ok_or_else(|| LedgerError::Reverted(format!("useTx({username}, {target})")))?;
        Ok(())
    }

    async fn add_txs(
        &self,
        username: &str,
        target: Address,
        count: u64,
    ) -> Result<u64, LedgerError> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().await;
        let remaining = state
            .quotas
            .entry((username.to_string(), target))
            .or_insert(0);
        *remaining = remaining
            .checked_add(count)
            .ok_or_else(|| LedgerError::Reverted(format!("addTxs({username}, {target})")))?;
        Ok(*remaining)
    }

    async fn execute(
        &self,
        account: Address,
        target: Address,
        payload: Bytes,
    ) -> Result<RelayReceipt, LedgerError> {
        tokio::task::yield_now().await;
        if self.fail_execute.load(Ordering::SeqCst) {
            return Err(LedgerError::Reverted(format!(
                "proxy call to {target} reverted"
            )));
        }
        let mut state = self.state.lock().await;
        state.executed.push((account, target, payload));
        Ok(RelayReceipt {
            tx_hash: format!("0xmock{:04x}", state.executed.len()),
            block_number: state.executed.len() as u64,
            gas_used: 21_000,
        })
    }
}
