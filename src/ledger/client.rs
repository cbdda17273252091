// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM ledger client.
//!
//! Holds the gateway's signing authority (the "owner" key) as an explicit
//! capability: every registry write, proxy deployment, and relayed call is
//! signed with the wallet passed in at construction. Every ledger call is
//! bounded by the configured timeout.

use std::future::Future;
use std::time::Duration;

use alloy::{
    network::{Ethereum, EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;

use crate::config::GatewayConfig;

use super::contracts::{ProxyAccount, QuotaRegistry};
use super::types::{ChainConfig, LedgerError, RelayReceipt};
use super::Ledger;

/// Signing HTTP provider (all fillers plus the owner wallet).
type SigningProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

/// EVM ledger client for the gateway.
pub struct EvmLedger {
    /// Chain configuration
    chain: ChainConfig,
    /// Alloy HTTP provider with the owner wallet attached
    provider: SigningProvider,
    /// Quota Registry bound to the configured address
    registry: QuotaRegistry<SigningProvider>,
    /// Creation bytecode for new proxy accounts
    account_bytecode: Bytes,
    /// Upper bound on every ledger call
    timeout: Duration,
}

impl EvmLedger {
    /// Create a new client from the gateway configuration.
    pub fn new(config: &GatewayConfig) -> Result<Self, LedgerError> {
        let signer = Self::create_signer(&config.owner_key)?;
        let wallet = EthereumWallet::from(signer);

        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(config.rpc_url.clone());

        let registry = QuotaRegistry::new(&provider, config.registry);

        Ok(Self {
            chain: config.chain.clone(),
            provider,
            registry,
            account_bytecode: config.account_bytecode.clone(),
            timeout: config.ledger_timeout,
        })
    }

    /// Verify the RPC endpoint serves the configured chain.
    ///
    /// Called once at startup; a mismatch here means every subsequent write
    /// would land on the wrong network.
    pub async fn verify_chain(&self) -> Result<(), LedgerError> {
        let Some(expected) = self.chain.chain_id else {
            return Ok(());
        };

        let actual = self
            .bounded(async {
                self.provider
                    .get_chain_id()
                    .await
                    .map_err(|e| LedgerError::Rpc(e.to_string()))
            })
            .await?;

        if actual != expected {
            return Err(LedgerError::Rpc(format!(
                "RPC endpoint serves chain {actual}, expected {expected}"
            )));
        }
        Ok(())
    }

    /// Get the chain configuration.
    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    /// Create a signer from a private key (hex string, 0x prefix optional).
    fn create_signer(private_key_hex: &str) -> Result<PrivateKeySigner, LedgerError> {
        let hex = private_key_hex.trim_start_matches("0x");
        let key_bytes = alloy::hex::decode(hex)
            .map_err(|e| LedgerError::InvalidSigningKey(e.to_string()))?;

        PrivateKeySigner::from_slice(&key_bytes)
            .map_err(|e| LedgerError::InvalidSigningKey(e.to_string()))
    }

    /// Bound a ledger call by the configured timeout.
    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, LedgerError>>,
    ) -> Result<T, LedgerError> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| LedgerError::Timeout(self.timeout))?
    }
}

#[async_trait]
impl Ledger for EvmLedger {
    async fn chain_height(&self) -> Result<u64, LedgerError> {
        self.bounded(async {
            self.provider
                .get_block_number()
                .await
                .map_err(|e| LedgerError::Rpc(e.to_string()))
        })
        .await
    }

    async fn user_account(
        &self,
        username: &str,
        target: Address,
    ) -> Result<Option<Address>, LedgerError> {
        self.bounded(self.registry.user_account(username, target))
            .await
    }

    async fn register_account(
        &self,
        username: &str,
        target: Address,
        account: Address,
    ) -> Result<(), LedgerError> {
        self.bounded(self.registry.add_user(username, target, account))
            .await
    }

    async fn deploy_account(&self) -> Result<Address, LedgerError> {
        self.bounded(async {
            let tx =
                TransactionRequest::default().with_deploy_code(self.account_bytecode.clone());

            let pending = self
                .provider
                .send_transaction(tx)
                .await
                .map_err(|e| LedgerError::TransactionFailed(e.to_string()))?;

            let receipt = pending
                .get_receipt()
                .await
                .map_err(|e| LedgerError::TransactionFailed(e.to_string()))?;

            if !receipt.status() {
                return Err(LedgerError::Reverted(format!(
                    "proxy account deployment reverted in tx {:?}",
                    receipt.transaction_hash
                )));
            }

            receipt.contract_address.ok_or_else(|| {
                LedgerError::TransactionFailed(
                    "deployment receipt carries no contract address".to_string(),
                )
            })
        })
        .await
    }

    async fn remaining_txs(&self, username: &str, target: Address) -> Result<u64, LedgerError> {
        self.bounded(self.registry.remaining_txs(username, target))
            .await
    }

    async fn consume_tx(&self, username: &str, target: Address) -> Result<(), LedgerError> {
        self.bounded(self.registry.use_tx(username, target)).await
    }

    async fn add_txs(
        &self,
        username: &str,
        target: Address,
        count: u64,
    ) -> Result<u64, LedgerError> {
        self.bounded(async {
            self.registry.add_txs(username, target, count).await?;
            self.registry.remaining_txs(username, target).await
        })
        .await
    }

    async fn execute(
        &self,
        account: Address,
        target: Address,
        payload: Bytes,
    ) -> Result<RelayReceipt, LedgerError> {
        let proxy = ProxyAccount::new(&self.provider, account);
        self.bounded(proxy.execute(target, payload)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_signer_accepts_optional_prefix() {
        // Well-known anvil test key.
        let key = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

        let bare = EvmLedger::create_signer(key).unwrap();
        let prefixed = EvmLedger::create_signer(&format!("0x{key}")).unwrap();
        assert_eq!(bare.address(), prefixed.address());
    }

    #[test]
    fn create_signer_rejects_garbage() {
        assert!(matches!(
            EvmLedger::create_signer("not-hex"),
            Err(LedgerError::InvalidSigningKey(_))
        ));
        assert!(matches!(
            EvmLedger::create_signer("abcd"),
            Err(LedgerError::InvalidSigningKey(_))
        ));
    }
}
