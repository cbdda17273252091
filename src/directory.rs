// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account Directory: username -> proxy account resolution and provisioning.
//!
//! The Quota Registry on the ledger is the source of truth; the in-process
//! cache only short-circuits repeated reads. Cache entries are write-once
//! (a provisioned account never changes) and only ledger-confirmed addresses
//! are inserted, so the cache cannot diverge from the registry. There is no
//! eviction: entries live for the process lifetime and the whole map is
//! rebuildable from the registry on restart.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::RwLock;

use crate::error::GatewayError;
use crate::ledger::Ledger;
use crate::models::Username;
use crate::sync::{scope_key, KeyedLocks};

/// Outcome of a provisioning request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provisioned {
    /// The user's proxy account address.
    pub account: Address,
    /// Whether this call deployed the account (false: it already existed).
    pub created: bool,
}

/// Directory of provisioned proxy accounts, keyed by (username, target).
pub struct AccountDirectory {
    ledger: Arc<dyn Ledger>,
    cache: RwLock<HashMap<String, Address>>,
    locks: KeyedLocks,
}

impl AccountDirectory {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self {
            ledger,
            cache: RwLock::new(HashMap::new()),
            locks: KeyedLocks::new(),
        }
    }

    /// Resolve the proxy account for (username, target).
    ///
    /// Checks the cache first; on a miss, reads the registry and caches a
    /// confirmed address. `None` means the user is not provisioned in this
    /// scope.
    pub async fn resolve(
        &self,
        username: &Username,
        target: Address,
    ) -> Result<Option<Address>, GatewayError> {
        let key = scope_key(username, target);

        if let Some(account) = self.cache.read().await.get(&key) {
            tracing::debug!(user = %username, %target, %account, "account cache hit");
            return Ok(Some(*account));
        }

        match self.ledger.user_account(username.as_str(), target).await? {
            Some(account) => {
                tracing::debug!(user = %username, %target, %account, "account cached from registry");
                self.cache.write().await.insert(key, account);
                Ok(Some(account))
            }
            None => Ok(None),
        }
    }

    /// Provision a proxy account for (username, target), idempotently.
    ///
    /// The whole check-deploy-register sequence runs under the per-key lock;
    /// a concurrent provision for the same pair waits and then finds the
    /// recorded account on its re-check, so at most one address is ever
    /// registered.
    pub async fn provision(
        &self,
        username: &Username,
        target: Address,
    ) -> Result<Provisioned, GatewayError> {
        let _guard = self.locks.acquire(scope_key(username, target)).await;

        if let Some(account) = self.resolve(username, target).await? {
            return Ok(Provisioned {
                account,
                created: false,
            });
        }

        let account = self.ledger.deploy_account().await?;
        tracing::info!(user = %username, %target, %account, "proxy account deployed");

        if let Err(err) = self
            .ledger
            .register_account(username.as_str(), target, account)
            .await
        {
            // The account is live but unrecorded; nothing references it, so
            // a later provision deploys a fresh one. Known gap, no
            // reconciliation pass exists.
            tracing::error!(
                user = %username,
                %target,
                orphaned_account = %account,
                error = %err,
                "registry write failed after deployment; account is orphaned"
            );
            return Err(err.into());
        }

        self.cache
            .write()
            .await
            .insert(scope_key(username, target), account);
        tracing::info!(user = %username, %target, %account, "proxy account registered");

        Ok(Provisioned {
            account,
            created: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::mock::MockLedger;

    fn target() -> Address {
        Address::repeat_byte(0xF4)
    }

    fn bob() -> Username {
        Username::parse("Bob").unwrap()
    }

    #[tokio::test]
    async fn resolve_unprovisioned_returns_none() {
        let ledger = Arc::new(MockLedger::new());
        let directory = AccountDirectory::new(ledger);

        let resolved = directory.resolve(&bob(), target()).await.unwrap();
        assert_eq!(resolved, None);
    }

    #[tokio::test]
    async fn resolve_caches_registry_hits() {
        let ledger = Arc::new(MockLedger::new());
        let account = Address::repeat_byte(0x11);
        ledger.seed_account("bob", target(), account).await;

        let directory = AccountDirectory::new(ledger.clone());

        let first = directory.resolve(&bob(), target()).await.unwrap();
        assert_eq!(first, Some(account));
        assert_eq!(ledger.account_reads(), 1);

        // Second resolve is served from the cache: no further registry read,
        // same address.
        let second = directory.resolve(&bob(), target()).await.unwrap();
        assert_eq!(second, Some(account));
        assert_eq!(ledger.account_reads(), 1);
    }

    #[tokio::test]
    async fn provision_is_idempotent() {
        let ledger = Arc::new(MockLedger::new());
        let directory = AccountDirectory::new(ledger.clone());

        let first = directory.provision(&bob(), target()).await.unwrap();
        assert!(first.created);

        let second = directory.provision(&bob(), target()).await.unwrap();
        assert!(!second.created);
        assert_eq!(second.account, first.account);
        assert_eq!(ledger.register_calls(), 1);
    }

    #[tokio::test]
    async fn concurrent_provision_records_exactly_one_account() {
        let ledger = Arc::new(MockLedger::new());
        let directory = Arc::new(AccountDirectory::new(ledger.clone()));

        let user = bob();
        let (a, b) = tokio::join!(
            directory.provision(&user, target()),
            directory.provision(&user, target()),
        );
        let a = a.unwrap();
        let b = b.unwrap();

        assert_eq!(a.account, b.account);
        assert_eq!(ledger.register_calls(), 1);
        // Exactly one of the two interleaved calls created the account.
        assert!(a.created ^ b.created);
    }

    #[tokio::test]
    async fn provision_scopes_accounts_per_target() {
        let ledger = Arc::new(MockLedger::new());
        let directory = AccountDirectory::new(ledger);
        let other_target = Address::repeat_byte(0xC0);

        let first = directory.provision(&bob(), target()).await.unwrap();
        let second = directory.provision(&bob(), other_target).await.unwrap();

        assert!(first.created);
        assert!(second.created);
        assert_ne!(first.account, second.account);
    }

    #[tokio::test]
    async fn failed_registry_write_caches_nothing() {
        let ledger = Arc::new(MockLedger::new());
        let directory = AccountDirectory::new(ledger.clone());

        ledger.fail_register(true);
        let err = directory.provision(&bob(), target()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Ledger(_)));

        // The deployed account was orphaned; the user still resolves as
        // unprovisioned and a retry deploys a fresh account.
        ledger.fail_register(false);
        assert_eq!(directory.resolve(&bob(), target()).await.unwrap(), None);

        let retried = directory.provision(&bob(), target()).await.unwrap();
        assert!(retried.created);
        assert_eq!(
            directory.resolve(&bob(), target()).await.unwrap(),
            Some(retried.account)
        );
    }

    #[tokio::test]
    async fn usernames_resolve_case_insensitively() {
        let ledger = Arc::new(MockLedger::new());
        let directory = AccountDirectory::new(ledger);

        let provisioned = directory
            .provision(&Username::parse("Bob").unwrap(), target())
            .await
            .unwrap();

        let resolved = directory
            .resolve(&Username::parse("bob").unwrap(), target())
            .await
            .unwrap();
        assert_eq!(resolved, Some(provisioned.account));
    }
}
