// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::directory::AccountDirectory;
use crate::ledger::Ledger;
use crate::quota::QuotaManager;
use crate::relay::RelayEngine;

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<AccountDirectory>,
    pub quota: Arc<QuotaManager>,
    pub relay: Arc<RelayEngine>,
    pub ledger: Arc<dyn Ledger>,
}

impl AppState {
    /// Wire the component graph around a single ledger client.
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        let directory = Arc::new(AccountDirectory::new(ledger.clone()));
        let quota = Arc::new(QuotaManager::new(ledger.clone()));
        let relay = Arc::new(RelayEngine::new(
            directory.clone(),
            quota.clone(),
            ledger.clone(),
        ));
        Self {
            directory,
            quota,
            relay,
            ledger,
        }
    }
}
