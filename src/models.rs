// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures for the REST API, plus the [`Username`]
//! key type. All wire types derive `Serialize`/`Deserialize` and `ToSchema`
//! for JSON handling and OpenAPI documentation; field names follow the
//! camelCase convention of the wire protocol.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use utoipa::ToSchema;

use crate::error::GatewayError;

// =============================================================================
// Username
// =============================================================================

/// Case-normalized username key.
///
/// Usernames are case-insensitive; the only constructor normalizes (trim,
/// NFKC, lowercase), so holding a `Username` is proof the value is in
/// canonical form. Every entry point parses raw input through here before
/// touching the directory, quota manager, or ledger.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    pub fn parse(raw: &str) -> Result<Self, GatewayError> {
        let normalized: String = raw.trim().nfkc().collect::<String>().to_lowercase();
        if normalized.is_empty() {
            return Err(GatewayError::Validation("username is required".to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Account Models
// =============================================================================

/// Response for resolving a user's proxy account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolveAccountResponse {
    /// Proxy account address, or null when the user is not provisioned.
    pub user_account: Option<String>,
}

/// Request to provision a proxy account for a user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionAccountRequest {
    /// Username to provision (case-insensitive).
    pub username: String,
    /// Target contract address scoping the account.
    pub contract_address: String,
}

/// Response after provisioning (or finding) a proxy account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionAccountResponse {
    /// Outcome message.
    pub message: String,
    /// The user's proxy account address.
    pub user_account: String,
}

// =============================================================================
// Relay Models
// =============================================================================

/// Request to relay a call through a user's proxy account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelayCallRequest {
    /// Username whose proxy account executes the call.
    pub username: String,
    /// Target contract address.
    pub contract_address: String,
    /// ABI-encoded call payload (0x-hex).
    pub tx_data: String,
}

// =============================================================================
// Quota Models
// =============================================================================

/// Request to credit transactions after a payment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Username being credited.
    pub username: String,
    /// Target contract the credit applies to.
    pub contract_address: String,
    /// Number of transactions purchased.
    pub num_tx: u64,
}

/// Remaining transaction count for a (user, target) pair.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemainingTxsResponse {
    /// Transactions left before the next payment is required.
    pub remaining_txs: u64,
}
