// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup; a missing or
//! malformed value fails startup with a [`ConfigError`] naming the variable.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `RPC_URL` | Ledger JSON-RPC endpoint | Required |
//! | `CHAIN_ID` | Expected chain id, checked against the endpoint at startup | Optional |
//! | `CHAIN_NAME` | Chain name for display | `evm` |
//! | `OWNER_PRIVATE_KEY` | Hex-encoded owner signing key | Required |
//! | `REGISTRY_ADDRESS` | Quota Registry contract address | Required |
//! | `ACCOUNT_BYTECODE` | 0x-hex creation bytecode of the Proxy Account contract | Required |
//! | `LEDGER_TIMEOUT_SECS` | Upper bound on every ledger call | `30` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::{Address, Bytes};
use url::Url;

use crate::ledger::ChainConfig;

pub const RPC_URL_ENV: &str = "RPC_URL";
pub const CHAIN_ID_ENV: &str = "CHAIN_ID";
pub const CHAIN_NAME_ENV: &str = "CHAIN_NAME";
pub const OWNER_PRIVATE_KEY_ENV: &str = "OWNER_PRIVATE_KEY";
pub const REGISTRY_ADDRESS_ENV: &str = "REGISTRY_ADDRESS";
pub const ACCOUNT_BYTECODE_ENV: &str = "ACCOUNT_BYTECODE";
pub const LEDGER_TIMEOUT_SECS_ENV: &str = "LEDGER_TIMEOUT_SECS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{0} is invalid: {1}")]
    Invalid(&'static str, String),
}

/// Gateway runtime configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Target chain description
    pub chain: ChainConfig,
    /// Parsed RPC endpoint
    pub rpc_url: Url,
    /// Hex-encoded owner signing key (the gateway's sole signing authority)
    pub owner_key: String,
    /// Quota Registry contract address
    pub registry: Address,
    /// Creation bytecode for deploying Proxy Account instances
    pub account_bytecode: Bytes,
    /// Upper bound on every ledger call
    pub ledger_timeout: Duration,
    /// Server bind address
    pub host: String,
    /// Server bind port
    pub port: u16,
}

impl GatewayConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup (tests inject maps).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_rpc_url = lookup(RPC_URL_ENV).ok_or(ConfigError::Missing(RPC_URL_ENV))?;
        let rpc_url: Url = raw_rpc_url
            .parse()
            .map_err(|e: url::ParseError| ConfigError::Invalid(RPC_URL_ENV, e.to_string()))?;

        let chain_id = lookup(CHAIN_ID_ENV)
            .map(|raw| {
                raw.parse::<u64>()
                    .map_err(|e| ConfigError::Invalid(CHAIN_ID_ENV, e.to_string()))
            })
            .transpose()?;

        let name = lookup(CHAIN_NAME_ENV).unwrap_or_else(|| "evm".to_string());

        let owner_key = lookup(OWNER_PRIVATE_KEY_ENV)
            .ok_or(ConfigError::Missing(OWNER_PRIVATE_KEY_ENV))?;

        let registry_raw =
            lookup(REGISTRY_ADDRESS_ENV).ok_or(ConfigError::Missing(REGISTRY_ADDRESS_ENV))?;
        let registry = Address::from_str(&registry_raw)
            .map_err(|e| ConfigError::Invalid(REGISTRY_ADDRESS_ENV, e.to_string()))?;

        let bytecode_raw =
            lookup(ACCOUNT_BYTECODE_ENV).ok_or(ConfigError::Missing(ACCOUNT_BYTECODE_ENV))?;
        let account_bytecode = alloy::hex::decode(bytecode_raw.trim_start_matches("0x"))
            .map(Bytes::from)
            .map_err(|e| ConfigError::Invalid(ACCOUNT_BYTECODE_ENV, e.to_string()))?;
        if account_bytecode.is_empty() {
            return Err(ConfigError::Invalid(
                ACCOUNT_BYTECODE_ENV,
                "creation bytecode is empty".to_string(),
            ));
        }

        let ledger_timeout = match lookup(LEDGER_TIMEOUT_SECS_ENV) {
            Some(raw) => Duration::from_secs(
                raw.parse::<u64>()
                    .map_err(|e| ConfigError::Invalid(LEDGER_TIMEOUT_SECS_ENV, e.to_string()))?,
            ),
            None => Duration::from_secs(30),
        };

        let host = lookup(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup(PORT_ENV) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| ConfigError::Invalid(PORT_ENV, e.to_string()))?,
            None => 8080,
        };

        Ok(Self {
            chain: ChainConfig {
                name,
                chain_id,
                rpc_url: raw_rpc_url,
            },
            rpc_url,
            owner_key,
            registry,
            account_bytecode,
            ledger_timeout,
            host,
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (RPC_URL_ENV, "http://127.0.0.1:8545"),
            (
                OWNER_PRIVATE_KEY_ENV,
                "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            ),
            (
                REGISTRY_ADDRESS_ENV,
                "0xF4AD185A9E575b77dc671860469e41bf42782810",
            ),
            (ACCOUNT_BYTECODE_ENV, "0x6080604052"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<GatewayConfig, ConfigError> {
        GatewayConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn loads_with_defaults() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.ledger_timeout, Duration::from_secs(30));
        assert_eq!(config.chain.name, "evm");
        assert_eq!(config.chain.chain_id, None);
        assert_eq!(config.account_bytecode.len(), 5);
    }

    #[test]
    fn missing_required_vars_fail_by_name() {
        for required in [
            RPC_URL_ENV,
            OWNER_PRIVATE_KEY_ENV,
            REGISTRY_ADDRESS_ENV,
            ACCOUNT_BYTECODE_ENV,
        ] {
            let mut env = base_env();
            env.remove(required);
            match load(&env) {
                Err(ConfigError::Missing(name)) => assert_eq!(name, required),
                other => panic!("expected Missing({required}), got {other:?}"),
            }
        }
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut env = base_env();
        env.insert(RPC_URL_ENV, "not a url");
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid(RPC_URL_ENV, _))
        ));

        let mut env = base_env();
        env.insert(REGISTRY_ADDRESS_ENV, "0x123");
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid(REGISTRY_ADDRESS_ENV, _))
        ));

        let mut env = base_env();
        env.insert(ACCOUNT_BYTECODE_ENV, "0x");
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid(ACCOUNT_BYTECODE_ENV, _))
        ));

        let mut env = base_env();
        env.insert(PORT_ENV, "70000");
        assert!(matches!(load(&env), Err(ConfigError::Invalid(PORT_ENV, _))));
    }

    #[test]
    fn optional_overrides_apply() {
        let mut env = base_env();
        env.insert(CHAIN_ID_ENV, "43113");
        env.insert(CHAIN_NAME_ENV, "fuji");
        env.insert(LEDGER_TIMEOUT_SECS_ENV, "5");
        env.insert(PORT_ENV, "3000");

        let config = load(&env).unwrap();
        assert_eq!(config.chain.chain_id, Some(43113));
        assert_eq!(config.chain.name, "fuji");
        assert_eq!(config.ledger_timeout, Duration::from_secs(5));
        assert_eq!(config.port, 3000);
    }
}
