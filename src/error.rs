// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gateway error taxonomy and its HTTP mapping.
//!
//! [`GatewayError`] is the domain-level taxonomy shared by the directory,
//! quota, and relay components. [`ApiError`] is the wire shape; the
//! `From<GatewayError>` impl is the single error-kind-to-status table for
//! the whole API surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::ledger::LedgerError;

/// Domain-level failure kinds, surfaced to callers as structured reasons.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Malformed or missing request fields. Never retried.
    #[error("{0}")]
    Validation(String),

    /// Resolution found no proxy account for the user.
    #[error("User account not found.")]
    AccountNotProvisioned,

    /// Quota admission denied; distinct from system failure.
    #[error("User has no remaining transactions.")]
    QuotaExhausted,

    /// The ledger timed out, rejected a transaction, or returned bad data.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Validation(_)
            | GatewayError::AccountNotProvisioned
            | GatewayError::QuotaExhausted => ApiError::bad_request(err.to_string()),
            GatewayError::Ledger(_) => ApiError::bad_gateway(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
