// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relay endpoint: forward a call payload through a user's proxy account.

use alloy::primitives::Bytes;
use axum::{extract::State, http::StatusCode, Json};

use crate::{
    api::parse_address,
    error::ApiError,
    models::{RelayCallRequest, Username},
    state::AppState,
};

/// Relay an ABI-encoded call to the target contract through the user's
/// proxy account.
///
/// Success is an empty 200; the rejection reasons are structured so callers
/// can branch: `"User account not found."` means provision first,
/// `"User has no remaining transactions."` means pay first.
#[utoipa::path(
    post,
    path = "/proxy/call",
    tag = "Relay",
    request_body = RelayCallRequest,
    responses(
        (status = 200, description = "Call relayed and confirmed"),
        (status = 400, description = "Invalid request, unprovisioned user, or exhausted quota"),
        (status = 502, description = "Ledger unavailable or execution failed")
    )
)]
pub async fn relay_call(
    State(state): State<AppState>,
    Json(request): Json<RelayCallRequest>,
) -> Result<StatusCode, ApiError> {
    let username = Username::parse(&request.username)?;
    let target = parse_address("contractAddress", &request.contract_address)?;
    let payload = parse_payload(&request.tx_data)?;

    state.relay.relay(&username, target, payload).await?;

    Ok(StatusCode::OK)
}

/// Parse the 0x-prefixed hex call payload.
///
/// An empty payload (`"0x"`) is allowed; a plain value transfer has no
/// calldata.
fn parse_payload(raw: &str) -> Result<Bytes, ApiError> {
    let Some(hex) = raw.strip_prefix("0x") else {
        return Err(ApiError::bad_request("txData must be 0x-prefixed hex"));
    };

    alloy::hex::decode(hex)
        .map(Bytes::from)
        .map_err(|_| ApiError::bad_request("txData must be 0x-prefixed hex"))
}
