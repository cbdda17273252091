// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Quota endpoints: record payments and read remaining counts.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    api::parse_address,
    error::ApiError,
    models::{PaymentRequest, RemainingTxsResponse, Username},
    state::AppState,
};

/// Credit purchased transactions to a (user, contract) quota.
///
/// Called after an out-of-band payment confirmation; the gateway does not
/// verify the payment itself.
#[utoipa::path(
    post,
    path = "/payment",
    tag = "Quota",
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "New remaining transaction count", body = RemainingTxsResponse),
        (status = 400, description = "Invalid username, address, or count"),
        (status = 502, description = "Ledger unavailable")
    )
)]
pub async fn record_payment(
    State(state): State<AppState>,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<RemainingTxsResponse>, ApiError> {
    let username = Username::parse(&request.username)?;
    let target = parse_address("contractAddress", &request.contract_address)?;

    let remaining_txs = state
        .quota
        .credit(&username, target, request.num_tx)
        .await?;

    Ok(Json(RemainingTxsResponse { remaining_txs }))
}

/// Read the remaining transaction count for a (user, contract) pair.
#[utoipa::path(
    get,
    path = "/config/contracts/{contractAddress}/users/{username}/quota",
    tag = "Quota",
    params(
        ("contractAddress" = String, Path, description = "Target contract address"),
        ("username" = String, Path, description = "Username (case-insensitive)")
    ),
    responses(
        (status = 200, description = "Remaining transaction count", body = RemainingTxsResponse),
        (status = 400, description = "Invalid username or address"),
        (status = 502, description = "Ledger unavailable")
    )
)]
pub async fn remaining_quota(
    State(state): State<AppState>,
    Path((contract_address, username)): Path<(String, String)>,
) -> Result<Json<RemainingTxsResponse>, ApiError> {
    let username = Username::parse(&username)?;
    let target = parse_address("contractAddress", &contract_address)?;

    let remaining_txs = state.quota.remaining(&username, target).await?;

    Ok(Json(RemainingTxsResponse { remaining_txs }))
}
