// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account resolution and provisioning endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::parse_address,
    error::ApiError,
    models::{ProvisionAccountRequest, ProvisionAccountResponse, ResolveAccountResponse, Username},
    state::AppState,
};

/// Resolve the proxy account recorded for a user within a target contract
/// scope.
///
/// Returns a null `userAccount` when the user has not been provisioned; that
/// is a valid negative answer, not an error.
#[utoipa::path(
    get,
    path = "/config/contracts/{contractAddress}/users/{username}",
    tag = "Accounts",
    params(
        ("contractAddress" = String, Path, description = "Target contract address"),
        ("username" = String, Path, description = "Username (case-insensitive)")
    ),
    responses(
        (status = 200, description = "Resolved account (null when unprovisioned)", body = ResolveAccountResponse),
        (status = 400, description = "Invalid username or address"),
        (status = 502, description = "Ledger unavailable")
    )
)]
pub async fn resolve_account(
    State(state): State<AppState>,
    Path((contract_address, username)): Path<(String, String)>,
) -> Result<Json<ResolveAccountResponse>, ApiError> {
    let username = Username::parse(&username)?;
    let target = parse_address("contractAddress", &contract_address)?;

    let account = state.directory.resolve(&username, target).await?;

    Ok(Json(ResolveAccountResponse {
        user_account: account.map(|account| format!("{account:?}")),
    }))
}

/// Provision a proxy account for a user.
///
/// Idempotent: if the (username, contract) pair already has an account, the
/// recorded address is returned with a 200 instead of a 201.
#[utoipa::path(
    post,
    path = "/config/users",
    tag = "Accounts",
    request_body = ProvisionAccountRequest,
    responses(
        (status = 201, description = "Account created", body = ProvisionAccountResponse),
        (status = 200, description = "Account already exists", body = ProvisionAccountResponse),
        (status = 400, description = "Invalid username or address"),
        (status = 502, description = "Ledger unavailable")
    )
)]
pub async fn provision_account(
    State(state): State<AppState>,
    Json(request): Json<ProvisionAccountRequest>,
) -> Result<(StatusCode, Json<ProvisionAccountResponse>), ApiError> {
    let username = Username::parse(&request.username)?;
    let target = parse_address("contractAddress", &request.contract_address)?;

    let provisioned = state.directory.provision(&username, target).await?;

    let (status, message) = if provisioned.created {
        (StatusCode::CREATED, "User account created.")
    } else {
        (StatusCode::OK, "User account already exists.")
    };

    Ok((
        status,
        Json(ProvisionAccountResponse {
            message: message.to_string(),
            user_account: format!("{:?}", provisioned.account),
        }),
    ))
}
