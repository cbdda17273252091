// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::str::FromStr;

use alloy::primitives::Address;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ApiError,
    models::{
        PaymentRequest, ProvisionAccountRequest, ProvisionAccountResponse, RelayCallRequest,
        RemainingTxsResponse, ResolveAccountResponse,
    },
    state::AppState,
};

pub mod accounts;
pub mod health;
pub mod payments;
pub mod relay;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/config/contracts/{contractAddress}/users/{username}",
            get(accounts::resolve_account),
        )
        .route(
            "/config/contracts/{contractAddress}/users/{username}/quota",
            get(payments::remaining_quota),
        )
        .route("/config/users", post(accounts::provision_account))
        .route("/proxy/call", post(relay::relay_call))
        .route("/payment", post(payments::record_payment))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Parse a path or body field into a contract address.
pub(crate) fn parse_address(field: &str, raw: &str) -> Result<Address, ApiError> {
    Address::from_str(raw).map_err(|_| {
        ApiError::bad_request(format!(
            "{field} must be a 0x-prefixed 20-byte hex address"
        ))
    })
}

#[derive(OpenApi)]
#[openapi(
    paths(
        accounts::resolve_account,
        accounts::provision_account,
        relay::relay_call,
        payments::record_payment,
        payments::remaining_quota,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            ResolveAccountResponse,
            ProvisionAccountRequest,
            ProvisionAccountResponse,
            RelayCallRequest,
            PaymentRequest,
            RemainingTxsResponse
        )
    ),
    tags(
        (name = "Accounts", description = "Username to proxy-account mapping"),
        (name = "Relay", description = "Call relaying through proxy accounts"),
        (name = "Quota", description = "Per-user transaction quotas"),
        (name = "Health", description = "Service health probes")
    )
)]
struct ApiDoc;
