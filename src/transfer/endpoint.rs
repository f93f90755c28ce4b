//! Defines the endpoint for transferring money to another account.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error, app_state::DbState, auth::Identity, db::lock_connection, ledger::TransferRecord,
    transfer::transfer,
};

/// The request body for a transfer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// The email of the account to send the money to.
    pub receiver_email: String,
    /// The amount to send in currency units, e.g. `12.34`.
    pub amount: f64,
}

/// The response body for a successful transfer.
#[derive(Debug, PartialEq, Serialize)]
pub struct TransferResponse {
    /// Always true, kept for clients that check it.
    pub success: bool,
    /// The new ledger entry with both accounts as they were right after the transfer.
    pub transaction: TransferRecord,
}

/// A route handler for sending money from the caller's account.
///
/// # Errors
/// Returns [Error::InvalidRequest] if the body is not a valid [TransferRequest].
/// See [transfer] for the other errors and the order in which they are checked.
pub async fn transfer_endpoint(
    State(state): State<DbState>,
    Extension(identity): Extension<Identity>,
    request: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferResponse>, Error> {
    identity.ensure_authenticated()?;
    let Json(request) = request?;
    let receiver_email = request.receiver_email.trim();

    let record = transfer(
        &identity,
        receiver_email,
        request.amount,
        &*lock_connection(&state.db_connection)?,
    )
    .inspect_err(|error| {
        tracing::info!(
            "Transfer of {} from {} to {receiver_email} failed: {error}",
            request.amount,
            identity.account_id
        );
    })?;

    Ok(Json(TransferResponse {
        success: true,
        transaction: record,
    }))
}
