//! Defines the endpoint for listing the transfers of an account.

use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Serialize;

use crate::{
    Error,
    account::EmailQuery,
    app_state::DbState,
    auth::Identity,
    db::lock_connection,
    ledger::{TransferRecord, get_transactions_for_email},
};

/// The response body for a transaction history request.
#[derive(Debug, PartialEq, Serialize)]
pub struct TransactionsResponse {
    /// Every transfer the account took part in, newest first.
    pub transactions: Vec<TransferRecord>,
}

/// A route handler for listing every transfer the account under `?email=` sent or received.
///
/// # Errors
/// Returns:
/// - [Error::Unauthenticated] if the caller's identity is empty.
/// - [Error::InvalidRequest] if the query string cannot be parsed.
/// - [Error::MissingEmail] if the email parameter is absent.
pub async fn get_transactions_endpoint(
    State(state): State<DbState>,
    Extension(identity): Extension<Identity>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<Json<TransactionsResponse>, Error> {
    identity.ensure_authenticated()?;
    let Query(query) = query?;
    let email = query.required_email()?;

    let transactions =
        get_transactions_for_email(email, &*lock_connection(&state.db_connection)?)?;

    Ok(Json(TransactionsResponse { transactions }))
}
