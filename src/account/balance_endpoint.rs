//! Defines the endpoint for fetching the balance of an account.

use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Serialize;

use crate::{
    Error,
    account::{EmailQuery, get_balance},
    app_state::DbState,
    auth::Identity,
    db::lock_connection,
    money::Money,
};

/// The response body for a balance request.
#[derive(Debug, PartialEq, Serialize)]
pub struct BalanceResponse {
    /// The current balance.
    pub balance: Money,
}

/// A route handler for getting the current balance of the account registered under `?email=`.
///
/// # Errors
/// Returns:
/// - [Error::Unauthenticated] if the caller's identity is empty.
/// - [Error::InvalidRequest] if the query string cannot be parsed.
/// - [Error::MissingEmail] if the email parameter is absent.
/// - [Error::AccountNotFound] if no account uses the email.
pub async fn get_balance_endpoint(
    State(state): State<DbState>,
    Extension(identity): Extension<Identity>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<Json<BalanceResponse>, Error> {
    identity.ensure_authenticated()?;
    let Query(query) = query?;
    let email = query.required_email()?;

    let balance = get_balance(email, &*lock_connection(&state.db_connection)?)?;

    Ok(Json(BalanceResponse { balance }))
}
