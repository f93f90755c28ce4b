//! Defines the endpoint for checking whether a recipient email is registered.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Serialize;

use crate::{
    Error,
    account::{EmailQuery, account_exists},
    app_state::DbState,
    db::lock_connection,
};

/// The response body for an account existence check.
#[derive(Debug, PartialEq, Serialize)]
pub struct AccountExistsResponse {
    /// Whether an account uses the email.
    pub exists: bool,
}

/// A route handler for checking whether `?email=` belongs to an account.
///
/// This route does not require a session so that clients can validate a
/// recipient before transferring. Any caller can therefore probe which emails
/// are registered.
///
/// # Errors
/// Returns [Error::InvalidRequest] if the query string cannot be parsed, or
/// [Error::MissingEmail] if the email parameter is absent.
pub async fn account_exists_endpoint(
    State(state): State<DbState>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<Json<AccountExistsResponse>, Error> {
    let Query(query) = query?;
    let email = query.required_email()?;

    let exists = account_exists(email, &*lock_connection(&state.db_connection)?)?;

    Ok(Json(AccountExistsResponse { exists }))
}
