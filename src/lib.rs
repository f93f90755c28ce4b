//! Payboard is the backend for a banking-style dashboard.
//!
//! Authenticated users can check their balance, transfer money to another
//! user by email and list their recent transactions. This library provides a
//! JSON REST API backed by a SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod account;
mod app_state;
mod auth;
mod db;
mod endpoints;
mod ledger;
mod logging;
mod money;
mod routing;
mod transfer;

pub use account::{Account, AccountOverview, create_account, get_account_by_email};
pub use app_state::AppState;
pub use auth::{AccountId, Identity};
pub use db::initialize as initialize_db;
pub use ledger::{AccountSnapshot, LedgerEntry, TransferRecord};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use money::Money;
pub use routing::build_router;
pub use transfer::transfer;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not carry a valid identity, e.g. the session cookie is
    /// missing, expired or holds an empty account ID.
    #[error("user not authenticated")]
    Unauthenticated,

    /// The identity provider called the sign-in endpoint with a missing or
    /// incorrect shared secret.
    #[error("invalid identity provider credentials")]
    InvalidProviderCredentials,

    /// The request body or query string could not be parsed, e.g. a missing
    /// field or a value of the wrong type.
    ///
    /// The string describes what was wrong with the request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// An email address was required but was missing or empty.
    #[error("email is required")]
    MissingEmail,

    /// A transfer amount was not a positive number of whole cents.
    ///
    /// The string describes what was wrong with the amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The account of the user requesting a transfer does not exist.
    #[error("sender not found")]
    SenderNotFound,

    /// No account is registered under the recipient email of a transfer.
    #[error("recipient not found")]
    RecipientNotFound,

    /// The recipient email of a transfer is the sender's own email.
    #[error("cannot transfer to yourself")]
    SelfTransfer,

    /// The sender's balance is lower than the transfer amount.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// No account is registered under the requested email.
    #[error("account not found")]
    AccountNotFound,

    /// The email is already used by another account.
    #[error("the email \"{0}\" is already used by another account")]
    DuplicateEmail(String),

    /// An account with the same ID already exists.
    #[error("the account \"{0}\" already exists")]
    DuplicateAccount(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The session cookie could not be created or updated.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("could not set the session cookie: {0}")]
    CookieError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error, e.g. a failed commit.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

/// SQLite extended result code for a failed CHECK constraint.
const SQLITE_CONSTRAINT_CHECK: i32 = 275;
/// SQLite extended result code for a failed FOREIGN KEY constraint.
const SQLITE_CONSTRAINT_FOREIGNKEY: i32 = 787;
/// SQLite extended result code for a failed UNIQUE constraint.
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;
/// SQLite extended result code for a failed PRIMARY KEY constraint.
const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == SQLITE_CONSTRAINT_CHECK
                    && desc.contains("balance") =>
            {
                Error::InsufficientFunds
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == SQLITE_CONSTRAINT_UNIQUE
                    && desc.ends_with("account.email") =>
            {
                Error::DuplicateEmail(String::new())
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Error::DuplicateAccount(String::new())
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                Error::AccountNotFound
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl Error {
    /// The status code and client-facing message for the error.
    ///
    /// Validation errors are safe to show verbatim. Anything else is reported
    /// as a generic internal server error.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Error::Unauthenticated | Error::InvalidProviderCredentials => {
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_owned())
            }
            Error::InvalidRequest(reason) => {
                (StatusCode::BAD_REQUEST, format!("Invalid request: {reason}"))
            }
            Error::MissingEmail => (StatusCode::BAD_REQUEST, "Email is required".to_owned()),
            Error::InvalidAmount(reason) => {
                (StatusCode::BAD_REQUEST, format!("Invalid amount: {reason}"))
            }
            Error::SelfTransfer => (
                StatusCode::BAD_REQUEST,
                "Cannot transfer to yourself".to_owned(),
            ),
            Error::InsufficientFunds => {
                (StatusCode::BAD_REQUEST, "Insufficient funds".to_owned())
            }
            Error::SenderNotFound => (StatusCode::NOT_FOUND, "Sender not found".to_owned()),
            Error::RecipientNotFound => {
                (StatusCode::NOT_FOUND, "Recipient not found".to_owned())
            }
            Error::AccountNotFound => (StatusCode::NOT_FOUND, "User not found".to_owned()),
            Error::NotFound => (StatusCode::NOT_FOUND, "Not found".to_owned()),
            Error::DuplicateEmail(_) | Error::DuplicateAccount(_) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            Error::CookieError(_) | Error::DatabaseLockError | Error::SqlError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_owned(),
            ),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;

    use crate::Error;

    #[test]
    fn no_rows_maps_to_not_found() {
        let conn = Connection::open_in_memory().unwrap();

        let error: Error = conn
            .query_row("SELECT 1 WHERE 0", [], |row| row.get::<_, i64>(0))
            .unwrap_err()
            .into();

        assert_eq!(error, Error::NotFound);
    }

    #[test]
    fn validation_errors_map_to_client_errors() {
        let cases = [
            (Error::Unauthenticated, StatusCode::UNAUTHORIZED),
            (Error::MissingEmail, StatusCode::BAD_REQUEST),
            (
                Error::InvalidRequest("missing field `amount`".to_owned()),
                StatusCode::BAD_REQUEST,
            ),
            (Error::InsufficientFunds, StatusCode::BAD_REQUEST),
            (Error::SelfTransfer, StatusCode::BAD_REQUEST),
            (Error::InvalidAmount("NaN".to_owned()), StatusCode::BAD_REQUEST),
            (Error::SenderNotFound, StatusCode::NOT_FOUND),
            (Error::RecipientNotFound, StatusCode::NOT_FOUND),
            (Error::AccountNotFound, StatusCode::NOT_FOUND),
        ];

        for (error, want_status) in cases {
            let description = error.to_string();
            let response = error.into_response();

            assert_eq!(
                response.status(),
                want_status,
                "got status {} for error \"{description}\", want {want_status}",
                response.status()
            );
        }
    }

    #[test]
    fn storage_failures_are_internal_errors() {
        let response = Error::SqlError(rusqlite::Error::InvalidQuery).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
