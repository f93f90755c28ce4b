use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

use crate::{
    Error,
    auth::{AccountId, Identity},
    ledger::{Role, TransferRecord, get_recent_transfers},
    money::Money,
};

/// How many of the latest sent and received transfers to include in an [AccountOverview].
pub const RECENT_TRANSFER_LIMIT: u32 = 5;

/// A user's bank account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    /// The ID issued by the identity provider.
    pub id: AccountId,
    /// The email other users send money to.
    pub email: String,
    /// The amount of money in the account.
    pub balance: Money,
}

/// An account along with its most recent transfers, used to hydrate the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountOverview {
    /// The account itself.
    #[serde(flatten)]
    pub account: Account,
    /// The latest transfers where the account was the sender, newest first.
    pub sent_transactions: Vec<TransferRecord>,
    /// The latest transfers where the account was the receiver, newest first.
    pub received_transactions: Vec<TransferRecord>,
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            balance INTEGER NOT NULL CHECK (balance >= 0)
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_account(row: &rusqlite::Row) -> Result<Account, rusqlite::Error> {
    let id: String = row.get(0)?;
    let email = row.get(1)?;
    let balance = row.get(2)?;

    Ok(Account {
        id: AccountId::new(id),
        email,
        balance,
    })
}

/// Create and insert a new account into the database.
///
/// # Errors
/// Returns:
/// - [Error::DuplicateAccount] if an account with `id` already exists.
/// - [Error::DuplicateEmail] if `email` is already used by another account.
/// - [Error::InsufficientFunds] if `balance` is negative.
/// - [Error::SqlError] if an SQL related error occurred.
pub fn create_account(
    id: &AccountId,
    email: &str,
    balance: Money,
    connection: &Connection,
) -> Result<Account, Error> {
    connection
        .execute(
            "INSERT INTO account (id, email, balance) VALUES (?1, ?2, ?3)",
            params![id.as_str(), email, balance],
        )
        .map_err(|error| match Error::from(error) {
            Error::DuplicateAccount(_) => Error::DuplicateAccount(id.to_string()),
            Error::DuplicateEmail(_) => Error::DuplicateEmail(email.to_owned()),
            error => error,
        })?;

    Ok(Account {
        id: id.clone(),
        email: email.to_owned(),
        balance,
    })
}

/// Get the account with the ID `id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such account, or [Error::SqlError]
/// if an SQL related error occurred.
pub fn get_account_by_id(id: &AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .query_row(
            "SELECT id, email, balance FROM account WHERE id = ?1",
            params![id.as_str()],
            map_row_to_account,
        )
        .map_err(|error| error.into())
}

/// Get the account registered under `email`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such account, or [Error::SqlError]
/// if an SQL related error occurred.
pub fn get_account_by_email(email: &str, connection: &Connection) -> Result<Account, Error> {
    connection
        .query_row(
            "SELECT id, email, balance FROM account WHERE email = ?1",
            params![email],
            map_row_to_account,
        )
        .map_err(|error| error.into())
}

/// Check whether an account is registered under `email`.
///
/// # Errors
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn account_exists(email: &str, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM account WHERE email = ?1)",
            params![email],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Get the current balance of the account registered under `email`.
///
/// # Errors
/// Returns [Error::AccountNotFound] if there is no such account, or
/// [Error::SqlError] if an SQL related error occurred.
pub fn get_balance(email: &str, connection: &Connection) -> Result<Money, Error> {
    connection
        .query_row(
            "SELECT balance FROM account WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(Error::AccountNotFound)
}

/// Get the caller's account and its recent transfers, creating an empty
/// account the first time the caller is seen.
///
/// Looking up and creating are separate statements, so two concurrent first
/// visits under the same identity may race. The loser gets
/// [Error::DuplicateAccount].
///
/// # Errors
/// Returns:
/// - [Error::Unauthenticated] if `identity` has an empty account ID.
/// - [Error::DuplicateEmail] if a different account already uses the caller's email.
/// - [Error::SqlError] if an SQL related error occurred.
pub fn get_or_create_account(
    identity: &Identity,
    connection: &Connection,
) -> Result<AccountOverview, Error> {
    identity.ensure_authenticated()?;

    let account = match get_account_by_id(&identity.account_id, connection) {
        Ok(account) => account,
        Err(Error::NotFound) => {
            tracing::info!("Creating account {} for {}", identity.account_id, identity.email);
            create_account(&identity.account_id, &identity.email, Money::ZERO, connection)?
        }
        Err(error) => return Err(error),
    };

    let sent_transactions =
        get_recent_transfers(&account.id, Role::Sender, RECENT_TRANSFER_LIMIT, connection)?;
    let received_transactions =
        get_recent_transfers(&account.id, Role::Receiver, RECENT_TRANSFER_LIMIT, connection)?;

    Ok(AccountOverview {
        account,
        sent_transactions,
        received_transactions,
    })
}
