use rusqlite::{Connection, params};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{Error, auth::AccountId, money::Money};

/// Alias for the integer type used for ledger entry IDs.
pub type LedgerEntryId = i64;

/// An immutable record of one completed transfer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// The ID of the entry, assigned in increasing order.
    pub id: LedgerEntryId,
    /// The amount transferred, always positive.
    pub amount: Money,
    /// The account the money was taken from.
    pub sender_id: AccountId,
    /// The account the money was given to.
    pub receiver_id: AccountId,
    /// When the transfer happened (UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The state of an account at the time a [TransferRecord] was read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSnapshot {
    /// The account ID.
    pub id: AccountId,
    /// The account email.
    pub email: String,
    /// The account balance.
    pub balance: Money,
}

/// A ledger entry together with the accounts on either side of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferRecord {
    /// The ledger entry.
    #[serde(flatten)]
    pub entry: LedgerEntry,
    /// The sending account.
    pub sender: AccountSnapshot,
    /// The receiving account.
    pub receiver: AccountSnapshot,
}

/// Which side of a transfer an account was on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The account sent the money.
    Sender,
    /// The account received the money.
    Receiver,
}

pub fn create_ledger_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS ledger_entry (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount INTEGER NOT NULL CHECK (amount > 0),
            sender_id TEXT NOT NULL,
            receiver_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(sender_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE RESTRICT,
            FOREIGN KEY(receiver_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE RESTRICT,
            CHECK (sender_id != receiver_id)
        )",
        (),
    )?;

    // Speeds up fetching an account's history.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_ledger_entry_sender ON ledger_entry(sender_id, created_at)",
        (),
    )?;
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_ledger_entry_receiver ON ledger_entry(receiver_id, created_at)",
        (),
    )?;

    Ok(())
}

/// The columns that [map_row_to_transfer_record] expects, in order.
const TRANSFER_RECORD_QUERY: &str = "SELECT
        l.id, l.amount, l.sender_id, l.receiver_id, l.created_at,
        s.id, s.email, s.balance,
        r.id, r.email, r.balance
    FROM ledger_entry l
    INNER JOIN account s ON s.id = l.sender_id
    INNER JOIN account r ON r.id = l.receiver_id";

pub fn map_row_to_transfer_record(row: &rusqlite::Row) -> Result<TransferRecord, rusqlite::Error> {
    let entry = LedgerEntry {
        id: row.get(0)?,
        amount: row.get(1)?,
        sender_id: AccountId::new(row.get::<_, String>(2)?),
        receiver_id: AccountId::new(row.get::<_, String>(3)?),
        created_at: row.get(4)?,
    };
    let sender = map_row_to_snapshot(row, 5)?;
    let receiver = map_row_to_snapshot(row, 8)?;

    Ok(TransferRecord {
        entry,
        sender,
        receiver,
    })
}

fn map_row_to_snapshot(
    row: &rusqlite::Row,
    offset: usize,
) -> Result<AccountSnapshot, rusqlite::Error> {
    Ok(AccountSnapshot {
        id: AccountId::new(row.get::<_, String>(offset)?),
        email: row.get(offset + 1)?,
        balance: row.get(offset + 2)?,
    })
}

/// Append a new entry to the ledger.
///
/// The caller is responsible for adjusting the account balances in the same
/// database transaction.
///
/// # Errors
/// Returns:
/// - [Error::AccountNotFound] if either account ID does not exist.
/// - [Error::SqlError] if the amount is not positive, the accounts are the
///   same, or another SQL related error occurred.
pub fn insert_ledger_entry(
    amount: Money,
    sender_id: &AccountId,
    receiver_id: &AccountId,
    created_at: OffsetDateTime,
    connection: &Connection,
) -> Result<LedgerEntry, Error> {
    connection.execute(
        "INSERT INTO ledger_entry (amount, sender_id, receiver_id, created_at)
        VALUES (?1, ?2, ?3, ?4)",
        params![amount, sender_id.as_str(), receiver_id.as_str(), created_at],
    )?;

    let id = connection.last_insert_rowid();

    Ok(LedgerEntry {
        id,
        amount,
        sender_id: sender_id.clone(),
        receiver_id: receiver_id.clone(),
        created_at,
    })
}

/// Get a single ledger entry with the current state of both accounts.
///
/// # Errors
/// Returns [Error::NotFound] if there is no entry with `id`, or
/// [Error::SqlError] if an SQL related error occurred.
pub fn get_transfer_record(
    id: LedgerEntryId,
    connection: &Connection,
) -> Result<TransferRecord, Error> {
    connection
        .query_row(
            &format!("{TRANSFER_RECORD_QUERY} WHERE l.id = ?1"),
            params![id],
            map_row_to_transfer_record,
        )
        .map_err(|error| error.into())
}

/// Get every transfer the account registered under `email` took part in,
/// newest first.
///
/// An unknown email yields an empty list.
///
/// # Errors
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn get_transactions_for_email(
    email: &str,
    connection: &Connection,
) -> Result<Vec<TransferRecord>, Error> {
    let mut statement = connection.prepare(&format!(
        "{TRANSFER_RECORD_QUERY}
        WHERE s.email = ?1 OR r.email = ?1
        ORDER BY l.created_at DESC, l.id DESC"
    ))?;

    statement
        .query_map(params![email], map_row_to_transfer_record)?
        .map(|maybe_record| maybe_record.map_err(Error::from))
        .collect()
}

/// Get up to `limit` of the latest transfers where `account_id` played `role`,
/// newest first.
///
/// # Errors
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn get_recent_transfers(
    account_id: &AccountId,
    role: Role,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<TransferRecord>, Error> {
    let column = match role {
        Role::Sender => "l.sender_id",
        Role::Receiver => "l.receiver_id",
    };

    let mut statement = connection.prepare(&format!(
        "{TRANSFER_RECORD_QUERY}
        WHERE {column} = ?1
        ORDER BY l.created_at DESC, l.id DESC
        LIMIT ?2"
    ))?;

    statement
        .query_map(
            params![account_id.as_str(), limit],
            map_row_to_transfer_record,
        )?
        .map(|maybe_record| maybe_record.map_err(Error::from))
        .collect()
}
