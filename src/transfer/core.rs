use rusqlite::{Connection, Transaction, TransactionBehavior, params};
use time::OffsetDateTime;

use crate::{
    Error,
    account::{get_account_by_email, get_account_by_id},
    auth::Identity,
    ledger::{TransferRecord, get_transfer_record, insert_ledger_entry},
    money::Money,
};

/// Move `amount` from the caller's account to the account registered under
/// `recipient_email`, recording the transfer in the ledger.
///
/// The checks run in a fixed order and the first one that fails decides the
/// error: amount, sender exists, not a self transfer, sufficient funds,
/// recipient exists. The debit, credit and ledger insert happen in a single
/// `BEGIN IMMEDIATE` transaction, which holds the database write lock from
/// before the balance check until commit. Either all three are applied or none.
///
/// Returns the ledger entry with both accounts as they are right after the transfer.
///
/// # Errors
/// Returns:
/// - [Error::Unauthenticated] if `identity` has an empty account ID.
/// - [Error::InvalidAmount] if `amount` is not a positive number of whole cents.
/// - [Error::SenderNotFound] if the caller has no account.
/// - [Error::SelfTransfer] if `recipient_email` is the caller's own email.
/// - [Error::InsufficientFunds] if the caller's balance is less than `amount`.
/// - [Error::RecipientNotFound] if no account uses `recipient_email`.
/// - [Error::SqlError] if the transaction could not be started or committed.
pub fn transfer(
    identity: &Identity,
    recipient_email: &str,
    amount: f64,
    connection: &Connection,
) -> Result<TransferRecord, Error> {
    identity.ensure_authenticated()?;

    let amount = Money::from_decimal(amount)?;
    if !amount.is_positive() {
        return Err(Error::InvalidAmount(format!(
            "{amount} is not greater than zero"
        )));
    }

    // Dropping the transaction without committing rolls it back, so any early
    // return below leaves the database untouched.
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let sender = match get_account_by_id(&identity.account_id, &transaction) {
        Ok(sender) => sender,
        Err(Error::NotFound) => return Err(Error::SenderNotFound),
        Err(error) => return Err(error),
    };

    if sender.email == recipient_email {
        return Err(Error::SelfTransfer);
    }

    if sender.balance < amount {
        return Err(Error::InsufficientFunds);
    }

    let recipient = match get_account_by_email(recipient_email, &transaction) {
        Ok(recipient) => recipient,
        Err(Error::NotFound) => return Err(Error::RecipientNotFound),
        Err(error) => return Err(error),
    };

    transaction.execute(
        "UPDATE account SET balance = balance - ?1 WHERE id = ?2",
        params![amount, sender.id.as_str()],
    )?;
    transaction.execute(
        "UPDATE account SET balance = balance + ?1 WHERE id = ?2",
        params![amount, recipient.id.as_str()],
    )?;
    let entry = insert_ledger_entry(
        amount,
        &sender.id,
        &recipient.id,
        OffsetDateTime::now_utc(),
        &transaction,
    )?;

    let record = get_transfer_record(entry.id, &transaction)?;

    transaction.commit().inspect_err(|error| {
        tracing::error!("Could not commit transfer {}: {error}", entry.id);
    })?;

    tracing::info!(
        "Transferred {amount} from {} to {} (ledger entry {})",
        sender.id,
        recipient.id,
        entry.id
    );

    Ok(record)
}
