mod core;
mod transactions_endpoint;

pub use core::{
    AccountSnapshot, LedgerEntry, Role, TransferRecord, create_ledger_table,
    get_recent_transfers, get_transactions_for_email, get_transfer_record, insert_ledger_entry,
};
pub use transactions_endpoint::get_transactions_endpoint;
