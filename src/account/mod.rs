mod balance_endpoint;
mod core;
mod email_query;
mod exists_endpoint;
mod overview_endpoint;

pub use balance_endpoint::get_balance_endpoint;
pub use core::{
    Account, AccountOverview, account_exists, create_account, create_account_table,
    get_account_by_email, get_account_by_id, get_balance, get_or_create_account,
};
pub use email_query::EmailQuery;
pub use exists_endpoint::account_exists_endpoint;
pub use overview_endpoint::get_account_overview_endpoint;
