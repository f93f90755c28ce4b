//! The API endpoints URIs.

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route the identity provider calls to start a session.
pub const SIGN_IN: &str = "/api/sign_in";
/// The route for the client to end the current session.
pub const SIGN_OUT: &str = "/api/sign_out";
/// The route for the caller's account and recent transfers.
pub const ACCOUNT: &str = "/api/account";
/// The route to check whether an email belongs to an account.
pub const ACCOUNT_EXISTS: &str = "/api/accounts/exists";
/// The route to get the balance of an account by email.
pub const BALANCE: &str = "/api/balance";
/// The route to list the transfers of an account by email.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to transfer money to another account.
pub const TRANSACTION: &str = "/api/transaction";
