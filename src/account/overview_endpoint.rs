//! Defines the endpoint the dashboard uses to load the caller's account.

use axum::{Extension, Json, extract::State};

use crate::{
    Error,
    account::{AccountOverview, get_or_create_account},
    app_state::DbState,
    auth::Identity,
    db::lock_connection,
};

/// A route handler for getting the caller's account with its latest transfers.
///
/// The account is created with a zero balance if this is the first time the
/// caller has been seen.
pub async fn get_account_overview_endpoint(
    State(state): State<DbState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<AccountOverview>, Error> {
    let overview = get_or_create_account(&identity, &*lock_connection(&state.db_connection)?)?;

    Ok(Json(overview))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State};
    use rusqlite::Connection;

    use crate::{
        account::create_account,
        app_state::DbState,
        auth::Identity,
        db::initialize,
        money::Money,
        transfer::transfer,
    };

    use super::get_account_overview_endpoint;

    #[tokio::test]
    async fn overview_lists_sent_and_received_transfers() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let alice = Identity::new("user_alice", "alice@example.com").unwrap();
        let bob = Identity::new("user_bob", "bob@example.com").unwrap();
        create_account(&alice.account_id, &alice.email, Money::from_cents(10_000), &conn)
            .unwrap();
        create_account(&bob.account_id, &bob.email, Money::from_cents(5_000), &conn).unwrap();
        transfer(&alice, &bob.email, 30.0, &conn).unwrap();
        transfer(&bob, &alice.email, 5.0, &conn).unwrap();
        let state = DbState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let overview = get_account_overview_endpoint(State(state), Extension(alice))
            .await
            .unwrap()
            .0;

        assert_eq!(overview.account.balance, Money::from_cents(7_500));
        assert_eq!(overview.sent_transactions.len(), 1);
        assert_eq!(
            overview.sent_transactions[0].receiver.email,
            "bob@example.com"
        );
        assert_eq!(overview.received_transactions.len(), 1);
        assert_eq!(
            overview.received_transactions[0].entry.amount,
            Money::from_cents(500)
        );
    }
}
