//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    AppState, Error,
    account::{account_exists_endpoint, get_account_overview_endpoint, get_balance_endpoint},
    auth::{auth_guard, sign_in, sign_out},
    endpoints,
    ledger::get_transactions_endpoint,
    transfer::transfer_endpoint,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::SIGN_IN, post(sign_in))
        .route(endpoints::SIGN_OUT, get(sign_out))
        .route(endpoints::ACCOUNT_EXISTS, get(account_exists_endpoint));

    let protected_routes = Router::new()
        .route(endpoints::ACCOUNT, get(get_account_overview_endpoint))
        .route(endpoints::BALANCE, get(get_balance_endpoint))
        .route(endpoints::TRANSACTIONS, get(get_transactions_endpoint))
        .route(endpoints::TRANSACTION, post(transfer_endpoint))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, "I'm a teapot").into_response()
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}

#[cfg(test)]
mod routing_tests {
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{
        AppState,
        account::create_account,
        auth::{AccountId, COOKIE_TOKEN},
        endpoints,
        money::Money,
    };

    use super::build_router;

    const PROVIDER_SECRET: &str = "provider-secret";

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "nafstenoas",
            PROVIDER_SECRET,
        )
        .unwrap();

        {
            let conn = state.db_connection.lock().unwrap();
            create_account(
                &AccountId::new("user_alice"),
                "alice@example.com",
                Money::from_cents(10_000),
                &conn,
            )
            .unwrap();
            create_account(
                &AccountId::new("user_bob"),
                "bob@example.com",
                Money::from_cents(5_000),
                &conn,
            )
            .unwrap();
        }

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    async fn sign_in(server: &TestServer, id: &str, email: &str) -> Cookie<'static> {
        let response = server
            .post(endpoints::SIGN_IN)
            .authorization_bearer(PROVIDER_SECRET)
            .json(&json!({ "id": id, "email": email }))
            .await;
        response.assert_status_ok();

        response.cookie(COOKIE_TOKEN)
    }

    fn with_email(path: &str, email: &str) -> String {
        format!(
            "{path}?{}",
            serde_urlencoded::to_string([("email", email)]).unwrap()
        )
    }

    #[tokio::test]
    async fn transfer_updates_balances_and_history() {
        let server = get_test_server();
        let alice = sign_in(&server, "user_alice", "alice@example.com").await;

        let response = server
            .post(endpoints::TRANSACTION)
            .add_cookie(alice.clone())
            .json(&json!({ "receiverEmail": "bob@example.com", "amount": 30 }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["transaction"]["amount"], json!(30.0));
        assert_eq!(body["transaction"]["senderId"], json!("user_alice"));
        assert_eq!(body["transaction"]["receiverId"], json!("user_bob"));
        assert_eq!(body["transaction"]["sender"]["balance"], json!(70.0));
        assert_eq!(body["transaction"]["receiver"]["balance"], json!(80.0));

        let response = server
            .get(&with_email(endpoints::BALANCE, "alice@example.com"))
            .add_cookie(alice.clone())
            .await;
        response.assert_status_ok();
        response.assert_json(&json!({ "balance": 70.0 }));

        let response = server
            .get(&with_email(endpoints::TRANSACTIONS, "bob@example.com"))
            .add_cookie(alice)
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        let transactions = body["transactions"].as_array().unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0]["sender"]["email"], json!("alice@example.com"));
    }

    #[tokio::test]
    async fn account_overview_includes_recent_transfers() {
        let server = get_test_server();
        let alice = sign_in(&server, "user_alice", "alice@example.com").await;
        server
            .post(endpoints::TRANSACTION)
            .add_cookie(alice.clone())
            .json(&json!({ "receiverEmail": "bob@example.com", "amount": 12.5 }))
            .await
            .assert_status_ok();

        let response = server.get(endpoints::ACCOUNT).add_cookie(alice).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["email"], json!("alice@example.com"));
        assert_eq!(body["balance"], json!(87.5));
        assert_eq!(body["sentTransactions"].as_array().unwrap().len(), 1);
        assert_eq!(body["receivedTransactions"], json!([]));
    }

    #[tokio::test]
    async fn protected_routes_require_session() {
        let server = get_test_server();

        for path in [endpoints::ACCOUNT, endpoints::BALANCE, endpoints::TRANSACTIONS] {
            let response = server.get(path).await;

            response.assert_status_unauthorized();
            response.assert_json(&json!({ "error": "Unauthorized" }));
        }

        let response = server
            .post(endpoints::TRANSACTION)
            .json(&json!({ "receiverEmail": "bob@example.com", "amount": 1 }))
            .await;
        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn balance_without_email_is_bad_request() {
        let server = get_test_server();
        let alice = sign_in(&server, "user_alice", "alice@example.com").await;

        let response = server.get(endpoints::BALANCE).add_cookie(alice).await;

        response.assert_status_bad_request();
        response.assert_json(&json!({ "error": "Email is required" }));
    }

    #[tokio::test]
    async fn balance_of_unknown_email_is_not_found() {
        let server = get_test_server();
        let alice = sign_in(&server, "user_alice", "alice@example.com").await;

        let response = server
            .get(&with_email(endpoints::BALANCE, "nobody@example.com"))
            .add_cookie(alice)
            .await;

        response.assert_status_not_found();
        response.assert_json(&json!({ "error": "User not found" }));
    }

    #[tokio::test]
    async fn transfer_to_unknown_recipient_is_not_found() {
        let server = get_test_server();
        let alice = sign_in(&server, "user_alice", "alice@example.com").await;

        let response = server
            .post(endpoints::TRANSACTION)
            .add_cookie(alice)
            .json(&json!({ "receiverEmail": "nobody@example.com", "amount": 1 }))
            .await;

        response.assert_status_not_found();
        response.assert_json(&json!({ "error": "Recipient not found" }));
    }

    #[tokio::test]
    async fn overdraft_is_bad_request() {
        let server = get_test_server();
        let bob = sign_in(&server, "user_bob", "bob@example.com").await;

        let response = server
            .post(endpoints::TRANSACTION)
            .add_cookie(bob.clone())
            .json(&json!({ "receiverEmail": "alice@example.com", "amount": 50.01 }))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({ "error": "Insufficient funds" }));

        let response = server
            .get(&with_email(endpoints::BALANCE, "bob@example.com"))
            .add_cookie(bob)
            .await;
        response.assert_json(&json!({ "balance": 50.0 }));
    }

    #[track_caller]
    fn assert_invalid_request(response: &axum_test::TestResponse) {
        response.assert_status_bad_request();
        let body: Value = response.json();
        let message = body["error"].as_str().expect("error body should be a JSON string");
        assert!(
            message.starts_with("Invalid request:"),
            "got error message {message:?}"
        );
    }

    #[tokio::test]
    async fn malformed_transfer_body_is_bad_request() {
        let server = get_test_server();
        let alice = sign_in(&server, "user_alice", "alice@example.com").await;

        for payload in [
            json!({ "receiverEmail": "bob@example.com" }),
            json!({ "receiverEmail": "bob@example.com", "amount": "30" }),
        ] {
            let response = server
                .post(endpoints::TRANSACTION)
                .add_cookie(alice.clone())
                .json(&payload)
                .await;

            assert_invalid_request(&response);
        }

        let response = server
            .get(&with_email(endpoints::BALANCE, "alice@example.com"))
            .add_cookie(alice)
            .await;
        response.assert_json(&json!({ "balance": 100.0 }));
    }

    #[tokio::test]
    async fn malformed_query_is_bad_request() {
        let server = get_test_server();
        let alice = sign_in(&server, "user_alice", "alice@example.com").await;
        let duplicate_email = "email=alice%40example.com&email=bob%40example.com";

        for path in [endpoints::BALANCE, endpoints::TRANSACTIONS] {
            let response = server
                .get(&format!("{path}?{duplicate_email}"))
                .add_cookie(alice.clone())
                .await;

            assert_invalid_request(&response);
        }

        let response = server
            .get(&format!("{}?{duplicate_email}", endpoints::ACCOUNT_EXISTS))
            .await;
        assert_invalid_request(&response);
    }

    #[tokio::test]
    async fn account_exists_does_not_require_session() {
        let server = get_test_server();

        let response = server
            .get(&with_email(endpoints::ACCOUNT_EXISTS, "bob@example.com"))
            .await;
        response.assert_status_ok();
        response.assert_json(&json!({ "exists": true }));

        let response = server
            .get(&with_email(endpoints::ACCOUNT_EXISTS, "nobody@example.com"))
            .await;
        response.assert_json(&json!({ "exists": false }));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        let response = server.get("/api/nope").await;

        response.assert_status_not_found();
        response.assert_json(&json!({ "error": "Not found" }));
    }

    #[tokio::test]
    async fn coffee_is_refused() {
        let server = get_test_server();

        let response = server.get(endpoints::COFFEE).await;

        response.assert_status(axum::http::StatusCode::IM_A_TEAPOT);
    }
}
