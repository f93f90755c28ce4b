//! The endpoint the identity provider calls to start a session for a user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
};
use axum_extra::{
    TypedHeader,
    extract::{PrivateCookieJar, cookie::Key},
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use rusqlite::Connection;
use serde::Deserialize;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    AppState, Error,
    account::{AccountOverview, get_or_create_account},
    auth::{Identity, set_auth_cookie},
    db::lock_connection,
};

/// The state needed to sign a user in.
#[derive(Debug, Clone)]
pub struct SignInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The secret shared with the identity provider.
    pub provider_secret: String,
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SignInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            provider_secret: state.provider_secret.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SignInState> for Key {
    fn from_ref(state: &SignInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The identity the provider vouches for.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    /// The provider's stable user ID.
    pub id: String,
    /// The user's verified email address.
    pub email: String,
}

/// Handler for sign-in requests from the identity provider.
///
/// The provider must present the shared secret as a bearer token. On success
/// the caller's account is fetched, or created with a zero balance on first
/// sign-in, the session cookie is set and the account overview is returned.
///
/// # Errors
/// Returns:
/// - [Error::InvalidProviderCredentials] if the bearer token is missing or wrong.
/// - [Error::InvalidRequest] if the body is not a valid [SignInRequest].
/// - [Error::Unauthenticated] if the user ID is empty.
/// - [Error::MissingEmail] if the email is empty.
/// - [Error::DatabaseLockError] or [Error::SqlError] if the account could not be loaded.
pub async fn sign_in(
    State(state): State<SignInState>,
    jar: PrivateCookieJar,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    request: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<(PrivateCookieJar, Json<AccountOverview>), Error> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|rejection| {
        tracing::warn!("Sign-in attempt without provider credentials: {rejection}");
        Error::InvalidProviderCredentials
    })?;

    if !secrets_match(bearer.token(), &state.provider_secret) {
        tracing::warn!("Sign-in attempt with incorrect provider credentials");
        return Err(Error::InvalidProviderCredentials);
    }

    let Json(request) = request?;
    let identity = Identity::new(&request.id, &request.email)?;

    let overview = get_or_create_account(&identity, &*lock_connection(&state.db_connection)?)?;

    let jar = set_auth_cookie(jar, identity, state.cookie_duration)?;

    Ok((jar, Json(overview)))
}

/// Compare digests so the comparison time does not depend on where the strings differ.
fn secrets_match(given: &str, expected: &str) -> bool {
    Sha512::digest(given) == Sha512::digest(expected)
}
