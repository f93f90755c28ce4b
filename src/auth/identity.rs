//! The identity of the caller, as supplied by the external identity provider.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A newtype wrapper for the opaque account IDs issued by the identity provider.
///
/// This helps disambiguate account IDs from emails, which are also strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create a new account ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The authenticated caller of an operation.
///
/// Every operation that acts on behalf of a user takes an [Identity] explicitly
/// rather than reading it from ambient request state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// The stable account ID from the identity provider.
    pub account_id: AccountId,
    /// The caller's verified email address.
    pub email: String,
}

impl Identity {
    /// Create an identity, checking that the provider actually supplied one.
    ///
    /// # Errors
    /// - [Error::Unauthenticated] if `account_id` is empty.
    /// - [Error::MissingEmail] if `email` is empty.
    pub fn new(account_id: &str, email: &str) -> Result<Self, Error> {
        let account_id = account_id.trim();
        let email = email.trim();

        if account_id.is_empty() {
            return Err(Error::Unauthenticated);
        }

        if email.is_empty() {
            return Err(Error::MissingEmail);
        }

        Ok(Self {
            account_id: AccountId::new(account_id),
            email: email.to_owned(),
        })
    }

    /// Check that the identity is usable, e.g. after being decoded from a cookie.
    ///
    /// # Errors
    /// Returns [Error::Unauthenticated] if the account ID is empty.
    pub fn ensure_authenticated(&self) -> Result<(), Error> {
        if self.account_id.as_str().trim().is_empty() {
            Err(Error::Unauthenticated)
        } else {
            Ok(())
        }
    }
}
