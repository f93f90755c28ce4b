mod cookie;
mod identity;
mod middleware;
mod sign_in;
mod sign_out;
mod token;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use identity::{AccountId, Identity};
pub use middleware::{AuthState, auth_guard};
pub use sign_in::sign_in;
pub use sign_out::sign_out;
pub use token::Token;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
