//! Ends the caller's session.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use serde_json::json;

use crate::auth::invalidate_auth_cookie;

/// Invalidate the session cookie.
///
/// Always succeeds, even if the caller was not signed in.
pub async fn sign_out(jar: PrivateCookieJar) -> Response {
    (
        invalidate_auth_cookie(jar),
        Json(json!({ "success": true })),
    )
        .into_response()
}
