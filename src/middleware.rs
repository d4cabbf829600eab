use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::consts::order_const::ADMIN_COOKIE;
use crate::errors::{Error, Result as RResult};
use crate::state::AppState;
use crate::utils::secrets::{admin_session_token, constant_time_eq};

/// Gate for everything under /admin (except login). There is exactly one
/// administrator identity system-wide: the session cookie holds a hash of the
/// shared secret, and a Bearer header carrying the raw secret is accepted as
/// a fallback for scripted access.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, Response> {
    check_admin_auth(&state, request.headers()).map_err(IntoResponse::into_response)?;

    Ok(next.run(request).await)
}

pub fn check_admin_auth(state: &AppState, headers: &HeaderMap) -> RResult<()> {
    let expected = admin_session_token(&state.config.admin_password);

    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(ADMIN_COOKIE) {
        if constant_time_eq(cookie.value().as_bytes(), expected.as_bytes()) {
            return Ok(());
        }
    }

    if let Some(header_value) = headers.get(AUTHORIZATION) {
        let header_value = header_value.to_str().map_err(|_| Error::Unauthorized)?;
        if let Some(token) = header_value.trim().strip_prefix("Bearer ") {
            if constant_time_eq(token.trim().as_bytes(), state.config.admin_password.as_bytes()) {
                return Ok(());
            }
        }
    }

    tracing::warn!("rejected unauthenticated admin request");
    Err(Error::Unauthorized)
}
