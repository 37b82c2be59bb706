use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use std::sync::Arc;

use crate::error::HandlerError;
use crate::AppState;

/// Join every `Cookie` header on the request into a single header value
pub fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    (!values.is_empty()).then(|| values.join("; "))
}

/// Middleware that answers 401 unless the request carries a valid session
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, HandlerError> {
    let cookie = cookie_header(request.headers());

    if state.auth_service.get_user_id(cookie.as_deref()).is_none() {
        return Err(HandlerError::unauthorized("Unauthorized"));
    }

    Ok(next.run(request).await)
}

/// Raw `Cookie` header of the request, if any
#[derive(Debug, Clone)]
pub struct SessionCookie(pub Option<String>);

impl<S> FromRequestParts<S> for SessionCookie
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(SessionCookie(cookie_header(&parts.headers)))
    }
}

/// Id of the signed-in user, or `None` for anonymous requests
#[derive(Debug, Clone)]
pub struct MaybeUserId(pub Option<String>);

impl FromRequestParts<Arc<AppState>> for MaybeUserId {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let cookie = cookie_header(&parts.headers);
        Ok(MaybeUserId(state.auth_service.get_user_id(cookie.as_deref())))
    }
}

/// Id of the signed-in user.
///
/// Anonymous requests are redirected to the login page, which sends the user
/// back to the current path afterwards.
#[derive(Debug, Clone)]
pub struct RequireUserId(pub String);

impl FromRequestParts<Arc<AppState>> for RequireUserId {
    type Rejection = HandlerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let cookie = cookie_header(&parts.headers);

        state
            .auth_service
            .require_user_id(cookie.as_deref(), parts.uri.path())
            .map(RequireUserId)
            .map_err(HandlerError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_header_joins_values() {
        let mut headers = HeaderMap::new();
        assert_eq!(cookie_header(&headers), None);

        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("b=2"));

        assert_eq!(cookie_header(&headers).as_deref(), Some("a=1; b=2"));
    }
}
