use auth::{AuthError, Redirect};
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use storage::StorageError;
use tracing::{debug, error};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error side of every handler result.
///
/// `Redirect` is not a failure: it carries the early response produced when a
/// request has to be sent elsewhere (usually the login page).
#[derive(Debug)]
pub enum HandlerError {
    Redirect(Redirect),
    BadRequest(serde_json::Value),
    Unauthorized(String),
    NotFound(String),
    Internal(String),
}

pub type Result<T> = std::result::Result<T, HandlerError>;

impl HandlerError {
    /// 400 with a structured payload
    pub fn bad_request(data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => HandlerError::BadRequest(value),
            Err(e) => HandlerError::Internal(format!("Failed to serialize response: {}", e)),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        HandlerError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        HandlerError::NotFound(message.into())
    }
}

impl From<Redirect> for HandlerError {
    fn from(redirect: Redirect) -> Self {
        HandlerError::Redirect(redirect)
    }
}

impl From<StorageError> for HandlerError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(_) => HandlerError::not_found("Not found"),
            e => HandlerError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for HandlerError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::StorageError(e) => e.into(),
            e => HandlerError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::Redirect(redirect) => {
                debug!(location = %redirect.location, "short-circuiting with redirect");
                RedirectResponse(redirect).into_response()
            }
            HandlerError::BadRequest(data) => (StatusCode::BAD_REQUEST, Json(data)).into_response(),
            HandlerError::Unauthorized(error) => {
                (StatusCode::UNAUTHORIZED, Json(ErrorResponse { error })).into_response()
            }
            HandlerError::NotFound(error) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { error })).into_response()
            }
            HandlerError::Internal(message) => {
                error!(error = %message, "request failed");
                let error = ErrorResponse {
                    error: "Something went wrong".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            }
        }
    }
}

/// `302 Found` with `Location` and, when present, `Set-Cookie`
#[derive(Debug)]
pub struct RedirectResponse(pub Redirect);

impl IntoResponse for RedirectResponse {
    fn into_response(self) -> Response {
        let Redirect {
            location,
            set_cookie,
        } = self.0;

        let location = match HeaderValue::from_str(&location) {
            Ok(value) => value,
            Err(e) => {
                return HandlerError::Internal(format!("Invalid redirect location: {}", e))
                    .into_response()
            }
        };

        let mut response = StatusCode::FOUND.into_response();
        response.headers_mut().insert(header::LOCATION, location);

        if let Some(set_cookie) = set_cookie {
            match HeaderValue::from_str(&set_cookie) {
                Ok(value) => {
                    response.headers_mut().insert(header::SET_COOKIE, value);
                }
                Err(e) => {
                    return HandlerError::Internal(format!("Invalid session cookie: {}", e))
                        .into_response()
                }
            }
        }

        response
    }
}
