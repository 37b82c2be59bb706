use axum::{
    extract::{rejection::FormRejection, State},
    Form,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use auth::{
    validation::{validate_password, validate_username},
    AuthError, Redirect,
};
use storage::StorageError;

use crate::error::{HandlerError, RedirectResponse, Result};
use crate::form::{non_empty, safe_redirect, ActionData, DEFAULT_REDIRECT};
use crate::middleware::SessionCookie;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    pub login_type: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub redirect_to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginFieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl LoginFieldErrors {
    fn any(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }
}

/// Submitted values echoed back with a rejection; the password is never echoed
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginFields {
    pub login_type: String,
    pub username: String,
}

type LoginActionData = ActionData<LoginFieldErrors, LoginFields>;

/// POST /login - Log in or register, then start a session
pub async fn login(
    State(state): State<Arc<AppState>>,
    form: std::result::Result<Form<LoginForm>, FormRejection>,
) -> Result<RedirectResponse> {
    let Ok(Form(form)) = form else {
        return Err(HandlerError::bad_request(LoginActionData::form_error(
            "Form not submitted properly.",
        )));
    };

    let redirect_to = safe_redirect(form.redirect_to.as_deref(), DEFAULT_REDIRECT);

    let (Some(login_type), Some(username), Some(password)) = (
        non_empty(form.login_type),
        non_empty(form.username),
        non_empty(form.password),
    ) else {
        return Err(HandlerError::bad_request(LoginActionData::form_error(
            "Form not submitted properly.",
        )));
    };

    let field_errors = LoginFieldErrors {
        username: validate_username(&username),
        password: validate_password(&password),
    };
    let fields = LoginFields {
        login_type,
        username,
    };

    if field_errors.any() {
        return Err(HandlerError::bad_request(LoginActionData::invalid(
            field_errors,
            fields,
        )));
    }

    let login_type = fields.login_type.clone();

    let user = match login_type.as_str() {
        "login" => {
            let user = state.auth_service.login(&fields.username, &password).await?;

            match user {
                Some(user) => user,
                None => {
                    return Err(HandlerError::bad_request(LoginActionData::rejected(
                        fields,
                        "Username/Password combination is incorrect",
                    )));
                }
            }
        }
        "register" => {
            let taken = format!("User with username {} already exists", fields.username);

            if state.auth_service.username_taken(&fields.username).await? {
                return Err(HandlerError::bad_request(LoginActionData::rejected(
                    fields, taken,
                )));
            }

            let registered = state.auth_service.register(&fields.username, &password).await;

            match registered {
                Ok(user) => user,
                Err(AuthError::StorageError(StorageError::Conflict(_))) => {
                    return Err(HandlerError::bad_request(LoginActionData::rejected(
                        fields, taken,
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }
        _ => {
            return Err(HandlerError::bad_request(LoginActionData::rejected(
                fields,
                "Login type invalid",
            )));
        }
    };

    let redirect = state
        .auth_service
        .create_user_session(&user.id, &redirect_to)?;

    Ok(RedirectResponse(redirect))
}

/// POST /logout - End the session
pub async fn logout(
    State(state): State<Arc<AppState>>,
    SessionCookie(cookie): SessionCookie,
) -> RedirectResponse {
    RedirectResponse(state.auth_service.logout(cookie.as_deref()))
}

/// GET /logout - Nothing to show; send the user home
pub async fn logout_page() -> RedirectResponse {
    RedirectResponse(Redirect::to("/"))
}
