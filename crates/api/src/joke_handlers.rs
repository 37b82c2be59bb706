use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::Uri,
    Form, Json,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use auth::validation::{validate_joke_content, validate_joke_name};
use auth::{Redirect, User};
use storage::{Joke, JokeListItem, NewJoke, Pagination, StorageError};

use crate::error::{ErrorResponse, HandlerError, RedirectResponse, Result};
use crate::form::{non_empty, ActionData};
use crate::middleware::{MaybeUserId, RequireUserId, SessionCookie};
use crate::AppState;

/// Number of jokes shown in the sidebar listing
const LISTING_SIZE: usize = 5;

const JOKE_NOT_FOUND: &str = "What a joke! Not found.";

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JokesListing {
    pub jokes: Vec<JokeListItem>,
    pub user: Option<UserSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JokeDetail {
    pub joke: Joke,
    pub is_owner: bool,
}

#[derive(Debug, Deserialize)]
pub struct NewJokeForm {
    pub name: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JokeFieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl JokeFieldErrors {
    fn any(&self) -> bool {
        self.name.is_some() || self.content.is_some()
    }
}

#[derive(Debug, Serialize)]
pub struct JokeFields {
    pub name: String,
    pub content: String,
}

type JokeActionData = ActionData<JokeFieldErrors, JokeFields>;

#[derive(Debug, Deserialize)]
pub struct JokeActionForm {
    #[serde(rename = "_method")]
    pub method: Option<String>,
}

/// Look up a joke, treating ids the database cannot parse as missing
async fn find_joke(state: &AppState, joke_id: &str) -> Result<Option<Joke>> {
    match state.db.find_joke(joke_id).await {
        Ok(joke) => Ok(joke),
        Err(StorageError::InvalidId(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// GET /jokes - The newest jokes and the signed-in user
pub async fn list_jokes(
    State(state): State<Arc<AppState>>,
    SessionCookie(cookie): SessionCookie,
) -> Result<Json<JokesListing>> {
    let user = state.auth_service.get_user(cookie.as_deref()).await?;
    let jokes = state.db.list_jokes(Pagination::first(LISTING_SIZE)).await?;

    Ok(Json(JokesListing {
        jokes: jokes.iter().map(JokeListItem::from).collect(),
        user: user.map(UserSummary::from),
    }))
}

/// GET /jokes/random - One joke picked uniformly at random
pub async fn random_joke(State(state): State<Arc<AppState>>) -> Result<Json<Joke>> {
    let count = state.db.count_jokes().await?;
    if count == 0 {
        return Err(HandlerError::not_found("No jokes to be found."));
    }

    let skip = rand::thread_rng().gen_range(0..count);

    state
        .db
        .list_jokes(Pagination::new(1, skip))
        .await?
        .into_iter()
        .next()
        .map(Json)
        .ok_or_else(|| HandlerError::not_found("No jokes to be found."))
}

/// GET /jokes/new - Only reachable with a session (see router)
pub async fn new_joke_page() -> Json<serde_json::Value> {
    Json(serde_json::json!({}))
}

/// POST /jokes/new - Validate and create a joke owned by the signed-in user
pub async fn create_joke(
    State(state): State<Arc<AppState>>,
    RequireUserId(user_id): RequireUserId,
    form: std::result::Result<Form<NewJokeForm>, FormRejection>,
) -> Result<RedirectResponse> {
    let Ok(Form(form)) = form else {
        return Err(HandlerError::bad_request(JokeActionData::form_error(
            "Form not submitted correctly.",
        )));
    };

    let (Some(name), Some(content)) = (non_empty(form.name), non_empty(form.content)) else {
        return Err(HandlerError::bad_request(JokeActionData::form_error(
            "Form not submitted correctly.",
        )));
    };

    let field_errors = JokeFieldErrors {
        name: validate_joke_name(&name),
        content: validate_joke_content(&content),
    };
    let fields = JokeFields { name, content };

    if field_errors.any() {
        return Err(HandlerError::bad_request(JokeActionData::invalid(
            field_errors,
            fields,
        )));
    }

    let joke = state
        .db
        .create_joke(NewJoke {
            name: fields.name,
            content: fields.content,
            jokester_id: user_id,
        })
        .await?;

    info!(joke_id = %joke.id, jokester_id = %joke.jokester_id, "joke created");
    Ok(RedirectResponse(Redirect::to(format!("/jokes/{}", joke.id))))
}

/// GET /jokes/{joke_id} - A single joke and whether the viewer wrote it
pub async fn get_joke(
    State(state): State<Arc<AppState>>,
    Path(joke_id): Path<String>,
    MaybeUserId(user_id): MaybeUserId,
) -> Result<Json<JokeDetail>> {
    let joke = find_joke(&state, &joke_id)
        .await?
        .ok_or_else(|| HandlerError::not_found(JOKE_NOT_FOUND))?;

    let is_owner = user_id.as_deref().is_some_and(|id| joke.is_owned_by(id));

    Ok(Json(JokeDetail { joke, is_owner }))
}

/// POST /jokes/{joke_id} - Form actions on a joke; only `_method=delete` is supported
pub async fn joke_action(
    State(state): State<Arc<AppState>>,
    Path(joke_id): Path<String>,
    SessionCookie(cookie): SessionCookie,
    uri: Uri,
    form: std::result::Result<Form<JokeActionForm>, FormRejection>,
) -> Result<RedirectResponse> {
    let method = form.ok().and_then(|Form(form)| form.method);

    if method.as_deref() != Some("delete") {
        return Err(HandlerError::bad_request(ErrorResponse {
            error: "Method not supported".to_string(),
        }));
    }

    let user_id = state
        .auth_service
        .require_user_id(cookie.as_deref(), uri.path())?;

    let joke = find_joke(&state, &joke_id)
        .await?
        .ok_or_else(|| HandlerError::not_found(JOKE_NOT_FOUND))?;

    if !joke.is_owned_by(&user_id) {
        warn!(joke_id = %joke.id, %user_id, "refused to delete another user's joke");
        return Err(HandlerError::unauthorized(
            "You do not have permission to do that",
        ));
    }

    state.db.delete_joke(&joke.id).await?;

    info!(joke_id = %joke.id, %user_id, "joke deleted");
    Ok(RedirectResponse(Redirect::to("/jokes")))
}
