use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with an already hashed password
    pub fn new(username: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A joke posted by a user (the jokester)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Joke {
    pub id: String,
    pub name: String,
    pub content: String,
    pub jokester_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Joke {
    pub fn new(new: NewJoke) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            content: new.content,
            jokester_id: new.jokester_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.jokester_id == user_id
    }
}

/// Fields required to insert a joke
#[derive(Debug, Clone)]
pub struct NewJoke {
    pub name: String,
    pub content: String,
    pub jokester_id: String,
}

/// Slim projection used by joke listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JokeListItem {
    pub id: String,
    pub name: String,
}

impl From<&Joke> for JokeListItem {
    fn from(joke: &Joke) -> Self {
        Self {
            id: joke.id.clone(),
            name: joke.name.clone(),
        }
    }
}

/// Take/skip window over an ordered listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub take: usize,
    pub skip: usize,
}

impl Pagination {
    pub fn new(take: usize, skip: usize) -> Self {
        Self { take, skip }
    }

    pub fn first(take: usize) -> Self {
        Self { take, skip: 0 }
    }
}
