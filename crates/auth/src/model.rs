use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Session key holding the authenticated user's id
pub const USER_ID_KEY: &str = "userId";

/// Key-value session data carried inside the signed cookie
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session {
    values: BTreeMap<String, Value>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session identifying `user_id`
    pub fn for_user(user_id: &str) -> Self {
        let mut session = Self::new();
        session.set(USER_ID_KEY, user_id);
        session
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn unset(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// The user id, if present and a non-empty string
    pub fn user_id(&self) -> Option<&str> {
        self.get(USER_ID_KEY)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Redirect that ends request handling early.
///
/// Produced both by successful state changes (login, logout) and by
/// authentication checks that short-circuit the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
    pub set_cookie: Option<String>,
}

impl Redirect {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            set_cookie: None,
        }
    }

    pub fn with_cookie(location: impl Into<String>, set_cookie: String) -> Self {
        Self {
            location: location.into(),
            set_cookie: Some(set_cookie),
        }
    }
}
