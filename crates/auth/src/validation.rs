//! Form field validators.
//!
//! Each returns the user-facing message when the value is rejected.
//! Lengths are counted in characters, not bytes.

pub fn validate_username(username: &str) -> Option<String> {
    (username.chars().count() < 3)
        .then(|| "Username must be at least 3 characters long.".to_string())
}

pub fn validate_password(password: &str) -> Option<String> {
    (password.chars().count() < 6)
        .then(|| "Password must be at least 6 characters long.".to_string())
}

pub fn validate_joke_name(name: &str) -> Option<String> {
    (name.chars().count() < 2).then(|| "That joke's name is too short".to_string())
}

pub fn validate_joke_content(content: &str) -> Option<String> {
    (content.chars().count() < 10).then(|| "That joke's too short.".to_string())
}
