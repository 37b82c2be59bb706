use async_trait::async_trait;

use crate::{Joke, NewJoke, Pagination, Result, User};

/// Persistence collaborator used by the auth service and the route handlers.
///
/// Every operation touches a single record (or a single ordered read) and is
/// atomic on its own; callers never need multi-step transactions.
#[async_trait]
pub trait Database: Send + Sync {
    /// Find a user by primary key.
    ///
    /// Returns `Ok(None)` for a well-formed id with no record and an error for
    /// an id the backend cannot interpret.
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Find a user by their unique username
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Insert a user. Fails with [`crate::StorageError::Conflict`] when the
    /// username is already registered.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User>;

    async fn find_joke(&self, id: &str) -> Result<Option<Joke>>;

    /// List jokes ordered by creation time, newest first
    async fn list_jokes(&self, pagination: Pagination) -> Result<Vec<Joke>>;

    async fn count_jokes(&self) -> Result<usize>;

    async fn create_joke(&self, joke: NewJoke) -> Result<Joke>;

    /// Delete a joke and return the removed record
    async fn delete_joke(&self, id: &str) -> Result<Joke>;
}
