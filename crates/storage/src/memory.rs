use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::{Database, Joke, NewJoke, Pagination, Result, StorageError, User};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Tables {
    users: Vec<User>,
    jokes: Vec<Joke>,
}

/// In-process database with an optional JSON snapshot on disk.
///
/// Every mutation works on a copy of the tables and holds the write lock until
/// the snapshot (if any) has been rewritten. The copy replaces the live tables
/// only once the write succeeds, so a failed write leaves nothing behind.
pub struct MemoryDatabase {
    tables: RwLock<Tables>,
    snapshot_path: Option<PathBuf>,
}

impl MemoryDatabase {
    /// Create an empty, purely in-memory database
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            snapshot_path: None,
        }
    }

    /// Open a database backed by a snapshot file
    ///
    /// # Arguments
    /// * `path` - Snapshot location; loaded when it exists, created on first write
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }

        let tables = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Tables::default(),
            Err(e) => return Err(e.into()),
        };

        debug!(
            path = %path.display(),
            users = tables.users.len(),
            jokes = tables.jokes.len(),
            "opened snapshot"
        );

        Ok(Self {
            tables: RwLock::new(tables),
            snapshot_path: Some(path),
        })
    }

    /// Get the snapshot path, if this database persists to disk
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    async fn persist(&self, tables: &Tables) -> Result<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        let data = serde_json::to_vec_pretty(tables)?;
        let tmp_path = path.with_extension("tmp");

        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(&data).await?;
        file.flush().await?;
        drop(file);

        fs::rename(&tmp_path, path).await?;
        Ok(())
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

fn check_id(id: &str) -> Result<()> {
    Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| StorageError::InvalidId(id.to_string()))
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        check_id(id)?;
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.username == username) {
            return Err(StorageError::Conflict(format!(
                "username '{}' is already taken",
                username
            )));
        }

        let user = User::new(username.to_string(), password_hash.to_string());
        let mut next = tables.clone();
        next.users.push(user.clone());
        self.persist(&next).await?;
        *tables = next;

        Ok(user)
    }

    async fn find_joke(&self, id: &str) -> Result<Option<Joke>> {
        check_id(id)?;
        let tables = self.tables.read().await;
        Ok(tables.jokes.iter().find(|j| j.id == id).cloned())
    }

    async fn list_jokes(&self, pagination: Pagination) -> Result<Vec<Joke>> {
        let tables = self.tables.read().await;

        // Reverse first so equal timestamps keep the latest insert on top.
        let mut jokes: Vec<&Joke> = tables.jokes.iter().rev().collect();
        jokes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(jokes
            .into_iter()
            .skip(pagination.skip)
            .take(pagination.take)
            .cloned()
            .collect())
    }

    async fn count_jokes(&self) -> Result<usize> {
        Ok(self.tables.read().await.jokes.len())
    }

    async fn create_joke(&self, joke: NewJoke) -> Result<Joke> {
        let mut tables = self.tables.write().await;

        let joke = Joke::new(joke);
        let mut next = tables.clone();
        next.jokes.push(joke.clone());
        self.persist(&next).await?;
        *tables = next;

        Ok(joke)
    }

    async fn delete_joke(&self, id: &str) -> Result<Joke> {
        check_id(id)?;
        let mut tables = self.tables.write().await;

        let index = tables
            .jokes
            .iter()
            .position(|j| j.id == id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;

        let mut next = tables.clone();
        let joke = next.jokes.remove(index);
        self.persist(&next).await?;
        *tables = next;

        Ok(joke)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_joke(name: &str, jokester_id: &str) -> NewJoke {
        NewJoke {
            name: name.to_string(),
            content: format!("{} walks into a bar", name),
            jokester_id: jokester_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let db = MemoryDatabase::new();

        let user = db.create_user("kody", "hash").await.unwrap();

        let by_id = db.find_user_by_id(&user.id).await.unwrap();
        assert_eq!(by_id, Some(user.clone()));

        let by_name = db.find_user_by_username("kody").await.unwrap();
        assert_eq!(by_name, Some(user));

        assert!(db.find_user_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let db = MemoryDatabase::new();

        db.create_user("kody", "hash").await.unwrap();
        let result = db.create_user("kody", "other").await;

        assert!(matches!(result, Err(StorageError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_malformed_id_is_an_error() {
        let db = MemoryDatabase::new();

        let result = db.find_user_by_id("not-a-uuid").await;
        assert!(matches!(result, Err(StorageError::InvalidId(_))));

        let missing = db.find_user_by_id(&Uuid::new_v4().to_string()).await;
        assert!(matches!(missing, Ok(None)));
    }

    #[tokio::test]
    async fn test_list_jokes_newest_first() {
        let db = MemoryDatabase::new();

        for name in ["first", "second", "third"] {
            db.create_joke(new_joke(name, "owner")).await.unwrap();
        }

        let jokes = db.list_jokes(Pagination::first(2)).await.unwrap();
        let names: Vec<_> = jokes.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["third", "second"]);

        let rest = db.list_jokes(Pagination::new(5, 2)).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].name, "first");

        assert_eq!(db.count_jokes().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_delete_joke() {
        let db = MemoryDatabase::new();

        let joke = db.create_joke(new_joke("gone", "owner")).await.unwrap();
        let deleted = db.delete_joke(&joke.id).await.unwrap();
        assert_eq!(deleted.id, joke.id);

        assert!(db.find_joke(&joke.id).await.unwrap().is_none());

        let again = db.delete_joke(&joke.id).await;
        assert!(matches!(again, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("jokes.json");

        let user_id = {
            let db = MemoryDatabase::open(&path).await.unwrap();
            let user = db.create_user("kody", "hash").await.unwrap();
            db.create_joke(new_joke("persisted", &user.id)).await.unwrap();
            user.id
        };

        assert!(path.exists());

        let db = MemoryDatabase::open(&path).await.unwrap();
        assert_eq!(db.snapshot_path(), Some(path.as_path()));

        let user = db.find_user_by_id(&user_id).await.unwrap().unwrap();
        assert_eq!(user.username, "kody");

        let jokes = db.list_jokes(Pagination::first(10)).await.unwrap();
        assert_eq!(jokes.len(), 1);
        assert_eq!(jokes[0].jokester_id, user_id);
    }

    #[tokio::test]
    async fn test_failed_snapshot_write_discards_changes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("jokes.json");
        let db = MemoryDatabase::open(&path).await.unwrap();

        let owner = db.create_user("owner", "hash").await.unwrap();
        let joke = db.create_joke(new_joke("kept", &owner.id)).await.unwrap();

        // A directory where the temp file goes makes every write fail
        let blocker = path.with_extension("tmp");
        std::fs::create_dir(&blocker).unwrap();

        assert!(db.create_user("kody", "hash").await.is_err());
        assert!(db.find_user_by_username("kody").await.unwrap().is_none());

        assert!(db.create_joke(new_joke("lost", &owner.id)).await.is_err());
        assert_eq!(db.count_jokes().await.unwrap(), 1);

        assert!(db.delete_joke(&joke.id).await.is_err());
        assert!(db.find_joke(&joke.id).await.unwrap().is_some());

        std::fs::remove_dir(&blocker).unwrap();

        let kody = db.create_user("kody", "hash").await.unwrap();
        assert_eq!(kody.username, "kody");

        let reopened = MemoryDatabase::open(&path).await.unwrap();
        assert!(reopened.find_user_by_username("kody").await.unwrap().is_some());
        assert_eq!(reopened.count_jokes().await.unwrap(), 1);
    }
}
