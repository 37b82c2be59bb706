//! Storage module for users and jokes
//!
//! Provides functionality for:
//! - Looking up users by id or username
//! - Creating users and jokes
//! - Listing jokes newest first, with take/skip pagination
//! - Deleting jokes
//! - Optional JSON snapshot persistence for the in-memory database

pub mod memory;
pub mod model;
pub mod service;

pub use memory::MemoryDatabase;
pub use model::{Joke, JokeListItem, NewJoke, Pagination, User};
pub use service::Database;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Snapshot error: {0}")]
    SnapshotError(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;
