use auth::AuthService;
use std::sync::Arc;
use storage::Database;

/// Application state shared across all handlers
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub auth_service: AuthService,
}

impl AppState {
    pub fn new(db: Arc<dyn Database>, auth_service: AuthService) -> Self {
        Self { db, auth_service }
    }
}
