// Core modules
mod error;
mod password;
mod session;

pub mod model;
pub mod service;
pub mod validation;

// Re-export error types
pub use error::{AuthError, Result};

// Re-export crypto primitives
pub use password::{hash_password, verify_password};
pub use session::{SessionCodec, SESSION_COOKIE_NAME, SESSION_MAX_AGE_SECONDS};

pub use model::{Redirect, Session, USER_ID_KEY};
pub use service::{AuthService, LOGIN_PATH};

// Persistence types that appear in this crate's API
pub use storage::User;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AuthError, Result,
        AuthService, SessionCodec,
        Redirect, Session, User,
    };
}
