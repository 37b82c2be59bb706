pub mod router;
pub mod state;
pub mod error;
pub mod form;
pub mod auth_handlers;
pub mod joke_handlers;
pub mod middleware;

pub use error::{HandlerError, Result};
pub use router::router;
pub use state::AppState;
