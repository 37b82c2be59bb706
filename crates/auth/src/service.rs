use std::sync::Arc;

use storage::{Database, User};
use tracing::{debug, info, warn};

use crate::{
    error::{AuthError, Result},
    model::{Redirect, Session},
    password::{hash_password, verify_password},
    session::SessionCodec,
};

/// Location of the login page
pub const LOGIN_PATH: &str = "/login";

/// Authentication service: credentials against the database, identity in the
/// signed session cookie.
///
/// Request-facing operations take the raw `Cookie` header value so the service
/// stays independent of the HTTP framework.
pub struct AuthService {
    db: Arc<dyn Database>,
    codec: SessionCodec,
}

impl AuthService {
    /// Create a new AuthService
    ///
    /// # Arguments
    /// * `db` - Persistence collaborator holding user records
    /// * `codec` - Session codec built from the process signing secret
    pub fn new(db: Arc<dyn Database>, codec: SessionCodec) -> Self {
        Self { db, codec }
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    /// Check credentials and return the matching user.
    ///
    /// Returns `Ok(None)` for an unknown username or a wrong password. Does not
    /// touch the session; see [`AuthService::create_user_session`].
    pub async fn login(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.db.find_user_by_username(username).await? else {
            return Ok(None);
        };

        let attempt = password.to_string();
        let stored = user.password_hash.clone();
        let verified = run_blocking(move || verify_password(&attempt, &stored)).await?;

        match verified {
            Ok(true) => {
                info!(user_id = %user.id, "user logged in");
                Ok(Some(user))
            }
            Ok(false) => Ok(None),
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "stored password hash is unreadable");
                Ok(None)
            }
        }
    }

    /// Whether a user with this username already exists
    pub async fn username_taken(&self, username: &str) -> Result<bool> {
        Ok(self.db.find_user_by_username(username).await?.is_some())
    }

    /// Register a new user
    ///
    /// The caller is expected to have checked [`AuthService::username_taken`];
    /// a race on the same username surfaces as a storage conflict.
    pub async fn register(&self, username: &str, password: &str) -> Result<User> {
        let password = password.to_string();
        let password_hash = run_blocking(move || hash_password(&password)).await??;
        let user = self.db.create_user(username, &password_hash).await?;

        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Start a session for `user_id` and redirect to `redirect_to`
    pub fn create_user_session(&self, user_id: &str, redirect_to: &str) -> Result<Redirect> {
        let session = Session::for_user(user_id);
        let set_cookie = self.codec.encode(&session)?;

        Ok(Redirect::with_cookie(redirect_to, set_cookie))
    }

    pub fn get_user_session(&self, cookie_header: Option<&str>) -> Session {
        self.codec.decode(cookie_header)
    }

    pub fn get_user_id(&self, cookie_header: Option<&str>) -> Option<String> {
        self.get_user_session(cookie_header)
            .user_id()
            .map(str::to_string)
    }

    /// Return the session's user id, or a redirect to the login page that
    /// brings the user back to `redirect_to` afterwards.
    pub fn require_user_id(
        &self,
        cookie_header: Option<&str>,
        redirect_to: &str,
    ) -> std::result::Result<String, Redirect> {
        self.get_user_id(cookie_header).ok_or_else(|| {
            debug!(redirect_to, "no session, redirecting to login");
            Redirect::to(login_redirect(redirect_to))
        })
    }

    /// Resolve the session's user record.
    ///
    /// A session whose id the database cannot look up is treated as corrupt
    /// and answered with a forced logout.
    pub async fn get_user(
        &self,
        cookie_header: Option<&str>,
    ) -> std::result::Result<Option<User>, Redirect> {
        let Some(user_id) = self.get_user_id(cookie_header) else {
            return Ok(None);
        };

        match self.db.find_user_by_id(&user_id).await {
            Ok(user) => Ok(user),
            Err(e) => {
                warn!(%user_id, error = %e, "session user lookup failed, forcing logout");
                Err(self.logout(cookie_header))
            }
        }
    }

    /// End the session and redirect to the login page
    pub fn logout(&self, cookie_header: Option<&str>) -> Redirect {
        let session = self.get_user_session(cookie_header);
        Redirect::with_cookie(LOGIN_PATH, self.codec.destroy(&session))
    }
}

/// Argon2 is CPU-bound; keep it off the async worker threads
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AuthError::TaskError(e.to_string()))
}

fn login_redirect(redirect_to: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("redirectTo", redirect_to)
        .finish();

    format!("{LOGIN_PATH}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cookie::Cookie;
    use std::sync::atomic::{AtomicBool, Ordering};
    use storage::MemoryDatabase;

    fn service() -> AuthService {
        let db: Arc<dyn Database> = Arc::new(MemoryDatabase::new());
        AuthService::new(db, SessionCodec::new("test_secret").unwrap())
    }

    fn request_cookie(redirect: &Redirect) -> String {
        let set_cookie = redirect.set_cookie.as_deref().unwrap();
        let cookie = Cookie::parse(set_cookie).unwrap();
        format!("{}={}", cookie.name(), cookie.value())
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let service = service();

        assert!(!service.username_taken("alice").await.unwrap());
        let user = service.register("alice", "secret1").await.unwrap();
        assert!(service.username_taken("alice").await.unwrap());
        assert_ne!(user.password_hash, "secret1");

        let logged_in = service.login("alice", "secret1").await.unwrap();
        assert_eq!(logged_in, Some(user));

        assert!(service.login("alice", "wrong").await.unwrap().is_none());
        assert!(service.login("bob", "secret1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_password_work_yields_to_other_tasks() {
        let service = service();
        let ran = Arc::new(AtomicBool::new(false));

        let flag = ran.clone();
        tokio::spawn(async move { flag.store(true, Ordering::SeqCst) });

        service.register("alice", "secret1").await.unwrap();
        assert!(ran.load(Ordering::SeqCst));

        ran.store(false, Ordering::SeqCst);
        let flag = ran.clone();
        tokio::spawn(async move { flag.store(true, Ordering::SeqCst) });

        assert!(service.login("alice", "secret1").await.unwrap().is_some());
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let service = service();
        let user = service.register("alice", "secret1").await.unwrap();

        let redirect = service.create_user_session(&user.id, "/jokes").unwrap();
        assert_eq!(redirect.location, "/jokes");

        let cookie = request_cookie(&redirect);
        assert_eq!(service.get_user_id(Some(&cookie)), Some(user.id.clone()));
        assert_eq!(service.require_user_id(Some(&cookie), "/jokes/new"), Ok(user.id.clone()));
        assert_eq!(service.get_user(Some(&cookie)).await, Ok(Some(user)));

        let logout = service.logout(Some(&cookie));
        assert_eq!(logout.location, LOGIN_PATH);

        let cleared = request_cookie(&logout);
        assert_eq!(service.get_user_id(Some(&cleared)), None);
    }

    #[tokio::test]
    async fn test_require_user_id_redirects() {
        let service = service();

        let redirect = service.require_user_id(None, "/jokes/new").unwrap_err();
        assert_eq!(redirect.location, "/login?redirectTo=%2Fjokes%2Fnew");
        assert!(redirect.set_cookie.is_none());

        let forged = format!("{}=bogus.value", crate::SESSION_COOKIE_NAME);
        assert!(service.require_user_id(Some(&forged), "/jokes").is_err());
    }

    #[tokio::test]
    async fn test_get_user_anonymous() {
        let service = service();
        assert_eq!(service.get_user(None).await, Ok(None));
    }

    #[tokio::test]
    async fn test_get_user_invalid_id_forces_logout() {
        let service = service();
        let redirect = service.create_user_session("not-a-uuid", "/jokes").unwrap();
        let cookie = request_cookie(&redirect);

        let forced = service.get_user(Some(&cookie)).await.unwrap_err();
        assert_eq!(forced.location, LOGIN_PATH);
        assert!(forced.set_cookie.is_some());
    }

    #[tokio::test]
    async fn test_get_user_stale_id() {
        let service = service();
        let redirect = service
            .create_user_session("00000000-0000-4000-8000-000000000000", "/jokes")
            .unwrap();
        let cookie = request_cookie(&redirect);

        assert_eq!(service.get_user(Some(&cookie)).await, Ok(None));
    }
}
