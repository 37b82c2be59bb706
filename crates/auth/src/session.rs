use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use cookie::time::{Duration, OffsetDateTime};
use cookie::{Cookie, SameSite};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, warn};

use crate::error::{AuthError, Result};
use crate::model::Session;

type HmacSha256 = Hmac<Sha256>;

/// Name of the session cookie
pub const SESSION_COOKIE_NAME: &str = "RJ_session";

/// Session lifetime (30 days)
pub const SESSION_MAX_AGE_SECONDS: i64 = 60 * 60 * 24 * 30;

/// Signs sessions into cookies and verifies them on the way back.
///
/// The cookie value is `<payload>.<signature>` where the payload is the
/// base64url-encoded JSON session map and the signature is a base64url
/// HMAC-SHA256 of the payload under the process secret.
#[derive(Clone)]
pub struct SessionCodec {
    secret: Arc<[u8]>,
}

impl fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCodec")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl SessionCodec {
    /// Create a codec for the given signing secret
    ///
    /// # Arguments
    /// * `secret` - Non-empty signing secret, fixed for the life of the process
    pub fn new(secret: &str) -> Result<Self> {
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        Ok(Self {
            secret: Arc::from(secret.as_bytes()),
        })
    }

    /// Read the session out of a `Cookie` request header.
    ///
    /// A missing header, a missing session cookie or a cookie that fails
    /// verification all yield an empty session.
    pub fn decode(&self, cookie_header: Option<&str>) -> Session {
        let Some(header) = cookie_header else {
            return Session::new();
        };

        let value = Cookie::split_parse(header)
            .filter_map(|cookie| cookie.ok())
            .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
            .map(|cookie| cookie.value().to_string());

        match value {
            Some(value) if !value.is_empty() => self.unsign(&value).unwrap_or_else(|| {
                warn!("ignoring session cookie that failed verification");
                Session::new()
            }),
            _ => Session::new(),
        }
    }

    /// Produce a `Set-Cookie` header value carrying the signed session
    pub fn encode(&self, session: &Session) -> Result<String> {
        let json = serde_json::to_vec(session)
            .map_err(|e| AuthError::SessionEncodingError(e.to_string()))?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = URL_SAFE_NO_PAD.encode(self.sign(&payload)?);

        let cookie = Cookie::build((SESSION_COOKIE_NAME, format!("{payload}.{signature}")))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(Duration::seconds(SESSION_MAX_AGE_SECONDS))
            .build();

        Ok(cookie.to_string())
    }

    /// Produce a `Set-Cookie` header value that expires the session cookie
    pub fn destroy(&self, session: &Session) -> String {
        debug!(had_user = session.user_id().is_some(), "destroying session");

        Cookie::build((SESSION_COOKIE_NAME, ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(Duration::ZERO)
            .expires(OffsetDateTime::UNIX_EPOCH)
            .build()
            .to_string()
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AuthError::SessionEncodingError(e.to_string()))
    }

    fn sign(&self, payload: &str) -> Result<Vec<u8>> {
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn unsign(&self, value: &str) -> Option<Session> {
        let (payload, signature) = value.rsplit_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac().ok()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        serde_json::from_slice(&json).ok()
    }
}
