//! Session token minting and the `session` cookie.

use axum::http::{
    header::{InvalidHeaderValue, SET_COOKIE},
    HeaderMap, HeaderValue,
};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use std::{fmt, sync::Arc};

use super::SessionError;

pub const SESSION_COOKIE_NAME: &str = "session";

const TOKEN_BYTES: usize = 32;

/// Source of the random bytes behind session tokens.
pub trait RandomSource: Send + Sync {
    /// Fill `dest` completely or fail; partial output must never be used.
    ///
    /// # Errors
    /// Returns an error when the source cannot produce output.
    fn try_fill(&self, dest: &mut [u8]) -> Result<(), rand::Error>;
}

/// The operating system CSPRNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn try_fill(&self, dest: &mut [u8]) -> Result<(), rand::Error> {
        OsRng.try_fill_bytes(dest)
    }
}

/// Attributes added to the `session` cookie.
///
/// Everything is off by default, which yields a session-lifetime cookie with
/// the browser's default path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CookiePolicy {
    path: Option<String>,
    secure: bool,
    http_only: bool,
}

impl CookiePolicy {
    /// # Errors
    /// Returns [`SessionError::InvalidCookiePath`] if `path` would not form a
    /// single, well-formed `Path` attribute.
    pub fn with_path(mut self, path: Option<String>) -> Result<Self, SessionError> {
        if let Some(path) = &path {
            validate_cookie_path(path)?;
        }
        self.path = path;
        Ok(self)
    }

    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn secure(&self) -> bool {
        self.secure
    }

    #[must_use]
    pub fn http_only(&self) -> bool {
        self.http_only
    }
}

/// A cookie `Path` must be absolute, visible ASCII, and free of `;`.
///
/// # Errors
/// Returns [`SessionError::InvalidCookiePath`] describing the first problem.
pub fn validate_cookie_path(path: &str) -> Result<(), SessionError> {
    if !path.starts_with('/') {
        return Err(SessionError::InvalidCookiePath(
            "cookie path must start with '/'".to_string(),
        ));
    }
    if path.chars().any(|c| c == ';' || !c.is_ascii_graphic()) {
        return Err(SessionError::InvalidCookiePath(
            "cookie path must be visible ASCII without ';'".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct TokenIssuer {
    source: Arc<dyn RandomSource>,
    policy: CookiePolicy,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    #[must_use]
    pub fn new(policy: CookiePolicy) -> Self {
        Self {
            source: Arc::new(OsRandom),
            policy,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn RandomSource>) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn policy(&self) -> &CookiePolicy {
        &self.policy
    }

    /// Mint a new URL-safe session token.
    ///
    /// # Errors
    /// Returns [`SessionError::RandomnessUnavailable`] when the random source
    /// fails. There is no fallback to a predictable value.
    pub fn new_token(&self) -> Result<String, SessionError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        self.source
            .try_fill(&mut bytes)
            .map_err(|err| SessionError::RandomnessUnavailable(err.to_string()))?;
        Ok(Base64UrlUnpadded::encode_string(&bytes))
    }

    /// Build the `Set-Cookie` value binding `token` to the client.
    ///
    /// # Errors
    /// Returns an error if the configured attributes do not form a valid header.
    pub fn session_cookie(&self, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!("{SESSION_COOKIE_NAME}={token}");
        if let Some(path) = self.policy.path() {
            cookie.push_str("; Path=");
            cookie.push_str(path);
        }
        if self.policy.http_only() {
            cookie.push_str("; HttpOnly");
        }
        if self.policy.secure() {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }

    /// Set the `session` cookie on a response, replacing any earlier one.
    ///
    /// # Errors
    /// Returns an error if the cookie header cannot be built.
    pub fn attach_cookie(
        &self,
        headers: &mut HeaderMap,
        token: &str,
    ) -> Result<(), InvalidHeaderValue> {
        let cookie = self.session_cookie(token)?;

        let prefix = format!("{SESSION_COOKIE_NAME}=");
        let others: Vec<HeaderValue> = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter(|value| !value.as_bytes().starts_with(prefix.as_bytes()))
            .cloned()
            .collect();

        headers.remove(SET_COOKIE);
        for value in others {
            headers.append(SET_COOKIE, value);
        }
        headers.append(SET_COOKIE, cookie);

        Ok(())
    }
}
