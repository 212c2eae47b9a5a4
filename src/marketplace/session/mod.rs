//! Session state, configuration, and cookie-based session resolution.

use axum::{
    http::{
        header::{InvalidHeaderValue, COOKIE},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

pub mod credentials;
pub mod store;
pub mod token;

pub use credentials::{Credential, CredentialVerifier, StaticPasswordVerifier};
pub use store::{ClientSession, SessionStore};
pub use token::{
    validate_cookie_path, CookiePolicy, OsRandom, RandomSource, TokenIssuer, SESSION_COOKIE_NAME,
};

pub const DEFAULT_LOGIN_TITLE: &str = "Login to Marketplace";

// A colliding 256-bit token means the random source is broken, not unlucky.
const MAX_ISSUE_ATTEMPTS: usize = 3;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read session cookie: {0}")]
    Transport(String),
    #[error("secure random source unavailable: {0}")]
    RandomnessUnavailable(String),
    #[error("invalid session cookie: {0}")]
    InvalidCookie(#[from] InvalidHeaderValue),
    #[error("invalid cookie path: {0}")]
    InvalidCookiePath(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        match self {
            Self::Transport(_) => {
                warn!("{self}");
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            Self::RandomnessUnavailable(_)
            | Self::InvalidCookie(_)
            | Self::InvalidCookiePath(_) => {
                error!("{self}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    login_title: String,
    cookie: CookiePolicy,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            login_title: DEFAULT_LOGIN_TITLE.to_string(),
            cookie: CookiePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_login_title(mut self, title: String) -> Self {
        self.login_title = title;
        self
    }

    /// # Errors
    /// Returns [`SessionError::InvalidCookiePath`] for a path that would break
    /// the `Set-Cookie` header.
    pub fn with_cookie_path(mut self, path: Option<String>) -> Result<Self, SessionError> {
        self.cookie = self.cookie.with_path(path)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie = self.cookie.with_secure(secure);
        self
    }

    #[must_use]
    pub fn with_cookie_http_only(mut self, http_only: bool) -> Self {
        self.cookie = self.cookie.with_http_only(http_only);
        self
    }

    #[must_use]
    pub fn login_title(&self) -> &str {
        &self.login_title
    }

    #[must_use]
    pub fn cookie(&self) -> &CookiePolicy {
        &self.cookie
    }
}

/// The session a request runs under, after resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSession {
    pub token: String,
    pub session: ClientSession,
    /// The token was minted for this request.
    pub issued: bool,
}

/// Everything the session middleware and the login flow share.
pub struct AuthState {
    config: AuthConfig,
    store: SessionStore,
    issuer: TokenIssuer,
    verifier: Arc<dyn CredentialVerifier>,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, verifier: Arc<dyn CredentialVerifier>) -> Self {
        let issuer = TokenIssuer::new(config.cookie().clone());
        Self {
            config,
            store: SessionStore::new(),
            issuer,
            verifier,
        }
    }

    #[must_use]
    pub fn with_random_source(mut self, source: Arc<dyn RandomSource>) -> Self {
        self.issuer = self.issuer.with_source(source);
        self
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    #[must_use]
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    #[must_use]
    pub fn verifier(&self) -> &dyn CredentialVerifier {
        self.verifier.as_ref()
    }

    /// Resolve the request's session, issuing a fresh one when the request
    /// carries no cookie or a token the store does not know.
    ///
    /// # Errors
    /// Returns [`SessionError::Transport`] when the `Cookie` header cannot be
    /// read, and [`SessionError::RandomnessUnavailable`] when a new token
    /// cannot be minted. Neither falls back to an anonymous session.
    pub async fn resolve(&self, headers: &HeaderMap) -> Result<ResolvedSession, SessionError> {
        if let Some(token) = extract_session_token(headers)? {
            if let Some(session) = self.store.get(&token).await {
                return Ok(ResolvedSession {
                    token,
                    session,
                    issued: false,
                });
            }
            debug!("Unknown session token, issuing a new session");
        }

        self.issue().await
    }

    /// Mint a token and store a new anonymous session under it.
    ///
    /// # Errors
    /// Returns [`SessionError::RandomnessUnavailable`] if the random source
    /// fails or keeps producing tokens that are already taken.
    pub async fn issue(&self) -> Result<ResolvedSession, SessionError> {
        for _ in 0..MAX_ISSUE_ATTEMPTS {
            let token = self.issuer.new_token()?;
            let session = ClientSession::anonymous();
            if self.store.insert_new(&token, session).await {
                debug!("Issued new session");
                return Ok(ResolvedSession {
                    token,
                    session,
                    issued: true,
                });
            }
            warn!("Session token collision");
        }

        Err(SessionError::RandomnessUnavailable(
            "random source keeps repeating tokens".to_string(),
        ))
    }

    /// Bind the session cookie to `response`.
    pub fn with_cookie(&self, mut response: Response, token: &str) -> Response {
        match self.issuer.attach_cookie(response.headers_mut(), token) {
            Ok(()) => response,
            Err(err) => SessionError::from(err).into_response(),
        }
    }
}

/// Read the `session` cookie from request headers.
///
/// Returns `Ok(None)` when no such cookie is present. A `Cookie` header that
/// is not visible ASCII is a transport error, never an absent cookie.
///
/// # Errors
/// Returns [`SessionError::Transport`] for unreadable `Cookie` headers.
pub fn extract_session_token(headers: &HeaderMap) -> Result<Option<String>, SessionError> {
    for header in &headers.get_all(COOKIE) {
        let value = header
            .to_str()
            .map_err(|err| SessionError::Transport(format!("malformed Cookie header: {err}")))?;
        for pair in value.split(';') {
            let Some((name, token)) = pair.trim().split_once('=') else {
                continue;
            };
            if name.trim() == SESSION_COOKIE_NAME {
                return Ok(Some(token.trim().trim_matches('"').to_string()));
            }
        }
    }
    Ok(None)
}
