//! Login and logout endpoints.

use axum::{
    extract::{rejection::FormRejection, Extension, Form},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::render;
use crate::marketplace::{
    pages::Page,
    session::{AuthState, ClientSession, Credential},
    templates::{Templates, FAILED_LOGIN, LOGIN},
};

pub const FAILED_LOGIN_TITLE: &str = "Failed Login Attempt";

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: String,
}

impl LoginForm {
    fn into_credential(self) -> Credential {
        Credential {
            username: self.username,
            password: SecretString::from(self.password),
        }
    }
}

// axum handler for GET /login
#[instrument(skip_all)]
pub async fn form(
    headers: HeaderMap,
    auth: Extension<Arc<AuthState>>,
    templates: Extension<Arc<Templates>>,
) -> Response {
    let resolved = match auth.resolve(&headers).await {
        Ok(resolved) => resolved,
        Err(err) => return err.into_response(),
    };

    let response = render(&templates, LOGIN, &Page::new(auth.config().login_title()));

    auth.with_cookie(response, &resolved.token)
}

// axum handler for POST /login
#[instrument(skip_all)]
pub async fn login(
    headers: HeaderMap,
    auth: Extension<Arc<AuthState>>,
    templates: Extension<Arc<Templates>>,
    payload: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    let resolved = match auth.resolve(&headers).await {
        Ok(resolved) => resolved,
        Err(err) => return err.into_response(),
    };

    let response = match payload {
        Err(rejection) => {
            warn!("Malformed login request: {rejection}");
            (StatusCode::BAD_REQUEST, rejection.body_text()).into_response()
        }
        Ok(Form(form)) => {
            if auth.verifier().verify(&form.into_credential()) {
                auth.store()
                    .put(&resolved.token, ClientSession::authenticated())
                    .await;
                info!("Session authenticated");
                (StatusCode::OK, "Thank you for logging in.\n").into_response()
            } else {
                warn!("Failed login attempt");
                let mut response =
                    render(&templates, FAILED_LOGIN, &Page::new(FAILED_LOGIN_TITLE));
                if response.status() == StatusCode::OK {
                    *response.status_mut() = StatusCode::UNAUTHORIZED;
                }
                response
            }
        }
    };

    auth.with_cookie(response, &resolved.token)
}

// axum handler for POST /logout
#[instrument(skip_all)]
pub async fn logout(headers: HeaderMap, auth: Extension<Arc<AuthState>>) -> Response {
    let resolved = match auth.resolve(&headers).await {
        Ok(resolved) => resolved,
        Err(err) => return err.into_response(),
    };

    if resolved.session.authenticated {
        auth.store()
            .put(&resolved.token, ClientSession::anonymous())
            .await;
        info!("Session logged out");
    }

    auth.with_cookie(Redirect::to("/login").into_response(), &resolved.token)
}
