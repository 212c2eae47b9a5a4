//! Session middleware guarding protected routes.

use axum::{
    extract::{Extension, Request},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;
use tracing::debug;

use super::render;
use crate::marketplace::{
    pages::Page,
    session::AuthState,
    templates::{Templates, LOGIN},
};

/// Resolve or issue the caller's session, then either run the wrapped
/// handler (authenticated) or answer with the login page (anonymous).
///
/// Every response leaving this middleware carries the `session` cookie,
/// except when the session itself cannot be resolved.
pub async fn auth_gate(
    Extension(auth): Extension<Arc<AuthState>>,
    Extension(templates): Extension<Arc<Templates>>,
    request: Request,
    next: Next,
) -> Response {
    let resolved = match auth.resolve(request.headers()).await {
        Ok(resolved) => resolved,
        Err(err) => return err.into_response(),
    };

    let response = if resolved.session.authenticated {
        next.run(request).await
    } else {
        debug!(path = %request.uri().path(), "Anonymous session, rendering login");
        render(&templates, LOGIN, &Page::new(auth.config().login_title()))
    };

    auth.with_cookie(response, &resolved.token)
}

/// Put every route of `router` behind [`auth_gate`].
///
/// Requires `Extension<Arc<AuthState>>` and `Extension<Arc<Templates>>` layers
/// outside of the returned router.
pub fn protect<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn(auth_gate))
}
