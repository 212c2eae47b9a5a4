pub mod auth_gate;
pub use self::auth_gate::{auth_gate, protect};

pub mod health;
pub use self::health::health;

pub mod login;
pub mod people;
pub mod root;
pub mod wiki;


// common functions for the handlers
use axum::{
    http::{header::LOCATION, StatusCode},
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use super::{pages::Page, templates::Templates};

/// Render a template, or a `500` carrying the render error.
pub(crate) fn render(templates: &Templates, name: &str, page: &Page) -> Response {
    match templates.render(name, page) {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            error!("Failed to render template: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

/// `302 Found` redirect.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

// axum handler for the guarded greeting
pub async fn hello() -> &'static str {
    "Hello World\n"
}

// axum handler for the guarded secret
pub async fn secret() -> &'static str {
    "The cake is a lie!\n"
}
