//! Wiki view, edit and save handlers.

use axum::{
    extract::{rejection::FormRejection, Extension, Form, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, instrument};

use super::{found, render};
use crate::marketplace::{
    pages::{Page, PageStore},
    templates::{Templates, EDIT, VIEW},
};

#[derive(Deserialize)]
pub struct SaveForm {
    #[serde(default)]
    body: String,
}

pub fn valid_title(title: &str) -> bool {
    Regex::new(r"^[a-zA-Z0-9]+$").is_ok_and(|re| re.is_match(title))
}

// axum handler for GET /view/:title
#[instrument(skip(pages, templates))]
pub async fn view(
    Path(title): Path<String>,
    pages: Extension<Arc<dyn PageStore>>,
    templates: Extension<Arc<Templates>>,
) -> Response {
    if !valid_title(&title) {
        return StatusCode::NOT_FOUND.into_response();
    }

    match pages.load(&title).await {
        Ok(page) => render(&templates, VIEW, &page),
        Err(err) => {
            debug!("Page not loaded, redirecting to edit: {err}");
            found(&format!("/edit/{title}"))
        }
    }
}

// axum handler for GET /edit/:title
#[instrument(skip(pages, templates))]
pub async fn edit(
    Path(title): Path<String>,
    pages: Extension<Arc<dyn PageStore>>,
    templates: Extension<Arc<Templates>>,
) -> Response {
    if !valid_title(&title) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let page = pages
        .load(&title)
        .await
        .unwrap_or_else(|_| Page::new(title.as_str()));

    render(&templates, EDIT, &page)
}

// axum handler for POST /save/:title
#[instrument(skip(pages, payload))]
pub async fn save(
    Path(title): Path<String>,
    pages: Extension<Arc<dyn PageStore>>,
    payload: Result<Form<SaveForm>, FormRejection>,
) -> Response {
    if !valid_title(&title) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let form = match payload {
        Ok(Form(form)) => form,
        Err(rejection) => return (StatusCode::BAD_REQUEST, rejection.body_text()).into_response(),
    };

    if let Err(err) = pages.save(&Page::new(title.as_str()).with_body(form.body)).await {
        error!("Failed to save page: {err}");
        return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
    }

    found(&format!("/view/{title}"))
}
