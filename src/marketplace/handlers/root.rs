use axum::{extract::Extension, response::Response};
use std::sync::Arc;

use super::render;
use crate::marketplace::{
    pages::Page,
    templates::{Templates, INDEX},
};

// axum handler for the index page
pub async fn root(templates: Extension<Arc<Templates>>) -> Response {
    render(&templates, INDEX, &Page::new("Index"))
}
