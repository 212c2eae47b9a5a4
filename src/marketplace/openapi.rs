use axum::response::Json;
use utoipa::OpenApi;

use super::{
    handlers::{health, people},
    people::{Address, Person},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        people::list_people,
        people::get_person,
        people::create_person,
        people::delete_person,
    ),
    components(schemas(health::Health, Person, Address)),
    tags(
        (name = "health", description = "Service health"),
        (name = "people", description = "In-memory people resource"),
    )
)]
pub struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

// axum handler for the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_documents_people_routes() {
        let doc = openapi();
        assert!(doc.paths.paths.contains_key("/people"));
        assert!(doc.paths.paths.contains_key("/people/{id}"));
        assert!(doc.paths.paths.contains_key("/health"));
    }
}
