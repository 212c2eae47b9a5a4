use axum::{
    extract::{Extension, Path, Query},
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::IntoParams;

use crate::marketplace::people::{People, Person};

#[derive(Deserialize, IntoParams, Debug)]
#[into_params(parameter_in = Query)]
pub struct CreateParams {
    /// First name, overridden by the JSON body when it carries one
    firstname: Option<String>,
}

#[utoipa::path(
    get,
    path = "/people",
    responses(
        (status = 200, description = "All people", body = [Person], content_type = "application/json"),
    ),
    tag = "people"
)]
// axum handler for listing people
#[instrument(skip_all)]
pub async fn list_people(people: Extension<Arc<People>>) -> impl IntoResponse {
    Json(people.list().await)
}

#[utoipa::path(
    get,
    path = "/people/{id}",
    params(("id" = String, Path, description = "Person id")),
    responses(
        (status = 200, description = "The person, or an empty object if unknown", body = Person, content_type = "application/json"),
    ),
    tag = "people"
)]
// axum handler for a single person
#[instrument(skip(people))]
pub async fn get_person(Path(id): Path<String>, people: Extension<Arc<People>>) -> impl IntoResponse {
    Json(people.find(&id).await.unwrap_or_default())
}

#[utoipa::path(
    post,
    path = "/people/{id}",
    params(("id" = String, Path, description = "Person id"), CreateParams),
    request_body(content = Person, description = "Optional person fields", content_type = "application/json"),
    responses(
        (status = 200, description = "All people, including the new one", body = [Person], content_type = "application/json"),
    ),
    tag = "people"
)]
// axum handler for creating a person
#[instrument(skip(people, payload))]
pub async fn create_person(
    Path(id): Path<String>,
    Query(params): Query<CreateParams>,
    people: Extension<Arc<People>>,
    payload: Option<Json<Person>>,
) -> impl IntoResponse {
    let mut person = Person {
        firstname: params.firstname.unwrap_or_default(),
        ..Person::default()
    };
    match payload {
        Some(Json(body)) => person.merge(body),
        None => debug!("No JSON body, creating from path and query"),
    }
    person.id = id;

    Json(people.add(person).await)
}

#[utoipa::path(
    delete,
    path = "/people/{id}",
    params(("id" = String, Path, description = "Person id")),
    responses(
        (status = 200, description = "Remaining people", body = [Person], content_type = "application/json"),
    ),
    tag = "people"
)]
// axum handler for deleting a person
#[instrument(skip(people))]
pub async fn delete_person(
    Path(id): Path<String>,
    people: Extension<Arc<People>>,
) -> impl IntoResponse {
    Json(people.remove(&id).await)
}
