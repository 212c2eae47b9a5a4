use anyhow::Result;
use axum::{
    body::Body,
    extract::{Extension, MatchedPath},
    http::{HeaderName, HeaderValue, Request},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, info_span, Span};
use ulid::Ulid;

pub mod handlers;
pub mod openapi;
pub mod pages;
pub mod people;
pub mod session;
pub mod templates;

use handlers::{login, people as people_api, root, wiki};
use pages::PageStore;
use people::People;
use session::AuthState;
use templates::Templates;

/// Build the application router.
///
/// Wiki routes plus `/hello` and `/secret` sit behind the session middleware;
/// the index, login, health, and `people` API are public.
pub fn app(
    auth: Arc<AuthState>,
    templates: Arc<Templates>,
    pages: Arc<dyn PageStore>,
    people: Arc<People>,
) -> Router {
    let protected = handlers::protect(
        Router::new()
            .route("/hello", get(handlers::hello))
            .route("/secret", get(handlers::secret))
            .route("/view/:title", get(wiki::view))
            .route("/edit/:title", get(wiki::edit))
            .route("/save/:title", post(wiki::save)),
    );

    Router::new()
        .route("/", get(root::root))
        .route("/health", get(handlers::health))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .route("/login", get(login::form).post(login::login))
        .route("/logout", post(login::logout))
        .route("/people", get(people_api::list_people))
        .route(
            "/people/:id",
            get(people_api::get_person)
                .post(people_api::create_person)
                .delete(people_api::delete_person),
        )
        .merge(protected)
        .layer(Extension(auth))
        .layer(Extension(templates))
        .layer(Extension(pages))
        .layer(Extension(people))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(
    port: u16,
    auth: Arc<AuthState>,
    templates: Arc<Templates>,
    pages: Arc<dyn PageStore>,
    people: Arc<People>,
) -> Result<()> {
    let app = app(auth, templates, pages, people).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span)),
    );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Gracefully shutdown"),
                Err(err) => {
                    error!("Failed to listen for shutdown signal: {err}");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
