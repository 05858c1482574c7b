//! HTTP server for the movies API.
//!
//! # API Endpoints
//!
//! | Method | Path                       | Description                        |
//! |--------|----------------------------|------------------------------------|
//! | GET    | `/`                        | Liveness text                      |
//! | GET    | `/health`                  | Health check                       |
//! | GET    | `/logs`                    | SSE stream for real-time logs      |
//! | GET    | `/movies/list`             | Plain-text listing                 |
//! | GET    | `/movies/details/{id}`     | One movie                          |
//! | GET    | `/movies/search?minYear=`  | Movies released in or after a year |
//! | GET    | `/movies/search/name?name=`| Movies whose title contains a text |
//! | POST   | `/movies/add`              | Create a movie                     |
//! | PUT    | `/movies/{id}`             | Partial update                     |
//! | DELETE | `/movies/{id}`             | Delete                             |
//! | POST   | `/movies/import`           | Bulk import from a CSV upload      |
//! | GET    | `/movies/export`           | CSV download                       |

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, sse::KeepAlive, Json, Sse},
    routing::{get, post, put},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::handlers;
use super::logs::{log_info, log_info_indent, LOG_BROADCASTER};
use super::types::{error_response, AppState};
use crate::config::ServerConfig;

/// Room for the multipart envelope around the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

const MSG_ROUTE_NOT_FOUND: &str = "Ruta nu există";
const MSG_APP_RUNNING: &str = "Aplicația funcționează!";

/// Build the application router over `state`.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    // Oversized files must still reach the gatekeeper so they get a proper rejection.
    let body_limit = state
        .upload_limits
        .max_size
        .saturating_mul(2)
        .saturating_add(MULTIPART_OVERHEAD);

    let movies = Router::new()
        .route("/list", get(handlers::list_movies))
        .route("/details/{id}", get(handlers::movie_details))
        .route("/search", get(handlers::search_by_year))
        .route("/search/name", get(handlers::search_by_name))
        .route("/add", post(handlers::add_movie))
        .route("/import", post(handlers::import_movies))
        .route("/export", get(handlers::export_movies))
        .route(
            "/{id}",
            put(handlers::update_movie).delete(handlers::delete_movie),
        );

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/logs", get(sse_logs))
        .nest("/movies", movies)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::from_config(&config);
    let movie_count = state.store.read().await.len();
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    log_info(format!("Movies API running on http://localhost:{}", config.port));
    log_info_indent(format!("{movie_count} filme în memorie"), 1);
    log_info_indent(
        format!("Upload maxim: {} bytes", config.max_upload_bytes),
        1,
    );
    if config.forbid_unknown_fields {
        log_info_indent("Câmpurile necunoscute sunt respinse la adăugare", 1);
    }

    axum::serve(listener, app).await?;

    Ok(())
}

async fn root() -> &'static str {
    MSG_APP_RUNNING
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> Json<Value> {
    let movies = state.store.read().await.len();
    Json(json!({
        "status": "ok",
        "service": "movies",
        "version": env!("CARGO_PKG_VERSION"),
        "movies": movies,
    }))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(error_response(MSG_ROUTE_NOT_FOUND)))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers drop the missed entries and keep streaming.
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
