//! # API REST
//!
//! REST API implementation for the cards service.
//!
//! Handles:
//! - HTTP endpoints with axum under `/api/cards`
//! - Multipart and JSON request bodies
//! - Serving stored uploads and the single-page frontend, with an `index.html` fallback
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Uses `cards-core` for all card operations.

#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod form;
pub mod handlers;
pub mod models;
pub mod static_files;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use cards_core::CardService;
use std::path::Path;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::RestConfig;

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    pub cards: CardService,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::list_cards,
        handlers::get_card,
        handlers::create_card,
        handlers::update_card,
        handlers::delete_card,
    ),
    components(schemas(
        models::CardRes,
        models::CardFieldsReq,
        models::CardUploadReq,
        models::DeleteCardRes,
        models::ErrorRes,
        models::HealthRes,
    ))
)]
pub struct ApiDoc;

/// Builds the full application router.
///
/// Routes under `/api` are handled by [`handlers`]; `/uploads/*` serves stored images;
/// every other path is served from `public_dir`, falling back to its `index.html`.
pub fn app(state: AppState, public_dir: &Path) -> Router {
    let body_limit = config::body_limit_for(state.cards.max_upload_bytes());
    let uploads = static_files::uploads(state.cards.uploads_dir(), public_dir);

    Router::new()
        .route("/api/health", get(handlers::health))
        .route(
            "/api/cards",
            get(handlers::list_cards).post(handlers::create_card),
        )
        .route(
            "/api/cards/:id",
            get(handlers::get_card)
                .put(handlers::update_card)
                .delete(handlers::delete_card),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest_service("/uploads", uploads)
        .fallback_service(static_files::frontend(public_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds the configured address and serves the application until the server stops.
///
/// # Errors
/// Returns an error if:
/// - the address cannot be bound, or
/// - the HTTP server fails while running.
pub async fn serve(cfg: RestConfig, cards: CardService) -> anyhow::Result<()> {
    let router = app(AppState { cards }, cfg.public_dir());

    let listener = tokio::net::TcpListener::bind(cfg.addr()).await?;
    tracing::info!("-- Cards REST API listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;

    Ok(())
}
