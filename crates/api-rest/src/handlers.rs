//! Card endpoints.

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
};
use cards_core::CardResult;

use crate::error::{ApiError, Operation};
use crate::form::CardForm;
use crate::models::{CardRes, DeleteCardRes, HealthRes};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Cards REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/api/cards",
    responses(
        (status = 200, description = "All cards, most recently created first", body = [CardRes])
    )
)]
/// List all cards
///
/// # Returns
/// * `Ok(Json<Vec<CardRes>>)` - Every card, sorted by `createdAt` descending
///
/// # Errors
/// Returns `500 Internal Server Error` if the card store is unusable.
#[axum::debug_handler]
pub async fn list_cards(State(state): State<AppState>) -> Result<Json<Vec<CardRes>>, ApiError> {
    let cards = state
        .cards
        .list()
        .map_err(|e| ApiError::from_card_error(Operation::List, e))?;
    Ok(Json(cards.into_iter().map(CardRes::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/cards/{id}",
    params(("id" = String, Path, description = "Card id, e.g. card_1")),
    responses(
        (status = 200, description = "Card found", body = CardRes),
        (status = 404, description = "Card not found", body = crate::models::ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn get_card(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<CardRes>, ApiError> {
    let card = state
        .cards
        .get(&id)
        .map_err(|e| ApiError::from_card_error(Operation::Get, e))?;
    Ok(Json(card.into()))
}

#[utoipa::path(
    post,
    path = "/api/cards",
    request_body(content = crate::models::CardUploadReq, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Card created", body = CardRes),
        (status = 400, description = "Missing or invalid image", body = crate::models::ErrorRes),
        (status = 413, description = "Image too large", body = crate::models::ErrorRes),
        (status = 500, description = "Internal server error", body = crate::models::ErrorRes)
    )
)]
/// Create a new card
///
/// Stores the uploaded image and registers a card referencing it. The image is mandatory;
/// `title`, `description` and `tags` default to empty strings.
///
/// # Errors
/// Returns:
/// - `400 Bad Request` if no image was sent or it is not an allowed image type,
/// - `413 Payload Too Large` if the image exceeds the upload limit,
/// - `500 Internal Server Error` if the image cannot be stored.
#[axum::debug_handler]
pub async fn create_card(
    State(state): State<AppState>,
    form: CardForm,
) -> Result<(StatusCode, Json<CardRes>), ApiError> {
    let cards = state.cards;
    let new_card = form.into_new_card();
    let card = run_blocking(Operation::Create, move || cards.create(new_card)).await?;
    Ok((StatusCode::CREATED, Json(card.into())))
}

#[utoipa::path(
    put,
    path = "/api/cards/{id}",
    params(("id" = String, Path, description = "Card id, e.g. card_1")),
    request_body(content = crate::models::CardUploadReq, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Card updated", body = CardRes),
        (status = 400, description = "Invalid image", body = crate::models::ErrorRes),
        (status = 404, description = "Card not found", body = crate::models::ErrorRes),
        (status = 413, description = "Image too large", body = crate::models::ErrorRes),
        (status = 500, description = "Internal server error", body = crate::models::ErrorRes)
    )
)]
/// Update an existing card
///
/// Supplied text fields replace the stored ones, an empty string included; absent fields are
/// kept. A supplied image replaces `imageUrl`.
#[axum::debug_handler]
pub async fn update_card(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    form: CardForm,
) -> Result<Json<CardRes>, ApiError> {
    let cards = state.cards;
    let update = form.into_update();
    let card = run_blocking(Operation::Update, move || cards.update(&id, update)).await?;
    Ok(Json(card.into()))
}

#[utoipa::path(
    delete,
    path = "/api/cards/{id}",
    params(("id" = String, Path, description = "Card id, e.g. card_1")),
    responses(
        (status = 200, description = "Card deleted", body = DeleteCardRes),
        (status = 404, description = "Card not found", body = crate::models::ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn delete_card(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<DeleteCardRes>, ApiError> {
    state
        .cards
        .delete(&id)
        .map_err(|e| ApiError::from_card_error(Operation::Delete, e))?;
    Ok(Json(DeleteCardRes { success: true }))
}

/// Runs a card operation that writes an image to disk on the blocking thread pool.
async fn run_blocking<T, F>(operation: Operation, f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> CardResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            tracing::error!("{:?} task failed: {:?}", operation, e);
            ApiError::Internal(operation.internal_message())
        })?
        .map_err(|e| ApiError::from_card_error(operation, e))
}
