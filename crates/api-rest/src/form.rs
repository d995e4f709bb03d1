//! Request body extraction for card create and update.
//!
//! Both endpoints accept either `multipart/form-data` (the only way to send an image) or an
//! `application/json` object with the text fields. A request without a `Content-Type` carries
//! no fields at all.

use axum::async_trait;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::{header, StatusCode};
use axum::Json;
use cards_core::{CardUpdate, ImageUpload, NewCard};

use crate::error::{ApiError, INVALID_BODY, UNEXPECTED_FILE, UNSUPPORTED_CONTENT_TYPE};
use crate::models::CardFieldsReq;
use crate::AppState;

const IMAGE_FIELD: &str = "image";

/// Fields supplied for a card; `None` means the field was absent.
#[derive(Debug, Default)]
pub struct CardForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub image: Option<ImageUpload>,
}

impl CardForm {
    pub fn into_new_card(self) -> NewCard {
        NewCard {
            title: self.title,
            description: self.description,
            tags: self.tags,
            image: self.image,
        }
    }

    pub fn into_update(self) -> CardUpdate {
        CardUpdate {
            title: self.title,
            description: self.description,
            tags: self.tags,
            image: self.image,
        }
    }
}

impl From<CardFieldsReq> for CardForm {
    fn from(req: CardFieldsReq) -> Self {
        Self {
            title: req.title,
            description: req.description,
            tags: req.tags,
            image: None,
        }
    }
}

#[async_trait]
impl FromRequest<AppState> for CardForm {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_ascii_lowercase());

        match content_type.as_deref() {
            None => Ok(Self::default()),
            Some(ct) if ct.starts_with("multipart/form-data") => {
                let multipart = Multipart::from_request(req, state).await.map_err(|e| {
                    tracing::debug!("Multipart rejection: {:?}", e);
                    ApiError::BadRequest(INVALID_BODY)
                })?;
                read_multipart(multipart, state.cards.max_upload_bytes()).await
            }
            Some(ct) if ct.starts_with("application/json") => {
                let Json(fields) = Json::<CardFieldsReq>::from_request(req, state)
                    .await
                    .map_err(|e| {
                        tracing::debug!("JSON rejection: {:?}", e);
                        ApiError::BadRequest(INVALID_BODY)
                    })?;
                Ok(fields.into())
            }
            Some(_) => Err(ApiError::BadRequest(UNSUPPORTED_CONTENT_TYPE)),
        }
    }
}

/// Reads the text fields and at most one file, which must be named `image`.
///
/// A file part with an empty filename and no content is what browsers send for an empty file
/// input, and counts as no image.
async fn read_multipart(mut multipart: Multipart, max_bytes: u64) -> Result<CardForm, ApiError> {
    let mut form = CardForm::default();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);

        match (name.as_str(), file_name) {
            (IMAGE_FIELD, Some(file_name)) => {
                if form.image.is_some() {
                    return Err(ApiError::BadRequest(UNEXPECTED_FILE));
                }
                let content_type = field.content_type().map(str::to_string);
                let bytes = read_limited(&mut field, max_bytes).await?;
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.image = Some(ImageUpload::new(file_name, content_type, bytes));
            }
            (_, Some(_)) => return Err(ApiError::BadRequest(UNEXPECTED_FILE)),
            ("title", None) => form.title = Some(field.text().await.map_err(multipart_error)?),
            ("description", None) => {
                form.description = Some(field.text().await.map_err(multipart_error)?)
            }
            ("tags", None) => form.tags = Some(field.text().await.map_err(multipart_error)?),
            _ => {}
        }
    }

    Ok(form)
}

async fn read_limited(field: &mut Field<'_>, max_bytes: u64) -> Result<Vec<u8>, ApiError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if (bytes.len() + chunk.len()) as u64 > max_bytes {
            return Err(ApiError::PayloadTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::PayloadTooLarge;
    }
    tracing::debug!("Multipart error: {}", err.body_text());
    ApiError::BadRequest(INVALID_BODY)
}
