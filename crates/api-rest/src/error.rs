//! Mapping of domain errors onto HTTP responses.
//!
//! Every error is returned as `{"error": <message>}`. Internal failures are logged and
//! reported with a generic message that depends only on the operation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cards_core::CardError;

use crate::models::ErrorRes;

pub const CARD_NOT_FOUND: &str = "Scheda non trovata";
pub const IMAGE_REQUIRED: &str = "Immagine obbligatoria";
pub const ONLY_IMAGES: &str = "Solo immagini permesse";
pub const FILE_TOO_LARGE: &str = "File troppo grande";
pub const UNEXPECTED_FILE: &str = "Campo file inatteso";
pub const INVALID_BODY: &str = "Richiesta non valida";
pub const UNSUPPORTED_CONTENT_TYPE: &str = "Content-Type non supportato";
pub const CREATE_FAILED: &str = "Errore creazione";
pub const UPDATE_FAILED: &str = "Errore aggiornamento";
pub const INTERNAL_ERROR: &str = "Errore interno";

/// Card operation an error came from; selects the message for internal failures.
#[derive(Clone, Copy, Debug)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn internal_message(self) -> &'static str {
        match self {
            Operation::Create => CREATE_FAILED,
            Operation::Update => UPDATE_FAILED,
            Operation::List | Operation::Get | Operation::Delete => INTERNAL_ERROR,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(&'static str),
    NotFound,
    PayloadTooLarge,
    Internal(&'static str),
}

impl ApiError {
    pub fn from_card_error(operation: Operation, err: CardError) -> Self {
        match err {
            CardError::MissingImage => ApiError::BadRequest(IMAGE_REQUIRED),
            CardError::InvalidImage => ApiError::BadRequest(ONLY_IMAGES),
            CardError::ImageTooLarge { .. } => ApiError::PayloadTooLarge,
            CardError::NotFound(_) => ApiError::NotFound,
            other => {
                tracing::error!("{:?} card error: {:?}", operation, other);
                ApiError::Internal(operation.internal_message())
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ApiError::BadRequest(message) | ApiError::Internal(message) => message,
            ApiError::NotFound => CARD_NOT_FOUND,
            ApiError::PayloadTooLarge => FILE_TOO_LARGE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorRes {
            error: self.message().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
