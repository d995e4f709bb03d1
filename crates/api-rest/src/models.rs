//! Request and response bodies of the REST API.

use cards_core::Card;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A card as returned by every card endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CardRes {
    #[schema(example = "card_1")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub tags: String,
    #[schema(example = "/uploads/1767261600123-cat.png")]
    pub image_url: String,
    /// RFC 3339, UTC, millisecond precision
    #[schema(example = "2026-01-01T10:00:00.123Z")]
    pub created_at: String,
}

impl From<Card> for CardRes {
    fn from(card: Card) -> Self {
        Self {
            id: card.id.to_string(),
            title: card.title,
            description: card.description,
            tags: card.tags,
            image_url: card.image_url,
            created_at: card.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Text fields of a card, accepted as a JSON body on create and update.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CardFieldsReq {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
}

/// Multipart body of create and update; documentation only.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct CardUploadReq {
    /// jpeg, jpg, png, gif or webp; required on create
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteCardRes {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    #[schema(example = "Scheda non trovata")]
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}
