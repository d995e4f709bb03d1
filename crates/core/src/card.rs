//! Card model.
//!
//! A card is an image plus three free-form text fields. Cards are identified by a
//! [`CardId`], rendered as `card_<n>` where `n` comes from a per-process counter that
//! never rewinds.

use crate::constants::CARD_ID_PREFIX;
use cards_files::ImageUpload;
use chrono::{DateTime, Utc};
use std::fmt;

/// Identifier of a card, e.g. `card_7`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(u64);

impl CardId {
    pub(crate) fn from_sequence(sequence: u64) -> Self {
        Self(sequence)
    }

    pub fn sequence(&self) -> u64 {
        self.0
    }

    /// Parses the canonical string form of an id.
    ///
    /// Returns `None` for anything that `CardId` would not render itself, so `card_01`
    /// and `card_+1` do not alias `card_1`.
    pub fn parse(input: &str) -> Option<Self> {
        let sequence = input.strip_prefix(CARD_ID_PREFIX)?.parse::<u64>().ok()?;
        let id = Self(sequence);
        (id.to_string() == input).then_some(id)
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CARD_ID_PREFIX, self.0)
    }
}

/// A stored card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    pub description: String,
    pub tags: String,
    /// URL path of the card's image; never empty.
    pub image_url: String,
    /// Set once when the card is created.
    pub created_at: DateTime<Utc>,
}

/// Fields of a card before the store assigns its id.
#[derive(Clone, Debug)]
pub struct CardDraft {
    pub title: String,
    pub description: String,
    pub tags: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// Partial replacement applied by [`crate::CardStore::replace`].
///
/// `None` leaves the field untouched; `Some` overwrites it, including with an empty string.
#[derive(Clone, Debug, Default)]
pub struct CardPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub image_url: Option<String>,
}

impl CardPatch {
    pub(crate) fn apply_to(self, card: &mut Card) {
        if let Some(title) = self.title {
            card.title = title;
        }
        if let Some(description) = self.description {
            card.description = description;
        }
        if let Some(tags) = self.tags {
            card.tags = tags;
        }
        if let Some(image_url) = self.image_url {
            card.image_url = image_url;
        }
    }
}

/// Input to [`crate::CardService::create`].
///
/// The image is optional here so that a missing upload is reported as
/// [`crate::CardError::MissingImage`] rather than failing request extraction.
#[derive(Clone, Debug, Default)]
pub struct NewCard {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub image: Option<ImageUpload>,
}

/// Input to [`crate::CardService::update`].
#[derive(Clone, Debug, Default)]
pub struct CardUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub image: Option<ImageUpload>,
}
