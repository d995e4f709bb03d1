//! In-memory card store.
//!
//! Cards live in a `Vec` in insertion order. The store does not sort; ordering for
//! presentation is applied by [`crate::CardService::list`].

use crate::card::{Card, CardDraft, CardId, CardPatch};
use crate::constants::FIRST_CARD_SEQUENCE;
use crate::{CardError, CardResult};

#[derive(Debug)]
pub struct CardStore {
    cards: Vec<Card>,
    next_sequence: u64,
}

impl Default for CardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CardStore {
    pub fn new() -> Self {
        Self {
            cards: Vec::new(),
            next_sequence: FIRST_CARD_SEQUENCE,
        }
    }

    /// All cards, in insertion order.
    pub fn list(&self) -> &[Card] {
        &self.cards
    }

    pub fn get(&self, id: &CardId) -> CardResult<&Card> {
        self.cards
            .iter()
            .find(|card| card.id == *id)
            .ok_or_else(|| CardError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &CardId) -> bool {
        self.position(id).is_some()
    }

    /// Assigns the next id to `draft` and appends it.
    pub fn insert(&mut self, draft: CardDraft) -> Card {
        let id = CardId::from_sequence(self.next_sequence);
        self.next_sequence += 1;

        let card = Card {
            id,
            title: draft.title,
            description: draft.description,
            tags: draft.tags,
            image_url: draft.image_url,
            created_at: draft.created_at,
        };
        self.cards.push(card.clone());
        card
    }

    /// Merges `patch` into the card with `id` and returns the result.
    pub fn replace(&mut self, id: &CardId, patch: CardPatch) -> CardResult<Card> {
        let index = self
            .position(id)
            .ok_or_else(|| CardError::NotFound(id.to_string()))?;

        let card = &mut self.cards[index];
        patch.apply_to(card);
        Ok(card.clone())
    }

    /// Removes the card with `id`. Its id is never handed out again.
    pub fn remove(&mut self, id: &CardId) -> CardResult<Card> {
        let index = self
            .position(id)
            .ok_or_else(|| CardError::NotFound(id.to_string()))?;

        Ok(self.cards.remove(index))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn position(&self, id: &CardId) -> Option<usize> {
        self.cards.iter().position(|card| card.id == *id)
    }
}
