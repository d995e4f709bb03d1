//! # Cards Core
//!
//! Core business logic for the cards service.
//!
//! This crate contains pure data operations:
//! - The [`Card`] model and its typed [`CardId`]
//! - The in-memory [`CardStore`]
//! - [`CardService`], which combines the store with image uploads from `cards_files`
//!
//! Cards are held only in process memory and are lost on restart.
//!
//! **No API concerns**: HTTP routing, status codes and JSON shaping belong in `api-rest`.

pub mod card;
pub mod config;
pub mod constants;
pub mod error;
pub mod service;
pub mod store;

pub use card::{Card, CardDraft, CardId, CardPatch, CardUpdate, NewCard};
pub use cards_files::{FilesError, ImageUpload};
pub use config::CoreConfig;
pub use error::{CardError, CardResult};
pub use service::CardService;
pub use store::CardStore;
